//! Quality-flag handling.
//!
//! An input series may carry a per-observation quality flag, supplied either
//! as an array alongside the series or as the name of one of its columns.
//! Before matching begins the flag is resolved once into a canonical per-row
//! validity mask; the matcher itself only ever sees booleans.

use crate::error::{CollocationError, Result};
use crate::series::Series;

// ── FlagSource ──────────────────────────────────────────────────────────────

/// Where per-observation quality flags come from.
///
/// A nonzero flag value marks the corresponding observation invalid. NaN is
/// not zero and therefore also marks the observation invalid.
#[derive(Debug, Clone, PartialEq)]
pub enum FlagSource {
    /// Flag values supplied alongside the series, aligned 1:1 with its rows.
    Inline(Vec<f64>),
    /// Name of a column of the input series holding the flag values. The
    /// column is consumed as a flag and excluded from the output value
    /// columns.
    Column(String),
}

impl From<Vec<f64>> for FlagSource {
    fn from(values: Vec<f64>) -> Self {
        Self::Inline(values)
    }
}

impl From<Vec<bool>> for FlagSource {
    fn from(values: Vec<bool>) -> Self {
        Self::Inline(values.into_iter().map(|b| f64::from(u8::from(b))).collect())
    }
}

impl From<Vec<i64>> for FlagSource {
    fn from(values: Vec<i64>) -> Self {
        Self::Inline(values.into_iter().map(|v| v as f64).collect())
    }
}

impl From<&str> for FlagSource {
    fn from(name: &str) -> Self {
        Self::Column(name.to_string())
    }
}

impl From<String> for FlagSource {
    fn from(name: String) -> Self {
        Self::Column(name)
    }
}

// ── Validity ────────────────────────────────────────────────────────────────

/// Per-row validity mask plus the name of the column consumed as a flag, if
/// the flag was column-sourced.
#[derive(Debug, Clone, PartialEq)]
pub struct Validity {
    valid: Vec<bool>,
    flag_column: Option<String>,
}

impl Validity {
    /// Whether row `row` is a valid observation.
    pub fn is_valid(&self, row: usize) -> bool {
        self.valid[row]
    }

    /// The per-row mask, in series row order.
    pub fn mask(&self) -> &[bool] {
        &self.valid
    }

    /// Name of the series column consumed as the flag, if any.
    pub fn flag_column(&self) -> Option<&str> {
        self.flag_column.as_deref()
    }

    /// True when at least one row is flagged invalid.
    pub fn any_invalid(&self) -> bool {
        self.valid.iter().any(|v| !v)
    }
}

/// Resolve an optional flag source into a per-row validity mask.
///
/// With no flag source every row is valid. A flag value is invalid when it is
/// nonzero under a truthiness test shared by boolean, integer and float
/// encodings (`0` / `0.0` / `false` are valid, everything else — NaN
/// included — is invalid).
///
/// # Errors
///
/// Returns [`CollocationError::MissingFlagColumn`] if a named column is not
/// present in the series, or [`CollocationError::LengthMismatch`] if an
/// inline flag array is not aligned 1:1 with the series rows.
pub fn resolve(flag: Option<&FlagSource>, series: &Series) -> Result<Validity> {
    let (raw, flag_column): (&[f64], Option<String>) = match flag {
        None => {
            return Ok(Validity {
                valid: vec![true; series.len()],
                flag_column: None,
            });
        }
        Some(FlagSource::Inline(values)) => {
            if values.len() != series.len() {
                return Err(CollocationError::LengthMismatch(format!(
                    "flag array has {} values but the series has {} rows",
                    values.len(),
                    series.len()
                )));
            }
            (values, None)
        }
        Some(FlagSource::Column(name)) => {
            let col = series
                .column(name)
                .ok_or_else(|| CollocationError::MissingFlagColumn(format!("'{name}'")))?;
            (col.values(), Some(name.clone()))
        }
    };

    Ok(Validity {
        valid: raw.iter().map(|&v| v == 0.0).collect(),
        flag_column,
    })
}

// ── Tests ───────────────────────────────────────────────────────────────────
