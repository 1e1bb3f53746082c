//! Time-indexed series data model.
//!
//! Provides the input types consumed by the matching engine:
//!
//! - [`Timeline`] — an ordered sequence of timestamps, either naive
//!   (interpreted as UTC by explicit convention) or tagged with one IANA
//!   timezone for the whole sequence
//! - [`Column`] — a named sequence of observation values
//! - [`Series`] — a timeline plus one value column per observation variable
//!
//! A reference timeline is a bare [`Timeline`]; an input series is a
//! [`Series`]. Both are read-only to the engine — a collocation call borrows
//! them and leaves them untouched.

use chrono::{DateTime, NaiveDateTime, Utc};
use chrono_tz::Tz;

use crate::error::{CollocationError, Result};

// ── Timeline ────────────────────────────────────────────────────────────────

/// An ordered sequence of timestamps.
///
/// Timestamps are stored as wall-clock values together with an optional IANA
/// timezone that applies to the whole sequence. A timeline without a zone is
/// *naive*: by convention its wall-clock values are interpreted as UTC. This
/// convention is deliberate and documented rather than inferred — comparing a
/// naive timeline against a zoned one never errors, it means "the naive side
/// is UTC".
///
/// The sequence does not need to be sorted; the matcher sorts its own working
/// copy. Duplicate timestamps are permitted (see the matcher's tie-break
/// rules).
#[derive(Debug, Clone, PartialEq)]
pub struct Timeline {
    stamps: Vec<NaiveDateTime>,
    zone: Option<Tz>,
}

impl Timeline {
    /// Create a naive timeline. Wall-clock values are treated as UTC.
    pub fn naive(stamps: Vec<NaiveDateTime>) -> Self {
        Self { stamps, zone: None }
    }

    /// Create a timeline whose wall-clock values are local times in `zone`.
    pub fn zoned(stamps: Vec<NaiveDateTime>, zone: Tz) -> Self {
        Self {
            stamps,
            zone: Some(zone),
        }
    }

    /// Create a timeline from UTC instants.
    ///
    /// The result is tagged with the UTC zone, so matched timestamps are
    /// reported back as UTC.
    pub fn from_utc(instants: Vec<DateTime<Utc>>) -> Self {
        Self {
            stamps: instants.iter().map(|dt| dt.naive_utc()).collect(),
            zone: Some(Tz::UTC),
        }
    }

    /// The wall-clock timestamps in input order.
    pub fn stamps(&self) -> &[NaiveDateTime] {
        &self.stamps
    }

    /// The timezone the wall-clock values belong to, if any.
    pub fn zone(&self) -> Option<Tz> {
        self.zone
    }

    /// Number of timestamps.
    pub fn len(&self) -> usize {
        self.stamps.len()
    }

    /// Whether the timeline has no timestamps.
    pub fn is_empty(&self) -> bool {
        self.stamps.is_empty()
    }
}

// ── Column ──────────────────────────────────────────────────────────────────

/// A named sequence of observation values, aligned 1:1 with a timeline.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    name: String,
    values: Vec<f64>,
}

impl Column {
    pub fn new(name: impl Into<String>, values: Vec<f64>) -> Self {
        Self {
            name: name.into(),
            values,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }
}

// ── Series ──────────────────────────────────────────────────────────────────

/// A time-indexed series: one timeline plus any number of value columns.
///
/// Every column must have exactly one value per timestamp and a unique name.
/// An empty series (zero timestamps, possibly zero columns) is valid input —
/// it simply matches nothing.
#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    timeline: Timeline,
    columns: Vec<Column>,
}

impl Series {
    /// Build a series, validating column shape.
    ///
    /// # Errors
    ///
    /// Returns [`CollocationError::LengthMismatch`] if any column's length
    /// differs from the timeline's, or [`CollocationError::DuplicateColumn`]
    /// if two columns share a name.
    pub fn new(timeline: Timeline, columns: Vec<Column>) -> Result<Self> {
        for col in &columns {
            if col.values.len() != timeline.len() {
                return Err(CollocationError::LengthMismatch(format!(
                    "column '{}' has {} values but the timeline has {} timestamps",
                    col.name,
                    col.values.len(),
                    timeline.len()
                )));
            }
        }
        for (i, col) in columns.iter().enumerate() {
            if columns[..i].iter().any(|c| c.name == col.name) {
                return Err(CollocationError::DuplicateColumn(format!(
                    "'{}'",
                    col.name
                )));
            }
        }
        Ok(Self { timeline, columns })
    }

    pub fn timeline(&self) -> &Timeline {
        &self.timeline
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Look up a column by name.
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Number of observations (rows).
    pub fn len(&self) -> usize {
        self.timeline.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timeline.is_empty()
    }
}

// ── Tests ───────────────────────────────────────────────────────────────────
