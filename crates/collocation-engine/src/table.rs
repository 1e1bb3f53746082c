//! Aligned output assembly.
//!
//! The output of a collocation call is a table shaped to the reference
//! timeline: one row per reference timestamp (unless unmatched rows are
//! dropped on request), one column per input value column. "No match" is a
//! typed missing value, never a zero; the optional matched-timestamp and
//! distance columns use timestamp-typed and duration-typed missing values in
//! the same way.

use chrono::{DateTime, Duration, Utc};
use chrono_tz::Tz;
use serde::ser::SerializeSeq;
use serde::{Serialize, Serializer};

use crate::matcher::NearestMatch;
use crate::series::Series;

/// Column name for the matched original timestamps, when requested.
pub const INDEX_OTHER: &str = "index_other";

/// Column name for the match distances, when requested.
pub const DISTANCE_OTHER: &str = "distance_other";

// ── OutputTable ─────────────────────────────────────────────────────────────

/// A named column of aligned values; `None` marks rows without a match.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutputColumn {
    name: String,
    values: Vec<Option<f64>>,
}

impl OutputColumn {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn values(&self) -> &[Option<f64>] {
        &self.values
    }
}

/// The aligned result of one collocation call.
///
/// Timestamps (both the reference timeline and the optional `index_other`
/// column) are expressed in the reference's timezone, UTC when the reference
/// was naive. Distances are unsigned absolute offsets — the quantity
/// downstream tolerance checks consume. Serialization emits timestamps as
/// RFC 3339 and distances as fractional seconds.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutputTable {
    #[serde(serialize_with = "serialize_rfc3339")]
    timestamps: Vec<DateTime<Tz>>,
    columns: Vec<OutputColumn>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        serialize_with = "serialize_optional_rfc3339"
    )]
    index_other: Option<Vec<Option<DateTime<Tz>>>>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        serialize_with = "serialize_distance_seconds"
    )]
    distance_other: Option<Vec<Option<Duration>>>,
}

impl OutputTable {
    /// Number of rows.
    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }

    /// The reference timestamps the rows are aligned to, in the reporting
    /// zone.
    pub fn timestamps(&self) -> &[DateTime<Tz>] {
        &self.timestamps
    }

    /// The aligned value columns, in input order (minus a column-sourced
    /// flag).
    pub fn columns(&self) -> &[OutputColumn] {
        &self.columns
    }

    /// Look up a value column by name.
    pub fn column(&self, name: &str) -> Option<&OutputColumn> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Matched original timestamps (`index_other`), present when requested.
    pub fn index_other(&self) -> Option<&[Option<DateTime<Tz>>]> {
        self.index_other.as_deref()
    }

    /// Absolute match distances (`distance_other`), present when requested.
    pub fn distance_other(&self) -> Option<&[Option<Duration>]> {
        self.distance_other.as_deref()
    }
}

/// Timestamps serialize as RFC 3339 with the reporting zone's numeric offset.
fn serialize_rfc3339<S: Serializer>(
    timestamps: &[DateTime<Tz>],
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    let mut seq = serializer.serialize_seq(Some(timestamps.len()))?;
    for dt in timestamps {
        seq.serialize_element(&dt.to_rfc3339())?;
    }
    seq.end()
}

fn serialize_optional_rfc3339<S: Serializer>(
    timestamps: &Option<Vec<Option<DateTime<Tz>>>>,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    let timestamps = timestamps.as_ref().expect("skipped when None");
    let mut seq = serializer.serialize_seq(Some(timestamps.len()))?;
    for dt in timestamps {
        seq.serialize_element(&dt.as_ref().map(|dt| dt.to_rfc3339()))?;
    }
    seq.end()
}

/// Distances serialize as fractional seconds (`null` for no-match rows).
fn serialize_distance_seconds<S: Serializer>(
    distances: &Option<Vec<Option<Duration>>>,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    let distances = distances.as_ref().expect("skipped when None");
    let mut seq = serializer.serialize_seq(Some(distances.len()))?;
    for d in distances {
        seq.serialize_element(&d.map(|d| match d.num_microseconds() {
            Some(us) => us as f64 / 1e6,
            None => d.num_seconds() as f64,
        }))?;
    }
    seq.end()
}

// ── Assembly ────────────────────────────────────────────────────────────────

/// Which optional columns the caller asked for, and whether unmatched rows
/// are kept.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct AssemblyRequest {
    pub with_index: bool,
    pub with_distance: bool,
    pub drop_unmatched: bool,
}

/// Fold per-reference match results into an [`OutputTable`].
///
/// `matches` is aligned 1:1 with `reference_instants`; `exclude` names a
/// column consumed as a quality flag, left out of the value columns. All rows
/// are emitted in reference order; in drop mode, rows without a match are
/// skipped entirely (their reference timestamp included), so the row count
/// can shrink below the reference length.
pub(crate) fn assemble(
    reference_instants: &[DateTime<Utc>],
    zone: Tz,
    matches: &[Option<NearestMatch>],
    series: &Series,
    exclude: Option<&str>,
    request: AssemblyRequest,
) -> OutputTable {
    debug_assert_eq!(reference_instants.len(), matches.len());

    let kept: Vec<&crate::series::Column> = series
        .columns()
        .iter()
        .filter(|c| Some(c.name()) != exclude)
        .collect();

    let mut timestamps = Vec::with_capacity(matches.len());
    let mut columns: Vec<OutputColumn> = kept
        .iter()
        .map(|c| OutputColumn {
            name: c.name().to_string(),
            values: Vec::with_capacity(matches.len()),
        })
        .collect();
    let mut index_other = request.with_index.then(Vec::new);
    let mut distance_other = request.with_distance.then(Vec::new);

    for (instant, matched) in reference_instants.iter().zip(matches) {
        if request.drop_unmatched && matched.is_none() {
            continue;
        }
        timestamps.push(instant.with_timezone(&zone));
        for (out, col) in columns.iter_mut().zip(&kept) {
            out.values.push(matched.map(|m| col.values()[m.row]));
        }
        if let Some(idx) = index_other.as_mut() {
            idx.push(matched.map(|m| m.instant.with_timezone(&zone)));
        }
        if let Some(dist) = distance_other.as_mut() {
            dist.push(matched.map(|m| m.offset.abs()));
        }
    }

    OutputTable {
        timestamps,
        columns,
        index_other,
        distance_other,
    }
}

// ── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::series::{Column, Timeline};
    use chrono::TimeZone;

    fn at(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 16, hour, 0, 0).unwrap()
    }

    fn input() -> Series {
        Series::new(
            Timeline::from_utc(vec![at(9), at(12)]),
            vec![
                Column::new("sm", vec![0.1, 0.2]),
                Column::new("flag", vec![0.0, 1.0]),
            ],
        )
        .unwrap()
    }

    fn hit(row: usize, instant: DateTime<Utc>, offset: Duration) -> Option<NearestMatch> {
        Some(NearestMatch {
            row,
            instant,
            offset,
        })
    }

    #[test]
    fn test_assemble_fills_matched_and_missing_rows() {
        let refs = [at(9), at(18)];
        let matches = [hit(0, at(9), Duration::zero()), None];
        let table = assemble(
            &refs,
            Tz::UTC,
            &matches,
            &input(),
            None,
            AssemblyRequest {
                with_index: true,
                with_distance: true,
                drop_unmatched: false,
            },
        );
        assert_eq!(table.len(), 2);
        assert_eq!(table.column("sm").unwrap().values(), &[Some(0.1), None]);
        assert_eq!(table.index_other().unwrap()[1], None);
        assert_eq!(table.distance_other().unwrap()[0], Some(Duration::zero()));
        assert_eq!(table.distance_other().unwrap()[1], None);
    }

    #[test]
    fn test_assemble_excludes_flag_column() {
        let refs = [at(9)];
        let matches = [hit(0, at(9), Duration::zero())];
        let table = assemble(
            &refs,
            Tz::UTC,
            &matches,
            &input(),
            Some("flag"),
            AssemblyRequest::default(),
        );
        let names: Vec<&str> = table.columns().iter().map(|c| c.name()).collect();
        assert_eq!(names, ["sm"]);
    }

    #[test]
    fn test_assemble_drop_mode_removes_unmatched_rows() {
        let refs = [at(9), at(18), at(12)];
        let matches = [
            hit(0, at(9), Duration::zero()),
            None,
            hit(1, at(12), Duration::zero()),
        ];
        let table = assemble(
            &refs,
            Tz::UTC,
            &matches,
            &input(),
            None,
            AssemblyRequest {
                drop_unmatched: true,
                ..AssemblyRequest::default()
            },
        );
        assert_eq!(table.len(), 2);
        assert_eq!(
            table.column("sm").unwrap().values(),
            &[Some(0.1), Some(0.2)]
        );
    }

    #[test]
    fn test_distance_is_absolute() {
        let refs = [at(10)];
        let matches = [hit(0, at(9), Duration::hours(-1))];
        let table = assemble(
            &refs,
            Tz::UTC,
            &matches,
            &input(),
            None,
            AssemblyRequest {
                with_distance: true,
                ..AssemblyRequest::default()
            },
        );
        assert_eq!(table.distance_other().unwrap()[0], Some(Duration::hours(1)));
    }

    #[test]
    fn test_serialized_form_uses_rfc3339_and_seconds() {
        let refs = [at(10), at(18)];
        let matches = [hit(0, at(9), Duration::hours(-1)), None];
        let table = assemble(
            &refs,
            Tz::UTC,
            &matches,
            &input(),
            Some("flag"),
            AssemblyRequest {
                with_index: true,
                with_distance: true,
                drop_unmatched: false,
            },
        );
        let json = serde_json::to_value(&table).unwrap();
        assert_eq!(json["timestamps"][0], "2026-03-16T10:00:00+00:00");
        assert_eq!(json[INDEX_OTHER][0], "2026-03-16T09:00:00+00:00");
        assert_eq!(json[DISTANCE_OTHER][0], 3600.0);
        assert_eq!(json[DISTANCE_OTHER][1], serde_json::Value::Null);
        assert_eq!(json["columns"][0]["name"], "sm");
    }
}
