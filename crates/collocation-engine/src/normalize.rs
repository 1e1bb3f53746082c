//! Timestamp normalization.
//!
//! All matching happens on UTC instants: every timeline is resolved to
//! `DateTime<Utc>` once, before any comparison, so that series recorded in
//! different timezones (or naively) compare by physical instant rather than
//! by wall-clock digits. Conversion goes through the timezone database, not a
//! fixed-offset shortcut — DST-observing zones change offset across the year
//! and a fixed shift would drift by an hour for half of it.
//!
//! Matched timestamps emitted in the output are expressed in the *reference*
//! timeline's zone (UTC when the reference is naive), never in the input
//! series' original zone.

use chrono::{DateTime, LocalResult, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;

use crate::error::{CollocationError, Result};
use crate::series::Timeline;

/// Resolve a timeline's wall-clock timestamps to UTC instants.
///
/// Naive timelines use the documented UTC convention. Zoned timelines are
/// localized through the timezone database; a wall-clock value that is
/// ambiguous (DST fall-back repeats an hour) or nonexistent (DST spring-forward
/// skips an hour) in the declared zone cannot be mapped to a single instant.
///
/// # Errors
///
/// Returns [`CollocationError::AmbiguousTimezone`] for ambiguous or
/// nonexistent local times — the engine fails fast rather than guessing an
/// offset.
pub fn utc_instants(timeline: &Timeline) -> Result<Vec<DateTime<Utc>>> {
    match timeline.zone() {
        None => Ok(timeline
            .stamps()
            .iter()
            .map(|naive| Utc.from_utc_datetime(naive))
            .collect()),
        Some(tz) => timeline
            .stamps()
            .iter()
            .map(|naive| localize(*naive, tz))
            .collect(),
    }
}

/// The zone matched timestamps are reported in: the reference's own zone, or
/// UTC when the reference is naive.
pub fn reporting_zone(reference: &Timeline) -> Tz {
    reference.zone().unwrap_or(Tz::UTC)
}

fn localize(naive: NaiveDateTime, tz: Tz) -> Result<DateTime<Utc>> {
    match tz.from_local_datetime(&naive) {
        LocalResult::Single(dt) => Ok(dt.with_timezone(&Utc)),
        LocalResult::Ambiguous(_, _) => Err(CollocationError::AmbiguousTimezone(format!(
            "local time {naive} occurs twice in {tz} (DST fold)"
        ))),
        LocalResult::None => Err(CollocationError::AmbiguousTimezone(format!(
            "local time {naive} does not exist in {tz} (DST gap)"
        ))),
    }
}

// ── Tests ───────────────────────────────────────────────────────────────────
