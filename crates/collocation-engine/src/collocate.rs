//! The collocation operation.
//!
//! Ties the pieces together: normalize both timelines to UTC instants,
//! resolve the quality flag into a validity mask, run the nearest-neighbour
//! search once per reference timestamp, and fold the results into an aligned
//! table. Every precondition is checked before the first search — a
//! validation error never leaves a partially built table behind.
//!
//! A call is a pure function of its inputs: it borrows the reference and the
//! input series read-only, owns only its transient working state (sorted
//! candidate indexes, validity mask), and leaves nothing behind. Lookups for
//! different reference timestamps are fully independent; they run here as a
//! simple loop, and their results do not depend on iteration order.

use std::collections::HashSet;

use chrono::{DateTime, Duration, Utc};

use crate::error::{CollocationError, Result};
use crate::matcher::{CandidateIndex, NearestMatch};
use crate::normalize;
use crate::series::{Series, Timeline};
use crate::table::{self, AssemblyRequest, OutputTable};
use crate::validity::{self, FlagSource};

// ── Options ─────────────────────────────────────────────────────────────────

/// Options for [`collocate_with_options`].
#[derive(Debug, Clone, Default)]
pub struct CollocateOptions {
    /// Per-observation quality flags for the input series; nonzero marks an
    /// observation invalid. No flag means every observation is valid.
    pub flag: Option<FlagSource>,
    /// Permit falling back to flag-invalid observations for reference
    /// timestamps where no valid observation lies within the window. Off by
    /// default: flagged observations are never used unless this is set.
    pub use_invalid_on_fallback: bool,
    /// Emit the matched original timestamps as an `index_other` column,
    /// expressed in the reference's timezone.
    pub return_original_index: bool,
    /// Emit the absolute match distances as a `distance_other` column.
    pub return_distance: bool,
    /// Drop rows with no match instead of filling them with missing values.
    /// Off by default: every other contract assumes one output row per
    /// reference timestamp.
    pub drop_rows_without_match: bool,
    /// Remove rows whose instant repeats an earlier row's instant before
    /// matching (first occurrence kept). Without this, duplicates stay in the
    /// pool and the deterministic earliest-row tie-break applies.
    pub drop_duplicate_timestamps: bool,
}

// ── collocate ───────────────────────────────────────────────────────────────

/// Collocate `input` onto `reference` with default options.
///
/// Equivalent to [`collocate_with_options`] with
/// [`CollocateOptions::default`]: no quality flag, no extra columns, one row
/// per reference timestamp.
///
/// # Errors
///
/// See [`collocate_with_options`].
pub fn collocate(reference: &Timeline, input: &Series, window: Duration) -> Result<OutputTable> {
    collocate_with_options(reference, input, window, &CollocateOptions::default())
}

/// Collocate `input` onto `reference`: for each reference timestamp, find the
/// nearest input observation within `window` and emit one aligned output row.
///
/// The window is symmetric and inclusive — an observation at distance exactly
/// `window` matches. When a quality flag is given, selection is two-pass:
/// valid observations first, and only if none is in range *and*
/// [`CollocateOptions::use_invalid_on_fallback`] is set, the nearest
/// observation regardless of flag. A reference timestamp with no eligible
/// observation in range yields a missing row, not an error; an empty input
/// series yields a table of missing rows.
///
/// # Errors
///
/// Returns [`CollocationError::InvalidWindow`] for a negative window,
/// [`CollocationError::AmbiguousTimezone`] if either timeline has wall-clock
/// values that cannot be mapped to a single instant,
/// [`CollocationError::MissingFlagColumn`] if a named flag column is absent,
/// or [`CollocationError::LengthMismatch`] if an inline flag array is not
/// aligned with the input rows. All are raised before any matching happens.
pub fn collocate_with_options(
    reference: &Timeline,
    input: &Series,
    window: Duration,
    options: &CollocateOptions,
) -> Result<OutputTable> {
    if window < Duration::zero() {
        return Err(CollocationError::InvalidWindow(format!(
            "window must be non-negative, got {} s",
            window.num_seconds()
        )));
    }

    let reference_instants = normalize::utc_instants(reference)?;
    let zone = normalize::reporting_zone(reference);
    let input_instants = normalize::utc_instants(input.timeline())?;
    let validity = validity::resolve(options.flag.as_ref(), input)?;

    let keep = if options.drop_duplicate_timestamps {
        first_occurrence_mask(&input_instants)
    } else {
        vec![true; input_instants.len()]
    };

    let valid_pool =
        CandidateIndex::new(&input_instants, |row| keep[row] && validity.is_valid(row));
    let fallback_pool = (options.use_invalid_on_fallback && validity.any_invalid())
        .then(|| CandidateIndex::new(&input_instants, |row| keep[row]));

    let matches: Vec<Option<NearestMatch>> = reference_instants
        .iter()
        .map(|&target| {
            valid_pool.nearest(target, window).or_else(|| {
                fallback_pool
                    .as_ref()
                    .and_then(|pool| pool.nearest(target, window))
            })
        })
        .collect();

    Ok(table::assemble(
        &reference_instants,
        zone,
        &matches,
        input,
        validity.flag_column(),
        AssemblyRequest {
            with_index: options.return_original_index,
            with_distance: options.return_distance,
            drop_unmatched: options.drop_rows_without_match,
        },
    ))
}

/// True for the first row carrying each instant, in input order.
fn first_occurrence_mask(instants: &[DateTime<Utc>]) -> Vec<bool> {
    let mut seen = HashSet::with_capacity(instants.len());
    instants.iter().map(|t| seen.insert(*t)).collect()
}

// ── Tests ───────────────────────────────────────────────────────────────────
