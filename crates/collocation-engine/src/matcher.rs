//! Nearest-neighbour search over a candidate pool.
//!
//! The search primitive carries no selection policy of its own: a
//! [`CandidateIndex`] is built from an arbitrary row-eligibility predicate,
//! and the valid-first / invalid-fallback selection in [`crate::collocate`]
//! is expressed as two indexes over different pools sharing this search.
//!
//! Determinism rules, applied in this order:
//!
//! 1. The closer of the two neighbours bracketing the target wins.
//! 2. Equidistant neighbours break toward the earlier instant.
//! 3. Duplicate instants break toward the earliest input row.
//!
//! Each lookup is independent of every other — matching N reference
//! timestamps is N isolated searches over an immutable index, in whatever
//! order the caller likes.

use chrono::{DateTime, Duration, Utc};

/// One matched observation: which input row, its instant, and the signed
/// offset `matched − reference`. Callers wanting a distance take
/// [`Duration::abs`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NearestMatch {
    pub row: usize,
    pub instant: DateTime<Utc>,
    pub offset: Duration,
}

/// A sorted view over the eligible rows of an input timeline.
///
/// Construction is O(n log n); each [`nearest`](Self::nearest) lookup is a
/// binary search. The sort is stable on the instant, so rows sharing an
/// instant stay in input order and rule 3 above falls out of taking the first
/// element of a run.
#[derive(Debug, Clone)]
pub struct CandidateIndex {
    sorted: Vec<(DateTime<Utc>, usize)>,
}

impl CandidateIndex {
    /// Build an index over the rows of `instants` for which `eligible`
    /// returns true.
    pub fn new(instants: &[DateTime<Utc>], eligible: impl Fn(usize) -> bool) -> Self {
        let mut sorted: Vec<(DateTime<Utc>, usize)> = instants
            .iter()
            .enumerate()
            .filter(|(row, _)| eligible(*row))
            .map(|(row, instant)| (*instant, row))
            .collect();
        sorted.sort_by_key(|&(instant, _)| instant);
        Self { sorted }
    }

    /// Index over every row.
    pub fn all(instants: &[DateTime<Utc>]) -> Self {
        Self::new(instants, |_| true)
    }

    pub fn len(&self) -> usize {
        self.sorted.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sorted.is_empty()
    }

    /// Find the candidate nearest to `target`, bounded by `window`.
    ///
    /// The bound is inclusive: a candidate exactly `window` away still
    /// matches, and a zero window admits exact-instant matches only. Returns
    /// `None` when the index is empty or the nearest candidate lies outside
    /// the window — "no match" is a value here, not an error.
    pub fn nearest(&self, target: DateTime<Utc>, window: Duration) -> Option<NearestMatch> {
        let split = self.sorted.partition_point(|&(instant, _)| instant < target);

        // First candidate at or after the target. `split` is already the
        // start of its duplicate run: everything before it sorts strictly
        // below the target.
        let right = self.sorted.get(split).copied();

        // Last candidate before the target, walked back to the start of its
        // duplicate run so equal instants resolve to the earliest input row.
        let left = (split > 0).then(|| {
            let mut i = split - 1;
            while i > 0 && self.sorted[i - 1].0 == self.sorted[i].0 {
                i -= 1;
            }
            self.sorted[i]
        });

        let (instant, row) = match (left, right) {
            (Some(l), Some(r)) => {
                // Equidistant neighbours break toward the earlier instant.
                if target - l.0 <= r.0 - target {
                    l
                } else {
                    r
                }
            }
            (Some(l), None) => l,
            (None, Some(r)) => r,
            (None, None) => return None,
        };

        let offset = instant - target;
        (offset.abs() <= window).then_some(NearestMatch {
            row,
            instant,
            offset,
        })
    }
}

// ── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(hour: u32, min: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 16, hour, min, 0).unwrap()
    }

    #[test]
    fn test_nearest_picks_closer_neighbour() {
        let index = CandidateIndex::all(&[at(9, 0), at(12, 0)]);
        let m = index.nearest(at(11, 0), Duration::hours(6)).unwrap();
        assert_eq!(m.instant, at(12, 0));
        assert_eq!(m.offset, Duration::hours(1));
    }

    #[test]
    fn test_window_bound_is_inclusive() {
        let index = CandidateIndex::all(&[at(9, 0)]);
        // Exactly 2h away: matches.
        let m = index.nearest(at(11, 0), Duration::hours(2)).unwrap();
        assert_eq!(m.instant, at(9, 0));
        assert_eq!(m.offset, Duration::hours(-2));
        // One second past the window: no match.
        assert!(index
            .nearest(at(11, 0) + Duration::seconds(1), Duration::hours(2))
            .is_none());
    }

    #[test]
    fn test_zero_window_requires_exact_instant() {
        let index = CandidateIndex::all(&[at(9, 0), at(10, 0)]);
        let m = index.nearest(at(10, 0), Duration::zero()).unwrap();
        assert_eq!(m.instant, at(10, 0));
        assert_eq!(m.offset, Duration::zero());
        assert!(index
            .nearest(at(10, 1), Duration::zero())
            .is_none());
    }

    #[test]
    fn test_equidistant_neighbours_break_to_earlier_instant() {
        let index = CandidateIndex::all(&[at(9, 0), at(11, 0)]);
        let m = index.nearest(at(10, 0), Duration::hours(6)).unwrap();
        assert_eq!(m.instant, at(9, 0));
        assert_eq!(m.offset, Duration::hours(-1));
    }

    #[test]
    fn test_duplicate_instants_break_to_earliest_row() {
        // Rows 1 and 2 share an instant; row 1 must win.
        let index = CandidateIndex::all(&[at(8, 0), at(10, 0), at(10, 0), at(12, 0)]);
        let m = index.nearest(at(10, 0), Duration::hours(6)).unwrap();
        assert_eq!(m.row, 1);

        // Same for a duplicate run approached from the right.
        let m = index.nearest(at(10, 30), Duration::hours(6)).unwrap();
        assert_eq!(m.row, 1);
    }

    #[test]
    fn test_unsorted_input_is_handled() {
        let index = CandidateIndex::all(&[at(12, 0), at(8, 0), at(10, 0)]);
        let m = index.nearest(at(9, 45), Duration::hours(6)).unwrap();
        assert_eq!(m.instant, at(10, 0));
        assert_eq!(m.row, 2);
    }

    #[test]
    fn test_empty_index_never_matches() {
        let index = CandidateIndex::all(&[]);
        assert!(index.is_empty());
        assert!(index.nearest(at(10, 0), Duration::days(365)).is_none());
    }

    #[test]
    fn test_eligibility_predicate_filters_rows() {
        let instants = [at(9, 0), at(10, 0), at(11, 0)];
        let index = CandidateIndex::new(&instants, |row| row != 1);
        let m = index.nearest(at(10, 0), Duration::hours(6)).unwrap();
        // Row 1 is ineligible; the tie between 9:00 and 11:00 breaks earlier.
        assert_eq!(m.row, 0);
    }

    #[test]
    fn test_target_before_and_after_all_candidates() {
        let index = CandidateIndex::all(&[at(10, 0), at(11, 0)]);
        let before = index.nearest(at(8, 0), Duration::hours(6)).unwrap();
        assert_eq!(before.instant, at(10, 0));
        let after = index.nearest(at(13, 0), Duration::hours(6)).unwrap();
        assert_eq!(after.instant, at(11, 0));
    }
}
