//! Check candidate sessions against existing bookings.
//!
//! Candidates and existing bookings are swept together by
//! [`crate::overlap::find_overlaps`]. Adjacent sessions (where one ends exactly
//! when another starts) are NOT conflicts. A conflict is an ordinary outcome
//! reported to the caller, never an error.

use serde::{Deserialize, Serialize};

use crate::interval::TimeInterval;
use crate::occurrence::Occurrence;
use crate::overlap;

/// A detected conflict between two occurrences.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Conflict {
    /// Always one of the candidates.
    pub first: Occurrence,
    /// Another candidate or an existing booking.
    pub second: Occurrence,
    pub overlap_minutes: i64,
}

/// Outcome of a conflict check. `success` is false when any conflict exists.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConflictReport {
    pub success: bool,
    pub conflicting_pairs: Vec<Conflict>,
}

impl ConflictReport {
    pub fn is_clear(&self) -> bool {
        self.success
    }
}

/// Find every conflict involving at least one candidate.
///
/// Overlaps among `existing` alone are already persisted and are not reported.
/// Intended to be called inside the caller's write transaction so that reading
/// bookings, checking and inserting happen atomically.
pub fn check_conflicts(candidates: &[Occurrence], existing: &[Occurrence]) -> ConflictReport {
    let all: Vec<&Occurrence> = candidates.iter().chain(existing.iter()).collect();
    let intervals: Vec<TimeInterval> = all.iter().map(|o| *o.interval()).collect();

    // Pairs are (i, j) with i < j, so i is a candidate whenever either side is.
    let conflicting_pairs: Vec<Conflict> = overlap::find_overlaps(&intervals)
        .into_iter()
        .filter(|&(i, _)| i < candidates.len())
        .map(|(i, j)| Conflict {
            first: all[i].clone(),
            second: all[j].clone(),
            overlap_minutes: intervals[i].overlap_minutes(&intervals[j]),
        })
        .collect();

    tracing::debug!(
        candidates = candidates.len(),
        existing = existing.len(),
        conflicts = conflicting_pairs.len(),
        "checked booking conflicts"
    );

    ConflictReport {
        success: conflicting_pairs.is_empty(),
        conflicting_pairs,
    }
}
