//! Per-date exceptions to a recurring series.
//!
//! An exception is keyed by `(owner_id, exception_date)`, where the date is the
//! calendar date the occurrence was *originally* generated on. Matching is by
//! date, never by instant, so a rescheduled occurrence is still found under its
//! original date.

use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::interval::{DateRange, TimeInterval};
use crate::occurrence::Occurrence;

/// Why an occurrence deviates from its series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExceptionReason {
    Skip,
    Cancel,
    Reschedule,
}

/// An exception recorded against one date of a recurring series.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Exception {
    pub owner_id: String,
    pub exception_date: NaiveDate,
    pub reason: ExceptionReason,
    /// Replacement start; required when `reason` is `Reschedule`.
    #[serde(default)]
    pub rescheduled_start: Option<DateTime<Utc>>,
    /// Replacement end; required when `reason` is `Reschedule`.
    #[serde(default)]
    pub rescheduled_end: Option<DateTime<Utc>>,
}

impl Exception {
    pub fn skip(owner_id: impl Into<String>, date: NaiveDate) -> Self {
        Self::without_replacement(owner_id, date, ExceptionReason::Skip)
    }

    pub fn cancel(owner_id: impl Into<String>, date: NaiveDate) -> Self {
        Self::without_replacement(owner_id, date, ExceptionReason::Cancel)
    }

    pub fn reschedule(
        owner_id: impl Into<String>,
        date: NaiveDate,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Self {
        Self {
            owner_id: owner_id.into(),
            exception_date: date,
            reason: ExceptionReason::Reschedule,
            rescheduled_start: Some(start),
            rescheduled_end: Some(end),
        }
    }

    fn without_replacement(
        owner_id: impl Into<String>,
        date: NaiveDate,
        reason: ExceptionReason,
    ) -> Self {
        Self {
            owner_id: owner_id.into(),
            exception_date: date,
            reason,
            rescheduled_start: None,
            rescheduled_end: None,
        }
    }

    /// The replacement interval of a well-formed reschedule.
    fn replacement(&self) -> Option<TimeInterval> {
        TimeInterval::new(self.rescheduled_start?, self.rescheduled_end?).ok()
    }
}

/// What applying an exception does to an occurrence.
#[derive(Clone, Copy)]
enum Resolution {
    Drop,
    Move(TimeInterval),
}

/// Apply `exceptions` to generated `occurrences`.
///
/// Skipped and cancelled occurrences are removed; rescheduled ones take the
/// replacement instants and are tagged [`ExceptionReason::Reschedule`]. The
/// result only keeps occurrences whose (possibly new) start falls on a date in
/// `window`, with dates taken in `tz`.
///
/// A reschedule without both replacement instants (or with `end <= start`) is
/// invalid and is ignored. When two exceptions share a key the later one wins.
pub fn resolve_exceptions(
    occurrences: Vec<Occurrence>,
    exceptions: &[Exception],
    window: &DateRange,
    tz: Tz,
) -> Vec<Occurrence> {
    let mut lookup: HashMap<(&str, NaiveDate), Resolution> = HashMap::new();
    for exception in exceptions {
        let resolution = match exception.reason {
            ExceptionReason::Skip | ExceptionReason::Cancel => Resolution::Drop,
            ExceptionReason::Reschedule => match exception.replacement() {
                Some(interval) => Resolution::Move(interval),
                None => {
                    tracing::warn!(
                        owner_id = %exception.owner_id,
                        date = %exception.exception_date,
                        "ignoring reschedule exception without a valid replacement window"
                    );
                    continue;
                }
            },
        };
        lookup.insert(
            (exception.owner_id.as_str(), exception.exception_date),
            resolution,
        );
    }

    let generated = occurrences.len();
    let resolved: Vec<Occurrence> = occurrences
        .into_iter()
        .filter_map(|occurrence| {
            let key = (occurrence.owner_id.as_str(), occurrence.local_date(tz));
            match lookup.get(&key).copied() {
                None => Some(occurrence),
                Some(Resolution::Drop) => None,
                Some(Resolution::Move(interval)) => Some(occurrence.rescheduled(interval)),
            }
        })
        .filter(|occurrence| window.contains(occurrence.local_date(tz)))
        .collect();

    tracing::debug!(
        generated,
        resolved = resolved.len(),
        exceptions = exceptions.len(),
        "applied session exceptions"
    );
    resolved
}
