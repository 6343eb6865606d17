//! DST transition policies for recurring sessions.
//!
//! A session keeps its wall-clock start time on every date. Local times that
//! fall into a fall-back overlap resolve to the earlier instant; local times
//! inside a spring-forward gap are handled per [`DstPolicy`].

use chrono::{DateTime, Duration, LocalResult, NaiveDateTime, Offset, TimeZone, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

/// Longest gap searched when shifting forward out of a DST gap.
const MAX_GAP_MINUTES: i64 = 3 * 60;

/// Policy for handling sessions that start inside a DST gap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DstPolicy {
    /// Skip instances that fall in the DST gap (e.g., 2:30 AM during spring forward)
    Skip,
    /// Shift to the first valid instant after the gap (the transition itself)
    ShiftForward,
    /// Keep the nominal wall-clock time using the offset in force before the gap
    #[default]
    WallClock,
}

/// Convert a local wall-clock time in `tz` to an absolute instant.
///
/// Returns `None` only when the time is in a gap and the policy is `Skip`.
pub fn resolve_local(tz: Tz, local: NaiveDateTime, policy: DstPolicy) -> Option<DateTime<Utc>> {
    match tz.from_local_datetime(&local) {
        LocalResult::Single(dt) => Some(dt.with_timezone(&Utc)),
        LocalResult::Ambiguous(earliest, _) => Some(earliest.with_timezone(&Utc)),
        LocalResult::None => resolve_gap(tz, local, policy),
    }
}

fn resolve_gap(tz: Tz, local: NaiveDateTime, policy: DstPolicy) -> Option<DateTime<Utc>> {
    if policy == DstPolicy::Skip {
        return None;
    }

    let transition = (1..=MAX_GAP_MINUTES).find_map(|m| {
        tz.from_local_datetime(&(local + Duration::minutes(m)))
            .earliest()
            .map(|dt| dt.with_timezone(&Utc))
    })?;

    match policy {
        DstPolicy::ShiftForward => Some(transition),
        _ => {
            let before = tz
                .offset_from_utc_datetime(&(transition - Duration::seconds(1)).naive_utc())
                .fix();
            let utc = local - Duration::seconds(i64::from(before.local_minus_utc()));
            Some(Utc.from_utc_datetime(&utc))
        }
    }
}
