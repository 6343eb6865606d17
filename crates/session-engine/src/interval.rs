//! Closed-open time intervals and inclusive calendar date ranges.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Result, ScheduleError};

/// A `[start, end)` span of absolute time.
///
/// The constructor guarantees `start < end`; zero-length and inverted intervals
/// never reach the overlap detector or the grouper.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "IntervalRecord")]
pub struct TimeInterval {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

#[derive(Deserialize)]
struct IntervalRecord {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl TryFrom<IntervalRecord> for TimeInterval {
    type Error = ScheduleError;

    fn try_from(record: IntervalRecord) -> Result<Self> {
        TimeInterval::new(record.start, record.end)
    }
}

impl TimeInterval {
    /// Build an interval, rejecting `end <= start`.
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self> {
        if end <= start {
            return Err(ScheduleError::InvalidInterval { start, end });
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    pub fn end(&self) -> DateTime<Utc> {
        self.end
    }

    pub fn duration_minutes(&self) -> i64 {
        (self.end - self.start).num_minutes()
    }

    /// Strict overlap: intervals that only touch (`a.end == b.start`) do not overlap.
    pub fn overlaps(&self, other: &TimeInterval) -> bool {
        self.start < other.end && other.start < self.end
    }

    /// Minutes shared by both intervals, zero when they do not overlap.
    pub fn overlap_minutes(&self, other: &TimeInterval) -> i64 {
        let start = self.start.max(other.start);
        let end = self.end.min(other.end);
        if start < end {
            (end - start).num_minutes()
        } else {
            0
        }
    }
}

/// An inclusive `[start, end]` range of calendar dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    pub fn is_empty(&self) -> bool {
        self.end < self.start
    }
}
