//! Concrete instances of a (possibly recurring) booking.

use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::error::{Result, ScheduleError};
use crate::exception::ExceptionReason;
use crate::interval::TimeInterval;

/// A single concrete occurrence owned by a session or booking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "OccurrenceRecord", into = "OccurrenceRecord")]
pub struct Occurrence {
    /// Identifier of the session/booking this occurrence belongs to.
    pub owner_id: String,
    interval: TimeInterval,
    /// Set when an exception altered this occurrence (only `Reschedule` survives resolution).
    pub exception_reason: Option<ExceptionReason>,
}

/// Flat wire shape: `{owner_id, start, end, exception_reason?}`.
#[derive(Serialize, Deserialize)]
struct OccurrenceRecord {
    owner_id: String,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    exception_reason: Option<ExceptionReason>,
}

impl TryFrom<OccurrenceRecord> for Occurrence {
    type Error = ScheduleError;

    fn try_from(record: OccurrenceRecord) -> Result<Self> {
        Ok(Self {
            owner_id: record.owner_id,
            interval: TimeInterval::new(record.start, record.end)?,
            exception_reason: record.exception_reason,
        })
    }
}

impl From<Occurrence> for OccurrenceRecord {
    fn from(occurrence: Occurrence) -> Self {
        Self {
            owner_id: occurrence.owner_id,
            start: occurrence.interval.start(),
            end: occurrence.interval.end(),
            exception_reason: occurrence.exception_reason,
        }
    }
}

impl Occurrence {
    pub fn new(owner_id: impl Into<String>, interval: TimeInterval) -> Self {
        Self {
            owner_id: owner_id.into(),
            interval,
            exception_reason: None,
        }
    }

    /// Convenience constructor validating the raw instants.
    pub fn between(
        owner_id: impl Into<String>,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Self> {
        Ok(Self::new(owner_id, TimeInterval::new(start, end)?))
    }

    pub fn interval(&self) -> &TimeInterval {
        &self.interval
    }

    pub fn start(&self) -> DateTime<Utc> {
        self.interval.start()
    }

    pub fn end(&self) -> DateTime<Utc> {
        self.interval.end()
    }

    /// The calendar date this occurrence starts on, as seen in `tz`.
    pub fn local_date(&self, tz: Tz) -> NaiveDate {
        self.interval.start().with_timezone(&tz).date_naive()
    }

    pub(crate) fn rescheduled(mut self, interval: TimeInterval) -> Self {
        self.interval = interval;
        self.exception_reason = Some(ExceptionReason::Reschedule);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn serializes_as_flat_record() {
        let occurrence = Occurrence::between(
            "session-1",
            Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2026, 3, 1, 10, 0, 0).unwrap(),
        )
        .unwrap();

        let json = serde_json::to_value(&occurrence).unwrap();
        assert_eq!(json["owner_id"], "session-1");
        assert_eq!(json["start"], "2026-03-01T09:00:00Z");
        assert!(json.get("exception_reason").is_none());

        let back: Occurrence = serde_json::from_value(json).unwrap();
        assert_eq!(back, occurrence);
    }

    #[test]
    fn local_date_follows_timezone() {
        // 03:00 UTC is still the previous evening in Los Angeles.
        let occurrence = Occurrence::between(
            "s",
            Utc.with_ymd_and_hms(2026, 3, 2, 3, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2026, 3, 2, 4, 0, 0).unwrap(),
        )
        .unwrap();
        assert_eq!(
            occurrence.local_date(chrono_tz::America::Los_Angeles),
            NaiveDate::from_ymd_opt(2026, 3, 1).unwrap()
        );
    }
}
