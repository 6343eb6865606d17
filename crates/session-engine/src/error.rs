//! Error types for session-engine operations.

use chrono::{DateTime, NaiveDateTime, NaiveTime, Utc};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ScheduleError {
    #[error("Invalid recurrence rule: {0}")]
    InvalidRule(String),

    #[error("Unsupported recurrence frequency: {0}")]
    UnsupportedFrequency(String),

    #[error("Invalid timezone: {0}")]
    InvalidTimezone(String),

    /// An interval whose end does not come strictly after its start.
    #[error("Invalid interval: end {end} is not after start {start}")]
    InvalidInterval {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },

    /// A session window whose end time of day does not come after its start.
    #[error("Invalid session window: {end} is not after {start}")]
    InvalidTimeWindow { start: NaiveDateTime, end: NaiveTime },
}

pub type Result<T> = std::result::Result<T, ScheduleError>;
