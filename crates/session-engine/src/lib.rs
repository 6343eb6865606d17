//! # session-engine
//!
//! Scheduling core for recurring bookable sessions.
//!
//! Expands recurrence rules into concrete session instants in an explicit
//! timezone, applies per-date exceptions, detects overlaps between candidate
//! and existing bookings, and clusters overlapping sessions for layout. All
//! operations are pure, synchronous computations over values.
//!
//! ## Modules
//!
//! - [`overlap`] — Sweep-line interval overlap detection
//! - [`rule`] — Recurrence rule decoding (rule text or structured record)
//! - [`expander`] — Session window + rule → list of concrete intervals
//! - [`dst`] — DST gap policies for wall-clock → instant conversion
//! - [`exception`] — Skip / cancel / reschedule exceptions
//! - [`series`] — Long-lived recurring series rendered over a date range
//! - [`grouping`] — Overlap clusters for side-by-side rendering
//! - [`conflict`] — Candidate vs. existing booking conflict reports
//! - [`config`] — Expansion bounds and policies
//! - [`error`] — Error types

pub mod config;
pub mod conflict;
pub mod dst;
pub mod error;
pub mod exception;
pub mod expander;
pub mod grouping;
pub mod interval;
pub mod occurrence;
pub mod overlap;
pub mod rule;
pub mod series;

pub use config::ExpansionConfig;
pub use conflict::{check_conflicts, Conflict, ConflictReport};
pub use dst::DstPolicy;
pub use error::ScheduleError;
pub use exception::{resolve_exceptions, Exception, ExceptionReason};
pub use expander::{expand, expand_recurrence, ExpansionParams};
pub use grouping::{group_overlaps, group_overlaps_by_day};
pub use interval::{DateRange, TimeInterval};
pub use occurrence::Occurrence;
pub use overlap::{find_overlaps, has_any_overlap};
pub use rule::{validate_rule, Frequency, RecurrenceRule, RecurrenceSpec, StructuredRule};
pub use series::RecurringSeries;

/// Parse an IANA timezone name such as `"America/New_York"`.
///
/// # Errors
/// Returns `ScheduleError::InvalidTimezone` for unknown names.
pub fn parse_timezone(name: &str) -> error::Result<chrono_tz::Tz> {
    name.parse()
        .map_err(|_| ScheduleError::InvalidTimezone(name.to_string()))
}
