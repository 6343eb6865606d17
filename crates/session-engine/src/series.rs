//! Long-lived recurring series rendered over a date range.
//!
//! A series stores a structured rule rather than rule text and supports
//! per-date exceptions. Materializing a range expands the rule, then resolves
//! the series' exceptions against that range.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::config::ExpansionConfig;
use crate::error::Result;
use crate::exception::{resolve_exceptions, Exception};
use crate::expander::{expand_recurrence, ExpansionParams};
use crate::interval::DateRange;
use crate::occurrence::Occurrence;
use crate::rule::{RecurrenceSpec, StructuredRule};

/// A recurring session that lives until `active_until` (or indefinitely).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecurringSeries {
    pub owner_id: String,
    /// First session's local start; its time of day applies to every date.
    pub anchor_start: NaiveDateTime,
    pub anchor_end: NaiveTime,
    pub rule: StructuredRule,
    #[serde(default)]
    pub active_until: Option<NaiveDate>,
}

impl RecurringSeries {
    /// Occurrences of this series whose dates fall in `range`, after exceptions.
    ///
    /// Nothing is produced before the series' first date or after
    /// `active_until`, even if `range` extends past them.
    ///
    /// # Errors
    /// Returns `ScheduleError::InvalidTimeWindow` if the series' time window is
    /// empty or inverted.
    pub fn occurrences(
        &self,
        range: &DateRange,
        exceptions: &[Exception],
        tz: Tz,
        config: &ExpansionConfig,
    ) -> Result<Vec<Occurrence>> {
        let lower = range.start.max(self.anchor_start.date());
        let upper = self
            .active_until
            .map_or(range.end, |until| until.min(range.end));
        if upper < lower {
            return Ok(Vec::new());
        }

        let params = ExpansionParams::new(self.anchor_start, self.anchor_end, tz)?
            .with_recurrence(RecurrenceSpec::Structured(self.rule.clone()))
            .with_bounds(lower, Some(upper));

        let generated = expand_recurrence(&self.owner_id, &params, config);
        Ok(resolve_exceptions(generated, exceptions, range, tz))
    }
}
