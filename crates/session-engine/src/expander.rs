//! Recurrence expansion -- turns a session window plus an optional recurrence
//! rule into concrete start/end instants.
//!
//! Two bounds apply at once: the rule's own `COUNT`/`UNTIL`, and the caller's
//! date window (a container's active range, or a default lookahead ceiling when
//! the caller has none). The earlier end wins.
//!
//! Every occurrence keeps the anchor's wall-clock start time in the session's
//! timezone and lasts exactly the anchor window's duration. Across a DST change
//! the UTC start moves by the offset difference while the length stays fixed.

use chrono::{DateTime, Datelike, Duration, Months, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use chrono_tz::Tz;

use crate::config::ExpansionConfig;
use crate::dst;
use crate::error::{Result, ScheduleError};
use crate::interval::TimeInterval;
use crate::occurrence::Occurrence;
use crate::rule::{Frequency, RecurrenceRule, RecurrenceSpec};

/// Input to [`expand`].
#[derive(Debug, Clone, PartialEq)]
pub struct ExpansionParams {
    anchor_start: NaiveDateTime,
    anchor_end: NaiveTime,
    timezone: Tz,
    recurrence: Option<RecurrenceSpec>,
    lower_bound: NaiveDate,
    upper_bound: Option<NaiveDate>,
}

impl ExpansionParams {
    /// A single session from `anchor_start` until `anchor_end` on the same day,
    /// in wall-clock time of `timezone`.
    ///
    /// # Errors
    /// Returns `ScheduleError::InvalidTimeWindow` unless `anchor_end` is after
    /// the time of day of `anchor_start`.
    pub fn new(anchor_start: NaiveDateTime, anchor_end: NaiveTime, timezone: Tz) -> Result<Self> {
        if anchor_end <= anchor_start.time() {
            return Err(ScheduleError::InvalidTimeWindow {
                start: anchor_start,
                end: anchor_end,
            });
        }
        Ok(Self {
            anchor_start,
            anchor_end,
            timezone,
            recurrence: None,
            lower_bound: anchor_start.date(),
            upper_bound: None,
        })
    }

    pub fn with_recurrence(mut self, recurrence: RecurrenceSpec) -> Self {
        self.recurrence = Some(recurrence);
        self
    }

    /// Shorthand for a rule-expression recurrence.
    pub fn with_rule(self, expr: impl Into<String>) -> Self {
        self.with_recurrence(RecurrenceSpec::RuleExpr(expr.into()))
    }

    /// Restrict expansion to `lower..=upper`. Without an upper bound the
    /// configured lookahead ceiling applies.
    pub fn with_bounds(mut self, lower: NaiveDate, upper: Option<NaiveDate>) -> Self {
        self.lower_bound = lower;
        self.upper_bound = upper;
        self
    }

    pub fn timezone(&self) -> Tz {
        self.timezone
    }

    pub fn anchor_date(&self) -> NaiveDate {
        self.anchor_start.date()
    }

    pub fn recurrence(&self) -> Option<&RecurrenceSpec> {
        self.recurrence.as_ref()
    }

    /// Length of every occurrence, computed once from the anchor window.
    pub fn duration(&self) -> Duration {
        self.anchor_end - self.anchor_start.time()
    }
}

/// Expand `params` into concrete intervals, sorted by start.
///
/// Fails closed: a rule that cannot be decoded or evaluated produces an empty
/// sequence (logged at `warn`). Use [`crate::rule::validate_rule`] beforehand to
/// report rule errors to a user.
pub fn expand(params: &ExpansionParams, config: &ExpansionConfig) -> Vec<TimeInterval> {
    let dates = match &params.recurrence {
        None => vec![params.anchor_date()],
        Some(spec) => match spec.decode().and_then(|rule| rule_dates(params, &rule, config)) {
            Ok(dates) => dates,
            Err(err) => {
                tracing::warn!(error = %err, "recurrence expansion failed, no occurrences produced");
                return Vec::new();
            }
        },
    };

    let time_of_day = params.anchor_start.time();
    let duration = params.duration();

    let intervals: Vec<TimeInterval> = dates
        .into_iter()
        .filter_map(|date| {
            let start: DateTime<Utc> =
                dst::resolve_local(params.timezone, date.and_time(time_of_day), config.dst_policy)?;
            TimeInterval::new(start, start + duration).ok()
        })
        .collect();

    tracing::debug!(
        occurrences = intervals.len(),
        timezone = %params.timezone,
        "expanded session window"
    );
    intervals
}

/// Expand `params` into occurrences owned by `owner_id`.
pub fn expand_recurrence(
    owner_id: &str,
    params: &ExpansionParams,
    config: &ExpansionConfig,
) -> Vec<Occurrence> {
    expand(params, config)
        .into_iter()
        .map(|interval| Occurrence::new(owner_id, interval))
        .collect()
}

/// Calendar dates produced by `rule` within the parameters' bounds.
fn rule_dates(
    params: &ExpansionParams,
    rule: &RecurrenceRule,
    config: &ExpansionConfig,
) -> Result<Vec<NaiveDate>> {
    let anchor = rule.anchor_date.unwrap_or_else(|| params.anchor_date());
    let time_of_day = params.anchor_start.time();
    let lower = params.lower_bound;

    // COUNT rules are anchor-relative: generate the whole series, then window it.
    if rule.count.is_some() {
        let dates = rule.occurrence_dates(anchor.and_time(time_of_day), None, config.max_instances)?;
        return Ok(dates
            .into_iter()
            .filter(|d| *d >= lower && params.upper_bound.map_or(true, |upper| *d <= upper))
            .collect());
    }

    let ceiling = params
        .upper_bound
        .unwrap_or_else(|| default_ceiling(anchor, config.default_lookahead_months));
    let end = rule.until.map_or(ceiling, |until| until.min(ceiling));
    if end < lower {
        return Ok(Vec::new());
    }

    let start = phase_start(rule, anchor, lower);
    let dates = rule.pinned_to(anchor).occurrence_dates(
        start.and_time(time_of_day),
        Some(end),
        config.max_instances,
    )?;
    Ok(dates.into_iter().filter(|d| *d >= lower).collect())
}

/// The latest date on or before `lower` that starts a period in step with
/// `anchor`, so that `INTERVAL` counts periods from the anchor whatever the
/// window is.
fn phase_start(rule: &RecurrenceRule, anchor: NaiveDate, lower: NaiveDate) -> NaiveDate {
    let interval = i64::from(rule.interval.max(1));
    match rule.frequency {
        Frequency::Daily | Frequency::Weekly => {
            let period = match rule.frequency {
                Frequency::Daily => interval,
                _ => 7 * interval,
            };
            let offset = (lower - anchor).num_days().div_euclid(period) * period;
            anchor
                .checked_add_signed(Duration::days(offset))
                .unwrap_or(lower)
        }
        Frequency::Monthly => {
            let month_index = |d: NaiveDate| i64::from(d.year()) * 12 + i64::from(d.month0());
            let from = month_index(anchor);
            let aligned = from + (month_index(lower) - from).div_euclid(interval) * interval;
            first_of_month(aligned.div_euclid(12), aligned.rem_euclid(12)).unwrap_or(lower)
        }
        Frequency::Yearly => {
            let from = i64::from(anchor.year());
            let aligned = from + (i64::from(lower.year()) - from).div_euclid(interval) * interval;
            first_of_month(aligned, 0).unwrap_or(lower)
        }
    }
}

fn first_of_month(year: i64, month0: i64) -> Option<NaiveDate> {
    let year = i32::try_from(year).ok()?;
    let month = u32::try_from(month0).ok()? + 1;
    NaiveDate::from_ymd_opt(year, month, 1)
}

fn default_ceiling(anchor: NaiveDate, months: u32) -> NaiveDate {
    anchor
        .checked_add_months(Months::new(months))
        .unwrap_or(NaiveDate::MAX)
}
