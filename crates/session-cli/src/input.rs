//! JSON documents accepted by the subcommands.

use anyhow::{Context, Result};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use chrono_tz::Tz;
use serde::Deserialize;
use session_engine::{
    DateRange, Exception, ExpansionParams, Occurrence, RecurrenceSpec, RecurringSeries,
};

/// `sessions expand` input.
#[derive(Debug, Deserialize)]
pub struct ExpandInput {
    pub owner_id: String,
    /// Local start of the first session, e.g. `"2023-01-16T10:00:00"`.
    pub start: NaiveDateTime,
    /// Local end time of day, e.g. `"11:00:00"`.
    pub end_time: NaiveTime,
    pub timezone: String,
    /// Rule text shorthand for `{"recurrence": {"rule_expr": ...}}`.
    #[serde(default)]
    pub rule: Option<String>,
    #[serde(default)]
    pub recurrence: Option<RecurrenceSpec>,
    #[serde(default)]
    pub lower_bound: Option<NaiveDate>,
    #[serde(default)]
    pub upper_bound: Option<NaiveDate>,
}

impl ExpandInput {
    pub fn to_params(&self) -> Result<ExpansionParams> {
        let tz = parse_tz(&self.timezone)?;
        let mut params = ExpansionParams::new(self.start, self.end_time, tz)
            .context("Invalid session window")?;

        let recurrence = match (&self.recurrence, &self.rule) {
            (Some(spec), None) => Some(spec.clone()),
            (None, Some(rule)) => Some(RecurrenceSpec::RuleExpr(rule.clone())),
            (None, None) => None,
            (Some(_), Some(_)) => anyhow::bail!("Use either 'rule' or 'recurrence', not both"),
        };
        if let Some(spec) = recurrence {
            params = params.with_recurrence(spec);
        }

        let lower = self.lower_bound.unwrap_or_else(|| self.start.date());
        Ok(params.with_bounds(lower, self.upper_bound))
    }
}

/// `sessions check` input.
#[derive(Debug, Deserialize)]
pub struct CheckInput {
    pub candidates: Vec<Occurrence>,
    #[serde(default)]
    pub existing: Vec<Occurrence>,
}

/// `sessions resolve` input.
#[derive(Debug, Deserialize)]
pub struct ResolveInput {
    pub occurrences: Vec<Occurrence>,
    #[serde(default)]
    pub exceptions: Vec<Exception>,
    pub window: DateRange,
    pub timezone: String,
}

/// `sessions series` input.
#[derive(Debug, Deserialize)]
pub struct SeriesInput {
    pub series: RecurringSeries,
    #[serde(default)]
    pub exceptions: Vec<Exception>,
    pub window: DateRange,
    pub timezone: String,
}

pub fn parse_tz(name: &str) -> Result<Tz> {
    session_engine::parse_timezone(name).with_context(|| format!("Unknown timezone: {}", name))
}
