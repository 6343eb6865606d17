//! Recurrence rule decoding and evaluation.
//!
//! Sessions recur either from an RFC 5545 rule expression typed by a user
//! (`FREQ=WEEKLY;BYDAY=MO,WE,FR`) or from a structured `{frequency, interval,
//! days_of_week}` record stored with a long-lived series. Both decode into a
//! [`RecurrenceRule`], which is evaluated by the `rrule` crate.
//!
//! Rules are evaluated in wall-clock space: the `rrule` engine sees the local
//! anchor as if it were UTC and only the resulting calendar dates are used.
//! Conversion to absolute instants happens afterwards in [`crate::dst`].

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate, NaiveDateTime, Utc, Weekday};
use rrule::RRuleSet;
use serde::{Deserialize, Serialize};

use crate::error::{Result, ScheduleError};

/// How often a rule repeats. Sub-daily frequencies are not supported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Frequency {
    Daily,
    Weekly,
    Monthly,
    Yearly,
}

impl Frequency {
    fn as_rrule(self) -> &'static str {
        match self {
            Frequency::Daily => "DAILY",
            Frequency::Weekly => "WEEKLY",
            Frequency::Monthly => "MONTHLY",
            Frequency::Yearly => "YEARLY",
        }
    }
}

impl FromStr for Frequency {
    type Err = ScheduleError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "DAILY" => Ok(Frequency::Daily),
            "WEEKLY" => Ok(Frequency::Weekly),
            "MONTHLY" => Ok(Frequency::Monthly),
            "YEARLY" => Ok(Frequency::Yearly),
            "HOURLY" | "MINUTELY" | "SECONDLY" => {
                Err(ScheduleError::UnsupportedFrequency(s.to_string()))
            }
            other => Err(ScheduleError::InvalidRule(format!(
                "unknown FREQ value '{}'",
                other
            ))),
        }
    }
}

/// The structured recurrence record stored with long-lived series.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructuredRule {
    pub frequency: Frequency,
    #[serde(default = "default_interval")]
    pub interval: u32,
    #[serde(default)]
    pub days_of_week: Vec<Weekday>,
}

fn default_interval() -> u32 {
    1
}

/// Either recurrence mechanism, expanded through one entry point.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecurrenceSpec {
    /// RFC 5545 rule text, optionally with a `DTSTART` line.
    RuleExpr(String),
    Structured(StructuredRule),
}

impl RecurrenceSpec {
    pub fn decode(&self) -> Result<RecurrenceRule> {
        match self {
            RecurrenceSpec::RuleExpr(expr) => expr.parse(),
            RecurrenceSpec::Structured(rule) => rule.to_rule(),
        }
    }
}

impl StructuredRule {
    pub fn to_rule(&self) -> Result<RecurrenceRule> {
        if self.interval == 0 {
            return Err(ScheduleError::InvalidRule(
                "INTERVAL must be at least 1".to_string(),
            ));
        }

        let mut days = self.days_of_week.clone();
        days.sort_by_key(|d| d.num_days_from_monday());
        days.dedup();

        let mut parts = vec![("FREQ".to_string(), self.frequency.as_rrule().to_string())];
        if self.interval > 1 {
            parts.push(("INTERVAL".to_string(), self.interval.to_string()));
        }
        if !days.is_empty() {
            let codes: Vec<&str> = days.iter().map(|d| weekday_code(*d)).collect();
            parts.push(("BYDAY".to_string(), codes.join(",")));
        }

        Ok(RecurrenceRule {
            anchor_date: None,
            frequency: self.frequency,
            interval: self.interval,
            by_weekday: days,
            count: None,
            until: None,
            parts,
        })
    }
}

/// Decoded view of a recurrence rule.
///
/// `parts` keeps every `KEY=VALUE` pair of the rule body except `UNTIL`, which is
/// applied as a date bound by the expander instead of being handed to the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecurrenceRule {
    /// Date of the `DTSTART` line, when the expression carried one.
    pub anchor_date: Option<NaiveDate>,
    pub frequency: Frequency,
    pub interval: u32,
    /// Weekdays named in `BYDAY`, ordinals stripped.
    pub by_weekday: Vec<Weekday>,
    pub count: Option<u32>,
    /// Calendar date of `UNTIL` (inclusive).
    pub until: Option<NaiveDate>,
    parts: Vec<(String, String)>,
}

impl FromStr for RecurrenceRule {
    type Err = ScheduleError;

    fn from_str(text: &str) -> Result<Self> {
        let mut anchor_date = None;
        let mut body: Option<&str> = None;

        for line in text.lines().map(str::trim).filter(|l| !l.is_empty()) {
            let upper = line.to_ascii_uppercase();
            let rule_line = if upper.starts_with("DTSTART") {
                anchor_date = Some(parse_dtstart(line)?);
                continue;
            } else if upper.starts_with("RRULE:") {
                &line["RRULE:".len()..]
            } else if upper.starts_with("FREQ=") || upper.contains(";FREQ=") {
                line
            } else {
                return Err(ScheduleError::InvalidRule(format!(
                    "unsupported line '{}'",
                    line
                )));
            };

            if body.replace(rule_line).is_some() {
                return Err(ScheduleError::InvalidRule(
                    "more than one RRULE line".to_string(),
                ));
            }
        }

        let body = body.ok_or_else(|| ScheduleError::InvalidRule("missing RRULE".to_string()))?;
        let mut rule = parse_body(body)?;
        rule.anchor_date = anchor_date;
        Ok(rule)
    }
}

fn parse_body(body: &str) -> Result<RecurrenceRule> {
    let mut frequency = None;
    let mut interval = 1;
    let mut by_weekday = Vec::new();
    let mut count = None;
    let mut until = None;
    let mut parts: Vec<(String, String)> = Vec::new();
    let mut seen: Vec<String> = Vec::new();

    for part in body.split(';').map(str::trim).filter(|p| !p.is_empty()) {
        let (key, value) = part
            .split_once('=')
            .ok_or_else(|| ScheduleError::InvalidRule(format!("malformed part '{}'", part)))?;
        let key = key.trim().to_ascii_uppercase();
        let value = value.trim().to_ascii_uppercase();

        if seen.contains(&key) {
            return Err(ScheduleError::InvalidRule(format!("duplicate {}", key)));
        }
        seen.push(key.clone());

        match key.as_str() {
            "FREQ" => frequency = Some(value.parse::<Frequency>()?),
            "INTERVAL" => {
                interval = parse_number(&key, &value)?;
                if interval == 0 {
                    return Err(ScheduleError::InvalidRule(
                        "INTERVAL must be at least 1".to_string(),
                    ));
                }
            }
            "COUNT" => count = Some(parse_number(&key, &value)?),
            "UNTIL" => {
                until = Some(parse_ical_date(&value)?);
                continue;
            }
            "BYDAY" => {
                by_weekday = value
                    .split(',')
                    .map(parse_byday)
                    .collect::<Result<Vec<_>>>()?;
            }
            _ => {}
        }
        parts.push((key, value));
    }

    let frequency =
        frequency.ok_or_else(|| ScheduleError::InvalidRule("missing FREQ".to_string()))?;
    if count.is_some() && until.is_some() {
        return Err(ScheduleError::InvalidRule(
            "COUNT and UNTIL are mutually exclusive".to_string(),
        ));
    }

    Ok(RecurrenceRule {
        anchor_date: None,
        frequency,
        interval,
        by_weekday,
        count,
        until,
        parts,
    })
}

impl RecurrenceRule {
    fn has_part(&self, key: &str) -> bool {
        self.parts.iter().any(|(k, _)| k == key)
    }

    /// The rule body handed to the engine (`UNTIL` excluded).
    pub fn body(&self) -> String {
        self.parts
            .iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect::<Vec<_>>()
            .join(";")
    }

    /// Pin the weekday / day-of-month / month that a rule otherwise derives from
    /// its `DTSTART`, so that moving the start date does not move the pattern.
    pub(crate) fn pinned_to(&self, anchor: NaiveDate) -> RecurrenceRule {
        let mut rule = self.clone();
        let has_by_date = ["BYDAY", "BYMONTHDAY", "BYYEARDAY", "BYWEEKNO"]
            .iter()
            .any(|k| self.has_part(k));

        match self.frequency {
            Frequency::Daily => {}
            Frequency::Weekly => {
                if !self.has_part("BYDAY") {
                    rule.parts.push((
                        "BYDAY".to_string(),
                        weekday_code(anchor.weekday()).to_string(),
                    ));
                    rule.by_weekday = vec![anchor.weekday()];
                }
            }
            Frequency::Monthly => {
                if !has_by_date {
                    rule.parts
                        .push(("BYMONTHDAY".to_string(), anchor.day().to_string()));
                }
            }
            Frequency::Yearly => {
                if !has_by_date && !self.has_part("BYMONTH") {
                    rule.parts
                        .push(("BYMONTH".to_string(), anchor.month().to_string()));
                    rule.parts
                        .push(("BYMONTHDAY".to_string(), anchor.day().to_string()));
                }
            }
        }
        rule
    }

    /// Enumerate occurrence dates starting at `dtstart`, through `until`
    /// (inclusive) when given, capped at `limit` instances.
    pub(crate) fn occurrence_dates(
        &self,
        dtstart: NaiveDateTime,
        until: Option<NaiveDate>,
        limit: u16,
    ) -> Result<Vec<NaiveDate>> {
        let mut body = self.body();
        if let Some(until) = until {
            body.push_str(&format!(";UNTIL={}T235959Z", until.format("%Y%m%d")));
        }
        let text = format!(
            "DTSTART:{}Z\nRRULE:{}",
            dtstart.format("%Y%m%dT%H%M%S"),
            body
        );

        let rrule_set: RRuleSet = text
            .parse()
            .map_err(|e| ScheduleError::InvalidRule(format!("{}", e)))?;

        let result = rrule_set.all(limit.max(1));
        if result.limited {
            tracing::warn!(
                rule = %body,
                limit,
                "recurrence enumeration hit the instance limit"
            );
        }

        Ok(result
            .dates
            .into_iter()
            .map(|dt| dt.with_timezone(&Utc).date_naive())
            .collect())
    }
}

impl fmt::Display for RecurrenceRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.body())?;
        if let Some(until) = self.until {
            write!(f, ";UNTIL={}", until.format("%Y%m%d"))?;
        }
        Ok(())
    }
}

/// Decode and trial-evaluate a user supplied rule expression.
///
/// Expansion itself fails closed; callers that need to show the user why a rule
/// is rejected run this first.
pub fn validate_rule(expr: &str) -> Result<RecurrenceRule> {
    let rule: RecurrenceRule = expr.parse()?;
    let probe = rule
        .anchor_date
        .unwrap_or_else(|| NaiveDate::from_ymd_opt(2000, 1, 1).unwrap_or_default());
    rule.occurrence_dates(probe.and_time(chrono::NaiveTime::MIN), None, 1)?;
    Ok(rule)
}

fn parse_number(key: &str, value: &str) -> Result<u32> {
    value
        .parse()
        .map_err(|_| ScheduleError::InvalidRule(format!("{} must be a number, got '{}'", key, value)))
}

/// Accepts `YYYYMMDD`, `YYYYMMDDTHHMMSS` and `YYYYMMDDTHHMMSSZ`; only the date is kept.
fn parse_ical_date(value: &str) -> Result<NaiveDate> {
    let date = value.get(..8).unwrap_or(value);
    NaiveDate::parse_from_str(date, "%Y%m%d")
        .map_err(|_| ScheduleError::InvalidRule(format!("invalid date '{}'", value)))
}

/// `DTSTART:20230116T100000Z` or `DTSTART;TZID=Europe/Paris:20230116T100000`.
fn parse_dtstart(line: &str) -> Result<NaiveDate> {
    let value = line
        .rsplit_once(':')
        .map(|(_, v)| v.trim())
        .ok_or_else(|| ScheduleError::InvalidRule(format!("malformed DTSTART '{}'", line)))?;
    parse_ical_date(value)
}

fn parse_byday(token: &str) -> Result<Weekday> {
    let token = token.trim();
    if !token.is_ascii() {
        return Err(ScheduleError::InvalidRule(format!("invalid BYDAY '{}'", token)));
    }
    let split = token.len().saturating_sub(2);
    let (ordinal, code) = token.split_at(split);
    if !ordinal.is_empty() && ordinal.parse::<i16>().is_err() {
        return Err(ScheduleError::InvalidRule(format!("invalid BYDAY '{}'", token)));
    }
    match code {
        "MO" => Ok(Weekday::Mon),
        "TU" => Ok(Weekday::Tue),
        "WE" => Ok(Weekday::Wed),
        "TH" => Ok(Weekday::Thu),
        "FR" => Ok(Weekday::Fri),
        "SA" => Ok(Weekday::Sat),
        "SU" => Ok(Weekday::Sun),
        _ => Err(ScheduleError::InvalidRule(format!("invalid BYDAY '{}'", token))),
    }
}

fn weekday_code(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "MO",
        Weekday::Tue => "TU",
        Weekday::Wed => "WE",
        Weekday::Thu => "TH",
        Weekday::Fri => "FR",
        Weekday::Sat => "SA",
        Weekday::Sun => "SU",
    }
}
