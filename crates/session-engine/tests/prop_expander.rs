//! Property-based tests for session expansion using proptest.
//!
//! These tests verify invariants that should hold for *any* valid rule and
//! session window, not just the specific examples in `expander_tests.rs`.

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use proptest::prelude::*;
use session_engine::{expand, ExpansionConfig, ExpansionParams};

// ---------------------------------------------------------------------------
// Strategies — generate valid rule components and session windows
// ---------------------------------------------------------------------------

fn arb_freq() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("DAILY".to_string()),
        Just("WEEKLY".to_string()),
        Just("MONTHLY".to_string()),
        Just("YEARLY".to_string()),
    ]
}

fn arb_interval() -> impl Strategy<Value = u32> {
    1u32..=4
}

fn arb_timezone() -> impl Strategy<Value = chrono_tz::Tz> {
    prop_oneof![
        Just(chrono_tz::UTC),
        Just(chrono_tz::America::New_York),
        Just(chrono_tz::America::Los_Angeles),
        Just(chrono_tz::Europe::London),
        Just(chrono_tz::Asia::Tokyo),
    ]
}

/// A local anchor in the 2025-2027 range. Day is capped at 28 to avoid
/// invalid month/day combos.
fn arb_anchor() -> impl Strategy<Value = NaiveDateTime> {
    (2025i32..=2027, 1u32..=12, 1u32..=28, 0u32..=21, 0u32..=59).prop_map(|(y, m, d, h, min)| {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, 0)
            .unwrap()
    })
}

/// Session length in the 15-120 minute range.
fn arb_duration() -> impl Strategy<Value = i64> {
    15i64..=120
}

fn arb_window_days() -> impl Strategy<Value = i64> {
    0i64..=200
}

fn config() -> ProptestConfig {
    ProptestConfig {
        cases: 128,
        ..ProptestConfig::default()
    }
}

fn params(
    anchor: NaiveDateTime,
    duration: i64,
    tz: chrono_tz::Tz,
    rule: String,
    window_days: i64,
) -> ExpansionParams {
    let end: NaiveTime = anchor.time() + Duration::minutes(duration);
    let lower = anchor.date();
    ExpansionParams::new(anchor, end, tz)
        .unwrap()
        .with_rule(rule)
        .with_bounds(lower, Some(lower + Duration::days(window_days)))
}

// ---------------------------------------------------------------------------
// Property 1: Every occurrence has the same absolute duration
// ---------------------------------------------------------------------------
proptest! {
    #![proptest_config(config())]

    #[test]
    fn duration_is_uniform(
        freq in arb_freq(),
        interval in arb_interval(),
        anchor in arb_anchor(),
        tz in arb_timezone(),
        dur in arb_duration(),
        days in arb_window_days(),
    ) {
        let rule = format!("FREQ={};INTERVAL={}", freq, interval);
        let result = expand(&params(anchor, dur, tz, rule, days), &ExpansionConfig::default());

        for interval in &result {
            prop_assert_eq!(interval.end() - interval.start(), Duration::minutes(dur));
        }
    }
}

// ---------------------------------------------------------------------------
// Property 2: Result is strictly increasing (sorted, no duplicates)
// ---------------------------------------------------------------------------
proptest! {
    #![proptest_config(config())]

    #[test]
    fn expansion_is_strictly_increasing(
        freq in arb_freq(),
        interval in arb_interval(),
        anchor in arb_anchor(),
        tz in arb_timezone(),
        dur in arb_duration(),
        days in arb_window_days(),
    ) {
        let rule = format!("FREQ={};INTERVAL={}", freq, interval);
        let result = expand(&params(anchor, dur, tz, rule, days), &ExpansionConfig::default());

        for window in result.windows(2) {
            prop_assert!(
                window[0].start() < window[1].start(),
                "events not strictly increasing: {:?} >= {:?}",
                window[0].start(),
                window[1].start()
            );
        }
    }
}

// ---------------------------------------------------------------------------
// Property 3: Every occurrence's local date lies within the bounds
// ---------------------------------------------------------------------------
proptest! {
    #![proptest_config(config())]

    #[test]
    fn occurrences_stay_within_bounds(
        freq in arb_freq(),
        interval in arb_interval(),
        anchor in arb_anchor(),
        tz in arb_timezone(),
        dur in arb_duration(),
        days in arb_window_days(),
    ) {
        let rule = format!("FREQ={};INTERVAL={}", freq, interval);
        let result = expand(&params(anchor, dur, tz, rule, days), &ExpansionConfig::default());

        let lower = anchor.date();
        let upper = lower + Duration::days(days);
        for interval in &result {
            let local = interval.start().with_timezone(&tz).date_naive();
            prop_assert!(local >= lower && local <= upper, "{} outside {}..={}", local, lower, upper);
        }
    }
}

// ---------------------------------------------------------------------------
// Property 4: Expansion is deterministic
// ---------------------------------------------------------------------------
proptest! {
    #![proptest_config(config())]

    #[test]
    fn expansion_is_idempotent(
        freq in arb_freq(),
        interval in arb_interval(),
        anchor in arb_anchor(),
        tz in arb_timezone(),
        dur in arb_duration(),
        days in arb_window_days(),
    ) {
        let rule = format!("FREQ={};INTERVAL={}", freq, interval);
        let p = params(anchor, dur, tz, rule, days);
        let config = ExpansionConfig::for_container();
        prop_assert_eq!(expand(&p, &config), expand(&p, &config));
    }
}

// ---------------------------------------------------------------------------
// Property 5: COUNT caps the series regardless of the window
// ---------------------------------------------------------------------------
proptest! {
    #![proptest_config(config())]

    #[test]
    fn count_caps_series(
        freq in arb_freq(),
        count in 1u32..=30,
        anchor in arb_anchor(),
        tz in arb_timezone(),
        dur in arb_duration(),
    ) {
        let rule = format!("FREQ={};COUNT={}", freq, count);
        let p = ExpansionParams::new(anchor, anchor.time() + Duration::minutes(dur), tz)
            .unwrap()
            .with_rule(rule);

        let result = expand(&p, &ExpansionConfig::default());
        prop_assert!(result.len() <= count as usize);
    }
}

// ---------------------------------------------------------------------------
// Property 6: A later lower bound only trims the front of the series
// ---------------------------------------------------------------------------
proptest! {
    #![proptest_config(config())]

    #[test]
    fn later_lower_bound_trims_without_shifting(
        freq in arb_freq(),
        interval in arb_interval(),
        anchor in arb_anchor(),
        tz in arb_timezone(),
        dur in arb_duration(),
        days in arb_window_days(),
        shift in 0i64..=200,
    ) {
        let rule = format!("FREQ={};INTERVAL={}", freq, interval);
        let earlier = params(anchor, dur, tz, rule, days);
        let upper = anchor.date() + Duration::days(days);
        let lower = anchor.date() + Duration::days(shift);
        let later = earlier.clone().with_bounds(lower, Some(upper));

        let config = ExpansionConfig::for_container();
        let expected: Vec<_> = expand(&earlier, &config)
            .into_iter()
            .filter(|i| i.start().with_timezone(&tz).date_naive() >= lower)
            .collect();

        prop_assert_eq!(expand(&later, &config), expected);
    }
}
