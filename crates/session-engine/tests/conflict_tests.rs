//! Tests for conflict checks between candidate and existing bookings.

use chrono::{TimeZone, Utc};
use session_engine::{check_conflicts, Occurrence};

/// Helper to create an Occurrence from hour ranges on a given day.
fn booking(
    owner: &str,
    day: u32,
    start_hour: u32,
    start_min: u32,
    end_hour: u32,
    end_min: u32,
) -> Occurrence {
    Occurrence::between(
        owner,
        Utc.with_ymd_and_hms(2026, 3, day, start_hour, start_min, 0)
            .unwrap(),
        Utc.with_ymd_and_hms(2026, 3, day, end_hour, end_min, 0)
            .unwrap(),
    )
    .unwrap()
}

#[test]
fn overlapping_candidate_is_reported() {
    // Candidate 09:00-10:00 vs existing 09:30-10:30 -> 30-min overlap
    let candidates = vec![booking("new", 1, 9, 0, 10, 0)];
    let existing = vec![booking("old", 1, 9, 30, 10, 30)];

    let report = check_conflicts(&candidates, &existing);

    assert!(!report.success);
    assert_eq!(report.conflicting_pairs.len(), 1);
    assert_eq!(report.conflicting_pairs[0].first.owner_id, "new");
    assert_eq!(report.conflicting_pairs[0].second.owner_id, "old");
    assert_eq!(report.conflicting_pairs[0].overlap_minutes, 30);
}

#[test]
fn adjacent_bookings_are_not_a_conflict() {
    let candidates = vec![booking("new", 1, 10, 0, 11, 0)];
    let existing = vec![booking("old", 1, 9, 0, 10, 0)];

    let report = check_conflicts(&candidates, &existing);

    assert!(report.success, "adjacent bookings (end == start) should pass");
    assert!(report.is_clear());
    assert!(report.conflicting_pairs.is_empty());
}

#[test]
fn overlaps_among_existing_bookings_are_ignored() {
    let candidates = vec![booking("new", 2, 14, 0, 15, 0)];
    let existing = vec![
        booking("old-a", 1, 9, 0, 10, 0),
        booking("old-b", 1, 9, 30, 10, 30),
    ];

    let report = check_conflicts(&candidates, &existing);

    assert!(report.success);
}

#[test]
fn recurring_candidates_report_each_conflicting_occurrence() {
    let candidates = vec![
        booking("series", 1, 9, 0, 10, 0),
        booking("series", 2, 9, 0, 10, 0),
        booking("series", 3, 9, 0, 10, 0),
    ];
    let existing = vec![
        booking("old", 1, 9, 45, 11, 0),
        booking("old", 3, 8, 0, 12, 0),
    ];

    let report = check_conflicts(&candidates, &existing);

    assert!(!report.success);
    assert_eq!(report.conflicting_pairs.len(), 2);
    assert_eq!(report.conflicting_pairs[0].overlap_minutes, 15);
    assert_eq!(
        report.conflicting_pairs[1].overlap_minutes, 60,
        "fully contained candidate overlaps for its whole length"
    );
}

#[test]
fn candidates_conflicting_with_each_other_are_reported() {
    let candidates = vec![booking("a", 1, 9, 0, 10, 0), booking("b", 1, 9, 30, 11, 0)];

    let report = check_conflicts(&candidates, &[]);

    assert!(!report.success);
    assert_eq!(report.conflicting_pairs[0].first.owner_id, "a");
    assert_eq!(report.conflicting_pairs[0].second.owner_id, "b");
}

#[test]
fn empty_inputs_succeed() {
    assert!(check_conflicts(&[], &[]).success);
    assert!(check_conflicts(&[], &[booking("old", 1, 9, 0, 10, 0)]).success);
}

#[test]
fn report_serializes_for_display() {
    let report = check_conflicts(
        &[booking("new", 1, 9, 0, 10, 0)],
        &[booking("old", 1, 9, 30, 10, 30)],
    );

    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["success"], false);
    assert_eq!(json["conflicting_pairs"][0]["first"]["owner_id"], "new");
    assert_eq!(json["conflicting_pairs"][0]["overlap_minutes"], 30);
}
