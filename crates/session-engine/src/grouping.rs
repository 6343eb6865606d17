//! Cluster occurrences into connected groups of overlapping sessions.
//!
//! Used for layout (rendering simultaneous sessions side by side), never for
//! rejecting bookings. Unlike [`crate::overlap`], the boundary is inclusive:
//! sessions that touch (`a.end == b.start`) land in the same group.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;

use crate::occurrence::Occurrence;

/// Group occurrences into overlap clusters.
///
/// Groups are returned in start order, each group's members sorted by start.
/// Every input occurrence appears in exactly one group, and groups never share
/// any instant.
pub fn group_overlaps(occurrences: &[Occurrence]) -> Vec<Vec<Occurrence>> {
    let mut sorted: Vec<&Occurrence> = occurrences.iter().collect();
    // Stable sort keeps input order for identical windows.
    sorted.sort_by_key(|o| (o.start(), o.end()));

    let mut groups: Vec<Vec<Occurrence>> = Vec::new();
    let mut range_end: Option<DateTime<Utc>> = None;

    for occurrence in sorted {
        match range_end {
            Some(end) if occurrence.start() <= end => {
                if let Some(group) = groups.last_mut() {
                    group.push(occurrence.clone());
                }
                range_end = Some(end.max(occurrence.end()));
            }
            _ => {
                groups.push(vec![occurrence.clone()]);
                range_end = Some(occurrence.end());
            }
        }
    }

    groups
}

/// Bucket occurrences by the local calendar date of their start in `tz`, then
/// group each day independently.
pub fn group_overlaps_by_day(
    occurrences: &[Occurrence],
    tz: Tz,
) -> BTreeMap<NaiveDate, Vec<Vec<Occurrence>>> {
    let mut days: BTreeMap<NaiveDate, Vec<Occurrence>> = BTreeMap::new();
    for occurrence in occurrences {
        days.entry(occurrence.local_date(tz))
            .or_default()
            .push(occurrence.clone());
    }

    days.into_iter()
        .map(|(date, bucket)| (date, group_overlaps(&bucket)))
        .collect()
}
