//! Sweep-line overlap detection over `[start, end)` intervals.
//!
//! Each interval contributes a `Start` and an `End` event. Events are sorted by
//! time, and at equal times `End` sorts before `Start`, so intervals that merely
//! touch (`a.end == b.start`) are never reported as overlapping.
//!
//! Callers must hand in valid intervals; [`TimeInterval::new`] already rejects
//! zero-length and inverted spans.

use chrono::{DateTime, Utc};

use crate::interval::TimeInterval;

/// Kind of sweep event. The variant order is the tie-break: `End` first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum EventKind {
    End,
    Start,
}

#[derive(Debug, Clone, Copy)]
struct SweepEvent {
    time: DateTime<Utc>,
    kind: EventKind,
    index: usize,
}

fn sweep_events(intervals: &[TimeInterval]) -> Vec<SweepEvent> {
    let mut events: Vec<SweepEvent> = intervals
        .iter()
        .enumerate()
        .flat_map(|(index, interval)| {
            [
                SweepEvent {
                    time: interval.start(),
                    kind: EventKind::Start,
                    index,
                },
                SweepEvent {
                    time: interval.end(),
                    kind: EventKind::End,
                    index,
                },
            ]
        })
        .collect();

    events.sort_by_key(|e| (e.time, e.kind, e.index));
    events
}

/// Set of currently active interval indices with O(1) insert and removal.
///
/// `slots[i]` holds the position of index `i` inside `members`, so removal is a
/// `swap_remove` plus one slot fix-up instead of a linear scan.
struct ActiveSet {
    members: Vec<usize>,
    slots: Vec<Option<usize>>,
}

impl ActiveSet {
    fn with_capacity(n: usize) -> Self {
        Self {
            members: Vec::new(),
            slots: vec![None; n],
        }
    }

    fn insert(&mut self, index: usize) {
        self.slots[index] = Some(self.members.len());
        self.members.push(index);
    }

    fn remove(&mut self, index: usize) {
        let Some(pos) = self.slots[index].take() else {
            return;
        };
        self.members.swap_remove(pos);
        if let Some(&moved) = self.members.get(pos) {
            self.slots[moved] = Some(pos);
        }
    }

    fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        self.members.iter().copied()
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.members.len()
    }
}

/// Find every pair of overlapping intervals.
///
/// Indices refer to positions in `intervals`, which does not need to be sorted.
/// Each pair is reported once as `(i, j)` with `i < j`, and the result is sorted.
pub fn find_overlaps(intervals: &[TimeInterval]) -> Vec<(usize, usize)> {
    let mut active = ActiveSet::with_capacity(intervals.len());
    let mut pairs = Vec::new();

    for event in sweep_events(intervals) {
        match event.kind {
            EventKind::Start => {
                for other in active.iter() {
                    pairs.push((other.min(event.index), other.max(event.index)));
                }
                active.insert(event.index);
            }
            EventKind::End => active.remove(event.index),
        }
    }

    pairs.sort_unstable();
    pairs
}

/// Whether any two intervals overlap. Stops at the first overlap found.
pub fn has_any_overlap(intervals: &[TimeInterval]) -> bool {
    let mut active = 0usize;
    for event in sweep_events(intervals) {
        match event.kind {
            EventKind::Start => {
                active += 1;
                if active > 1 {
                    return true;
                }
            }
            EventKind::End => active -= 1,
        }
    }
    false
}
