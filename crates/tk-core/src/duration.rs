//! Elapsed time for entries and entry trees.
//!
//! Running entries are measured against a caller-supplied `now`; nothing here
//! reads the wall clock.

use chrono::{DateTime, Duration, Utc};

use crate::entry::{TimeEntry, Timing};

/// Elapsed time of one entry.
///
/// Unstarted leaves count as zero and running leaves run up to `now`. Groups
/// sum their sub-entries recursively. An end before its start yields a
/// negative duration rather than an error.
pub fn entry_duration(entry: &TimeEntry, now: DateTime<Utc>) -> Duration {
    match entry {
        TimeEntry::Leaf { timing, .. } => match *timing {
            Timing::Unstarted => Duration::zero(),
            Timing::Running { start } => now - start,
            Timing::Stopped { start, end } => end - start,
        },
        TimeEntry::Group { sub_entries, .. } => total_duration(sub_entries, now),
    }
}

/// Sum of [`entry_duration`] over a sequence of entries.
pub fn total_duration(entries: &[TimeEntry], now: DateTime<Utc>) -> Duration {
    entries
        .iter()
        .fold(Duration::zero(), |total, entry| total + entry_duration(entry, now))
}
