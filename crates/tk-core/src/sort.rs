//! Display ordering for a flat sequence of entries.
//!
//! Sorting is a projection: storage order is never touched. It works on one
//! level; callers apply it at whichever levels they display.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::entry::TimeEntry;
use crate::settings::SettingsError;

/// How entries are ordered for display and export.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    /// The order entries were created in.
    #[default]
    Insertion,
    /// Most recently created first.
    ReverseInsertion,
    /// Most recently started first.
    NewestStart,
    /// Earliest started first.
    OldestStart,
}

impl SortOrder {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Insertion => "insertion",
            Self::ReverseInsertion => "reverse_insertion",
            Self::NewestStart => "newest_start",
            Self::OldestStart => "oldest_start",
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for SortOrder {
    type Err = SettingsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "insertion" => Ok(Self::Insertion),
            "reverse_insertion" => Ok(Self::ReverseInsertion),
            "newest_start" => Ok(Self::NewestStart),
            "oldest_start" => Ok(Self::OldestStart),
            _ => Err(SettingsError::UnknownVariant {
                setting: "sort order",
                value: s.to_string(),
            }),
        }
    }
}

/// Where entries without a start time go under start-time orders.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnstartedOrder {
    First,
    #[default]
    Last,
}

impl UnstartedOrder {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::First => "first",
            Self::Last => "last",
        }
    }
}

impl fmt::Display for UnstartedOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for UnstartedOrder {
    type Err = SettingsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "first" => Ok(Self::First),
            "last" => Ok(Self::Last),
            _ => Err(SettingsError::UnknownVariant {
                setting: "unstarted order",
                value: s.to_string(),
            }),
        }
    }
}

/// The instant an entry sorts by.
///
/// Leaves use their start time. Groups store no times, so they sort by the
/// earliest start among their descendants.
fn sort_key(entry: &TimeEntry) -> Option<DateTime<Utc>> {
    entry.earliest_start()
}

/// Returns `entries` in display order.
///
/// Start-time orders are stable, so ties keep insertion order. Unstarted
/// entries form one block at the start or end, in insertion order.
pub fn sort_entries(
    entries: &[TimeEntry],
    order: SortOrder,
    unstarted: UnstartedOrder,
) -> Vec<TimeEntry> {
    match order {
        SortOrder::Insertion => entries.to_vec(),
        SortOrder::ReverseInsertion => entries.iter().rev().cloned().collect(),
        SortOrder::NewestStart | SortOrder::OldestStart => {
            let mut started = Vec::with_capacity(entries.len());
            let mut not_started = Vec::new();
            for entry in entries {
                match sort_key(entry) {
                    Some(start) => started.push((start, entry)),
                    None => not_started.push(entry),
                }
            }

            if order == SortOrder::NewestStart {
                started.sort_by(|(a, _), (b, _)| b.cmp(a));
            } else {
                started.sort_by(|(a, _), (b, _)| a.cmp(b));
            }

            let started = started.into_iter().map(|(_, entry)| entry);
            let sorted: Vec<&TimeEntry> = match unstarted {
                UnstartedOrder::First => not_started.into_iter().chain(started).collect(),
                UnstartedOrder::Last => started.chain(not_started).collect(),
            };
            sorted.into_iter().cloned().collect()
        }
    }
}
