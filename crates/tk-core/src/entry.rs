//! Time entries: timed leaves and groups of nested entries.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Validation errors raised when entries are built from untrusted data.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// The provided value was empty.
    #[error("{field} cannot be empty")]
    Empty { field: &'static str },

    /// A group was stored with its own start or end time.
    #[error("group entry {id} cannot have a start or end time")]
    TimedGroup { id: String },

    /// A leaf has an end time but was never started.
    #[error("entry {id} has an end time but no start time")]
    EndWithoutStart { id: String },

    /// The same id appears twice in one timekeep.
    #[error("duplicate entry id: {id}")]
    DuplicateId { id: String },
}

/// A validated entry identifier.
///
/// Ids are unique across the whole tree of a timekeep, not just among siblings.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EntryId(String);

impl EntryId {
    /// Creates a new ID after validation.
    pub fn new(id: impl Into<String>) -> Result<Self, ValidationError> {
        let id = id.into();
        if id.is_empty() {
            return Err(ValidationError::Empty { field: "entry ID" });
        }
        Ok(Self(id))
    }

    /// Generates a fresh random ID.
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Returns the ID as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for EntryId {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<EntryId> for String {
    fn from(id: EntryId) -> Self {
        id.0
    }
}

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for EntryId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// The stored timing of a leaf entry.
///
/// An end time can only exist alongside a start time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Timing {
    /// Created but not started yet.
    Unstarted,
    /// Started with no end time; its duration grows with the reference instant.
    Running { start: DateTime<Utc> },
    /// Started and ended.
    Stopped {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },
}

impl Timing {
    /// Builds a timing from optional bounds.
    ///
    /// Returns `None` for an end without a start.
    pub const fn from_bounds(
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
    ) -> Option<Self> {
        match (start, end) {
            (None, None) => Some(Self::Unstarted),
            (Some(start), None) => Some(Self::Running { start }),
            (Some(start), Some(end)) => Some(Self::Stopped { start, end }),
            (None, Some(_)) => None,
        }
    }

    pub const fn start(&self) -> Option<DateTime<Utc>> {
        match self {
            Self::Unstarted => None,
            Self::Running { start } | Self::Stopped { start, .. } => Some(*start),
        }
    }

    pub const fn end(&self) -> Option<DateTime<Utc>> {
        match self {
            Self::Stopped { end, .. } => Some(*end),
            Self::Unstarted | Self::Running { .. } => None,
        }
    }

    pub const fn is_running(&self) -> bool {
        matches!(self, Self::Running { .. })
    }
}

/// A node in the timesheet tree.
///
/// Leaves carry timing and never have children. Groups never carry timing of
/// their own; their duration is derived from their sub-entries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawEntry", into = "RawEntry")]
pub enum TimeEntry {
    Leaf {
        id: EntryId,
        name: String,
        timing: Timing,
    },
    Group {
        id: EntryId,
        name: String,
        sub_entries: Vec<TimeEntry>,
    },
}

impl TimeEntry {
    /// Creates a leaf entry.
    pub fn leaf(id: EntryId, name: impl Into<String>, timing: Timing) -> Self {
        Self::Leaf {
            id,
            name: name.into(),
            timing,
        }
    }

    /// Creates a group entry.
    pub fn group(id: EntryId, name: impl Into<String>, sub_entries: Vec<Self>) -> Self {
        Self::Group {
            id,
            name: name.into(),
            sub_entries,
        }
    }

    pub const fn id(&self) -> &EntryId {
        match self {
            Self::Leaf { id, .. } | Self::Group { id, .. } => id,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Self::Leaf { name, .. } | Self::Group { name, .. } => name,
        }
    }

    /// The stored start time. Always `None` for groups.
    pub const fn start_time(&self) -> Option<DateTime<Utc>> {
        match self {
            Self::Leaf { timing, .. } => timing.start(),
            Self::Group { .. } => None,
        }
    }

    /// The stored end time. Always `None` for groups.
    pub const fn end_time(&self) -> Option<DateTime<Utc>> {
        match self {
            Self::Leaf { timing, .. } => timing.end(),
            Self::Group { .. } => None,
        }
    }

    /// Child entries, or `None` for a leaf.
    pub fn sub_entries(&self) -> Option<&[Self]> {
        match self {
            Self::Leaf { .. } => None,
            Self::Group { sub_entries, .. } => Some(sub_entries),
        }
    }

    pub const fn is_group(&self) -> bool {
        matches!(self, Self::Group { .. })
    }

    /// Returns a copy of this entry with a different name.
    #[must_use]
    pub fn with_name(&self, name: impl Into<String>) -> Self {
        let name = name.into();
        match self {
            Self::Leaf { id, timing, .. } => Self::leaf(id.clone(), name, *timing),
            Self::Group {
                id, sub_entries, ..
            } => Self::group(id.clone(), name, sub_entries.clone()),
        }
    }

    /// Earliest start time anywhere in this entry's subtree.
    pub fn earliest_start(&self) -> Option<DateTime<Utc>> {
        match self {
            Self::Leaf { timing, .. } => timing.start(),
            Self::Group { sub_entries, .. } => {
                sub_entries.iter().filter_map(Self::earliest_start).min()
            }
        }
    }
}

/// Persisted shape of an entry, shared by both variants.
///
/// `subEntries` being `null` marks a leaf. A missing id is filled in with a
/// fresh one so documents written before ids existed still load.
#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawEntry {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    name: String,
    #[serde(default)]
    start_time: Option<DateTime<Utc>>,
    #[serde(default)]
    end_time: Option<DateTime<Utc>>,
    #[serde(default)]
    sub_entries: Option<Vec<TimeEntry>>,
}

impl TryFrom<RawEntry> for TimeEntry {
    type Error = ValidationError;

    fn try_from(raw: RawEntry) -> Result<Self, Self::Error> {
        let id = match raw.id {
            Some(id) => EntryId::new(id)?,
            None => EntryId::generate(),
        };

        match raw.sub_entries {
            Some(sub_entries) => {
                if raw.start_time.is_some() || raw.end_time.is_some() {
                    return Err(ValidationError::TimedGroup { id: id.into() });
                }
                Ok(Self::group(id, raw.name, sub_entries))
            }
            None => {
                let Some(timing) = Timing::from_bounds(raw.start_time, raw.end_time) else {
                    return Err(ValidationError::EndWithoutStart { id: id.into() });
                };
                Ok(Self::leaf(id, raw.name, timing))
            }
        }
    }
}

impl From<TimeEntry> for RawEntry {
    fn from(entry: TimeEntry) -> Self {
        match entry {
            TimeEntry::Leaf { id, name, timing } => Self {
                id: Some(id.into()),
                name,
                start_time: timing.start(),
                end_time: timing.end(),
                sub_entries: None,
            },
            TimeEntry::Group {
                id,
                name,
                sub_entries,
            } => Self {
                id: Some(id.into()),
                name,
                start_time: None,
                end_time: None,
                sub_entries: Some(sub_entries),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(hour: u32, minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 15, hour, minute, 0)
            .single()
            .expect("valid test timestamp")
    }

    fn id(value: &str) -> EntryId {
        EntryId::new(value).unwrap()
    }

    #[test]
    fn entry_id_rejects_empty() {
        assert!(EntryId::new("").is_err());
        assert!(EntryId::new("entry-1").is_ok());
    }

    #[test]
    fn generated_ids_are_distinct() {
        assert_ne!(EntryId::generate(), EntryId::generate());
    }

    #[test]
    fn timing_rejects_end_without_start() {
        assert_eq!(Timing::from_bounds(None, Some(at(9, 0))), None);
        assert_eq!(
            Timing::from_bounds(Some(at(9, 0)), None),
            Some(Timing::Running { start: at(9, 0) })
        );
    }

    #[test]
    fn leaf_serializes_with_null_sub_entries() {
        let entry = TimeEntry::leaf(
            id("a"),
            "Block 1",
            Timing::Stopped {
                start: at(9, 0),
                end: at(10, 30),
            },
        );

        let json = serde_json::to_string(&entry).unwrap();
        assert_eq!(
            json,
            r#"{"id":"a","name":"Block 1","startTime":"2025-01-15T09:00:00Z","endTime":"2025-01-15T10:30:00Z","subEntries":null}"#
        );
    }

    #[test]
    fn group_roundtrips_through_json() {
        let entry = TimeEntry::group(
            id("g"),
            "Project",
            vec![
                TimeEntry::leaf(id("p1"), "Part 1", Timing::Unstarted),
                TimeEntry::leaf(id("p2"), "Part 2", Timing::Running { start: at(11, 0) }),
            ],
        );

        let json = serde_json::to_string(&entry).unwrap();
        let parsed: TimeEntry = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, entry);
    }

    #[test]
    fn deserialize_rejects_timed_group() {
        let json = r#"{"id":"g","name":"x","startTime":"2025-01-15T09:00:00Z","endTime":null,"subEntries":[]}"#;
        let result: Result<TimeEntry, _> = serde_json::from_str(json);
        assert!(result.is_err());
    }

    #[test]
    fn deserialize_rejects_end_without_start() {
        let json = r#"{"id":"a","name":"x","startTime":null,"endTime":"2025-01-15T09:00:00Z","subEntries":null}"#;
        let result: Result<TimeEntry, _> = serde_json::from_str(json);
        assert!(result.is_err());
    }

    #[test]
    fn deserialize_rejects_empty_id() {
        let json = r#"{"id":"","name":"x","startTime":null,"endTime":null,"subEntries":null}"#;
        let result: Result<TimeEntry, _> = serde_json::from_str(json);
        assert!(result.is_err());
    }

    #[test]
    fn deserialize_fills_missing_id() {
        let json = r#"{"name":"Legacy","startTime":"2025-01-15T09:00:00Z","endTime":null,"subEntries":null}"#;
        let entry: TimeEntry = serde_json::from_str(json).unwrap();
        assert!(!entry.id().as_str().is_empty());
        assert_eq!(entry.start_time(), Some(at(9, 0)));
    }

    #[test]
    fn group_never_reports_stored_times() {
        let group = TimeEntry::group(
            id("g"),
            "Group",
            vec![TimeEntry::leaf(id("a"), "a", Timing::Running { start: at(9, 0) })],
        );
        assert_eq!(group.start_time(), None);
        assert_eq!(group.end_time(), None);
        assert_eq!(group.earliest_start(), Some(at(9, 0)));
    }

    #[test]
    fn with_name_keeps_identity_and_children() {
        let group = TimeEntry::group(
            id("g"),
            "Old",
            vec![TimeEntry::leaf(id("a"), "a", Timing::Unstarted)],
        );
        let renamed = group.with_name("New");
        assert_eq!(renamed.id(), group.id());
        assert_eq!(renamed.name(), "New");
        assert_eq!(renamed.sub_entries(), group.sub_entries());
    }
}
