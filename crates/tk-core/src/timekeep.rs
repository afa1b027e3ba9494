//! The timekeep aggregate: one timesheet's top-level entries.

use std::collections::HashSet;

use chrono::{DateTime, Duration, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::duration::total_duration;
use crate::edit::{CommittedEdit, EntryEdit, commit_edit};
use crate::entry::{EntryId, TimeEntry, ValidationError};
use crate::settings::TimekeepSettings;
use crate::sort::sort_entries;
use crate::tree;

/// Root of a timesheet.
///
/// `entries` is kept in insertion order; display order is computed on demand.
/// Every write returns a new value and leaves `self` as it was.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawTimekeep")]
pub struct Timekeep {
    pub entries: Vec<TimeEntry>,
}

#[derive(Deserialize)]
struct RawTimekeep {
    #[serde(default)]
    entries: Vec<TimeEntry>,
}

impl TryFrom<RawTimekeep> for Timekeep {
    type Error = ValidationError;

    fn try_from(raw: RawTimekeep) -> Result<Self, Self::Error> {
        Self::new(raw.entries)
    }
}

impl Timekeep {
    /// Creates a timekeep, rejecting ids that appear more than once.
    pub fn new(entries: Vec<TimeEntry>) -> Result<Self, ValidationError> {
        let mut seen = HashSet::new();
        for id in tree::flatten_ids(&entries) {
            if !seen.insert(id.clone()) {
                return Err(ValidationError::DuplicateId { id: id.into() });
            }
        }
        Ok(Self { entries })
    }

    pub fn find(&self, id: &EntryId) -> Option<&TimeEntry> {
        tree::find_entry(&self.entries, id)
    }

    pub fn is_running(&self) -> bool {
        self.entries.iter().any(tree::is_running)
    }

    pub fn total_duration(&self, now: DateTime<Utc>) -> Duration {
        total_duration(&self.entries, now)
    }

    /// Top-level entries in the configured display order.
    pub fn sorted_entries(&self, settings: &TimekeepSettings) -> Vec<TimeEntry> {
        sort_entries(&self.entries, settings.sort_order, settings.unstarted_order)
    }

    #[must_use]
    pub fn update_entry(&self, id: &EntryId, replacement: &TimeEntry) -> Self {
        Self {
            entries: tree::update_entry(&self.entries, id, replacement),
        }
    }

    #[must_use]
    pub fn remove_entry(&self, target: &TimeEntry) -> Self {
        Self {
            entries: tree::remove_entry(&self.entries, target),
        }
    }

    #[must_use]
    pub fn remove_entry_by_id(&self, id: &EntryId) -> Self {
        Self {
            entries: tree::remove_entry_by_id(&self.entries, id),
        }
    }

    /// Starts a new running entry, at the root or under `parent`.
    #[must_use]
    pub fn start_entry(&self, name: &str, parent: Option<&EntryId>, now: DateTime<Utc>) -> Self {
        let entries = match parent {
            Some(parent) => tree::start_nested_entry(&self.entries, parent, name, now),
            None => tree::start_new_entry(&self.entries, name, now),
        };
        Self { entries }
    }

    #[must_use]
    pub fn stop_running(&self, end: DateTime<Utc>) -> Self {
        Self {
            entries: tree::stop_running_entries(&self.entries, end),
        }
    }

    /// Commits an edit form to the entry with `id`.
    ///
    /// Returns `None` when no entry has that id.
    pub fn apply_edit<Tz: TimeZone>(
        &self,
        id: &EntryId,
        edit: &EntryEdit,
        settings: &TimekeepSettings,
        tz: &Tz,
    ) -> Option<(Self, CommittedEdit)> {
        let entry = self.find(id)?;
        let committed = commit_edit(entry, edit, settings, tz);
        Some((self.update_entry(id, &committed.entry), committed))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::Timing;
    use crate::sort::{SortOrder, UnstartedOrder};

    fn at(hour: u32, minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 15, hour, minute, 0)
            .single()
            .expect("valid test timestamp")
    }

    fn id(value: &str) -> EntryId {
        EntryId::new(value).unwrap()
    }

    fn sample() -> Timekeep {
        Timekeep::new(vec![
            TimeEntry::leaf(
                id("1"),
                "Morning",
                Timing::Stopped {
                    start: at(9, 0),
                    end: at(10, 30),
                },
            ),
            TimeEntry::leaf(id("2"), "Review", Timing::Running { start: at(11, 0) }),
        ])
        .unwrap()
    }

    #[test]
    fn total_counts_running_entry_up_to_now() {
        assert_eq!(sample().total_duration(at(11, 15)), Duration::minutes(105));
        assert!(sample().is_running());
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let result = Timekeep::new(vec![
            TimeEntry::leaf(id("x"), "a", Timing::Unstarted),
            TimeEntry::group(
                id("g"),
                "g",
                vec![TimeEntry::leaf(id("x"), "b", Timing::Unstarted)],
            ),
        ]);
        assert_eq!(
            result,
            Err(ValidationError::DuplicateId { id: "x".to_string() })
        );
    }

    #[test]
    fn deserializes_document_json() {
        let json = r#"{"entries":[
            {"id":"1","name":"Block 1","startTime":"2025-01-15T09:00:00Z","endTime":"2025-01-15T10:30:00Z","subEntries":null},
            {"id":"g","name":"Group","startTime":null,"endTime":null,"subEntries":[
                {"id":"2","name":"Part 1","startTime":"2025-01-15T11:00:00Z","endTime":null,"subEntries":null}
            ]}
        ]}"#;
        let timekeep: Timekeep = serde_json::from_str(json).unwrap();
        assert_eq!(timekeep.entries.len(), 2);
        assert_eq!(timekeep.total_duration(at(11, 15)), Duration::minutes(105));

        let back = serde_json::to_string(&timekeep).unwrap();
        let again: Timekeep = serde_json::from_str(&back).unwrap();
        assert_eq!(again, timekeep);
    }

    #[test]
    fn deserialize_rejects_duplicate_ids() {
        let json = r#"{"entries":[
            {"id":"1","name":"a","startTime":null,"endTime":null,"subEntries":null},
            {"id":"1","name":"b","startTime":null,"endTime":null,"subEntries":null}
        ]}"#;
        assert!(serde_json::from_str::<Timekeep>(json).is_err());
    }

    #[test]
    fn writes_leave_previous_value_intact() {
        let before = sample();
        let after = before.stop_running(at(12, 0));
        assert!(before.is_running());
        assert!(!after.is_running());
        assert_eq!(after.total_duration(at(23, 0)), Duration::minutes(150));
    }

    #[test]
    fn sorted_entries_follow_settings() {
        let settings = TimekeepSettings {
            sort_order: SortOrder::NewestStart,
            unstarted_order: UnstartedOrder::Last,
            ..TimekeepSettings::default()
        };
        let sorted = sample().sorted_entries(&settings);
        assert_eq!(sorted[0].name(), "Review");
        assert_eq!(sample().entries[0].name(), "Morning");
    }

    #[test]
    fn apply_edit_updates_in_place() {
        let edit = EntryEdit {
            name: "Standup".to_string(),
            start: Some("25-01-15 08:45:00".to_string()),
            end: Some("25-01-15 09:00:00".to_string()),
        };
        let (updated, committed) = sample()
            .apply_edit(&id("1"), &edit, &TimekeepSettings::default(), &Utc)
            .unwrap();
        assert!(committed.is_clean());
        assert_eq!(updated.entries[0].name(), "Standup");
        assert_eq!(updated.entries[1], sample().entries[1]);
        assert!(
            sample()
                .apply_edit(&id("missing"), &edit, &TimekeepSettings::default(), &Utc)
                .is_none()
        );
    }

    #[test]
    fn start_and_remove_entries() {
        let timekeep = sample().start_entry("", Some(&id("1")), at(12, 0));
        let group = timekeep.find(&id("1")).unwrap();
        assert_eq!(group.sub_entries().map(<[TimeEntry]>::len), Some(2));

        let removed = timekeep.remove_entry_by_id(&id("1"));
        assert_eq!(removed.entries.len(), 1);
        assert_eq!(removed.entries[0].name(), "Review");
    }
}
