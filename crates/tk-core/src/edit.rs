//! Turning submitted edit-form text into an updated entry.
//!
//! Invalid timestamp text never replaces a stored time: the previous value is
//! kept and the problem is reported alongside the committed entry.

use chrono::{DateTime, TimeZone, Utc};

use crate::entry::{TimeEntry, Timing};
use crate::settings::TimekeepSettings;
use crate::timestamp::{TimestampCodec, TimestampError};

/// The text of an edit form.
///
/// `start` and `end` are only read when the entry already has that time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntryEdit {
    pub name: String,
    pub start: Option<String>,
    pub end: Option<String>,
}

/// A field of the form that was not committed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditIssue {
    InvalidStart(TimestampError),
    InvalidEnd(TimestampError),
    /// Start and end would be equal while that is disallowed; both times were kept.
    EndSameAsStart,
}

/// The entry to store, plus anything that was rejected along the way.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommittedEdit {
    pub entry: TimeEntry,
    pub issues: Vec<EditIssue>,
}

impl CommittedEdit {
    pub fn is_clean(&self) -> bool {
        self.issues.is_empty()
    }
}

/// Applies an edit form to `entry`.
///
/// The name is always applied. Groups have no times to edit.
pub fn commit_edit<Tz: TimeZone>(
    entry: &TimeEntry,
    edit: &EntryEdit,
    settings: &TimekeepSettings,
    tz: &Tz,
) -> CommittedEdit {
    let TimeEntry::Leaf { id, timing, .. } = entry else {
        return CommittedEdit {
            entry: entry.with_name(edit.name.clone()),
            issues: Vec::new(),
        };
    };

    let codec = TimestampCodec::from_settings(settings);
    let mut issues = Vec::new();

    let start = parse_field(
        &codec,
        timing.start(),
        edit.start.as_deref(),
        tz,
        EditIssue::InvalidStart,
        &mut issues,
    );
    let end = parse_field(
        &codec,
        timing.end(),
        edit.end.as_deref(),
        tz,
        EditIssue::InvalidEnd,
        &mut issues,
    );

    let mut new_timing = Timing::from_bounds(start, end).unwrap_or(*timing);
    let times_submitted = edit.start.is_some() || edit.end.is_some();
    if settings.timestamp_prevent_end_same_as_start && times_submitted && start.is_some() && start == end {
        tracing::debug!(%id, "end equals start, keeping previous times");
        issues.push(EditIssue::EndSameAsStart);
        new_timing = *timing;
    }

    CommittedEdit {
        entry: TimeEntry::leaf(id.clone(), edit.name.clone(), new_timing),
        issues,
    }
}

/// Parses one time field if the stored value exists and text was submitted.
///
/// Date fields missing from the pattern come from the stored value.
fn parse_field<Tz: TimeZone>(
    codec: &TimestampCodec,
    stored: Option<DateTime<Utc>>,
    text: Option<&str>,
    tz: &Tz,
    issue: fn(TimestampError) -> EditIssue,
    issues: &mut Vec<EditIssue>,
) -> Option<DateTime<Utc>> {
    let (Some(stored), Some(text)) = (stored, text) else {
        return stored;
    };

    match codec.parse_near(text, tz, Some(stored)) {
        Ok(parsed) => Some(parsed),
        Err(err) => {
            tracing::debug!(%err, "rejected timestamp edit");
            issues.push(issue(err));
            Some(stored)
        }
    }
}
