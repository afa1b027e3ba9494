//! Entry tree engine for nested timesheets.
//!
//! This crate contains the fundamental types and logic for:
//! - Entries: timed leaves and groups, with their persisted JSON shape
//! - Tree operations: find, update, remove, start and stop entries
//! - Durations: elapsed time of entries and trees against a reference instant
//! - Sorting: display order over a sequence of entries
//! - Timestamps: moment-style text formatting, parsing and rounding
//!
//! All operations are pure: they take values and return new ones.

pub mod duration;
pub mod edit;
pub mod entry;
pub mod export;
pub mod format;
pub mod settings;
pub mod sort;
pub mod timekeep;
pub mod timestamp;
pub mod tree;

pub use duration::{entry_duration, total_duration};
pub use edit::{CommittedEdit, EditIssue, EntryEdit, commit_edit};
pub use entry::{EntryId, TimeEntry, Timing, ValidationError};
pub use format::{DurationFormat, format_duration, format_duration_long, format_duration_short};
pub use settings::{SettingsError, TimekeepSettings};
pub use sort::{SortOrder, UnstartedOrder, sort_entries};
pub use timekeep::Timekeep;
pub use timestamp::{
    TimestampCodec, TimestampError, format_editable_timestamp, format_editable_timestamp_in,
    parse_editable_timestamp, parse_editable_timestamp_in, round_to_interval,
};
pub use tree::{remove_entry, update_entry};
