//! Timesheet settings passed explicitly to formatting, parsing and sorting.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::format::DurationFormat;
use crate::sort::{SortOrder, UnstartedOrder};
use crate::timestamp::DEFAULT_TIMESTAMP_FORMAT;

const DEFAULT_CSV_DELIMITER: &str = ",";

/// Errors for settings given as text.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SettingsError {
    /// The value is not one of the known spellings for the setting.
    #[error("invalid {setting}: {value}")]
    UnknownVariant {
        setting: &'static str,
        value: String,
    },
}

/// User-facing settings that shape how a timekeep is displayed and edited.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimekeepSettings {
    /// Moment-style pattern for editable timestamps. Blank means the default.
    pub timestamp_format: String,

    /// Minutes to round parsed timestamps to. Zero disables rounding.
    pub timestamp_round_to: u32,

    /// Reject edits that leave an entry's end equal to its start.
    pub timestamp_prevent_end_same_as_start: bool,

    /// Display and export order for top-level entries.
    pub sort_order: SortOrder,

    /// Where unstarted entries go under start-time sort orders.
    pub unstarted_order: UnstartedOrder,

    /// Show the decimal-hours total next to the long total.
    pub show_decimal_hours: bool,

    /// Duration style used by CSV and Markdown export.
    pub export_duration_format: DurationFormat,

    /// Emit a heading row in CSV export.
    pub csv_title: bool,

    /// Field delimiter for CSV export. Blank means a comma.
    pub csv_delimiter: String,

    /// Pretty-print JSON when writing a bare JSON document.
    pub format_copied_json: bool,
}

impl Default for TimekeepSettings {
    fn default() -> Self {
        Self {
            timestamp_format: DEFAULT_TIMESTAMP_FORMAT.to_string(),
            timestamp_round_to: 0,
            timestamp_prevent_end_same_as_start: false,
            sort_order: SortOrder::default(),
            unstarted_order: UnstartedOrder::default(),
            show_decimal_hours: false,
            export_duration_format: DurationFormat::default(),
            csv_title: true,
            csv_delimiter: DEFAULT_CSV_DELIMITER.to_string(),
            format_copied_json: false,
        }
    }
}

impl TimekeepSettings {
    /// The timestamp pattern in effect, falling back to the default when blank.
    pub fn timestamp_format(&self) -> &str {
        if self.timestamp_format.trim().is_empty() {
            DEFAULT_TIMESTAMP_FORMAT
        } else {
            &self.timestamp_format
        }
    }

    /// The CSV delimiter in effect, falling back to a comma when blank.
    pub fn csv_delimiter(&self) -> &str {
        if self.csv_delimiter.is_empty() {
            DEFAULT_CSV_DELIMITER
        } else {
            &self.csv_delimiter
        }
    }
}
