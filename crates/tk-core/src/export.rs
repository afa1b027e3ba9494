//! CSV and Markdown tables for copying a timesheet elsewhere.

use std::fmt::Write;

use chrono::{DateTime, TimeZone, Utc};

use crate::duration::{entry_duration, total_duration};
use crate::entry::TimeEntry;
use crate::format::format_duration;
use crate::settings::TimekeepSettings;
use crate::sort::sort_entries;
use crate::timestamp::TimestampCodec;

const HEADINGS: [&str; 4] = ["Block", "Start time", "End time", "Duration"];

/// One rendered table row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportRow {
    pub depth: usize,
    pub name: String,
    pub start: String,
    pub end: String,
    pub duration: String,
}

/// Flattens entries into rows: top level in display order, children below
/// their group in storage order.
pub fn export_rows<Tz>(
    entries: &[TimeEntry],
    settings: &TimekeepSettings,
    now: DateTime<Utc>,
    tz: &Tz,
) -> Vec<ExportRow>
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    let codec = TimestampCodec::from_settings(settings);
    let sorted = sort_entries(entries, settings.sort_order, settings.unstarted_order);
    let mut rows = Vec::new();
    push_rows(&sorted, 0, &codec, settings, now, tz, &mut rows);
    rows
}

fn push_rows<Tz>(
    entries: &[TimeEntry],
    depth: usize,
    codec: &TimestampCodec,
    settings: &TimekeepSettings,
    now: DateTime<Utc>,
    tz: &Tz,
    rows: &mut Vec<ExportRow>,
) where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    for entry in entries {
        let format_time = |t: Option<DateTime<Utc>>| t.map(|t| codec.format(t, tz)).unwrap_or_default();
        rows.push(ExportRow {
            depth,
            name: entry.name().to_string(),
            start: format_time(entry.start_time()),
            end: format_time(entry.end_time()),
            duration: format_duration(entry_duration(entry, now), settings.export_duration_format),
        });
        if let Some(subs) = entry.sub_entries() {
            push_rows(subs, depth + 1, codec, settings, now, tz, rows);
        }
    }
}

fn indented(row: &ExportRow) -> String {
    format!("{}{}", "- ".repeat(row.depth), row.name)
}

fn total_text(entries: &[TimeEntry], settings: &TimekeepSettings, now: DateTime<Utc>) -> String {
    format_duration(total_duration(entries, now), settings.export_duration_format)
}

/// Renders entries as delimited text with a trailing total row.
pub fn to_csv<Tz>(
    entries: &[TimeEntry],
    settings: &TimekeepSettings,
    now: DateTime<Utc>,
    tz: &Tz,
) -> String
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    let delimiter = settings.csv_delimiter();
    let line = |fields: [&str; 4]| {
        fields
            .iter()
            .map(|field| csv_field(field, delimiter))
            .collect::<Vec<_>>()
            .join(delimiter)
    };

    let mut output = String::new();
    if settings.csv_title {
        writeln!(output, "{}", line(HEADINGS)).unwrap();
    }
    for row in export_rows(entries, settings, now, tz) {
        let name = indented(&row);
        writeln!(
            output,
            "{}",
            line([name.as_str(), row.start.as_str(), row.end.as_str(), row.duration.as_str()])
        )
        .unwrap();
    }
    let total = total_text(entries, settings, now);
    writeln!(output, "{}", line(["Total", "", "", total.as_str()])).unwrap();
    output
}

/// Quotes a field when it holds the delimiter, a quote, or a line break.
fn csv_field(field: &str, delimiter: &str) -> String {
    if field.contains(delimiter) || field.contains('"') || field.contains('\n') {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

/// Renders entries as a Markdown table with a bold total row.
pub fn to_markdown<Tz>(
    entries: &[TimeEntry],
    settings: &TimekeepSettings,
    now: DateTime<Utc>,
    tz: &Tz,
) -> String
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    let mut output = String::new();
    writeln!(output, "| {} |", HEADINGS.join(" | ")).unwrap();
    writeln!(output, "| ----- | ---------- | -------- | -------- |").unwrap();
    for row in export_rows(entries, settings, now, tz) {
        writeln!(
            output,
            "| {} | {} | {} | {} |",
            indented(&row).replace('|', "\\|"),
            row.start,
            row.end,
            row.duration
        )
        .unwrap();
    }
    writeln!(
        output,
        "| **Total** |  |  | **{}** |",
        total_text(entries, settings, now)
    )
    .unwrap();
    output
}
