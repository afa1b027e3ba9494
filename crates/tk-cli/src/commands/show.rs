//! Show and total commands.
//!
//! `tk show` prints the timesheet as a table in the configured display order;
//! `tk total` prints only the aggregate duration.

use std::fmt::Write as _;
use std::io::Write;

use anyhow::Result;
use chrono::{DateTime, TimeZone, Utc};
use tk_core::{
    Timekeep, TimeEntry, TimekeepSettings, TimestampCodec, entry_duration, format_duration_long,
    format_duration_short, sort_entries,
};

use super::util::short_id;

struct Row {
    id: String,
    name: String,
    start: String,
    end: String,
    duration: String,
}

fn collect_rows<Tz>(
    entries: &[TimeEntry],
    depth: usize,
    codec: &TimestampCodec,
    now: DateTime<Utc>,
    tz: &Tz,
    rows: &mut Vec<Row>,
) where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    for entry in entries {
        let end = match entry {
            TimeEntry::Leaf { timing, .. } if timing.is_running() => "running".to_string(),
            _ => entry
                .end_time()
                .map(|t| codec.format(t, tz))
                .unwrap_or_default(),
        };
        rows.push(Row {
            id: short_id(entry.id()),
            name: format!("{}{}", "  ".repeat(depth), entry.name()),
            start: entry
                .start_time()
                .map(|t| codec.format(t, tz))
                .unwrap_or_default(),
            end,
            duration: format_duration_long(entry_duration(entry, now)),
        });
        if let Some(subs) = entry.sub_entries() {
            collect_rows(subs, depth + 1, codec, now, tz, rows);
        }
    }
}

/// Formats the total line, with decimal hours when configured.
pub fn format_total(timekeep: &Timekeep, settings: &TimekeepSettings, now: DateTime<Utc>) -> String {
    let total = timekeep.total_duration(now);
    if settings.show_decimal_hours {
        format!("{} ({})", format_duration_long(total), format_duration_short(total))
    } else {
        format_duration_long(total)
    }
}

/// Formats the timesheet table.
///
/// Top-level entries follow the configured order; nested entries stay in
/// storage order beneath their group.
pub fn format_timekeep<Tz>(
    timekeep: &Timekeep,
    settings: &TimekeepSettings,
    now: DateTime<Utc>,
    tz: &Tz,
) -> String
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    let mut output = String::new();

    if timekeep.entries.is_empty() {
        writeln!(output, "No entries.").unwrap();
        writeln!(output).unwrap();
        writeln!(output, "Hint: Run 'tk start --name <name>' to start tracking.").unwrap();
        return output;
    }

    let codec = TimestampCodec::from_settings(settings);
    let sorted = sort_entries(&timekeep.entries, settings.sort_order, settings.unstarted_order);
    let mut rows = Vec::new();
    collect_rows(&sorted, 0, &codec, now, tz, &mut rows);

    let width = |heading: &str, cell: fn(&Row) -> &str| {
        rows.iter()
            .map(|row| cell(row).chars().count())
            .chain(std::iter::once(heading.chars().count()))
            .max()
            .unwrap_or(0)
    };
    let id_w = width("ID", |r| r.id.as_str());
    let name_w = width("Block", |r| r.name.as_str());
    let start_w = width("Start", |r| r.start.as_str());
    let end_w = width("End", |r| r.end.as_str());

    let mut line = |id: &str, name: &str, start: &str, end: &str, duration: &str| {
        let text = format!(
            "{id:<id_w$}  {name:<name_w$}  {start:<start_w$}  {end:<end_w$}  {duration}"
        );
        writeln!(output, "{}", text.trim_end()).unwrap();
    };

    line("ID", "Block", "Start", "End", "Duration");
    for row in &rows {
        line(&row.id, &row.name, &row.start, &row.end, &row.duration);
    }

    writeln!(output).unwrap();
    writeln!(output, "Total: {}", format_total(timekeep, settings, now)).unwrap();
    output
}

pub fn run<W: Write, Tz>(
    writer: &mut W,
    timekeep: &Timekeep,
    settings: &TimekeepSettings,
    now: DateTime<Utc>,
    tz: &Tz,
) -> Result<()>
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    write!(writer, "{}", format_timekeep(timekeep, settings, now, tz))?;
    Ok(())
}

pub fn total<W: Write>(
    writer: &mut W,
    timekeep: &Timekeep,
    settings: &TimekeepSettings,
    now: DateTime<Utc>,
) -> Result<()> {
    writeln!(writer, "{}", format_total(timekeep, settings, now))?;
    Ok(())
}
