//! Export command: the timesheet as CSV, a Markdown table, or JSON.

use std::io::Write;

use anyhow::{Context, Result};
use chrono::{DateTime, TimeZone, Utc};
use tk_core::{Timekeep, TimekeepSettings, export};

use crate::cli::ExportFormat;

/// Formats the timekeep for copying elsewhere.
///
/// JSON is the stored document shape, pretty-printed when
/// `format_copied_json` is set.
pub fn format_export<Tz>(
    timekeep: &Timekeep,
    format: ExportFormat,
    settings: &TimekeepSettings,
    now: DateTime<Utc>,
    tz: &Tz,
) -> Result<String>
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    let output = match format {
        ExportFormat::Csv => export::to_csv(&timekeep.entries, settings, now, tz),
        ExportFormat::Markdown => export::to_markdown(&timekeep.entries, settings, now, tz),
        ExportFormat::Json => {
            let json = if settings.format_copied_json {
                serde_json::to_string_pretty(timekeep)
            } else {
                serde_json::to_string(timekeep)
            }
            .context("failed to serialize timekeep")?;
            format!("{json}\n")
        }
    };
    Ok(output)
}

pub fn run<W: Write, Tz>(
    writer: &mut W,
    timekeep: &Timekeep,
    format: ExportFormat,
    settings: &TimekeepSettings,
    now: DateTime<Utc>,
    tz: &Tz,
) -> Result<()>
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    write!(writer, "{}", format_export(timekeep, format, settings, now, tz)?)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use insta::assert_snapshot;
    use tk_core::{DurationFormat, EntryId, TimeEntry, Timing};

    fn at(hour: u32, minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 15, hour, minute, 0).unwrap()
    }

    fn sample() -> Timekeep {
        Timekeep::new(vec![TimeEntry::leaf(
            EntryId::new("e1").unwrap(),
            "Writing",
            Timing::Stopped {
                start: at(9, 0),
                end: at(10, 30),
            },
        )])
        .unwrap()
    }

    #[test]
    fn csv_uses_export_duration_format() {
        let settings = TimekeepSettings {
            export_duration_format: DurationFormat::Decimal,
            ..TimekeepSettings::default()
        };
        let output = format_export(&sample(), ExportFormat::Csv, &settings, at(12, 0), &Utc).unwrap();
        assert_snapshot!(output, @r"
        Block,Start time,End time,Duration
        Writing,25-01-15 09:00:00,25-01-15 10:30:00,1.5
        Total,,,1.5
        ");
    }

    #[test]
    fn json_export_roundtrips() {
        let settings = TimekeepSettings {
            format_copied_json: true,
            ..TimekeepSettings::default()
        };
        let output = format_export(&sample(), ExportFormat::Json, &settings, at(12, 0), &Utc).unwrap();
        assert!(output.contains("\n  \"entries\""));

        let parsed: Timekeep = serde_json::from_str(&output).unwrap();
        assert_eq!(parsed, sample());
    }

    #[test]
    fn markdown_writes_through_writer() {
        let mut output = Vec::new();
        run(
            &mut output,
            &sample(),
            ExportFormat::Markdown,
            &TimekeepSettings::default(),
            at(12, 0),
            &Utc,
        )
        .unwrap();
        let output = String::from_utf8(output).unwrap();
        assert!(output.starts_with("| Block | Start time | End time | Duration |\n"));
        assert!(output.ends_with("| **Total** |  |  | **1h 30m 0s** |\n"));
    }
}
