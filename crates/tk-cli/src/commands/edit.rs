//! Edit and remove commands.

use std::io::Write;

use anyhow::Result;
use chrono::TimeZone;
use tk_core::{EditIssue, EntryEdit, Timekeep, TimekeepSettings};

use super::util::{resolve_id, short_id};

/// Fields given on the command line. Missing fields keep their stored value.
#[derive(Debug, Default)]
pub struct EditArgs<'a> {
    pub id: &'a str,
    pub name: Option<&'a str>,
    pub start: Option<&'a str>,
    pub end: Option<&'a str>,
}

fn describe(issue: &EditIssue) -> String {
    match issue {
        EditIssue::InvalidStart(err) => format!("start time not changed: {err}"),
        EditIssue::InvalidEnd(err) => format!("end time not changed: {err}"),
        EditIssue::EndSameAsStart => "times not changed: end would equal start".to_string(),
    }
}

/// Edits one entry. Rejected fields are reported and left as they were.
pub fn run<W: Write, Tz>(
    writer: &mut W,
    timekeep: &Timekeep,
    args: &EditArgs<'_>,
    settings: &TimekeepSettings,
    tz: &Tz,
) -> Result<Timekeep>
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    let id = resolve_id(timekeep, args.id)?;
    let Some(entry) = timekeep.find(&id) else {
        anyhow::bail!("no entry with id '{}'", args.id);
    };

    if args.start.is_some() && entry.start_time().is_none() {
        writeln!(writer, "warning: '{}' has no start time to change", entry.name())?;
    }
    if args.end.is_some() && entry.end_time().is_none() {
        writeln!(writer, "warning: '{}' has no end time to change", entry.name())?;
    }
    let edit = EntryEdit {
        name: args.name.map_or_else(|| entry.name().to_string(), String::from),
        start: args.start.map(String::from),
        end: args.end.map(String::from),
    };

    let Some((updated, committed)) = timekeep.apply_edit(&id, &edit, settings, tz) else {
        anyhow::bail!("no entry with id '{}'", args.id);
    };
    for issue in &committed.issues {
        tracing::warn!(%id, ?issue, "edit field rejected");
        writeln!(writer, "warning: {}", describe(issue))?;
    }
    tracing::info!(%id, clean = committed.is_clean(), "edited entry");
    writeln!(writer, "Updated '{}' ({})", committed.entry.name(), short_id(&id))?;
    Ok(updated)
}

/// Removes an entry and everything nested under it.
pub fn remove<W: Write>(writer: &mut W, timekeep: &Timekeep, id: &str) -> Result<Timekeep> {
    let id = resolve_id(timekeep, id)?;
    let name = timekeep.find(&id).map(|entry| entry.name().to_string()).unwrap_or_default();
    let updated = timekeep.remove_entry_by_id(&id);
    tracing::info!(%id, "removed entry");
    writeln!(writer, "Removed '{name}' ({})", short_id(&id))?;
    Ok(updated)
}

#[cfg(test)]
mod tests {
    use super::*;

    use chrono::{DateTime, Duration, Utc};
    use tk_core::{EntryId, TimeEntry, Timing};

    fn at(hour: u32, minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 15, hour, minute, 0).unwrap()
    }

    fn sample() -> Timekeep {
        Timekeep::new(vec![
            TimeEntry::leaf(
                EntryId::new("aaaa1111").unwrap(),
                "Draft",
                Timing::Stopped {
                    start: at(9, 0),
                    end: at(10, 0),
                },
            ),
            TimeEntry::group(
                EntryId::new("bbbb2222").unwrap(),
                "Meetings",
                vec![TimeEntry::leaf(
                    EntryId::new("cccc3333").unwrap(),
                    "Standup",
                    Timing::Running { start: at(11, 0) },
                )],
            ),
        ])
        .unwrap()
    }

    fn edit(timekeep: &Timekeep, args: &EditArgs<'_>) -> (Timekeep, String) {
        let mut output = Vec::new();
        let updated = run(&mut output, timekeep, args, &TimekeepSettings::default(), &Utc).unwrap();
        (updated, String::from_utf8(output).unwrap())
    }

    #[test]
    fn edit_changes_name_and_times() {
        let (updated, output) = edit(
            &sample(),
            &EditArgs {
                id: "aaaa",
                name: Some("Final draft"),
                start: Some("25-01-15 08:30:00"),
                end: Some("25-01-15 10:15:00"),
            },
        );

        let entry = &updated.entries[0];
        assert_eq!(entry.name(), "Final draft");
        assert_eq!(entry.start_time(), Some(at(8, 30)));
        assert_eq!(entry.end_time(), Some(at(10, 15)));
        assert_eq!(output, "Updated 'Final draft' (aaaa1111)\n");
    }

    #[test]
    fn edit_keeps_time_on_bad_input() {
        let (updated, output) = edit(
            &sample(),
            &EditArgs {
                id: "aaaa1111",
                start: Some("yesterday"),
                ..EditArgs::default()
            },
        );

        assert_eq!(updated, sample());
        assert!(output.starts_with("warning: start time not changed:"));
    }

    #[test]
    fn edit_group_only_renames() {
        let (updated, output) = edit(
            &sample(),
            &EditArgs {
                id: "bbbb",
                name: Some("Calls"),
                start: Some("25-01-15 08:00:00"),
                ..EditArgs::default()
            },
        );

        assert_eq!(updated.entries[1].name(), "Calls");
        assert_eq!(updated.entries[1].sub_entries(), sample().entries[1].sub_entries());
        assert!(output.starts_with("warning: 'Meetings' has no start time to change"));
    }

    #[test]
    fn edit_running_entry_cannot_set_end() {
        let (updated, output) = edit(
            &sample(),
            &EditArgs {
                id: "cccc",
                end: Some("25-01-15 12:00:00"),
                ..EditArgs::default()
            },
        );

        assert!(updated.is_running());
        assert!(output.starts_with("warning: 'Standup' has no end time to change"));
    }

    #[test]
    fn rename_leaves_unrounded_times_alone() {
        let start = at(9, 7) + Duration::milliseconds(123);
        let end = at(10, 52);
        let timekeep = Timekeep::new(vec![TimeEntry::leaf(
            EntryId::new("aaaa1111").unwrap(),
            "Draft",
            Timing::Stopped { start, end },
        )])
        .unwrap();
        let settings = TimekeepSettings {
            timestamp_round_to: 15,
            timestamp_prevent_end_same_as_start: true,
            ..TimekeepSettings::default()
        };

        let mut output = Vec::new();
        let updated = run(
            &mut output,
            &timekeep,
            &EditArgs {
                id: "aaaa",
                name: Some("Renamed"),
                ..EditArgs::default()
            },
            &settings,
            &Utc,
        )
        .unwrap();

        let entry = &updated.entries[0];
        assert_eq!(entry.name(), "Renamed");
        assert_eq!(entry.start_time(), Some(start));
        assert_eq!(entry.end_time(), Some(end));
        assert_eq!(String::from_utf8(output).unwrap(), "Updated 'Renamed' (aaaa1111)\n");
    }

    #[test]
    fn remove_drops_subtree() {
        let mut output = Vec::new();
        let updated = remove(&mut output, &sample(), "bbbb").unwrap();

        assert_eq!(updated.entries.len(), 1);
        assert!(updated.find(&EntryId::new("cccc3333").unwrap()).is_none());
        assert_eq!(String::from_utf8(output).unwrap(), "Removed 'Meetings' (bbbb2222)\n");
    }

    #[test]
    fn remove_unknown_id_fails() {
        let mut output = Vec::new();
        assert!(remove(&mut output, &sample(), "zzzz").is_err());
    }
}
