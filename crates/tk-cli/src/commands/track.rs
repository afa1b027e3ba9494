//! Start and stop commands.

use std::io::Write;

use anyhow::Result;
use chrono::{DateTime, Utc};
use tk_core::{Timekeep, tree};

use super::util::{resolve_id, short_id};

/// Starts a running entry at `now`, at the root or under `parent`.
///
/// `parent` accepts a full id or a unique id prefix. Returns the new timekeep.
pub fn start<W: Write>(
    writer: &mut W,
    timekeep: &Timekeep,
    name: &str,
    parent: Option<&str>,
    now: DateTime<Utc>,
) -> Result<Timekeep> {
    let parent_id = parent.map(|text| resolve_id(timekeep, text)).transpose()?;
    let updated = timekeep.start_entry(name, parent_id.as_ref(), now);

    let before = tree::flatten_ids(&timekeep.entries);
    let started = tree::running_entries(&updated.entries)
        .into_iter()
        .rfind(|entry| !before.contains(entry.id()));

    match started {
        Some(entry) => {
            tracing::info!(id = %entry.id(), name = entry.name(), "started entry");
            writeln!(writer, "Started '{}' ({})", entry.name(), short_id(entry.id()))?;
        }
        None => anyhow::bail!("failed to start entry"),
    }
    Ok(updated)
}

/// Stops every running entry at `now`. Returns the new timekeep.
pub fn stop<W: Write>(writer: &mut W, timekeep: &Timekeep, now: DateTime<Utc>) -> Result<Timekeep> {
    let running = tree::running_entries(&timekeep.entries);
    if running.is_empty() {
        writeln!(writer, "No running entries.")?;
        return Ok(timekeep.clone());
    }

    for entry in &running {
        tracing::info!(id = %entry.id(), name = entry.name(), "stopped entry");
        writeln!(writer, "Stopped '{}' ({})", entry.name(), short_id(entry.id()))?;
    }
    Ok(timekeep.stop_running(now))
}
