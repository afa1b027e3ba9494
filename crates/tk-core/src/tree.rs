//! Structural operations over the entry tree.
//!
//! Every operation takes the current entries by reference and returns a new
//! sequence; the input is never modified. Lookups match ids anywhere in the
//! tree. A missing target is not an error: the entries come back unchanged.

use chrono::{DateTime, Utc};

use crate::entry::{EntryId, TimeEntry, Timing};

/// Finds the first entry with `id`, searching depth-first.
pub fn find_entry<'a>(entries: &'a [TimeEntry], id: &EntryId) -> Option<&'a TimeEntry> {
    for entry in entries {
        if entry.id() == id {
            return Some(entry);
        }
        if let Some(found) = entry.sub_entries().and_then(|subs| find_entry(subs, id)) {
            return Some(found);
        }
    }
    None
}

/// Returns every id in the tree in pre-order.
pub fn flatten_ids(entries: &[TimeEntry]) -> Vec<EntryId> {
    let mut ids = Vec::new();
    collect_ids(entries, &mut ids);
    ids
}

fn collect_ids(entries: &[TimeEntry], ids: &mut Vec<EntryId>) {
    for entry in entries {
        ids.push(entry.id().clone());
        if let Some(subs) = entry.sub_entries() {
            collect_ids(subs, ids);
        }
    }
}

/// Replaces the first entry matching `id` with `replacement`, in the same slot.
///
/// The replacement is not revalidated; callers supply a consistent entry.
pub fn update_entry(
    entries: &[TimeEntry],
    id: &EntryId,
    replacement: &TimeEntry,
) -> Vec<TimeEntry> {
    replace_in(entries, id, replacement).unwrap_or_else(|| {
        tracing::debug!(%id, "update target not found, entries unchanged");
        entries.to_vec()
    })
}

/// Returns `Some` with the rebuilt level when the match was found at or below it.
fn replace_in(
    entries: &[TimeEntry],
    id: &EntryId,
    replacement: &TimeEntry,
) -> Option<Vec<TimeEntry>> {
    for (index, entry) in entries.iter().enumerate() {
        let rebuilt = if entry.id() == id {
            replacement.clone()
        } else if let TimeEntry::Group {
            id: group_id,
            name,
            sub_entries,
        } = entry
        {
            let Some(children) = replace_in(sub_entries, id, replacement) else {
                continue;
            };
            TimeEntry::group(group_id.clone(), name.clone(), children)
        } else {
            continue;
        };

        let mut level = entries.to_vec();
        level[index] = rebuilt;
        return Some(level);
    }
    None
}

/// Removes the entry with `target`'s id, together with its whole subtree.
pub fn remove_entry(entries: &[TimeEntry], target: &TimeEntry) -> Vec<TimeEntry> {
    remove_entry_by_id(entries, target.id())
}

/// Removes the entry with `id`, together with its whole subtree.
pub fn remove_entry_by_id(entries: &[TimeEntry], id: &EntryId) -> Vec<TimeEntry> {
    if find_entry(entries, id).is_none() {
        tracing::debug!(%id, "remove target not found, entries unchanged");
        return entries.to_vec();
    }
    remove_in(entries, id)
}

fn remove_in(entries: &[TimeEntry], id: &EntryId) -> Vec<TimeEntry> {
    entries
        .iter()
        .filter(|entry| entry.id() != id)
        .map(|entry| match entry {
            TimeEntry::Group {
                id: group_id,
                name,
                sub_entries,
            } => TimeEntry::group(group_id.clone(), name.clone(), remove_in(sub_entries, id)),
            TimeEntry::Leaf { .. } => entry.clone(),
        })
        .collect()
}

/// Creates a fresh leaf that starts running at `start`.
pub fn create_entry(name: impl Into<String>, start: DateTime<Utc>) -> TimeEntry {
    TimeEntry::leaf(EntryId::generate(), name, Timing::Running { start })
}

/// Appends a new running entry at the root.
///
/// A blank name becomes `Block N`, numbered after the existing top-level entries.
pub fn start_new_entry(entries: &[TimeEntry], name: &str, now: DateTime<Utc>) -> Vec<TimeEntry> {
    let name = non_blank(name).map_or_else(|| format!("Block {}", entries.len() + 1), String::from);
    let mut updated = entries.to_vec();
    updated.push(create_entry(name, now));
    updated
}

/// Starts a running entry nested under `parent_id`.
///
/// A group parent gains the new entry as its last child. A leaf parent turns
/// into a group that keeps its id and name, holding its former timing as
/// `Part 1` and the new entry as `Part 2`.
pub fn start_nested_entry(
    entries: &[TimeEntry],
    parent_id: &EntryId,
    name: &str,
    now: DateTime<Utc>,
) -> Vec<TimeEntry> {
    let Some(parent) = find_entry(entries, parent_id) else {
        tracing::debug!(%parent_id, "parent not found, entries unchanged");
        return entries.to_vec();
    };

    let replacement = match parent {
        TimeEntry::Group {
            id,
            name: group_name,
            sub_entries,
        } => {
            let child_name = non_blank(name)
                .map_or_else(|| format!("Part {}", sub_entries.len() + 1), String::from);
            let mut children = sub_entries.clone();
            children.push(create_entry(child_name, now));
            TimeEntry::group(id.clone(), group_name.clone(), children)
        }
        TimeEntry::Leaf {
            id,
            name: leaf_name,
            timing,
        } => {
            let first = TimeEntry::leaf(EntryId::generate(), "Part 1", *timing);
            let second = create_entry(non_blank(name).unwrap_or("Part 2"), now);
            TimeEntry::group(id.clone(), leaf_name.clone(), vec![first, second])
        }
    };

    update_entry(entries, parent_id, &replacement)
}

fn non_blank(name: &str) -> Option<&str> {
    let trimmed = name.trim();
    (!trimmed.is_empty()).then_some(trimmed)
}

/// Whether this entry, or anything below it, is running.
pub fn is_running(entry: &TimeEntry) -> bool {
    match entry {
        TimeEntry::Leaf { timing, .. } => timing.is_running(),
        TimeEntry::Group { sub_entries, .. } => sub_entries.iter().any(is_running),
    }
}

/// All running leaves, in pre-order.
///
/// More than one entry may be running at a time.
pub fn running_entries(entries: &[TimeEntry]) -> Vec<&TimeEntry> {
    let mut running = Vec::new();
    collect_running(entries, &mut running);
    running
}

fn collect_running<'a>(entries: &'a [TimeEntry], running: &mut Vec<&'a TimeEntry>) {
    for entry in entries {
        match entry {
            TimeEntry::Leaf { timing, .. } if timing.is_running() => running.push(entry),
            TimeEntry::Leaf { .. } => {}
            TimeEntry::Group { sub_entries, .. } => collect_running(sub_entries, running),
        }
    }
}

/// Ends every running leaf at `end`.
pub fn stop_running_entries(entries: &[TimeEntry], end: DateTime<Utc>) -> Vec<TimeEntry> {
    entries
        .iter()
        .map(|entry| match entry {
            TimeEntry::Leaf {
                id,
                name,
                timing: Timing::Running { start },
            } => {
                tracing::debug!(%id, "stopping running entry");
                TimeEntry::leaf(id.clone(), name.clone(), Timing::Stopped { start: *start, end })
            }
            TimeEntry::Leaf { .. } => entry.clone(),
            TimeEntry::Group {
                id,
                name,
                sub_entries,
            } => TimeEntry::group(
                id.clone(),
                name.clone(),
                stop_running_entries(sub_entries, end),
            ),
        })
        .collect()
}
