//! Shared utilities for CLI commands.

use std::sync::LazyLock;

use anyhow::Context;
use chrono::{DateTime, Duration, Utc};
use regex::Regex;
use tk_core::{EntryId, Timekeep, tree};

/// Pre-compiled regex for relative time parsing.
static RELATIVE_TIME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+)\s+(minute|hour|day|week)s?\s+ago$").unwrap());

/// Conservative bounds for relative time parsing (~1000 years in minutes).
const MAX_RELATIVE_MINUTES: i64 = 1000 * 365 * 24 * 60;

/// Length of the id prefix shown in tables.
pub const SHORT_ID_LEN: usize = 8;

/// Parse a reference time as either ISO 8601 or relative to `now`.
///
/// Supports:
/// - ISO 8601: "2026-01-15T10:30:00Z"
/// - Relative: "2 hours ago", "30 minutes ago", "1 day ago", "1 week ago"
pub fn parse_datetime(s: &str, now: DateTime<Utc>) -> anyhow::Result<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }

    let Some(caps) = RELATIVE_TIME_RE.captures(s) else {
        anyhow::bail!(
            "Invalid datetime: {s}. Use ISO 8601 (e.g., 2026-01-15T10:30:00Z) or relative (e.g., '2 hours ago')"
        );
    };

    let n: i64 = caps[1]
        .parse()
        .context("failed to parse number in relative time")?;

    let (max_for_unit, minutes_per_unit) = match &caps[2] {
        "minute" => (MAX_RELATIVE_MINUTES, 1),
        "hour" => (MAX_RELATIVE_MINUTES / 60, 60),
        "day" => (MAX_RELATIVE_MINUTES / (60 * 24), 60 * 24),
        "week" => (MAX_RELATIVE_MINUTES / (60 * 24 * 7), 60 * 24 * 7),
        unit => anyhow::bail!("Unknown time unit: {unit}"),
    };

    if n > max_for_unit {
        anyhow::bail!("Relative time value too large: {n} {}", &caps[2]);
    }

    Ok(now - Duration::minutes(n * minutes_per_unit))
}

/// Resolves a full id or a unique id prefix to an entry id.
pub fn resolve_id(timekeep: &Timekeep, text: &str) -> anyhow::Result<EntryId> {
    let ids = tree::flatten_ids(&timekeep.entries);
    if let Some(exact) = ids.iter().find(|id| id.as_str() == text) {
        return Ok(exact.clone());
    }

    let matches: Vec<_> = ids
        .into_iter()
        .filter(|id| !text.is_empty() && id.as_str().starts_with(text))
        .collect();
    match matches.as_slice() {
        [only] => Ok(only.clone()),
        [] => anyhow::bail!("no entry with id '{text}'"),
        _ => anyhow::bail!("id prefix '{text}' matches {} entries", matches.len()),
    }
}

/// First characters of an id, for display.
pub fn short_id(id: &EntryId) -> String {
    id.as_str().chars().take(SHORT_ID_LEN).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use tk_core::{TimeEntry, Timing};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 15, 12, 0, 0).unwrap()
    }

    fn timekeep() -> Timekeep {
        let leaf = |id: &str| TimeEntry::leaf(EntryId::new(id).unwrap(), id, Timing::Unstarted);
        Timekeep::new(vec![
            leaf("abc123"),
            TimeEntry::group(EntryId::new("abd999").unwrap(), "g", vec![leaf("f00d")]),
        ])
        .unwrap()
    }

    #[test]
    fn parses_rfc3339() {
        let parsed = parse_datetime("2025-01-15T09:30:00+01:00", now()).unwrap();
        assert_eq!(parsed, Utc.with_ymd_and_hms(2025, 1, 15, 8, 30, 0).unwrap());
    }

    #[test]
    fn parses_relative_to_now() {
        let parsed = parse_datetime("45 minutes ago", now()).unwrap();
        assert_eq!(parsed, Utc.with_ymd_and_hms(2025, 1, 15, 11, 15, 0).unwrap());
        assert_eq!(
            parse_datetime("1 day ago", now()).unwrap(),
            Utc.with_ymd_and_hms(2025, 1, 14, 12, 0, 0).unwrap()
        );
    }

    #[test]
    fn rejects_garbage_and_huge_values() {
        assert!(parse_datetime("soon", now()).is_err());
        assert!(parse_datetime("99999999999 weeks ago", now()).is_err());
    }

    #[test]
    fn resolves_exact_and_unique_prefix() {
        let timekeep = timekeep();
        assert_eq!(resolve_id(&timekeep, "abc123").unwrap().as_str(), "abc123");
        assert_eq!(resolve_id(&timekeep, "abc").unwrap().as_str(), "abc123");
        assert_eq!(resolve_id(&timekeep, "f0").unwrap().as_str(), "f00d");
    }

    #[test]
    fn rejects_ambiguous_or_unknown_prefix() {
        let timekeep = timekeep();
        assert!(resolve_id(&timekeep, "ab").is_err());
        assert!(resolve_id(&timekeep, "zzz").is_err());
        assert!(resolve_id(&timekeep, "").is_err());
    }
}
