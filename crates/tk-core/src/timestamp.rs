//! Editable timestamp text: formatting, parsing and rounding.
//!
//! Patterns use moment.js tokens (`YY-MM-DD HH:mm:ss`) and are translated to
//! chrono `strftime` items. Text is read and written in a caller-supplied time
//! zone; instants are always stored as UTC.
//!
//! Supported tokens:
//!
//! | token | meaning | token | meaning |
//! |-------|---------|-------|---------|
//! | `YYYY` | 4-digit year | `HH` / `H` | 24h hour |
//! | `YY` | 2-digit year | `hh` / `h` | 12h hour |
//! | `MMMM` / `MMM` | month name | `mm` / `m` | minute |
//! | `MM` / `M` | month number | `ss` / `s` | second |
//! | `DD` / `D` | day of month | `SSS` | milliseconds |
//! | `dddd` / `ddd` | weekday name | `A` / `a` | AM/PM |
//! | `Z` / `ZZ` | UTC offset | `[text]` | literal text |

use chrono::format::{Parsed, StrftimeItems};
use chrono::{
    DateTime, Datelike, Duration, FixedOffset, Local, LocalResult, NaiveDate, NaiveDateTime,
    NaiveTime, TimeZone, Utc,
};
use thiserror::Error;

use crate::settings::TimekeepSettings;

/// Pattern used when the configured one is blank.
pub const DEFAULT_TIMESTAMP_FORMAT: &str = "YY-MM-DD HH:mm:ss";

const MILLIS_PER_MINUTE: i64 = 60_000;
const MILLIS_PER_DAY: i64 = 24 * 60 * MILLIS_PER_MINUTE;

/// Moment tokens and their strftime equivalents, longest first.
const TOKENS: &[(&str, &str)] = &[
    ("YYYY", "%Y"),
    ("MMMM", "%B"),
    ("dddd", "%A"),
    ("MMM", "%b"),
    ("ddd", "%a"),
    ("SSS", "%3f"),
    ("YY", "%y"),
    ("MM", "%m"),
    ("DD", "%d"),
    ("HH", "%H"),
    ("hh", "%I"),
    ("mm", "%M"),
    ("ss", "%S"),
    ("ZZ", "%z"),
    ("M", "%-m"),
    ("D", "%-d"),
    ("H", "%-H"),
    ("h", "%-I"),
    ("m", "%-M"),
    ("s", "%-S"),
    ("A", "%p"),
    ("a", "%P"),
    ("Z", "%:z"),
];

/// Why timestamp text could not be turned into an instant.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TimestampError {
    /// Nothing was entered.
    #[error("timestamp is empty")]
    Empty,

    /// The text does not follow the configured pattern.
    #[error("'{text}' does not match timestamp format '{format}'")]
    Mismatch { text: String, format: String },

    /// The wall-clock time falls in a gap of the time zone (e.g. a DST jump).
    #[error("'{text}' does not exist in the local time zone")]
    NonexistentLocalTime { text: String },
}

/// Formats and parses editable timestamps for one pattern and rounding interval.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimestampCodec {
    format: String,
    strftime: String,
    has_offset: bool,
    round_to: u32,
}

impl TimestampCodec {
    /// Builds a codec for a moment-style pattern.
    pub fn new(format: &str, round_to: u32) -> Self {
        let (strftime, has_offset) = translate_pattern(format);
        Self {
            format: format.to_string(),
            strftime,
            has_offset,
            round_to,
        }
    }

    pub fn from_settings(settings: &TimekeepSettings) -> Self {
        Self::new(settings.timestamp_format(), settings.timestamp_round_to)
    }

    /// Renders `instant` as wall-clock text in `tz`.
    pub fn format<Tz>(&self, instant: DateTime<Utc>, tz: &Tz) -> String
    where
        Tz: TimeZone,
        Tz::Offset: std::fmt::Display,
    {
        instant.with_timezone(tz).format(&self.strftime).to_string()
    }

    /// Parses wall-clock text in `tz`, rounding a valid result when configured.
    ///
    /// Patterns must name a date and at least hours and minutes.
    pub fn parse<Tz: TimeZone>(&self, text: &str, tz: &Tz) -> Result<DateTime<Utc>, TimestampError> {
        self.parse_near(text, tz, None)
    }

    /// Parses wall-clock text like [`parse`](Self::parse), taking any date
    /// fields the pattern leaves out from `reference` as seen in `tz`.
    ///
    /// With `HH:mm`, editing an instant keeps its day and changes only the
    /// time. Without a reference the pattern must carry a full date.
    pub fn parse_near<Tz: TimeZone>(
        &self,
        text: &str,
        tz: &Tz,
        reference: Option<DateTime<Utc>>,
    ) -> Result<DateTime<Utc>, TimestampError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(TimestampError::Empty);
        }

        let mismatch = || TimestampError::Mismatch {
            text: text.to_string(),
            format: self.format.clone(),
        };

        let mut parsed = Parsed::new();
        chrono::format::parse(&mut parsed, text, StrftimeItems::new(&self.strftime))
            .map_err(|_| mismatch())?;
        if let Some(reference) = reference {
            fill_missing_date(&mut parsed, reference.with_timezone(tz).date_naive())
                .map_err(|_| mismatch())?;
        }

        let date = parsed.to_naive_date().map_err(|_| mismatch())?;
        let time = parsed.to_naive_time().map_err(|_| mismatch())?;
        let local = round_to_interval(date.and_time(time), self.round_to);

        let resolved = if self.has_offset {
            let offset = parsed.to_fixed_offset().map_err(|_| mismatch())?;
            resolve_local(local, &offset)
        } else {
            resolve_local(local, tz)
        };
        resolved.ok_or_else(|| TimestampError::NonexistentLocalTime {
            text: text.to_string(),
        })
    }
}

/// Sets year, month and day from `date` where the text did not give them.
fn fill_missing_date(parsed: &mut Parsed, date: NaiveDate) -> chrono::format::ParseResult<()> {
    let has_year = parsed.year().is_some()
        || parsed.year_mod_100().is_some()
        || parsed.isoyear().is_some()
        || parsed.isoyear_mod_100().is_some();
    if !has_year {
        parsed.set_year(i64::from(date.year()))?;
    }
    if parsed.ordinal().is_some() {
        return Ok(());
    }
    if parsed.month().is_none() {
        parsed.set_month(i64::from(date.month()))?;
    }
    if parsed.day().is_none() {
        parsed.set_day(i64::from(date.day()))?;
    }
    Ok(())
}

/// Translates a moment-style pattern into a strftime string.
///
/// Returns the pattern and whether it carries a UTC offset.
fn translate_pattern(pattern: &str) -> (String, bool) {
    let mut out = String::with_capacity(pattern.len() * 2);
    let mut has_offset = false;
    let mut rest = pattern;

    while let Some(c) = rest.chars().next() {
        if c == '[' {
            let literal_end = rest.find(']').unwrap_or(rest.len());
            push_literal(&mut out, &rest[1..literal_end]);
            rest = &rest[(literal_end + 1).min(rest.len())..];
            continue;
        }

        if let Some((token, item)) = TOKENS.iter().find(|(token, _)| rest.starts_with(token)) {
            has_offset |= token.starts_with('Z');
            out.push_str(item);
            rest = &rest[token.len()..];
            continue;
        }

        push_literal(&mut out, &rest[..c.len_utf8()]);
        rest = &rest[c.len_utf8()..];
    }

    (out, has_offset)
}

fn push_literal(out: &mut String, literal: &str) {
    for c in literal.chars() {
        if c == '%' {
            out.push_str("%%");
        } else {
            out.push(c);
        }
    }
}

/// Resolves wall-clock time in `tz`, taking the earlier instant when ambiguous.
fn resolve_local<Tz: TimeZone>(local: NaiveDateTime, tz: &Tz) -> Option<DateTime<Utc>> {
    match tz.from_local_datetime(&local) {
        LocalResult::Single(dt) | LocalResult::Ambiguous(dt, _) => Some(dt.with_timezone(&Utc)),
        LocalResult::None => None,
    }
}

/// Snaps wall-clock time to the nearest `minutes` mark counted from midnight.
///
/// Halves round up, seconds are cleared, and the result never passes the next
/// midnight, so rounding twice gives the same value. Zero returns the input.
pub fn round_to_interval(local: NaiveDateTime, minutes: u32) -> NaiveDateTime {
    if minutes == 0 {
        return local;
    }

    let midnight = local.date().and_time(NaiveTime::MIN);
    let elapsed_ms = (local - midnight).num_milliseconds();
    let interval_ms = i64::from(minutes) * MILLIS_PER_MINUTE;
    let rounded_ms = ((elapsed_ms + interval_ms / 2) / interval_ms * interval_ms).min(MILLIS_PER_DAY);

    midnight + Duration::milliseconds(rounded_ms)
}

/// Formats `instant` for an edit field in the local time zone.
pub fn format_editable_timestamp(instant: DateTime<Utc>, settings: &TimekeepSettings) -> String {
    format_editable_timestamp_in(instant, settings, &Local)
}

/// Formats `instant` for an edit field in `tz`.
pub fn format_editable_timestamp_in<Tz>(
    instant: DateTime<Utc>,
    settings: &TimekeepSettings,
    tz: &Tz,
) -> String
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    TimestampCodec::from_settings(settings).format(instant, tz)
}

/// Parses edit-field text in the local time zone.
pub fn parse_editable_timestamp(
    text: &str,
    settings: &TimekeepSettings,
) -> Result<DateTime<Utc>, TimestampError> {
    parse_editable_timestamp_in(text, settings, &Local)
}

/// Parses edit-field text in `tz`.
pub fn parse_editable_timestamp_in<Tz: TimeZone>(
    text: &str,
    settings: &TimekeepSettings,
    tz: &Tz,
) -> Result<DateTime<Utc>, TimestampError> {
    TimestampCodec::from_settings(settings).parse(text, tz)
}

/// A fixed UTC offset, in whole hours east of UTC.
///
/// Convenience for callers that display in a zone other than local time.
pub fn fixed_offset_hours(hours: i32) -> Option<FixedOffset> {
    hours.checked_mul(3600).and_then(FixedOffset::east_opt)
}
