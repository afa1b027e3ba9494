//! Duration presentation.

use std::fmt;

use chrono::Duration;
use serde::{Deserialize, Serialize};

use crate::settings::SettingsError;

/// How durations are written in exports.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DurationFormat {
    /// All units, e.g. `1h 30m 25s`.
    #[default]
    Long,
    /// Decimal hours with a unit, e.g. `1.5h`.
    Short,
    /// Decimal hours without a unit, e.g. `1.5`.
    Decimal,
}

impl DurationFormat {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Long => "long",
            Self::Short => "short",
            Self::Decimal => "decimal",
        }
    }
}

impl fmt::Display for DurationFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for DurationFormat {
    type Err = SettingsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "long" => Ok(Self::Long),
            "short" => Ok(Self::Short),
            "decimal" => Ok(Self::Decimal),
            _ => Err(SettingsError::UnknownVariant {
                setting: "duration format",
                value: s.to_string(),
            }),
        }
    }
}

/// Formats with the given style.
pub fn format_duration(duration: Duration, format: DurationFormat) -> String {
    match format {
        DurationFormat::Long => format_duration_long(duration),
        DurationFormat::Short => format_duration_short(duration),
        DurationFormat::Decimal => format_duration_decimal(duration),
    }
}

/// `1h 0m 5s`, `12m 3s`, `0s`. Leading zero units are left out.
pub fn format_duration_long(duration: Duration) -> String {
    let sign = if duration < Duration::zero() { "-" } else { "" };
    let total_seconds = duration.num_seconds().unsigned_abs();
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;

    if hours > 0 {
        format!("{sign}{hours}h {minutes}m {seconds}s")
    } else if minutes > 0 {
        format!("{sign}{minutes}m {seconds}s")
    } else {
        format!("{sign}{seconds}s")
    }
}

/// Decimal hours with an `h` suffix, e.g. `12.14h`.
pub fn format_duration_short(duration: Duration) -> String {
    format!("{}h", format_duration_decimal(duration))
}

/// Decimal hours rounded to two places, trailing zeros dropped.
#[allow(clippy::cast_precision_loss)]
pub fn format_duration_decimal(duration: Duration) -> String {
    let hours = duration.num_milliseconds() as f64 / 3_600_000.0;
    let fixed = format!("{hours:.2}");
    let trimmed = fixed.trim_end_matches('0').trim_end_matches('.');
    match trimmed {
        "-0" => "0".to_string(),
        other => other.to_string(),
    }
}
