//! CLI command implementations
//!
//! Commands are organized by domain:
//! - `core` - Core commands (init, status) and shared utilities (open_db)
//! - `log` - Record logging commands (bowel, meal, symptom, medication)
//! - `analytics` - Report commands (overview, score, insights, ...)
//! - `serve` - Web server command

pub mod analytics;
pub mod core;
pub mod log;
pub mod serve;

// Re-export command functions for main.rs
pub use self::core::*;
pub use analytics::*;
pub use log::*;
pub use serve::*;

use anyhow::{bail, Result};
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};

/// Parse a `YYYY-MM-DD` date or an RFC 3339 timestamp
///
/// A plain date means the start of that day, or its last millisecond when
/// `end_of_day` is set.
pub fn parse_when(value: &str, end_of_day: bool) -> Result<DateTime<Utc>> {
    let value = value.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(value) {
        return Ok(ts.with_timezone(&Utc));
    }

    let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") else {
        bail!("Invalid date '{}': expected YYYY-MM-DD or RFC 3339", value);
    };
    let time = if end_of_day {
        NaiveTime::from_hms_milli_opt(23, 59, 59, 999)
            .ok_or_else(|| anyhow::anyhow!("Invalid end-of-day time"))?
    } else {
        NaiveTime::MIN
    };
    Ok(date.and_time(time).and_utc())
}

/// Timestamp from an optional flag, defaulting to `now`
pub fn when_or(value: Option<&str>, now: DateTime<Utc>) -> Result<DateTime<Utc>> {
    value.map_or(Ok(now), |v| parse_when(v, false))
}

/// Truncate a string to a maximum length, adding "..." if truncated
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
