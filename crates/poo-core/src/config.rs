//! Analytics configuration
//!
//! Settings are read from TOML. Lookup order:
//! 1. An explicit path passed by the caller
//! 2. `<data_local_dir>/poo-tracker/config/analytics.toml`
//! 3. The built-in `config/analytics.toml`
//!
//! Any key left out of the file keeps its default.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::Duration as ChronoDuration;
use serde::Deserialize;
use tracing::debug;

use crate::error::{Error, Result};

/// Built-in config (compiled into the binary)
const DEFAULT_CONFIG: &str = include_str!("../../../config/analytics.toml");

/// Medications fetched per analysis when not configured
pub const DEFAULT_MEDICATION_LIMIT: u32 = 100;

/// Days covered by health score and recommendations when not configured
pub const DEFAULT_DATA_WINDOW_DAYS: i64 = 30;

pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

pub const DEFAULT_CORRELATION_WINDOW_HOURS: i64 = 24;

/// Longest data window accepted, about ten years
pub const MAX_WINDOW_DAYS: i64 = 3650;

/// Longest meal correlation window accepted, one year
pub const MAX_CORRELATION_WINDOW_HOURS: i64 = 24 * 365;

/// Recognized analytics options
#[derive(Debug, Clone, PartialEq)]
pub struct AnalyticsConfig {
    pub medication_limit: u32,
    pub data_window: ChronoDuration,
    /// Deadline for one orchestrated call, fetches included
    pub request_timeout: Duration,
    pub correlation_window_hours: i64,
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            medication_limit: DEFAULT_MEDICATION_LIMIT,
            data_window: ChronoDuration::days(DEFAULT_DATA_WINDOW_DAYS),
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            correlation_window_hours: DEFAULT_CORRELATION_WINDOW_HOURS,
        }
    }
}

impl AnalyticsConfig {
    /// Load from the override path, the user config dir, or the built-in file
    pub fn load(override_path: Option<&Path>) -> Result<Self> {
        let content = match override_path {
            Some(path) => {
                debug!(path = %path.display(), "Loading analytics config");
                fs::read_to_string(path)
                    .map_err(|e| Error::Config(format!("Failed to read config: {}", e)))?
            }
            None => match default_config_path() {
                Some(path) if path.exists() => {
                    debug!(path = %path.display(), "Loading analytics config");
                    fs::read_to_string(&path)
                        .map_err(|e| Error::Config(format!("Failed to read config: {}", e)))?
                }
                _ => DEFAULT_CONFIG.to_string(),
            },
        };

        Self::parse(&content)
    }

    /// Parse TOML, keeping defaults for anything not set
    pub fn parse(content: &str) -> Result<Self> {
        let raw: RawConfig = toml::from_str(content)
            .map_err(|e| Error::Config(format!("Invalid config TOML: {}", e)))?;

        let mut config = Self::default();

        if let Some(data) = raw.data {
            if let Some(limit) = data.medication_limit {
                config.medication_limit = limit;
            }
            if let Some(days) = data.window_days {
                check_bounds("window_days", days, MAX_WINDOW_DAYS)?;
                config.data_window = ChronoDuration::days(days);
            }
        }

        if let Some(analysis) = raw.analysis {
            if let Some(secs) = analysis.timeout_secs {
                config.request_timeout = Duration::from_secs(secs);
            }
            if let Some(hours) = analysis.correlation_window_hours {
                check_bounds("correlation_window_hours", hours, MAX_CORRELATION_WINDOW_HOURS)?;
                config.correlation_window_hours = hours;
            }
        }

        Ok(config)
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }
}

fn check_bounds(key: &str, value: i64, max: i64) -> Result<()> {
    if (1..=max).contains(&value) {
        Ok(())
    } else {
        Err(Error::Config(format!(
            "{} must be between 1 and {} (got {})",
            key, max, value
        )))
    }
}

/// Default config override path
pub fn default_config_path() -> Option<PathBuf> {
    dirs::data_local_dir().map(|d| {
        d.join("poo-tracker")
            .join("config")
            .join("analytics.toml")
    })
}

/// Raw config structure for TOML parsing
#[derive(Debug, Deserialize)]
struct RawConfig {
    data: Option<RawData>,
    analysis: Option<RawAnalysis>,
}

#[derive(Debug, Deserialize)]
struct RawData {
    medication_limit: Option<u32>,
    window_days: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct RawAnalysis {
    timeout_secs: Option<u64>,
    correlation_window_hours: Option<i64>,
}
