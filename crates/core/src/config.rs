//! Shared configuration logic
//!
//! Handles loading of the expansion settings from environment variables.

use crate::error::ConfigError;
use crate::recurrence::DEFAULT_MAX_OCCURRENCES;
use crate::timezone::{default_timezone, parse_timezone};
use chrono::Weekday;
use chrono_tz::Tz;
use std::env;

/// Common configuration used across services
#[derive(Debug, Clone)]
pub struct CoreConfig {
    /// Per-event cap on generated occurrences (default: 10000)
    pub max_occurrences: usize,

    /// Timezone whose calendar drives expansion and day bucketing (default: UTC)
    pub display_timezone: Tz,

    /// First day of a display week (default: Monday)
    pub week_start: Weekday,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            max_occurrences: DEFAULT_MAX_OCCURRENCES,
            display_timezone: default_timezone(),
            week_start: Weekday::Mon,
        }
    }
}

impl CoreConfig {
    /// Load common configuration from environment variables
    ///
    /// This will also initialize dotenv if it hasn't been done yet.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if it exists
        dotenvy::dotenv().ok();

        let defaults = Self::default();

        let max_occurrences = match env::var("EXPANSION_MAX_OCCURRENCES") {
            Ok(raw) => raw
                .parse::<usize>()
                .ok()
                .filter(|max| *max > 0)
                .ok_or_else(|| invalid("EXPANSION_MAX_OCCURRENCES", &raw))?,
            Err(_) => defaults.max_occurrences,
        };

        let display_timezone = match env::var("DISPLAY_TIMEZONE") {
            Ok(raw) => parse_timezone(&raw).map_err(|_| invalid("DISPLAY_TIMEZONE", &raw))?,
            Err(_) => defaults.display_timezone,
        };

        let week_start = match env::var("WEEK_START") {
            Ok(raw) => raw
                .parse::<Weekday>()
                .map_err(|_| invalid("WEEK_START", &raw))?,
            Err(_) => defaults.week_start,
        };

        Ok(Self {
            max_occurrences,
            display_timezone,
            week_start,
        })
    }
}

fn invalid(name: &str, value: &str) -> ConfigError {
    ConfigError::InvalidValue {
        name: name.to_string(),
        value: value.to_string(),
    }
}
