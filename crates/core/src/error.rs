//! Error types for teamcal core domain logic

use thiserror::Error;

/// Core calendar domain errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CalendarError {
    #[error("Invalid recurrence for event {event_id}: {reason}")]
    InvalidRecurrence { event_id: String, reason: String },

    #[error("Invalid timezone: {0}")]
    InvalidTimezone(String),

    #[error("Invalid display window: {0}")]
    InvalidWindow(String),
}

impl CalendarError {
    pub(crate) fn recurrence(event_id: impl ToString, reason: impl Into<String>) -> Self {
        Self::InvalidRecurrence {
            event_id: event_id.to_string(),
            reason: reason.into(),
        }
    }
}

/// Result type alias for calendar operations
pub type CalendarResult<T> = Result<T, CalendarError>;

/// Configuration loading errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid value for {name}: {value}")]
    InvalidValue { name: String, value: String },
}
