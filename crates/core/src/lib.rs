//! teamcal Core - Domain logic and models
//!
//! This crate contains pure domain logic with no I/O operations.
//! Recurring event expansion, display windows, bucketing and weekly
//! statistics are defined here.

pub mod config;
pub mod error;
pub mod models;
pub mod recurrence;
pub mod stats;
pub mod timezone;
pub mod types;
pub mod week;
pub mod window;

pub use error::{CalendarError, CalendarResult};
pub use models::{EventOccurrence, EventPayload, EventRecord, EventTemplate};
pub use recurrence::{ExpandOptions, Recurrence, expand, expand_in_window, expand_records};
pub use timezone::parse_timezone;
pub use types::{EventId, WeekdaySet};
pub use week::{WeekView, build_week_view};
pub use window::{DisplayWindow, WeekBuckets, bucket_by_day};
