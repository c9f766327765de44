//! Week view assembly
//!
//! Everything the calendar page needs for one display window: records are
//! normalised, expanded inside the window, bucketed per day and counted.

use chrono::NaiveDate;
use serde::Serialize;

use crate::models::EventRecord;
use crate::recurrence::{ExpandOptions, expand_in_window, normalize_records};
use crate::stats::WeekStats;
use crate::window::{DisplayWindow, WeekBuckets, bucket_by_day};

/// One rendered week
#[derive(Debug, Clone, Serialize)]
pub struct WeekView {
    pub week_start: NaiveDate,
    pub week_end: NaiveDate,
    pub days: WeekBuckets,
    pub stats: WeekStats,
    /// Records skipped because of malformed recurrence settings
    pub rejected: usize,
}

pub fn build_week_view(
    records: Vec<EventRecord>,
    window: &DisplayWindow,
    options: &ExpandOptions,
) -> WeekView {
    let normalized = normalize_records(records, &options.timezone);
    let occurrences = expand_in_window(&normalized.templates, window, options);
    let days = bucket_by_day(occurrences, window, &options.timezone);
    let stats = WeekStats::from_buckets(&days);

    tracing::debug!(
        week_start = %window.start(),
        total = stats.total,
        rejected = normalized.rejected,
        "Built week view"
    );

    WeekView {
        week_start: window.start(),
        week_end: window.end(),
        days,
        stats,
        rejected: normalized.rejected,
    }
}
