//! Seven-day display window and per-day bucketing

use std::collections::BTreeMap;

use chrono::{Datelike, Days, NaiveDate, Weekday};
use chrono_tz::Tz;
use serde::Serialize;

use crate::error::{CalendarError, CalendarResult};
use crate::models::EventOccurrence;

/// Number of days rendered by the calendar
pub const WINDOW_DAYS: u64 = 7;

/// The week currently shown on the calendar
///
/// Every day of a window is a representable date; constructors check this.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DisplayWindow {
    start: NaiveDate,
}

impl DisplayWindow {
    /// Window beginning on `start`
    pub fn starting(start: NaiveDate) -> CalendarResult<Self> {
        start
            .checked_add_days(Days::new(WINDOW_DAYS - 1))
            .map(|_| Self { start })
            .ok_or_else(|| out_of_range(start))
    }

    /// Week containing `today`, beginning on `week_start`
    ///
    /// `today` is passed in rather than read from the clock, so callers
    /// decide what "now" means.
    pub fn containing(today: NaiveDate, week_start: Weekday) -> CalendarResult<Self> {
        let back = (7 + today.weekday().num_days_from_monday()
            - week_start.num_days_from_monday())
            % 7;
        let start = today
            .checked_sub_days(Days::new(u64::from(back)))
            .ok_or_else(|| out_of_range(today))?;
        Self::starting(start)
    }

    /// Window between two dates, which must span exactly seven days
    pub fn between(start: NaiveDate, end: NaiveDate) -> CalendarResult<Self> {
        let window = Self::starting(start)?;
        if window.end() != end {
            return Err(CalendarError::InvalidWindow(format!(
                "{} to {} is not a {}-day window",
                start, end, WINDOW_DAYS
            )));
        }
        Ok(window)
    }

    pub const fn start(&self) -> NaiveDate {
        self.start
    }

    /// Last day of the window (inclusive)
    pub fn end(&self) -> NaiveDate {
        self.start
            .checked_add_days(Days::new(WINDOW_DAYS - 1))
            .unwrap_or(NaiveDate::MAX)
    }

    pub fn previous(&self) -> CalendarResult<Self> {
        let start = self
            .start
            .checked_sub_days(Days::new(WINDOW_DAYS))
            .ok_or_else(|| out_of_range(self.start))?;
        Self::starting(start)
    }

    pub fn next(&self) -> CalendarResult<Self> {
        let start = self
            .start
            .checked_add_days(Days::new(WINDOW_DAYS))
            .ok_or_else(|| out_of_range(self.start))?;
        Self::starting(start)
    }

    pub fn contains(&self, day: NaiveDate) -> bool {
        self.start <= day && day <= self.end()
    }

    pub fn days(&self) -> impl Iterator<Item = NaiveDate> + use<> {
        let start = self.start;
        (0..WINDOW_DAYS).filter_map(move |i| start.checked_add_days(Days::new(i)))
    }
}

fn out_of_range(day: NaiveDate) -> CalendarError {
    CalendarError::InvalidWindow(format!("week around {} is outside the calendar range", day))
}

/// Occurrences keyed by calendar day, always covering the whole window
///
/// Serialises as an object keyed by `YYYY-MM-DD`.
pub type WeekBuckets = BTreeMap<NaiveDate, Vec<EventOccurrence>>;

/// Group occurrences by their local start date
///
/// Every day of the window gets a key, empty days included. Occurrences
/// outside the window are dropped and input order is kept within a day.
pub fn bucket_by_day<I>(occurrences: I, window: &DisplayWindow, tz: &Tz) -> WeekBuckets
where
    I: IntoIterator<Item = EventOccurrence>,
{
    let mut buckets: WeekBuckets = window.days().map(|day| (day, Vec::new())).collect();

    for occurrence in occurrences {
        if let Some(bucket) = buckets.get_mut(&occurrence.day(tz)) {
            bucket.push(occurrence);
        }
    }

    buckets
}
