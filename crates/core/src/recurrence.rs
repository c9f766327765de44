//! Recurring event expansion
//!
//! Turns event templates into concrete occurrences. Each template expands
//! through a lazy [`Occurrences`] iterator that yields in chronological
//! order; [`expand`] drains every template under a per-template cap.
//!
//! Calendar arithmetic runs on local wall-clock time in the display
//! timezone, so a 10:00 series stays at 10:00 across DST changes. Month and
//! year steps are computed from the first occurrence and clamp to the last
//! day of shorter months: a series starting Jan 31 lands on Feb 29 (leap
//! year), Mar 31, Apr 30.

use std::num::NonZeroU32;

use chrono::{Datelike, Days, Months, NaiveDate, NaiveDateTime};
use chrono_tz::Tz;

use crate::config::CoreConfig;
use crate::models::{EventOccurrence, EventRecord, EventTemplate};
use crate::timezone::{default_timezone, from_local, local_date, to_local};
use crate::types::WeekdaySet;
use crate::window::DisplayWindow;

/// Maximum number of occurrences generated per template
pub const DEFAULT_MAX_OCCURRENCES: usize = 10_000;

/// How often an event repeats, and until when
///
/// `until` is an inclusive local calendar date: an occurrence falling on
/// that day is kept.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Recurrence {
    #[default]
    None,
    Daily {
        interval: NonZeroU32,
        until: NaiveDate,
    },
    /// Repeats on the selected weekdays every `interval` weeks.
    /// An empty day set produces no occurrences.
    Weekly {
        interval: NonZeroU32,
        days: WeekdaySet,
        until: NaiveDate,
    },
    Monthly {
        interval: NonZeroU32,
        until: NaiveDate,
    },
    Yearly {
        interval: NonZeroU32,
        until: NaiveDate,
    },
}

impl Recurrence {
    pub const fn is_recurring(&self) -> bool {
        !matches!(self, Recurrence::None)
    }

    pub const fn interval(&self) -> Option<NonZeroU32> {
        match self {
            Recurrence::None => None,
            Recurrence::Daily { interval, .. }
            | Recurrence::Weekly { interval, .. }
            | Recurrence::Monthly { interval, .. }
            | Recurrence::Yearly { interval, .. } => Some(*interval),
        }
    }
}

/// Knobs for an expansion run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpandOptions {
    /// Zone whose wall clock drives weekday, time-of-day and date arithmetic
    pub timezone: Tz,
    /// Per-template cap on generated occurrences
    pub max_occurrences: usize,
}

impl Default for ExpandOptions {
    fn default() -> Self {
        Self {
            timezone: default_timezone(),
            max_occurrences: DEFAULT_MAX_OCCURRENCES,
        }
    }
}

impl ExpandOptions {
    pub fn from_config(config: &CoreConfig) -> Self {
        Self {
            timezone: config.display_timezone,
            max_occurrences: config.max_occurrences,
        }
    }

    #[must_use]
    pub fn with_timezone(mut self, timezone: Tz) -> Self {
        self.timezone = timezone;
        self
    }

    #[must_use]
    pub fn with_max_occurrences(mut self, max: usize) -> Self {
        self.max_occurrences = max;
        self
    }
}

#[derive(Debug, Clone, Copy)]
enum Unit {
    Days,
    Months,
}

#[derive(Debug)]
enum Cursor {
    Done,
    Single,
    Stepped {
        unit: Unit,
        /// Units between two occurrences
        step: u32,
        until: NaiveDate,
        index: u32,
    },
    Weekly {
        /// Days between two cursor positions
        stride: u32,
        /// Forward offsets from the cursor weekday, ascending
        offsets: Vec<u32>,
        until: NaiveDate,
        week: u32,
        slot: usize,
    },
}

/// Lazy, chronologically ordered occurrences of one template
#[derive(Debug)]
pub struct Occurrences<'a> {
    template: &'a EventTemplate,
    timezone: Tz,
    start_local: NaiveDateTime,
    cursor: Cursor,
}

impl<'a> Occurrences<'a> {
    pub fn new(template: &'a EventTemplate, timezone: Tz) -> Self {
        let start_local = to_local(&template.start, &timezone);
        let cursor = match template.recurrence {
            Recurrence::None => Cursor::Single,
            Recurrence::Daily { interval, until } => Cursor::Stepped {
                unit: Unit::Days,
                step: interval.get(),
                until,
                index: 0,
            },
            Recurrence::Monthly { interval, until } => Cursor::Stepped {
                unit: Unit::Months,
                step: interval.get(),
                until,
                index: 0,
            },
            Recurrence::Yearly { interval, until } => Cursor::Stepped {
                unit: Unit::Months,
                step: interval.get().saturating_mul(12),
                until,
                index: 0,
            },
            Recurrence::Weekly { days, .. } if days.is_empty() => Cursor::Done,
            Recurrence::Weekly {
                interval,
                days,
                until,
            } => {
                let reference = start_local.weekday().num_days_from_sunday();
                let mut offsets: Vec<u32> = days
                    .iter()
                    .map(|d| (d.num_days_from_sunday() + 7 - reference) % 7)
                    .collect();
                offsets.sort_unstable();
                Cursor::Weekly {
                    stride: interval.get().saturating_mul(7),
                    offsets,
                    until,
                    week: 0,
                    slot: 0,
                }
            }
        };

        Self {
            template,
            timezone,
            start_local,
            cursor,
        }
    }

    fn occurrence_at(&self, local: NaiveDateTime) -> EventOccurrence {
        // The first slot maps back to the stored instant, even when its wall
        // clock time is ambiguous.
        let start = if local == self.start_local {
            self.template.start
        } else {
            from_local(&local, &self.timezone)
        };
        self.template.occurrence_at(start)
    }
}

enum Step {
    Emit(NaiveDateTime),
    Skip,
    PassThrough,
    Finish,
}

fn advance(cursor: &mut Cursor, start: NaiveDateTime) -> Step {
    match cursor {
        Cursor::Done => Step::Finish,
        Cursor::Single => Step::PassThrough,
        Cursor::Stepped {
            unit,
            step,
            until,
            index,
        } => {
            let local = index.checked_mul(*step).and_then(|amount| match unit {
                Unit::Days => start.checked_add_days(Days::new(u64::from(amount))),
                Unit::Months => start.checked_add_months(Months::new(amount)),
            });
            *index = index.saturating_add(1);
            match local {
                Some(local) if local.date() <= *until => Step::Emit(local),
                _ => Step::Finish,
            }
        }
        Cursor::Weekly {
            stride,
            offsets,
            until,
            week,
            slot,
        } => {
            let week_start = u64::from(*week) * u64::from(*stride);
            match start.checked_add_days(Days::new(week_start)) {
                Some(position) if position.date() <= *until => {}
                _ => return Step::Finish,
            }
            let Some(offset) = offsets.get(*slot).copied() else {
                *week = week.saturating_add(1);
                *slot = 0;
                return Step::Skip;
            };
            *slot += 1;
            match start.checked_add_days(Days::new(week_start + u64::from(offset))) {
                Some(local) if local.date() <= *until => Step::Emit(local),
                // later slots of this week only fall further past the end
                _ => Step::Finish,
            }
        }
    }
}

impl Iterator for Occurrences<'_> {
    type Item = EventOccurrence;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            match advance(&mut self.cursor, self.start_local) {
                Step::Emit(local) => return Some(self.occurrence_at(local)),
                Step::Skip => {}
                Step::PassThrough => {
                    self.cursor = Cursor::Done;
                    return Some(self.template.pass_through());
                }
                Step::Finish => {
                    self.cursor = Cursor::Done;
                    return None;
                }
            }
        }
    }
}

/// Expand templates into a flat list of occurrences
///
/// Non-recurring templates pass through unchanged. Recurring templates are
/// expanded in chronological order, template order is preserved, and each
/// template contributes at most `options.max_occurrences` entries.
pub fn expand(templates: &[EventTemplate], options: &ExpandOptions) -> Vec<EventOccurrence> {
    let mut occurrences = Vec::with_capacity(templates.len());

    for template in templates {
        let mut iter = template.occurrences(options);
        let before = occurrences.len();
        occurrences.extend(iter.by_ref().take(options.max_occurrences));

        if iter.next().is_some() {
            tracing::warn!(
                event_id = %template.id,
                max = options.max_occurrences,
                "Recurring event truncated at occurrence cap"
            );
        }

        if template.recurrence.is_recurring() {
            tracing::debug!(
                event_id = %template.id,
                count = occurrences.len() - before,
                "Expanded recurring event"
            );
        }
    }

    occurrences
}

/// Expand templates, keeping only occurrences that start inside `window`
///
/// The cap still counts occurrences from the start of each series, so a
/// window far past the cap shows nothing for that template.
pub fn expand_in_window(
    templates: &[EventTemplate],
    window: &DisplayWindow,
    options: &ExpandOptions,
) -> Vec<EventOccurrence> {
    let tz = options.timezone;
    let mut occurrences = Vec::new();

    for template in templates {
        occurrences.extend(
            template
                .occurrences(options)
                .take(options.max_occurrences)
                .skip_while(|o| local_date(&o.start, &tz) < window.start())
                .take_while(|o| local_date(&o.start, &tz) <= window.end()),
        );
    }

    occurrences
}

/// Templates normalised from wire records
#[derive(Debug, Default)]
pub struct Normalized {
    pub templates: Vec<EventTemplate>,
    /// Records whose recurrence could not be interpreted
    pub rejected: usize,
}

/// Normalise wire records, dropping those with malformed recurrence
///
/// A rejected record contributes no occurrences; it is logged and counted
/// rather than failing the whole batch.
pub fn normalize_records(records: Vec<EventRecord>, timezone: &Tz) -> Normalized {
    let mut normalized = Normalized::default();

    for record in records {
        match record.into_template(timezone) {
            Ok(template) => normalized.templates.push(template),
            Err(e) => {
                tracing::warn!("Skipping event: {}", e);
                normalized.rejected += 1;
            }
        }
    }

    normalized
}

/// Expanded wire records
#[derive(Debug, Default)]
pub struct ExpandedRecords {
    pub occurrences: Vec<EventOccurrence>,
    pub rejected: usize,
}

/// Normalise then expand wire records
pub fn expand_records(records: Vec<EventRecord>, options: &ExpandOptions) -> ExpandedRecords {
    let normalized = normalize_records(records, &options.timezone);
    ExpandedRecords {
        occurrences: expand(&normalized.templates, options),
        rejected: normalized.rejected,
    }
}
