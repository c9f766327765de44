//! Type-safe wrappers for domain identifiers
//!
//! The events store hands out ids as JSON integers or strings. `EventId`
//! keeps whichever form it received so a pass-through event serialises back
//! exactly as it came in.

use chrono::{DateTime, Utc, Weekday};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Event identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EventId {
    Number(i64),
    Text(String),
}

impl EventId {
    /// Derive the id of the occurrence of this event starting at `start`
    ///
    /// The id only depends on the template id and the start instant, so
    /// re-running an expansion yields the same ids.
    pub fn occurrence(&self, start: DateTime<Utc>) -> Self {
        EventId::Text(format!("{}_{}", self, start.timestamp_millis()))
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventId::Number(n) => write!(f, "{}", n),
            EventId::Text(s) => f.write_str(s),
        }
    }
}

impl From<i64> for EventId {
    fn from(id: i64) -> Self {
        EventId::Number(id)
    }
}

impl From<&str> for EventId {
    fn from(id: &str) -> Self {
        EventId::Text(id.to_string())
    }
}

impl From<String> for EventId {
    fn from(id: String) -> Self {
        EventId::Text(id)
    }
}

/// A set of weekdays, stored as a bitmask indexed from Sunday
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct WeekdaySet(u8);

impl WeekdaySet {
    pub const fn empty() -> Self {
        WeekdaySet(0)
    }

    /// Build a set from weekday indices (0 = Sunday .. 6 = Saturday)
    ///
    /// Returns the first out-of-range index as the error.
    pub fn from_indices<I>(indices: I) -> Result<Self, i64>
    where
        I: IntoIterator<Item = i64>,
    {
        let mut set = Self::empty();
        for index in indices {
            let weekday = u8::try_from(index)
                .ok()
                .filter(|i| *i < 7)
                .ok_or(index)?;
            set.0 |= 1 << weekday;
        }
        Ok(set)
    }

    pub fn insert(&mut self, day: Weekday) {
        self.0 |= 1 << day.num_days_from_sunday();
    }

    pub fn contains(&self, day: Weekday) -> bool {
        self.0 & (1 << day.num_days_from_sunday()) != 0
    }

    pub const fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub const fn len(&self) -> usize {
        self.0.count_ones() as usize
    }

    /// Iterate members in Sunday..Saturday order
    pub fn iter(&self) -> impl Iterator<Item = Weekday> + '_ {
        SUNDAY_FIRST.into_iter().filter(|day| self.contains(*day))
    }
}

const SUNDAY_FIRST: [Weekday; 7] = [
    Weekday::Sun,
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
];

impl FromIterator<Weekday> for WeekdaySet {
    fn from_iter<T: IntoIterator<Item = Weekday>>(iter: T) -> Self {
        let mut set = Self::empty();
        for day in iter {
            set.insert(day);
        }
        set
    }
}

impl<'de> Deserialize<'de> for WeekdaySet {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let indices = Vec::<i64>::deserialize(deserializer)?;
        WeekdaySet::from_indices(indices).map_err(|index| {
            serde::de::Error::custom(format!("weekday index out of range: {}", index))
        })
    }
}
