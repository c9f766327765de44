//! Weekly event statistics shown above the calendar

use serde::Serialize;

use crate::models::EventOccurrence;
use crate::window::WeekBuckets;

/// Event types the team tracks separately
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventCategory {
    GameSession,
    Tournament,
    Coaching,
    Training,
}

impl EventCategory {
    pub const ALL: [Self; 4] = [
        Self::GameSession,
        Self::Tournament,
        Self::Coaching,
        Self::Training,
    ];

    /// Match an event type name as stored by the events service
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "session de jeu" => Some(Self::GameSession),
            "tournois" => Some(Self::Tournament),
            "coaching" => Some(Self::Coaching),
            "entrainement" => Some(Self::Training),
            _ => None,
        }
    }

    /// Whether either the joined type name or the plain `type` is this one
    pub fn matches(self, occurrence: &EventOccurrence) -> bool {
        occurrence
            .type_names()
            .any(|name| Self::from_name(name) == Some(self))
    }
}

/// Counts per category for one display window
///
/// An event whose joined type name and plain `type` disagree is counted
/// under both categories.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct WeekStats {
    pub total: usize,
    pub game_sessions: usize,
    pub tournaments: usize,
    pub coaching: usize,
    pub training: usize,
}

impl WeekStats {
    pub fn from_buckets(buckets: &WeekBuckets) -> Self {
        buckets.values().flatten().fold(Self::default(), |mut stats, occurrence| {
            stats.record(occurrence);
            stats
        })
    }

    fn record(&mut self, occurrence: &EventOccurrence) {
        self.total += 1;
        for category in EventCategory::ALL {
            if category.matches(occurrence) {
                *self.count_mut(category) += 1;
            }
        }
    }

    fn count_mut(&mut self, category: EventCategory) -> &mut usize {
        match category {
            EventCategory::GameSession => &mut self.game_sessions,
            EventCategory::Tournament => &mut self.tournaments,
            EventCategory::Coaching => &mut self.coaching,
            EventCategory::Training => &mut self.training,
        }
    }
}
