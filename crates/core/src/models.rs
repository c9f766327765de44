//! Core domain models for teamcal
//!
//! `EventRecord` is the loose shape served by the events store,
//! `EventTemplate` the validated form the expander works on, and
//! `EventOccurrence` one concrete entry on the calendar.

use std::num::NonZeroU32;

use chrono::{DateTime, NaiveDate, TimeDelta, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{CalendarError, CalendarResult};
use crate::recurrence::{ExpandOptions, Occurrences, Recurrence};
use crate::timezone::local_date;
use crate::types::{EventId, WeekdaySet};

/// Duration of an event stored without an end time
pub fn default_duration() -> TimeDelta {
    TimeDelta::hours(1)
}

/// Event fields the calendar carries without interpreting
///
/// Title, type, participants, maps played and so on all live here and are
/// copied verbatim onto every occurrence.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventPayload(Map<String, Value>);

impl EventPayload {
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.0.remove(key)
    }

    pub fn title(&self) -> Option<&str> {
        self.get("title").and_then(Value::as_str)
    }

    /// Event type names: the joined `event_types.name`, then the plain `type`
    ///
    /// Both are yielded when both are set, even if they disagree.
    pub fn type_names(&self) -> impl Iterator<Item = &str> {
        let joined = self
            .get("event_types")
            .and_then(|t| t.get("name"))
            .and_then(Value::as_str);
        let plain = self.get("type").and_then(Value::as_str);
        joined.into_iter().chain(plain)
    }
}

impl From<Map<String, Value>> for EventPayload {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

/// A stored event definition, possibly recurring
#[derive(Debug, Clone, PartialEq)]
pub struct EventTemplate {
    pub id: EventId,
    pub start: DateTime<Utc>,
    pub end: Option<DateTime<Utc>>,
    pub recurrence: Recurrence,
    pub payload: EventPayload,
}

impl EventTemplate {
    pub fn new(id: EventId, start: DateTime<Utc>) -> Self {
        Self {
            id,
            start,
            end: None,
            recurrence: Recurrence::None,
            payload: EventPayload::default(),
        }
    }

    #[must_use]
    pub fn with_end(mut self, end: DateTime<Utc>) -> Self {
        self.end = Some(end);
        self
    }

    #[must_use]
    pub fn with_recurrence(mut self, recurrence: Recurrence) -> Self {
        self.recurrence = recurrence;
        self
    }

    #[must_use]
    pub fn with_payload(mut self, payload: EventPayload) -> Self {
        self.payload = payload;
        self
    }

    /// Length shared by every occurrence
    pub fn duration(&self) -> TimeDelta {
        self.end
            .map_or_else(default_duration, |end| end - self.start)
    }

    /// Lazily iterate this template's occurrences
    pub fn occurrences(&self, options: &ExpandOptions) -> Occurrences<'_> {
        Occurrences::new(self, options.timezone)
    }

    /// The template itself, as a single calendar entry
    pub fn pass_through(&self) -> EventOccurrence {
        EventOccurrence {
            id: self.id.clone(),
            start: self.start,
            end: self.end,
            is_recurring_instance: false,
            original_event_id: None,
            payload: self.payload.clone(),
        }
    }

    /// One materialised instance of this template starting at `start`
    pub fn occurrence_at(&self, start: DateTime<Utc>) -> EventOccurrence {
        let mut payload = self.payload.clone();
        // the instance markers below replace any stored ones
        payload.remove("is_recurring_instance");
        payload.remove("original_event_id");

        EventOccurrence {
            id: self.id.occurrence(start),
            start,
            end: Some(start + self.duration()),
            is_recurring_instance: true,
            original_event_id: Some(self.id.clone()),
            payload,
        }
    }
}

/// One concrete calendar entry
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EventOccurrence {
    pub id: EventId,
    #[serde(rename = "start_time")]
    pub start: DateTime<Utc>,
    #[serde(rename = "end_time", skip_serializing_if = "Option::is_none")]
    pub end: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub is_recurring_instance: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_event_id: Option<EventId>,
    #[serde(flatten)]
    pub payload: EventPayload,
}

impl EventOccurrence {
    /// Calendar day this entry is shown on
    pub fn day(&self, tz: &Tz) -> NaiveDate {
        local_date(&self.start, tz)
    }

    pub fn type_names(&self) -> impl Iterator<Item = &str> {
        self.payload.type_names()
    }
}

/// Event as served by the events store
///
/// Only the id and the times are lifted out. Recurrence settings stay in
/// the payload exactly as received, so every entry echoes them unchanged;
/// [`EventRecord::into_template`] reads them into a [`Recurrence`].
#[derive(Debug, Clone, Deserialize)]
pub struct EventRecord {
    pub id: EventId,
    pub start_time: DateTime<Utc>,
    #[serde(default)]
    pub end_time: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub payload: EventPayload,
}

impl EventRecord {
    /// Validate the recurrence settings and build a template
    ///
    /// A record without the recurring flag or without a pattern is a single
    /// event. Missing or non-positive intervals become 1. A missing end date,
    /// an empty weekly day set, an unknown pattern or a bad weekday index is
    /// an error.
    pub fn into_template(self, tz: &Tz) -> CalendarResult<EventTemplate> {
        let recurring = self
            .field("is_recurring")
            .and_then(Value::as_bool)
            .unwrap_or(false);
        let pattern = self
            .field("recurrence_pattern")
            .filter(|p| p.as_str() != Some(""));

        let recurrence = match pattern {
            Some(pattern) if recurring => self.recurrence(pattern, tz)?,
            _ => Recurrence::None,
        };

        Ok(EventTemplate {
            id: self.id,
            start: self.start_time,
            end: self.end_time,
            recurrence,
            payload: self.payload,
        })
    }

    /// Non-null payload field
    fn field(&self, key: &str) -> Option<&Value> {
        self.payload.get(key).filter(|v| !v.is_null())
    }

    fn recurrence(&self, pattern: &Value, tz: &Tz) -> CalendarResult<Recurrence> {
        let interval = self
            .field("recurrence_interval")
            .and_then(Value::as_i64)
            .and_then(|i| u32::try_from(i).ok())
            .and_then(NonZeroU32::new)
            .unwrap_or(NonZeroU32::MIN);

        let raw_until = self
            .field("recurrence_end_date")
            .ok_or_else(|| CalendarError::recurrence(&self.id, "missing recurrence_end_date"))?;
        let until = raw_until
            .as_str()
            .and_then(|raw| parse_end_date(raw, tz))
            .ok_or_else(|| {
                CalendarError::recurrence(
                    &self.id,
                    format!("unreadable recurrence_end_date {}", raw_until),
                )
            })?;

        match pattern.as_str() {
            Some("daily") => Ok(Recurrence::Daily { interval, until }),
            Some("monthly") => Ok(Recurrence::Monthly { interval, until }),
            Some("yearly") => Ok(Recurrence::Yearly { interval, until }),
            Some("weekly") => {
                let days = match self.field("recurrence_days_of_week") {
                    Some(raw) => WeekdaySet::deserialize(raw).map_err(|e| {
                        CalendarError::recurrence(&self.id, format!("recurrence_days_of_week: {}", e))
                    })?,
                    None => WeekdaySet::empty(),
                };
                if days.is_empty() {
                    return Err(CalendarError::recurrence(&self.id, "weekly pattern without days"));
                }
                Ok(Recurrence::Weekly {
                    interval,
                    days,
                    until,
                })
            }
            _ => Err(CalendarError::recurrence(
                &self.id,
                format!("unknown recurrence pattern {}", pattern),
            )),
        }
    }
}

/// Read an end date given as `YYYY-MM-DD` or as an RFC 3339 timestamp
///
/// Timestamps are taken on the calendar of `tz`.
fn parse_end_date(raw: &str, tz: &Tz) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok().or_else(|| {
        DateTime::parse_from_rfc3339(raw)
            .ok()
            .map(|dt| local_date(&dt.with_timezone(&Utc), tz))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timezone::parse_timezone;
    use chrono::{TimeZone, Weekday};
    use serde_json::json;

    fn record(value: Value) -> EventRecord {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_single_event_record() {
        let rec = record(json!({
            "id": 5,
            "title": "Scrim",
            "start_time": "2024-01-01T18:00:00Z",
            "is_recurring": false,
            "maps_played": ["Ascent", "Bind"]
        }));

        let t = rec.into_template(&Tz::UTC).unwrap();

        assert_eq!(t.id, EventId::from(5));
        assert_eq!(t.recurrence, Recurrence::None);
        assert_eq!(t.payload.title(), Some("Scrim"));
        assert_eq!(t.payload.get("maps_played"), Some(&json!(["Ascent", "Bind"])));
        assert!(t.payload.get("start_time").is_none());
    }

    #[test]
    fn test_recurring_without_pattern_is_single() {
        let rec = record(json!({
            "id": "a",
            "start_time": "2024-01-01T18:00:00Z",
            "is_recurring": true
        }));

        assert_eq!(rec.into_template(&Tz::UTC).unwrap().recurrence, Recurrence::None);
    }

    #[test]
    fn test_weekly_record() {
        let rec = record(json!({
            "id": 1,
            "start_time": "2024-01-01T10:00:00Z",
            "is_recurring": true,
            "recurrence_pattern": "weekly",
            "recurrence_interval": 1,
            "recurrence_days_of_week": [1, 3],
            "recurrence_end_date": "2024-01-21"
        }));

        let t = rec.into_template(&Tz::UTC).unwrap();

        let expected: WeekdaySet = [Weekday::Mon, Weekday::Wed].into_iter().collect();
        assert_eq!(
            t.recurrence,
            Recurrence::Weekly {
                interval: NonZeroU32::MIN,
                days: expected,
                until: NaiveDate::from_ymd_opt(2024, 1, 21).unwrap(),
            }
        );
    }

    #[test]
    fn test_interval_clamped_to_one() {
        for interval in [json!(0), json!(-3), Value::Null] {
            let rec = record(json!({
                "id": 1,
                "start_time": "2024-01-01T10:00:00Z",
                "is_recurring": true,
                "recurrence_pattern": "daily",
                "recurrence_interval": interval,
                "recurrence_end_date": "2024-01-05"
            }));
            let t = rec.into_template(&Tz::UTC).unwrap();
            assert_eq!(t.recurrence.interval(), Some(NonZeroU32::MIN));
        }
    }

    #[test]
    fn test_missing_end_date_rejected() {
        let rec = record(json!({
            "id": 1,
            "start_time": "2024-01-01T10:00:00Z",
            "is_recurring": true,
            "recurrence_pattern": "monthly"
        }));

        match rec.into_template(&Tz::UTC) {
            Err(CalendarError::InvalidRecurrence { event_id, reason }) => {
                assert_eq!(event_id, "1");
                assert!(reason.contains("recurrence_end_date"));
            }
            other => panic!("Expected InvalidRecurrence, got {:?}", other),
        }
    }

    #[test]
    fn test_weekly_without_days_rejected() {
        let rec = record(json!({
            "id": 1,
            "start_time": "2024-01-01T10:00:00Z",
            "is_recurring": true,
            "recurrence_pattern": "weekly",
            "recurrence_days_of_week": [],
            "recurrence_end_date": "2024-02-01"
        }));

        assert!(rec.into_template(&Tz::UTC).is_err());
    }

    #[test]
    fn test_unknown_pattern_rejected() {
        let rec = record(json!({
            "id": 1,
            "start_time": "2024-01-01T10:00:00Z",
            "is_recurring": true,
            "recurrence_pattern": "hourly",
            "recurrence_end_date": "2024-02-01"
        }));

        assert!(rec.into_template(&Tz::UTC).is_err());
    }

    #[test]
    fn test_end_date_timestamp_uses_display_calendar() {
        let new_york = parse_timezone("America/New_York").unwrap();
        let end = "2024-01-21T00:00:00.000Z";

        assert_eq!(
            parse_end_date(end, &Tz::UTC),
            NaiveDate::from_ymd_opt(2024, 1, 21)
        );
        assert_eq!(
            parse_end_date(end, &new_york),
            NaiveDate::from_ymd_opt(2024, 1, 20)
        );
        assert_eq!(parse_end_date("next tuesday", &Tz::UTC), None);
    }

    #[test]
    fn test_occurrence_serialization() {
        let mut payload = EventPayload::default();
        payload.insert("title", "Coaching VOD review");
        payload.insert("event_types", json!({ "id": 3, "name": "coaching" }));
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 10, 0, 0).unwrap();
        let t = EventTemplate::new(EventId::from(7), start).with_payload(payload);

        let value = serde_json::to_value(t.occurrence_at(start)).unwrap();

        assert_eq!(value["id"], json!(format!("7_{}", start.timestamp_millis())));
        assert_eq!(value["start_time"], json!("2024-01-01T10:00:00Z"));
        assert_eq!(value["end_time"], json!("2024-01-01T11:00:00Z"));
        assert_eq!(value["is_recurring_instance"], json!(true));
        assert_eq!(value["original_event_id"], json!(7));
        assert_eq!(value["title"], json!("Coaching VOD review"));
        assert_eq!(value["event_types"]["name"], json!("coaching"));
    }

    #[test]
    fn test_type_names_yield_joined_then_plain() {
        let mut payload = EventPayload::default();
        payload.insert("type", "tournois");
        assert_eq!(payload.type_names().collect::<Vec<_>>(), vec!["tournois"]);

        payload.insert("event_types", json!({ "name": "coaching" }));
        assert_eq!(
            payload.type_names().collect::<Vec<_>>(),
            vec!["coaching", "tournois"]
        );
    }

    #[test]
    fn test_pass_through_echoes_record() {
        let input = json!({
            "id": 4,
            "title": "x",
            "start_time": "2024-01-01T10:00:00Z",
            "is_recurring": true,
            "recurrence_pattern": null,
            "recurrence_interval": 2,
            "recurrence_end_date": "2024-02-01T00:00:00.000Z"
        });

        let t = record(input.clone()).into_template(&Tz::UTC).unwrap();
        assert_eq!(t.recurrence, Recurrence::None);

        let output = serde_json::to_value(t.pass_through()).unwrap();
        assert_eq!(output, input);
    }

    #[test]
    fn test_instance_keeps_raw_recurrence_fields() {
        let rec = record(json!({
            "id": 9,
            "start_time": "2024-01-01T10:00:00Z",
            "is_recurring": true,
            "recurrence_pattern": "weekly",
            "recurrence_days_of_week": [3, 1],
            "recurrence_end_date": "2024-01-21T00:00:00.000Z",
            "original_event_id": "stale"
        }));
        let t = rec.into_template(&Tz::UTC).unwrap();
        let start = t.start;

        let value = serde_json::to_value(t.occurrence_at(start)).unwrap();

        assert_eq!(value["recurrence_days_of_week"], json!([3, 1]));
        assert_eq!(value["recurrence_end_date"], json!("2024-01-21T00:00:00.000Z"));
        assert_eq!(value["is_recurring"], json!(true));
        assert_eq!(value["original_event_id"], json!(9));
        assert!(value.get("recurrence_interval").is_none());
    }

    #[test]
    fn test_bad_weekday_entries_rejected() {
        for days in [json!([1, 7]), json!(["mon"]), json!("1,3")] {
            let rec = record(json!({
                "id": 1,
                "start_time": "2024-01-01T10:00:00Z",
                "is_recurring": true,
                "recurrence_pattern": "weekly",
                "recurrence_days_of_week": days,
                "recurrence_end_date": "2024-02-01"
            }));
            assert!(matches!(
                rec.into_template(&Tz::UTC),
                Err(CalendarError::InvalidRecurrence { .. })
            ));
        }
    }
}
