//! Timezone handling utilities
//!
//! Recurrence arithmetic happens on local wall-clock time in the display
//! timezone; these helpers move between that and UTC instants.

use chrono::{DateTime, LocalResult, NaiveDate, NaiveDateTime, Offset, TimeDelta, TimeZone, Utc};
use chrono_tz::Tz;

use crate::error::{CalendarError, CalendarResult};

/// Parse an IANA timezone string (e.g., "Europe/Paris", "America/New_York")
///
/// # Examples
///
/// ```
/// use teamcal_core::timezone::parse_timezone;
///
/// let tz = parse_timezone("Europe/Paris").unwrap();
/// assert_eq!(tz.name(), "Europe/Paris");
/// ```
pub fn parse_timezone(tz_str: &str) -> CalendarResult<Tz> {
    tz_str
        .parse::<Tz>()
        .map_err(|_| CalendarError::InvalidTimezone(tz_str.to_string()))
}

/// Get the default timezone (UTC)
pub fn default_timezone() -> Tz {
    Tz::UTC
}

/// Wall-clock time of a UTC instant in `tz`
pub fn to_local(instant: &DateTime<Utc>, tz: &Tz) -> NaiveDateTime {
    instant.with_timezone(tz).naive_local()
}

/// Calendar date of a UTC instant in `tz`
pub fn local_date(instant: &DateTime<Utc>, tz: &Tz) -> NaiveDate {
    to_local(instant, tz).date()
}

/// Map a local wall-clock time back to a UTC instant
///
/// Ambiguous times (clocks going back) resolve to the earlier instant.
/// Times inside a gap (clocks going forward) are read with the offset in
/// force before the gap, which lands them after the transition shifted by
/// the gap length.
pub fn from_local(local: &NaiveDateTime, tz: &Tz) -> DateTime<Utc> {
    match tz.from_local_datetime(local) {
        LocalResult::Single(dt) => dt.with_timezone(&Utc),
        LocalResult::Ambiguous(earliest, _) => earliest.with_timezone(&Utc),
        LocalResult::None => {
            let before = tz
                .offset_from_utc_datetime(&(*local - TimeDelta::days(1)))
                .fix();
            let utc = *local - TimeDelta::seconds(i64::from(before.local_minus_utc()));
            Utc.from_utc_datetime(&utc)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    fn naive(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, 0)
            .unwrap()
    }

    #[test]
    fn test_parse_timezone_valid() {
        let tz = parse_timezone("Europe/Paris");
        assert!(tz.is_ok());
        assert_eq!(tz.unwrap().name(), "Europe/Paris");
    }

    #[test]
    fn test_parse_timezone_invalid() {
        let tz = parse_timezone("Invalid/Timezone");
        match tz {
            Err(CalendarError::InvalidTimezone(s)) => {
                assert_eq!(s, "Invalid/Timezone");
            }
            _ => panic!("Expected InvalidTimezone error"),
        }
    }

    #[test]
    fn test_local_date_crosses_midnight() {
        let tz = parse_timezone("Asia/Singapore").unwrap();
        // 2024-01-01 20:00 UTC is 04:00 on the 2nd in Singapore
        let instant = Utc.with_ymd_and_hms(2024, 1, 1, 20, 0, 0).unwrap();
        assert_eq!(
            local_date(&instant, &tz),
            NaiveDate::from_ymd_opt(2024, 1, 2).unwrap()
        );
        assert_eq!(to_local(&instant, &tz).hour(), 4);
    }

    #[test]
    fn test_from_local_single() {
        let tz = parse_timezone("Europe/Paris").unwrap();
        let utc = from_local(&naive(2024, 1, 15, 10, 0), &tz);
        assert_eq!(utc, Utc.with_ymd_and_hms(2024, 1, 15, 9, 0, 0).unwrap());
    }

    #[test]
    fn test_from_local_gap_moves_forward() {
        let tz = parse_timezone("Europe/Paris").unwrap();
        // 02:30 does not exist on 2024-03-31 in Paris
        let utc = from_local(&naive(2024, 3, 31, 2, 30), &tz);
        assert_eq!(utc, Utc.with_ymd_and_hms(2024, 3, 31, 1, 30, 0).unwrap());
        assert_eq!(to_local(&utc, &tz), naive(2024, 3, 31, 3, 30));
    }

    #[test]
    fn test_from_local_ambiguous_takes_earliest() {
        let tz = parse_timezone("Europe/Paris").unwrap();
        // 02:30 happens twice on 2024-10-27 in Paris
        let utc = from_local(&naive(2024, 10, 27, 2, 30), &tz);
        assert_eq!(utc, Utc.with_ymd_and_hms(2024, 10, 27, 0, 30, 0).unwrap());
    }

    #[test]
    fn test_default_timezone() {
        assert_eq!(default_timezone().name(), "UTC");
    }
}
