//! Club-local time utilities
//!
//! The club runs on a fixed UTC-3 wall clock (America/Sao_Paulo, no DST).
//! Scheduling decisions (weekday, date, slot times, operating hours) are
//! made in this local frame; everything stored or compared across the
//! system stays in UTC.

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveTime, TimeZone, Timelike, Utc, Weekday};

/// Club wall-clock offset from UTC, in hours.
pub const CLUB_UTC_OFFSET_HOURS: i64 = -3;

/// Club-local calendar/time snapshot used by scheduling queries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalTimeInfo {
    /// Lowercase English weekday name ("monday" .. "sunday")
    pub weekday: String,
    pub date: NaiveDate,
    pub time: NaiveTime,
    /// Local hour of day, 0-23
    pub hour: u32,
}

/// Current club-local time snapshot.
pub fn local_now() -> LocalTimeInfo {
    local_time_info(Utc::now())
}

/// Club-local snapshot of an arbitrary UTC instant.
pub fn local_time_info(now: DateTime<Utc>) -> LocalTimeInfo {
    let local = now + Duration::hours(CLUB_UTC_OFFSET_HOURS);
    LocalTimeInfo {
        weekday: weekday_name(local.weekday()).to_string(),
        date: local.date_naive(),
        time: local.time(),
        hour: local.hour(),
    }
}

/// UTC instant at which a club-local scheduled slot starts.
pub fn scheduled_start_utc(date: NaiveDate, time: NaiveTime) -> DateTime<Utc> {
    let local = date.and_time(time);
    Utc.from_utc_datetime(&(local - Duration::hours(CLUB_UTC_OFFSET_HOURS)))
}

/// UTC instant at which the club-local day containing `now` ends.
/// Used for "banned until end of today".
pub fn end_of_local_day(now: DateTime<Utc>) -> DateTime<Utc> {
    let local_date = local_time_info(now).date;
    let end = local_date
        .and_hms_opt(23, 59, 59)
        .unwrap_or_else(|| local_date.and_time(NaiveTime::MIN));
    Utc.from_utc_datetime(&(end - Duration::hours(CLUB_UTC_OFFSET_HOURS)))
}

fn weekday_name(weekday: Weekday) -> &'static str {
    match weekday {
        Weekday::Mon => "monday",
        Weekday::Tue => "tuesday",
        Weekday::Wed => "wednesday",
        Weekday::Thu => "thursday",
        Weekday::Fri => "friday",
        Weekday::Sat => "saturday",
        Weekday::Sun => "sunday",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn utc(s: &str) -> DateTime<Utc> {
        s.parse().expect("valid RFC3339 timestamp")
    }

    #[test]
    fn test_local_time_is_three_hours_behind_utc() {
        // 02:30 UTC on a Saturday is 23:30 Friday at the club
        let info = local_time_info(utc("2026-08-22T02:30:00Z"));
        assert_eq!(info.weekday, "friday");
        assert_eq!(info.date, NaiveDate::from_ymd_opt(2026, 8, 21).expect("date"));
        assert_eq!(info.hour, 23);
    }

    #[test]
    fn test_scheduled_start_round_trips_to_utc() {
        let date = NaiveDate::from_ymd_opt(2026, 8, 21).expect("date");
        let time = NaiveTime::from_hms_opt(22, 0, 0).expect("time");
        let start = scheduled_start_utc(date, time);
        assert_eq!(start, utc("2026-08-22T01:00:00Z"));
    }

    #[test]
    fn test_end_of_local_day_crosses_utc_midnight() {
        // Local day of 2026-08-21 ends at 23:59:59 local = 02:59:59 UTC next day
        let end = end_of_local_day(utc("2026-08-21T12:00:00Z"));
        assert_eq!(end, utc("2026-08-22T02:59:59Z"));
    }

    #[test]
    fn test_weekday_names_are_lowercase_english() {
        // 2026-08-23 is a Sunday
        let info = local_time_info(utc("2026-08-23T12:00:00Z"));
        assert_eq!(info.weekday, "sunday");
    }
}
