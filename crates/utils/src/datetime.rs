// Date/time helpers (UTC, ISO 8601)

use crate::error::DateTimeError;
use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, Utc};

const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

pub fn utc_now() -> DateTime<Utc> {
    Utc::now()
}

/// Parse an ISO 8601 timestamp
///
/// Accepts a trailing `Z`, explicit offsets, naive timestamps (taken as UTC)
/// and bare dates (midnight UTC).
pub fn parse_iso_datetime(s: &str) -> Result<DateTime<Utc>, DateTimeError> {
    let s = s.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_str(s, "%Y-%m-%dT%H:%M%:z") {
        return Ok(dt.with_timezone(&Utc));
    }
    for format in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, format) {
            return Ok(naive.and_utc());
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        if let Some(midnight) = date.and_hms_opt(0, 0, 0) {
            return Ok(midnight.and_utc());
        }
    }

    Err(DateTimeError::Parse(s.to_string()))
}

/// Format as ISO 8601 with a `Z` suffix
pub fn format_iso_datetime(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

/// Human-readable age of `dt` relative to now
pub fn time_ago(dt: &DateTime<Utc>) -> String {
    time_ago_from(dt, &utc_now())
}

pub fn time_ago_from(dt: &DateTime<Utc>, now: &DateTime<Utc>) -> String {
    let seconds = (*now - *dt).num_seconds();

    let (count, unit) = match seconds {
        s if s < 60 => return "just now".to_string(),
        s if s < 3_600 => (s / 60, "minute"),
        s if s < 86_400 => (s / 3_600, "hour"),
        s if s < 604_800 => (s / 86_400, "day"),
        s => (s / 604_800, "week"),
    };

    let plural = if count == 1 { "" } else { "s" };
    format!("{} {}{} ago", count, unit, plural)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn at(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, mo, d, h, mi, s).unwrap()
    }

    #[test]
    fn test_parse_iso_datetime() {
        let expected = at(2024, 1, 15, 10, 30, 0);
        assert_eq!(parse_iso_datetime("2024-01-15T10:30:00").unwrap(), expected);
        assert_eq!(parse_iso_datetime("2024-01-15T10:30:00Z").unwrap(), expected);
        assert_eq!(parse_iso_datetime("2024-01-15T12:30:00+02:00").unwrap(), expected);
        assert_eq!(parse_iso_datetime("2024-01-15 10:30").unwrap(), expected);
        assert_eq!(parse_iso_datetime("2024-01-15").unwrap(), at(2024, 1, 15, 0, 0, 0));
        assert!(parse_iso_datetime("yesterday").is_err());
    }

    #[test]
    fn test_format_iso_datetime() {
        assert_eq!(format_iso_datetime(&at(2024, 1, 15, 10, 30, 0)), "2024-01-15T10:30:00Z");

        let with_millis = at(2024, 1, 15, 10, 30, 0) + Duration::milliseconds(250);
        assert_eq!(format_iso_datetime(&with_millis), "2024-01-15T10:30:00.250Z");
    }

    #[test]
    fn test_time_ago_buckets() {
        let now = at(2024, 1, 15, 12, 0, 0);
        let ago = |d: Duration| time_ago_from(&(now - d), &now);

        assert_eq!(ago(Duration::seconds(30)), "just now");
        assert_eq!(ago(Duration::minutes(1)), "1 minute ago");
        assert_eq!(ago(Duration::minutes(5)), "5 minutes ago");
        assert_eq!(ago(Duration::hours(3)), "3 hours ago");
        assert_eq!(ago(Duration::days(1)), "1 day ago");
        assert_eq!(ago(Duration::weeks(2)), "2 weeks ago");
    }

    #[test]
    fn test_time_ago_future_is_just_now() {
        let now = utc_now();
        assert_eq!(time_ago(&(now + Duration::minutes(5))), "just now");
    }
}
