//! Timestamp utilities
//!
//! Sightings store `observed_at` as `YYYY-MM-DDTHH:MM:SS` text. That layout
//! sorts lexically in chronological order and is understood by SQLite's
//! `strftime`, which the aggregation queries rely on.

use crate::{Error, Result};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

/// Canonical storage format for `observed_at`
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Calendar date format accepted by filters and submissions
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Number of leading characters kept from a raw ingestion timestamp
const TIMESTAMP_PREFIX_LEN: usize = 19;

/// Date-time layouts accepted at ingestion; minute precision means second 00
const INGEST_FORMATS: [&str; 4] = [
    TIMESTAMP_FORMAT,
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Normalize a raw snapshot/feed timestamp to second precision
///
/// Keeps the first 19 characters (dropping fractional seconds and zone
/// suffixes), then accepts either a `T` or a space between date and time,
/// with or without seconds. A bare date is taken as midnight. Returns `None`
/// for anything else.
pub fn normalize_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    let prefix = match raw.char_indices().nth(TIMESTAMP_PREFIX_LEN) {
        Some((idx, _)) => &raw[..idx],
        None => raw,
    };

    INGEST_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(prefix, format).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(prefix, DATE_FORMAT)
                .ok()
                .map(|date| date.and_time(NaiveTime::MIN))
        })
}

/// Render a timestamp in the canonical storage format
pub fn format_timestamp(ts: &NaiveDateTime) -> String {
    ts.format(TIMESTAMP_FORMAT).to_string()
}

/// Parse a `YYYY-MM-DD` value supplied by a caller
///
/// `field` names the parameter in the error message.
pub fn parse_date(field: &str, value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT).map_err(|_| {
        Error::InvalidInput(format!(
            "{} must be a date in YYYY-MM-DD format, got '{}'",
            field, value
        ))
    })
}

/// Parse an `HH:MM` or `HH:MM:SS` time of day
pub fn parse_time_of_day(value: &str) -> Result<NaiveTime> {
    let value = value.trim();
    NaiveTime::parse_from_str(value, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(value, "%H:%M:%S"))
        .map_err(|_| {
            Error::InvalidInput(format!("time must be HH:MM or HH:MM:SS, got '{}'", value))
        })
}

/// First second of a day (inclusive lower bound)
pub fn start_of_day(date: NaiveDate) -> NaiveDateTime {
    date.and_time(NaiveTime::MIN)
}

/// Last whole second of a day (inclusive upper bound)
pub fn end_of_day(date: NaiveDate) -> NaiveDateTime {
    date.and_hms_opt(23, 59, 59)
        .unwrap_or_else(|| date.and_time(NaiveTime::MIN))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ts(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, TIMESTAMP_FORMAT).unwrap()
    }

    #[test]
    fn test_normalize_iso_with_fraction_and_zone() {
        assert_eq!(
            normalize_timestamp("2024-03-01T10:15:30.123456+00:00"),
            Some(ts("2024-03-01T10:15:30"))
        );
    }

    #[test]
    fn test_normalize_space_separator() {
        assert_eq!(
            normalize_timestamp("2024-03-01 10:15:30"),
            Some(ts("2024-03-01T10:15:30"))
        );
    }

    #[test]
    fn test_normalize_minute_precision() {
        assert_eq!(normalize_timestamp("2024-03-01T10:15"), Some(ts("2024-03-01T10:15:00")));
        assert_eq!(normalize_timestamp("2024-03-01 10:15"), Some(ts("2024-03-01T10:15:00")));
    }

    #[test]
    fn test_normalize_bare_date_is_midnight() {
        assert_eq!(normalize_timestamp("2024-06-01"), Some(ts("2024-06-01T00:00:00")));
    }

    #[test]
    fn test_normalize_rejects_garbage() {
        assert_eq!(normalize_timestamp("yesterday"), None);
        assert_eq!(normalize_timestamp(""), None);
        assert_eq!(normalize_timestamp("2024-13-45T99:00:00"), None);
    }

    #[test]
    fn test_format_round_trips_canonical_form() {
        let value = ts("2023-11-05T07:08:09");
        assert_eq!(format_timestamp(&value), "2023-11-05T07:08:09");
    }

    #[test]
    fn test_parse_date_error_names_field() {
        let err = parse_date("start_date", "01/03/2024").unwrap_err();
        assert!(err.to_string().contains("start_date"));
        assert!(err.is_client_error());
    }

    #[test]
    fn test_day_bounds() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        assert_eq!(format_timestamp(&start_of_day(date)), "2024-03-01T00:00:00");
        assert_eq!(format_timestamp(&end_of_day(date)), "2024-03-01T23:59:59");
    }

    #[test]
    fn test_parse_time_of_day_variants() {
        assert_eq!(parse_time_of_day("14:30").unwrap(), NaiveTime::from_hms_opt(14, 30, 0).unwrap());
        assert_eq!(parse_time_of_day("14:30:15").unwrap(), NaiveTime::from_hms_opt(14, 30, 15).unwrap());
        assert!(parse_time_of_day("2pm").is_err());
    }
}
