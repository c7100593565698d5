//! Lenient timestamp parsing for transaction log rows
//!
//! Upstream systems are not consistent about how they stamp transactions, so
//! parsing tries RFC 3339 first and then a fixed, ordered list of fallback
//! formats. The first format that parses wins. Timestamps without an offset
//! are taken as UTC.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

use crate::error::{Result, TxSyncError};

/// Fallback formats tried, in order, after RFC 3339.
const FALLBACK_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"];

/// Date-only fallback, midnight UTC.
const DATE_ONLY_FORMAT: &str = "%Y-%m-%d";

/// Parse a transaction timestamp, trying RFC 3339 first and then each
/// fallback format in order.
pub fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>> {
    let raw = raw.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(dt.with_timezone(&Utc));
    }

    for format in FALLBACK_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Ok(naive.and_utc());
        }
    }

    if let Ok(date) = NaiveDate::parse_from_str(raw, DATE_ONLY_FORMAT) {
        // midnight UTC
        return Ok(date.and_hms_opt(0, 0, 0).unwrap_or_default().and_utc());
    }

    Err(TxSyncError::Parse(format!("unable to parse date: {raw}")))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_rfc3339_primary() {
        let parsed = parse_timestamp("2024-01-01T10:00:00Z").unwrap();
        assert_eq!(parsed, Utc.with_ymd_and_hms(2024, 1, 1, 10, 0, 0).unwrap());
    }

    #[test]
    fn test_rfc3339_offset_normalized_to_utc() {
        let parsed = parse_timestamp("2024-01-01T10:00:00+02:00").unwrap();
        assert_eq!(parsed, Utc.with_ymd_and_hms(2024, 1, 1, 8, 0, 0).unwrap());
    }

    #[test]
    fn test_naive_datetime_fallbacks() {
        let expected = Utc.with_ymd_and_hms(2024, 3, 15, 9, 30, 0).unwrap();
        assert_eq!(parse_timestamp("2024-03-15T09:30:00").unwrap(), expected);
        assert_eq!(parse_timestamp("2024-03-15 09:30:00").unwrap(), expected);
    }

    #[test]
    fn test_date_only_is_midnight_utc() {
        let parsed = parse_timestamp("2024-03-15").unwrap();
        assert_eq!(parsed, Utc.with_ymd_and_hms(2024, 3, 15, 0, 0, 0).unwrap());
    }

    #[test]
    fn test_garbage_is_rejected() {
        assert!(parse_timestamp("not-a-date").is_err());
        assert!(parse_timestamp("").is_err());
        assert!(parse_timestamp("15/03/2024").is_err());
    }

    #[test]
    fn test_surrounding_whitespace_tolerated() {
        assert!(parse_timestamp(" 2024-01-01T10:00:00Z ").is_ok());
    }
}
