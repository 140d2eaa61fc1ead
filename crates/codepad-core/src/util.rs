//! Identifier and timestamp helpers

use chrono::{DateTime, SecondsFormat, Utc};
use uuid::Uuid;

/// Generate a fresh record identifier
///
/// Random v4 UUIDs, so ids created back-to-back never collide.
#[must_use]
pub fn new_id() -> String {
    Uuid::new_v4().to_string()
}

/// Current time as stored on records
#[must_use]
pub fn now() -> DateTime<Utc> {
    Utc::now()
}

/// Format a timestamp for an indexed column
///
/// Fixed nanosecond precision keeps lexical order equal to time order.
#[must_use]
pub fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

/// Parse a timestamp written by [`format_timestamp`]
///
/// # Errors
/// Returns an error if the string is not RFC 3339
pub fn parse_timestamp(s: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
    Ok(DateTime::parse_from_rfc3339(s)?.with_timezone(&Utc))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::collections::HashSet;

    #[test]
    fn test_new_id_unique_under_rapid_creation() {
        let ids: HashSet<String> = (0..10_000).map(|_| new_id()).collect();
        assert_eq!(ids.len(), 10_000);
    }

    #[test]
    fn test_timestamp_roundtrip_keeps_nanos() {
        let ts = Utc
            .timestamp_opt(1_700_000_000, 123_456_789)
            .single()
            .unwrap();
        let s = format_timestamp(&ts);
        assert_eq!(s, "2023-11-14T22:13:20.123456789Z");
        assert_eq!(parse_timestamp(&s).unwrap(), ts);
    }

    #[test]
    fn test_timestamp_lexical_order() {
        let a = Utc.timestamp_opt(1_700_000_000, 900_000_000).single().unwrap();
        let b = Utc.timestamp_opt(1_700_000_001, 0).single().unwrap();
        assert!(format_timestamp(&a) < format_timestamp(&b));
    }
}
