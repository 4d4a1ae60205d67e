//! Timestamp utilities
//!
//! Every row written by the fbswarm services carries RFC 3339 UTC text
//! timestamps, so ordering by the text column matches chronological order.

use chrono::{DateTime, SecondsFormat, Utc};

/// Get current UTC timestamp
pub fn now() -> DateTime<Utc> {
    Utc::now()
}

/// Current UTC time formatted for storage (millisecond precision, `Z` suffix)
pub fn timestamp() -> String {
    format_timestamp(now())
}

/// Format a timestamp the way it is stored in the database
pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::time::Duration;

    #[test]
    fn test_now_returns_valid_timestamp() {
        let timestamp = now();
        // Should be a reasonable timestamp (after year 2000)
        assert!(timestamp.timestamp() > 946_684_800); // 2000-01-01 00:00:00 UTC
    }

    #[test]
    fn test_format_timestamp_is_rfc3339_with_millis() {
        let at = Utc.with_ymd_and_hms(2024, 3, 9, 14, 5, 7).unwrap();
        assert_eq!(format_timestamp(at), "2024-03-09T14:05:07.000Z");
    }

    #[test]
    fn test_timestamp_parses_back() {
        let text = timestamp();
        let parsed = DateTime::parse_from_rfc3339(&text);
        assert!(parsed.is_ok(), "stored timestamp should be RFC 3339: {}", text);
    }

    #[tokio::test]
    async fn test_timestamps_sort_lexically() {
        let first = timestamp();
        tokio::time::sleep(Duration::from_millis(5)).await;
        let second = timestamp();
        // Text ordering must agree with time ordering for ORDER BY created_at
        assert!(second > first);
    }
}
