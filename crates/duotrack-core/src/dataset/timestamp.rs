//! Time field parsing for records without a numeric timestamp

use chrono::{DateTime, NaiveDateTime};

/// Spacing used when a timestamp has to be synthesized from the sample index
pub const SYNTHETIC_SPACING_MS: i64 = 100;

/// Zone-less layouts produced by the track processing backend
const NAIVE_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
];

/// Parse a human-readable time into milliseconds since the epoch
///
/// RFC 3339 strings keep their offset; zone-less strings are taken as UTC.
/// Returns `None` for anything else.
pub fn parse_time_label(label: &str) -> Option<i64> {
    let label = label.trim();
    if label.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(label) {
        return Some(dt.timestamp_millis());
    }

    NAIVE_FORMATS.iter().find_map(|fmt| {
        NaiveDateTime::parse_from_str(label, fmt)
            .ok()
            .map(|naive| naive.and_utc().timestamp_millis())
    })
}

/// Format a timestamp as `YYYY-MM-DD HH:MM:SS` in UTC
pub fn format_utc(timestamp_ms: i64) -> Option<String> {
    DateTime::from_timestamp_millis(timestamp_ms)
        .map(|dt| dt.format("%Y-%m-%d %H:%M:%S").to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_backend_format() {
        // 2024-01-01 00:00:00 UTC
        assert_eq!(parse_time_label("2024-01-01 00:00:00"), Some(1_704_067_200_000));
        assert_eq!(parse_time_label("2024-01-01T00:00:01"), Some(1_704_067_201_000));
    }

    #[test]
    fn test_parse_fractional_seconds() {
        assert_eq!(
            parse_time_label("2024-01-01 00:00:00.250"),
            Some(1_704_067_200_250)
        );
    }

    #[test]
    fn test_parse_rfc3339_keeps_offset() {
        assert_eq!(
            parse_time_label("2024-01-01T09:00:00+09:00"),
            Some(1_704_067_200_000)
        );
        assert_eq!(parse_time_label("2024-01-01T00:00:00Z"), Some(1_704_067_200_000));
    }

    #[test]
    fn test_parse_garbage() {
        assert_eq!(parse_time_label(""), None);
        assert_eq!(parse_time_label("noon-ish"), None);
        assert_eq!(parse_time_label("12:30:00"), None);
    }

    #[test]
    fn test_format_utc() {
        assert_eq!(
            format_utc(1_704_067_200_000).as_deref(),
            Some("2024-01-01 00:00:00")
        );
    }
}
