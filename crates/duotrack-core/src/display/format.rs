//! Presentation formatting for display values

use chrono::{DateTime, FixedOffset};

/// Placeholder shown for absent values
pub const MISSING: &str = "-";

/// Placeholder time label for timestamps chrono can't represent
pub const MISSING_TIME: &str = "--:--:--";

/// Format a timestamp as `HH:MM:SS` after applying `offset`
pub fn format_time_label(timestamp_ms: i64, offset: FixedOffset) -> String {
    match DateTime::from_timestamp_millis(timestamp_ms) {
        Some(utc) => utc.with_timezone(&offset).format("%H:%M:%S").to_string(),
        None => MISSING_TIME.to_string(),
    }
}

/// Format an optional value with fixed precision, `-` when absent
pub fn format_value(value: Option<f64>, precision: usize) -> String {
    match value {
        Some(v) if v.is_finite() => format!("{:.*}", precision, v),
        _ => MISSING.to_string(),
    }
}

/// Format a speed multiplier for the speed readout (e.g. `2.5x`)
pub fn format_speed(multiplier: f64) -> String {
    format!("{:.1}x", multiplier)
}
