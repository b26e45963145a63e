//! Data table model
//!
//! Rows are built once per dataset (the rolling averages come from a single
//! sweep) and handed to the table surface; during playback the surface only
//! receives [`TableHighlight`] updates.

use serde::Serialize;

use super::format::format_value;
use super::payload::TableHighlight;
use crate::dataset::{format_utc, Dataset};
use crate::stats::RollingAverages;
use crate::types::{Metric, TrackId, TrackPoint};

/// One table row
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableRow {
    pub index: usize,
    /// Source time string, or the UTC timestamp when the source had none
    pub time: String,
    pub altitude_a: Option<f64>,
    pub altitude_b: Option<f64>,
    pub altitude_difference: Option<f64>,
    pub altitude_a_ft: Option<f64>,
    pub altitude_b_ft: Option<f64>,
    pub altitude_difference_ft: Option<f64>,
    pub vertical_speed_a: Option<f64>,
    pub vertical_speed_b: Option<f64>,
    pub avg_vertical_speed_a: Option<f64>,
    pub avg_vertical_speed_b: Option<f64>,
    pub vertical_accel_a: Option<f64>,
    pub vertical_accel_b: Option<f64>,
    pub distance_3d: Option<f64>,
}

impl TableRow {
    /// Column headers matching [`TableRow::cells`]
    ///
    /// Altitudes are shown in feet; the meter values stay on the row.
    pub const HEADERS: [&'static str; 11] = [
        "time",
        "alt_a_ft",
        "alt_b_ft",
        "alt_diff_ft",
        "vspeed_a",
        "vspeed_b",
        "vspeed_avg_a",
        "vspeed_avg_b",
        "vaccel_a",
        "vaccel_b",
        "distance_3d",
    ];

    /// Build every row for `dataset`
    pub fn build_all(dataset: &Dataset, window_secs: f64) -> Vec<TableRow> {
        let averages = RollingAverages::compute(dataset, Metric::VerticalSpeed, window_secs);
        Self::build_with(dataset, &averages)
    }

    /// Build every row reusing already computed vertical speed averages
    pub fn build_with(dataset: &Dataset, averages: &RollingAverages) -> Vec<TableRow> {
        dataset
            .samples()
            .iter()
            .enumerate()
            .map(|(index, s)| {
                let a = s.track(TrackId::A);
                let b = s.track(TrackId::B);
                TableRow {
                    index,
                    time: s
                        .time_label
                        .clone()
                        .or_else(|| format_utc(s.timestamp_ms))
                        .unwrap_or_else(|| s.timestamp_ms.to_string()),
                    altitude_a: a.and_then(|p| p.altitude),
                    altitude_b: b.and_then(|p| p.altitude),
                    altitude_difference: s.altitude_difference,
                    altitude_a_ft: a.and_then(TrackPoint::altitude_feet),
                    altitude_b_ft: b.and_then(TrackPoint::altitude_feet),
                    altitude_difference_ft: s.altitude_difference_feet(),
                    vertical_speed_a: a.and_then(|p| p.vertical_speed),
                    vertical_speed_b: b.and_then(|p| p.vertical_speed),
                    avg_vertical_speed_a: averages.get(TrackId::A, index),
                    avg_vertical_speed_b: averages.get(TrackId::B, index),
                    vertical_accel_a: a.and_then(|p| p.vertical_accel),
                    vertical_accel_b: b.and_then(|p| p.vertical_accel),
                    distance_3d: s.distance_3d,
                }
            })
            .collect()
    }

    /// Formatted cells in [`TableRow::HEADERS`] order
    pub fn cells(&self) -> Vec<String> {
        vec![
            self.time.clone(),
            format_value(self.altitude_a_ft, 1),
            format_value(self.altitude_b_ft, 1),
            format_value(self.altitude_difference_ft, 1),
            format_value(self.vertical_speed_a, 3),
            format_value(self.vertical_speed_b, 3),
            format_value(self.avg_vertical_speed_a, 3),
            format_value(self.avg_vertical_speed_b, 3),
            format_value(self.vertical_accel_a, 3),
            format_value(self.vertical_accel_b, 3),
            format_value(self.distance_3d, 3),
        ]
    }
}

/// Highlight change for a table surface that has to clear the old row itself
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HighlightChange {
    /// Row to un-highlight, if any
    pub clear: Option<usize>,
    pub set: usize,
}

/// Tracks the highlighted row on behalf of a table surface
#[derive(Debug, Clone, Default)]
pub struct TableHighlighter {
    current: Option<usize>,
}

impl TableHighlighter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Option<usize> {
        self.current
    }

    /// Record a new highlight and report which row to clear
    ///
    /// Highlighting the same row again clears nothing.
    pub fn apply(&mut self, highlight: &TableHighlight) -> HighlightChange {
        let previous = self.current.replace(highlight.index);
        HighlightChange {
            clear: previous.filter(|&p| p != highlight.index),
            set: highlight.index,
        }
    }

    /// Forget the highlight, e.g. after the table was rebuilt
    pub fn clear(&mut self) {
        self.current = None;
    }
}
