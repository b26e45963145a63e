//! Whole-session summary figures

use serde::Serialize;

use super::timestamp::format_utc;
use super::Dataset;

/// Aggregate figures over a dataset, as shown next to the player
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DatasetSummary {
    pub count: usize,
    /// UTC `YYYY-MM-DD HH:MM:SS` of the first sample
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub duration_ms: i64,
    pub max_altitude_difference: Option<f64>,
    pub min_altitude_difference: Option<f64>,
    pub max_distance_3d: Option<f64>,
}

impl DatasetSummary {
    pub fn compute(dataset: &Dataset) -> Self {
        let Some((start, end)) = dataset.time_range() else {
            return Self::default();
        };

        let diffs = dataset.samples().iter().filter_map(|s| s.altitude_difference);
        let distances = dataset.samples().iter().filter_map(|s| s.distance_3d);

        Self {
            count: dataset.len(),
            start_time: format_utc(start),
            end_time: format_utc(end),
            duration_ms: end.saturating_sub(start),
            max_altitude_difference: diffs.clone().reduce(f64::max),
            min_altitude_difference: diffs.reduce(f64::min),
            max_distance_3d: distances.reduce(f64::max),
        }
    }
}
