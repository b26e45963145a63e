//! Display payloads
//!
//! Everything the observer surfaces receive for one index. A [`DisplayFrame`]
//! is a pure function of `(dataset, index)` plus the display configuration,
//! which is what makes re-rendering the same index idempotent.

use serde::Serialize;

use super::format::format_value;
use crate::types::{LatLon, Sample, TrackId, TrackPoint};

/// Marker positions for the map surface
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarkerUpdate {
    pub index: usize,
    /// `None` when the track has no fix at this instant; the marker stays put
    pub track_a: Option<LatLon>,
    pub track_b: Option<LatLon>,
}

impl MarkerUpdate {
    pub fn position(&self, track: TrackId) -> Option<LatLon> {
        match track {
            TrackId::A => self.track_a,
            TrackId::B => self.track_b,
        }
    }
}

/// One track's values for the numeric overlay
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TrackReadout {
    pub lat: Option<f64>,
    pub lon: Option<f64>,
    pub altitude: Option<f64>,
    pub altitude_ft: Option<f64>,
    pub vertical_speed: Option<f64>,
    /// Rolling-window average of `vertical_speed`
    pub avg_vertical_speed: Option<f64>,
    pub horizontal_speed: Option<f64>,
    pub speed_3d: Option<f64>,
    pub vertical_accel: Option<f64>,
    pub horizontal_accel: Option<f64>,
    pub accel_3d: Option<f64>,
}

impl TrackReadout {
    pub fn new(point: Option<&TrackPoint>, avg_vertical_speed: Option<f64>) -> Self {
        let point = point.cloned().unwrap_or_default();
        Self {
            lat: point.lat,
            lon: point.lon,
            altitude: point.altitude,
            altitude_ft: point.altitude_feet(),
            vertical_speed: point.vertical_speed,
            avg_vertical_speed,
            horizontal_speed: point.horizontal_speed,
            speed_3d: point.speed_3d,
            vertical_accel: point.vertical_accel,
            horizontal_accel: point.horizontal_accel,
            accel_3d: point.accel_3d,
        }
    }
}

/// A single keyed value of the overlay
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DisplayField {
    /// Stable key, e.g. `alt-a`, `vspeed-avg-b`, `distance-3d`
    pub key: String,
    pub value: Option<f64>,
    /// Decimal places used when formatting
    pub precision: usize,
}

impl DisplayField {
    fn new(key: impl Into<String>, value: Option<f64>, precision: usize) -> Self {
        Self {
            key: key.into(),
            value,
            precision,
        }
    }

    /// Value with its precision applied, `-` when absent
    pub fn formatted(&self) -> String {
        format_value(self.value, self.precision)
    }
}

/// Numeric overlay contents: both tracks plus the comparison scalars
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OverlayUpdate {
    pub index: usize,
    pub track_a: TrackReadout,
    pub track_b: TrackReadout,
    pub distance_3d: Option<f64>,
    pub altitude_difference: Option<f64>,
    pub altitude_difference_ft: Option<f64>,
}

impl OverlayUpdate {
    pub fn track(&self, track: TrackId) -> &TrackReadout {
        match track {
            TrackId::A => &self.track_a,
            TrackId::B => &self.track_b,
        }
    }

    /// Flatten into keyed fields in display order
    ///
    /// Coordinates use 6 decimals, altitude and the comparison values 1,
    /// speeds and accelerations 3.
    pub fn fields(&self) -> Vec<DisplayField> {
        let mut fields = Vec::with_capacity(25);
        for track in TrackId::ALL {
            let r = self.track(track);
            let k = track.key();
            fields.push(DisplayField::new(format!("lat-{k}"), r.lat, 6));
            fields.push(DisplayField::new(format!("lon-{k}"), r.lon, 6));
            fields.push(DisplayField::new(format!("alt-{k}"), r.altitude, 1));
            fields.push(DisplayField::new(format!("alt-ft-{k}"), r.altitude_ft, 1));
            fields.push(DisplayField::new(format!("vspeed-{k}"), r.vertical_speed, 3));
            fields.push(DisplayField::new(format!("vspeed-avg-{k}"), r.avg_vertical_speed, 3));
            fields.push(DisplayField::new(format!("hspeed-{k}"), r.horizontal_speed, 3));
            fields.push(DisplayField::new(format!("speed3d-{k}"), r.speed_3d, 3));
            fields.push(DisplayField::new(format!("vaccel-{k}"), r.vertical_accel, 3));
            fields.push(DisplayField::new(format!("haccel-{k}"), r.horizontal_accel, 3));
            fields.push(DisplayField::new(format!("accel3d-{k}"), r.accel_3d, 3));
        }
        fields.push(DisplayField::new("distance-3d", self.distance_3d, 1));
        fields.push(DisplayField::new("alt-diff", self.altitude_difference, 1));
        fields.push(DisplayField::new("alt-diff-ft", self.altitude_difference_ft, 1));
        fields
    }

    /// Look up one field by key
    pub fn field(&self, key: &str) -> Option<DisplayField> {
        self.fields().into_iter().find(|f| f.key == key)
    }
}

/// Row to mark as current in the data table
///
/// Clearing the previously highlighted row is the table surface's job; see
/// [`TableHighlighter`](super::TableHighlighter).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TableHighlight {
    pub index: usize,
}

/// Scrub handle position and time labels
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProgressUpdate {
    pub index: usize,
    /// `index / (len - 1)`, 0 for a single-sample dataset
    pub fraction: f64,
    /// Current time as `HH:MM:SS` in the configured offset
    pub time_label: String,
    /// Labels for the first and last samples
    pub start_label: String,
    pub end_label: String,
}

/// Complete display payload for one index
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DisplayFrame {
    pub index: usize,
    pub timestamp_ms: i64,
    pub markers: MarkerUpdate,
    pub overlay: OverlayUpdate,
    pub table: TableHighlight,
    pub progress: ProgressUpdate,
}

/// Progress fraction for `index` in a dataset of `len` samples
pub fn progress_fraction(index: usize, len: usize) -> Option<f64> {
    match len {
        0 => None,
        1 => Some(0.0),
        _ => Some(index.min(len - 1) as f64 / (len - 1) as f64),
    }
}

pub(super) fn markers_for(index: usize, sample: &Sample) -> MarkerUpdate {
    MarkerUpdate {
        index,
        track_a: sample.track_a.as_ref().and_then(TrackPoint::position),
        track_b: sample.track_b.as_ref().and_then(TrackPoint::position),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_fraction() {
        assert_eq!(progress_fraction(0, 0), None);
        assert_eq!(progress_fraction(0, 1), Some(0.0));
        assert_eq!(progress_fraction(0, 5), Some(0.0));
        assert_eq!(progress_fraction(2, 5), Some(0.5));
        assert_eq!(progress_fraction(4, 5), Some(1.0));
    }

    #[test]
    fn test_overlay_fields_formatting() {
        let overlay = OverlayUpdate {
            index: 0,
            track_a: TrackReadout {
                lat: Some(35.6812),
                altitude: Some(1523.46),
                vertical_speed: Some(-1.23456),
                ..Default::default()
            },
            track_b: TrackReadout::default(),
            distance_3d: Some(250.04),
            altitude_difference: None,
            altitude_difference_ft: None,
        };

        let fields = overlay.fields();
        assert_eq!(fields.len(), 25);
        assert_eq!(overlay.field("lat-a").unwrap().formatted(), "35.681200");
        assert_eq!(overlay.field("alt-a").unwrap().formatted(), "1523.5");
        assert_eq!(overlay.field("vspeed-a").unwrap().formatted(), "-1.235");
        assert_eq!(overlay.field("alt-b").unwrap().formatted(), "-");
        assert_eq!(overlay.field("distance-3d").unwrap().formatted(), "250.0");
        assert_eq!(overlay.field("alt-diff").unwrap().formatted(), "-");
        assert!(overlay.field("nope").is_none());
    }

    #[test]
    fn test_readout_from_missing_track() {
        let readout = TrackReadout::new(None, Some(1.0));
        assert_eq!(readout.altitude, None);
        assert_eq!(readout.altitude_ft, None);
        assert_eq!(readout.avg_vertical_speed, Some(1.0));
    }
}
