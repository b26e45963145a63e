//! Common types for duotrack
//!
//! Fundamental per-instant data shared by every component: the two track
//! identifiers, one track's fix at an instant, and the joint `Sample`.

use serde::{Deserialize, Serialize};

/// Number of tracks compared side by side
pub const NUM_TRACKS: usize = 2;

/// Default rolling window for averaged metrics, in seconds
pub const DEFAULT_WINDOW_SECS: f64 = 10.0;

/// Meters to international feet
pub const FEET_PER_METER: f64 = 3.28084;

#[inline]
pub fn meters_to_feet(meters: f64) -> f64 {
    meters * FEET_PER_METER
}

/// Track identifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrackId {
    A,
    B,
}

impl TrackId {
    /// Both tracks in display order
    pub const ALL: [TrackId; NUM_TRACKS] = [TrackId::A, TrackId::B];

    /// Short lowercase key ("a" / "b"), as used in field names
    pub fn key(&self) -> &'static str {
        match self {
            TrackId::A => "a",
            TrackId::B => "b",
        }
    }

    /// Display name
    pub fn name(&self) -> &'static str {
        match self {
            TrackId::A => "Track A",
            TrackId::B => "Track B",
        }
    }
}

/// Per-track metrics that can be averaged over a rolling window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    VerticalSpeed,
    HorizontalSpeed,
    Speed3d,
}

impl Metric {
    pub const ALL: [Metric; 3] = [Metric::VerticalSpeed, Metric::HorizontalSpeed, Metric::Speed3d];

    /// Read this metric from a track fix
    #[inline]
    pub fn read(&self, point: &TrackPoint) -> Option<f64> {
        match self {
            Metric::VerticalSpeed => point.vertical_speed,
            Metric::HorizontalSpeed => point.horizontal_speed,
            Metric::Speed3d => point.speed_3d,
        }
    }
}

/// A geographic position in decimal degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLon {
    pub lat: f64,
    pub lon: f64,
}

/// One track's fix at an instant
///
/// Every field is optional: sources drop individual values, and the display
/// shows absent values as `-` rather than failing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrackPoint {
    pub lat: Option<f64>,
    pub lon: Option<f64>,
    /// Altitude in meters
    pub altitude: Option<f64>,
    /// Altitude in feet
    pub altitude_ft: Option<f64>,
    /// m/s, positive when climbing
    pub vertical_speed: Option<f64>,
    pub horizontal_speed: Option<f64>,
    pub speed_3d: Option<f64>,
    /// m/s²
    pub vertical_accel: Option<f64>,
    pub horizontal_accel: Option<f64>,
    pub accel_3d: Option<f64>,
}

impl TrackPoint {
    /// Position, if both coordinates are present
    pub fn position(&self) -> Option<LatLon> {
        match (self.lat, self.lon) {
            (Some(lat), Some(lon)) => Some(LatLon { lat, lon }),
            _ => None,
        }
    }

    /// Altitude in feet, converted from meters when only those are known
    pub fn altitude_feet(&self) -> Option<f64> {
        self.altitude_ft.or_else(|| self.altitude.map(meters_to_feet))
    }
}

/// One time-stamped joint observation of both tracks
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    /// Milliseconds since the Unix epoch
    pub timestamp_ms: i64,
    /// Human-readable time from the source, if it had one
    pub time_label: Option<String>,
    pub track_a: Option<TrackPoint>,
    pub track_b: Option<TrackPoint>,
    /// Distance between the two tracks in meters
    pub distance_3d: Option<f64>,
    /// `track_a.altitude - track_b.altitude`
    pub altitude_difference: Option<f64>,
    /// Same difference in feet
    pub altitude_difference_ft: Option<f64>,
}

impl Sample {
    /// Create a sample with no track data
    pub fn empty(timestamp_ms: i64) -> Self {
        Self {
            timestamp_ms,
            time_label: None,
            track_a: None,
            track_b: None,
            distance_3d: None,
            altitude_difference: None,
            altitude_difference_ft: None,
        }
    }

    /// Altitude difference in feet, converted from meters when only those
    /// are known
    pub fn altitude_difference_feet(&self) -> Option<f64> {
        self.altitude_difference_ft
            .or_else(|| self.altitude_difference.map(meters_to_feet))
    }

    /// Get one track's fix
    #[inline]
    pub fn track(&self, track: TrackId) -> Option<&TrackPoint> {
        match track {
            TrackId::A => self.track_a.as_ref(),
            TrackId::B => self.track_b.as_ref(),
        }
    }

    /// Read a metric for one track, `None` when the track or value is absent
    #[inline]
    pub fn metric(&self, track: TrackId, metric: Metric) -> Option<f64> {
        self.track(track).and_then(|p| metric.read(p))
    }
}
