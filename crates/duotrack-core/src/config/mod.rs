//! Session configuration
//!
//! All tunables for a playback session live here so hosts can load them from
//! YAML instead of relying on constants:
//!
//! - `playback`: logical advance rate, initial speed, end-of-data policy
//! - `statistics`: rolling window length
//! - `display`: fixed UTC offset for the time label
//!
//! ```ignore
//! use duotrack_core::config::{default_config_path, load_config, DuotrackConfig};
//!
//! let config: DuotrackConfig = load_config(&default_config_path());
//! ```

mod io;
mod paths;

pub use io::{load_config, read_config, save_config};
pub use paths::{default_config_dir, default_config_path, CONFIG_FILENAME};

use chrono::{FixedOffset, Offset, Utc};
use serde::{Deserialize, Serialize};

use crate::clock::EndOfDataPolicy;
use crate::types::DEFAULT_WINDOW_SECS;

/// Root configuration for a playback session
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DuotrackConfig {
    pub playback: PlaybackConfig,
    pub statistics: StatisticsConfig,
    pub display: DisplayConfig,
}

/// Playback clock configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaybackConfig {
    /// Logical samples advanced per second of wall time at 1x speed
    /// Independent of the host's frame rate.
    /// Default: 30.0 (one sample every ~33 ms)
    pub samples_per_second: f64,

    /// Speed multiplier applied when a session starts, clamped to [1, 10]
    /// Default: 1.0
    pub default_speed: f64,

    /// What happens when playback runs past the last sample
    /// Default: loop back to the first sample
    pub end_policy: EndOfDataPolicy,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            samples_per_second: 30.0,
            default_speed: 1.0,
            end_policy: EndOfDataPolicy::default(),
        }
    }
}

/// Rolling statistics configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatisticsConfig {
    /// Trailing window for averaged speeds, in seconds
    /// Default: 10.0
    pub window_secs: f64,
}

impl Default for StatisticsConfig {
    fn default() -> Self {
        Self {
            window_secs: DEFAULT_WINDOW_SECS,
        }
    }
}

/// Display formatting configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Offset applied to timestamps before formatting the time label
    /// Default: +540 minutes (UTC+9)
    pub utc_offset_minutes: i32,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            utc_offset_minutes: 9 * 60,
        }
    }
}

impl DisplayConfig {
    /// The configured offset, or UTC if it is out of range (beyond ±24h)
    pub fn offset(&self) -> FixedOffset {
        FixedOffset::east_opt(self.utc_offset_minutes.saturating_mul(60)).unwrap_or_else(|| {
            log::warn!(
                "DisplayConfig: utc_offset_minutes {} out of range, using UTC",
                self.utc_offset_minutes
            );
            Utc.fix()
        })
    }
}
