//! Duotrack Core - Synchronized playback of two GPS tracks
//!
//! Loads a time-indexed dataset of paired track observations and replays it
//! at a controllable speed, keeping a map, a numeric overlay, a data table
//! and a progress indicator in sync with one shared cursor.

pub mod clock;
pub mod config;
pub mod dataset;
pub mod display;
pub mod error;
pub mod scrub;
pub mod session;
pub mod stats;
pub mod types;

pub use clock::{EndOfDataPolicy, PlayState, PlaybackClock, PlaybackCursor, TickOutcome, TickToken};
pub use dataset::{load_dataset, Dataset, DatasetError, DatasetSummary};
pub use error::{PlaybackError, PlaybackResult};
pub use session::{PlaybackCommand, Session};
pub use types::*;
