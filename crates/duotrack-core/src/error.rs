//! Playback error types

use thiserror::Error;

/// Rejected playback requests
///
/// None of these are fatal: the session stays usable and the request is
/// simply not applied.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PlaybackError {
    /// The session has no samples
    #[error("No samples loaded")]
    EmptyDataset,

    /// Index outside `[0, len - 1]`
    #[error("Index {index} out of range (dataset has {len} samples)")]
    IndexOutOfRange { index: usize, len: usize },

    /// Scrub fraction is NaN or infinite
    #[error("Scrub position {0} is not a finite fraction")]
    InvalidFraction(f64),
}

/// Result type for playback operations
pub type PlaybackResult<T> = Result<T, PlaybackError>;
