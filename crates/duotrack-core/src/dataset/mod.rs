//! Dataset ingestion
//!
//! A `Dataset` is the immutable, time-ordered sequence of samples for one
//! visualization session. It is built once by [`normalize`] from loosely typed
//! JSON records and then shared read-only by the clock, the scrub controller
//! and the display synchronizer.
//!
//! # Usage
//!
//! ```ignore
//! use duotrack_core::dataset::{load_dataset, DatasetSummary};
//!
//! let dataset = load_dataset(Path::new("flight.json"))?;
//! let summary = DatasetSummary::compute(&dataset);
//! ```

mod normalize;
mod summary;
mod timestamp;

pub use normalize::normalize;
pub use summary::DatasetSummary;
pub use timestamp::{format_utc, parse_time_label, SYNTHETIC_SPACING_MS};

use std::path::{Path, PathBuf};
use std::sync::Arc;

use thiserror::Error;

use crate::types::Sample;

/// Errors that can occur while ingesting a dataset
///
/// Malformed *records* never produce an error (their fields become absent);
/// only an unreadable file or a document that is not JSON at all does.
#[derive(Error, Debug)]
pub enum DatasetError {
    /// Failed to read the dataset file
    #[error("Failed to read dataset file {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The document is not valid JSON
    #[error("Dataset is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Ordered, immutable sequence of samples
///
/// Cloning is cheap (the samples are behind an `Arc`). Two clones of the same
/// dataset are recognised by [`Dataset::same_as`], which lets derived caches
/// detect when they were built for a different session.
#[derive(Debug, Clone)]
pub struct Dataset {
    samples: Arc<[Sample]>,
}

impl Default for Dataset {
    fn default() -> Self {
        Self::empty()
    }
}

impl Dataset {
    /// Create an empty dataset (no playback possible)
    pub fn empty() -> Self {
        Self {
            samples: Arc::from(Vec::new()),
        }
    }

    /// Build a dataset from already-typed samples
    ///
    /// Samples are stable-sorted by timestamp so equal timestamps keep their
    /// source order.
    pub fn from_samples(mut samples: Vec<Sample>) -> Self {
        if samples.windows(2).any(|w| w[0].timestamp_ms > w[1].timestamp_ms) {
            log::warn!("Dataset: samples out of time order, sorting {} samples", samples.len());
            samples.sort_by_key(|s| s.timestamp_ms);
        }
        Self {
            samples: Arc::from(samples),
        }
    }

    /// Parse and normalize a JSON document
    ///
    /// Accepts a bare array of records, an object keyed by index, or a
    /// processing response with a `visualization_data` field.
    pub fn from_json_str(json: &str) -> Result<Self, DatasetError> {
        let value: serde_json::Value = serde_json::from_str(json)?;
        Ok(normalize(&value))
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Get a sample by index
    #[inline]
    pub fn get(&self, index: usize) -> Option<&Sample> {
        self.samples.get(index)
    }

    /// All samples in time order
    #[inline]
    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    /// Index of the last sample, `None` when empty
    #[inline]
    pub fn last_index(&self) -> Option<usize> {
        self.samples.len().checked_sub(1)
    }

    #[inline]
    pub fn contains_index(&self, index: usize) -> bool {
        index < self.samples.len()
    }

    /// Timestamps of the first and last samples
    pub fn time_range(&self) -> Option<(i64, i64)> {
        let first = self.samples.first()?;
        let last = self.samples.last()?;
        Some((first.timestamp_ms, last.timestamp_ms))
    }

    /// Whether `other` shares this dataset's storage
    #[inline]
    pub fn same_as(&self, other: &Dataset) -> bool {
        Arc::ptr_eq(&self.samples, &other.samples)
    }
}

/// Load and normalize a dataset from a JSON file
pub fn load_dataset(path: &Path) -> Result<Dataset, DatasetError> {
    log::info!("load_dataset: Loading from {:?}", path);

    let contents = std::fs::read_to_string(path).map_err(|source| DatasetError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let dataset = Dataset::from_json_str(&contents)?;

    log::info!("load_dataset: {} samples loaded from {:?}", dataset.len(), path);
    Ok(dataset)
}
