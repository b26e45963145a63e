//! Rolling window statistics
//!
//! Trailing-time-window averages of per-track metrics. A sample at index `j`
//! belongs to the window of index `i` when `j <= i` and
//! `ts[j] > ts[i] - window`; the current sample is always included. Absent
//! values are skipped, and spacing between samples is never assumed to be
//! uniform.
//!
//! Two forms are provided:
//! - [`rolling_average`] / [`average_vertical_speed`]: direct backward scan for
//!   a single index
//! - [`RollingAverages`]: every index at once with a two-pointer sweep, used by
//!   the display so animation ticks never rescan history

use crate::dataset::Dataset;
use crate::types::{Metric, TrackId, NUM_TRACKS};

fn window_ms(window_secs: f64) -> f64 {
    if window_secs.is_finite() && window_secs > 0.0 {
        window_secs * 1000.0
    } else {
        0.0
    }
}

/// Average of `metric` for `track` over the window ending at `index`
///
/// Returns `None` when the index is out of range or no sample in the window
/// has a value.
pub fn rolling_average(
    dataset: &Dataset,
    index: usize,
    track: TrackId,
    metric: Metric,
    window_secs: f64,
) -> Option<f64> {
    let current = dataset.get(index)?;
    let lower_bound = current.timestamp_ms as f64 - window_ms(window_secs);

    let mut sum = 0.0;
    let mut count = 0usize;
    for (offset, sample) in dataset.samples()[..=index].iter().rev().enumerate() {
        if offset > 0 && sample.timestamp_ms as f64 <= lower_bound {
            break;
        }
        if let Some(value) = sample.metric(track, metric) {
            sum += value;
            count += 1;
        }
    }

    (count > 0).then(|| sum / count as f64)
}

/// Average vertical speed for `track` over the window ending at `index`
#[inline]
pub fn average_vertical_speed(
    dataset: &Dataset,
    index: usize,
    track: TrackId,
    window_secs: f64,
) -> Option<f64> {
    rolling_average(dataset, index, track, Metric::VerticalSpeed, window_secs)
}

/// Precomputed rolling averages of one metric for both tracks
#[derive(Debug, Clone, PartialEq)]
pub struct RollingAverages {
    metric: Metric,
    window_secs: f64,
    values: [Vec<Option<f64>>; NUM_TRACKS],
}

impl RollingAverages {
    /// Compute averages for every index in O(n) per track
    pub fn compute(dataset: &Dataset, metric: Metric, window_secs: f64) -> Self {
        let values = TrackId::ALL.map(|track| sweep(dataset, track, metric, window_secs));
        Self {
            metric,
            window_secs,
            values,
        }
    }

    /// Averaged value at `index`, `None` if out of range or no data in window
    #[inline]
    pub fn get(&self, track: TrackId, index: usize) -> Option<f64> {
        self.values[track as usize].get(index).copied().flatten()
    }

    pub fn metric(&self) -> Metric {
        self.metric
    }

    pub fn window_secs(&self) -> f64 {
        self.window_secs
    }

    pub fn len(&self) -> usize {
        self.values[0].len()
    }

    pub fn is_empty(&self) -> bool {
        self.values[0].is_empty()
    }
}

fn sweep(dataset: &Dataset, track: TrackId, metric: Metric, window_secs: f64) -> Vec<Option<f64>> {
    let samples = dataset.samples();
    let window = window_ms(window_secs);

    let mut out = Vec::with_capacity(samples.len());
    let mut start = 0usize;
    let mut sum = 0.0;
    let mut count = 0usize;

    for (i, sample) in samples.iter().enumerate() {
        if let Some(value) = sample.metric(track, metric) {
            sum += value;
            count += 1;
        }

        let lower_bound = sample.timestamp_ms as f64 - window;
        while start < i && samples[start].timestamp_ms as f64 <= lower_bound {
            if let Some(value) = samples[start].metric(track, metric) {
                sum -= value;
                count -= 1;
            }
            start += 1;
        }

        if count == 0 {
            // drop accumulated rounding error once the window is empty
            sum = 0.0;
            out.push(None);
        } else {
            out.push(Some(sum / count as f64));
        }
    }

    out
}
