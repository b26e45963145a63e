//! Display synchronization
//!
//! Given a dataset and an index, the [`DisplaySynchronizer`] builds one
//! [`DisplayFrame`] and pushes its parts to every registered surface:
//!
//! - [`MapSink`]: marker positions for both tracks
//! - [`OverlaySink`]: per-track readouts, rolling averages, comparison values
//! - [`TableSink`]: the row to highlight
//! - [`ProgressSink`]: scrub handle fraction and time labels
//!
//! Rendering the same index twice delivers identical payloads. A sink that
//! fails is logged and skipped; the remaining sinks still get their update.

mod format;
mod payload;
mod sink;
mod table;

pub use format::{format_speed, format_time_label, format_value, MISSING, MISSING_TIME};
pub use payload::{
    progress_fraction, DisplayField, DisplayFrame, MarkerUpdate, OverlayUpdate, ProgressUpdate,
    TableHighlight, TrackReadout,
};
pub use sink::{
    MapSink, OverlaySink, ProgressSink, SinkError, SinkResult, Surface, TableSink,
};
pub use table::{HighlightChange, TableHighlighter, TableRow};

use chrono::FixedOffset;

use crate::config::DuotrackConfig;
use crate::dataset::Dataset;
use crate::stats::{average_vertical_speed, RollingAverages};
use crate::types::{Metric, TrackId};

/// Outcome of one [`DisplaySynchronizer::render`] call
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RenderReport {
    /// Index that was rendered, `None` when the call was a no-op
    pub index: Option<usize>,
    /// Number of sinks that accepted their update
    pub delivered: usize,
    /// Sinks that returned an error, in delivery order
    pub failures: Vec<(Surface, SinkError)>,
}

impl RenderReport {
    #[inline]
    pub fn rendered(&self) -> bool {
        self.index.is_some()
    }

    #[inline]
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Pushes the state at a given index to every observer surface
pub struct DisplaySynchronizer {
    offset: FixedOffset,
    window_secs: f64,
    /// Dataset the cached averages belong to
    bound: Option<(Dataset, RollingAverages)>,
    map_sinks: Vec<Box<dyn MapSink>>,
    overlay_sinks: Vec<Box<dyn OverlaySink>>,
    table_sinks: Vec<Box<dyn TableSink>>,
    progress_sinks: Vec<Box<dyn ProgressSink>>,
}

impl DisplaySynchronizer {
    pub fn new(config: &DuotrackConfig) -> Self {
        Self {
            offset: config.display.offset(),
            window_secs: config.statistics.window_secs,
            bound: None,
            map_sinks: Vec::new(),
            overlay_sinks: Vec::new(),
            table_sinks: Vec::new(),
            progress_sinks: Vec::new(),
        }
    }

    pub fn add_map_sink(&mut self, sink: impl MapSink + 'static) {
        self.map_sinks.push(Box::new(sink));
    }

    pub fn add_overlay_sink(&mut self, sink: impl OverlaySink + 'static) {
        self.overlay_sinks.push(Box::new(sink));
    }

    pub fn add_table_sink(&mut self, sink: impl TableSink + 'static) {
        self.table_sinks.push(Box::new(sink));
    }

    pub fn add_progress_sink(&mut self, sink: impl ProgressSink + 'static) {
        self.progress_sinks.push(Box::new(sink));
    }

    /// Total number of registered sinks across all surfaces
    pub fn sink_count(&self) -> usize {
        self.map_sinks.len()
            + self.overlay_sinks.len()
            + self.table_sinks.len()
            + self.progress_sinks.len()
    }

    #[inline]
    pub fn window_secs(&self) -> f64 {
        self.window_secs
    }

    #[inline]
    pub fn offset(&self) -> FixedOffset {
        self.offset
    }

    /// Precompute rolling averages for `dataset`
    ///
    /// Frames for a bound dataset read the cached averages; any other
    /// dataset falls back to a direct window scan.
    pub fn bind(&mut self, dataset: &Dataset) {
        let averages = RollingAverages::compute(dataset, Metric::VerticalSpeed, self.window_secs);
        log::debug!(
            "DisplaySynchronizer: Bound dataset with {} samples ({:.1}s window)",
            dataset.len(),
            self.window_secs
        );
        self.bound = Some((dataset.clone(), averages));
    }

    /// Cached averages, if bound to `dataset`
    pub fn averages_for(&self, dataset: &Dataset) -> Option<&RollingAverages> {
        self.bound
            .as_ref()
            .filter(|(bound, _)| bound.same_as(dataset))
            .map(|(_, averages)| averages)
    }

    /// Table rows for `dataset`, reusing the cached averages when bound
    pub fn table_rows(&self, dataset: &Dataset) -> Vec<TableRow> {
        match self.averages_for(dataset) {
            Some(averages) => TableRow::build_with(dataset, averages),
            None => TableRow::build_all(dataset, self.window_secs),
        }
    }

    fn average(&self, dataset: &Dataset, index: usize, track: TrackId) -> Option<f64> {
        match self.averages_for(dataset) {
            Some(averages) => averages.get(track, index),
            None => average_vertical_speed(dataset, index, track, self.window_secs),
        }
    }

    fn label(&self, timestamp_ms: i64) -> String {
        format_time_label(timestamp_ms, self.offset)
    }

    /// Build the display payload for `index` without delivering it
    pub fn frame(&self, dataset: &Dataset, index: usize) -> Option<DisplayFrame> {
        let sample = dataset.get(index)?;
        let (first, last) = dataset.time_range()?;
        let fraction = progress_fraction(index, dataset.len())?;

        let overlay = OverlayUpdate {
            index,
            track_a: TrackReadout::new(
                sample.track(TrackId::A),
                self.average(dataset, index, TrackId::A),
            ),
            track_b: TrackReadout::new(
                sample.track(TrackId::B),
                self.average(dataset, index, TrackId::B),
            ),
            distance_3d: sample.distance_3d,
            altitude_difference: sample.altitude_difference,
            altitude_difference_ft: sample.altitude_difference_feet(),
        };

        Some(DisplayFrame {
            index,
            timestamp_ms: sample.timestamp_ms,
            markers: payload::markers_for(index, sample),
            overlay,
            table: TableHighlight { index },
            progress: ProgressUpdate {
                index,
                fraction,
                time_label: self.label(sample.timestamp_ms),
                start_label: self.label(first),
                end_label: self.label(last),
            },
        })
    }

    /// Deliver the state at `index` to every sink
    ///
    /// An empty dataset, a missing index or an out-of-range index leaves
    /// the surfaces untouched.
    pub fn render(&mut self, dataset: &Dataset, index: Option<usize>) -> RenderReport {
        let Some(index) = index else {
            log::debug!("DisplaySynchronizer: Nothing to render, no current index");
            return RenderReport::default();
        };
        if dataset.is_empty() {
            log::debug!("DisplaySynchronizer: Nothing to render, dataset is empty");
            return RenderReport::default();
        }
        let Some(frame) = self.frame(dataset, index) else {
            log::warn!(
                "DisplaySynchronizer: Index {} out of range ({} samples), not rendering",
                index,
                dataset.len()
            );
            return RenderReport::default();
        };

        let mut report = RenderReport {
            index: Some(index),
            ..Default::default()
        };

        for sink in &mut self.map_sinks {
            report.record(Surface::Map, sink.update_markers(&frame.markers));
        }
        for sink in &mut self.overlay_sinks {
            report.record(Surface::Overlay, sink.update_overlay(&frame.overlay));
        }
        for sink in &mut self.table_sinks {
            report.record(Surface::Table, sink.highlight_row(&frame.table));
        }
        for sink in &mut self.progress_sinks {
            report.record(Surface::Progress, sink.update_progress(&frame.progress));
        }

        log::trace!(
            "DisplaySynchronizer: Rendered index {} to {} sinks",
            index,
            report.delivered
        );
        report
    }
}

impl RenderReport {
    fn record(&mut self, surface: Surface, result: SinkResult) {
        match result {
            Ok(()) => self.delivered += 1,
            Err(e) => {
                log::warn!("DisplaySynchronizer: {} sink failed: {}", surface, e);
                self.failures.push((surface, e));
            }
        }
    }
}

impl std::fmt::Debug for DisplaySynchronizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DisplaySynchronizer")
            .field("offset", &self.offset)
            .field("window_secs", &self.window_secs)
            .field("bound", &self.bound.as_ref().map(|(d, _)| d.len()))
            .field("sinks", &self.sink_count())
            .finish()
    }
}
