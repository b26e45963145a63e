//! Observer surfaces
//!
//! Each surface is a pure "accept new value" contract. Hosts implement the
//! trait on their own type or pass a closure:
//!
//! ```ignore
//! display.add_progress_sink(|update: &ProgressUpdate| -> SinkResult {
//!     slider.set(update.fraction);
//!     Ok(())
//! });
//! ```

use std::fmt;

use thiserror::Error;

use super::payload::{MarkerUpdate, OverlayUpdate, ProgressUpdate, TableHighlight};

/// The four observer surfaces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Surface {
    Map,
    Overlay,
    Table,
    Progress,
}

impl fmt::Display for Surface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Surface::Map => "map",
            Surface::Overlay => "overlay",
            Surface::Table => "table",
            Surface::Progress => "progress",
        })
    }
}

/// A sink failed to apply an update
///
/// Only the failing sink is affected; the others still receive the update.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Display sink failed: {0}")]
pub struct SinkError(pub String);

impl SinkError {
    pub fn new(reason: impl Into<String>) -> Self {
        Self(reason.into())
    }
}

/// Result type for sink callbacks
pub type SinkResult = Result<(), SinkError>;

/// Map surface: moves the two track markers
pub trait MapSink {
    fn update_markers(&mut self, update: &MarkerUpdate) -> SinkResult;
}

/// Numeric overlay surface
pub trait OverlaySink {
    fn update_overlay(&mut self, update: &OverlayUpdate) -> SinkResult;
}

/// Data table surface: marks the current row
pub trait TableSink {
    fn highlight_row(&mut self, highlight: &TableHighlight) -> SinkResult;
}

/// Progress indicator surface: scrub handle and time label
pub trait ProgressSink {
    fn update_progress(&mut self, update: &ProgressUpdate) -> SinkResult;
}

impl<F> MapSink for F
where
    F: FnMut(&MarkerUpdate) -> SinkResult,
{
    fn update_markers(&mut self, update: &MarkerUpdate) -> SinkResult {
        self(update)
    }
}

impl<F> OverlaySink for F
where
    F: FnMut(&OverlayUpdate) -> SinkResult,
{
    fn update_overlay(&mut self, update: &OverlayUpdate) -> SinkResult {
        self(update)
    }
}

impl<F> TableSink for F
where
    F: FnMut(&TableHighlight) -> SinkResult,
{
    fn highlight_row(&mut self, highlight: &TableHighlight) -> SinkResult {
        self(highlight)
    }
}

impl<F> ProgressSink for F
where
    F: FnMut(&ProgressUpdate) -> SinkResult,
{
    fn update_progress(&mut self, update: &ProgressUpdate) -> SinkResult {
        self(update)
    }
}
