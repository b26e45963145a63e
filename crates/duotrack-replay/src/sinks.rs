//! Console surfaces for headless replay
//!
//! Stand-ins for the map, overlay, table and progress widgets of a GUI host.
//! Per-frame detail goes to the `debug` log; the progress line is printed
//! each time playback crosses another tenth of the dataset.

use duotrack_core::display::{
    MarkerUpdate, OverlayUpdate, ProgressUpdate, SinkResult, TableHighlight, TableHighlighter,
};
use duotrack_core::{Session, TrackId};

/// Register all four console sinks on `session`
pub fn attach(session: &mut Session) {
    session.add_map_sink(|update: &MarkerUpdate| -> SinkResult {
        for track in TrackId::ALL {
            if let Some(pos) = update.position(track) {
                log::debug!(
                    "map: {} at {:.6}, {:.6}",
                    track.name(),
                    pos.lat,
                    pos.lon
                );
            }
        }
        Ok(())
    });

    session.add_overlay_sink(|update: &OverlayUpdate| -> SinkResult {
        if log::log_enabled!(log::Level::Debug) {
            let line = update
                .fields()
                .iter()
                .map(|f| format!("{}={}", f.key, f.formatted()))
                .collect::<Vec<_>>()
                .join(" ");
            log::debug!("overlay[{}]: {}", update.index, line);
        }
        Ok(())
    });

    let mut highlighter = TableHighlighter::new();
    session.add_table_sink(move |highlight: &TableHighlight| -> SinkResult {
        let change = highlighter.apply(highlight);
        if let Some(previous) = change.clear {
            log::trace!("table: unmark row {}", previous);
        }
        log::trace!("table: mark row {}", change.set);
        Ok(())
    });

    let mut last_decile = None;
    session.add_progress_sink(move |update: &ProgressUpdate| -> SinkResult {
        let decile = (update.fraction * 10.0).floor() as u32;
        if last_decile != Some(decile) {
            last_decile = Some(decile);
            println!(
                "[{}] {:>5.1}%  {} / {}  (row {})",
                update.time_label,
                update.fraction * 100.0,
                update.start_label,
                update.end_label,
                update.index
            );
        }
        Ok(())
    });
}
