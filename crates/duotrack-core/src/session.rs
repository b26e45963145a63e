//! Playback session
//!
//! One [`Session`] per loaded dataset view. It owns the clock, the scrub
//! controller and the display synchronizer, and is the only place that
//! decides when the display is rendered:
//!
//! - after `load`, `reset`, `jump_to_index` and every `scrub_to`
//! - once per tick that moved the index, however many steps it skipped
//!
//! The host drives it from a single thread: it forwards user input (directly
//! or as [`PlaybackCommand`]s) and calls [`Session::tick`] once per frame
//! with the token it got from `play`.

use crate::clock::{PlayState, PlaybackClock, PlaybackCursor, TickOutcome, TickToken};
use crate::config::DuotrackConfig;
use crate::dataset::{Dataset, DatasetSummary};
use crate::display::{
    DisplayFrame, DisplaySynchronizer, MapSink, OverlaySink, ProgressSink, RenderReport,
    TableRow, TableSink,
};
use crate::error::PlaybackResult;
use crate::scrub::ScrubController;

/// User input as data
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PlaybackCommand {
    Play,
    Pause,
    Toggle,
    /// Stop and rewind to the first sample
    Reset,
    /// Speed multiplier, clamped to `[1, 10]`
    SetSpeed(f64),
    BeginScrub,
    /// Fraction of the progress range, `[0, 1]`
    ScrubTo(f64),
    EndScrub,
    /// Table row click
    JumpToIndex(usize),
}

/// A playback session over one dataset
#[derive(Debug)]
pub struct Session {
    config: DuotrackConfig,
    dataset: Dataset,
    clock: PlaybackClock,
    scrub: ScrubController,
    display: DisplaySynchronizer,
}

impl Session {
    /// Create a session with no data loaded
    pub fn new(config: DuotrackConfig) -> Self {
        let clock = PlaybackClock::new(0, &config.playback);
        let display = DisplaySynchronizer::new(&config);
        Self {
            config,
            dataset: Dataset::empty(),
            clock,
            scrub: ScrubController::new(),
            display,
        }
    }

    // ─────────────────────────────────────────────────────────────
    // Sink registration
    // ─────────────────────────────────────────────────────────────

    pub fn add_map_sink(&mut self, sink: impl MapSink + 'static) {
        self.display.add_map_sink(sink);
    }

    pub fn add_overlay_sink(&mut self, sink: impl OverlaySink + 'static) {
        self.display.add_overlay_sink(sink);
    }

    pub fn add_table_sink(&mut self, sink: impl TableSink + 'static) {
        self.display.add_table_sink(sink);
    }

    pub fn add_progress_sink(&mut self, sink: impl ProgressSink + 'static) {
        self.display.add_progress_sink(sink);
    }

    // ─────────────────────────────────────────────────────────────
    // Data
    // ─────────────────────────────────────────────────────────────

    /// Replace the dataset, rewind, and render the first sample
    ///
    /// Any running tick loop is cancelled and a scrub in progress is
    /// dropped. Speed and end-of-data policy carry over.
    pub fn load(&mut self, dataset: Dataset) -> RenderReport {
        self.scrub.cancel();
        self.clock.reload(dataset.len());
        self.display.bind(&dataset);
        self.dataset = dataset;
        log::info!(
            "Session: Loaded dataset with {} samples",
            self.dataset.len()
        );
        self.render_current()
    }

    #[inline]
    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    #[inline]
    pub fn config(&self) -> &DuotrackConfig {
        &self.config
    }

    /// Summary statistics of the loaded dataset
    pub fn summary(&self) -> DatasetSummary {
        DatasetSummary::compute(&self.dataset)
    }

    /// Rows for the data table
    pub fn table_rows(&self) -> Vec<TableRow> {
        self.display.table_rows(&self.dataset)
    }

    // ─────────────────────────────────────────────────────────────
    // State
    // ─────────────────────────────────────────────────────────────

    #[inline]
    pub fn clock(&self) -> &PlaybackClock {
        &self.clock
    }

    #[inline]
    pub fn cursor(&self) -> &PlaybackCursor {
        self.clock.cursor()
    }

    #[inline]
    pub fn index(&self) -> Option<usize> {
        self.clock.index()
    }

    #[inline]
    pub fn is_playing(&self) -> bool {
        self.clock.is_playing()
    }

    #[inline]
    pub fn state(&self) -> PlayState {
        self.clock.state()
    }

    #[inline]
    pub fn speed(&self) -> f64 {
        self.clock.speed()
    }

    #[inline]
    pub fn is_scrubbing(&self) -> bool {
        self.scrub.is_scrubbing()
    }

    /// Display payload for the current index
    pub fn current_frame(&self) -> Option<DisplayFrame> {
        self.display.frame(&self.dataset, self.clock.index()?)
    }

    // ─────────────────────────────────────────────────────────────
    // Transport
    // ─────────────────────────────────────────────────────────────

    /// Start playback; the returned token drives [`Session::tick`]
    ///
    /// During a scrub the clock stays paused and playback starts at
    /// `end_scrub` instead; this returns `None` then.
    pub fn play(&mut self) -> Option<TickToken> {
        if self.scrub.set_resume(true) {
            return None;
        }
        self.clock.play()
    }

    /// Pause playback, or cancel the resume at `end_scrub` during a scrub
    pub fn pause(&mut self) {
        if self.scrub.set_resume(false) {
            return;
        }
        self.clock.pause();
    }

    pub fn toggle(&mut self) -> Option<TickToken> {
        if let Some(resume) = self.scrub.resume_intent() {
            self.scrub.set_resume(!resume);
            return None;
        }
        self.clock.toggle()
    }

    /// Stop, rewind to the first sample and render it
    pub fn reset(&mut self) -> RenderReport {
        self.scrub.cancel();
        self.clock.reset();
        self.render_current()
    }

    /// Set the speed multiplier, returns the clamped value
    pub fn set_speed(&mut self, multiplier: f64) -> f64 {
        let speed = self.clock.set_speed(multiplier);
        log::debug!("Session: Speed {:.1}x (requested {})", speed, multiplier);
        speed
    }

    /// Move to `index` and render it, keeping the play state
    pub fn jump_to_index(&mut self, index: usize) -> PlaybackResult<usize> {
        match self.clock.seek(index) {
            Ok(index) => {
                self.display.render(&self.dataset, Some(index));
                Ok(index)
            }
            Err(e) => {
                log::warn!("Session: Jump to {} rejected: {}", index, e);
                Err(e)
            }
        }
    }

    // ─────────────────────────────────────────────────────────────
    // Scrubbing
    // ─────────────────────────────────────────────────────────────

    pub fn begin_scrub(&mut self) {
        self.scrub.begin_scrub(&mut self.clock);
    }

    /// Seek to `fraction` of the dataset and render synchronously
    pub fn scrub_to(&mut self, fraction: f64) -> PlaybackResult<usize> {
        self.scrub
            .scrub_to(fraction, &mut self.clock, &mut self.display, &self.dataset)
            .inspect_err(|e| log::warn!("Session: Scrub to {} rejected: {}", fraction, e))
    }

    pub fn end_scrub(&mut self) -> Option<TickToken> {
        self.scrub.end_scrub(&mut self.clock)
    }

    // ─────────────────────────────────────────────────────────────
    // Frame loop
    // ─────────────────────────────────────────────────────────────

    /// Advance the clock for a host frame at `now_ms`
    ///
    /// Renders at most once, and only when the index moved.
    pub fn tick(&mut self, token: TickToken, now_ms: f64) -> TickOutcome {
        let outcome = self.clock.tick(token, now_ms);
        if outcome.needs_render() {
            self.render_current();
        }
        outcome
    }

    /// Tick with the currently armed token, `Stale` when not playing
    pub fn on_frame(&mut self, now_ms: f64) -> TickOutcome {
        match self.clock.tick_token() {
            Some(token) => self.tick(token, now_ms),
            None => TickOutcome::Stale,
        }
    }

    /// Render the current index again
    pub fn render_current(&mut self) -> RenderReport {
        self.display.render(&self.dataset, self.clock.index())
    }

    /// Apply one user command
    ///
    /// Returns the tick token when the command (re)armed playback.
    pub fn apply(&mut self, command: PlaybackCommand) -> PlaybackResult<Option<TickToken>> {
        log::debug!("Session: Command {:?}", command);
        match command {
            PlaybackCommand::Play => return Ok(self.play()),
            PlaybackCommand::Pause => self.pause(),
            PlaybackCommand::Toggle => return Ok(self.toggle()),
            PlaybackCommand::Reset => {
                self.reset();
            }
            PlaybackCommand::SetSpeed(multiplier) => {
                self.set_speed(multiplier);
            }
            PlaybackCommand::BeginScrub => self.begin_scrub(),
            PlaybackCommand::ScrubTo(fraction) => {
                self.scrub_to(fraction)?;
            }
            PlaybackCommand::EndScrub => return Ok(self.end_scrub()),
            PlaybackCommand::JumpToIndex(index) => {
                self.jump_to_index(index)?;
            }
        }
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::EndOfDataPolicy;
    use crate::display::{OverlayUpdate, ProgressUpdate, SinkResult};
    use crate::error::PlaybackError;
    use crate::types::{Sample, TrackPoint};
    use std::cell::RefCell;
    use std::rc::Rc;

    fn track_a_only(len: usize) -> Dataset {
        Dataset::from_samples(
            (0..len)
                .map(|i| Sample {
                    track_a: Some(TrackPoint {
                        altitude: Some(500.0),
                        vertical_speed: Some(2.0),
                        ..Default::default()
                    }),
                    ..Sample::empty(i as i64 * 100)
                })
                .collect(),
        )
    }

    fn session_with(len: usize, rate: f64, policy: EndOfDataPolicy) -> Session {
        let mut config = DuotrackConfig::default();
        config.playback.samples_per_second = rate;
        config.playback.end_policy = policy;
        let mut session = Session::new(config);
        session.load(track_a_only(len));
        session
    }

    fn record_progress(session: &mut Session) -> Rc<RefCell<Vec<usize>>> {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let s = seen.clone();
        session.add_progress_sink(move |u: &ProgressUpdate| -> SinkResult {
            s.borrow_mut().push(u.index);
            Ok(())
        });
        seen
    }

    #[test]
    fn test_one_second_of_ticks_at_rate_ten() {
        let mut session = session_with(100, 10.0, EndOfDataPolicy::Loop);
        let token = session.play().unwrap();

        // 40 Hz host frames over one second
        session.tick(token, 0.0);
        for frame in 1..=40 {
            session.tick(token, frame as f64 * 25.0);
        }
        assert_eq!(session.index(), Some(10));
    }

    #[test]
    fn test_one_render_per_tick_regardless_of_steps() {
        let mut session = session_with(100, 10.0, EndOfDataPolicy::Loop);
        let seen = record_progress(&mut session);
        let token = session.play().unwrap();

        session.tick(token, 0.0);
        // Stalled host: 500 ms at once is five steps
        let outcome = session.tick(token, 500.0);
        assert_eq!(
            outcome,
            TickOutcome::Advanced {
                index: 5,
                steps: 5,
                wrapped: false
            }
        );
        // Not enough for another step
        session.tick(token, 550.0);
        assert_eq!(*seen.borrow(), vec![5]);
    }

    #[test]
    fn test_reset_rewinds_and_stops() {
        let mut session = session_with(50, 10.0, EndOfDataPolicy::Loop);
        session.jump_to_index(30).unwrap();
        session.play();
        session.reset();
        assert_eq!(session.index(), Some(0));
        assert!(!session.is_playing());
        assert_eq!(session.state(), PlayState::Stopped);
    }

    #[test]
    fn test_speed_is_clamped() {
        let mut session = session_with(10, 10.0, EndOfDataPolicy::Loop);
        assert_eq!(session.set_speed(-5.0), 1.0);
        assert_eq!(session.set_speed(99.0), 10.0);
        assert_eq!(session.set_speed(f64::NAN), 1.0);
        assert_eq!(session.set_speed(3.0), 3.0);
        assert_eq!(session.speed(), 3.0);
    }

    #[test]
    fn test_end_of_data_loop() {
        let mut session = session_with(20, 10.0, EndOfDataPolicy::Loop);
        let token = session.play().unwrap();
        session.jump_to_index(19).unwrap();

        session.tick(token, 0.0);
        let outcome = session.tick(token, 100.0);
        assert_eq!(session.index(), Some(0));
        assert!(matches!(outcome, TickOutcome::Advanced { wrapped: true, .. }));
        assert!(session.is_playing());
    }

    #[test]
    fn test_end_of_data_stop() {
        let mut session = session_with(20, 10.0, EndOfDataPolicy::Stop);
        let token = session.play().unwrap();
        session.jump_to_index(19).unwrap();

        session.tick(token, 0.0);
        assert_eq!(
            session.tick(token, 100.0),
            TickOutcome::Finished { index: 19 }
        );
        assert_eq!(session.index(), Some(19));
        assert!(!session.is_playing());
        assert_eq!(session.on_frame(200.0), TickOutcome::Stale);
    }

    #[test]
    fn test_scrub_preserves_intent() {
        let mut session = session_with(101, 10.0, EndOfDataPolicy::Loop);

        session.play();
        session.begin_scrub();
        session.scrub_to(0.4).unwrap();
        assert!(session.end_scrub().is_some());
        assert!(session.is_playing());
        assert_eq!(session.index(), Some(40));

        session.pause();
        session.begin_scrub();
        session.scrub_to(0.6).unwrap();
        assert!(session.end_scrub().is_none());
        assert!(!session.is_playing());
        assert_eq!(session.index(), Some(60));
    }

    #[test]
    fn test_play_during_scrub_defers_to_end_scrub() {
        let mut session = session_with(101, 10.0, EndOfDataPolicy::Loop);
        session.begin_scrub();
        session.scrub_to(0.5).unwrap();

        assert_eq!(session.play(), None);
        assert!(!session.is_playing());
        assert_eq!(session.on_frame(0.0), TickOutcome::Stale);
        assert_eq!(session.on_frame(1000.0), TickOutcome::Stale);
        assert_eq!(session.index(), Some(50));

        session.scrub_to(0.7).unwrap();
        let token = session.end_scrub().unwrap();
        assert!(session.is_playing());
        assert_eq!(session.index(), Some(70));
        session.tick(token, 0.0);
        session.tick(token, 100.0);
        assert_eq!(session.index(), Some(71));
    }

    #[test]
    fn test_toggle_and_pause_during_scrub_change_intent() {
        let mut session = session_with(20, 10.0, EndOfDataPolicy::Loop);
        session.play();
        session.begin_scrub();

        session.pause();
        assert_eq!(session.apply(PlaybackCommand::Toggle), Ok(None));
        assert!(!session.is_playing());
        session.apply(PlaybackCommand::Toggle).unwrap();
        assert!(session.end_scrub().is_none());
        assert!(!session.is_playing());

        session.begin_scrub();
        assert_eq!(session.apply(PlaybackCommand::Play), Ok(None));
        assert!(!session.is_playing());
        assert!(session.end_scrub().is_some());
        assert!(session.is_playing());
    }

    #[test]
    fn test_track_b_absent_gives_no_averages() {
        let mut session = Session::new(DuotrackConfig::default());
        let overlays = Rc::new(RefCell::new(Vec::new()));
        let o = overlays.clone();
        session.add_overlay_sink(move |u: &OverlayUpdate| -> SinkResult {
            o.borrow_mut().push(u.clone());
            Ok(())
        });
        session.load(track_a_only(30));
        for index in 0..30 {
            session.jump_to_index(index).unwrap();
        }

        let overlays = overlays.borrow();
        assert_eq!(overlays.len(), 31);
        assert!(overlays.iter().all(|o| o.track_b.avg_vertical_speed.is_none()));
        assert!(overlays.iter().all(|o| o.track_a.avg_vertical_speed == Some(2.0)));
        assert!(session
            .table_rows()
            .iter()
            .all(|r| r.avg_vertical_speed_b.is_none()));
    }

    #[test]
    fn test_empty_session_is_inert() {
        let mut session = Session::new(DuotrackConfig::default());
        let seen = record_progress(&mut session);

        assert!(!session.load(Dataset::empty()).rendered());
        assert_eq!(session.play(), None);
        assert!(!session.is_playing());
        assert_eq!(session.index(), None);
        assert_eq!(session.jump_to_index(0), Err(PlaybackError::EmptyDataset));
        assert_eq!(session.scrub_to(0.5), Err(PlaybackError::EmptyDataset));
        assert!(!session.reset().rendered());
        assert_eq!(session.on_frame(16.0), TickOutcome::Stale);
        assert!(seen.borrow().is_empty());
    }

    #[test]
    fn test_out_of_range_jump_is_rejected() {
        let mut session = session_with(10, 10.0, EndOfDataPolicy::Loop);
        session.jump_to_index(4).unwrap();
        assert_eq!(
            session.jump_to_index(10),
            Err(PlaybackError::IndexOutOfRange { index: 10, len: 10 })
        );
        assert_eq!(session.index(), Some(4));
    }

    #[test]
    fn test_load_cancels_running_loop() {
        let mut session = session_with(10, 10.0, EndOfDataPolicy::Loop);
        let token = session.play().unwrap();
        session.tick(token, 0.0);

        session.load(track_a_only(5));
        assert_eq!(session.tick(token, 1000.0), TickOutcome::Stale);
        assert_eq!(session.index(), Some(0));
        assert!(!session.is_playing());
    }

    #[test]
    fn test_load_renders_first_sample() {
        let mut session = Session::new(DuotrackConfig::default());
        let seen = record_progress(&mut session);
        let report = session.load(track_a_only(3));
        assert_eq!(report.index, Some(0));
        assert_eq!(*seen.borrow(), vec![0]);
        assert_eq!(session.summary().count, 3);
    }

    #[test]
    fn test_apply_commands() {
        let mut session = session_with(11, 10.0, EndOfDataPolicy::Loop);

        assert!(session.apply(PlaybackCommand::Play).unwrap().is_some());
        assert!(session.is_playing());
        session.apply(PlaybackCommand::Toggle).unwrap();
        assert!(!session.is_playing());
        session.apply(PlaybackCommand::SetSpeed(4.0)).unwrap();
        assert_eq!(session.speed(), 4.0);
        session.apply(PlaybackCommand::JumpToIndex(7)).unwrap();
        assert_eq!(session.index(), Some(7));
        session.apply(PlaybackCommand::BeginScrub).unwrap();
        session.apply(PlaybackCommand::ScrubTo(0.2)).unwrap();
        assert_eq!(session.apply(PlaybackCommand::EndScrub), Ok(None));
        assert_eq!(session.index(), Some(2));
        assert!(session.apply(PlaybackCommand::ScrubTo(f64::NAN)).is_err());
        session.apply(PlaybackCommand::Reset).unwrap();
        assert_eq!(session.index(), Some(0));
    }

    #[test]
    fn test_index_stays_in_range() {
        let len = 17;
        let mut session = session_with(len, 30.0, EndOfDataPolicy::Loop);
        let commands = [
            PlaybackCommand::Play,
            PlaybackCommand::SetSpeed(10.0),
            PlaybackCommand::JumpToIndex(16),
            PlaybackCommand::JumpToIndex(40),
            PlaybackCommand::BeginScrub,
            PlaybackCommand::ScrubTo(2.0),
            PlaybackCommand::ScrubTo(-1.0),
            PlaybackCommand::EndScrub,
            PlaybackCommand::Toggle,
            PlaybackCommand::Toggle,
            PlaybackCommand::Reset,
            PlaybackCommand::Play,
        ];

        let mut now = 0.0;
        for (i, command) in commands.iter().cycle().take(120).enumerate() {
            let _ = session.apply(*command);
            now += 37.0 * (i % 5) as f64;
            session.on_frame(now);
            let index = session.index().unwrap();
            assert!(index < len, "index {} out of range after {:?}", index, command);
        }
    }
}
