//! Scrub controller
//!
//! Interactive seeking along the progress indicator. A drag suspends
//! automatic advance, every position renders synchronously, and releasing
//! the handle restores the play state from before the drag:
//!
//! ```text
//! begin_scrub ──▶ scrub_to* ──▶ end_scrub
//!  (pause,          (seek +       (resume if it
//!   remember)        render)       was playing)
//! ```

use crate::clock::{PlaybackClock, TickToken};
use crate::dataset::Dataset;
use crate::display::DisplaySynchronizer;
use crate::error::{PlaybackError, PlaybackResult};

/// Map a fraction of the progress range to a sample index
///
/// `fraction` is clamped to `[0, 1]` and rounded to the nearest index.
pub fn fraction_to_index(fraction: f64, len: usize) -> PlaybackResult<usize> {
    if len == 0 {
        return Err(PlaybackError::EmptyDataset);
    }
    if !fraction.is_finite() {
        return Err(PlaybackError::InvalidFraction(fraction));
    }
    let last = (len - 1) as f64;
    Ok((fraction.clamp(0.0, 1.0) * last).round() as usize)
}

/// Tracks one scrub gesture
#[derive(Debug, Clone, Default)]
pub struct ScrubController {
    /// Play state captured at `begin_scrub`, `None` outside a gesture
    resume_after: Option<bool>,
}

impl ScrubController {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn is_scrubbing(&self) -> bool {
        self.resume_after.is_some()
    }

    /// Start a drag: remember whether playback was running and pause it
    ///
    /// A second `begin_scrub` without an `end_scrub` keeps the state from
    /// the first one, so a repeated press can't lose the resume intent.
    pub fn begin_scrub(&mut self, clock: &mut PlaybackClock) {
        if self.resume_after.is_none() {
            self.resume_after = Some(clock.is_playing());
            log::debug!(
                "ScrubController: Begin (was playing: {})",
                clock.is_playing()
            );
        }
        clock.pause();
    }

    /// Seek to `fraction` of the dataset and render immediately
    ///
    /// Works with or without a preceding `begin_scrub`. Returns the new
    /// index; on error nothing changes.
    pub fn scrub_to(
        &mut self,
        fraction: f64,
        clock: &mut PlaybackClock,
        display: &mut DisplaySynchronizer,
        dataset: &Dataset,
    ) -> PlaybackResult<usize> {
        let index = fraction_to_index(fraction, dataset.len())?;
        let index = clock.seek(index)?;
        display.render(dataset, Some(index));
        Ok(index)
    }

    /// Finish the drag, resuming playback if it was running at `begin_scrub`
    ///
    /// Returns the token of the re-armed tick loop. Without a preceding
    /// `begin_scrub` this does nothing.
    pub fn end_scrub(&mut self, clock: &mut PlaybackClock) -> Option<TickToken> {
        let was_playing = self.resume_after.take()?;
        log::debug!("ScrubController: End (resume: {})", was_playing);
        if was_playing {
            clock.play()
        } else {
            None
        }
    }

    /// Play state `end_scrub` will restore, `None` outside a gesture
    #[inline]
    pub fn resume_intent(&self) -> Option<bool> {
        self.resume_after
    }

    /// Change what `end_scrub` restores, e.g. play pressed mid-drag
    ///
    /// The clock stays paused until the gesture ends. Returns `false` (and
    /// does nothing) outside a gesture.
    pub fn set_resume(&mut self, resume: bool) -> bool {
        match self.resume_after.as_mut() {
            Some(intent) => {
                *intent = resume;
                log::debug!("ScrubController: Resume after scrub: {}", resume);
                true
            }
            None => false,
        }
    }

    /// Drop a gesture in progress without resuming, e.g. when the dataset
    /// is replaced mid-drag
    pub fn cancel(&mut self) {
        if self.resume_after.take().is_some() {
            log::debug!("ScrubController: Cancelled");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::{PlayState, TickOutcome};
    use crate::config::{DuotrackConfig, PlaybackConfig};
    use crate::display::{ProgressUpdate, SinkResult};
    use crate::types::Sample;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn dataset(len: usize) -> Dataset {
        Dataset::from_samples((0..len as i64).map(|i| Sample::empty(i * 100)).collect())
    }

    fn setup(len: usize) -> (Dataset, PlaybackClock, DisplaySynchronizer) {
        let dataset = dataset(len);
        let clock = PlaybackClock::new(len, &PlaybackConfig::default());
        let display = DisplaySynchronizer::new(&DuotrackConfig::default());
        (dataset, clock, display)
    }

    #[test]
    fn test_fraction_to_index() {
        assert_eq!(fraction_to_index(0.0, 11), Ok(0));
        assert_eq!(fraction_to_index(0.5, 11), Ok(5));
        assert_eq!(fraction_to_index(1.0, 11), Ok(10));
        assert_eq!(fraction_to_index(0.26, 11), Ok(3));
        assert_eq!(fraction_to_index(-0.5, 11), Ok(0));
        assert_eq!(fraction_to_index(1.5, 11), Ok(10));
        assert_eq!(fraction_to_index(0.7, 1), Ok(0));
        assert_eq!(fraction_to_index(0.5, 0), Err(PlaybackError::EmptyDataset));
        assert!(matches!(
            fraction_to_index(f64::NAN, 11),
            Err(PlaybackError::InvalidFraction(_))
        ));
    }

    #[test]
    fn test_scrub_while_playing_resumes() {
        let (dataset, mut clock, mut display) = setup(101);
        let mut scrub = ScrubController::new();
        let old_token = clock.play().unwrap();

        scrub.begin_scrub(&mut clock);
        assert!(scrub.is_scrubbing());
        assert!(!clock.is_playing());
        assert_eq!(clock.tick(old_token, 0.0), TickOutcome::Stale);

        assert_eq!(scrub.scrub_to(0.3, &mut clock, &mut display, &dataset), Ok(30));
        assert_eq!(scrub.scrub_to(0.5, &mut clock, &mut display, &dataset), Ok(50));
        assert_eq!(clock.index(), Some(50));

        let token = scrub.end_scrub(&mut clock);
        assert!(token.is_some());
        assert!(clock.is_playing());
        assert!(!scrub.is_scrubbing());
        assert_eq!(clock.index(), Some(50));
    }

    #[test]
    fn test_scrub_while_paused_stays_paused() {
        let (dataset, mut clock, mut display) = setup(101);
        let mut scrub = ScrubController::new();

        scrub.begin_scrub(&mut clock);
        scrub.scrub_to(1.0, &mut clock, &mut display, &dataset).unwrap();
        assert_eq!(scrub.end_scrub(&mut clock), None);
        assert_eq!(clock.state(), PlayState::Stopped);
        assert_eq!(clock.index(), Some(100));
    }

    #[test]
    fn test_repeated_begin_keeps_resume_intent() {
        let (_, mut clock, _) = setup(10);
        let mut scrub = ScrubController::new();
        clock.play();

        scrub.begin_scrub(&mut clock);
        scrub.begin_scrub(&mut clock);
        assert!(scrub.end_scrub(&mut clock).is_some());
        assert!(clock.is_playing());
    }

    #[test]
    fn test_end_without_begin_is_noop() {
        let (_, mut clock, _) = setup(10);
        let mut scrub = ScrubController::new();
        assert_eq!(scrub.end_scrub(&mut clock), None);
        assert_eq!(clock.state(), PlayState::Stopped);
    }

    #[test]
    fn test_scrub_renders_synchronously() {
        let (dataset, mut clock, mut display) = setup(5);
        let seen = Rc::new(RefCell::new(Vec::new()));
        let s = seen.clone();
        display.add_progress_sink(move |u: &ProgressUpdate| -> SinkResult {
            s.borrow_mut().push(u.index);
            Ok(())
        });
        let mut scrub = ScrubController::new();

        scrub.scrub_to(0.75, &mut clock, &mut display, &dataset).unwrap();
        assert_eq!(*seen.borrow(), vec![3]);
    }

    #[test]
    fn test_invalid_scrub_changes_nothing() {
        let (dataset, mut clock, mut display) = setup(5);
        let mut scrub = ScrubController::new();
        clock.seek(2).unwrap();

        assert!(scrub
            .scrub_to(f64::INFINITY, &mut clock, &mut display, &dataset)
            .is_err());
        assert_eq!(clock.index(), Some(2));

        let (empty, mut empty_clock, _) = setup(0);
        assert_eq!(
            scrub.scrub_to(0.5, &mut empty_clock, &mut display, &empty),
            Err(PlaybackError::EmptyDataset)
        );
    }

    #[test]
    fn test_resume_intent_can_change_mid_gesture() {
        let (_, mut clock, _) = setup(10);
        let mut scrub = ScrubController::new();
        assert!(!scrub.set_resume(true));
        assert_eq!(scrub.resume_intent(), None);

        scrub.begin_scrub(&mut clock);
        assert_eq!(scrub.resume_intent(), Some(false));
        assert!(scrub.set_resume(true));
        assert!(!clock.is_playing());

        assert!(scrub.end_scrub(&mut clock).is_some());
        assert!(clock.is_playing());
    }

    #[test]
    fn test_cancel_drops_gesture() {
        let (_, mut clock, _) = setup(10);
        let mut scrub = ScrubController::new();
        clock.play();
        scrub.begin_scrub(&mut clock);
        scrub.cancel();
        assert!(!scrub.is_scrubbing());
        assert_eq!(scrub.end_scrub(&mut clock), None);
        assert!(!clock.is_playing());
    }
}
