//! Playback clock
//!
//! Converts irregular host frame ticks into a fixed logical advance rate.
//! Elapsed wall time (scaled by the speed multiplier) is accumulated and
//! drained in whole logical steps, so the animation rate is independent of
//! the host's refresh rate and catches up after a stalled frame by jumping
//! several samples at once.
//!
//! ## State machine
//!
//! ```text
//! Stopped ──play──▶ Playing ──pause──▶ Paused ──play──▶ Playing ...
//!    ▲                                                   │
//!    └──────────────────────reset───────────────────────┘
//! ```
//!
//! ## Cancellation
//!
//! Every time the tick loop is armed a new generation starts and a
//! [`TickToken`] for it is handed out. `pause`, `reset` and `reload` bump the
//! generation, so a tick the host scheduled earlier arrives with a stale
//! token and is ignored instead of mutating the cursor.

use serde::{Deserialize, Serialize};

use crate::config::PlaybackConfig;
use crate::error::{PlaybackError, PlaybackResult};

/// Slowest allowed speed multiplier
pub const MIN_SPEED: f64 = 1.0;

/// Fastest allowed speed multiplier
pub const MAX_SPEED: f64 = 10.0;

/// Fallback logical rate when the configured one is unusable
const FALLBACK_SAMPLES_PER_SECOND: f64 = 30.0;

/// Longest wall-time gap a single tick accounts for (one hour)
const MAX_FRAME_GAP_MS: f64 = 3_600_000.0;

/// What happens when playback advances past the last sample
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EndOfDataPolicy {
    /// Wrap around to the first sample and keep playing
    #[default]
    Loop,
    /// Stay on the last sample and stop playing
    Stop,
}

/// Transport state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlayState {
    #[default]
    Stopped,
    Playing,
    Paused,
}

/// The single source of truth for "where in time are we"
#[derive(Debug, Clone, PartialEq)]
pub struct PlaybackCursor {
    /// Current sample, `None` only when the dataset is empty
    pub index: Option<usize>,
    pub is_playing: bool,
    /// Always within `[MIN_SPEED, MAX_SPEED]`
    pub speed_multiplier: f64,
    /// Scaled wall time not yet converted into a logical step
    pub accumulated_ms: f64,
}

/// Handle for one armed tick loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickToken {
    generation: u64,
}

/// Result of one tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Token from a cancelled loop, nothing changed
    Stale,
    /// Baseline frame or not enough time accumulated for a step
    Idle,
    /// Index moved by `steps` logical steps
    Advanced {
        index: usize,
        steps: usize,
        wrapped: bool,
    },
    /// Ran past the last sample under [`EndOfDataPolicy::Stop`]
    Finished { index: usize },
}

impl TickOutcome {
    /// Whether the display has to be refreshed after this tick
    #[inline]
    pub fn needs_render(&self) -> bool {
        matches!(self, Self::Advanced { .. } | Self::Finished { .. })
    }
}

/// Frame-driven playback clock for a dataset of `len` samples
#[derive(Debug, Clone)]
pub struct PlaybackClock {
    cursor: PlaybackCursor,
    state: PlayState,
    len: usize,
    step_ms: f64,
    end_policy: EndOfDataPolicy,
    last_tick_ms: Option<f64>,
    generation: u64,
    armed: bool,
}

impl PlaybackClock {
    /// Create a stopped clock positioned on the first sample
    pub fn new(len: usize, config: &PlaybackConfig) -> Self {
        Self {
            cursor: PlaybackCursor {
                index: (len > 0).then_some(0),
                is_playing: false,
                speed_multiplier: clamp_speed(config.default_speed),
                accumulated_ms: 0.0,
            },
            state: PlayState::Stopped,
            len,
            step_ms: step_ms_for(config.samples_per_second),
            end_policy: config.end_policy,
            last_tick_ms: None,
            generation: 0,
            armed: false,
        }
    }

    #[inline]
    pub fn cursor(&self) -> &PlaybackCursor {
        &self.cursor
    }

    #[inline]
    pub fn index(&self) -> Option<usize> {
        self.cursor.index
    }

    #[inline]
    pub fn is_playing(&self) -> bool {
        self.cursor.is_playing
    }

    #[inline]
    pub fn state(&self) -> PlayState {
        self.state
    }

    #[inline]
    pub fn speed(&self) -> f64 {
        self.cursor.speed_multiplier
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Duration of one logical step at 1x, in milliseconds
    #[inline]
    pub fn step_ms(&self) -> f64 {
        self.step_ms
    }

    pub fn end_policy(&self) -> EndOfDataPolicy {
        self.end_policy
    }

    pub fn set_end_policy(&mut self, policy: EndOfDataPolicy) {
        self.end_policy = policy;
    }

    /// Change the logical advance rate (samples per second at 1x)
    pub fn set_samples_per_second(&mut self, rate: f64) {
        self.step_ms = step_ms_for(rate);
    }

    /// Token for the currently armed tick loop, if playing
    pub fn tick_token(&self) -> Option<TickToken> {
        self.armed.then_some(TickToken {
            generation: self.generation,
        })
    }

    /// Start playback and arm the tick loop
    ///
    /// No-op on an empty dataset (returns `None`) or when already playing
    /// (returns the existing token).
    pub fn play(&mut self) -> Option<TickToken> {
        if self.len == 0 {
            log::warn!("PlaybackClock: Cannot play, no samples loaded");
            return None;
        }
        if self.state == PlayState::Playing {
            return self.tick_token();
        }

        self.generation = self.generation.wrapping_add(1);
        self.armed = true;
        self.last_tick_ms = None;
        self.cursor.accumulated_ms = 0.0;
        self.state = PlayState::Playing;
        self.cursor.is_playing = true;
        log::debug!(
            "PlaybackClock: Playing from {:?} at {:.1}x (generation {})",
            self.cursor.index,
            self.cursor.speed_multiplier,
            self.generation
        );
        self.tick_token()
    }

    /// Stop advancing, keeping the current index
    pub fn pause(&mut self) {
        self.disarm();
        if self.state == PlayState::Playing {
            self.state = PlayState::Paused;
            log::debug!("PlaybackClock: Paused at {:?}", self.cursor.index);
        }
    }

    /// Play if paused/stopped, pause if playing
    pub fn toggle(&mut self) -> Option<TickToken> {
        if self.state == PlayState::Playing {
            self.pause();
            None
        } else {
            self.play()
        }
    }

    /// Stop and rewind to the first sample
    pub fn reset(&mut self) {
        self.disarm();
        self.state = PlayState::Stopped;
        self.cursor.index = (self.len > 0).then_some(0);
        self.cursor.accumulated_ms = 0.0;
        log::debug!("PlaybackClock: Reset");
    }

    /// Point the clock at a new dataset of `len` samples
    ///
    /// Cancels any armed loop and rewinds; speed and policy are kept.
    pub fn reload(&mut self, len: usize) {
        self.len = len;
        self.reset();
    }

    /// Set the speed multiplier, clamped to `[MIN_SPEED, MAX_SPEED]`
    ///
    /// Applies from the next tick. Returns the effective multiplier.
    pub fn set_speed(&mut self, multiplier: f64) -> f64 {
        self.cursor.speed_multiplier = clamp_speed(multiplier);
        self.cursor.speed_multiplier
    }

    /// Move the cursor to `index` without changing play state
    pub fn seek(&mut self, index: usize) -> PlaybackResult<usize> {
        if self.len == 0 {
            return Err(PlaybackError::EmptyDataset);
        }
        if index >= self.len {
            return Err(PlaybackError::IndexOutOfRange {
                index,
                len: self.len,
            });
        }
        self.cursor.index = Some(index);
        Ok(index)
    }

    /// Advance by the wall time elapsed since the previous tick
    ///
    /// `now_ms` is the host's monotonic frame time. The first tick after
    /// arming only records the baseline. A host clock that goes backwards
    /// counts as zero elapsed time; gaps longer than an hour count as one
    /// hour.
    pub fn tick(&mut self, token: TickToken, now_ms: f64) -> TickOutcome {
        if !self.armed || token.generation != self.generation {
            return TickOutcome::Stale;
        }
        let Some(index) = self.cursor.index else {
            return TickOutcome::Stale;
        };

        let Some(last) = self.last_tick_ms.replace(now_ms) else {
            return TickOutcome::Idle;
        };
        let delta = now_ms - last;
        let delta = if delta.is_finite() && delta > 0.0 {
            delta.min(MAX_FRAME_GAP_MS)
        } else {
            0.0
        };

        self.cursor.accumulated_ms += delta * self.cursor.speed_multiplier;

        let due = (self.cursor.accumulated_ms / self.step_ms).floor();
        if due < 1.0 {
            return TickOutcome::Idle;
        }
        self.cursor.accumulated_ms -= due * self.step_ms;
        let steps = due as usize;

        let last_index = self.len - 1;
        let remaining = last_index - index;
        if steps <= remaining {
            let index = index + steps;
            self.cursor.index = Some(index);
            return TickOutcome::Advanced {
                index,
                steps,
                wrapped: false,
            };
        }

        match self.end_policy {
            EndOfDataPolicy::Loop => {
                let index = (steps - remaining - 1) % self.len;
                self.cursor.index = Some(index);
                TickOutcome::Advanced {
                    index,
                    steps,
                    wrapped: true,
                }
            }
            EndOfDataPolicy::Stop => {
                self.cursor.index = Some(last_index);
                self.cursor.accumulated_ms = 0.0;
                self.disarm();
                self.state = PlayState::Paused;
                log::debug!("PlaybackClock: Reached end of data at {}", last_index);
                TickOutcome::Finished { index: last_index }
            }
        }
    }

    fn disarm(&mut self) {
        if self.armed {
            self.generation = self.generation.wrapping_add(1);
        }
        self.armed = false;
        self.last_tick_ms = None;
        self.cursor.is_playing = false;
    }
}

fn clamp_speed(multiplier: f64) -> f64 {
    if multiplier.is_nan() {
        MIN_SPEED
    } else {
        multiplier.clamp(MIN_SPEED, MAX_SPEED)
    }
}

fn step_ms_for(samples_per_second: f64) -> f64 {
    if samples_per_second.is_finite() && samples_per_second > 0.0 {
        1000.0 / samples_per_second
    } else {
        log::warn!(
            "PlaybackClock: Invalid samples_per_second {}, using {}",
            samples_per_second,
            FALLBACK_SAMPLES_PER_SECOND
        );
        1000.0 / FALLBACK_SAMPLES_PER_SECOND
    }
}
