//! Duotrack Replay - headless host for dual-track playback
//!
//! Loads a dataset, plays it through a [`Session`] with console sinks and
//! exits when playback reaches the end (or has wrapped once under the loop
//! policy).
//!
//! ## Command line flags
//!
//! - `--config PATH`: config file (default: `<config dir>/duotrack/config.yaml`)
//! - `--speed N`: initial speed multiplier, clamped to 1..10
//! - `--policy loop|stop`: end-of-data behaviour
//! - `--realtime`: pace frames with a timer instead of simulating them

mod args;
mod sinks;

use std::time::Duration;

use anyhow::{Context, Result};
use duotrack_core::config::{default_config_path, load_config, DuotrackConfig};
use duotrack_core::display::format_speed;
use duotrack_core::{load_dataset, Session, TickOutcome, TickToken};

use args::Args;

/// Host frame interval in milliseconds
const FRAME_INTERVAL_MS: u64 = 33;

/// Upper bound on simulated frames, in case the dataset never finishes
const MAX_SIMULATED_FRAMES: u64 = 10_000_000;

fn main() -> Result<()> {
    // Initialize logger - set RUST_LOG=debug for verbose output
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();

    let args = Args::parse(std::env::args().skip(1))?;
    log::info!("duotrack-replay starting up");

    let config_path = args.config.clone().unwrap_or_else(default_config_path);
    let mut config: DuotrackConfig = load_config(&config_path);
    if let Some(speed) = args.speed {
        config.playback.default_speed = speed;
    }
    if let Some(policy) = args.policy {
        config.playback.end_policy = policy;
    }

    let dataset = load_dataset(&args.dataset)
        .with_context(|| format!("Failed to load dataset {:?}", args.dataset))?;

    let mut session = Session::new(config);
    sinks::attach(&mut session);
    session.load(dataset);

    let summary = session.summary();
    log::info!(
        "Dataset: {} samples, {} to {} ({:.1}s)",
        summary.count,
        summary.start_time.as_deref().unwrap_or("-"),
        summary.end_time.as_deref().unwrap_or("-"),
        summary.duration_ms as f64 / 1000.0
    );
    if let Some(max) = summary.max_distance_3d {
        log::info!("Max 3D distance between tracks: {:.1} m", max);
    }

    let Some(token) = session.play() else {
        println!("Nothing to replay.");
        return Ok(());
    };
    println!(
        "Replaying at {} ({:?} at end of data)",
        format_speed(session.speed()),
        session.clock().end_policy()
    );

    let frames = if args.realtime {
        run_realtime(&mut session, token)?
    } else {
        run_simulated(&mut session, token)
    };

    log::info!("Replay finished after {} frames", frames);
    Ok(())
}

/// Whether the replay should stop after this tick
fn is_done(outcome: TickOutcome) -> bool {
    matches!(
        outcome,
        TickOutcome::Stale | TickOutcome::Finished { .. } | TickOutcome::Advanced { wrapped: true, .. }
    )
}

/// Drive the session with evenly spaced synthetic frame times
fn run_simulated(session: &mut Session, token: TickToken) -> u64 {
    for frame in 0..MAX_SIMULATED_FRAMES {
        let now_ms = (frame * FRAME_INTERVAL_MS) as f64;
        if is_done(session.tick(token, now_ms)) {
            return frame + 1;
        }
    }
    log::warn!("Stopped after {} simulated frames", MAX_SIMULATED_FRAMES);
    MAX_SIMULATED_FRAMES
}

/// Drive the session from a timer on a single-threaded tokio runtime
fn run_realtime(session: &mut Session, token: TickToken) -> Result<u64> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()
        .context("Failed to build tokio runtime")?;

    let frames = runtime.block_on(async {
        let start = tokio::time::Instant::now();
        let mut interval = tokio::time::interval(Duration::from_millis(FRAME_INTERVAL_MS));
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        let mut frames = 0u64;
        loop {
            let instant = interval.tick().await;
            frames += 1;
            let now_ms = instant.duration_since(start).as_secs_f64() * 1000.0;
            if is_done(session.tick(token, now_ms)) {
                break frames;
            }
        }
    });
    Ok(frames)
}

#[cfg(test)]
mod tests {
    use super::*;
    use duotrack_core::{Dataset, EndOfDataPolicy, Sample};

    fn session(len: usize, policy: EndOfDataPolicy) -> Session {
        let mut config = DuotrackConfig::default();
        config.playback.end_policy = policy;
        let mut session = Session::new(config);
        session.load(Dataset::from_samples(
            (0..len as i64).map(|i| Sample::empty(i * 100)).collect(),
        ));
        session
    }

    #[test]
    fn test_simulated_replay_stops_at_end() {
        let mut session = session(30, EndOfDataPolicy::Stop);
        let token = session.play().unwrap();
        let frames = run_simulated(&mut session, token);
        assert!(frames > 1);
        assert_eq!(session.index(), Some(29));
        assert!(!session.is_playing());
    }

    #[test]
    fn test_simulated_replay_stops_after_wrap() {
        let mut session = session(30, EndOfDataPolicy::Loop);
        let token = session.play().unwrap();
        run_simulated(&mut session, token);
        assert!(session.is_playing());
        assert!(session.index().unwrap() < 5);
    }
}
