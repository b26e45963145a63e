//! Command line parsing
//!
//! ```text
//! duotrack-replay <dataset.json> [--config PATH] [--speed N] [--policy loop|stop] [--realtime]
//! ```

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use duotrack_core::EndOfDataPolicy;

pub const USAGE: &str =
    "usage: duotrack-replay <dataset.json> [--config PATH] [--speed N] [--policy loop|stop] [--realtime]";

/// Parsed command line
#[derive(Debug, Clone, PartialEq)]
pub struct Args {
    pub dataset: PathBuf,
    /// Overrides the default config location
    pub config: Option<PathBuf>,
    /// Overrides `playback.default_speed`
    pub speed: Option<f64>,
    /// Overrides `playback.end_policy`
    pub policy: Option<EndOfDataPolicy>,
    /// Pace frames with a real timer instead of simulating them
    pub realtime: bool,
}

impl Args {
    /// Parse from an argument list without the program name
    pub fn parse<I>(args: I) -> Result<Self>
    where
        I: IntoIterator<Item = String>,
    {
        let mut args = args.into_iter();
        let mut dataset = None;
        let mut config = None;
        let mut speed = None;
        let mut policy = None;
        let mut realtime = false;

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--config" => {
                    let value = args.next().context("--config needs a path")?;
                    config = Some(PathBuf::from(value));
                }
                "--speed" => {
                    let value = args.next().context("--speed needs a value")?;
                    let parsed: f64 = value
                        .parse()
                        .with_context(|| format!("Invalid --speed value {:?}", value))?;
                    speed = Some(parsed);
                }
                "--policy" => {
                    let value = args.next().context("--policy needs loop or stop")?;
                    policy = Some(parse_policy(&value)?);
                }
                "--realtime" => realtime = true,
                flag if flag.starts_with("--") => bail!("Unknown flag {}\n{}", flag, USAGE),
                path => {
                    if dataset.is_some() {
                        bail!("Unexpected argument {}\n{}", path, USAGE);
                    }
                    dataset = Some(PathBuf::from(path));
                }
            }
        }

        let Some(dataset) = dataset else {
            bail!("Missing dataset path\n{}", USAGE);
        };

        Ok(Self {
            dataset,
            config,
            speed,
            policy,
            realtime,
        })
    }
}

fn parse_policy(value: &str) -> Result<EndOfDataPolicy> {
    match value.to_ascii_lowercase().as_str() {
        "loop" => Ok(EndOfDataPolicy::Loop),
        "stop" => Ok(EndOfDataPolicy::Stop),
        other => bail!("Unknown end-of-data policy {:?} (expected loop or stop)", other),
    }
}
