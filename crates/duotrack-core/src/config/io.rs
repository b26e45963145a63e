//! YAML configuration loading and saving
//!
//! Generic over the configuration type. [`read_config`] reports problems,
//! [`load_config`] logs them and carries on with defaults.

use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;

/// Read and parse a YAML config file
///
/// `Ok(None)` means there is nothing to load: the file is missing or holds
/// only whitespace.
pub fn read_config<T: DeserializeOwned>(path: &Path) -> Result<Option<T>> {
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e).with_context(|| format!("reading {}", path.display())),
    };
    if text.trim().is_empty() {
        return Ok(None);
    }
    serde_yaml::from_str(&text)
        .map(Some)
        .with_context(|| format!("parsing {}", path.display()))
}

/// Load configuration, falling back to `T::default()`
///
/// Never fails: read and parse errors are logged as warnings.
///
/// ```ignore
/// let config: DuotrackConfig = load_config(&default_config_path());
/// ```
pub fn load_config<T: DeserializeOwned + Default>(path: &Path) -> T {
    match read_config(path) {
        Ok(Some(config)) => {
            log::info!("Config: Loaded {}", path.display());
            config
        }
        Ok(None) => {
            log::info!("Config: Nothing at {}, using defaults", path.display());
            T::default()
        }
        Err(e) => {
            log::warn!("Config: {:#}, using defaults", e);
            T::default()
        }
    }
}

/// Write configuration as YAML, creating missing parent directories
pub fn save_config<T: Serialize>(config: &T, path: &Path) -> Result<()> {
    let yaml = serde_yaml::to_string(config).context("serializing config")?;
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
    }
    fs::write(path, yaml).with_context(|| format!("writing {}", path.display()))?;
    log::info!("Config: Saved {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::EndOfDataPolicy;
    use crate::config::DuotrackConfig;

    #[test]
    fn test_load_nonexistent_returns_default() {
        let config: DuotrackConfig = load_config(Path::new("/nonexistent/duotrack/config.yaml"));
        assert_eq!(config, DuotrackConfig::default());
    }

    #[test]
    fn test_invalid_yaml_returns_default() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, "playback: [this is: not a map").unwrap();

        let config: DuotrackConfig = load_config(&path);
        assert_eq!(config, DuotrackConfig::default());
    }

    #[test]
    fn test_roundtrip_in_nested_dir() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.yaml");

        let mut config = DuotrackConfig::default();
        config.playback.end_policy = EndOfDataPolicy::Stop;
        config.display.utc_offset_minutes = -300;

        save_config(&config, &path).unwrap();
        let loaded: DuotrackConfig = load_config(&path);
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_partial_yaml_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, "playback:\n  end_policy: stop\n").unwrap();

        let config: DuotrackConfig = load_config(&path);
        assert_eq!(config.playback.end_policy, EndOfDataPolicy::Stop);
        assert_eq!(config.playback.samples_per_second, 30.0);
        assert_eq!(config.statistics.window_secs, 10.0);
        assert_eq!(config.display.utc_offset_minutes, 540);
    }

    #[test]
    fn test_read_reports_what_load_hides() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.yaml");
        assert!(read_config::<DuotrackConfig>(&missing).unwrap().is_none());

        let blank = dir.path().join("blank.yaml");
        std::fs::write(&blank, "  \n").unwrap();
        assert!(read_config::<DuotrackConfig>(&blank).unwrap().is_none());
        assert_eq!(load_config::<DuotrackConfig>(&blank), DuotrackConfig::default());

        let broken = dir.path().join("broken.yaml");
        std::fs::write(&broken, "playback: [").unwrap();
        let err = read_config::<DuotrackConfig>(&broken).unwrap_err();
        assert!(format!("{:#}", err).contains("broken.yaml"));
    }
}
