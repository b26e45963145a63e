//! Standard config file locations

use std::path::PathBuf;

/// Config file name inside the duotrack config directory
pub const CONFIG_FILENAME: &str = "config.yaml";

/// Get the duotrack config directory
///
/// Returns: `<platform config dir>/duotrack`, or `./duotrack` when the
/// platform has no config directory.
pub fn default_config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("duotrack")
}

/// Get the default config file path
pub fn default_config_path() -> PathBuf {
    default_config_dir().join(CONFIG_FILENAME)
}
