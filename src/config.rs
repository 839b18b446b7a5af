//! Application configuration.
//!
//! The configuration is loaded from `$XDG_CONFIG_HOME/nextctl/config.json`.
//! The file is optional and so is every key in it; nextctl works without
//! one.
//!
//! # Example
//!
//! ```json
//! {
//!   "display": "wayland-1",
//!   "strict_exit": true
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Top-level configuration.
///
/// A minimal `{}` file is valid and all keys fall back to their defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Display socket name or absolute path.  When set, `WAYLAND_SOCKET`
    /// and `WAYLAND_DISPLAY` are not consulted.
    pub display: Option<String>,

    /// Exit with status `1` when the compositor reports a command failure.
    ///
    /// Off by default: historically a reported failure still exits `0`,
    /// and scripts may rely on that.
    pub strict_exit: bool,
}

impl Config {
    /// Load configuration from a JSON file at `path`.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError(format!("failed to read {}: {}", path.display(), e)))?;
        let config: Self = serde_json::from_str(&contents)
            .map_err(|e| ConfigError(format!("failed to parse {}: {}", path.display(), e)))?;
        Ok(config)
    }
}

/// Resolve the config directory (`$XDG_CONFIG_HOME/nextctl`).
pub fn config_dir() -> PathBuf {
    let base = std::env::var("XDG_CONFIG_HOME").unwrap_or_else(|_| {
        let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".into());
        format!("{}/.config", home)
    });
    PathBuf::from(base).join("nextctl")
}

/// Error from loading or parsing a configuration file.
#[derive(Debug, thiserror::Error)]
#[error("config error: {0}")]
pub struct ConfigError(String);
