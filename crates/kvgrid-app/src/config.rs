//! Configuration file parsing for kvgrid
//!
//! Settings load from `~/.config/kvgrid/config.toml`; CLI flags override file
//! values, and built-in defaults cover everything else.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use kvgrid_core::prelude::*;

const CONFIG_FILENAME: &str = "config.toml";
const CONFIG_DIR: &str = "kvgrid";

fn default_store_url() -> String {
    "ws://localhost:8001".to_string()
}

fn default_tick_rate_ms() -> u64 {
    50
}

/// User-tunable settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Settings {
    /// WebSocket URL of the store bridge.
    pub store_url: String,
    /// Terminal event poll timeout in milliseconds (also the animation tick).
    pub tick_rate_ms: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            store_url: default_store_url(),
            tick_rate_ms: default_tick_rate_ms(),
        }
    }
}

/// Path of the user config file, if a config directory exists for this
/// platform.
pub fn config_file_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join(CONFIG_DIR).join(CONFIG_FILENAME))
}

/// Load settings from the default location, falling back to defaults when the
/// file does not exist.
///
/// # Errors
///
/// Returns [`Error::Config`] when the file exists but cannot be read or
/// parsed - a broken config should be fixed, not silently ignored.
pub fn load_settings() -> Result<Settings> {
    match config_file_path() {
        Some(path) if path.exists() => load_settings_from(&path),
        _ => Ok(Settings::default()),
    }
}

/// Load settings from a specific file.
pub fn load_settings_from(path: &Path) -> Result<Settings> {
    let contents = std::fs::read_to_string(path)
        .map_err(|e| Error::config(format!("cannot read {}: {e}", path.display())))?;
    toml::from_str(&contents)
        .map_err(|e| Error::config(format!("cannot parse {}: {e}", path.display())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_when_file_missing() {
        let settings = Settings::default();
        assert_eq!(settings.store_url, "ws://localhost:8001");
        assert_eq!(settings.tick_rate_ms, 50);
    }

    #[test]
    fn load_partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, r#"store_url = "ws://example:9001""#).unwrap();

        let settings = load_settings_from(&path).unwrap();
        assert_eq!(settings.store_url, "ws://example:9001");
        assert_eq!(settings.tick_rate_ms, 50);
    }

    #[test]
    fn malformed_file_is_a_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "store_url = [not toml").unwrap();

        let err = load_settings_from(&path).unwrap_err();
        assert!(matches!(err, Error::Config { .. }));
    }
}
