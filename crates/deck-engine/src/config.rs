//! Configuration management for deck.
//!
//! Loads configuration from ${DECK_HOME}/config.toml with sensible defaults.

use std::fs;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::navigation::FontScale;

/// Returns the default config template with comments.
///
/// This is embedded from default_config.toml at compile time.
/// To update, edit default_config.toml directly.
fn default_config_template() -> &'static str {
    include_str!("../default_config.toml")
}

pub mod paths {
    //! Path resolution for deck configuration and data directories.
    //!
    //! DECK_HOME resolution order:
    //! 1. DECK_HOME environment variable (if set)
    //! 2. ~/.config/deck (default)

    use std::path::PathBuf;

    /// Returns the deck home directory.
    ///
    /// Checks DECK_HOME env var first, falls back to ~/.config/deck
    pub fn deck_home() -> PathBuf {
        if let Ok(home) = std::env::var("DECK_HOME") {
            return PathBuf::from(home);
        }

        dirs::home_dir()
            .map(|h| h.join(".config").join("deck"))
            .expect("Could not determine home directory")
    }

    /// Returns the path to the config.toml file.
    pub fn config_path() -> PathBuf {
        deck_home().join("config.toml")
    }

    /// Returns the path to the logs directory.
    pub fn logs_dir() -> PathBuf {
        deck_home().join("logs")
    }
}

/// Playback timing configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaybackConfig {
    /// Floor for the delay between auto-played steps, in milliseconds.
    pub min_step_delay_ms: u64,
    /// Speed multiplier applied to step delays at startup.
    pub default_speed: f64,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            min_step_delay_ms: Config::DEFAULT_MIN_STEP_DELAY_MS,
            default_speed: 1.0,
        }
    }
}

impl PlaybackConfig {
    pub fn min_step_delay(&self) -> Duration {
        Duration::from_millis(self.min_step_delay_ms)
    }
}

/// UI configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    /// Initial text scale.
    pub font_scale: FontScale,
}

/// Main configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Playback timing.
    #[serde(default)]
    pub playback: PlaybackConfig,

    /// UI settings.
    #[serde(default)]
    pub ui: UiConfig,
}

impl Config {
    const DEFAULT_MIN_STEP_DELAY_MS: u64 = 16;

    /// Loads configuration from the default config path.
    pub fn load() -> Result<Self> {
        Self::load_from(&paths::config_path())
    }

    /// Loads configuration from a specific path.
    /// Returns defaults if file doesn't exist.
    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let contents = fs::read_to_string(path)
                .with_context(|| format!("Failed to read config from {}", path.display()))?;
            toml::from_str(&contents)
                .with_context(|| format!("Failed to parse config from {}", path.display()))
        } else {
            Ok(Config::default())
        }
    }

    /// Creates a default config file at the given path.
    /// Returns an error if the file already exists.
    pub fn init(path: &Path) -> Result<()> {
        if path.exists() {
            anyhow::bail!("Config file already exists at {}", path.display());
        }

        Self::write_config(path, default_config_template())
    }

    /// Writes config content to a file, creating parent directories as needed.
    /// Uses atomic write (temp file + rename) to prevent corruption.
    fn write_config(path: &Path, content: &str) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }

        let tmp_path = path.with_extension("toml.tmp");
        fs::write(&tmp_path, content)
            .with_context(|| format!("Failed to write config to {}", tmp_path.display()))?;
        fs::rename(&tmp_path, path).with_context(|| {
            format!(
                "Failed to rename {} to {}",
                tmp_path.display(),
                path.display()
            )
        })?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::tempdir;

    use super::*;

    /// Config loading: missing file returns defaults.
    #[test]
    fn test_load_missing_file_returns_defaults() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("nonexistent.toml");

        let config = Config::load_from(&config_path).unwrap();
        assert_eq!(config.playback.min_step_delay_ms, 16);
        assert_eq!(config.playback.default_speed, 1.0);
        assert_eq!(config.ui.font_scale, FontScale::Md);
    }

    /// Config loading: partial config merges with defaults.
    #[test]
    fn test_load_partial_config_merges_defaults() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("config.toml");

        fs::write(&config_path, "[playback]\ndefault_speed = 2.0\n").unwrap();

        let config = Config::load_from(&config_path).unwrap();
        assert_eq!(config.playback.default_speed, 2.0);
        assert_eq!(config.playback.min_step_delay_ms, 16);
    }

    /// Config loading: font scale parses from lowercase names.
    #[test]
    fn test_load_font_scale() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("config.toml");

        fs::write(&config_path, "[ui]\nfont_scale = \"lg\"\n").unwrap();

        let config = Config::load_from(&config_path).unwrap();
        assert_eq!(config.ui.font_scale, FontScale::Lg);
    }

    /// Config loading: malformed file is an error, not silent defaults.
    #[test]
    fn test_load_malformed_file_errors() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("config.toml");

        fs::write(&config_path, "[playback\nnope").unwrap();

        assert!(Config::load_from(&config_path).is_err());
    }

    /// Config init: creates file with the commented template, creates parent dirs.
    #[test]
    fn test_init_creates_config_with_template() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("subdir").join("config.toml");

        Config::init(&config_path).unwrap();

        assert!(config_path.exists());
        let contents = fs::read_to_string(&config_path).unwrap();
        assert!(contents.contains("# Deck Configuration"));
        assert!(contents.contains("# min_step_delay_ms = 16"));

        // The template (all comments) must load back as defaults.
        let config = Config::load_from(&config_path).unwrap();
        assert_eq!(config.playback.min_step_delay_ms, 16);
    }

    /// Config init: fails if file exists (no silent overwrite).
    #[test]
    fn test_init_fails_if_exists() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("config.toml");

        fs::write(&config_path, "").unwrap();

        assert!(Config::init(&config_path).is_err());
    }

    /// min_step_delay converts milliseconds to a Duration.
    #[test]
    fn test_min_step_delay_duration() {
        let playback = PlaybackConfig {
            min_step_delay_ms: 40,
            ..Default::default()
        };
        assert_eq!(playback.min_step_delay(), Duration::from_millis(40));
    }
}
