//! Configuration file support for podcast-browser.
//!
//! This module provides functionality for loading and saving user preferences
//! from a TOML configuration file.

use crate::error::{AppError, Result};
use crate::playback::{ListenedPolicy, PLAYBACK_RATES};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default base URL of the remote podcast catalog.
pub const DEFAULT_API_URL: &str = "https://podcast-api.netlify.app";

/// User configuration settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Base URL of the podcast catalog API
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    /// Timeout applied to every catalog request, in seconds
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Retries for transient network failures (0 disables retrying)
    #[serde(default)]
    pub max_retries: u32,

    /// Audio player command (overrides platform default)
    #[serde(default)]
    pub player: Option<String>,

    /// Additional arguments to pass to the audio player
    #[serde(default)]
    pub player_args: Vec<String>,

    /// Initial playback rate multiplier
    #[serde(default = "default_playback_rate")]
    pub playback_rate: f64,

    /// Podcasts shown per genre bucket before expanding
    #[serde(default = "default_genre_preview_count")]
    pub genre_preview_count: usize,

    /// Words shown before a podcast description is truncated
    #[serde(default = "default_description_word_limit")]
    pub description_word_limit: usize,

    /// Delay between hiding a removed favorite and committing the removal
    #[serde(default = "default_remove_delay_ms")]
    pub remove_delay_ms: u64,

    /// Mark an episode listened this many seconds after playback starts
    /// instead of waiting for the end of the media.
    #[serde(default)]
    pub listened_after_secs: Option<u64>,

    /// Directory holding storage.json (defaults to the platform data dir)
    #[serde(default)]
    pub data_dir: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

fn default_api_base_url() -> String {
    DEFAULT_API_URL.to_string()
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_playback_rate() -> f64 {
    1.0
}

fn default_genre_preview_count() -> usize {
    5
}

fn default_description_word_limit() -> usize {
    100
}

fn default_remove_delay_ms() -> u64 {
    500
}

impl Config {
    /// Create a new config with default values.
    pub fn new() -> Self {
        Self {
            api_base_url: default_api_base_url(),
            request_timeout_secs: default_request_timeout_secs(),
            max_retries: 0,
            player: None,
            player_args: Vec::new(),
            playback_rate: default_playback_rate(),
            genre_preview_count: default_genre_preview_count(),
            description_word_limit: default_description_word_limit(),
            remove_delay_ms: default_remove_delay_ms(),
            listened_after_secs: None,
            data_dir: None,
        }
    }

    /// Get the path to the config file.
    ///
    /// Returns ~/.config/podcast-browser/config.toml on Linux,
    /// or a platform-appropriate location on other systems.
    pub fn get_config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| AppError::Config("Could not find config directory".to_string()))?
            .join("podcast-browser");

        Ok(config_dir.join("config.toml"))
    }

    /// Load config from disk.
    ///
    /// Returns default config if the file doesn't exist.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::get_config_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::new());
        }

        let content = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Save config to disk.
    ///
    /// Creates the config directory if it doesn't exist.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::get_config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    /// Create a default config file if one doesn't exist.
    ///
    /// Returns the path to the config file.
    pub fn create_default_if_missing() -> Result<PathBuf> {
        let path = Self::get_config_path()?;
        Self::create_default_at(&path)?;
        Ok(path)
    }

    /// Write the defaults to `path` unless a file is already there.
    /// Returns whether a file was written.
    pub fn create_default_at(path: &Path) -> Result<bool> {
        if path.exists() {
            return Ok(false);
        }
        Self::new().save_to(path)?;
        Ok(true)
    }

    /// Reject values the rest of the application cannot honour.
    pub fn validate(&self) -> Result<()> {
        if !PLAYBACK_RATES.contains(&self.playback_rate) {
            return Err(AppError::Config(format!(
                "playback_rate must be one of {:?}, got {}",
                PLAYBACK_RATES, self.playback_rate
            )));
        }
        if self.request_timeout_secs == 0 {
            return Err(AppError::Config(
                "request_timeout_secs must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn remove_delay(&self) -> Duration {
        Duration::from_millis(self.remove_delay_ms)
    }

    /// When an episode counts as fully listened.
    pub fn listened_policy(&self) -> ListenedPolicy {
        match self.listened_after_secs {
            Some(secs) => ListenedPolicy::AfterDelay(Duration::from_secs(secs)),
            None => ListenedPolicy::OnEnd,
        }
    }

    /// Directory containing the persisted state file.
    ///
    /// Returns ~/.local/share/podcast-browser on Linux unless overridden.
    pub fn storage_dir(&self) -> Result<PathBuf> {
        if let Some(dir) = &self.data_dir {
            return Ok(dir.clone());
        }
        let data_dir = dirs::data_local_dir()
            .ok_or_else(|| AppError::Config("Could not find data directory".to_string()))?;
        Ok(data_dir.join("podcast-browser"))
    }
}
