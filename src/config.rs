use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};

use crate::constants::*;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub playback: PlaybackConfig,

    #[serde(default)]
    pub buffering: BufferingConfig,

    #[serde(default)]
    pub credentials: CredentialsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_server_url")]
    pub base_url: String,

    #[serde(default = "default_manifest_name")]
    pub hls_manifest_name: String,

    #[serde(default = "default_timeout")]
    pub request_timeout_secs: u64,
}

/// Tuning knobs for the review modal. The tolerances and retry caps are
/// policy, not protocol, so they live here rather than in code.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlaybackConfig {
    #[serde(default = "default_fps")]
    pub default_fps: f64,

    #[serde(default = "default_settle_tolerance")]
    pub settle_tolerance_secs: f64,

    #[serde(default = "default_drift_tolerance")]
    pub drift_tolerance_secs: f64,

    #[serde(default = "default_max_reseeks")]
    pub max_reseek_attempts: u32,

    #[serde(default = "default_preview_tolerance")]
    pub preview_tolerance_secs: f64,

    #[serde(default = "default_hover_debounce")]
    pub hover_debounce_ms: u64,

    #[serde(default = "default_network_restarts")]
    pub max_network_restarts: u32,

    #[serde(default = "default_media_recoveries")]
    pub max_media_recoveries: u32,
}

/// Buffer window handed to a streaming decoder.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BufferConfig {
    pub max_buffer_secs: f64,
    pub back_buffer_secs: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BufferingConfig {
    #[serde(default = "default_primary_buffer")]
    pub primary: BufferConfig,

    #[serde(default = "default_preview_buffer")]
    pub preview: BufferConfig,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CredentialBackend {
    #[default]
    File,
    Keyring,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CredentialsConfig {
    #[serde(default)]
    pub backend: CredentialBackend,
}

impl Config {
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            info!("No config file found, using defaults");
            let config = Config::default();
            config.save_to(&config_path)?;
            Ok(config)
        }
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        debug!("Loading config from {:?}", path);
        let contents = fs::read_to_string(path).context("Failed to read config file")?;
        let config: Config = toml::from_str(&contents).context("Failed to parse config file")?;
        info!("Config loaded successfully");
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let contents = toml::to_string_pretty(self).context("Failed to serialize config")?;
        fs::write(path, contents).context("Failed to write config file")?;

        debug!("Config saved to {:?}", path);
        Ok(())
    }

    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir().context("Failed to get config directory")?;
        Ok(config_dir.join("vidseek").join("config.toml"))
    }
}

impl ServerConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl PlaybackConfig {
    pub fn hover_debounce(&self) -> Duration {
        Duration::from_millis(self.hover_debounce_ms)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            base_url: default_server_url(),
            hls_manifest_name: default_manifest_name(),
            request_timeout_secs: default_timeout(),
        }
    }
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            default_fps: default_fps(),
            settle_tolerance_secs: default_settle_tolerance(),
            drift_tolerance_secs: default_drift_tolerance(),
            max_reseek_attempts: default_max_reseeks(),
            preview_tolerance_secs: default_preview_tolerance(),
            hover_debounce_ms: default_hover_debounce(),
            max_network_restarts: default_network_restarts(),
            max_media_recoveries: default_media_recoveries(),
        }
    }
}

impl Default for BufferingConfig {
    fn default() -> Self {
        Self {
            primary: default_primary_buffer(),
            preview: default_preview_buffer(),
        }
    }
}

// Default value functions
fn default_server_url() -> String { DEFAULT_SERVER_URL.to_string() }
fn default_manifest_name() -> String { DEFAULT_MANIFEST_NAME.to_string() }
fn default_timeout() -> u64 { 30 }
fn default_fps() -> f64 { DEFAULT_FPS }
fn default_settle_tolerance() -> f64 { SETTLE_TOLERANCE_SECS }
fn default_drift_tolerance() -> f64 { DRIFT_TOLERANCE_SECS }
fn default_max_reseeks() -> u32 { MAX_RESEEK_ATTEMPTS }
fn default_preview_tolerance() -> f64 { PREVIEW_TOLERANCE_SECS }
fn default_hover_debounce() -> u64 { HOVER_DEBOUNCE_MS }
fn default_network_restarts() -> u32 { MAX_NETWORK_RESTARTS }
fn default_media_recoveries() -> u32 { MAX_MEDIA_RECOVERIES }
fn default_primary_buffer() -> BufferConfig {
    BufferConfig { max_buffer_secs: 30.0, back_buffer_secs: 10.0 }
}
fn default_preview_buffer() -> BufferConfig {
    BufferConfig { max_buffer_secs: 4.0, back_buffer_secs: 0.0 }
}
