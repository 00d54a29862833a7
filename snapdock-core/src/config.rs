//! Configuration management for snapdock
//!
//! Config files are stored in platform-appropriate locations:
//! - Linux: ~/.config/snapdock/
//! - macOS: ~/Library/Application Support/snapdock/
//! - Windows: %APPDATA%\snapdock\

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

use crate::connection::ReconnectPolicy;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Failed to serialize config: {0}")]
    SerializeError(#[from] toml::ser::Error),

    #[error("Config directory not found")]
    NoDirFound,
}

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Companion server to talk to
    #[serde(default)]
    pub server: ServerConfig,

    /// Client behavior
    #[serde(default)]
    pub client: ClientConfig,
}

/// Companion server endpoint.
///
/// The server carries HTTP and the WebSocket channel on one port.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_ws_path")]
    pub ws_path: String,
}

impl ServerConfig {
    /// Base URL for the REST endpoints (pairing, listing, config)
    pub fn http_base(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }

    /// URL of the live channel
    pub fn ws_url(&self) -> String {
        format!("ws://{}:{}{}", self.host, self.port, self.ws_path)
    }
}

/// Client-side configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// First reconnect wait after a drop, in milliseconds
    #[serde(default = "default_reconnect_floor_ms")]
    pub reconnect_floor_ms: u64,

    /// Backoff cap, in milliseconds
    #[serde(default = "default_reconnect_ceiling_ms")]
    pub reconnect_ceiling_ms: u64,

    /// Show per-photo upload status glyphs in the gallery
    #[serde(default = "default_true")]
    pub show_upload_status: bool,

    /// TUI-specific settings
    #[serde(default)]
    pub tui: TuiConfig,
}

impl ClientConfig {
    pub fn reconnect_policy(&self) -> ReconnectPolicy {
        ReconnectPolicy {
            floor: Duration::from_millis(self.reconnect_floor_ms),
            ceiling: Duration::from_millis(self.reconnect_ceiling_ms),
        }
    }
}

/// TUI-specific configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TuiConfig {
    /// Use true color (24-bit)
    #[serde(default = "default_true")]
    pub true_color: bool,

    /// Enable mouse support
    #[serde(default = "default_true")]
    pub mouse: bool,
}

// Default value functions
fn default_host() -> String {
    "localhost".to_string()
}
fn default_port() -> u16 {
    crate::DEFAULT_SERVER_PORT
}
fn default_ws_path() -> String {
    "/ws".to_string()
}
fn default_reconnect_floor_ms() -> u64 {
    crate::connection::DEFAULT_RECONNECT_FLOOR_MS
}
fn default_reconnect_ceiling_ms() -> u64 {
    crate::connection::DEFAULT_RECONNECT_CEILING_MS
}
fn default_true() -> bool {
    true
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            ws_path: default_ws_path(),
        }
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            reconnect_floor_ms: default_reconnect_floor_ms(),
            reconnect_ceiling_ms: default_reconnect_ceiling_ms(),
            show_upload_status: true,
            tui: TuiConfig::default(),
        }
    }
}

impl Default for TuiConfig {
    fn default() -> Self {
        Self {
            true_color: true,
            mouse: true,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            client: ClientConfig::default(),
        }
    }
}

impl Config {
    /// Get config directory path
    pub fn config_dir() -> Result<PathBuf, ConfigError> {
        dirs::config_dir()
            .map(|p| p.join("snapdock"))
            .ok_or(ConfigError::NoDirFound)
    }

    /// Get config file path
    pub fn config_path() -> Result<PathBuf, ConfigError> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Load config from default location
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::config_path()?;

        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(&path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Load config from specific path
    pub fn load_from(path: &std::path::Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Save config to default location
    pub fn save(&self) -> Result<(), ConfigError> {
        let path = Self::config_path()?;
        self.save_to(&path)
    }

    /// Save config to specific path
    pub fn save_to(&self, path: &std::path::Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}
