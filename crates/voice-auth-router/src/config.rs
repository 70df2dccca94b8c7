//! Configuration for the call router.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

/// Router configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Enrollment provider configuration
    pub voiceit: VoiceItConfig,

    /// Identity store configuration
    #[serde(default)]
    pub store: StoreConfig,

    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Logging configuration
    #[serde(default)]
    pub log: LogConfig,
}

#[derive(Clone, Deserialize)]
pub struct VoiceItConfig {
    /// API key
    pub api_key: String,

    /// API token
    pub api_token: String,

    /// API base URL
    #[serde(default = "default_voiceit_url")]
    pub base_url: String,

    /// Request timeout
    #[serde(default = "default_timeout", with = "humantime_serde")]
    pub timeout: Duration,
}

impl std::fmt::Debug for VoiceItConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VoiceItConfig")
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

/// Where identity records live.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    /// In-process map, lost on restart
    Memory,
    /// JSON file on disk
    File,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    #[serde(default = "default_backend")]
    pub backend: StoreBackend,

    /// Path of the identity file (file backend only)
    #[serde(default = "default_store_path")]
    pub path: PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Server listen address
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LogConfig {
    /// Log level
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Emit JSON lines instead of human-readable output
    #[serde(default)]
    pub json: bool,
}

// Default implementations
impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: default_backend(),
            path: default_store_path(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: default_listen_addr(),
            port: default_port(),
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

// Default value functions
fn default_voiceit_url() -> String {
    voiceit_client::DEFAULT_BASE_URL.into()
}

fn default_timeout() -> Duration {
    Duration::from_secs(10)
}

fn default_backend() -> StoreBackend {
    StoreBackend::File
}

fn default_store_path() -> PathBuf {
    PathBuf::from("/data/identities.json")
}

fn default_listen_addr() -> String {
    "0.0.0.0".into()
}

fn default_port() -> u16 {
    8080
}

fn default_log_level() -> String {
    "info".into()
}

/// Legacy credential variables, used when the namespaced ones are absent.
const LEGACY_API_KEY_VAR: &str = "VIAPIKEY";
const LEGACY_API_TOKEN_VAR: &str = "VIAPITOKEN";

impl Config {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self> {
        // Load .env file if present
        dotenvy::dotenv().ok();

        let mut builder = config::Config::builder();
        if let Ok(key) = std::env::var(LEGACY_API_KEY_VAR) {
            builder = builder.set_default("voiceit.api_key", key)?;
        }
        if let Ok(token) = std::env::var(LEGACY_API_TOKEN_VAR) {
            builder = builder.set_default("voiceit.api_token", token)?;
        }

        let config = builder
            .add_source(
                config::Environment::default()
                    .separator("__")
                    // Phone-number-like values must stay strings.
                    .try_parsing(false),
            )
            .build()
            .context("Failed to build configuration")?;

        Self::from_config(config)
    }

    fn from_config(config: config::Config) -> Result<Self> {
        config
            .try_deserialize()
            .context("Failed to deserialize configuration")
    }
}
