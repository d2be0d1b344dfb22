//! Configuration loading and management.
//!
//! Configuration is loaded with the following precedence:
//! 1. Environment variables (`PARLEY_*`)
//! 2. Config file (`~/.parley/config.toml`)
//! 3. Defaults

use crate::error::{Error, Result};
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::PathBuf;

/// Main configuration struct.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    /// Storage configuration.
    pub storage: StorageConfig,

    /// Chat behavior configuration.
    pub chat: ChatConfig,

    /// Reply backend configuration.
    pub reply: ReplyConfig,
}

/// Storage configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Path to the parley home directory.
    pub path: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: default_parley_home(),
        }
    }
}

/// Chat behavior configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ChatConfig {
    /// User id the CLI acts as.
    pub user: String,

    /// The fixed greeting seeding every fresh session.
    pub greeting: String,

    /// Debounce window for transcript writes, in milliseconds.
    pub debounce_ms: u64,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            user: "default".to_string(),
            greeting: "Hello! How can I help you today?".to_string(),
            debounce_ms: 500,
        }
    }
}

/// Reply backend configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ReplyConfig {
    /// Base URL of the reply backend (the `/chat` endpoint lives under it).
    pub base_url: String,

    /// Request timeout in seconds.
    pub timeout_seconds: u64,

    /// Bearer token for the backend. Usually set via `PARLEY_API_KEY`.
    pub api_key: Option<String>,
}

impl Default for ReplyConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000/api".to_string(),
            timeout_seconds: 30,
            api_key: None,
        }
    }
}

/// Get the default parley home directory.
fn default_parley_home() -> PathBuf {
    dirs::home_dir().map_or_else(|| PathBuf::from(".parley"), |h| h.join(".parley"))
}

/// Load configuration with precedence: env vars → file → defaults.
///
/// # Errors
///
/// Returns an error if the config file exists but cannot be parsed.
pub fn load_config() -> Result<Config> {
    let mut config = Config::default();

    // Try to load config file
    let config_path = get_config_path();
    if config_path.exists() {
        let contents = fs::read_to_string(&config_path).map_err(Error::Storage)?;
        config = toml::from_str(&contents).map_err(|e| Error::Config(e.to_string()))?;
    }

    // Override with environment variables
    apply_env_overrides(&mut config);

    Ok(config)
}

/// Get the path to the config file.
fn get_config_path() -> PathBuf {
    if let Ok(path) = env::var("PARLEY_CONFIG") {
        return PathBuf::from(path);
    }

    if let Ok(home) = env::var("PARLEY_HOME") {
        return PathBuf::from(home).join("config.toml");
    }

    default_parley_home().join("config.toml")
}

/// Apply environment variable overrides to config.
fn apply_env_overrides(config: &mut Config) {
    // Storage path
    if let Ok(path) = env::var("PARLEY_STORAGE_PATH") {
        config.storage.path = PathBuf::from(path);
    } else if let Ok(home) = env::var("PARLEY_HOME") {
        config.storage.path = PathBuf::from(home);
    }

    // Chat
    if let Ok(user) = env::var("PARLEY_USER") {
        config.chat.user = user;
    }

    if let Ok(greeting) = env::var("PARLEY_GREETING") {
        config.chat.greeting = greeting;
    }

    if let Ok(val) = env::var("PARLEY_DEBOUNCE_MS") {
        if let Ok(ms) = val.parse() {
            config.chat.debounce_ms = ms;
        }
    }

    // Reply backend
    if let Ok(url) = env::var("PARLEY_REPLY_URL") {
        config.reply.base_url = url;
    }

    if let Ok(val) = env::var("PARLEY_TIMEOUT_SECONDS") {
        if let Ok(secs) = val.parse() {
            config.reply.timeout_seconds = secs;
        }
    }

    if let Ok(key) = env::var("PARLEY_API_KEY") {
        config.reply.api_key = Some(key);
    }
}
