//! Application configuration loading from config.toml
//!
//! Holds the non-secret settings: where the commerce API lives, how long remote calls
//! may take, how often folders are re-synchronized, and which folders the shop shows.
//! Every section is optional and falls back to the defaults below.

use crate::errors::{Error, Result};
use serde::Deserialize;
use std::{path::Path, time::Duration};

const DEFAULT_BASE_URL: &str = "https://api.congressus.nl/v20";
const DEFAULT_TIMEOUT_SECS: u64 = 10;
const DEFAULT_SYNC_INTERVAL_SECS: u64 = 4 * 60 * 60;

/// Configuration structure representing the entire config.toml file
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
pub struct AppConfig {
    /// Remote commerce API settings
    #[serde(default)]
    pub api: ApiConfig,
    /// Folder synchronization settings
    #[serde(default)]
    pub sync: SyncConfig,
    /// Folders to register at startup
    #[serde(default)]
    pub folders: Vec<FolderConfig>,
}

/// `[api]` section
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
pub struct ApiConfig {
    /// API root, without trailing slash
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Default timeout for remote calls, in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

/// `[sync]` section
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
pub struct SyncConfig {
    /// How long a folder stays fresh after a sync, in seconds
    #[serde(default = "default_sync_interval_secs")]
    pub interval_secs: u64,
}

/// A `[[folders]]` entry
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
pub struct FolderConfig {
    /// Remote folder id
    pub id: i64,
    /// Display name
    pub name: String,
    /// Image URL
    #[serde(default)]
    pub media_url: Option<String>,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

const fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

const fn default_sync_interval_secs() -> u64 {
    DEFAULT_SYNC_INTERVAL_SECS
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            interval_secs: DEFAULT_SYNC_INTERVAL_SECS,
        }
    }
}

impl ApiConfig {
    /// Default timeout for remote calls
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl SyncConfig {
    /// Default staleness interval for folders
    #[must_use]
    pub const fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }
}

/// Loads the application configuration from a TOML file
///
/// # Errors
/// Returns `Config` if the file cannot be read or is not valid TOML for [`AppConfig`].
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<AppConfig> {
    let contents = std::fs::read_to_string(path.as_ref()).map_err(|e| Error::Config {
        message: format!("Failed to read config file: {e}"),
    })?;

    toml::from_str(&contents).map_err(|e| Error::Config {
        message: format!("Failed to parse config.toml: {e}"),
    })
}

/// Loads the application configuration from the default location (./config.toml)
///
/// # Errors
/// See [`load_config`].
pub fn load_default_config() -> Result<AppConfig> {
    load_config("config.toml")
}

/// Reads the commerce API token from `CONGRESSUS_TOKEN`.
///
/// # Errors
/// Returns `EnvVar` when the variable is unset or not unicode.
pub fn get_api_token() -> Result<String> {
    std::env::var("CONGRESSUS_TOKEN").map_err(Into::into)
}
