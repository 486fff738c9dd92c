//! Application configuration structures.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{AppError, Result};
use crate::models::Language;

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Language to fetch jokes in
    #[serde(default)]
    pub language: Language,

    /// HTTP client settings
    #[serde(default)]
    pub fetch: FetchConfig,

    /// Remote joke endpoints
    #[serde(default)]
    pub sources: SourcesConfig,

    /// Joke store location
    #[serde(default)]
    pub storage: StorageConfig,

    /// Bulk document resync cadence
    #[serde(default)]
    pub sync: SyncConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load configuration or return default if loading fails.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        if !path.exists() {
            log::debug!("No config file at {:?}. Using defaults.", path);
            return Self::default();
        }
        Self::load(path).unwrap_or_else(|e| {
            log::warn!("Config load failed from {:?}: {}. Using defaults.", path, e);
            Self::default()
        })
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        if self.fetch.user_agent.trim().is_empty() {
            return Err(AppError::validation("fetch.user_agent is empty"));
        }
        if self.fetch.timeout_secs == 0 {
            return Err(AppError::validation("fetch.timeout_secs must be > 0"));
        }
        if self.sync.resync_days == 0 {
            return Err(AppError::validation("sync.resync_days must be > 0"));
        }
        Url::parse(&self.sources.api_url)
            .map_err(|e| AppError::validation(format!("sources.api_url: {e}")))?;
        Url::parse(&self.sources.bulk_url)
            .map_err(|e| AppError::validation(format!("sources.bulk_url: {e}")))?;
        Ok(())
    }
}

/// HTTP client settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchConfig {
    /// User-Agent header for HTTP requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Request timeout in seconds
    #[serde(default = "defaults::timeout")]
    pub timeout_secs: u64,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            user_agent: defaults::user_agent(),
            timeout_secs: defaults::timeout(),
        }
    }
}

/// Remote joke endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourcesConfig {
    /// JSON API returning one joke per request
    #[serde(default = "defaults::api_url")]
    pub api_url: String,

    /// Markdown document listing every curated joke
    #[serde(default = "defaults::bulk_url")]
    pub bulk_url: String,
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            api_url: defaults::api_url(),
            bulk_url: defaults::bulk_url(),
        }
    }
}

/// Joke store location.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Directory holding `jokes.db`
    #[serde(default = "defaults::db_dir")]
    pub db_dir: PathBuf,
}

impl StorageConfig {
    /// Full path of the SQLite database file.
    pub fn db_path(&self) -> PathBuf {
        self.db_dir.join(defaults::DB_FILE)
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            db_dir: defaults::db_dir(),
        }
    }
}

/// Bulk document resync cadence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Days before the bulk document is fetched again
    #[serde(default = "defaults::resync_days")]
    pub resync_days: u32,
}

impl SyncConfig {
    /// Staleness threshold as a duration.
    pub fn threshold(&self) -> chrono::Duration {
        chrono::Duration::days(i64::from(self.resync_days))
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            resync_days: defaults::resync_days(),
        }
    }
}

/// Default data directory, `~/.godad`.
pub fn default_db_dir() -> PathBuf {
    defaults::db_dir()
}

mod defaults {
    use std::path::PathBuf;

    pub const DB_FILE: &str = "jokes.db";

    pub fn user_agent() -> String {
        "https://github.com/lhaig/godad".into()
    }
    pub fn timeout() -> u64 {
        10
    }

    pub fn api_url() -> String {
        "https://icanhazdadjoke.com/".into()
    }
    pub fn bulk_url() -> String {
        "https://raw.githubusercontent.com/lhaig/godad/main/jokes/de.md".into()
    }

    pub fn db_dir() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".godad")
    }

    pub fn resync_days() -> u32 {
        7
    }
}
