//! # Configuration
//!
//! Loaded once at startup, read-only afterwards.
//!
//! ## Configuration Sources (Priority Order)
//! 1. Environment variables (`KHO_*`)
//! 2. Config file (`backoffice.toml` in the platform config dir)
//! 3. Defaults (this file)
//!
//! ```text
//! ┌──────────────┐    ┌──────────────┐    ┌──────────────┐    ┌──────────┐
//! │   Defaults   │ ─► │ backoffice   │ ─► │   KHO_* env  │ ─► │ validate │
//! │              │    │   .toml      │    │  overrides   │    │          │
//! └──────────────┘    └──────────────┘    └──────────────┘    └──────────┘
//! ```
//!
//! ## Environment Variables
//! - `KHO_API_BASE_URL`: backend base URL
//! - `KHO_API_TOKEN`: bearer token
//! - `KHO_REQUEST_TIMEOUT_SECS`: request timeout
//! - `KHO_NOTICE_TTL_SECS`: how long banners stay up
//! - `KHO_DB_PATH`: local state database file

use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use kho_client::config::DEFAULT_TIMEOUT_SECS;
use kho_client::ClientConfig;
use kho_core::notice::DEFAULT_NOTICE_TTL_SECS;

/// Name of the config file inside the platform config dir.
pub const CONFIG_FILE_NAME: &str = "backoffice.toml";

/// Name of the local state database inside the platform data dir.
pub const DATABASE_FILE_NAME: &str = "kho.db";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Cannot read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid value for {field}: {reason}")]
    Invalid { field: String, reason: String },

    #[error("Could not determine the app data directory")]
    NoDataDir,
}

impl ConfigError {
    fn invalid(field: &str, reason: impl Into<String>) -> Self {
        ConfigError::Invalid {
            field: field.to_string(),
            reason: reason.into(),
        }
    }
}

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Backend base URL, e.g. `https://kho.example.vn/api`
    pub api_base_url: String,

    /// Bearer token, when the session already has one
    #[serde(skip_serializing)]
    pub api_token: Option<String>,

    pub request_timeout_secs: u64,

    /// Seconds a success or error banner stays on screen
    pub notice_ttl_secs: u64,

    /// Local state database; platform data dir when unset
    pub db_path: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            api_base_url: "http://localhost:8080/api".to_string(),
            api_token: None,
            request_timeout_secs: DEFAULT_TIMEOUT_SECS,
            notice_ttl_secs: DEFAULT_NOTICE_TTL_SECS,
            db_path: None,
        }
    }
}

impl AppConfig {
    /// Loads from the default config file and the process environment.
    pub fn load() -> Result<Self, ConfigError> {
        let path = default_config_path();
        Self::load_from(path.as_deref(), |key| std::env::var(key).ok())
    }

    /// Loads from `path` (skipped when missing) and `env`, then validates.
    pub fn load_from<F>(path: Option<&Path>, env: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = match path.filter(|p| p.exists()) {
            Some(path) => {
                info!(?path, "Loading config file");
                let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
                    path: path.to_path_buf(),
                    source,
                })?;
                Self::from_toml_str(&raw)?
            }
            None => {
                debug!("No config file, using defaults");
                AppConfig::default()
            }
        };

        config.apply_env(env)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(raw)?)
    }

    /// Applies `KHO_*` overrides. Blank values are ignored.
    pub fn apply_env<F>(&mut self, env: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| env(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        if let Some(url) = var("KHO_API_BASE_URL") {
            self.api_base_url = url;
        }
        if let Some(token) = var("KHO_API_TOKEN") {
            self.api_token = Some(token);
        }
        if let Some(raw) = var("KHO_REQUEST_TIMEOUT_SECS") {
            self.request_timeout_secs = parse_secs("KHO_REQUEST_TIMEOUT_SECS", &raw)?;
        }
        if let Some(raw) = var("KHO_NOTICE_TTL_SECS") {
            self.notice_ttl_secs = parse_secs("KHO_NOTICE_TTL_SECS", &raw)?;
        }
        if let Some(path) = var("KHO_DB_PATH") {
            self.db_path = Some(PathBuf::from(path));
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let url = self.api_base_url.trim();
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(ConfigError::invalid(
                "api_base_url",
                format!("'{}' is not an http(s) URL", url),
            ));
        }
        if self.request_timeout_secs == 0 {
            return Err(ConfigError::invalid("request_timeout_secs", "must be positive"));
        }
        if self.notice_ttl_secs == 0 {
            return Err(ConfigError::invalid("notice_ttl_secs", "must be positive"));
        }
        Ok(())
    }

    pub fn client_config(&self) -> ClientConfig {
        let config = ClientConfig::new(self.api_base_url.trim())
            .with_timeout(self.request_timeout_secs);
        match &self.api_token {
            Some(token) => config.with_token(token.clone()),
            None => config,
        }
    }

    pub fn notice_ttl(&self) -> Duration {
        Duration::from_secs(self.notice_ttl_secs)
    }

    /// The configured database path, or `kho.db` in the platform data dir.
    ///
    /// ## Platform-Specific Paths
    /// - **macOS**: `~/Library/Application Support/vn.kho.backoffice/kho.db`
    /// - **Windows**: `%APPDATA%\kho\backoffice\data\kho.db`
    /// - **Linux**: `~/.local/share/backoffice/kho.db`
    pub fn database_path(&self) -> Result<PathBuf, ConfigError> {
        if let Some(path) = &self.db_path {
            return Ok(path.clone());
        }
        let dirs = project_dirs().ok_or(ConfigError::NoDataDir)?;
        let data_dir = dirs.data_dir();
        std::fs::create_dir_all(data_dir).map_err(|source| ConfigError::Read {
            path: data_dir.to_path_buf(),
            source,
        })?;
        Ok(data_dir.join(DATABASE_FILE_NAME))
    }
}

fn parse_secs(key: &str, raw: &str) -> Result<u64, ConfigError> {
    raw.parse::<u64>()
        .map_err(|_| ConfigError::invalid(key, format!("'{}' is not a number of seconds", raw)))
}

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("vn", "kho", "backoffice")
}

/// `backoffice.toml` in the platform config dir.
pub fn default_config_path() -> Option<PathBuf> {
    project_dirs().map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
}
