//! Application configuration management.
//!
//! This module handles loading and saving the application configuration:
//! the API base URL, an optional request timeout, the keychain service the
//! token is stored under, and the last email used to sign in.
//!
//! Configuration is stored at `~/.config/trashvalue/config.json`. The
//! `TRASHVALUE_API_URL` and `TRASHVALUE_TIMEOUT_SECS` environment variables
//! override the file.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::auth::credentials::DEFAULT_SERVICE_NAME;

/// Application name used for config/cache directory paths
const APP_NAME: &str = "trashvalue";

/// Config file name
const CONFIG_FILE: &str = "config.json";

/// Log directory name inside the cache directory
const LOG_DIR: &str = "logs";

pub const API_URL_ENV: &str = "TRASHVALUE_API_URL";
pub const TIMEOUT_ENV: &str = "TRASHVALUE_TIMEOUT_SECS";

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct Config {
    #[serde(default)]
    pub api_url: Option<String>,
    /// Per-request timeout. Unset means the HTTP client default.
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,
    #[serde(default)]
    pub keyring_service: Option<String>,
    #[serde(default)]
    pub last_email: Option<String>,
}

impl Config {
    /// Load the config file, or defaults when there is none.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let contents = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file: {}", path.display()))?;
            serde_json::from_str(&contents)
                .with_context(|| format!("Failed to parse config file: {}", path.display()))
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;
        Ok(())
    }

    pub fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }

    /// Apply overrides from the process environment.
    pub fn apply_env(&mut self) {
        self.apply_env_from(|key| std::env::var(key).ok());
    }

    /// Apply overrides from `lookup`. Empty values are ignored, and an
    /// unparseable timeout is logged and ignored.
    pub fn apply_env_from(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(url) = lookup(API_URL_ENV).filter(|v| !v.trim().is_empty()) {
            self.api_url = Some(url.trim().to_string());
        }

        if let Some(raw) = lookup(TIMEOUT_ENV).filter(|v| !v.trim().is_empty()) {
            match raw.trim().parse::<u64>() {
                Ok(secs) => self.request_timeout_secs = Some(secs),
                Err(e) => warn!(value = %raw, error = %e, "Ignoring invalid {}", TIMEOUT_ENV),
            }
        }
    }

    /// The API base URL. There is no built-in default.
    pub fn api_url(&self) -> Result<&str> {
        self.api_url
            .as_deref()
            .filter(|url| !url.is_empty())
            .ok_or_else(|| {
                anyhow::anyhow!(
                    "No API URL configured. Set {} or add \"api_url\" to the config file",
                    API_URL_ENV
                )
            })
    }

    pub fn keyring_service(&self) -> &str {
        self.keyring_service
            .as_deref()
            .filter(|s| !s.is_empty())
            .unwrap_or(DEFAULT_SERVICE_NAME)
    }

    pub fn cache_dir(&self) -> Result<PathBuf> {
        app_cache_dir()
    }

    /// Directory for log files. Known before any config is loaded so logging
    /// can start first.
    pub fn log_dir() -> Result<PathBuf> {
        Ok(app_cache_dir()?.join(LOG_DIR))
    }
}

fn app_cache_dir() -> Result<PathBuf> {
    let cache_dir =
        dirs::cache_dir().ok_or_else(|| anyhow::anyhow!("Could not find cache directory"))?;
    Ok(cache_dir.join(APP_NAME))
}
