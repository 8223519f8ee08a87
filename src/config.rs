//! Client configuration management.
//!
//! This module handles loading and saving the client configuration,
//! which includes the API base URL and the last used username.
//!
//! Configuration is stored at `~/.config/kukuconnect/config.json`.
//! The base URL can be overridden with the `KUKUCONNECT_API_BASE_URL`
//! environment variable (a `.env` file is honored if present).

use std::path::PathBuf;

use anyhow::Result;
use serde::{Deserialize, Serialize};

/// Application name used for config/cache directory paths
const APP_NAME: &str = "kukuconnect";

/// Config file name
const CONFIG_FILE: &str = "config.json";

/// Environment variable overriding the API base URL
const BASE_URL_ENV: &str = "KUKUCONNECT_API_BASE_URL";

/// Default API base URL when neither config nor environment provides one
const DEFAULT_BASE_URL: &str = "https://api.kukuconnect.com";

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    pub api_base_url: Option<String>,
    pub last_username: Option<String>,
}

impl Config {
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        if path.exists() {
            let contents = std::fs::read_to_string(&path)?;
            Ok(serde_json::from_str(&contents)?)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    /// Resolve the API base URL: environment beats config, config beats default.
    /// Trailing slashes are stripped so endpoint paths join cleanly.
    pub fn base_url(&self) -> String {
        let _ = dotenvy::dotenv();
        let url = std::env::var(BASE_URL_ENV)
            .ok()
            .or_else(|| self.api_base_url.clone())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        url.trim_end_matches('/').to_string()
    }

    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }

    pub fn cache_dir(&self) -> Result<PathBuf> {
        let cache_dir = dirs::cache_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find cache directory"))?;
        Ok(cache_dir.join(APP_NAME))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_strips_trailing_slash() {
        let config = Config {
            api_base_url: Some("http://localhost:8000/".to_string()),
            last_username: None,
        };
        if std::env::var(BASE_URL_ENV).is_err() {
            assert_eq!(config.base_url(), "http://localhost:8000");
        }
    }

    #[test]
    fn base_url_defaults_when_unset() {
        let config = Config::default();
        if std::env::var(BASE_URL_ENV).is_err() {
            assert_eq!(config.base_url(), DEFAULT_BASE_URL);
        }
    }
}
