//! Configuration management for spacesnap.
//!
//! This module provides configuration loading and validation using figment,
//! supporting TOML config files, environment variables, and defaults.

use std::path::PathBuf;
use std::time::Duration;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "config.toml";

/// Default data directory name.
const DATA_DIR_NAME: &str = "spacesnap";

/// Default favorites file name.
const FAVORITES_FILE_NAME: &str = "favorites.json";

/// Default image provider endpoint.
pub const DEFAULT_ENDPOINT: &str = "https://api.nasa.gov/planetary/apod";

/// Environment variable holding the provider key, read without prefix.
pub const API_KEY_ENV: &str = "NASA_API_KEY";

/// Application configuration.
///
/// Configuration is loaded from (in order of precedence, highest first):
/// 1. `NASA_API_KEY` for the API key
/// 2. Environment variables (prefixed with `SPACESNAP_`)
/// 3. TOML config file at `~/.config/spacesnap/config.toml`
/// 4. Default values
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Image provider configuration.
    pub api: ApiConfig,
    /// Favorites configuration.
    pub favorites: FavoritesConfig,
    /// Image download configuration.
    pub download: DownloadConfig,
}

/// Image provider configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Base URL of the picture-of-the-day endpoint.
    pub endpoint: String,
    /// API key sent with every request.
    pub key: Option<String>,
    /// Request timeout in seconds.
    pub timeout: u64,
}

/// Favorites configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FavoritesConfig {
    /// Path to the favorites file.
    /// Defaults to `~/.local/share/spacesnap/favorites.json`
    pub path: Option<PathBuf>,
}

/// Image download configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DownloadConfig {
    /// Directory downloaded images are written to.
    /// Defaults to the current directory.
    pub directory: Option<PathBuf>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            key: None,
            timeout: 30,
        }
    }
}

impl Config {
    /// Load configuration with an optional custom config path.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load_from(config_path: Option<PathBuf>) -> Result<Self> {
        let config_file = config_path.unwrap_or_else(Self::default_config_path);
        Self::from_figment(Self::figment(&config_file))
    }

    /// Build the layered figment for a config file.
    #[must_use]
    pub fn figment(config_file: &std::path::Path) -> Figment {
        Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(config_file))
            .merge(Env::prefixed("SPACESNAP_").split("_"))
            .merge(Env::raw().only(&[API_KEY_ENV]).map(|_| "api.key".into()))
    }

    /// Extract and validate configuration from a figment.
    ///
    /// # Errors
    ///
    /// Returns an error if extraction or validation fails.
    pub fn from_figment(figment: Figment) -> Result<Self> {
        let config: Config = figment.extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Get the default configuration file path.
    #[must_use]
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from(".config"))
            .join(DATA_DIR_NAME)
            .join(CONFIG_FILE_NAME)
    }

    /// Get the default data directory path.
    #[must_use]
    pub fn default_data_dir() -> PathBuf {
        dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from(".local/share"))
            .join(DATA_DIR_NAME)
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid.
    pub fn validate(&self) -> Result<()> {
        match reqwest::Url::parse(&self.api.endpoint) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => {}
            _ => {
                return Err(Error::ConfigValidation {
                    message: format!(
                        "api.endpoint must be an http(s) URL, got '{}'",
                        self.api.endpoint
                    ),
                });
            }
        }

        if self.api.timeout == 0 {
            return Err(Error::ConfigValidation {
                message: "api.timeout must be greater than 0".to_string(),
            });
        }

        if self.api.key.as_deref().is_some_and(|key| key.trim().is_empty()) {
            return Err(Error::ConfigValidation {
                message: "api.key must not be empty".to_string(),
            });
        }

        Ok(())
    }

    /// Get the API key, failing if none is configured.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingApiKey`] if no key is set.
    pub fn api_key(&self) -> Result<&str> {
        self.api.key.as_deref().ok_or_else(|| Error::MissingApiKey {
            config_hint: Self::default_config_path().display().to_string(),
        })
    }

    /// Get the favorites path, resolving defaults if not set.
    #[must_use]
    pub fn favorites_path(&self) -> PathBuf {
        self.favorites
            .path
            .clone()
            .unwrap_or_else(|| Self::default_data_dir().join(FAVORITES_FILE_NAME))
    }

    /// Get the download directory, resolving defaults if not set.
    #[must_use]
    pub fn download_dir(&self) -> PathBuf {
        self.download
            .directory
            .clone()
            .unwrap_or_else(|| PathBuf::from("."))
    }

    /// Get the request timeout as a Duration.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.api.timeout)
    }

    /// A copy safe to print, with the API key masked.
    #[must_use]
    pub fn redacted(&self) -> Self {
        let mut config = self.clone();
        if config.api.key.is_some() {
            config.api.key = Some("********".to_string());
        }
        config
    }
}
