//! Configuration management
//!
//! Loads and saves configuration from XDG-compliant paths.
//! Config location: ~/.config/travel-tracker/config.toml

pub mod defaults;

use crate::constants::api::USER_AGENT;
use crate::error::{Error, Result};
use crate::models::UserId;
use defaults::*;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Travel backend settings
    #[serde(default)]
    pub api: ApiConfig,

    /// Reverse geocoding providers
    #[serde(default)]
    pub geocoding: GeocodingConfig,

    /// Map/boundary settings
    #[serde(default)]
    pub map: MapConfig,

    /// API keys for various services
    #[serde(default)]
    pub api_keys: ApiKeysConfig,
}

/// Travel backend settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL of the REST backend
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Active user id
    #[serde(default = "default_user_id")]
    pub user_id: i64,

    /// Collection endpoints end with a slash (`/locations/`)
    #[serde(default)]
    pub trailing_slash: bool,

    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

/// Reverse geocoding settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeocodingConfig {
    #[serde(default = "default_maptiler_url")]
    pub maptiler_url: String,

    #[serde(default = "default_nominatim_url")]
    pub nominatim_url: String,

    /// Result language; country names must match the backend's naming
    #[serde(default = "default_language")]
    pub language: String,

    /// Nominatim zoom level
    #[serde(default = "default_zoom")]
    pub zoom: u8,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

/// Map settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MapConfig {
    /// GeoJSON country boundary dataset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub boundaries: Option<PathBuf>,

    /// Denominator of the visited counter
    #[serde(default = "default_total_countries")]
    pub total_countries: usize,
}

/// API keys for external services
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ApiKeysConfig {
    /// MapTiler API key (empty: Nominatim only)
    #[serde(default)]
    pub maptiler: String,
}

// Default value functions for serde
fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}
fn default_user_id() -> i64 {
    DEFAULT_USER_ID
}
fn default_timeout() -> u64 {
    DEFAULT_TIMEOUT_SECS
}
fn default_maptiler_url() -> String {
    DEFAULT_MAPTILER_URL.to_string()
}
fn default_nominatim_url() -> String {
    DEFAULT_NOMINATIM_URL.to_string()
}
fn default_language() -> String {
    DEFAULT_LANGUAGE.to_string()
}
fn default_zoom() -> u8 {
    DEFAULT_ZOOM
}
fn default_user_agent() -> String {
    USER_AGENT.to_string()
}
fn default_total_countries() -> usize {
    DEFAULT_TOTAL_COUNTRIES
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            user_id: default_user_id(),
            trailing_slash: false,
            timeout_secs: default_timeout(),
        }
    }
}

impl Default for GeocodingConfig {
    fn default() -> Self {
        Self {
            maptiler_url: default_maptiler_url(),
            nominatim_url: default_nominatim_url(),
            language: default_language(),
            zoom: default_zoom(),
            user_agent: default_user_agent(),
        }
    }
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            boundaries: None,
            total_countries: default_total_countries(),
        }
    }
}

impl Config {
    /// Get the config directory path
    pub fn config_dir() -> Result<PathBuf> {
        dirs::config_dir()
            .map(|p| p.join(APP_DIR_NAME))
            .ok_or_else(|| Error::Config("Could not determine config directory".to_string()))
    }

    /// Get the config file path
    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join(CONFIG_FILE_NAME))
    }

    /// Load configuration from the default path
    ///
    /// Creates default config if file doesn't exist
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    /// Load configuration from a specific path, creating it if missing
    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = fs::read_to_string(path).map_err(|e| {
                Error::Config(format!("Failed to read config file: {}", e))
            })?;

            toml::from_str(&content).map_err(|e| {
                Error::Config(format!("Failed to parse config file: {}", e))
            })
        } else {
            let config = Config::default();
            config.save_to(path)?;
            Ok(config)
        }
    }

    /// Save configuration to the default path
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    /// Save configuration to a specific path
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                Error::Config(format!("Failed to create config directory: {}", e))
            })?;
        }

        let content = toml::to_string_pretty(self).map_err(|e| {
            Error::Config(format!("Failed to serialize config: {}", e))
        })?;

        fs::write(path, content).map_err(|e| {
            Error::Config(format!("Failed to write config file: {}", e))
        })?;

        Ok(())
    }

    /// Active user as a typed id
    pub fn user_id(&self) -> UserId {
        UserId(self.api.user_id)
    }

    /// Get a configuration value by key path
    ///
    /// Key format: "section.key"
    pub fn get(&self, key: &str) -> Option<String> {
        let parts: Vec<&str> = key.split('.').collect();

        match parts.as_slice() {
            ["api", "base_url"] => Some(self.api.base_url.clone()),
            ["api", "user_id"] => Some(self.api.user_id.to_string()),
            ["api", "trailing_slash"] => Some(self.api.trailing_slash.to_string()),
            ["api", "timeout_secs"] => Some(self.api.timeout_secs.to_string()),

            ["geocoding", "maptiler_url"] => Some(self.geocoding.maptiler_url.clone()),
            ["geocoding", "nominatim_url"] => Some(self.geocoding.nominatim_url.clone()),
            ["geocoding", "language"] => Some(self.geocoding.language.clone()),
            ["geocoding", "zoom"] => Some(self.geocoding.zoom.to_string()),
            ["geocoding", "user_agent"] => Some(self.geocoding.user_agent.clone()),

            ["map", "boundaries"] => Some(
                self.map
                    .boundaries
                    .as_ref()
                    .map(|p| p.display().to_string())
                    .unwrap_or_default(),
            ),
            ["map", "total_countries"] => Some(self.map.total_countries.to_string()),

            ["api_keys", "maptiler"] => Some(self.api_keys.maptiler.clone()),

            _ => None,
        }
    }

    /// Set a configuration value by key path
    ///
    /// Returns error if key is invalid or value type is wrong
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let parts: Vec<&str> = key.split('.').collect();

        match parts.as_slice() {
            ["api", "base_url"] => {
                self.api.base_url = value.to_string();
            }
            ["api", "user_id"] => {
                self.api.user_id = value.parse().map_err(|_| {
                    Error::Config(format!("Invalid user id: {}", value))
                })?;
            }
            ["api", "trailing_slash"] => {
                self.api.trailing_slash = value.parse().map_err(|_| {
                    Error::Config(format!("Invalid boolean value: {}", value))
                })?;
            }
            ["api", "timeout_secs"] => {
                self.api.timeout_secs = value.parse().map_err(|_| {
                    Error::Config(format!("Invalid timeout value: {}", value))
                })?;
            }

            ["geocoding", "maptiler_url"] => {
                self.geocoding.maptiler_url = value.to_string();
            }
            ["geocoding", "nominatim_url"] => {
                self.geocoding.nominatim_url = value.to_string();
            }
            ["geocoding", "language"] => {
                self.geocoding.language = value.to_string();
            }
            ["geocoding", "zoom"] => {
                self.geocoding.zoom = value.parse().map_err(|_| {
                    Error::Config(format!("Invalid zoom value: {}", value))
                })?;
            }
            ["geocoding", "user_agent"] => {
                self.geocoding.user_agent = value.to_string();
            }

            ["map", "boundaries"] => {
                self.map.boundaries = if value.is_empty() {
                    None
                } else {
                    Some(PathBuf::from(value))
                };
            }
            ["map", "total_countries"] => {
                self.map.total_countries = value.parse().map_err(|_| {
                    Error::Config(format!("Invalid country total: {}", value))
                })?;
            }

            ["api_keys", "maptiler"] => {
                self.api_keys.maptiler = value.to_string();
            }

            _ => {
                return Err(Error::Config(format!("Unknown config key: {}", key)));
            }
        }

        Ok(())
    }

    /// List all available config keys
    pub fn available_keys() -> Vec<&'static str> {
        vec![
            "api.base_url",
            "api.user_id",
            "api.trailing_slash",
            "api.timeout_secs",
            "geocoding.maptiler_url",
            "geocoding.nominatim_url",
            "geocoding.language",
            "geocoding.zoom",
            "geocoding.user_agent",
            "map.boundaries",
            "map.total_countries",
            "api_keys.maptiler",
        ]
    }
}
