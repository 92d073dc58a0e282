//! Default configuration values
//!
//! Named constants for all tunable parameters

use crate::constants::{api, geo};

/// Default backend base URL
pub const DEFAULT_BASE_URL: &str = api::BACKEND_URL;

/// Default active user
pub const DEFAULT_USER_ID: i64 = 1;

/// Default request timeout in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Default MapTiler endpoint
pub const DEFAULT_MAPTILER_URL: &str = api::MAPTILER_URL;

/// Default Nominatim endpoint
pub const DEFAULT_NOMINATIM_URL: &str = api::NOMINATIM_URL;

/// Default geocoding language (must match the backend's country names)
pub const DEFAULT_LANGUAGE: &str = "en";

/// Default Nominatim zoom
pub const DEFAULT_ZOOM: u8 = geo::NOMINATIM_ZOOM;

/// Default counter denominator
pub const DEFAULT_TOTAL_COUNTRIES: usize = geo::TOTAL_COUNTRIES;

/// Config file name
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Application directory name (for XDG paths)
pub const APP_DIR_NAME: &str = "travel-tracker";
