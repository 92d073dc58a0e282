//! Centralized constants for the travel-tracker crate
//!
//! Endpoints and fixed numbers shared by the client, resolver and CLI.

/// External API endpoints
pub mod api {
    /// Default travel backend (Flask app)
    pub const BACKEND_URL: &str = "http://localhost:5001";

    /// MapTiler geocoding API (requires API key)
    pub const MAPTILER_URL: &str = "https://api.maptiler.com";

    /// OpenStreetMap Nominatim geocoding API
    pub const NOMINATIM_URL: &str = "https://nominatim.openstreetmap.org";

    /// User agent sent to geocoding providers
    pub const USER_AGENT: &str = concat!("travel-tracker/", env!("CARGO_PKG_VERSION"));
}

/// Geographic constants
pub mod geo {
    /// Number of countries shown as the counter's denominator
    pub const TOTAL_COUNTRIES: usize = 195;

    /// Default Nominatim zoom level (10 = city)
    pub const NOMINATIM_ZOOM: u8 = 10;
}
