//! Nominatim reverse geocoding (OpenStreetMap, fallback provider)
//!
//! Uses the free Nominatim API, no key required.
//! Rate limit: 1 request per second (enforced by User-Agent requirement)

use crate::error::{Error, Result};
use crate::geo::{Coordinates, GeocodeResult, ReverseGeocoder};
use serde::Deserialize;
use tracing::debug;

/// Nominatim geocoding backend
#[derive(Debug, Clone)]
pub struct NominatimGeocoder {
    client: reqwest::Client,
    base_url: String,
    zoom: u8,
    language: String,
}

/// Nominatim reverse response
#[derive(Debug, Deserialize)]
struct NominatimResult {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    display_name: Option<String>,
    #[serde(default)]
    address: Address,
    /// Present when nothing was found: `{"error": "Unable to geocode"}`
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct Address {
    country: Option<String>,
    country_code: Option<String>,
    city: Option<String>,
    town: Option<String>,
    village: Option<String>,
    municipality: Option<String>,
    state: Option<String>,
    region: Option<String>,
}

impl NominatimGeocoder {
    /// Create a new Nominatim backend
    pub fn new(base_url: &str, user_agent: &str, zoom: u8, language: &str) -> Result<Self> {
        let client = reqwest::Client::builder().user_agent(user_agent).build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            zoom,
            language: language.to_string(),
        })
    }

    fn url(&self, coords: Coordinates) -> String {
        format!(
            "{}/reverse?format=json&lat={}&lon={}&zoom={}&addressdetails=1&accept-language={}",
            self.base_url,
            coords.lat,
            coords.lng,
            self.zoom,
            urlencoding::encode(&self.language)
        )
    }

    /// Map the address object onto the shared result shape
    fn parse(result: NominatimResult, coords: Coordinates) -> Option<GeocodeResult> {
        if result.error.is_some() {
            return None;
        }

        let address = result.address;
        let name = result
            .name
            .filter(|n| !n.is_empty())
            .or_else(|| {
                result
                    .display_name
                    .as_deref()
                    .and_then(|d| d.split(',').next())
                    .map(|s| s.trim().to_string())
            })
            .unwrap_or_default();

        Some(GeocodeResult {
            name,
            country_name: address.country.unwrap_or_default(),
            country_code: address.country_code.map(|c| c.to_uppercase()),
            city: address
                .city
                .or(address.town)
                .or(address.village)
                .or(address.municipality),
            state: address.state.or(address.region),
            coords,
        })
    }
}

impl ReverseGeocoder for NominatimGeocoder {
    fn name(&self) -> &'static str {
        "nominatim"
    }

    async fn reverse(&self, coords: Coordinates) -> Result<Option<GeocodeResult>> {
        debug!("Nominatim reverse lookup for {},{}", coords.lat, coords.lng);

        let response = self
            .client
            .get(self.url(coords))
            .send()
            .await
            .map_err(|e| Error::Geo(format!("Nominatim request failed: {}", e)))?;

        if !response.status().is_success() {
            if response.status() == reqwest::StatusCode::NOT_FOUND {
                return Ok(None);
            }
            return Err(Error::Geo(format!(
                "Nominatim returned status: {}",
                response.status()
            )));
        }

        let result: NominatimResult = response
            .json()
            .await
            .map_err(|e| Error::Geo(format!("Failed to parse Nominatim response: {}", e)))?;

        Ok(Self::parse(result, coords))
    }
}
