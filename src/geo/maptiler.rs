//! MapTiler reverse geocoding (primary provider)
//!
//! `GET {base}/geocoding/{lng},{lat}.json?key=...&limit=1`. The answer is a
//! GeoJSON feature collection; the first feature carries the place, and its
//! `context` array lists the enclosing municipality, region and country.

use crate::error::{Error, Result};
use crate::geo::{Coordinates, GeocodeResult, ReverseGeocoder};
use serde::Deserialize;
use tracing::debug;

/// MapTiler geocoding backend
#[derive(Debug, Clone)]
pub struct MapTilerGeocoder {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    language: String,
}

#[derive(Debug, Deserialize)]
struct FeatureCollection {
    #[serde(default)]
    features: Vec<Feature>,
}

#[derive(Debug, Deserialize)]
struct Feature {
    #[serde(default)]
    id: String,
    #[serde(default)]
    text: String,
    #[serde(default)]
    place_type: Vec<String>,
    #[serde(default)]
    properties: Properties,
    #[serde(default)]
    context: Vec<ContextEntry>,
}

#[derive(Debug, Default, Deserialize)]
struct Properties {
    name: Option<String>,
    country_code: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ContextEntry {
    #[serde(default)]
    id: String,
    #[serde(default)]
    text: String,
    country_code: Option<String>,
}

/// What a feature or context entry describes, from its id prefix
fn kind_of(id: &str) -> &str {
    id.split('.').next().unwrap_or("")
}

impl MapTilerGeocoder {
    /// Create a new MapTiler backend
    pub fn new(base_url: &str, api_key: &str, language: &str) -> Result<Self> {
        let client = reqwest::Client::builder().build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            language: language.to_string(),
        })
    }

    fn url(&self, coords: Coordinates) -> String {
        format!(
            "{}/geocoding/{},{}.json?key={}&limit=1&language={}",
            self.base_url,
            coords.lng,
            coords.lat,
            urlencoding::encode(&self.api_key),
            urlencoding::encode(&self.language)
        )
    }

    /// Normalize the first feature of a response
    fn parse(body: FeatureCollection, coords: Coordinates) -> Option<GeocodeResult> {
        let feature = body.features.into_iter().next()?;
        let mut result = GeocodeResult::empty(coords);

        let feature_kind = feature
            .place_type
            .first()
            .map(String::as_str)
            .unwrap_or_else(|| kind_of(&feature.id))
            .to_string();
        result.name = feature.properties.name.clone().unwrap_or(feature.text.clone());
        result.country_code = feature.properties.country_code.clone();

        // The feature itself may be the country or the city that was clicked
        let own = ContextEntry {
            id: format!("{}.self", feature_kind),
            text: feature.text,
            country_code: feature.properties.country_code,
        };

        for entry in std::iter::once(own).chain(feature.context) {
            if entry.text.is_empty() {
                continue;
            }
            match kind_of(&entry.id) {
                "country" => {
                    if result.country_name.is_empty() {
                        result.country_name = entry.text;
                    }
                    if result.country_code.is_none() {
                        result.country_code = entry.country_code;
                    }
                }
                "region" | "subregion" => {
                    result.state.get_or_insert(entry.text);
                }
                "municipality" | "place" | "locality" | "city" => {
                    result.city.get_or_insert(entry.text);
                }
                _ => {}
            }
        }

        result.country_code = result.country_code.map(|c| c.to_uppercase());
        Some(result)
    }
}

impl ReverseGeocoder for MapTilerGeocoder {
    fn name(&self) -> &'static str {
        "maptiler"
    }

    async fn reverse(&self, coords: Coordinates) -> Result<Option<GeocodeResult>> {
        debug!("MapTiler reverse lookup for {},{}", coords.lat, coords.lng);

        let response = self
            .client
            .get(self.url(coords))
            .send()
            .await
            .map_err(|e| Error::Geo(format!("MapTiler request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(Error::Geo(format!(
                "MapTiler returned status: {}",
                response.status()
            )));
        }

        let body: FeatureCollection = response
            .json()
            .await
            .map_err(|e| Error::Geo(format!("Failed to parse MapTiler response: {}", e)))?;

        Ok(Self::parse(body, coords))
    }
}
