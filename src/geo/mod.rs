//! Reverse geocoding
//!
//! Turns a clicked coordinate pair into a place name and free-text country.
//! MapTiler is the primary provider; Nominatim fills whatever MapTiler leaves
//! empty. Provider failures never escape [`GeocodingResolver::resolve`]: the
//! worst case is an empty result, which callers treat as "unresolved".

pub mod maptiler;
pub mod nominatim;

use crate::config::Config;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// A geographic coordinate (latitude, longitude)
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinates {
    /// Create new coordinates
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Validate that coordinates are within valid ranges
    ///
    /// Latitude: -90 to 90
    /// Longitude: -180 to 180
    pub fn validate(&self) -> Result<()> {
        if !(-90.0..=90.0).contains(&self.lat) {
            return Err(Error::InvalidCoordinates(format!(
                "Latitude {} is out of range [-90, 90]",
                self.lat
            )));
        }
        if !(-180.0..=180.0).contains(&self.lng) {
            return Err(Error::InvalidCoordinates(format!(
                "Longitude {} is out of range [-180, 180]",
                self.lng
            )));
        }
        Ok(())
    }
}

/// Normalized reverse-geocoding result
///
/// Ephemeral: used to pre-fill a location form, never persisted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GeocodeResult {
    /// Place name (POI, street or locality)
    pub name: String,
    /// Free-text country name, empty when unresolved
    pub country_name: String,
    /// ISO 3166-1 alpha-2, upper case
    pub country_code: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    /// Coordinates the lookup was made for
    pub coords: Coordinates,
}

impl GeocodeResult {
    /// All-empty result for a coordinate pair
    pub fn empty(coords: Coordinates) -> Self {
        Self {
            coords,
            ..Default::default()
        }
    }

    /// True when a country name was found
    pub fn is_resolved(&self) -> bool {
        !self.country_name.is_empty()
    }

    /// True when the fallback has no country or locality field left to add
    fn is_complete(&self) -> bool {
        self.is_resolved() && self.country_code.is_some() && self.city.is_some()
    }

    /// Fill empty fields of `self` from `other`, field by field
    pub fn merge(self, other: GeocodeResult) -> GeocodeResult {
        GeocodeResult {
            name: non_empty_or(self.name, other.name),
            country_name: non_empty_or(self.country_name, other.country_name),
            country_code: self.country_code.or(other.country_code),
            city: self.city.or(other.city),
            state: self.state.or(other.state),
            coords: self.coords,
        }
    }
}

fn non_empty_or(preferred: String, fallback: String) -> String {
    if preferred.is_empty() {
        fallback
    } else {
        preferred
    }
}

/// Trait for reverse geocoding providers
pub trait ReverseGeocoder: Send + Sync {
    /// Provider name for logs
    fn name(&self) -> &'static str;

    /// Reverse geocode coordinates
    ///
    /// Returns `Ok(None)` when the provider has no feature for the point.
    fn reverse(
        &self,
        coords: Coordinates,
    ) -> impl std::future::Future<Output = Result<Option<GeocodeResult>>> + Send;
}

/// Primary provider with a single fallback
///
/// No retries and no caching; each call is independent.
#[derive(Debug, Clone)]
pub struct GeocodingResolver<P, F> {
    primary: Option<P>,
    fallback: F,
}

impl<P: ReverseGeocoder, F: ReverseGeocoder> GeocodingResolver<P, F> {
    /// Create a resolver; `primary = None` goes straight to the fallback
    pub fn new(primary: Option<P>, fallback: F) -> Self {
        Self { primary, fallback }
    }

    /// Resolve a coordinate pair, degrading to an empty result on failure
    pub async fn resolve(&self, coords: Coordinates) -> GeocodeResult {
        if let Err(e) = coords.validate() {
            warn!("Skipping geocoding: {}", e);
            return GeocodeResult::empty(coords);
        }

        let primary = match &self.primary {
            Some(provider) => attempt(provider, coords).await,
            None => None,
        };

        if let Some(result) = &primary {
            if result.is_complete() {
                return result.clone();
            }
        }

        debug!(
            "Primary geocoder incomplete for {},{}; asking {}",
            coords.lat,
            coords.lng,
            self.fallback.name()
        );
        let fallback = attempt(&self.fallback, coords).await;

        match (primary, fallback) {
            (Some(p), Some(f)) => p.merge(f),
            (Some(p), None) => p,
            (None, Some(f)) => f,
            (None, None) => GeocodeResult::empty(coords),
        }
    }
}

async fn attempt<G: ReverseGeocoder>(provider: &G, coords: Coordinates) -> Option<GeocodeResult> {
    match provider.reverse(coords).await {
        Ok(result) => result.map(|mut r| {
            r.coords = coords;
            r
        }),
        Err(e) => {
            warn!("{} reverse geocoding failed: {}", provider.name(), e);
            None
        }
    }
}

/// Resolver type built from configuration
pub type DefaultResolver = GeocodingResolver<maptiler::MapTilerGeocoder, nominatim::NominatimGeocoder>;

/// Build the MapTiler + Nominatim resolver from configuration
///
/// MapTiler is skipped when no API key is configured.
pub fn get_resolver(config: &Config) -> Result<DefaultResolver> {
    let geo = &config.geocoding;
    let primary = if config.api_keys.maptiler.is_empty() {
        debug!("No MapTiler key configured; using Nominatim only");
        None
    } else {
        Some(maptiler::MapTilerGeocoder::new(
            &geo.maptiler_url,
            &config.api_keys.maptiler,
            &geo.language,
        )?)
    };
    let fallback = nominatim::NominatimGeocoder::new(
        &geo.nominatim_url,
        &geo.user_agent,
        geo.zoom,
        &geo.language,
    )?;
    Ok(GeocodingResolver::new(primary, fallback))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    /// Provider returning a canned answer and counting calls
    struct Canned {
        answer: std::result::Result<Option<GeocodeResult>, &'static str>,
        calls: Arc<AtomicUsize>,
    }

    impl Canned {
        fn new(answer: std::result::Result<Option<GeocodeResult>, &'static str>) -> (Self, Arc<AtomicUsize>) {
            let calls = Arc::new(AtomicUsize::new(0));
            (
                Self {
                    answer,
                    calls: calls.clone(),
                },
                calls,
            )
        }
    }

    impl ReverseGeocoder for Canned {
        fn name(&self) -> &'static str {
            "canned"
        }

        async fn reverse(&self, _coords: Coordinates) -> Result<Option<GeocodeResult>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match &self.answer {
                Ok(r) => Ok(r.clone()),
                Err(msg) => Err(Error::Geo(msg.to_string())),
            }
        }
    }

    fn paris() -> Coordinates {
        Coordinates::new(48.8584, 2.2945)
    }

    fn result(name: &str, country: &str, code: Option<&str>) -> GeocodeResult {
        GeocodeResult {
            name: name.to_string(),
            country_name: country.to_string(),
            country_code: code.map(String::from),
            ..Default::default()
        }
    }

    #[test]
    fn test_validate_coordinates() {
        assert!(Coordinates::new(90.0, 180.0).validate().is_ok());
        assert!(Coordinates::new(-90.1, 0.0).validate().is_err());
        assert!(Coordinates::new(0.0, 180.5).validate().is_err());
    }

    #[test]
    fn test_merge_prefers_primary() {
        let primary = GeocodeResult {
            name: "Tour Eiffel".to_string(),
            city: Some("Paris".to_string()),
            ..Default::default()
        };
        let fallback = GeocodeResult {
            name: "Eiffel Tower".to_string(),
            country_name: "France".to_string(),
            country_code: Some("FR".to_string()),
            city: Some("Paris 7e".to_string()),
            state: Some("Île-de-France".to_string()),
            ..Default::default()
        };

        let merged = primary.merge(fallback);
        assert_eq!(merged.name, "Tour Eiffel");
        assert_eq!(merged.country_name, "France");
        assert_eq!(merged.country_code.as_deref(), Some("FR"));
        assert_eq!(merged.city.as_deref(), Some("Paris"));
        assert_eq!(merged.state.as_deref(), Some("Île-de-France"));
    }

    #[tokio::test]
    async fn test_complete_primary_skips_fallback() {
        let mut complete = result("Eiffel Tower", "France", Some("FR"));
        complete.city = Some("Paris".to_string());
        let (primary, _) = Canned::new(Ok(Some(complete)));
        let (fallback, fallback_calls) = Canned::new(Ok(None));
        let resolver = GeocodingResolver::new(Some(primary), fallback);

        let r = resolver.resolve(paris()).await;
        assert_eq!(r.country_name, "France");
        assert_eq!(r.coords, paris());
        assert_eq!(fallback_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_missing_country_code_uses_fallback() {
        let (primary, _) = Canned::new(Ok(Some(result("Eiffel Tower", "France", None))));
        let (fallback, fallback_calls) = Canned::new(Ok(Some(result("", "Frankreich", Some("FR")))));
        let resolver = GeocodingResolver::new(Some(primary), fallback);

        let r = resolver.resolve(paris()).await;
        assert_eq!(fallback_calls.load(Ordering::SeqCst), 1);
        assert_eq!(r.country_name, "France");
        assert_eq!(r.country_code.as_deref(), Some("FR"));
    }

    #[tokio::test]
    async fn test_missing_city_uses_fallback() {
        let (primary, _) = Canned::new(Ok(Some(result("Eiffel Tower", "France", Some("FR")))));
        let mut locality = result("Tour Eiffel", "France", Some("FR"));
        locality.city = Some("Paris".to_string());
        let (fallback, fallback_calls) = Canned::new(Ok(Some(locality)));
        let resolver = GeocodingResolver::new(Some(primary), fallback);

        let r = resolver.resolve(paris()).await;
        assert_eq!(fallback_calls.load(Ordering::SeqCst), 1);
        assert_eq!(r.name, "Eiffel Tower");
        assert_eq!(r.city.as_deref(), Some("Paris"));
    }

    #[tokio::test]
    async fn test_primary_error_degrades_to_fallback() {
        let (primary, _) = Canned::new(Err("403 Forbidden"));
        let (fallback, _) = Canned::new(Ok(Some(result("Eiffel Tower", "France", Some("FR")))));
        let resolver = GeocodingResolver::new(Some(primary), fallback);

        let r = resolver.resolve(paris()).await;
        assert_eq!(r.name, "Eiffel Tower");
        assert!(r.is_resolved());
    }

    #[tokio::test]
    async fn test_total_failure_is_empty_not_error() {
        let (primary, primary_calls) = Canned::new(Err("timeout"));
        let (fallback, fallback_calls) = Canned::new(Err("unreachable"));
        let resolver = GeocodingResolver::new(Some(primary), fallback);

        let r = resolver.resolve(paris()).await;
        assert_eq!(r, GeocodeResult::empty(paris()));
        assert!(!r.is_resolved());
        assert_eq!(primary_calls.load(Ordering::SeqCst), 1);
        assert_eq!(fallback_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_no_primary_configured() {
        let (fallback, fallback_calls) = Canned::new(Ok(Some(result("Brandenburger Tor", "Germany", Some("DE")))));
        let resolver: GeocodingResolver<Canned, Canned> = GeocodingResolver::new(None, fallback);

        let r = resolver.resolve(Coordinates::new(52.5163, 13.3777)).await;
        assert_eq!(r.country_name, "Germany");
        assert_eq!(fallback_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_invalid_coordinates_never_call_providers() {
        let (primary, primary_calls) = Canned::new(Ok(None));
        let (fallback, fallback_calls) = Canned::new(Ok(None));
        let resolver = GeocodingResolver::new(Some(primary), fallback);

        let r = resolver.resolve(Coordinates::new(120.0, 0.0)).await;
        assert!(!r.is_resolved());
        assert_eq!(primary_calls.load(Ordering::SeqCst), 0);
        assert_eq!(fallback_calls.load(Ordering::SeqCst), 0);
    }
}
