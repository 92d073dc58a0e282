//! Pin and geocode command handlers
//!
//! `pin` is the map-click flow: reverse geocode the point, match the country
//! name against the reference list, then save a location. An unmatched
//! country stops the flow and asks for `--country`; it is never guessed.

use crate::cli::{non_empty, open_store, parse_country};
use crate::config::Config;
use crate::country::resolve_country_id;
use crate::error::{Error, Result};
use crate::geo::{get_resolver, Coordinates, GeocodeResult};
use crate::models::{Country, CountryId, LocationInput, UserId};
use clap::Args;

/// Pin command arguments
#[derive(Args)]
pub struct PinArgs {
    #[arg(long, allow_hyphen_values = true)]
    pub lat: f64,

    #[arg(long, allow_hyphen_values = true)]
    pub lng: f64,

    /// Override the geocoded place name
    #[arg(long)]
    pub name: Option<String>,

    /// Country id or exact name, when geocoding cannot match one
    #[arg(long)]
    pub country: Option<String>,

    #[arg(long)]
    pub description: Option<String>,

    /// Show what would be saved without saving
    #[arg(long)]
    pub dry_run: bool,
}

/// Geocode command arguments
#[derive(Args)]
pub struct GeocodeArgs {
    #[arg(long, allow_hyphen_values = true)]
    pub lat: f64,

    #[arg(long, allow_hyphen_values = true)]
    pub lng: f64,

    #[arg(long)]
    pub json: bool,
}

/// Pre-fill a location from a geocoding result
///
/// `country_override` wins over the geocoded country name.
pub fn prefill(
    result: &GeocodeResult,
    countries: &[Country],
    name: Option<String>,
    country_override: Option<CountryId>,
) -> Result<LocationInput> {
    let country_id = match country_override {
        Some(id) => id,
        None => resolve_country_id(countries, &result.country_name).ok_or_else(|| {
            if result.is_resolved() {
                Error::Validation(format!(
                    "Country '{}' is not in the country list; pass --country",
                    result.country_name
                ))
            } else {
                Error::Validation("Could not determine a country here; pass --country".to_string())
            }
        })?,
    };

    let name = non_empty(name)
        .or_else(|| non_empty(Some(result.name.clone())))
        .or_else(|| result.city.clone())
        .unwrap_or_else(|| format!("{:.4}, {:.4}", result.coords.lat, result.coords.lng));

    Ok(LocationInput {
        name,
        country_id: Some(country_id),
        city: result.city.clone(),
        state: result.state.clone(),
        latitude: Some(result.coords.lat),
        longitude: Some(result.coords.lng),
        description: None,
    })
}

/// Run the pin command
pub async fn run(args: PinArgs, user: Option<UserId>) -> Result<()> {
    let coords = Coordinates::new(args.lat, args.lng);
    coords.validate()?;

    let config = Config::load()?;
    let resolver = get_resolver(&config)?;
    let store = open_store(&config, user).await?;
    let countries = store.countries().await;

    let result = resolver.resolve(coords).await;
    let country_override = args
        .country
        .as_deref()
        .map(|c| parse_country(&countries, c))
        .transpose()?;

    let mut input = prefill(&result, &countries, args.name, country_override)?;
    input.description = non_empty(args.description);

    if args.dry_run {
        println!("{}", serde_json::to_string_pretty(&input)?);
        return Ok(());
    }

    let location = store.add_location(input).await?;
    println!("Added location {} ({})", location.id, location.name);
    println!("Countries collected: {}", store.summary(config.map.total_countries).await);
    Ok(())
}

/// Run the geocode command
pub async fn run_geocode(args: GeocodeArgs) -> Result<()> {
    let coords = Coordinates::new(args.lat, args.lng);
    coords.validate()?;

    let config = Config::load()?;
    let result = get_resolver(&config)?.resolve(coords).await;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }

    if !result.is_resolved() {
        println!("No country found at {:.5}, {:.5}", coords.lat, coords.lng);
        return Ok(());
    }
    println!("{}", if result.name.is_empty() { "Unknown place" } else { &result.name });
    println!(
        "  Country: {}{}",
        result.country_name,
        result
            .country_code
            .as_deref()
            .map(|c| format!(" ({})", c))
            .unwrap_or_default()
    );
    if let Some(city) = &result.city {
        println!("  City:    {}", city);
    }
    if let Some(state) = &result.state {
        println!("  State:   {}", state);
    }
    println!("  Lat: {:.5}, Lng: {:.5}", coords.lat, coords.lng);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn countries() -> Vec<Country> {
        vec![Country::new(33, "France"), Country::new(49, "Germany")]
    }

    fn geocoded(country: &str) -> GeocodeResult {
        GeocodeResult {
            name: "Eiffel Tower".to_string(),
            country_name: country.to_string(),
            city: Some("Paris".to_string()),
            coords: Coordinates::new(48.8584, 2.2945),
            ..Default::default()
        }
    }

    #[test]
    fn test_prefill_resolves_country() {
        let input = prefill(&geocoded("France"), &countries(), None, None).unwrap();
        assert_eq!(input.name, "Eiffel Tower");
        assert_eq!(input.country_id, Some(CountryId(33)));
        assert_eq!(input.city.as_deref(), Some("Paris"));
        approx::assert_relative_eq!(input.latitude.unwrap(), 48.8584);
        assert!(input.validate().is_ok());
    }

    #[test]
    fn test_prefill_blocks_unmatched_country() {
        let err = prefill(&geocoded("Frankreich"), &countries(), None, None).unwrap_err();
        assert!(err.is_validation());
        assert!(err.to_string().contains("Frankreich"));
    }

    #[test]
    fn test_prefill_empty_result_needs_override() {
        let empty = GeocodeResult::empty(Coordinates::new(0.0, -30.0));
        assert!(prefill(&empty, &countries(), None, None).is_err());

        let input = prefill(&empty, &countries(), Some("Mid-Atlantic".to_string()), Some(CountryId(49))).unwrap();
        assert_eq!(input.name, "Mid-Atlantic");
        assert_eq!(input.country_id, Some(CountryId(49)));
    }

    #[test]
    fn test_prefill_falls_back_to_coordinates_for_name() {
        let empty = GeocodeResult::empty(Coordinates::new(1.5, 2.25));
        let input = prefill(&empty, &countries(), None, Some(CountryId(33))).unwrap();
        assert_eq!(input.name, "1.5000, 2.2500");
    }
}
