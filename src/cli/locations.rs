//! Locations command handler
//!
//! List, add, edit and remove saved locations.

use crate::cli::{confirm, non_empty, open_store, parse_country};
use crate::config::Config;
use crate::country::find_country;
use crate::error::{Error, Result};
use crate::models::{Country, Location, LocationId, LocationInput, UserId};
use clap::{Args, Subcommand};

/// Locations command arguments
#[derive(Args)]
pub struct LocationsArgs {
    #[command(subcommand)]
    pub action: LocationAction,
}

#[derive(Subcommand)]
pub enum LocationAction {
    /// List saved locations
    List {
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Add a location
    Add(LocationFields),

    /// Replace the fields of a location
    Edit {
        id: LocationId,

        #[command(flatten)]
        fields: LocationFields,
    },

    /// Delete a location
    Remove {
        id: LocationId,

        /// Skip the confirmation prompt
        #[arg(long, short = 'y')]
        yes: bool,
    },
}

/// Editable location fields; on edit, omitted flags keep their value
#[derive(Args, Debug, Clone, Default)]
pub struct LocationFields {
    #[arg(long)]
    pub name: Option<String>,

    /// Country id or exact name
    #[arg(long)]
    pub country: Option<String>,

    #[arg(long)]
    pub city: Option<String>,

    #[arg(long)]
    pub state: Option<String>,

    #[arg(long, allow_hyphen_values = true)]
    pub lat: Option<f64>,

    #[arg(long, allow_hyphen_values = true)]
    pub lng: Option<f64>,

    #[arg(long)]
    pub description: Option<String>,
}

impl LocationFields {
    /// Overlay the given flags onto `base`
    pub fn apply(self, mut base: LocationInput, countries: &[Country]) -> Result<LocationInput> {
        if let Some(name) = self.name {
            base.name = name;
        }
        if let Some(country) = self.country {
            base.country_id = Some(parse_country(countries, &country)?);
        }
        if self.city.is_some() {
            base.city = non_empty(self.city);
        }
        if self.state.is_some() {
            base.state = non_empty(self.state);
        }
        if self.lat.is_some() {
            base.latitude = self.lat;
        }
        if self.lng.is_some() {
            base.longitude = self.lng;
        }
        if self.description.is_some() {
            base.description = non_empty(self.description);
        }
        Ok(base)
    }
}

/// Run the locations command
pub async fn run(args: LocationsArgs, user: Option<UserId>) -> Result<()> {
    let config = Config::load()?;
    let store = open_store(&config, user).await?;
    let countries = store.countries().await;

    match args.action {
        LocationAction::List { json } => {
            let locations = store.locations().await;
            if json {
                println!("{}", serde_json::to_string_pretty(&locations)?);
            } else {
                print_locations(&locations, &countries);
            }
        }

        LocationAction::Add(fields) => {
            let input = fields.apply(LocationInput::default(), &countries)?;
            let location = store.add_location(input).await?;
            println!("Added location {} ({})", location.id, location.name);
        }

        LocationAction::Edit { id, fields } => {
            let current = store
                .locations()
                .await
                .into_iter()
                .find(|l| l.id == id)
                .ok_or_else(|| Error::Validation(format!("No location with id {}", id)))?;
            let input = fields.apply(current.to_input(), &countries)?;
            let location = store.update_location(id, input).await?;
            println!("Updated location {} ({})", location.id, location.name);
        }

        LocationAction::Remove { id, yes } => {
            if !confirm(&format!("Delete location {}?", id), yes)? {
                println!("Cancelled");
                return Ok(());
            }
            store.remove_location(id).await?;
            println!("Deleted location {}", id);
        }
    }

    Ok(())
}

fn print_locations(locations: &[Location], countries: &[Country]) {
    if locations.is_empty() {
        println!("No locations saved");
        return;
    }

    for location in locations {
        let country = location
            .country_id
            .and_then(|id| find_country(countries, id))
            .map(|c| c.name.as_str())
            .unwrap_or("-");
        let place = [location.city.as_deref(), location.state.as_deref()]
            .into_iter()
            .flatten()
            .collect::<Vec<_>>()
            .join(", ");

        print!("{:>5}  {}  [{}]", location.id, location.name, country);
        if !place.is_empty() {
            print!("  {}", place);
        }
        if let Some(coords) = location.coordinates() {
            print!("  ({:.5}, {:.5})", coords.lat, coords.lng);
        }
        println!();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CountryId;

    fn countries() -> Vec<Country> {
        vec![Country::new(33, "France"), Country::new(39, "Italy")]
    }

    #[test]
    fn test_apply_keeps_unset_fields() {
        let base = LocationInput {
            name: "Colosseum".to_string(),
            country_id: Some(CountryId(39)),
            city: Some("Rome".to_string()),
            ..Default::default()
        };
        let fields = LocationFields {
            description: Some("Arena".to_string()),
            ..Default::default()
        };

        let input = fields.apply(base, &countries()).unwrap();
        assert_eq!(input.name, "Colosseum");
        assert_eq!(input.city.as_deref(), Some("Rome"));
        assert_eq!(input.description.as_deref(), Some("Arena"));
    }

    #[test]
    fn test_apply_clears_with_empty_value() {
        let base = LocationInput {
            name: "Louvre".to_string(),
            city: Some("Paris".to_string()),
            ..Default::default()
        };
        let fields = LocationFields {
            city: Some(String::new()),
            country: Some("France".to_string()),
            ..Default::default()
        };

        let input = fields.apply(base, &countries()).unwrap();
        assert!(input.city.is_none());
        assert_eq!(input.country_id, Some(CountryId(33)));
    }

    #[test]
    fn test_apply_unknown_country() {
        let fields = LocationFields {
            country: Some("Narnia".to_string()),
            ..Default::default()
        };
        assert!(fields.apply(LocationInput::default(), &countries()).is_err());
    }
}
