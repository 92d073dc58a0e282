//! Trips command handler

use crate::cli::{confirm, non_empty, open_store, parse_country};
use crate::config::Config;
use crate::country::find_country;
use crate::error::{Error, Result};
use crate::models::{Country, Trip, TripId, TripInput, UserId};
use chrono::NaiveDate;
use clap::{Args, Subcommand};

/// Trips command arguments
#[derive(Args)]
pub struct TripsArgs {
    #[command(subcommand)]
    pub action: TripAction,
}

#[derive(Subcommand)]
pub enum TripAction {
    /// List trips
    List {
        #[arg(long)]
        json: bool,
    },

    /// Add a trip
    Add(TripFields),

    /// Replace the fields of a trip
    Edit {
        id: TripId,

        #[command(flatten)]
        fields: TripFields,
    },

    /// Delete a trip
    Remove {
        id: TripId,

        #[arg(long, short = 'y')]
        yes: bool,
    },
}

#[derive(Args, Debug, Clone, Default)]
pub struct TripFields {
    #[arg(long)]
    pub name: Option<String>,

    /// Country id or exact name
    #[arg(long)]
    pub country: Option<String>,

    /// Start date (YYYY-MM-DD)
    #[arg(long)]
    pub start: Option<NaiveDate>,

    /// End date (YYYY-MM-DD)
    #[arg(long)]
    pub end: Option<NaiveDate>,

    #[arg(long)]
    pub notes: Option<String>,
}

impl TripFields {
    pub fn apply(self, mut base: TripInput, countries: &[Country]) -> Result<TripInput> {
        if let Some(name) = self.name {
            base.name = name;
        }
        if let Some(country) = self.country {
            base.country_id = Some(parse_country(countries, &country)?);
        }
        if self.start.is_some() {
            base.start_date = self.start;
        }
        if self.end.is_some() {
            base.end_date = self.end;
        }
        if self.notes.is_some() {
            base.notes = non_empty(self.notes);
        }
        Ok(base)
    }
}

/// Run the trips command
pub async fn run(args: TripsArgs, user: Option<UserId>) -> Result<()> {
    let config = Config::load()?;
    let store = open_store(&config, user).await?;
    let countries = store.countries().await;

    match args.action {
        TripAction::List { json } => {
            let trips = store.trips().await;
            if json {
                println!("{}", serde_json::to_string_pretty(&trips)?);
            } else {
                print_trips(&trips, &countries);
            }
        }

        TripAction::Add(fields) => {
            let input = fields.apply(TripInput::default(), &countries)?;
            let trip = store.add_trip(input).await?;
            println!("Added trip {} ({})", trip.id, trip.name);
        }

        TripAction::Edit { id, fields } => {
            let current = store
                .trips()
                .await
                .into_iter()
                .find(|t| t.id == id)
                .ok_or_else(|| Error::Validation(format!("No trip with id {}", id)))?;
            let input = fields.apply(current.to_input(), &countries)?;
            let trip = store.update_trip(id, input).await?;
            println!("Updated trip {} ({})", trip.id, trip.name);
        }

        TripAction::Remove { id, yes } => {
            if !confirm(&format!("Are you sure you want to delete trip {}?", id), yes)? {
                println!("Cancelled");
                return Ok(());
            }
            store.remove_trip(id).await?;
            println!("Deleted trip {}", id);
        }
    }

    Ok(())
}

fn format_range(start: Option<NaiveDate>, end: Option<NaiveDate>) -> String {
    match (start, end) {
        (Some(s), Some(e)) => format!("{} - {}", s, e),
        (Some(s), None) => format!("from {}", s),
        (None, Some(e)) => format!("until {}", e),
        (None, None) => String::new(),
    }
}

fn print_trips(trips: &[Trip], countries: &[Country]) {
    if trips.is_empty() {
        println!("No trips yet");
        return;
    }

    for trip in trips {
        let country = trip
            .country_id
            .and_then(|id| find_country(countries, id))
            .map(|c| c.name.as_str())
            .unwrap_or("-");
        println!(
            "{:>5}  {}  [{}]  {}",
            trip.id,
            trip.name,
            country,
            format_range(trip.start_date, trip.end_date)
        );
        if let Some(notes) = &trip.notes {
            println!("       {}", notes);
        }
    }
}
