//! CLI command handlers
//!
//! Each subcommand has its own module with handler functions.

pub mod config;
pub mod countries;
pub mod locations;
pub mod pin;
pub mod status;
pub mod trips;

use crate::api::ApiClient;
use crate::config::Config;
use crate::country::resolve_country_id;
use crate::error::{Error, Result};
use crate::models::{Country, CountryId, UserId};
use crate::store::{Collection, TravelStore};
use clap::{Parser, Subcommand};
use std::io::{self, BufRead, Write};
use tracing_subscriber::EnvFilter;

/// Track visited places, trips and countries
#[derive(Parser)]
#[command(name = "travel-tracker")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Act as this user instead of the configured one
    #[arg(long, global = true)]
    pub user: Option<i64>,

    /// Verbose logging
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Manage saved locations
    Locations(locations::LocationsArgs),

    /// Manage trips
    Trips(trips::TripsArgs),

    /// Country reference list and visited marks
    Countries(countries::CountriesArgs),

    /// Visited-country counter and boundary keys
    Visited(countries::VisitedArgs),

    /// Save a location from a coordinate pair (map click)
    Pin(pin::PinArgs),

    /// Reverse geocode a coordinate pair
    Geocode(pin::GeocodeArgs),

    /// Manage configuration
    Config(config::ConfigArgs),

    /// Show backend status and collection counts
    Status(status::StatusArgs),
}

/// Run the CLI
pub async fn run() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let default_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(io::stderr)
        .init();

    let user = cli.user.map(UserId);
    match cli.command {
        Commands::Locations(args) => locations::run(args, user).await,
        Commands::Trips(args) => trips::run(args, user).await,
        Commands::Countries(args) => countries::run(args, user).await,
        Commands::Visited(args) => countries::run_visited(args, user).await,
        Commands::Pin(args) => pin::run(args, user).await,
        Commands::Geocode(args) => pin::run_geocode(args).await,
        Commands::Config(args) => config::run(args),
        Commands::Status(args) => status::run(args, user).await,
    }
}

/// Build a loaded store for the configured (or overridden) user
pub(crate) async fn open_store(config: &Config, user: Option<UserId>) -> Result<TravelStore<ApiClient>> {
    let client = ApiClient::from_config(&config.api)?;
    let store = TravelStore::new(client, user.unwrap_or_else(|| config.user_id()));
    store.load().await;
    report_load_errors(&store).await;
    Ok(store)
}

/// Print a banner for collections that failed to load
pub(crate) async fn report_load_errors(store: &TravelStore<ApiClient>) {
    let Some(error) = store.error().await else {
        return;
    };
    eprintln!("Warning: {}", error);
    for collection in Collection::ALL {
        if let Some(detail) = store.collection_error(collection).await {
            eprintln!("  {}: {}", collection, detail);
        }
    }
    if store.countries().await.is_empty() {
        eprintln!("  Country list unavailable; visited counts will read 0");
    }
}

/// Accept a country as canonical id or exact name
pub(crate) fn parse_country(countries: &[Country], value: &str) -> Result<CountryId> {
    if let Ok(id) = value.parse::<CountryId>() {
        if countries.iter().any(|c| c.id == id) {
            return Ok(id);
        }
    }
    resolve_country_id(countries, value)
        .ok_or_else(|| Error::Validation(format!("Unknown country: {}", value)))
}

/// Ask before a destructive action
pub(crate) fn confirm(prompt: &str, assume_yes: bool) -> Result<bool> {
    if assume_yes {
        return Ok(true);
    }
    print!("{} [y/N] ", prompt);
    io::stdout().flush()?;

    let mut answer = String::new();
    io::stdin().lock().read_line(&mut answer)?;
    Ok(matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"))
}

/// Non-empty optional text from a flag
pub(crate) fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
