//! Countries and visited command handlers
//!
//! Shows the country reference list, manages the user's visited marks, and
//! prints the visited counter with optional boundary-dataset keys.

use crate::cli::{confirm, non_empty, open_store, parse_country};
use crate::config::Config;
use crate::country::find_country;
use crate::error::Result;
use crate::models::{UserCountryId, UserCountryInput, UserId};
use crate::visited::{BoundaryIndex, BoundaryKeyMap};
use chrono::NaiveDate;
use clap::{Args, Subcommand};
use serde::Serialize;
use std::path::PathBuf;

/// Countries command arguments
#[derive(Args)]
pub struct CountriesArgs {
    #[command(subcommand)]
    pub action: CountryAction,
}

#[derive(Subcommand)]
pub enum CountryAction {
    /// List all countries, marking visited ones
    List {
        /// Only countries with at least one location
        #[arg(long)]
        visited: bool,
    },

    /// Mark a country as visited
    Mark {
        /// Country id or exact name
        country: String,

        #[arg(long)]
        visited_at: Option<NaiveDate>,

        #[arg(long)]
        notes: Option<String>,
    },

    /// Remove a visited mark
    Unmark {
        id: UserCountryId,

        #[arg(long, short = 'y')]
        yes: bool,
    },

    /// List visited marks
    Marks,
}

/// Visited command arguments
#[derive(Args)]
pub struct VisitedArgs {
    /// GeoJSON boundary dataset (defaults to map.boundaries)
    #[arg(long)]
    pub boundaries: Option<PathBuf>,

    #[arg(long)]
    pub json: bool,
}

#[derive(Serialize)]
struct VisitedReport {
    visited: usize,
    total: usize,
    countries: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    boundary_keys: Option<Vec<String>>,
}

/// Run the countries command
pub async fn run(args: CountriesArgs, user: Option<UserId>) -> Result<()> {
    let config = Config::load()?;
    let store = open_store(&config, user).await?;
    let countries = store.countries().await;

    match args.action {
        CountryAction::List { visited } => {
            let visited_ids = store.visited().await;
            for country in &countries {
                let seen = visited_ids.contains(&country.id);
                if visited && !seen {
                    continue;
                }
                println!(
                    "{} {:>5}  {}",
                    if seen { "*" } else { " " },
                    country.id,
                    country.name
                );
            }
        }

        CountryAction::Mark {
            country,
            visited_at,
            notes,
        } => {
            let mut input = UserCountryInput::new(parse_country(&countries, &country)?);
            input.visited_at = visited_at;
            input.notes = non_empty(notes);
            let mark = store.add_user_country(input).await?;
            println!("Marked country {} as visited (mark {})", mark.country_id, mark.id);
        }

        CountryAction::Unmark { id, yes } => {
            if !confirm(&format!("Remove visited mark {}?", id), yes)? {
                println!("Cancelled");
                return Ok(());
            }
            store.remove_user_country(id).await?;
            println!("Removed visited mark {}", id);
        }

        CountryAction::Marks => {
            let marks = store.snapshot().await.user_countries;
            if marks.is_empty() {
                println!("No visited marks");
            }
            for mark in marks {
                let name = find_country(&countries, mark.country_id)
                    .map(|c| c.name.clone())
                    .unwrap_or_else(|| mark.country_id.to_string());
                let date = mark.visited_at.map(|d| d.to_string()).unwrap_or_default();
                println!("{:>5}  {}  {}", mark.id, name, date);
            }
        }
    }

    Ok(())
}

/// Run the visited command
pub async fn run_visited(args: VisitedArgs, user: Option<UserId>) -> Result<()> {
    let config = Config::load()?;
    let store = open_store(&config, user).await?;
    let countries = store.countries().await;
    let visited = store.visited().await;
    let summary = store.summary(config.map.total_countries).await;

    let names: Vec<String> = visited
        .iter()
        .filter_map(|id| find_country(&countries, *id))
        .map(|c| c.name.clone())
        .collect();

    let boundary_path = args.boundaries.or(config.map.boundaries.clone());
    let mut unmapped = Vec::new();
    let boundary_keys = match boundary_path {
        Some(path) => {
            let index = BoundaryIndex::load(&path)?;
            let keys = BoundaryKeyMap::build(&countries, &index);
            unmapped = keys.unmapped(&visited);
            Some(keys.highlight(&visited).into_iter().collect::<Vec<_>>())
        }
        None => None,
    };

    if args.json {
        let report = VisitedReport {
            visited: summary.visited,
            total: summary.total,
            countries: names,
            boundary_keys,
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("Countries collected: {}", summary);
    for name in &names {
        println!("  {}", name);
    }
    if let Some(keys) = boundary_keys {
        println!();
        println!("Highlight: {}", keys.join(" "));
        for id in unmapped {
            let name = find_country(&countries, id)
                .map(|c| c.name.as_str())
                .unwrap_or("?");
            eprintln!("Warning: no boundary for {} ({})", name, id);
        }
    }

    Ok(())
}
