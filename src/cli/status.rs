//! Status command handler
//!
//! Shows backend reachability and per-collection counts.

use crate::cli::open_store;
use crate::config::Config;
use crate::error::Result;
use crate::models::UserId;
use crate::store::Collection;
use clap::Args;

/// Status command arguments
#[derive(Args)]
pub struct StatusArgs {
    /// Print JSON instead of text
    #[arg(long)]
    pub json: bool,
}

/// Run the status command
pub async fn run(args: StatusArgs, user: Option<UserId>) -> Result<()> {
    let config = Config::load()?;
    let store = open_store(&config, user).await?;
    let stats = store.stats().await;
    let summary = store.summary(config.map.total_countries).await;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
        return Ok(());
    }

    println!("travel-tracker v{}", env!("CARGO_PKG_VERSION"));
    println!();
    println!("Backend: {}", store.api().base_url());
    println!("User:    {}", store.user().await);
    println!();

    let data = store.snapshot().await;
    for collection in Collection::ALL {
        match store.collection_error(collection).await {
            Some(e) => println!("  {:<15} ERROR ({})", collection, e),
            None => println!("  {:<15} {}", collection, data.len(collection)),
        }
    }
    println!();
    println!("Countries collected: {}", summary);
    println!("Trips: {}  Locations: {}", stats.trips, stats.locations);

    Ok(())
}
