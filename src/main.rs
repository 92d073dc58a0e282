//! travel-tracker CLI entry point
//!
//! Track visited places and trips against a travel backend

use travel_tracker::cli;

#[tokio::main]
async fn main() {
    if let Err(e) = cli::run().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
