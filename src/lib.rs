//! travel-tracker: visited places, trips and countries over a REST backend
//!
//! A library and CLI that keeps a local view of a user's travel data in sync
//! with a remote backend, resolves clicked coordinates to countries, and
//! derives which countries have been visited.
//!
//! ## Features
//!
//! - REST client for users, countries, locations, trips and user-countries
//! - Reverse geocoding with MapTiler and a Nominatim fallback
//! - Server-confirmed store with stale-response protection
//! - Visited-country projection and boundary-dataset key mapping
//!
//! ## Quick Start
//!
//! ```no_run
//! use travel_tracker::api::ApiClient;
//! use travel_tracker::models::{CountryId, LocationInput, UserId};
//! use travel_tracker::store::TravelStore;
//!
//! # async fn demo() -> travel_tracker::Result<()> {
//! let client = ApiClient::new("http://localhost:5001")?;
//! let store = TravelStore::new(client, UserId(1));
//! store.load().await;
//!
//! let input = LocationInput::new("Eiffel Tower", Some(CountryId(33)));
//! let created = store.add_location(input).await?;
//! println!("Saved location {}", created.id);
//! println!("Countries visited: {}", store.summary(195).await);
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod cli;
pub mod config;
pub mod constants;
pub mod country;
pub mod error;
pub mod geo;
pub mod models;
pub mod normalize;
pub mod store;
pub mod visited;

// Re-export commonly used types
pub use config::Config;
pub use error::{Error, Result};
pub use geo::{Coordinates, GeocodeResult};
pub use store::TravelStore;
