//! Country identity resolution
//!
//! Maps a free-text country name from geocoding onto the backend's canonical
//! country id. Matching is exact up to case: "Deutschland" never matches
//! "Germany". A `None` must block submission until the user picks a country.

use crate::models::{Country, CountryId};

/// Resolve a country name to its canonical id
pub fn resolve_country_id(countries: &[Country], name: &str) -> Option<CountryId> {
    if name.is_empty() {
        return None;
    }
    let wanted = name.to_lowercase();
    countries
        .iter()
        .find(|c| c.name.to_lowercase() == wanted)
        .map(|c| c.id)
}

/// Look up a country by canonical id
pub fn find_country(countries: &[Country], id: CountryId) -> Option<&Country> {
    countries.iter().find(|c| c.id == id)
}
