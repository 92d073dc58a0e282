//! Travel data model
//!
//! Entities as the client sees them after normalization. Every entity
//! deserializes through a raw mirror struct so that backend key variants
//! (`location_id` vs `id`, `country` vs `name`, `title` vs `name`) collapse
//! into one canonical schema; serialization always emits the canonical names.

use crate::error::{Error, Result};
use crate::geo::Coordinates;
use crate::normalize;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! id_type {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub i64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl std::str::FromStr for $name {
            type Err = String;

            fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
                s.trim()
                    .parse()
                    .map($name)
                    .map_err(|_| format!("Invalid {}: {}", stringify!($name), s))
            }
        }
    };
}

id_type!(
    /// Backend user identifier
    UserId
);
id_type!(
    /// Canonical country identifier
    CountryId
);
id_type!(LocationId);
id_type!(TripId);
id_type!(UserCountryId);

/// A backend user (read-only)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawUser")]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub email: Option<String>,
}

#[derive(Deserialize)]
struct RawUser {
    id: Option<UserId>,
    user_id: Option<UserId>,
    #[serde(default, deserialize_with = "normalize::opt_string")]
    name: Option<String>,
    #[serde(default, deserialize_with = "normalize::opt_string")]
    username: Option<String>,
    #[serde(default, deserialize_with = "normalize::opt_string")]
    email: Option<String>,
}

impl TryFrom<RawUser> for User {
    type Error = String;

    fn try_from(raw: RawUser) -> std::result::Result<Self, Self::Error> {
        Ok(Self {
            id: raw.id.or(raw.user_id).ok_or("user without id")?,
            name: raw.name.or(raw.username).unwrap_or_default(),
            email: raw.email,
        })
    }
}

/// A country from the static reference set
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawCountry")]
pub struct Country {
    pub id: CountryId,
    pub name: String,
    /// ISO code if the backend ships one
    pub iso_code: Option<String>,
}

#[derive(Deserialize)]
struct RawCountry {
    id: Option<CountryId>,
    country_id: Option<CountryId>,
    #[serde(default, deserialize_with = "normalize::opt_string")]
    name: Option<String>,
    #[serde(default, deserialize_with = "normalize::opt_string")]
    country: Option<String>,
    #[serde(default, alias = "code", deserialize_with = "normalize::opt_string")]
    iso_code: Option<String>,
}

impl TryFrom<RawCountry> for Country {
    type Error = String;

    fn try_from(raw: RawCountry) -> std::result::Result<Self, Self::Error> {
        Ok(Self {
            id: raw.id.or(raw.country_id).ok_or("country without id")?,
            name: raw.name.or(raw.country).ok_or("country without name")?,
            iso_code: raw.iso_code,
        })
    }
}

impl Country {
    pub fn new(id: i64, name: impl Into<String>) -> Self {
        Self {
            id: CountryId(id),
            name: name.into(),
            iso_code: None,
        }
    }
}

/// A persisted location
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawLocation")]
pub struct Location {
    pub id: LocationId,
    pub user_id: Option<UserId>,
    pub name: String,
    pub country_id: Option<CountryId>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub description: Option<String>,
}

#[derive(Deserialize)]
struct RawLocation {
    id: Option<LocationId>,
    location_id: Option<LocationId>,
    user_id: Option<UserId>,
    #[serde(default)]
    name: String,
    country_id: Option<CountryId>,
    #[serde(default, deserialize_with = "normalize::opt_string")]
    city: Option<String>,
    #[serde(default, deserialize_with = "normalize::opt_string")]
    state: Option<String>,
    #[serde(default, alias = "lat", deserialize_with = "normalize::opt_f64")]
    latitude: Option<f64>,
    #[serde(default, alias = "lng", deserialize_with = "normalize::opt_f64")]
    longitude: Option<f64>,
    #[serde(default, deserialize_with = "normalize::opt_string")]
    description: Option<String>,
}

impl TryFrom<RawLocation> for Location {
    type Error = String;

    fn try_from(raw: RawLocation) -> std::result::Result<Self, Self::Error> {
        Ok(Self {
            id: raw.id.or(raw.location_id).ok_or("location without id")?,
            user_id: raw.user_id,
            name: raw.name,
            country_id: raw.country_id,
            city: raw.city,
            state: raw.state,
            latitude: raw.latitude,
            longitude: raw.longitude,
            description: raw.description,
        })
    }
}

impl Location {
    /// Coordinates, when both halves are present
    pub fn coordinates(&self) -> Option<Coordinates> {
        Some(Coordinates::new(self.latitude?, self.longitude?))
    }

    /// Editable fields of this location, as a starting point for an update
    pub fn to_input(&self) -> LocationInput {
        LocationInput {
            name: self.name.clone(),
            country_id: self.country_id,
            city: self.city.clone(),
            state: self.state.clone(),
            latitude: self.latitude,
            longitude: self.longitude,
            description: self.description.clone(),
        }
    }
}

/// Editable fields of a location (create and full-replace update)
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LocationInput {
    pub name: String,
    pub country_id: Option<CountryId>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub description: Option<String>,
}

impl LocationInput {
    pub fn new(name: impl Into<String>, country_id: Option<CountryId>) -> Self {
        Self {
            name: name.into(),
            country_id,
            ..Default::default()
        }
    }

    pub fn with_coordinates(mut self, coords: Coordinates) -> Self {
        self.latitude = Some(coords.lat);
        self.longitude = Some(coords.lng);
        self
    }

    /// Check required fields before anything is sent
    pub fn validate(&self) -> Result<()> {
        require_name(&self.name, "Location")?;
        require_country(self.country_id, "Location")?;
        match (self.latitude, self.longitude) {
            (Some(lat), Some(lng)) => Coordinates::new(lat, lng).validate(),
            (None, None) => Ok(()),
            _ => Err(Error::InvalidCoordinates(
                "latitude and longitude must be given together".to_string(),
            )),
        }
    }
}

/// A persisted trip
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawTrip")]
pub struct Trip {
    pub id: TripId,
    pub user_id: Option<UserId>,
    pub name: String,
    pub country_id: Option<CountryId>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub notes: Option<String>,
}

#[derive(Deserialize)]
struct RawTrip {
    id: Option<TripId>,
    trip_id: Option<TripId>,
    user_id: Option<UserId>,
    #[serde(default, deserialize_with = "normalize::opt_string")]
    name: Option<String>,
    #[serde(default, deserialize_with = "normalize::opt_string")]
    title: Option<String>,
    country_id: Option<CountryId>,
    #[serde(default, deserialize_with = "normalize::opt_date")]
    start_date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "normalize::opt_date")]
    end_date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "normalize::opt_string")]
    notes: Option<String>,
    #[serde(default, deserialize_with = "normalize::opt_string")]
    description: Option<String>,
}

impl TryFrom<RawTrip> for Trip {
    type Error = String;

    fn try_from(raw: RawTrip) -> std::result::Result<Self, Self::Error> {
        Ok(Self {
            id: raw.id.or(raw.trip_id).ok_or("trip without id")?,
            user_id: raw.user_id,
            name: raw.name.or(raw.title).unwrap_or_default(),
            country_id: raw.country_id,
            start_date: raw.start_date,
            end_date: raw.end_date,
            notes: raw.notes.or(raw.description),
        })
    }
}

impl Trip {
    pub fn to_input(&self) -> TripInput {
        TripInput {
            name: self.name.clone(),
            country_id: self.country_id,
            start_date: self.start_date,
            end_date: self.end_date,
            notes: self.notes.clone(),
        }
    }
}

/// Editable fields of a trip
///
/// `end_date >= start_date` is not checked here; the backend owns that rule.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TripInput {
    pub name: String,
    pub country_id: Option<CountryId>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub notes: Option<String>,
}

impl TripInput {
    pub fn new(name: impl Into<String>, country_id: Option<CountryId>) -> Self {
        Self {
            name: name.into(),
            country_id,
            ..Default::default()
        }
    }

    pub fn validate(&self) -> Result<()> {
        require_name(&self.name, "Trip")?;
        require_country(self.country_id, "Trip")
    }
}

/// A country the user has marked as visited
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawUserCountry")]
pub struct UserCountry {
    pub id: UserCountryId,
    pub user_id: Option<UserId>,
    pub country_id: CountryId,
    pub visited_at: Option<NaiveDate>,
    pub notes: Option<String>,
}

#[derive(Deserialize)]
struct RawUserCountry {
    id: Option<UserCountryId>,
    user_country_id: Option<UserCountryId>,
    user_id: Option<UserId>,
    country_id: CountryId,
    #[serde(default, deserialize_with = "normalize::opt_date")]
    visited_at: Option<NaiveDate>,
    #[serde(default, deserialize_with = "normalize::opt_string")]
    notes: Option<String>,
}

impl TryFrom<RawUserCountry> for UserCountry {
    type Error = String;

    fn try_from(raw: RawUserCountry) -> std::result::Result<Self, Self::Error> {
        Ok(Self {
            id: raw.id.or(raw.user_country_id).ok_or("user country without id")?,
            user_id: raw.user_id,
            country_id: raw.country_id,
            visited_at: raw.visited_at,
            notes: raw.notes,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserCountryInput {
    pub country_id: CountryId,
    pub visited_at: Option<NaiveDate>,
    pub notes: Option<String>,
}

impl UserCountryInput {
    pub fn new(country_id: CountryId) -> Self {
        Self {
            country_id,
            visited_at: None,
            notes: None,
        }
    }
}

/// Visited-country counter ("12/195")
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VisitedSummary {
    pub visited: usize,
    pub total: usize,
}

impl fmt::Display for VisitedSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.visited, self.total)
    }
}

/// Collection counts for the active user
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TravelStats {
    pub countries: usize,
    pub trips: usize,
    pub locations: usize,
}

fn require_name(name: &str, what: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(Error::Validation(format!("{} name is required", what)));
    }
    Ok(())
}

fn require_country(country_id: Option<CountryId>, what: &str) -> Result<()> {
    if country_id.is_none() {
        return Err(Error::Validation(format!(
            "{} country is unresolved; pick a country manually",
            what
        )));
    }
    Ok(())
}
