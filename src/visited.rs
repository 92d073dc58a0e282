//! Visited-country projection
//!
//! The visited set is always expressed in canonical [`CountryId`]s. The
//! boundary dataset used for map highlighting keys its polygons differently
//! (usually ISO alpha-3), so conversion happens exactly once, through
//! [`BoundaryKeyMap`], at the edge where highlighting needs it.

use crate::error::{Error, Result};
use crate::models::{Country, CountryId, Location, VisitedSummary};
use serde::Deserialize;
use serde_json::Value;
use std::collections::{BTreeSet, HashMap, HashSet};
use std::fs;
use std::path::Path;

/// Derive the set of visited countries from a user's locations
///
/// Locations without a country, or pointing at a country that is not in
/// the reference list, are skipped.
pub fn project(locations: &[Location], countries: &[Country]) -> BTreeSet<CountryId> {
    let known: HashSet<CountryId> = countries.iter().map(|c| c.id).collect();
    locations
        .iter()
        .filter_map(|l| l.country_id)
        .filter(|id| known.contains(id))
        .collect()
}

/// Counter for the visited set
pub fn summarize(visited: &BTreeSet<CountryId>, total: usize) -> VisitedSummary {
    VisitedSummary {
        visited: visited.len(),
        total,
    }
}

#[derive(Debug, Deserialize)]
struct FeatureCollection {
    #[serde(default)]
    features: Vec<Feature>,
}

#[derive(Debug, Deserialize)]
struct Feature {
    #[serde(default)]
    id: Option<Value>,
    #[serde(default)]
    properties: HashMap<String, Value>,
}

const KEY_PROPERTIES: &[&str] = &["ISO_A3", "iso_a3", "ISO3166-1-Alpha-3", "ADM0_A3"];
const NAME_PROPERTIES: &[&str] = &["name", "NAME", "ADMIN", "name_en"];

fn first_string(properties: &HashMap<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|k| properties.get(*k))
        .filter_map(Value::as_str)
        .find(|s| !s.is_empty() && *s != "-99")
        .map(String::from)
}

impl Feature {
    fn key(&self) -> Option<String> {
        match &self.id {
            Some(Value::String(s)) if !s.is_empty() => Some(s.clone()),
            _ => first_string(&self.properties, KEY_PROPERTIES),
        }
    }
}

/// Names and keys of a country boundary dataset
#[derive(Debug, Clone, Default)]
pub struct BoundaryIndex {
    by_name: HashMap<String, String>,
    keys: HashSet<String>,
}

impl BoundaryIndex {
    /// Index a GeoJSON feature collection
    pub fn from_geojson(json: &str) -> Result<Self> {
        let collection: FeatureCollection = serde_json::from_str(json)?;
        let mut index = Self::default();

        for feature in collection.features {
            let Some(key) = feature.key() else {
                continue;
            };
            if let Some(name) = first_string(&feature.properties, NAME_PROPERTIES) {
                index.by_name.insert(name.to_lowercase(), key.clone());
            }
            index.keys.insert(key);
        }

        Ok(index)
    }

    /// Load a boundary dataset from disk
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            Error::Config(format!(
                "Failed to read boundary dataset {}: {}",
                path.display(),
                e
            ))
        })?;
        Self::from_geojson(&content)
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

/// Canonical id to boundary-dataset key
#[derive(Debug, Clone, Default)]
pub struct BoundaryKeyMap {
    keys: HashMap<CountryId, String>,
}

impl BoundaryKeyMap {
    /// Pair every country with its polygon key
    ///
    /// A country's own ISO code wins when the dataset knows it; otherwise the
    /// display name is matched case-insensitively, as in country resolution.
    pub fn build(countries: &[Country], index: &BoundaryIndex) -> Self {
        let mut keys = HashMap::new();
        for country in countries {
            let by_code = country
                .iso_code
                .as_ref()
                .map(|c| c.to_uppercase())
                .filter(|c| index.keys.contains(c));
            let key = by_code.or_else(|| index.by_name.get(&country.name.to_lowercase()).cloned());
            if let Some(key) = key {
                keys.insert(country.id, key);
            }
        }
        Self { keys }
    }

    pub fn key(&self, id: CountryId) -> Option<&str> {
        self.keys.get(&id).map(String::as_str)
    }

    /// Boundary keys to highlight for a visited set
    pub fn highlight(&self, visited: &BTreeSet<CountryId>) -> BTreeSet<String> {
        visited
            .iter()
            .filter_map(|id| self.keys.get(id).cloned())
            .collect()
    }

    /// Visited countries that have no polygon in the dataset
    pub fn unmapped(&self, visited: &BTreeSet<CountryId>) -> Vec<CountryId> {
        visited
            .iter()
            .filter(|id| !self.keys.contains_key(id))
            .copied()
            .collect()
    }
}
