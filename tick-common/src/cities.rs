//! City coordinate table
//!
//! Sightings only carry a city name, so map coordinates come from a fixed
//! lookup table built once at startup. The table is immutable after
//! construction and shared read-only by ingestion, submission and the
//! metadata endpoints.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One entry of the coordinate table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct City {
    pub name: String,
    pub lat: f64,
    pub lng: f64,
}

/// Built-in UK cities present in the seed dataset
const DEFAULT_CITIES: &[(&str, f64, f64)] = &[
    ("London", 51.5074, -0.1278),
    ("Manchester", 53.4808, -2.2426),
    ("Birmingham", 52.4862, -1.8904),
    ("Leeds", 53.8008, -1.5491),
    ("Edinburgh", 55.9533, -3.1883),
    ("Glasgow", 55.8642, -4.2518),
    ("Bristol", 51.4545, -2.5879),
    ("Liverpool", 53.4084, -2.9916),
    ("Sheffield", 53.3811, -1.4701),
    ("Newcastle", 54.9783, -1.6178),
    ("Nottingham", 52.9548, -1.1581),
    ("Cardiff", 51.4816, -3.1791),
    ("Southampton", 50.9097, -1.4044),
    ("Leicester", 52.6369, -1.1398),
];

/// Immutable city name → coordinate mapping
///
/// Lookups are case-insensitive, matching how locations are filtered.
#[derive(Debug, Clone)]
pub struct CityTable {
    /// Keyed by lowercased name, value keeps the canonical casing
    entries: BTreeMap<String, City>,
}

impl CityTable {
    /// Build a table from explicit entries
    ///
    /// A later entry with the same (case-folded) name replaces an earlier one.
    pub fn new(cities: impl IntoIterator<Item = City>) -> Self {
        let entries = cities
            .into_iter()
            .map(|city| (city.name.to_lowercase(), city))
            .collect();
        Self { entries }
    }

    /// The built-in UK table
    pub fn uk_defaults() -> Self {
        Self::new(DEFAULT_CITIES.iter().map(|(name, lat, lng)| City {
            name: (*name).to_string(),
            lat: *lat,
            lng: *lng,
        }))
    }

    /// Resolve coordinates for a location, `None` when the city is unknown
    pub fn coordinates(&self, location: &str) -> Option<(f64, f64)> {
        self.entries
            .get(&location.trim().to_lowercase())
            .map(|city| (city.lat, city.lng))
    }

    /// All cities sorted by name
    pub fn sorted(&self) -> Vec<City> {
        let mut cities: Vec<City> = self.entries.values().cloned().collect();
        cities.sort_by(|a, b| a.name.cmp(&b.name));
        cities
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for CityTable {
    fn default() -> Self {
        Self::uk_defaults()
    }
}
