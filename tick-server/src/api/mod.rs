//! HTTP API handlers for tick-server

pub mod health;
pub mod meta;
pub mod report;
pub mod sightings;
pub mod stats;

pub use health::health_routes;
pub use meta::{categories, list_cities};
pub use report::submit_report;
pub use sightings::{list_sightings, sightings_map, sightings_timeline};
pub use stats::{stats_by_category, stats_by_region, stats_seasonal};
