//! # Tick Tracker Common Library
//!
//! Shared code for the tick tracker service and its tooling:
//! - Sighting model and store schema
//! - City coordinate table
//! - Configuration loading
//! - Timestamp normalization

pub mod cities;
pub mod config;
pub mod db;
pub mod error;
pub mod time;

pub use cities::{City, CityTable};
pub use error::{Error, Result};
