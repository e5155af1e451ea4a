//! Sighting store: schema, models and writes

pub mod init;
pub mod models;
pub mod sightings;

pub use init::*;
pub use models::*;
pub use sightings::*;
