//! Common error types for the tick tracker

use thiserror::Error;

/// Common result type for tick tracker operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors shared by the store, configuration and ingestion layers
#[derive(Error, Debug)]
pub enum Error {
    /// Sighting store failure (wraps sqlx::Error)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// File system failure reading a snapshot, config or upload
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON snapshot could not be decoded
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Filter, pagination or submission value rejected before reaching the store
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl Error {
    /// True for errors caused by the caller rather than the service
    pub fn is_client_error(&self) -> bool {
        matches!(self, Error::InvalidInput(_))
    }
}
