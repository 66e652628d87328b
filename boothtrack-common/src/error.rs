//! Common error types for BoothTrack

use thiserror::Error;

use crate::time::NormalizationError;
use crate::validate::ValidationFailure;

/// Common result type for BoothTrack operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across BoothTrack services
#[derive(Error, Debug)]
pub enum Error {
    /// Database operation error (wraps sqlx::Error)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// JSON encoding error for persisted columns
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Inbound scan failed schema validation
    #[error("Invalid scan: {0}")]
    Validation(#[from] ValidationFailure),

    /// Timestamp could not be normalized to the fixed timezone
    #[error("Time normalization error: {0}")]
    Normalization(#[from] NormalizationError),

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),
}
