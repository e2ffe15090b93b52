//! Common error types for TWSA

use thiserror::Error;

/// Common result type for TWSA operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across TWSA crates
#[derive(Error, Debug)]
pub enum Error {
    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Record store adapter failures
///
/// Surfaced to the caller unmodified. Nothing in TWSA retries a store call.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Connectivity or query failure (wraps sqlx::Error)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Database file or directory could not be prepared
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Document could not be encoded to or decoded from JSON
    #[error("Document serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Collection name rejected before reaching SQL
    #[error("Invalid collection name: {0}")]
    InvalidCollection(String),
}
