//! Error types for blink-core

use thiserror::Error;

/// Result type alias using blink-core's Error
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in blink-core operations
#[derive(Error, Debug)]
pub enum Error {
    /// Database error
    #[error("Database error: {0}")]
    Database(String),

    /// libSQL error
    #[error("libSQL error: {0}")]
    LibSql(#[from] libsql::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Record not found
    #[error("Record not found: {0}")]
    NotFound(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Record store unavailable or rejected the operation
    #[error("Storage error: {0}")]
    Storage(String),

    /// Conditional write rejected because the record changed since it was read
    #[error("Record changed since it was fetched: {0}")]
    Conflict(String),

    /// Image encode/decode error
    #[error("Image error: {0}")]
    Image(String),
}
