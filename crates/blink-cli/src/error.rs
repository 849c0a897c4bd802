use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Core(#[from] blink_core::Error),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
    #[error("No text provided")]
    EmptyContent,
    #[error("ID cannot be empty")]
    EmptyId,
    #[error("Invalid ID: {0}")]
    InvalidId(String),
    #[error("Board not found for id/prefix: {0}")]
    BoardNotFound(String),
    #[error("Media item not found: {0}")]
    MediaNotFound(String),
    #[error("{0}")]
    AmbiguousId(String),
    #[error("Board {0} has no images")]
    NoThumbnail(String),
    #[error("{failed} of {total} items could not be saved")]
    PartialFailure { failed: usize, total: usize },
}
