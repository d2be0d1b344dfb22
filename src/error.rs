//! Error types for parley.

use std::io;
use thiserror::Error;

/// Result type alias for parley operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in parley operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Storage I/O error.
    #[error("Storage error: {0}")]
    Storage(#[from] io::Error),

    /// JSON serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    /// Operation requires a live session but none exists.
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// Session not found in the history index.
    #[error("Session not found: {0}")]
    SessionNotFound(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),
}
