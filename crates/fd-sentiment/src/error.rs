//! Error types for the sentiment pipeline.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for sentiment pipeline operations.
pub type Result<T> = std::result::Result<T, SentimentError>;

/// Errors that can occur while building, running or persisting a pipeline run.
#[derive(Debug, Error)]
pub enum SentimentError {
    /// Ticker source absent at every candidate location
    #[error("Ticker source not found, tried: {tried:?}")]
    SourceNotFound {
        /// Locations checked, in order
        tried: Vec<PathBuf>,
    },

    /// Ticker source lacks the expected column
    #[error("Ticker source {path} has no '{column}' column")]
    SchemaError {
        /// File that was read
        path: PathBuf,
        /// Column that was expected
        column: String,
    },

    /// Vectorizer or classifier artifact could not be loaded
    #[error("Model unavailable ({path}): {reason}")]
    ModelUnavailable {
        /// Artifact path
        path: PathBuf,
        /// What went wrong
        reason: String,
    },

    /// A comment source failed to deliver posts or comments
    #[error("Fetch error: {0}")]
    Fetch(String),

    /// Store already holds snapshots produced under another policy
    #[error("Store was written with the '{stored}' policy, refusing '{requested}' snapshots")]
    PolicyConflict {
        /// Policy recorded in the store
        stored: String,
        /// Policy of the rejected run
        requested: String,
    },

    /// Invalid configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Polars DataFrame error
    #[error("DataFrame error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    /// SQLite error
    #[error("Storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    /// JSON (de)serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Filesystem error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
