//! Core error types for focusflow-core.
//!
//! State-machine commands on the timer never fail; everything here covers
//! the boundaries around it: mode construction, persistence, configuration
//! and the planner.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for focusflow-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Storage collaborator errors
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Planner errors
    #[error("Planner error: {0}")]
    Planner(#[from] PlannerError),
}

/// Errors raised by a [`Store`](crate::storage::Store) implementation.
#[derive(Error, Debug)]
pub enum StorageError {
    /// Failed to read or write a backing file
    #[error("I/O failure on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Stored payload is not valid JSON for the requested type
    #[error("Corrupt data in collection '{collection}': {source}")]
    Corrupt {
        collection: String,
        #[source]
        source: serde_json::Error,
    },

    /// Records could not be serialized
    #[error("Failed to serialize collection '{collection}': {source}")]
    Serialize {
        collection: String,
        #[source]
        source: serde_json::Error,
    },

    /// SQLite failure
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Data directory could not be resolved or created
    #[error("Data directory unavailable: {0}")]
    DataDir(String),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Unknown configuration key
    #[error("unknown config key: {0}")]
    UnknownKey(String),
}

/// Validation errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// A mode duration was zero
    #[error("{field} duration must be positive")]
    NonPositiveDuration { field: &'static str },

    /// No built-in mode carries this name
    #[error("unknown timer mode: {0}")]
    UnknownMode(String),

    /// Invalid time range
    #[error("Invalid time range: end ({end}) must be after start ({start})")]
    InvalidTimeRange {
        start: chrono::NaiveDateTime,
        end: chrono::NaiveDateTime,
    },
}

/// Planner errors.
#[derive(Error, Debug)]
pub enum PlannerError {
    /// The requested slot overlaps an existing event
    #[error("'{title}' overlaps an existing event")]
    Conflict { title: String },

    /// Malformed ICS input
    #[error("ICS parse error on line {line}: {message}")]
    IcsParse { line: usize, message: String },

    /// Validation failure on event fields
    #[error(transparent)]
    Validation(#[from] ValidationError),
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
