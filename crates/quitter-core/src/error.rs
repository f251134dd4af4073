//! Core error types for quitter-core.
//!
//! Store failures never escape the session orchestrator; they are logged
//! there and the in-memory record stays authoritative. The types below are
//! what the stores and the configuration layer return to that boundary.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for quitter-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Local or remote store errors
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The session driver is no longer receiving events
    #[error("Streak session has shut down")]
    SessionClosed,
}

/// Errors raised by a streak store (local key-value or remote documents).
#[derive(Error, Debug)]
pub enum StoreError {
    /// Failed to open the local database
    #[error("Failed to open database at {path}: {source}")]
    OpenFailed {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// Query execution failed
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Database is locked
    #[error("Database is locked")]
    Locked,

    /// Remote request could not be sent or its body could not be read
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Remote store answered with a non-success status
    #[error("Remote store returned HTTP {status}: {body}")]
    Http { status: u16, body: String },

    /// Remote document did not have the expected shape
    #[error("Malformed document: {0}")]
    MalformedDocument(String),

    /// Stored value could not be (de)serialized
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Remote store is not configured correctly
    #[error("Remote store misconfigured: {0}")]
    Misconfigured(String),
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

    /// Data directory could not be resolved or created
    #[error("Data directory unavailable: {0}")]
    DataDir(String),

    /// Key does not exist in the configuration tree
    #[error("unknown config key: {0}")]
    UnknownKey(String),

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },
}

impl From<rusqlite::Error> for StoreError {
    fn from(err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(inner, _msg) => {
                if inner.code == rusqlite::ErrorCode::DatabaseLocked {
                    StoreError::Locked
                } else {
                    StoreError::QueryFailed(err.to_string())
                }
            }
            _ => StoreError::QueryFailed(err.to_string()),
        }
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
