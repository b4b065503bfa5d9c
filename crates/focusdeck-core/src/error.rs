//! Core error types for focusdeck-core.
//!
//! Lifecycle operations surface a small, stable taxonomy: validation,
//! state conflicts, ownership violations, unknown ids, and storage
//! failures. The HTTP layer maps each variant to a status code.

use std::path::PathBuf;
use thiserror::Error;

use crate::session::SessionState;

/// Engine error type for focusdeck-core.
#[derive(Error, Debug)]
pub enum EngineError {
    /// Malformed or out-of-range input (e.g. impact level outside 1-5).
    #[error("validation failed for '{field}': {message}")]
    Validation { field: &'static str, message: String },

    /// A state precondition was violated: duplicate active session or a
    /// stale expected state on a conditional transition.
    #[error("conflict: {0}")]
    Conflict(String),

    /// Transition attempted on a session already in a terminal state.
    #[error("session {session_id} is {state} and accepts no further transitions")]
    InvalidState {
        session_id: String,
        state: SessionState,
    },

    /// No session with this id is known.
    #[error("session not found: {0}")]
    NotFound(String),

    /// The session exists but belongs to another user.
    #[error("session {0} belongs to another user")]
    Forbidden(String),

    /// Storage-layer failure (maps to Unavailable at the boundary).
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Storage-specific errors.
#[derive(Error, Debug)]
pub enum StorageError {
    /// Failed to open the database file
    #[error("failed to open database at {path}: {source}")]
    OpenFailed {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// Query execution failed
    #[error("query failed: {0}")]
    Query(#[from] rusqlite::Error),

    /// Migration failed
    #[error("database migration failed: {0}")]
    Migration(String),

    /// A stored JSON sub-record could not be decoded
    #[error("corrupt stored record: {0}")]
    Corrupt(#[from] serde_json::Error),

    /// IO errors
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Invalid configuration value
    #[error("invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },
}

impl EngineError {
    /// Stable machine-readable code, used by API responses and logs.
    pub fn code(&self) -> &'static str {
        match self {
            EngineError::Validation { .. } => "validation_error",
            EngineError::Conflict(_) => "conflict",
            EngineError::InvalidState { .. } => "invalid_state",
            EngineError::NotFound(_) => "not_found",
            EngineError::Forbidden(_) => "forbidden",
            EngineError::Storage(_) => "unavailable",
        }
    }
}
