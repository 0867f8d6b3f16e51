//! Error types for clipsift.
//!
//! This module defines all error types used throughout the clipsift crate,
//! providing detailed context for debugging and user-friendly error messages.

use std::path::PathBuf;
use thiserror::Error;

/// The main error type for clipsift operations.
#[derive(Error, Debug)]
pub enum Error {
    // === Detection Errors ===
    /// A custom detection rule failed to compile.
    #[error("invalid pattern '{name}': {source}")]
    InvalidPattern {
        /// Name of the rule being registered.
        name: String,
        /// The underlying regex compilation error.
        #[source]
        source: Box<regex::Error>,
    },

    // === Storage Errors ===
    /// Failed to open or create the archive database.
    #[error("failed to open database at {path}: {source}")]
    DatabaseOpen {
        /// Path to the database file.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: rusqlite::Error,
    },

    /// A database query failed.
    #[error("database query failed: {0}")]
    DatabaseQuery(#[from] rusqlite::Error),

    /// Failed to run database migrations.
    #[error("database migration failed: {message}")]
    DatabaseMigration {
        /// Description of what went wrong.
        message: String,
    },

    // === State Errors ===
    /// Failed to load persisted processing state.
    #[error("failed to load state from {path}: {message}")]
    StateLoad {
        /// Path to the state file.
        path: PathBuf,
        /// Description of what went wrong.
        message: String,
    },

    /// Failed to save processing state.
    #[error("failed to save state to {path}: {message}")]
    StateSave {
        /// Path to the state file.
        path: PathBuf,
        /// Description of what went wrong.
        message: String,
    },

    // === Configuration Errors ===
    /// Failed to load configuration.
    #[error("failed to load configuration: {0}")]
    ConfigLoad(Box<figment::Error>),

    /// Configuration validation failed.
    #[error("invalid configuration: {message}")]
    ConfigValidation {
        /// Description of the validation failure.
        message: String,
    },

    // === Source Errors ===
    /// A content source failed to produce an item.
    #[error("content source '{name}' failed: {message}")]
    SourcePoll {
        /// Name of the content source.
        name: &'static str,
        /// Description of what went wrong.
        message: String,
    },

    // === I/O Errors ===
    /// File system operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to create a required directory.
    #[error("failed to create directory {path}: {source}")]
    DirectoryCreate {
        /// Path that couldn't be created.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    // === Serialization Errors ===
    /// JSON serialization/deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // === Generic Errors ===
    /// An internal error occurred (bug).
    #[error("internal error: {0}")]
    Internal(String),
}

/// A specialized Result type for clipsift operations.
pub type Result<T> = std::result::Result<T, Error>;

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Self::ConfigLoad(Box::new(err))
    }
}

impl Error {
    /// Create an invalid pattern error.
    #[must_use]
    pub fn invalid_pattern(name: impl Into<String>, source: regex::Error) -> Self {
        Self::InvalidPattern {
            name: name.into(),
            source: Box::new(source),
        }
    }

    /// Create a new internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Create a source poll error.
    #[must_use]
    pub fn source_poll(name: &'static str, message: impl Into<String>) -> Self {
        Self::SourcePoll {
            name,
            message: message.into(),
        }
    }

    /// Create a state load error.
    #[must_use]
    pub fn state_load(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::StateLoad {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a state save error.
    #[must_use]
    pub fn state_save(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::StateSave {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Check if this error is recoverable by continuing with empty state.
    #[must_use]
    pub fn is_state_error(&self) -> bool {
        matches!(self, Self::StateLoad { .. } | Self::StateSave { .. })
    }
}
