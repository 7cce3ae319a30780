//! Error types for `taskboard`.

use crate::tasks::TaskId;

/// Errors that can occur in the task board.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Caller-supplied data was rejected (blank title, bad enum value, empty update).
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// No task exists with the given ID.
    #[error("task not found: {0}")]
    NotFound(TaskId),

    /// The operation is not legal for the task's current state.
    #[error("invalid state: {0}")]
    InvalidState(String),

    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A JSON serialization error occurred.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A YAML parsing error occurred.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// A `SQLite` database error occurred.
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Configuration could not be resolved.
    #[error("Config error: {0}")]
    Config(String),
}

/// Coarse classification of an [`Error`], used by transports to pick a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The request itself was malformed or violated a validation rule.
    InvalidInput,
    /// The referenced task does not exist.
    NotFound,
    /// The task is in a state that forbids the operation.
    InvalidState,
    /// Storage, I/O or other infrastructure failure.
    Internal,
}

impl Error {
    /// Classify this error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidInput(_) => ErrorKind::InvalidInput,
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::InvalidState(_) => ErrorKind::InvalidState,
            Self::Io(_) | Self::Json(_) | Self::Yaml(_) | Self::Database(_) | Self::Config(_) => {
                ErrorKind::Internal
            }
        }
    }
}

/// A specialized Result type for this crate.
pub type Result<T> = std::result::Result<T, Error>;
