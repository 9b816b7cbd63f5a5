//! Token store error types

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by a [`TokenStore`](super::TokenStore) backend
#[derive(Error, Debug)]
pub enum SessionError {
    /// Reading or writing the session file failed
    #[error("Session file {path:?}: {error}")]
    Io {
        path: PathBuf,
        error: std::io::Error,
    },

    /// The session file could not be encoded or decoded
    #[error("Session serialization error: {0}")]
    Serialization(String),

    /// No location was configured and no platform data directory exists
    #[error("No session location available")]
    NoLocation,
}

impl From<serde_json::Error> for SessionError {
    fn from(err: serde_json::Error) -> Self {
        SessionError::Serialization(err.to_string())
    }
}

/// Result type alias for token store operations
pub type SessionResult<T> = Result<T, SessionError>;
