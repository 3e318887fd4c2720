//! Client error types
//!
//! `ClientError`'s display string is what ends up in `AuthState::error`, so
//! the `Api` variant displays the server's message verbatim.

use thiserror::Error;

use crate::shared::api::ErrorCode;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClientError {
    /// The server answered with a failure envelope
    #[error("{message}")]
    Api {
        status: u16,
        code: ErrorCode,
        message: String,
    },

    /// Request never produced a response (connect failure, timeout)
    #[error("Network error: {0}")]
    Network(String),

    /// Response body was not the expected envelope
    #[error("Failed to parse response: {0}")]
    Decode(String),

    /// Local credential storage could not be read or written
    #[error("Local storage error: {0}")]
    Storage(String),
}

impl ClientError {
    /// Server error code, when the server produced one
    pub fn code(&self) -> Option<ErrorCode> {
        match self {
            ClientError::Api { code, .. } => Some(*code),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ClientError::Decode(err.to_string())
        } else {
            ClientError::Network(err.to_string())
        }
    }
}

impl From<PersistenceError> for ClientError {
    fn from(err: PersistenceError) -> Self {
        ClientError::Storage(err.to_string())
    }
}

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("session database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("session database I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("corrupt persisted session: {0}")]
    Corrupt(String),
}
