/**
 * Backend Error Types
 *
 * This module defines the error taxonomy of the identity server.
 * Every variant maps to exactly one HTTP status and one wire `code`.
 *
 * # Status Code Mapping
 *
 * - `Validation`         - 400 `VALIDATION_ERROR`
 * - `Csrf`               - 403 `CSRF_ERROR`
 * - `InvalidCredentials` - 401 `INVALID_CREDENTIALS`
 * - `AccountInactive`    - 403 `ACCOUNT_INACTIVE`
 * - `Conflict`           - 409 `CONFLICT`
 * - `NoSession`          - 401 `NO_SESSION`
 * - `InvalidToken`       - 401 `INVALID_TOKEN`
 * - `UserNotFound`       - 401 `USER_NOT_FOUND`
 * - `Internal`           - 500 `INTERNAL_ERROR`
 */

use axum::http::StatusCode;
use thiserror::Error;

use crate::shared::{ErrorCode, SharedError};

/// Identity server error
///
/// Handlers return `Result<_, AuthError>`; the `IntoResponse` impl in
/// `conversion` renders the failure envelope.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Request body failed field validation
    #[error(transparent)]
    Validation(#[from] SharedError),

    /// Missing or wrong `X-Requested-With` marker on a state-changing request
    #[error("Invalid request")]
    Csrf,

    /// Unknown email or wrong password, deliberately undifferentiated
    #[error("Invalid email or password")]
    InvalidCredentials,

    /// Credentials were correct but the account is inactive or banned
    #[error("Account is inactive or banned")]
    AccountInactive,

    /// Registration uniqueness violation
    #[error("{message}")]
    Conflict {
        /// Which field collided, e.g. "Email is already registered"
        message: String,
    },

    /// Neither an access nor a refresh credential was presented (or the
    /// refresh credential has expired)
    #[error("No valid session or refresh token")]
    NoSession,

    /// A presented credential failed verification
    #[error("Invalid session token")]
    InvalidToken,

    /// Credential subject no longer exists
    #[error("User not found")]
    UserNotFound,

    /// Anything unexpected; the detail is logged, never sent
    #[error("Internal server error: {message}")]
    Internal {
        message: String,
    },
}

impl AuthError {
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict {
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::Csrf => StatusCode::FORBIDDEN,
            Self::InvalidCredentials => StatusCode::UNAUTHORIZED,
            Self::AccountInactive => StatusCode::FORBIDDEN,
            Self::Conflict { .. } => StatusCode::CONFLICT,
            Self::NoSession | Self::InvalidToken | Self::UserNotFound => StatusCode::UNAUTHORIZED,
            Self::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Wire code for the error envelope
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::Validation(_) => ErrorCode::ValidationError,
            Self::Csrf => ErrorCode::CsrfError,
            Self::InvalidCredentials => ErrorCode::InvalidCredentials,
            Self::AccountInactive => ErrorCode::AccountInactive,
            Self::Conflict { .. } => ErrorCode::Conflict,
            Self::NoSession => ErrorCode::NoSession,
            Self::InvalidToken => ErrorCode::InvalidToken,
            Self::UserNotFound => ErrorCode::UserNotFound,
            Self::Internal { .. } => ErrorCode::InternalError,
        }
    }

    /// Client-facing message. Internal details are replaced by a generic one.
    pub fn message(&self) -> String {
        match self {
            Self::Internal { .. } => "Internal server error".to_string(),
            other => other.to_string(),
        }
    }
}
