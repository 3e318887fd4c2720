/**
 * Error Conversion
 *
 * `IntoResponse` for `AuthError`, plus `From` impls that fold lower-layer
 * errors (token signing, user directory, password hashing) into the taxonomy.
 *
 * # Response Format
 *
 * ```json
 * {
 *   "success": false,
 *   "error": { "message": "Invalid email or password", "code": "INVALID_CREDENTIALS" }
 * }
 * ```
 */

use axum::{
    response::{IntoResponse, Response},
    Json,
};

use crate::backend::auth::password::PasswordError;
use crate::backend::auth::tokens::TokenError;
use crate::backend::auth::users::DirectoryError;
use crate::backend::error::types::AuthError;
use crate::shared::ApiResponse;

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if let AuthError::Internal { message } = &self {
            tracing::error!("Internal error: {}", message);
        }

        let body = ApiResponse::<()>::failure(self.code(), self.message());
        (status, Json(body)).into_response()
    }
}

impl From<TokenError> for AuthError {
    fn from(err: TokenError) -> Self {
        AuthError::internal(format!("token signing failed: {}", err))
    }
}

impl From<DirectoryError> for AuthError {
    fn from(err: DirectoryError) -> Self {
        match err {
            DirectoryError::Conflict { field } => AuthError::conflict(field.conflict_message()),
            other => AuthError::internal(other.to_string()),
        }
    }
}

impl From<PasswordError> for AuthError {
    fn from(err: PasswordError) -> Self {
        AuthError::internal(err.to_string())
    }
}
