/**
 * Authentication Handler Types
 *
 * Request and response bodies live in `shared::api` so the client can use the
 * same definitions. This module holds the glue between those types and axum.
 */

use axum::extract::rejection::JsonRejection;
use axum::Json;

use crate::backend::auth::service::IssuedSession;
use crate::backend::error::AuthError;
use crate::shared::api::SessionPayload;
use crate::shared::SharedError;

/// Unwrap a JSON body, turning a malformed or mistyped body into a
/// `VALIDATION_ERROR` envelope instead of axum's plain-text rejection.
pub fn parse_body<T>(body: Result<Json<T>, JsonRejection>) -> Result<T, AuthError> {
    match body {
        Ok(Json(value)) => Ok(value),
        Err(rejection) => {
            tracing::warn!("Rejected request body: {}", rejection.body_text());
            Err(SharedError::validation("body", "Invalid request body").into())
        }
    }
}

impl From<IssuedSession> for SessionPayload {
    fn from(session: IssuedSession) -> Self {
        SessionPayload {
            user: session.user,
            expires_at: session.expires_at,
        }
    }
}
