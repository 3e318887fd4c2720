/**
 * Authentication Middleware
 *
 * Protects routes that require a live session. The access credential is read
 * from the `session` cookie and verified; no directory lookup happens here.
 * Handlers that need the full identity load it themselves.
 */

use axum::extract::{FromRequestParts, Request, State};
use axum::http::request::Parts;
use axum::middleware::Next;
use axum::response::Response;
use chrono::{DateTime, Utc};
use tower_cookies::Cookies;
use uuid::Uuid;

use crate::backend::auth::cookies::CookieCredentialStore;
use crate::backend::error::AuthError;
use crate::backend::server::state::AppState;

/// Caller identity taken from a verified access credential
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub user_id: Uuid,
    pub email: String,
    /// Expiry of the presented access credential
    pub expires_at: DateTime<Utc>,
}

/// Authentication middleware
///
/// Returns 401 NO_SESSION when the cookie is missing or expired and
/// 401 INVALID_TOKEN when it fails verification. Cookies are left untouched
/// on failure; clearing them is the refresh endpoint's job.
pub async fn auth_middleware(
    State(state): State<AppState>,
    cookies: Cookies,
    mut request: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let store = CookieCredentialStore::new(cookies, state.cookie_policy.clone());
    let user = state.authority.authenticate(&store).map_err(|e| {
        tracing::warn!("Rejected {} {}: {}", request.method(), request.uri().path(), e);
        e
    })?;

    request.extensions_mut().insert(user);
    Ok(next.run(request).await)
}

/// Axum extractor for the authenticated user
///
/// Only valid on routes behind `auth_middleware`.
#[derive(Clone, Debug)]
pub struct AuthUser(pub AuthenticatedUser);

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user = parts
            .extensions
            .get::<AuthenticatedUser>()
            .cloned()
            .ok_or_else(|| {
                tracing::warn!("AuthenticatedUser not found in request extensions");
                AuthError::NoSession
            })?;

        Ok(AuthUser(user))
    }
}
