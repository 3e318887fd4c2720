/**
 * Register Handler
 *
 * POST {prefix}/register
 *
 * # Example Request
 *
 * ```http
 * POST /api/auth/register HTTP/1.1
 * Content-Type: application/json
 * X-Requested-With: XMLHttpRequest
 *
 * {"email":"ada@example.com","username":"ada","password":"Passw0rd!","displayName":"Ada"}
 * ```
 *
 * # Example Response (201)
 *
 * ```json
 * { "success": true, "data": { "user": { "id": "...", "userType": "PLAYER", ... }, "expiresAt": "..." } }
 * ```
 */

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use tower_cookies::Cookies;

use crate::backend::auth::cookies::{CookieCredentialStore, CookiePolicy};
use crate::backend::auth::handlers::types::parse_body;
use crate::backend::auth::service::IdentityAuthority;
use crate::backend::error::AuthError;
use crate::shared::api::{ApiResponse, RegisterRequest, SessionPayload};

/// Registration handler
///
/// # Errors
///
/// * `400 VALIDATION_ERROR` - field rules or password confirmation failed
/// * `409 CONFLICT` - email, username or display name already in use
pub async fn register(
    State(authority): State<IdentityAuthority>,
    State(policy): State<CookiePolicy>,
    cookies: Cookies,
    body: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<ApiResponse<SessionPayload>>), AuthError> {
    let request = parse_body(body)?;
    tracing::info!("Registration request for: {}", request.username);

    let store = CookieCredentialStore::new(cookies, policy);
    let session = authority.register(&store, request).await?;

    Ok((StatusCode::CREATED, Json(ApiResponse::ok(session.into()))))
}
