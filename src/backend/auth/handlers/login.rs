/**
 * Login Handler
 *
 * POST {prefix}/login
 *
 * Unknown email and wrong password both return 401 INVALID_CREDENTIALS with
 * the same message. A correct password on an inactive or banned account
 * returns 403 ACCOUNT_INACTIVE and sets no cookies.
 */

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use tower_cookies::Cookies;

use crate::backend::auth::cookies::{CookieCredentialStore, CookiePolicy};
use crate::backend::auth::handlers::types::parse_body;
use crate::backend::auth::service::IdentityAuthority;
use crate::backend::error::AuthError;
use crate::shared::api::{ApiResponse, LoginRequest, SessionPayload};

pub async fn login(
    State(authority): State<IdentityAuthority>,
    State(policy): State<CookiePolicy>,
    cookies: Cookies,
    body: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<SessionPayload>>, AuthError> {
    let request = parse_body(body)?;
    tracing::info!("Login request for: {}", request.email);

    let store = CookieCredentialStore::new(cookies, policy);
    let session = authority.login(&store, request).await?;

    Ok(Json(ApiResponse::ok(session.into())))
}
