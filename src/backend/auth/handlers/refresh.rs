//! Refresh Handler
//!
//! POST {prefix}/refresh. Takes no body; the credentials come from cookies.
//! On any failure both cookies are cleared in the same response.

use axum::extract::State;
use axum::Json;
use tower_cookies::Cookies;

use crate::backend::auth::cookies::{CookieCredentialStore, CookiePolicy};
use crate::backend::auth::service::IdentityAuthority;
use crate::backend::error::AuthError;
use crate::shared::api::{ApiResponse, RefreshPayload};

pub async fn refresh(
    State(authority): State<IdentityAuthority>,
    State(policy): State<CookiePolicy>,
    cookies: Cookies,
) -> Result<Json<ApiResponse<RefreshPayload>>, AuthError> {
    let store = CookieCredentialStore::new(cookies, policy);
    let expires_at = authority.refresh(&store).await?;
    Ok(Json(ApiResponse::ok(RefreshPayload { expires_at })))
}
