//! Logout Handler
//!
//! POST {prefix}/logout. Always 200, with or without a session.

use axum::extract::State;
use axum::Json;
use tower_cookies::Cookies;

use crate::backend::auth::cookies::{CookieCredentialStore, CookiePolicy};
use crate::backend::auth::service::IdentityAuthority;
use crate::shared::api::ApiResponse;

pub async fn logout(
    State(authority): State<IdentityAuthority>,
    State(policy): State<CookiePolicy>,
    cookies: Cookies,
) -> Json<ApiResponse<()>> {
    let store = CookieCredentialStore::new(cookies, policy);
    authority.logout(&store);
    Json(ApiResponse::empty())
}
