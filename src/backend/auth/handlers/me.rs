/**
 * Get Current User Handler
 *
 * GET {prefix}/me
 *
 * Runs behind `auth_middleware`, which has already verified the `session`
 * cookie. This handler only loads the identity, so an account that was
 * deleted or banned since the credential was issued is still caught here.
 *
 * # Example Response
 *
 * ```json
 * { "success": true, "data": { "user": { ... }, "expiresAt": "2024-01-01T00:15:00Z" } }
 * ```
 */

use axum::extract::State;
use axum::Json;

use crate::backend::auth::service::IdentityAuthority;
use crate::backend::error::AuthError;
use crate::backend::middleware::auth::AuthUser;
use crate::shared::api::{ApiResponse, SessionPayload};

/// # Errors
///
/// * `401 USER_NOT_FOUND` - credential subject no longer exists
/// * `403 ACCOUNT_INACTIVE` - account was deactivated or banned
pub async fn get_me(
    State(authority): State<IdentityAuthority>,
    AuthUser(auth): AuthUser,
) -> Result<Json<ApiResponse<SessionPayload>>, AuthError> {
    let session = authority.current_session(&auth).await?;
    Ok(Json(ApiResponse::ok(session.into())))
}
