/**
 * API Route Handlers
 *
 * Auth endpoints are nested under the configured prefix so the refresh
 * cookie's `Path` matches the refresh endpoint.
 *
 * # Layers
 *
 * - POST routes: `csrf_guard`
 * - `/me`: `auth_middleware`
 */

use axum::middleware;
use axum::routing::{get, post};
use axum::Router;

use crate::backend::auth::handlers::{get_me, login, logout, refresh, register};
use crate::backend::middleware::{auth_middleware, csrf_guard};
use crate::backend::server::state::AppState;

/// Auth routes relative to the prefix
pub fn auth_routes(state: &AppState) -> Router<AppState> {
    let session_routes = Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/refresh", post(refresh))
        .route("/logout", post(logout))
        .route_layer(middleware::from_fn(csrf_guard));

    let protected_routes = Router::new()
        .route("/me", get(get_me))
        .route_layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    session_routes.merge(protected_routes)
}

/// Mount the auth routes on `router` under `state.config.auth_route_prefix`
pub fn configure_api_routes(router: Router<AppState>, state: &AppState) -> Router<AppState> {
    router.nest(&state.config.auth_route_prefix, auth_routes(state))
}
