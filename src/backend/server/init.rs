/**
 * Server Initialization
 *
 * Composition root: loads the user directory, builds the token authority
 * over the system clock, and assembles the router.
 */

use axum::Router;
use std::sync::Arc;
use thiserror::Error;

use crate::backend::auth::tokens::TokenError;
use crate::backend::routes::create_router;
use crate::backend::server::config::{load_directory, DirectoryInitError, ServerConfig};
use crate::backend::server::state::AppState;
use crate::shared::clock::SystemClock;

#[derive(Debug, Error)]
pub enum InitError {
    #[error(transparent)]
    Directory(#[from] DirectoryInitError),

    #[error("failed to initialize token authority: {0}")]
    Tokens(#[from] TokenError),
}

/// Create the Axum application
///
/// # Errors
/// Fails when a configured database is unreachable or its migrations fail,
/// or when the session secret is rejected.
pub async fn create_app(config: ServerConfig) -> Result<Router, InitError> {
    tracing::info!(
        "Initializing identity server (environment: {}, auth prefix: {})",
        config.environment,
        config.auth_route_prefix
    );

    let directory = load_directory(&config).await?;
    let state = AppState::new(config, directory, Arc::new(SystemClock))?;

    tracing::info!("User directory: {}", state.authority.directory().backend_name());
    Ok(create_router(state))
}
