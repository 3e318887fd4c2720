/**
 * Application State Management
 *
 * `AppState` is the router state. The `FromRef` implementations let handlers
 * extract just the part they need (`State<IdentityAuthority>`,
 * `State<CookiePolicy>`) instead of the whole struct.
 *
 * Everything here is constructed once in `init` and injected; nothing in the
 * auth path reaches for a global.
 */

use axum::extract::FromRef;
use std::sync::Arc;

use crate::backend::auth::cookies::CookiePolicy;
use crate::backend::auth::password::PasswordHasher;
use crate::backend::auth::service::IdentityAuthority;
use crate::backend::auth::tokens::{TokenAuthority, TokenError};
use crate::backend::auth::users::UserDirectory;
use crate::backend::server::config::ServerConfig;
use crate::shared::clock::Clock;

#[derive(Clone)]
pub struct AppState {
    /// Register/login/refresh/logout over the injected directory and tokens
    pub authority: IdentityAuthority,

    /// Cookie attributes derived from the environment and route prefix
    pub cookie_policy: CookiePolicy,

    pub config: Arc<ServerConfig>,
}

impl AppState {
    /// Wire the identity authority from its parts.
    ///
    /// # Errors
    /// `TokenError::WeakSecret` if the configured secret is too short.
    pub fn new(
        config: ServerConfig,
        directory: Arc<dyn UserDirectory>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, TokenError> {
        let tokens = TokenAuthority::new(&config.session_secret, clock)?;
        let hasher = PasswordHasher::new(config.bcrypt_cost);
        let authority = IdentityAuthority::new(directory, tokens, hasher);
        let cookie_policy = CookiePolicy::new(config.environment, config.auth_route_prefix.clone());

        Ok(Self {
            authority,
            cookie_policy,
            config: Arc::new(config),
        })
    }
}

impl FromRef<AppState> for IdentityAuthority {
    fn from_ref(state: &AppState) -> Self {
        state.authority.clone()
    }
}

impl FromRef<AppState> for CookiePolicy {
    fn from_ref(state: &AppState) -> Self {
        state.cookie_policy.clone()
    }
}
