//! Middleware Module
//!
//! HTTP middleware for the identity server.
//!
//! - **`auth`** - verifies the `session` cookie and attaches the caller
//! - **`csrf`** - rejects state-changing requests without the XHR marker
//!
//! # Example
//!
//! ```rust,ignore
//! let protected = Router::new()
//!     .route("/me", get(get_me))
//!     .route_layer(middleware::from_fn_with_state(state.clone(), auth_middleware));
//! ```

pub mod auth;

pub mod csrf;

pub use auth::{auth_middleware, AuthUser, AuthenticatedUser};
pub use csrf::csrf_guard;
