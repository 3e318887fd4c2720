//! Backend Module
//!
//! Server-side code for the identity server: an Axum HTTP service that owns
//! account creation and the cookie-based session lifecycle.
//!
//! This module is only compiled when the `ssr` feature is enabled.
//!
//! # Architecture
//!
//! - **`server`** - Configuration, application state, composition root
//! - **`routes`** - Router assembly and tower layers
//! - **`auth`** - Token authority, credential store, CSRF guard, identity authority
//! - **`middleware`** - Cookie authentication and CSRF middleware
//! - **`error`** - `AuthError` and its HTTP rendering
//!
//! # Module Structure
//!
//! ```text
//! backend/
//! ├── mod.rs          - Module exports and documentation
//! ├── main.rs         - `identity-server` binary
//! ├── server/         - Server initialization and state
//! ├── routes/         - Route configuration
//! ├── auth/           - Authentication
//! ├── middleware/     - Request middleware
//! └── error/          - Error types
//! ```
//!
//! # State Management
//!
//! `AppState` holds the `IdentityAuthority` (user directory, token authority,
//! password hasher), the `CookiePolicy` and the loaded `ServerConfig`. The
//! directory is `Arc<dyn UserDirectory>` so PostgreSQL and the in-memory
//! implementation are interchangeable, and the clock is injected so tests
//! can move time.
//!
//! # Error Handling
//!
//! Handlers return `Result<_, AuthError>`. Every failure is rendered as
//! `{ "success": false, "error": { "message", "code" } }` with the status code
//! of its category.
//!
//! # Example
//!
//! ```rust,no_run
//! use community_identity::backend::server::{create_app, ServerConfig};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ServerConfig::from_env()?;
//! let addr = config.socket_addr();
//! let app = create_app(config).await?;
//! let listener = tokio::net::TcpListener::bind(addr).await?;
//! axum::serve(listener, app).await?;
//! # Ok(())
//! # }
//! ```

/// Server setup and configuration
pub mod server;

/// Route configuration
pub mod routes;

/// Backend error types
pub mod error;

/// Authentication and user management
pub mod auth;

/// Middleware for request processing
pub mod middleware;

pub use error::AuthError;
pub use server::{create_app, AppState, ServerConfig};
