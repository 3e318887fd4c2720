//! Community Identity - Main Library
//!
//! Community Identity owns the authentication session lifecycle of the
//! community platform: issuing and verifying signed credentials, storing them
//! as scoped cookies, guarding state-changing requests, and keeping the
//! client's view of "who is logged in, until when" consistent with the server.
//!
//! # Module Structure
//!
//! - **`shared`** - Types shared between server and client
//!   - Identity projections, API envelopes, input validation
//!   - Clock abstraction, configuration, error types
//!
//! - **`backend`** - Server-side code (only compiled with `ssr` feature)
//!   - Token authority, cookie credential store, CSRF guard
//!   - Identity authority (register / login / refresh / logout)
//!   - Axum routes, middleware and server bootstrap
//!
//! - **`client`** - Client session state machine (only compiled with `client` feature)
//!   - Pure reducer over named auth transitions
//!   - HTTP auth API, local session persistence
//!
//! # Feature Flags
//!
//! - **`ssr`** - Server build (axum, jsonwebtoken, bcrypt, tower-cookies)
//! - **`client`** - Client build (reqwest with cookie store, SQLite persistence)
//!
//! Both are enabled by default.
//!
//! # Usage
//!
//! ```rust,no_run
//! use community_identity::backend::server::init::create_app;
//! use community_identity::backend::server::config::ServerConfig;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ServerConfig::from_env()?;
//! let app = create_app(config).await?;
//! # Ok(())
//! # }
//! ```

/// Shared types and data structures
pub mod shared;

/// Backend server-side code
#[cfg(feature = "ssr")]
pub mod backend;

/// Client session state machine
#[cfg(feature = "client")]
pub mod client;
