//! Route Configuration Module
//!
//! # Module Structure
//!
//! ```text
//! routes/
//! ├── mod.rs          - Module exports and documentation
//! ├── router.rs       - Main router creation and tower layers
//! ├── api_routes.rs   - Auth endpoints under the configured prefix
//! └── health.rs       - Liveness/readiness endpoint
//! ```
//!
//! # Routes
//!
//! - `POST {prefix}/register` - Create account, start session
//! - `POST {prefix}/login` - Start session
//! - `POST {prefix}/refresh` - Renew access credential
//! - `POST {prefix}/logout` - End session
//! - `GET {prefix}/me` - Current identity
//! - `GET /health` - Health check
//!
//! `{prefix}` defaults to `/api/auth`.

/// Main router creation
pub mod router;

/// Auth API routes
pub mod api_routes;

/// Health check
pub mod health;

pub use router::create_router;
