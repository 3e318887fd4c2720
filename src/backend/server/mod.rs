//! Server Module
//!
//! Server initialization and configuration for the identity server.
//!
//! # Module Structure
//!
//! ```text
//! server/
//! ├── mod.rs          - Module exports and documentation
//! ├── state.rs        - AppState and FromRef implementations
//! ├── config.rs       - Environment configuration, user directory loading
//! └── init.rs         - Composition root and app creation
//! ```
//!
//! # Initialization Flow
//!
//! 1. **Configuration Loading**: `ServerConfig::from_env`
//! 2. **Directory**: PostgreSQL when `DATABASE_URL` is set, in-memory otherwise
//! 3. **State Creation**: token authority, password hasher, cookie policy
//! 4. **Router Creation**: auth routes, health check, CORS and tracing layers

/// Application state management
pub mod state;

/// Server configuration loading
pub mod config;

/// Server initialization
pub mod init;

pub use config::ServerConfig;
pub use init::{create_app, InitError};
pub use state::AppState;
