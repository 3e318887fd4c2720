//! Client Session Module
//!
//! The client's view of "who is logged in, and until when".
//!
//! # Module Structure
//!
//! ```text
//! client/
//! ├── mod.rs          - Module exports and documentation
//! ├── config.rs       - API base URL, session file location, timeouts
//! ├── error.rs        - ClientError and PersistenceError
//! ├── api.rs          - AuthApi trait and reqwest implementation
//! ├── cookies.rs      - Credential jar (reqwest cookie provider, saved to disk)
//! ├── state.rs        - AuthState, AuthEvent and the pure reducer
//! ├── persistence.rs  - Local session persistence (SQLite / memory)
//! └── session.rs      - SessionStore: reducer + API + persistence
//! ```
//!
//! # State Flow
//!
//! ```text
//! signIn / register ──pending──> loading ──fulfilled──> authenticated (persisted)
//!                                        └─rejected───> error, session untouched
//! refreshSession    ──pending──> loading ──fulfilled──> expiry extended
//!                                        └─rejected───> logged out, purged
//! signOut           ──pending──> loading ──settled────> logged out, purged
//! ```
//!
//! Credentials never reach this module's state: they live in the HTTP
//! client's credential jar, which is saved beside the session database.
//! The state machine persists only the identity projection and expiry.

/// Client configuration
pub mod config;

/// Client error types
pub mod error;

/// Auth API client
pub mod api;

/// Credential jar
pub mod cookies;

/// Auth state and reducer
pub mod state;

/// Local session persistence
pub mod persistence;

/// Session store
pub mod session;

pub use api::{AuthApi, HttpAuthApi};
pub use config::ClientConfig;
pub use cookies::CredentialJar;
pub use error::{ClientError, PersistenceError};
pub use persistence::{MemorySessionStore, PersistedSession, SessionPersistence, SqliteSessionStore};
pub use session::SessionStore;
pub use state::{reduce, AuthEvent, AuthState, SessionPreload};
