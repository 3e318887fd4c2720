//! Authentication Handlers Module
//!
//! # Module Structure
//!
//! ```text
//! handlers/
//! ├── mod.rs       - Module exports and documentation
//! ├── types.rs     - Body parsing and payload conversion
//! ├── register.rs  - Account creation
//! ├── login.rs     - Email/password sign-in
//! ├── refresh.rs   - Access credential renewal
//! ├── logout.rs    - Session teardown
//! └── me.rs        - Current identity
//! ```
//!
//! # Handlers
//!
//! All paths are relative to the auth route prefix (default `/api/auth`).
//!
//! - **`register`** - POST /register - 201 with identity, sets both cookies
//! - **`login`** - POST /login - 200 with identity, sets both cookies
//! - **`refresh`** - POST /refresh - 200 with new expiry, sets `session`
//! - **`logout`** - POST /logout - 200, clears both cookies
//! - **`get_me`** - GET /me - 200 with identity (requires `session`)
//!
//! POST routes sit behind the CSRF guard; `/me` sits behind the auth
//! middleware. Both are applied in `routes::api_routes`.

/// Body parsing and payload conversion
pub mod types;

/// Registration handler
pub mod register;

/// Login handler
pub mod login;

/// Refresh handler
pub mod refresh;

/// Logout handler
pub mod logout;

/// Get current user handler
pub mod me;

pub use login::login;
pub use logout::logout;
pub use me::get_me;
pub use refresh::refresh;
pub use register::register;
