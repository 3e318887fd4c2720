//! Authentication Module
//!
//! This module owns the server side of the session lifecycle: signed
//! credentials, the cookies that carry them, the CSRF check on state-changing
//! requests, and the identity operations built on top.
//!
//! # Module Structure
//!
//! ```text
//! auth/
//! ├── mod.rs          - Module exports and documentation
//! ├── tokens.rs       - Token authority (HS256 access/refresh credentials)
//! ├── cookies.rs      - Cookie policy and credential store
//! ├── csrf.rs         - X-Requested-With guard
//! ├── password.rs     - bcrypt hashing on the blocking pool
//! ├── users.rs        - User record and user directory (Postgres / memory)
//! ├── service.rs      - Identity authority (register/login/refresh/logout)
//! └── handlers/       - HTTP handlers
//! ```
//!
//! # Authentication Flow
//!
//! 1. **Register / Login**: credentials checked → access + refresh cookies set
//! 2. **Me**: access cookie verified → identity returned
//! 3. **Refresh**: access or refresh cookie verified → new access cookie
//! 4. **Logout**: both cookies cleared
//!
//! # Security
//!
//! - Passwords are hashed using bcrypt before storage
//! - Credentials are HttpOnly cookies and never appear in response bodies
//! - The refresh cookie is only sent to the auth routes
//! - Unknown email and wrong password produce the same 401

/// Signed access and refresh credentials
pub mod tokens;

/// Cookie credential store
pub mod cookies;

/// CSRF header check
pub mod csrf;

/// Password hashing
pub mod password;

/// User data model and directory
pub mod users;

/// Identity authority
pub mod service;

/// HTTP handlers for authentication endpoints
pub mod handlers;

pub use cookies::{CookieCredentialStore, CookiePolicy, CredentialStore, MemoryCredentialStore};
pub use csrf::CsrfGuard;
pub use password::PasswordHasher;
pub use service::{IdentityAuthority, IssuedSession, RegistrationCheck};
pub use tokens::{Claims, InvalidToken, IssuedToken, TokenAuthority, TokenError, TokenKind};
pub use users::{DirectoryError, InMemoryUserDirectory, PgUserDirectory, UniqueField, User, UserDirectory};
