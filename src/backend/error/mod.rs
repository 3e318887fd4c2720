//! Backend Error Module
//!
//! Error types of the identity server and their HTTP rendering.
//!
//! # Module Structure
//!
//! ```text
//! error/
//! ├── mod.rs        - Module exports and documentation
//! ├── types.rs      - AuthError taxonomy
//! └── conversion.rs - IntoResponse and From impls
//! ```
//!
//! Handlers return `Result<T, AuthError>` and propagate with `?`; lower-layer
//! errors convert through the `From` impls in `conversion`.

/// Error type definitions
pub mod types;

/// Error conversion implementations
pub mod conversion;

// Re-export commonly used types
pub use types::AuthError;
