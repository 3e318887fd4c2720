//! Shared Module
//!
//! This module contains types and data structures that are shared between
//! the identity server and the client session machine. Everything here is
//! platform-agnostic and serializes with camelCase field names to match the
//! JSON wire format.

/// Shared error types
pub mod error;

/// Application configuration
pub mod config;

/// Time source abstraction
pub mod clock;

/// User identity types and projections
pub mod identity;

/// Request/response envelopes for the auth API
pub mod api;

/// Input validation rules for credentials and profile fields
pub mod validation;

/// Re-export commonly used types for convenience
pub use error::SharedError;
pub use config::{AppConfig, AppConfigBuilder, ConfigError, Environment};
pub use clock::{Clock, ManualClock, SystemClock};
pub use identity::{CurrentUserIdentity, IdentityUpdate, PublicIdentity, UserType};
pub use api::{ApiError, ApiResponse, ErrorCode, LoginRequest, RefreshPayload, RegisterRequest, SessionPayload};
