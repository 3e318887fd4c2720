//! Mock server helpers for client tests
//!
//! Wraps wiremock with envelope builders matching the identity server.

use chrono::{DateTime, Utc};
use serde_json::{json, Value};
use uuid::Uuid;
use wiremock::MockServer;

use community_identity::client::{ClientConfig, HttpAuthApi};
use community_identity::shared::config::AppConfig;
use community_identity::shared::identity::{PublicIdentity, UserType};

pub fn sample_identity() -> PublicIdentity {
    let created = DateTime::parse_from_rfc3339("2024-01-01T00:00:00Z")
        .expect("timestamp")
        .with_timezone(&Utc);
    PublicIdentity {
        id: Uuid::new_v4(),
        email: "ada@example.com".to_string(),
        username: "ada".to_string(),
        display_name: Some("Ada".to_string()),
        avatar: None,
        user_type: UserType::Player,
        is_verified: false,
        is_active: true,
        is_banned: false,
        created_at: created,
        updated_at: created,
        last_login_at: None,
    }
}

pub fn session_envelope(user: &PublicIdentity, expires_at: DateTime<Utc>) -> Value {
    json!({
        "success": true,
        "data": { "user": user, "expiresAt": expires_at },
    })
}

pub fn error_envelope(code: &str, message: &str) -> Value {
    json!({
        "success": false,
        "error": { "code": code, "message": message },
    })
}

pub fn client_config(base_url: &str) -> ClientConfig {
    ClientConfig::with_builder(AppConfig::builder().server_url(base_url)).expect("client config")
}

/// `HttpAuthApi` pointed at a wiremock server
pub fn api_for(server: &MockServer) -> HttpAuthApi {
    HttpAuthApi::new(client_config(&server.uri())).expect("http client")
}
