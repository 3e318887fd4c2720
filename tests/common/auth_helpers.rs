//! Authentication test helpers
//!
//! Request bodies and a one-call registration for tests that need an
//! existing account.

use axum::http::StatusCode;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::common::app::{CookieJar, TestApp, TestRequest};
use community_identity::shared::identity::PublicIdentity;

/// Password that satisfies the policy
pub const TEST_PASSWORD: &str = "Passw0rd!";

pub const AUTH: &str = "/api/auth";

pub fn auth_path(endpoint: &str) -> String {
    format!("{}/{}", AUTH, endpoint)
}

pub fn register_body(email: &str, username: &str) -> Value {
    json!({
        "email": email,
        "username": username,
        "password": TEST_PASSWORD,
    })
}

pub fn login_body(email: &str, password: &str) -> Value {
    json!({ "email": email, "password": password })
}

/// Unique email/username pair
pub fn unique_account() -> (String, String) {
    let tag = Uuid::new_v4().simple().to_string();
    (format!("user_{}@example.com", &tag[..12]), format!("user_{}", &tag[..12]))
}

/// Register an account through the API and return its identity
pub async fn register_user(app: &TestApp, jar: &mut CookieJar, email: &str, username: &str) -> PublicIdentity {
    let response = app
        .send_with(
            jar,
            TestRequest::post(&auth_path("register")).json(register_body(email, username)),
        )
        .await;
    assert_eq!(response.status, StatusCode::CREATED, "register failed: {}", response.body);
    serde_json::from_value(response.body["data"]["user"].clone()).expect("identity in register response")
}
