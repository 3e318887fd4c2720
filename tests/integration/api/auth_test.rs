//! Session lifecycle over HTTP: register, login, refresh, logout, me

use axum::http::StatusCode;
use pretty_assertions::assert_eq;
use serde_json::json;
use std::sync::Arc;
use tokio::task::JoinSet;

use crate::common::{
    auth_path, login_body, register_body, register_user, unique_account, CookieJar, TestApp,
    TestRequest, TEST_PASSWORD, TEST_START_SECS,
};
use crate::{assert_api_error, assert_api_ok};
use community_identity::backend::auth::cookies::{ACCESS_COOKIE, REFRESH_COOKIE};
use community_identity::backend::auth::tokens::{ACCESS_TOKEN_TTL_SECS, REFRESH_TOKEN_TTL_SECS};
use community_identity::backend::auth::users::UserDirectory;

#[tokio::test]
async fn test_register_returns_identity_and_sets_both_cookies() {
    let app = TestApp::new();
    let mut jar = CookieJar::new();

    let response = app
        .send_with(
            &mut jar,
            TestRequest::post(&auth_path("register")).json(json!({
                "email": "Ada@Example.com",
                "username": "ada",
                "password": TEST_PASSWORD,
                "displayName": "Ada",
            })),
        )
        .await;

    assert_api_ok!(response, StatusCode::CREATED);
    let user = &response.body["data"]["user"];
    assert_eq!(user["email"], "ada@example.com");
    assert_eq!(user["username"], "ada");
    assert_eq!(user["displayName"], "Ada");
    assert_eq!(user["userType"], "PLAYER");
    assert_eq!(user["isVerified"], false);
    assert!(user.get("passwordHash").is_none());

    let expected_expiry = chrono::DateTime::from_timestamp(TEST_START_SECS + ACCESS_TOKEN_TTL_SECS, 0)
        .expect("timestamp");
    let expires_at: chrono::DateTime<chrono::Utc> =
        serde_json::from_value(response.body["data"]["expiresAt"].clone()).expect("expiresAt");
    assert_eq!(expires_at, expected_expiry);

    assert!(jar.get(ACCESS_COOKIE).is_some());
    assert!(jar.get(REFRESH_COOKIE).is_some());
}

#[tokio::test]
async fn test_register_then_login_yields_same_account() {
    let app = TestApp::new();
    let (email, username) = unique_account();
    let registered = register_user(&app, &mut CookieJar::new(), &email, &username).await;

    let mut jar = CookieJar::new();
    let response = app
        .send_with(
            &mut jar,
            TestRequest::post(&auth_path("login")).json(login_body(&email.to_uppercase(), TEST_PASSWORD)),
        )
        .await;

    assert_api_ok!(response, StatusCode::OK);
    assert_eq!(response.body["data"]["user"]["id"], json!(registered.id));
    assert!(response.body["data"]["user"]["lastLoginAt"].is_string());
    assert!(jar.get(ACCESS_COOKIE).is_some());
    assert!(jar.get(REFRESH_COOKIE).is_some());
}

#[tokio::test]
async fn test_login_failures_are_indistinguishable() {
    let app = TestApp::new();
    let (email, username) = unique_account();
    register_user(&app, &mut CookieJar::new(), &email, &username).await;

    let wrong_password = app
        .send(TestRequest::post(&auth_path("login")).json(login_body(&email, "Wrong0ne!")))
        .await;
    let unknown_email = app
        .send(TestRequest::post(&auth_path("login")).json(login_body("nobody@example.com", TEST_PASSWORD)))
        .await;

    assert_api_error!(wrong_password, StatusCode::UNAUTHORIZED, "INVALID_CREDENTIALS");
    assert_api_error!(unknown_email, StatusCode::UNAUTHORIZED, "INVALID_CREDENTIALS");
    assert_eq!(wrong_password.body, unknown_email.body);
    assert!(wrong_password.set_cookies().is_empty());
    assert!(unknown_email.set_cookies().is_empty());
}

#[tokio::test]
async fn test_register_rejects_weak_password() {
    let app = TestApp::new();
    let response = app
        .send(TestRequest::post(&auth_path("register")).json(json!({
            "email": "weak@example.com",
            "username": "weakling",
            "password": "password",
        })))
        .await;

    assert_api_error!(response, StatusCode::BAD_REQUEST, "VALIDATION_ERROR");
    assert!(response.set_cookies().is_empty());
    assert!(app.directory.is_empty().await);
}

#[tokio::test]
async fn test_register_rejects_mismatched_confirmation() {
    let app = TestApp::new();
    let response = app
        .send(TestRequest::post(&auth_path("register")).json(json!({
            "email": "typo@example.com",
            "username": "typo",
            "password": TEST_PASSWORD,
            "confirmPassword": "Passw0rd?",
        })))
        .await;

    assert_api_error!(response, StatusCode::BAD_REQUEST, "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_malformed_body_is_a_validation_error() {
    let app = TestApp::new();
    let response = app
        .send(TestRequest::post(&auth_path("login")).raw_body("{not json"))
        .await;

    assert_api_error!(response, StatusCode::BAD_REQUEST, "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_duplicate_registration_conflicts() {
    let app = TestApp::new();
    register_user(&app, &mut CookieJar::new(), "dup@example.com", "first").await;

    let same_email = app
        .send(TestRequest::post(&auth_path("register")).json(register_body("DUP@example.com", "second")))
        .await;
    assert_api_error!(same_email, StatusCode::CONFLICT, "CONFLICT");
    assert_eq!(same_email.error_message(), Some("Email is already registered"));

    let same_username = app
        .send(TestRequest::post(&auth_path("register")).json(register_body("other@example.com", "FIRST")))
        .await;
    assert_api_error!(same_username, StatusCode::CONFLICT, "CONFLICT");
    assert_eq!(same_username.error_message(), Some("Username is already taken"));
}

#[tokio::test]
async fn test_concurrent_registration_creates_one_account() {
    let app = Arc::new(TestApp::new());
    let mut tasks = JoinSet::new();

    for i in 0..8 {
        let app = app.clone();
        tasks.spawn(async move {
            app.send(
                TestRequest::post(&auth_path("register"))
                    .json(register_body("race@example.com", &format!("racer{}", i))),
            )
            .await
            .status
        });
    }

    let mut created = 0;
    let mut conflicts = 0;
    while let Some(status) = tasks.join_next().await {
        match status.expect("task panicked") {
            StatusCode::CREATED => created += 1,
            StatusCode::CONFLICT => conflicts += 1,
            other => panic!("unexpected status {}", other),
        }
    }

    assert_eq!(created, 1);
    assert_eq!(conflicts, 7);
    assert_eq!(app.directory.len().await, 1);
}

#[tokio::test]
async fn test_banned_account_gets_no_session() {
    let app = TestApp::new();
    let user = register_user(&app, &mut CookieJar::new(), "banned@example.com", "banned").await;
    app.directory
        .set_account_status(user.id, true, true)
        .await
        .expect("status update");

    let response = app
        .send(TestRequest::post(&auth_path("login")).json(login_body("banned@example.com", TEST_PASSWORD)))
        .await;

    assert_api_error!(response, StatusCode::FORBIDDEN, "ACCOUNT_INACTIVE");
    assert!(response.set_cookies().is_empty());
}

#[tokio::test]
async fn test_refresh_with_only_refresh_cookie_reissues_access() {
    let app = TestApp::new();
    let mut jar = CookieJar::new();
    register_user(&app, &mut jar, "refresh@example.com", "refresher").await;

    app.clock.advance_secs(ACCESS_TOKEN_TTL_SECS + 60);
    jar.remove(ACCESS_COOKIE);

    let response = app
        .send_with(&mut jar, TestRequest::post(&auth_path("refresh")))
        .await;

    assert_api_ok!(response, StatusCode::OK);
    let expires_at: chrono::DateTime<chrono::Utc> =
        serde_json::from_value(response.body["data"]["expiresAt"].clone()).expect("expiresAt");
    let now = TEST_START_SECS + ACCESS_TOKEN_TTL_SECS + 60;
    assert_eq!(expires_at.timestamp(), now + ACCESS_TOKEN_TTL_SECS);
    assert!(jar.get(ACCESS_COOKIE).is_some());

    let me = app.send_with(&mut jar, TestRequest::get(&auth_path("me"))).await;
    assert_api_ok!(me, StatusCode::OK);
    assert_eq!(me.body["data"]["user"]["username"], "refresher");
}

#[tokio::test]
async fn test_refresh_does_not_rotate_refresh_cookie() {
    let app = TestApp::new();
    let mut jar = CookieJar::new();
    register_user(&app, &mut jar, "stable@example.com", "stable").await;
    let refresh_before = jar.get(REFRESH_COOKIE).map(str::to_string);

    let response = app
        .send_with(&mut jar, TestRequest::post(&auth_path("refresh")))
        .await;

    assert_api_ok!(response, StatusCode::OK);
    assert!(response.set_cookie(REFRESH_COOKIE).is_none());
    assert_eq!(jar.get(REFRESH_COOKIE).map(str::to_string), refresh_before);
}

#[tokio::test]
async fn test_expired_refresh_clears_cookies() {
    let app = TestApp::new();
    let mut jar = CookieJar::new();
    register_user(&app, &mut jar, "stale@example.com", "stale").await;

    app.clock.advance_secs(REFRESH_TOKEN_TTL_SECS + 1);
    let response = app
        .send_with(&mut jar, TestRequest::post(&auth_path("refresh")))
        .await;

    assert_api_error!(response, StatusCode::UNAUTHORIZED, "NO_SESSION");
    let cleared = response.set_cookies();
    assert!(cleared.iter().any(|c| c.name() == ACCESS_COOKIE && c.value().is_empty()));
    assert!(cleared.iter().any(|c| c.name() == REFRESH_COOKIE && c.value().is_empty()));
    assert!(jar.is_empty());
}

#[tokio::test]
async fn test_refresh_without_cookies_is_no_session() {
    let app = TestApp::new();
    let response = app.send(TestRequest::post(&auth_path("refresh"))).await;
    assert_api_error!(response, StatusCode::UNAUTHORIZED, "NO_SESSION");
}

#[tokio::test]
async fn test_tampered_refresh_token_is_invalid() {
    let app = TestApp::new();
    let mut jar = CookieJar::new();
    register_user(&app, &mut jar, "tamper@example.com", "tamper").await;
    jar.remove(ACCESS_COOKIE);
    let forged = format!("{}x", jar.get(REFRESH_COOKIE).expect("refresh cookie"));
    jar.insert(REFRESH_COOKIE, &forged, "/api/auth");

    let response = app
        .send_with(&mut jar, TestRequest::post(&auth_path("refresh")))
        .await;

    assert_api_error!(response, StatusCode::UNAUTHORIZED, "INVALID_TOKEN");
    assert!(jar.is_empty());
}

#[tokio::test]
async fn test_refresh_for_deleted_or_banned_user_fails() {
    let app = TestApp::new();
    let mut jar = CookieJar::new();
    let user = register_user(&app, &mut jar, "later@example.com", "later").await;
    app.directory
        .set_account_status(user.id, false, false)
        .await
        .expect("status update");
    jar.remove(ACCESS_COOKIE);

    let response = app
        .send_with(&mut jar, TestRequest::post(&auth_path("refresh")))
        .await;

    assert_api_error!(response, StatusCode::FORBIDDEN, "ACCOUNT_INACTIVE");
}

#[tokio::test]
async fn test_logout_clears_cookies_and_ends_session() {
    let app = TestApp::new();
    let mut jar = CookieJar::new();
    register_user(&app, &mut jar, "bye@example.com", "bye").await;

    let response = app
        .send_with(&mut jar, TestRequest::post(&auth_path("logout")))
        .await;
    assert_api_ok!(response, StatusCode::OK);
    assert!(response.body.get("data").is_none());
    assert!(jar.is_empty());

    let me = app.send_with(&mut jar, TestRequest::get(&auth_path("me"))).await;
    assert_api_error!(me, StatusCode::UNAUTHORIZED, "NO_SESSION");

    let again = app
        .send_with(&mut jar, TestRequest::post(&auth_path("logout")))
        .await;
    assert_api_ok!(again, StatusCode::OK);
}

#[tokio::test]
async fn test_me_requires_a_live_access_cookie() {
    let app = TestApp::new();
    let mut jar = CookieJar::new();
    let user = register_user(&app, &mut jar, "me@example.com", "itsme").await;

    let me = app.send_with(&mut jar, TestRequest::get(&auth_path("me"))).await;
    assert_api_ok!(me, StatusCode::OK);
    assert_eq!(me.body["data"]["user"]["id"], json!(user.id));

    app.clock.advance_secs(ACCESS_TOKEN_TTL_SECS);
    let expired = app.send_with(&mut jar, TestRequest::get(&auth_path("me"))).await;
    assert_api_error!(expired, StatusCode::UNAUTHORIZED, "NO_SESSION");
}

#[tokio::test]
async fn test_me_with_garbage_cookie_is_invalid_token() {
    let app = TestApp::new();
    let mut jar = CookieJar::new();
    jar.insert(ACCESS_COOKIE, "not-a-token", "/");

    let response = app.send_with(&mut jar, TestRequest::get(&auth_path("me"))).await;
    assert_api_error!(response, StatusCode::UNAUTHORIZED, "INVALID_TOKEN");
    assert_eq!(response.error_message(), Some("Invalid session token"));
}

#[tokio::test]
async fn test_unknown_route_is_404() {
    let app = TestApp::new();
    let response = app.send(TestRequest::get("/api/auth/nope")).await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}
