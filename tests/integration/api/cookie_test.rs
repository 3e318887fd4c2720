//! Cookie attributes as seen by a browser

use axum::http::StatusCode;
use tower_cookies::cookie::SameSite;
use tower_cookies::cookie::time::Duration;

use crate::common::{
    register_body, test_config, CookieJar, TestApp, TestRequest, TestResponse, TEST_SECRET,
};
use community_identity::backend::auth::cookies::{ACCESS_COOKIE, REFRESH_COOKIE};
use community_identity::backend::server::ServerConfig;
use community_identity::shared::config::Environment;

async fn register(app: &TestApp, prefix: &str) -> TestResponse {
    let response = app
        .send(
            TestRequest::post(&format!("{}/register", prefix))
                .json(register_body("cookie@example.com", "cookie_monster")),
        )
        .await;
    assert_eq!(response.status, StatusCode::CREATED, "body: {}", response.body);
    response
}

#[tokio::test]
async fn test_session_cookie_attributes() {
    let app = TestApp::new();
    let response = register(&app, "/api/auth").await;

    let access = response.set_cookie(ACCESS_COOKIE).expect("session cookie");
    assert_eq!(access.http_only(), Some(true));
    assert_eq!(access.same_site(), Some(SameSite::Lax));
    assert_eq!(access.path(), Some("/"));
    assert_eq!(access.max_age(), Some(Duration::seconds(900)));
    assert_ne!(access.secure(), Some(true));

    let refresh = response.set_cookie(REFRESH_COOKIE).expect("refresh cookie");
    assert_eq!(refresh.http_only(), Some(true));
    assert_eq!(refresh.same_site(), Some(SameSite::Lax));
    assert_eq!(refresh.path(), Some("/api/auth"));
    assert_eq!(refresh.max_age(), Some(Duration::seconds(604_800)));
}

#[tokio::test]
async fn test_production_cookies_are_secure() {
    let app = TestApp::with_config(test_config(Environment::Production));
    let response = register(&app, "/api/auth").await;

    for name in [ACCESS_COOKIE, REFRESH_COOKIE] {
        let cookie = response.set_cookie(name).expect("cookie");
        assert_eq!(cookie.secure(), Some(true), "{} should be Secure", name);
    }
}

#[tokio::test]
async fn test_removal_cookies_match_original_paths() {
    let app = TestApp::new();
    let mut jar = CookieJar::new();
    jar.absorb(&register(&app, "/api/auth").await);

    let response = app
        .send_with(&mut jar, TestRequest::post("/api/auth/logout"))
        .await;

    let access = response.set_cookie(ACCESS_COOKIE).expect("session removal");
    assert_eq!(access.value(), "");
    assert_eq!(access.path(), Some("/"));
    assert_eq!(access.max_age(), Some(Duration::ZERO));

    let refresh = response.set_cookie(REFRESH_COOKIE).expect("refresh removal");
    assert_eq!(refresh.value(), "");
    assert_eq!(refresh.path(), Some("/api/auth"));
    assert_eq!(refresh.max_age(), Some(Duration::ZERO));
}

#[tokio::test]
async fn test_refresh_cookie_follows_custom_prefix() {
    let config = ServerConfig::builder()
        .environment(Environment::Test)
        .session_secret(TEST_SECRET)
        .bcrypt_cost(4)
        .auth_route_prefix("/v2/identity/")
        .build()
        .expect("config");
    let app = TestApp::with_config(config);
    let mut jar = CookieJar::new();

    let response = register(&app, "/v2/identity").await;
    jar.absorb(&response);
    assert_eq!(
        response.set_cookie(REFRESH_COOKIE).and_then(|c| c.path().map(str::to_string)),
        Some("/v2/identity".to_string())
    );

    jar.remove(ACCESS_COOKIE);
    let refreshed = app
        .send_with(&mut jar, TestRequest::post("/v2/identity/refresh"))
        .await;
    assert_eq!(refreshed.status, StatusCode::OK);

    let old_prefix = app.send(TestRequest::post("/api/auth/login")).await;
    assert_eq!(old_prefix.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_refresh_cookie_not_sent_outside_auth_prefix() {
    let app = TestApp::new();
    let mut jar = CookieJar::new();
    jar.absorb(&register(&app, "/api/auth").await);

    let outside = jar.header_for("/health").unwrap_or_default();
    assert!(outside.contains(ACCESS_COOKIE));
    assert!(!outside.contains(REFRESH_COOKIE));
}
