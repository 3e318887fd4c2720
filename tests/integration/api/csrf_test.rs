//! CSRF marker enforcement on state-changing routes

use axum::http::StatusCode;

use crate::assert_api_error;
use crate::common::{auth_path, login_body, register_body, register_user, CookieJar, TestApp, TestRequest, TEST_PASSWORD};
use community_identity::backend::auth::cookies::ACCESS_COOKIE;

#[tokio::test]
async fn test_post_without_marker_is_forbidden() {
    let app = TestApp::new();

    let register = app
        .send(
            TestRequest::post(&auth_path("register"))
                .json(register_body("csrf@example.com", "csrf"))
                .without_csrf(),
        )
        .await;
    assert_api_error!(register, StatusCode::FORBIDDEN, "CSRF_ERROR");
    assert_eq!(register.error_message(), Some("Invalid request"));
    assert!(register.set_cookies().is_empty());
    assert!(app.directory.is_empty().await);

    for endpoint in ["login", "refresh", "logout"] {
        let response = app
            .send(
                TestRequest::post(&auth_path(endpoint))
                    .json(login_body("csrf@example.com", TEST_PASSWORD))
                    .without_csrf(),
            )
            .await;
        assert_api_error!(response, StatusCode::FORBIDDEN, "CSRF_ERROR");
    }
}

#[tokio::test]
async fn test_forged_logout_keeps_session() {
    let app = TestApp::new();
    let mut jar = CookieJar::new();
    register_user(&app, &mut jar, "victim@example.com", "victim").await;

    let forged = app
        .send_with(&mut jar, TestRequest::post(&auth_path("logout")).without_csrf())
        .await;
    assert_api_error!(forged, StatusCode::FORBIDDEN, "CSRF_ERROR");
    assert!(jar.get(ACCESS_COOKIE).is_some());

    let me = app.send_with(&mut jar, TestRequest::get(&auth_path("me")).without_csrf()).await;
    assert_eq!(me.status, StatusCode::OK);
}

#[tokio::test]
async fn test_get_is_not_guarded() {
    let app = TestApp::new();
    let response = app.send(TestRequest::get(&auth_path("me")).without_csrf()).await;
    assert_api_error!(response, StatusCode::UNAUTHORIZED, "NO_SESSION");
}
