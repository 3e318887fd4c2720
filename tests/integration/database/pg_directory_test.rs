//! PostgreSQL user directory
//!
//! Runs only when `TEST_DATABASE_URL` points at a disposable database;
//! otherwise each test returns early.

use assert_matches::assert_matches;
use chrono::{DateTime, Utc};
use serial_test::serial;
use sqlx::postgres::PgPoolOptions;
use uuid::Uuid;

use community_identity::backend::auth::users::{
    DirectoryError, NewUser, PgUserDirectory, UniqueField, UserDirectory,
};

async fn directory() -> Option<PgUserDirectory> {
    let Ok(url) = std::env::var("TEST_DATABASE_URL") else {
        eprintln!("TEST_DATABASE_URL not set, skipping");
        return None;
    };
    let pool = PgPoolOptions::new()
        .max_connections(2)
        .connect(&url)
        .await
        .expect("connect to test database");
    sqlx::migrate!().run(&pool).await.expect("migrations");
    sqlx::query("TRUNCATE users").execute(&pool).await.expect("truncate");
    Some(PgUserDirectory::new(pool))
}

fn new_user(email: &str, username: &str, display_name: Option<&str>) -> NewUser {
    NewUser {
        email: email.to_string(),
        username: username.to_string(),
        password_hash: "$2b$04$abcdefghijklmnopqrstuuJ1ZtqkF4m0GkQyGJ8C7U9uV0eP6a1mW".to_string(),
        display_name: display_name.map(str::to_string),
        created_at: Utc::now(),
    }
}

#[tokio::test]
#[serial]
async fn test_insert_and_lookup_case_insensitive() {
    let Some(directory) = directory().await else { return };

    let created = directory
        .insert(new_user("Grace@Example.com", "Grace", Some("Admiral")))
        .await
        .expect("insert");
    assert_eq!(created.email, "grace@example.com");
    assert!(created.is_active);
    assert!(!created.is_banned);
    assert!(!created.is_verified);

    let by_email = directory.find_by_email("GRACE@example.com").await.expect("query");
    assert_eq!(by_email.map(|u| u.id), Some(created.id));

    let by_username = directory.find_by_username("grace").await.expect("query");
    assert_eq!(by_username.map(|u| u.id), Some(created.id));

    let by_display = directory.find_by_display_name("ADMIRAL").await.expect("query");
    assert_eq!(by_display.map(|u| u.id), Some(created.id));

    assert!(directory.find_by_id(Uuid::new_v4()).await.expect("query").is_none());
}

#[tokio::test]
#[serial]
async fn test_unique_violation_names_the_field() {
    let Some(directory) = directory().await else { return };

    directory
        .insert(new_user("one@example.com", "one", Some("Uno")))
        .await
        .expect("insert");

    let err = directory
        .insert(new_user("ONE@example.com", "two", None))
        .await
        .unwrap_err();
    assert_matches!(err, DirectoryError::Conflict { field: UniqueField::Email });

    let err = directory
        .insert(new_user("two@example.com", "ONE", None))
        .await
        .unwrap_err();
    assert_matches!(err, DirectoryError::Conflict { field: UniqueField::Username });
}

#[tokio::test]
#[serial]
async fn test_record_login_and_status_changes() {
    let Some(directory) = directory().await else { return };
    let user = directory
        .insert(new_user("status@example.com", "status", None))
        .await
        .expect("insert");

    let at: DateTime<Utc> = DateTime::from_timestamp(1_704_067_200, 0).expect("timestamp");
    directory.record_login(user.id, at).await.expect("record login");
    let reloaded = directory.find_by_id(user.id).await.expect("query").expect("user");
    assert_eq!(reloaded.last_login_at, Some(at));

    let banned = directory
        .set_account_status(user.id, true, true)
        .await
        .expect("update")
        .expect("user");
    assert!(banned.is_banned);
    assert!(!banned.can_sign_in());

    tokio_test::assert_ok!(directory.ping().await);
    assert_eq!(directory.backend_name(), "postgres");
}
