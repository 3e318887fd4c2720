/**
 * User Model and Directory
 *
 * The identity authority never talks to a database directly; it calls a
 * `UserDirectory`. Two implementations live here:
 *
 * - `PgUserDirectory` - PostgreSQL via sqlx, uniqueness enforced by
 *   case-insensitive unique indexes (see `migrations/`)
 * - `InMemoryUserDirectory` - process-local map used when `DATABASE_URL` is
 *   unset and in tests; uniqueness enforced under a single write lock
 *
 * Either way the directory is the final uniqueness authority: a duplicate
 * insert fails with `DirectoryError::Conflict` even if the caller's
 * pre-check raced with another registration.
 */

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use std::collections::HashMap;
use thiserror::Error;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::shared::identity::{PublicIdentity, UserType};

/// User record as stored by the directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: Uuid,
    /// Stored lower-cased
    pub email: String,
    pub username: String,
    /// bcrypt hash
    pub password_hash: String,
    pub display_name: Option<String>,
    pub avatar: Option<String>,
    pub user_type: UserType,
    pub is_verified: bool,
    pub is_active: bool,
    pub is_banned: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub last_login_at: Option<DateTime<Utc>>,
}

impl User {
    /// Whether the account may hold a session
    pub fn can_sign_in(&self) -> bool {
        self.is_active && !self.is_banned
    }

    pub fn to_public(&self) -> PublicIdentity {
        PublicIdentity {
            id: self.id,
            email: self.email.clone(),
            username: self.username.clone(),
            display_name: self.display_name.clone(),
            avatar: self.avatar.clone(),
            user_type: self.user_type,
            is_verified: self.is_verified,
            is_active: self.is_active,
            is_banned: self.is_banned,
            created_at: self.created_at,
            updated_at: self.updated_at,
            last_login_at: self.last_login_at,
        }
    }
}

/// Fields supplied when creating an account
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub username: String,
    pub password_hash: String,
    pub display_name: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Fields that must be unique across accounts (case-insensitive)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UniqueField {
    Email,
    Username,
    DisplayName,
}

impl UniqueField {
    pub fn conflict_message(&self) -> &'static str {
        match self {
            UniqueField::Email => "Email is already registered",
            UniqueField::Username => "Username is already taken",
            UniqueField::DisplayName => "Display name is already taken",
        }
    }
}

#[derive(Debug, Error)]
pub enum DirectoryError {
    #[error("unique constraint violated on {field:?}")]
    Conflict { field: UniqueField },

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("corrupt user record: {0}")]
    Corrupt(String),
}

/// User storage capability consumed by the identity authority
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// Insert a new account with default flags
    /// (`is_verified=false`, `is_active=true`, `is_banned=false`, `PLAYER`).
    async fn insert(&self, user: NewUser) -> Result<User, DirectoryError>;

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, DirectoryError>;

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, DirectoryError>;

    async fn find_by_display_name(&self, display_name: &str) -> Result<Option<User>, DirectoryError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, DirectoryError>;

    /// Stamp `last_login_at`
    async fn record_login(&self, id: Uuid, at: DateTime<Utc>) -> Result<(), DirectoryError>;

    /// Moderation hook: change the active/banned flags of an account
    async fn set_account_status(
        &self,
        id: Uuid,
        is_active: bool,
        is_banned: bool,
    ) -> Result<Option<User>, DirectoryError>;

    /// Liveness probe for `/health`
    async fn ping(&self) -> Result<(), DirectoryError>;

    /// Short backend name for logs and health output
    fn backend_name(&self) -> &'static str;
}

// ---------------------------------------------------------------------------
// PostgreSQL
// ---------------------------------------------------------------------------

const USER_COLUMNS: &str = "id, email, username, password_hash, display_name, avatar, user_type, \
     is_verified, is_active, is_banned, created_at, updated_at, last_login_at";

#[derive(Debug, sqlx::FromRow)]
struct UserRow {
    id: Uuid,
    email: String,
    username: String,
    password_hash: String,
    display_name: Option<String>,
    avatar: Option<String>,
    user_type: String,
    is_verified: bool,
    is_active: bool,
    is_banned: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    last_login_at: Option<DateTime<Utc>>,
}

impl TryFrom<UserRow> for User {
    type Error = DirectoryError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let user_type = row
            .user_type
            .parse::<UserType>()
            .map_err(|e| DirectoryError::Corrupt(e.to_string()))?;
        Ok(User {
            id: row.id,
            email: row.email,
            username: row.username,
            password_hash: row.password_hash,
            display_name: row.display_name,
            avatar: row.avatar,
            user_type,
            is_verified: row.is_verified,
            is_active: row.is_active,
            is_banned: row.is_banned,
            created_at: row.created_at,
            updated_at: row.updated_at,
            last_login_at: row.last_login_at,
        })
    }
}

/// Map a unique-index violation to the field it guards.
fn conflict_from_constraint(constraint: Option<&str>) -> UniqueField {
    match constraint {
        Some(name) if name.contains("username") => UniqueField::Username,
        Some(name) if name.contains("display_name") => UniqueField::DisplayName,
        _ => UniqueField::Email,
    }
}

/// PostgreSQL-backed user directory
#[derive(Debug, Clone)]
pub struct PgUserDirectory {
    pool: PgPool,
}

impl PgUserDirectory {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn find_one(&self, predicate: &str, value: &str) -> Result<Option<User>, DirectoryError> {
        let query = format!("SELECT {} FROM users WHERE {} = lower($1)", USER_COLUMNS, predicate);
        let row = sqlx::query_as::<_, UserRow>(&query)
            .bind(value)
            .fetch_optional(&self.pool)
            .await?;
        row.map(User::try_from).transpose()
    }
}

#[async_trait]
impl UserDirectory for PgUserDirectory {
    async fn insert(&self, user: NewUser) -> Result<User, DirectoryError> {
        let query = format!(
            r#"
            INSERT INTO users (id, email, username, password_hash, display_name, user_type,
                               is_verified, is_active, is_banned, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, FALSE, TRUE, FALSE, $7, $7)
            RETURNING {}
            "#,
            USER_COLUMNS
        );

        let result = sqlx::query_as::<_, UserRow>(&query)
            .bind(Uuid::new_v4())
            .bind(user.email.to_lowercase())
            .bind(&user.username)
            .bind(&user.password_hash)
            .bind(&user.display_name)
            .bind(UserType::default().as_str())
            .bind(user.created_at)
            .fetch_one(&self.pool)
            .await;

        match result {
            Ok(row) => User::try_from(row),
            Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
                Err(DirectoryError::Conflict {
                    field: conflict_from_constraint(db_err.constraint()),
                })
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, DirectoryError> {
        self.find_one("lower(email)", email).await
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, DirectoryError> {
        self.find_one("lower(username)", username).await
    }

    async fn find_by_display_name(&self, display_name: &str) -> Result<Option<User>, DirectoryError> {
        self.find_one("lower(display_name)", display_name).await
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, DirectoryError> {
        let query = format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS);
        let row = sqlx::query_as::<_, UserRow>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.map(User::try_from).transpose()
    }

    async fn record_login(&self, id: Uuid, at: DateTime<Utc>) -> Result<(), DirectoryError> {
        sqlx::query("UPDATE users SET last_login_at = $1, updated_at = $1 WHERE id = $2")
            .bind(at)
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn set_account_status(
        &self,
        id: Uuid,
        is_active: bool,
        is_banned: bool,
    ) -> Result<Option<User>, DirectoryError> {
        let query = format!(
            "UPDATE users SET is_active = $1, is_banned = $2, updated_at = now() WHERE id = $3 RETURNING {}",
            USER_COLUMNS
        );
        let row = sqlx::query_as::<_, UserRow>(&query)
            .bind(is_active)
            .bind(is_banned)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.map(User::try_from).transpose()
    }

    async fn ping(&self) -> Result<(), DirectoryError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "postgres"
    }
}

// ---------------------------------------------------------------------------
// In-memory
// ---------------------------------------------------------------------------

/// Process-local user directory
#[derive(Debug, Default)]
pub struct InMemoryUserDirectory {
    users: RwLock<HashMap<Uuid, User>>,
}

impl InMemoryUserDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.users.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.users.read().await.is_empty()
    }

    async fn find_where<F>(&self, pred: F) -> Option<User>
    where
        F: Fn(&User) -> bool,
    {
        self.users.read().await.values().find(|u| pred(u)).cloned()
    }
}

fn eq_ignore_case(a: &str, b: &str) -> bool {
    a.to_lowercase() == b.to_lowercase()
}

#[async_trait]
impl UserDirectory for InMemoryUserDirectory {
    async fn insert(&self, user: NewUser) -> Result<User, DirectoryError> {
        let mut users = self.users.write().await;

        // Email, then username, then display name, across all users.
        if users.values().any(|u| eq_ignore_case(&u.email, &user.email)) {
            return Err(DirectoryError::Conflict { field: UniqueField::Email });
        }
        if users.values().any(|u| eq_ignore_case(&u.username, &user.username)) {
            return Err(DirectoryError::Conflict { field: UniqueField::Username });
        }
        if let Some(display_name) = &user.display_name {
            let taken = users.values().any(|u| {
                u.display_name
                    .as_deref()
                    .map(|name| eq_ignore_case(name, display_name))
                    .unwrap_or(false)
            });
            if taken {
                return Err(DirectoryError::Conflict { field: UniqueField::DisplayName });
            }
        }

        let record = User {
            id: Uuid::new_v4(),
            email: user.email.to_lowercase(),
            username: user.username,
            password_hash: user.password_hash,
            display_name: user.display_name,
            avatar: None,
            user_type: UserType::default(),
            is_verified: false,
            is_active: true,
            is_banned: false,
            created_at: user.created_at,
            updated_at: user.created_at,
            last_login_at: None,
        };
        users.insert(record.id, record.clone());
        Ok(record)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, DirectoryError> {
        Ok(self.find_where(|u| eq_ignore_case(&u.email, email)).await)
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, DirectoryError> {
        Ok(self.find_where(|u| eq_ignore_case(&u.username, username)).await)
    }

    async fn find_by_display_name(&self, display_name: &str) -> Result<Option<User>, DirectoryError> {
        Ok(self
            .find_where(|u| {
                u.display_name
                    .as_deref()
                    .map(|name| eq_ignore_case(name, display_name))
                    .unwrap_or(false)
            })
            .await)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, DirectoryError> {
        Ok(self.users.read().await.get(&id).cloned())
    }

    async fn record_login(&self, id: Uuid, at: DateTime<Utc>) -> Result<(), DirectoryError> {
        if let Some(user) = self.users.write().await.get_mut(&id) {
            user.last_login_at = Some(at);
            user.updated_at = at;
        }
        Ok(())
    }

    async fn set_account_status(
        &self,
        id: Uuid,
        is_active: bool,
        is_banned: bool,
    ) -> Result<Option<User>, DirectoryError> {
        let mut users = self.users.write().await;
        Ok(users.get_mut(&id).map(|user| {
            user.is_active = is_active;
            user.is_banned = is_banned;
            user.updated_at = Utc::now();
            user.clone()
        }))
    }

    async fn ping(&self) -> Result<(), DirectoryError> {
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}
