//! # Session Persistence
//!
//! Keeps the signed-in identity across restarts without a network round
//! trip. Only the identity projection and the access expiry are written;
//! credentials stay in the HTTP client's cookie store.
//!
//! A persisted session whose expiry has passed is discarded on load.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;
use std::path::Path;
use std::sync::Mutex;

use crate::client::error::PersistenceError;
use crate::shared::identity::CurrentUserIdentity;

/// What gets written to local storage
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedSession {
    pub user: CurrentUserIdentity,
    pub expires_at: DateTime<Utc>,
}

#[async_trait]
pub trait SessionPersistence: Send + Sync {
    async fn save(&self, session: &PersistedSession) -> Result<(), PersistenceError>;

    /// Stored session, expired or not
    async fn load(&self) -> Result<Option<PersistedSession>, PersistenceError>;

    async fn purge(&self) -> Result<(), PersistenceError>;

    /// Stored session if still valid at `now`; an expired one is purged.
    async fn load_valid(&self, now: DateTime<Utc>) -> Result<Option<PersistedSession>, PersistenceError> {
        match self.load().await? {
            Some(session) if session.expires_at > now => Ok(Some(session)),
            Some(_) => {
                tracing::info!("Discarding expired persisted session");
                self.purge().await?;
                Ok(None)
            }
            None => Ok(None),
        }
    }
}

/// SQLite-backed session file
#[derive(Debug, Clone)]
pub struct SqliteSessionStore {
    pool: SqlitePool,
}

impl SqliteSessionStore {
    /// Open or create the session database at `path`
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, PersistenceError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let database_url = format!("sqlite:{}?mode=rwc", path.to_string_lossy());
        let pool = SqlitePoolOptions::new()
            .max_connections(2)
            .connect(&database_url)
            .await?;

        sqlx::query("PRAGMA journal_mode=WAL").execute(&pool).await?;
        sqlx::query("PRAGMA synchronous=NORMAL").execute(&pool).await?;

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS session (
                id INTEGER PRIMARY KEY CHECK (id = 1),
                user_json TEXT NOT NULL,
                expires_at TEXT NOT NULL
            )",
        )
        .execute(&pool)
        .await?;

        Ok(Self { pool })
    }
}

#[async_trait]
impl SessionPersistence for SqliteSessionStore {
    async fn save(&self, session: &PersistedSession) -> Result<(), PersistenceError> {
        let user_json =
            serde_json::to_string(&session.user).map_err(|e| PersistenceError::Corrupt(e.to_string()))?;

        sqlx::query(
            "INSERT INTO session (id, user_json, expires_at) VALUES (1, ?, ?)
             ON CONFLICT(id) DO UPDATE SET user_json = excluded.user_json, expires_at = excluded.expires_at",
        )
        .bind(user_json)
        .bind(session.expires_at.to_rfc3339())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn load(&self) -> Result<Option<PersistedSession>, PersistenceError> {
        let row: Option<(String, String)> =
            sqlx::query_as("SELECT user_json, expires_at FROM session WHERE id = 1")
                .fetch_optional(&self.pool)
                .await?;

        let Some((user_json, expires_at)) = row else {
            return Ok(None);
        };

        let user = serde_json::from_str(&user_json).map_err(|e| PersistenceError::Corrupt(e.to_string()))?;
        let expires_at = DateTime::parse_from_rfc3339(&expires_at)
            .map_err(|e| PersistenceError::Corrupt(e.to_string()))?
            .with_timezone(&Utc);

        Ok(Some(PersistedSession { user, expires_at }))
    }

    async fn purge(&self) -> Result<(), PersistenceError> {
        sqlx::query("DELETE FROM session").execute(&self.pool).await?;
        Ok(())
    }
}

/// In-process persistence for tests and ephemeral clients
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    slot: Mutex<Option<PersistedSession>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_session(session: PersistedSession) -> Self {
        Self {
            slot: Mutex::new(Some(session)),
        }
    }

    /// Current contents without the expiry check
    pub fn snapshot(&self) -> Option<PersistedSession> {
        self.slot
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    fn replace(&self, value: Option<PersistedSession>) {
        *self.slot.lock().unwrap_or_else(|poisoned| poisoned.into_inner()) = value;
    }
}

#[async_trait]
impl SessionPersistence for MemorySessionStore {
    async fn save(&self, session: &PersistedSession) -> Result<(), PersistenceError> {
        self.replace(Some(session.clone()));
        Ok(())
    }

    async fn load(&self) -> Result<Option<PersistedSession>, PersistenceError> {
        Ok(self.snapshot())
    }

    async fn purge(&self) -> Result<(), PersistenceError> {
        self.replace(None);
        Ok(())
    }
}
