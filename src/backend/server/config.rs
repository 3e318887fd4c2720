/**
 * Server Configuration
 *
 * Configuration is read from environment variables (optionally via `.env`)
 * and validated up front, so a misconfigured production server refuses to
 * start instead of issuing credentials signed with a weak secret.
 *
 * | Variable            | Default                  |
 * |---------------------|--------------------------|
 * | `SERVER_PORT`       | `3000`                   |
 * | `DATABASE_URL`      | unset → in-memory users  |
 * | `SESSION_SECRET`    | dev fallback (not prod)  |
 * | `APP_ENV`           | `development`            |
 * | `AUTH_ROUTE_PREFIX` | `/api/auth`              |
 * | `CORS_ORIGIN`       | `http://localhost:3000`  |
 * | `BCRYPT_COST`       | bcrypt default           |
 */

use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use thiserror::Error;

use crate::backend::auth::cookies::DEFAULT_AUTH_PREFIX;
use crate::backend::auth::tokens::MIN_SECRET_LEN;
use crate::backend::auth::users::{InMemoryUserDirectory, PgUserDirectory, UserDirectory};
use crate::shared::config::{ConfigError, Environment};

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_CORS_ORIGIN: &str = "http://localhost:3000";

/// Signing secret used outside production when `SESSION_SECRET` is unset
const DEVELOPMENT_SECRET: &str = "development-only-session-secret-do-not-deploy";

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub port: u16,
    pub database_url: Option<String>,
    pub session_secret: String,
    pub environment: Environment,
    pub auth_route_prefix: String,
    pub cors_origins: Vec<String>,
    pub bcrypt_cost: u32,
}

impl ServerConfig {
    pub fn builder() -> ServerConfigBuilder {
        ServerConfigBuilder::default()
    }

    /// Load configuration from the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let mut builder = ServerConfig::builder();

        if let Some(env) = get("APP_ENV") {
            builder = builder.environment(env.parse()?);
        }
        if let Some(port) = get("SERVER_PORT") {
            let port = port.trim().parse::<u16>().map_err(|_| ConfigError::InvalidValue {
                key: "SERVER_PORT",
                value: port.clone(),
            })?;
            builder = builder.port(port);
        }
        if let Some(url) = get("DATABASE_URL") {
            builder = builder.database_url(url);
        }
        if let Some(secret) = get("SESSION_SECRET") {
            builder = builder.session_secret(secret);
        }
        if let Some(prefix) = get("AUTH_ROUTE_PREFIX") {
            builder = builder.auth_route_prefix(prefix);
        }
        if let Some(origins) = get("CORS_ORIGIN") {
            builder = builder.cors_origins(
                origins
                    .split(',')
                    .map(str::trim)
                    .filter(|origin| !origin.is_empty())
                    .map(String::from),
            );
        }
        if let Some(cost) = get("BCRYPT_COST") {
            let parsed = cost.trim().parse::<u32>().map_err(|_| ConfigError::InvalidValue {
                key: "BCRYPT_COST",
                value: cost.clone(),
            })?;
            builder = builder.bcrypt_cost(parsed);
        }

        builder.build()
    }

    pub fn socket_addr(&self) -> std::net::SocketAddr {
        std::net::SocketAddr::from(([0, 0, 0, 0], self.port))
    }
}

#[derive(Debug, Default)]
pub struct ServerConfigBuilder {
    port: Option<u16>,
    database_url: Option<String>,
    session_secret: Option<String>,
    environment: Environment,
    auth_route_prefix: Option<String>,
    cors_origins: Option<Vec<String>>,
    bcrypt_cost: Option<u32>,
}

impl ServerConfigBuilder {
    pub fn port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    pub fn database_url(mut self, url: impl Into<String>) -> Self {
        self.database_url = Some(url.into());
        self
    }

    pub fn session_secret(mut self, secret: impl Into<String>) -> Self {
        self.session_secret = Some(secret.into());
        self
    }

    pub fn environment(mut self, environment: Environment) -> Self {
        self.environment = environment;
        self
    }

    pub fn auth_route_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.auth_route_prefix = Some(prefix.into());
        self
    }

    pub fn cors_origins<I>(mut self, origins: I) -> Self
    where
        I: IntoIterator<Item = String>,
    {
        self.cors_origins = Some(origins.into_iter().collect());
        self
    }

    pub fn bcrypt_cost(mut self, cost: u32) -> Self {
        self.bcrypt_cost = Some(cost);
        self
    }

    /// Validate and assemble the configuration.
    ///
    /// # Errors
    /// * `MissingValue("SESSION_SECRET")` - no secret in production
    /// * `WeakSecret` - secret shorter than the token authority accepts
    /// * `InvalidValue` - bad route prefix, bcrypt cost or CORS origin
    pub fn build(self) -> Result<ServerConfig, ConfigError> {
        let session_secret = match self.session_secret {
            Some(secret) => secret,
            None if self.environment.is_production() => {
                return Err(ConfigError::MissingValue("SESSION_SECRET"));
            }
            None => {
                tracing::warn!(
                    "SESSION_SECRET not set. Using the development secret; sessions will not survive a secret change."
                );
                DEVELOPMENT_SECRET.to_string()
            }
        };
        if session_secret.len() < MIN_SECRET_LEN {
            return Err(ConfigError::WeakSecret {
                min: MIN_SECRET_LEN,
                actual: session_secret.len(),
            });
        }

        let auth_route_prefix = normalize_prefix(
            self.auth_route_prefix
                .as_deref()
                .unwrap_or(DEFAULT_AUTH_PREFIX),
        )?;

        let cors_origins = self
            .cors_origins
            .unwrap_or_else(|| vec![DEFAULT_CORS_ORIGIN.to_string()]);
        for origin in &cors_origins {
            if !origin.starts_with("http://") && !origin.starts_with("https://") {
                return Err(ConfigError::InvalidValue {
                    key: "CORS_ORIGIN",
                    value: origin.clone(),
                });
            }
        }

        let bcrypt_cost = self.bcrypt_cost.unwrap_or(bcrypt::DEFAULT_COST);
        if !(4..=31).contains(&bcrypt_cost) {
            return Err(ConfigError::InvalidValue {
                key: "BCRYPT_COST",
                value: bcrypt_cost.to_string(),
            });
        }

        Ok(ServerConfig {
            port: self.port.unwrap_or(DEFAULT_PORT),
            database_url: self.database_url,
            session_secret,
            environment: self.environment,
            auth_route_prefix,
            cors_origins,
            bcrypt_cost,
        })
    }
}

/// `/api/auth/` → `/api/auth`; the prefix must be absolute and not `/`.
fn normalize_prefix(prefix: &str) -> Result<String, ConfigError> {
    let trimmed = prefix.trim().trim_end_matches('/');
    if !trimmed.starts_with('/') || trimmed.len() < 2 {
        return Err(ConfigError::InvalidValue {
            key: "AUTH_ROUTE_PREFIX",
            value: prefix.to_string(),
        });
    }
    Ok(trimmed.to_string())
}

#[derive(Debug, Error)]
pub enum DirectoryInitError {
    #[error("failed to connect to database: {0}")]
    Connect(#[source] sqlx::Error),

    #[error("failed to run database migrations: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),
}

/// Build the user directory for this configuration.
///
/// Without `DATABASE_URL` the server runs on an in-memory directory, which
/// loses every account on restart. A configured database that cannot be
/// reached or migrated is an error.
pub async fn load_directory(config: &ServerConfig) -> Result<Arc<dyn UserDirectory>, DirectoryInitError> {
    let Some(database_url) = config.database_url.as_deref() else {
        tracing::warn!("DATABASE_URL not set. Using the in-memory user directory.");
        return Ok(Arc::new(InMemoryUserDirectory::new()));
    };

    tracing::info!("Connecting to database...");
    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(database_url)
        .await
        .map_err(DirectoryInitError::Connect)?;
    tracing::info!("Database connection pool created successfully");

    tracing::info!("Running database migrations...");
    sqlx::migrate!().run(&pool).await?;
    tracing::info!("Database migrations completed successfully");

    Ok(Arc::new(PgUserDirectory::new(pool)))
}
