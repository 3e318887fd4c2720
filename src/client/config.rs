//! Client configuration
//!
//! | Variable            | Default                         |
//! |---------------------|---------------------------------|
//! | `CLIENT_API_URL`    | `http://127.0.0.1:3000`         |
//! | `CLIENT_SESSION_DB` | `<data dir>/community-identity/session.db` |
//!
//! The credential jar is kept as `cookies.json` next to the session database.

use std::path::PathBuf;
use std::time::Duration;

use crate::shared::config::{AppConfig, AppConfigBuilder, ConfigError};

/// Default server URL
pub const DEFAULT_SERVER_URL: &str = "http://127.0.0.1:3000";

/// Default auth route prefix, matching the server default
pub const DEFAULT_AUTH_PREFIX: &str = "/api/auth";

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Debug, Clone)]
pub struct ClientConfig {
    app: AppConfig,
    auth_prefix: String,
    session_db: Option<PathBuf>,
    request_timeout: Duration,
}

impl ClientConfig {
    /// Configuration from `CLIENT_API_URL` and `CLIENT_SESSION_DB`
    pub fn from_env() -> Result<Self, ConfigError> {
        let server_url =
            std::env::var("CLIENT_API_URL").unwrap_or_else(|_| DEFAULT_SERVER_URL.to_string());
        let mut config = Self::with_builder(AppConfig::builder().server_url(server_url))?;
        config.session_db = std::env::var("CLIENT_SESSION_DB").ok().map(PathBuf::from);
        Ok(config)
    }

    pub fn with_builder(builder: AppConfigBuilder) -> Result<Self, ConfigError> {
        let app = builder.build()?;
        Ok(Self {
            app,
            auth_prefix: DEFAULT_AUTH_PREFIX.to_string(),
            session_db: None,
            request_timeout: DEFAULT_TIMEOUT,
        })
    }

    pub fn with_auth_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.auth_prefix = prefix.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_session_db(mut self, path: impl Into<PathBuf>) -> Self {
        self.session_db = Some(path.into());
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn server_url(&self) -> &str {
        self.app.server_url.as_deref().unwrap_or(DEFAULT_SERVER_URL)
    }

    /// Full URL for an auth endpoint, e.g. `auth_url("login")`
    pub fn auth_url(&self, endpoint: &str) -> String {
        format!("{}{}/{}", self.server_url(), self.auth_prefix, endpoint)
    }

    pub fn request_timeout(&self) -> Duration {
        self.request_timeout
    }

    /// Session database path: explicit setting, else the platform data dir
    pub fn session_db_path(&self) -> PathBuf {
        if let Some(path) = &self.session_db {
            return path.clone();
        }
        let mut path = dirs::data_dir().unwrap_or_else(std::env::temp_dir);
        path.push("community-identity");
        path.push("session.db");
        path
    }

    /// Credential jar path, beside the session database
    pub fn cookie_jar_path(&self) -> PathBuf {
        self.session_db_path().with_file_name("cookies.json")
    }
}
