/**
 * Auth API Client
 *
 * HTTP client for the identity server. Session credentials are kept in a
 * [`CredentialJar`] wired into reqwest as its cookie provider; this type never
 * sees or returns them. A persistent jar is saved after every auth call so
 * the credentials survive a restart alongside the persisted identity.
 *
 * Every state-changing call sends `X-Requested-With: XMLHttpRequest`, which
 * the server's CSRF guard requires.
 */

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;

use crate::client::config::ClientConfig;
use crate::client::cookies::CredentialJar;
use crate::client::error::ClientError;
use crate::shared::api::{
    ApiResponse, ErrorCode, LoginRequest, RefreshPayload, RegisterRequest, SessionPayload,
};

const CSRF_HEADER: &str = "X-Requested-With";
const CSRF_HEADER_VALUE: &str = "XMLHttpRequest";

/// Identity server operations used by the session store
#[async_trait]
pub trait AuthApi: Send + Sync {
    async fn login(&self, request: &LoginRequest) -> Result<SessionPayload, ClientError>;

    async fn register(&self, request: &RegisterRequest) -> Result<SessionPayload, ClientError>;

    async fn refresh(&self) -> Result<RefreshPayload, ClientError>;

    async fn logout(&self) -> Result<(), ClientError>;

    async fn me(&self) -> Result<SessionPayload, ClientError>;
}

/// `AuthApi` over reqwest with a cookie store
#[derive(Debug, Clone)]
pub struct HttpAuthApi {
    client: Client,
    config: ClientConfig,
    jar: CredentialJar,
}

impl HttpAuthApi {
    /// Client whose credentials last only as long as the process
    pub fn new(config: ClientConfig) -> Result<Self, ClientError> {
        Self::with_jar(config, CredentialJar::in_memory())
    }

    /// Client whose credentials are kept at `config.cookie_jar_path()`
    pub fn persistent(config: ClientConfig) -> Result<Self, ClientError> {
        let jar = CredentialJar::open(config.cookie_jar_path())?;
        Self::with_jar(config, jar)
    }

    pub fn with_jar(config: ClientConfig, jar: CredentialJar) -> Result<Self, ClientError> {
        let client = Client::builder()
            .cookie_provider(jar.provider())
            .timeout(config.request_timeout())
            .build()?;
        Ok(Self { client, config, jar })
    }

    pub fn jar(&self) -> &CredentialJar {
        &self.jar
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    fn post(&self, endpoint: &str) -> RequestBuilder {
        self.client
            .post(self.config.auth_url(endpoint))
            .header(CSRF_HEADER, CSRF_HEADER_VALUE)
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<Option<T>, ClientError> {
        let response = request.send().await?;
        self.remember_credentials();
        let status = response.status();
        let body = response.text().await?;

        let envelope: ApiResponse<T> = match serde_json::from_str(&body) {
            Ok(envelope) => envelope,
            Err(e) if status.is_success() => return Err(ClientError::Decode(e.to_string())),
            Err(_) => {
                return Err(ClientError::Api {
                    status: status.as_u16(),
                    code: ErrorCode::Unknown,
                    message: format!("Request failed with status {}", status),
                })
            }
        };

        if envelope.success && status.is_success() {
            return Ok(envelope.data);
        }

        let (code, message) = match envelope.error {
            Some(error) => (error.code, error.message),
            None => (ErrorCode::Unknown, format!("Request failed with status {}", status)),
        };
        tracing::debug!("Auth request failed: {} {}", status, code);
        Err(ClientError::Api {
            status: status.as_u16(),
            code,
            message,
        })
    }

    fn remember_credentials(&self) {
        if let Err(e) = self.jar.save() {
            tracing::warn!("Could not save credential jar: {}", e);
        }
    }

    fn require<T>(data: Option<T>) -> Result<T, ClientError> {
        data.ok_or_else(|| ClientError::Decode("missing data in success response".to_string()))
    }
}

#[async_trait]
impl AuthApi for HttpAuthApi {
    async fn login(&self, request: &LoginRequest) -> Result<SessionPayload, ClientError> {
        Self::require(self.send(self.post("login").json(request)).await?)
    }

    async fn register(&self, request: &RegisterRequest) -> Result<SessionPayload, ClientError> {
        Self::require(self.send(self.post("register").json(request)).await?)
    }

    async fn refresh(&self) -> Result<RefreshPayload, ClientError> {
        Self::require(self.send(self.post("refresh")).await?)
    }

    async fn logout(&self) -> Result<(), ClientError> {
        let result = self.send::<serde_json::Value>(self.post("logout")).await;
        // Local credentials go even when the server could not be reached.
        self.jar.clear();
        self.remember_credentials();
        result.map(|_| ())
    }

    async fn me(&self) -> Result<SessionPayload, ClientError> {
        let request = self.client.get(self.config.auth_url("me"));
        Self::require(self.send(request).await?)
    }
}
