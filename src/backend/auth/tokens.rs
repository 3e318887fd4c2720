/**
 * Token Authority
 *
 * Issues and verifies the two signed credentials of a session:
 *
 * - access token  - `{sub, email, iat, exp, typ: "access"}`, 15 minutes
 * - refresh token - `{sub, iat, exp, typ: "refresh"}`, 7 days
 *
 * Both are HS256 JWTs signed with the server secret. Expiry is checked here
 * against the injected clock rather than by `jsonwebtoken`, so that tests can
 * move time and so that the boundary is exact: a token is expired once
 * `now >= exp`, with no leeway.
 */

use chrono::{DateTime, TimeZone, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;

use crate::shared::clock::Clock;

/// Access token lifetime (15 minutes)
pub const ACCESS_TOKEN_TTL_SECS: i64 = 15 * 60;

/// Refresh token lifetime (7 days)
pub const REFRESH_TOKEN_TTL_SECS: i64 = 7 * 24 * 60 * 60;

/// Minimum signing secret length in bytes
pub const MIN_SECRET_LEN: usize = 32;

/// Which credential a token is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Access,
    Refresh,
}

/// JWT claims structure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// User ID
    pub sub: String,
    /// Email (access tokens only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Issued at (Unix seconds)
    pub iat: i64,
    /// Expiration (Unix seconds)
    pub exp: i64,
    /// Credential kind
    pub typ: TokenKind,
}

impl Claims {
    /// Subject as a user id
    pub fn user_id(&self) -> Result<Uuid, InvalidToken> {
        Uuid::parse_str(&self.sub).map_err(|_| InvalidToken::Malformed)
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        secs_to_datetime(self.exp)
    }
}

/// A freshly signed token and the instant it stops being valid
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// Failure to construct the authority or to sign a token
#[derive(Debug, Error)]
pub enum TokenError {
    #[error("signing secret must be at least {min} bytes, got {actual}")]
    WeakSecret { min: usize, actual: usize },

    #[error("failed to sign token: {0}")]
    Signing(#[from] jsonwebtoken::errors::Error),
}

/// Why a presented token was rejected
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum InvalidToken {
    #[error("token has expired")]
    Expired,
    #[error("token signature does not match")]
    BadSignature,
    #[error("token is malformed")]
    Malformed,
    #[error("token is not the expected kind")]
    WrongKind,
}

/// Signs and verifies session credentials
#[derive(Clone)]
pub struct TokenAuthority {
    encoding: EncodingKey,
    decoding: DecodingKey,
    clock: Arc<dyn Clock>,
}

impl fmt::Debug for TokenAuthority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenAuthority")
            .field("clock", &self.clock)
            .finish_non_exhaustive()
    }
}

impl TokenAuthority {
    /// Create a token authority
    ///
    /// # Arguments
    /// * `secret` - HMAC secret, at least [`MIN_SECRET_LEN`] bytes
    /// * `clock` - Time source for `iat`/`exp` and expiry checks
    ///
    /// # Errors
    /// `TokenError::WeakSecret` if the secret is too short
    pub fn new(secret: &str, clock: Arc<dyn Clock>) -> Result<Self, TokenError> {
        if secret.len() < MIN_SECRET_LEN {
            return Err(TokenError::WeakSecret {
                min: MIN_SECRET_LEN,
                actual: secret.len(),
            });
        }
        Ok(Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            clock,
        })
    }

    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }

    /// Issue a 15-minute access token
    pub fn issue_access(&self, user_id: Uuid, email: &str) -> Result<IssuedToken, TokenError> {
        self.issue(user_id, Some(email.to_string()), TokenKind::Access, ACCESS_TOKEN_TTL_SECS)
    }

    /// Issue a 7-day refresh token
    pub fn issue_refresh(&self, user_id: Uuid) -> Result<IssuedToken, TokenError> {
        self.issue(user_id, None, TokenKind::Refresh, REFRESH_TOKEN_TTL_SECS)
    }

    /// Verify an access token
    pub fn verify_access(&self, token: &str) -> Result<Claims, InvalidToken> {
        self.verify(token, TokenKind::Access)
    }

    /// Verify a refresh token
    pub fn verify_refresh(&self, token: &str) -> Result<Claims, InvalidToken> {
        self.verify(token, TokenKind::Refresh)
    }

    fn issue(
        &self,
        user_id: Uuid,
        email: Option<String>,
        typ: TokenKind,
        ttl_secs: i64,
    ) -> Result<IssuedToken, TokenError> {
        let iat = self.clock.now_secs();
        let exp = iat + ttl_secs;
        let claims = Claims {
            sub: user_id.to_string(),
            email,
            iat,
            exp,
            typ,
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)?;
        Ok(IssuedToken {
            token,
            expires_at: secs_to_datetime(exp),
        })
    }

    fn verify(&self, token: &str, expected: TokenKind) -> Result<Claims, InvalidToken> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.validate_aud = false;
        validation.required_spec_claims = HashSet::from(["exp".to_string(), "sub".to_string()]);

        let data = decode::<Claims>(token, &self.decoding, &validation).map_err(|err| {
            let reason = match err.kind() {
                ErrorKind::InvalidSignature | ErrorKind::InvalidAlgorithm => InvalidToken::BadSignature,
                _ => InvalidToken::Malformed,
            };
            tracing::debug!("Token rejected ({:?}): {}", reason, err);
            reason
        })?;

        let claims = data.claims;
        if claims.typ != expected {
            tracing::debug!("Token rejected: expected {:?}, got {:?}", expected, claims.typ);
            return Err(InvalidToken::WrongKind);
        }
        if self.clock.now_secs() >= claims.exp {
            return Err(InvalidToken::Expired);
        }
        claims.user_id()?;

        Ok(claims)
    }
}

fn secs_to_datetime(secs: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(secs, 0)
        .single()
        .unwrap_or(DateTime::<Utc>::UNIX_EPOCH)
}
