/**
 * Identity Authority
 *
 * The server side of the session lifecycle. Every operation takes a
 * `CredentialStore` so the same logic runs against real cookies in handlers
 * and against an in-memory jar in tests.
 *
 * # Server-observed session states
 *
 * ```text
 * Anonymous --register/login--> Authenticated --refresh--> Authenticated (extended)
 *     ^                              |
 *     +---- logout / refresh failure / both credentials expired
 * ```
 *
 * There is no partial state: a failed login sets no cookies and a failed
 * refresh clears both.
 */

use chrono::{DateTime, Utc};
use std::sync::Arc;
use tokio::sync::OnceCell;
use uuid::Uuid;

use crate::backend::auth::cookies::CredentialStore;
use crate::backend::auth::password::PasswordHasher;
use crate::backend::auth::tokens::{InvalidToken, TokenAuthority};
use crate::backend::auth::users::{NewUser, UniqueField, User, UserDirectory};
use crate::backend::error::AuthError;
use crate::backend::middleware::auth::AuthenticatedUser;
use crate::shared::api::{LoginRequest, RegisterRequest};
use crate::shared::identity::PublicIdentity;
use crate::shared::validation;

/// Identity and access expiry handed back after register/login/me
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedSession {
    pub user: PublicIdentity,
    pub expires_at: DateTime<Utc>,
}

/// Outcome of the registration uniqueness pre-check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistrationCheck {
    Available,
    Taken(UniqueField),
}

impl RegistrationCheck {
    pub fn is_available(&self) -> bool {
        matches!(self, RegistrationCheck::Available)
    }
}

/// Password compared against when the email is unknown, so that a miss costs
/// the same bcrypt round as a hit.
const TIMING_DUMMY_PASSWORD: &str = "timing-equalizer-Passw0rd!";

#[derive(Clone)]
pub struct IdentityAuthority {
    directory: Arc<dyn UserDirectory>,
    tokens: TokenAuthority,
    hasher: PasswordHasher,
    dummy_hash: Arc<OnceCell<String>>,
}

impl IdentityAuthority {
    pub fn new(directory: Arc<dyn UserDirectory>, tokens: TokenAuthority, hasher: PasswordHasher) -> Self {
        Self {
            directory,
            tokens,
            hasher,
            dummy_hash: Arc::new(OnceCell::new()),
        }
    }

    pub fn directory(&self) -> &Arc<dyn UserDirectory> {
        &self.directory
    }

    pub fn tokens(&self) -> &TokenAuthority {
        &self.tokens
    }

    /// Check email, then username, then display name (when given).
    /// The first collision wins.
    pub async fn validate_registration(
        &self,
        email: &str,
        username: &str,
        display_name: Option<&str>,
    ) -> Result<RegistrationCheck, AuthError> {
        if self.directory.find_by_email(email).await?.is_some() {
            return Ok(RegistrationCheck::Taken(UniqueField::Email));
        }
        if self.directory.find_by_username(username).await?.is_some() {
            return Ok(RegistrationCheck::Taken(UniqueField::Username));
        }
        if let Some(display_name) = display_name {
            if self.directory.find_by_display_name(display_name).await?.is_some() {
                return Ok(RegistrationCheck::Taken(UniqueField::DisplayName));
            }
        }
        Ok(RegistrationCheck::Available)
    }

    /// Create an account and start a session for it.
    ///
    /// # Errors
    /// * `Validation` - field rules or password confirmation failed
    /// * `Conflict` - email, username or display name already in use, either
    ///   at pre-check or when the directory rejects the insert
    pub async fn register(
        &self,
        store: &dyn CredentialStore,
        request: RegisterRequest,
    ) -> Result<IssuedSession, AuthError> {
        validation::validate_registration(&request)?;

        let email = validation::normalize_email(&request.email);
        let username = request.username.trim().to_string();
        let display_name = validation::normalize_display_name(request.display_name.as_deref());

        if let RegistrationCheck::Taken(field) = self
            .validate_registration(&email, &username, display_name.as_deref())
            .await?
        {
            tracing::warn!("Registration rejected: {:?} already in use", field);
            return Err(AuthError::conflict(field.conflict_message()));
        }

        let password_hash = self.hasher.hash(&request.password).await?;
        let user = self
            .directory
            .insert(NewUser {
                email,
                username,
                password_hash,
                display_name,
                created_at: self.tokens.clock().now(),
            })
            .await?;

        let session = self.start_session(store, &user)?;
        tracing::info!("User registered: {} ({})", user.username, user.id);
        Ok(session)
    }

    /// Authenticate with email and password and start a session.
    ///
    /// Unknown email and wrong password are indistinguishable to the caller.
    /// An inactive or banned account gets `AccountInactive` and no cookies.
    pub async fn login(
        &self,
        store: &dyn CredentialStore,
        request: LoginRequest,
    ) -> Result<IssuedSession, AuthError> {
        validation::validate_login(&request)?;
        let email = validation::normalize_email(&request.email);

        let Some(mut user) = self.directory.find_by_email(&email).await? else {
            self.burn_dummy_verify(&request.password).await;
            tracing::warn!("Login failed: unknown email");
            return Err(AuthError::InvalidCredentials);
        };

        if !self.hasher.verify(&request.password, &user.password_hash).await? {
            tracing::warn!("Login failed: wrong password for user {}", user.id);
            return Err(AuthError::InvalidCredentials);
        }

        if !user.can_sign_in() {
            tracing::warn!("Login refused for inactive or banned user {}", user.id);
            return Err(AuthError::AccountInactive);
        }

        let now = self.tokens.clock().now();
        self.directory.record_login(user.id, now).await?;
        user.last_login_at = Some(now);

        let session = self.start_session(store, &user)?;
        tracing::info!("User logged in: {} ({})", user.username, user.id);
        Ok(session)
    }

    /// Extend the session by issuing a new access credential.
    ///
    /// Uses a valid access cookie when present, otherwise the refresh cookie.
    /// Any failure clears both cookies.
    pub async fn refresh(&self, store: &dyn CredentialStore) -> Result<DateTime<Utc>, AuthError> {
        let result = self.try_refresh(store).await;
        if let Err(err) = &result {
            tracing::warn!("Session refresh failed: {}", err);
            store.clear_all();
        }
        result
    }

    /// End the session. Always succeeds.
    pub fn logout(&self, store: &dyn CredentialStore) {
        store.clear_all();
        tracing::info!("Session cleared");
    }

    /// Verify the access cookie without touching the directory.
    pub fn authenticate(&self, store: &dyn CredentialStore) -> Result<AuthenticatedUser, AuthError> {
        let token = store.get_access().ok_or(AuthError::NoSession)?;
        let claims = self.tokens.verify_access(&token).map_err(|reason| match reason {
            InvalidToken::Expired => AuthError::NoSession,
            _ => AuthError::InvalidToken,
        })?;
        let user_id = claims.user_id().map_err(|_| AuthError::InvalidToken)?;

        Ok(AuthenticatedUser {
            user_id,
            email: claims.email.clone().unwrap_or_default(),
            expires_at: claims.expires_at(),
        })
    }

    /// Current identity for an authenticated request.
    pub async fn current_session(&self, auth: &AuthenticatedUser) -> Result<IssuedSession, AuthError> {
        let user = self.load_active_user(auth.user_id).await?;
        Ok(IssuedSession {
            user: user.to_public(),
            expires_at: auth.expires_at,
        })
    }

    async fn try_refresh(&self, store: &dyn CredentialStore) -> Result<DateTime<Utc>, AuthError> {
        if let Some(access) = store.get_access() {
            match self.tokens.verify_access(&access) {
                Ok(claims) => {
                    let user_id = claims.user_id().map_err(|_| AuthError::InvalidToken)?;
                    return self.reissue_access(store, user_id).await;
                }
                Err(reason) => {
                    tracing::debug!("Access cookie unusable ({}), trying refresh cookie", reason);
                }
            }
        }

        let refresh = store.get_refresh().ok_or(AuthError::NoSession)?;
        let claims = self.tokens.verify_refresh(&refresh).map_err(|reason| match reason {
            InvalidToken::Expired => AuthError::NoSession,
            _ => AuthError::InvalidToken,
        })?;
        let user_id = claims.user_id().map_err(|_| AuthError::InvalidToken)?;

        self.reissue_access(store, user_id).await
    }

    async fn reissue_access(
        &self,
        store: &dyn CredentialStore,
        user_id: Uuid,
    ) -> Result<DateTime<Utc>, AuthError> {
        let user = self.load_active_user(user_id).await?;
        let access = self.tokens.issue_access(user.id, &user.email)?;
        store.set_access(&access);
        tracing::info!("Session refreshed for user {}", user.id);
        Ok(access.expires_at)
    }

    async fn load_active_user(&self, user_id: Uuid) -> Result<User, AuthError> {
        let user = self
            .directory
            .find_by_id(user_id)
            .await?
            .ok_or(AuthError::UserNotFound)?;
        if !user.can_sign_in() {
            return Err(AuthError::AccountInactive);
        }
        Ok(user)
    }

    fn start_session(&self, store: &dyn CredentialStore, user: &User) -> Result<IssuedSession, AuthError> {
        let access = self.tokens.issue_access(user.id, &user.email)?;
        let refresh = self.tokens.issue_refresh(user.id)?;
        store.set_access(&access);
        store.set_refresh(&refresh);

        Ok(IssuedSession {
            user: user.to_public(),
            expires_at: access.expires_at,
        })
    }

    async fn burn_dummy_verify(&self, password: &str) {
        let hasher = self.hasher;
        let dummy = self
            .dummy_hash
            .get_or_try_init(|| async move { hasher.hash(TIMING_DUMMY_PASSWORD).await })
            .await;
        if let Ok(hash) = dummy {
            let _ = self.hasher.verify(password, hash).await;
        }
    }
}
