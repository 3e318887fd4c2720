/**
 * Session Store
 *
 * Runs the auth operations against an `AuthApi`, feeds their phases through
 * `reduce`, mirrors the result into `SessionPersistence` and publishes each
 * new state on a `watch` channel.
 *
 * # Late results
 *
 * Every logout (optimistic or not) bumps a generation counter. A sign-in,
 * registration, refresh or `/me` result that started under an older
 * generation is dropped instead of applied, so a logout always wins over a
 * request that was already in flight. The bump and the stale check both
 * run inside the watch channel's write lock, and a session save that loses
 * to a logout is purged again.
 */

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::watch;

use crate::client::api::AuthApi;
use crate::client::error::ClientError;
use crate::client::persistence::{PersistedSession, SessionPersistence};
use crate::client::state::{reduce, AuthEvent, AuthState, SessionPreload};
use crate::shared::api::{LoginRequest, RegisterRequest};
use crate::shared::clock::Clock;
use crate::shared::identity::IdentityUpdate;

struct Inner {
    state: watch::Sender<AuthState>,
    api: Arc<dyn AuthApi>,
    persistence: Arc<dyn SessionPersistence>,
    clock: Arc<dyn Clock>,
    logout_generation: AtomicU64,
}

/// Client auth state container. Cheap to clone; clones share state.
#[derive(Clone)]
pub struct SessionStore {
    inner: Arc<Inner>,
}

impl SessionStore {
    pub fn new(
        api: Arc<dyn AuthApi>,
        persistence: Arc<dyn SessionPersistence>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let (state, _) = watch::channel(AuthState::anonymous());
        Self {
            inner: Arc::new(Inner {
                state,
                api,
                persistence,
                clock,
                logout_generation: AtomicU64::new(0),
            }),
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<AuthState> {
        self.inner.state.subscribe()
    }

    pub fn snapshot(&self) -> AuthState {
        self.inner.state.borrow().clone()
    }

    /// Whether the current access window has closed
    pub fn is_session_expired(&self) -> bool {
        self.inner.state.borrow().is_session_expired(self.inner.clock.now())
    }

    /// Restore a persisted session, if one exists and has not expired.
    pub async fn hydrate(&self) -> AuthState {
        match self.inner.persistence.load_valid(self.inner.clock.now()).await {
            Ok(Some(session)) => {
                tracing::info!("Restored persisted session for user {}", session.user.id);
                self.dispatch(AuthEvent::Restored(session));
            }
            Ok(None) => {}
            Err(e) => {
                tracing::warn!("Could not read persisted session: {}", e);
            }
        }
        self.snapshot()
    }

    pub async fn sign_in(&self, email: &str, password: &str) -> Result<(), ClientError> {
        let request = LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        };
        let generation = self.generation();
        self.dispatch(AuthEvent::SignInPending);

        let result = self.inner.api.login(&request).await;
        self.settle_sign_in(generation, result).await
    }

    /// Create an account; on success the client is signed in as it.
    pub async fn register(&self, request: RegisterRequest) -> Result<(), ClientError> {
        let generation = self.generation();
        self.dispatch(AuthEvent::SignInPending);

        let result = self.inner.api.register(&request).await;
        self.settle_sign_in(generation, result).await
    }

    /// Extend the session. Any failure logs the client out.
    pub async fn refresh_session(&self) -> Result<(), ClientError> {
        let generation = self.generation();
        self.dispatch(AuthEvent::RefreshPending);

        match self.inner.api.refresh().await {
            Ok(payload) => {
                let event = AuthEvent::RefreshFulfilled {
                    expires_at: payload.expires_at,
                };
                if self.dispatch_current(generation, event) {
                    self.persist_snapshot(generation).await;
                }
                Ok(())
            }
            Err(err) => {
                tracing::info!("Session refresh rejected: {}", err);
                self.dispatch(AuthEvent::RefreshRejected(err.to_string()));
                self.purge().await;
                Err(err)
            }
        }
    }

    /// End the session. The local state is cleared whatever the server says;
    /// the network error, if any, is returned for logging only.
    pub async fn sign_out(&self) -> Result<(), ClientError> {
        self.dispatch_logout(AuthEvent::SignOutPending);

        let result = self.inner.api.logout().await;
        if let Err(e) = &result {
            tracing::warn!("Server logout failed, clearing local session anyway: {}", e);
        }

        self.dispatch(AuthEvent::SignOutSettled);
        self.purge().await;
        result
    }

    /// Clear the identity immediately. Follow with [`sign_out`](Self::sign_out).
    pub fn optimistic_logout(&self) {
        self.dispatch_logout(AuthEvent::OptimisticLogout);
    }

    /// Optimistic logout followed by the server-side sign-out
    pub async fn logout(&self) -> Result<(), ClientError> {
        self.optimistic_logout();
        self.sign_out().await
    }

    /// Hydrate from a server-rendered preload, or clear with `None`.
    pub async fn set_current_user(&self, preload: Option<SessionPreload>) {
        let signed_in = preload.is_some();
        let generation = self.generation();
        self.dispatch(AuthEvent::SetCurrentUser(preload));
        if signed_in {
            self.persist_snapshot(generation).await;
        } else {
            self.purge().await;
        }
    }

    /// Load the identity for the cookies the HTTP client already holds.
    pub async fn load_current_user(&self) -> Result<(), ClientError> {
        let generation = self.generation();
        let payload = self.inner.api.me().await?;
        if self.dispatch_current(generation, AuthEvent::SetCurrentUser(Some(payload))) {
            self.persist_snapshot(generation).await;
        }
        Ok(())
    }

    /// Apply identity fields changed elsewhere (profile edits, moderation).
    pub async fn update_identity(&self, update: IdentityUpdate) {
        if update.is_empty() {
            return;
        }
        let generation = self.generation();
        self.dispatch(AuthEvent::UpdateIdentity(update));
        self.persist_snapshot(generation).await;
    }

    pub fn clear_error(&self) {
        self.dispatch(AuthEvent::ClearError);
    }

    async fn settle_sign_in(
        &self,
        generation: u64,
        result: Result<SessionPreload, ClientError>,
    ) -> Result<(), ClientError> {
        match result {
            Ok(payload) => {
                let user_id = payload.user.id;
                if self.dispatch_current(generation, AuthEvent::SignInFulfilled(payload)) {
                    tracing::info!("Signed in as {}", user_id);
                    self.persist_snapshot(generation).await;
                }
                Ok(())
            }
            Err(err) => {
                self.dispatch(AuthEvent::SignInRejected(err.to_string()));
                Err(err)
            }
        }
    }

    fn dispatch(&self, event: AuthEvent) {
        self.inner.state.send_modify(|state| {
            let current = std::mem::take(state);
            *state = reduce(current, event);
        });
    }

    /// Apply `event` unless a logout happened since `generation` was read.
    /// Returns whether the event was applied.
    fn dispatch_current(&self, generation: u64, event: AuthEvent) -> bool {
        let mut applied = false;
        self.inner.state.send_modify(|state| {
            let current = std::mem::take(state);
            if event.grants_session() && generation != self.generation() {
                *state = reduce(current, AuthEvent::Superseded);
            } else {
                *state = reduce(current, event);
                applied = true;
            }
        });
        if !applied {
            tracing::debug!("Dropping session result that lost to a logout");
        }
        applied
    }

    /// Bump the logout generation and apply `event` under one write lock
    fn dispatch_logout(&self, event: AuthEvent) {
        self.inner.state.send_modify(|state| {
            self.inner.logout_generation.fetch_add(1, Ordering::SeqCst);
            let current = std::mem::take(state);
            *state = reduce(current, event);
        });
    }

    fn generation(&self) -> u64 {
        self.inner.logout_generation.load(Ordering::SeqCst)
    }

    /// Save the current session unless a logout happened since `generation`.
    async fn persist_snapshot(&self, generation: u64) {
        let session = {
            let state = self.inner.state.borrow();
            match (&state.current_user, state.session_expires_at) {
                (Some(user), Some(expires_at)) => Some(PersistedSession {
                    user: user.clone(),
                    expires_at,
                }),
                _ => None,
            }
        };

        let Some(session) = session else {
            return;
        };
        if generation != self.generation() {
            return;
        }
        if let Err(e) = self.inner.persistence.save(&session).await {
            tracing::warn!("Could not persist session: {}", e);
            return;
        }
        // A logout bumps the generation before it purges, so a purge that
        // ran during the save above is visible here.
        if generation != self.generation() {
            tracing::debug!("Logout overtook a session save; purging again");
            self.purge().await;
        }
    }

    async fn purge(&self) {
        if let Err(e) = self.inner.persistence.purge().await {
            tracing::warn!("Could not purge persisted session: {}", e);
        }
    }
}
