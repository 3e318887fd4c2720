/**
 * Auth State
 *
 * The client auth state and the only function allowed to change it.
 *
 * # Invariants
 *
 * - `is_authenticated` is true iff `current_user` is `Some`
 * - `session_expires_at` is `None` iff not authenticated
 *
 * `reduce` preserves both for every event sequence.
 */

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::client::persistence::PersistedSession;
use crate::shared::api::SessionPayload;
use crate::shared::identity::{CurrentUserIdentity, IdentityUpdate};

/// `{user, expiresAt}` as delivered by sign-in, `/me` or a server preload
pub type SessionPreload = SessionPayload;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthState {
    pub current_user: Option<CurrentUserIdentity>,
    pub is_authenticated: bool,
    pub is_loading: bool,
    pub error: Option<String>,
    pub session_expires_at: Option<DateTime<Utc>>,
}

/// Named transitions of the auth state
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthEvent {
    SignInPending,
    SignInFulfilled(SessionPreload),
    SignInRejected(String),

    RefreshPending,
    RefreshFulfilled { expires_at: DateTime<Utc> },
    RefreshRejected(String),

    SignOutPending,
    /// Sign-out finished, successfully or not
    SignOutSettled,

    OptimisticLogout,
    SetCurrentUser(Option<SessionPreload>),
    /// Session read back from local persistence
    Restored(PersistedSession),
    /// An in-flight result was dropped because a logout happened first
    Superseded,
    UpdateIdentity(IdentityUpdate),
    ClearError,
}

impl AuthEvent {
    /// Whether this event can make the state authenticated.
    /// Used by the session store to drop results that lost to a logout.
    pub fn grants_session(&self) -> bool {
        matches!(
            self,
            AuthEvent::SignInFulfilled(_)
                | AuthEvent::RefreshFulfilled { .. }
                | AuthEvent::SetCurrentUser(Some(_))
                | AuthEvent::Restored(_)
        )
    }
}

impl AuthState {
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// True when there is no session or its access window has closed
    pub fn is_session_expired(&self, now: DateTime<Utc>) -> bool {
        match self.session_expires_at {
            Some(expires_at) => now >= expires_at,
            None => true,
        }
    }

    /// Display name, falling back to the username
    pub fn display_name(&self) -> Option<&str> {
        self.current_user
            .as_ref()
            .map(CurrentUserIdentity::display_name_or_username)
    }

    pub fn user_id(&self) -> Option<Uuid> {
        self.current_user.as_ref().map(|user| user.id)
    }

    fn authenticate(&mut self, preload: &SessionPreload) {
        self.current_user = Some(preload.user.to_current_user());
        self.is_authenticated = true;
        self.session_expires_at = Some(preload.expires_at);
    }

    fn clear_session(&mut self) {
        self.current_user = None;
        self.is_authenticated = false;
        self.session_expires_at = None;
    }
}

/// Apply one event to the state.
pub fn reduce(mut state: AuthState, event: AuthEvent) -> AuthState {
    match event {
        AuthEvent::SignInPending => {
            state.is_loading = true;
            state.error = None;
        }
        AuthEvent::SignInFulfilled(preload) => {
            state.is_loading = false;
            state.authenticate(&preload);
            state.error = None;
        }
        AuthEvent::SignInRejected(message) => {
            // An existing session survives a failed sign-in.
            state.is_loading = false;
            state.error = Some(message);
        }

        AuthEvent::RefreshPending => {
            state.is_loading = true;
        }
        AuthEvent::RefreshFulfilled { expires_at } => {
            state.is_loading = false;
            state.error = None;
            if state.is_authenticated {
                state.session_expires_at = Some(expires_at);
            }
        }
        AuthEvent::RefreshRejected(message) => {
            state.is_loading = false;
            state.clear_session();
            state.error = Some(message);
        }

        AuthEvent::SignOutPending => {
            state.is_loading = true;
        }
        AuthEvent::SignOutSettled => {
            state.is_loading = false;
            state.clear_session();
            state.error = None;
        }

        AuthEvent::OptimisticLogout => {
            state.clear_session();
        }
        AuthEvent::SetCurrentUser(Some(preload)) => {
            state.authenticate(&preload);
        }
        AuthEvent::SetCurrentUser(None) => {
            state.clear_session();
        }
        AuthEvent::Restored(session) => {
            state.current_user = Some(session.user);
            state.is_authenticated = true;
            state.session_expires_at = Some(session.expires_at);
        }
        AuthEvent::Superseded => {
            state.is_loading = false;
        }
        AuthEvent::UpdateIdentity(update) => {
            if let Some(user) = state.current_user.as_mut() {
                user.apply(&update);
            }
        }
        AuthEvent::ClearError => {
            state.error = None;
        }
    }
    state
}
