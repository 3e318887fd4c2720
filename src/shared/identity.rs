//! User identity types
//!
//! Two views of a user cross the wire:
//!
//! - [`PublicIdentity`] - the full user record minus the password hash, returned
//!   by register/login/me.
//! - [`CurrentUserIdentity`] - the minimal projection the client keeps in its
//!   global auth state. Everything else is fetched on demand.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::shared::error::SharedError;

/// Role of a community account
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserType {
    #[default]
    Player,
    Creator,
    Moderator,
    Admin,
}

impl UserType {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserType::Player => "PLAYER",
            UserType::Creator => "CREATOR",
            UserType::Moderator => "MODERATOR",
            UserType::Admin => "ADMIN",
        }
    }
}

impl fmt::Display for UserType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UserType {
    type Err = SharedError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PLAYER" => Ok(UserType::Player),
            "CREATOR" => Ok(UserType::Creator),
            "MODERATOR" => Ok(UserType::Moderator),
            "ADMIN" => Ok(UserType::Admin),
            other => Err(SharedError::validation(
                "userType",
                format!("Unknown user type: {}", other),
            )),
        }
    }
}

/// User record as exposed to clients (no password hash)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicIdentity {
    pub id: Uuid,
    pub email: String,
    pub username: String,
    pub display_name: Option<String>,
    pub avatar: Option<String>,
    pub user_type: UserType,
    pub is_verified: bool,
    pub is_active: bool,
    pub is_banned: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub last_login_at: Option<DateTime<Utc>>,
}

impl PublicIdentity {
    /// Project onto the fields the client keeps in global state.
    pub fn to_current_user(&self) -> CurrentUserIdentity {
        CurrentUserIdentity {
            id: self.id,
            username: self.username.clone(),
            display_name: self.display_name.clone(),
            avatar: self.avatar.clone(),
            user_type: self.user_type,
            is_verified: self.is_verified,
            is_active: self.is_active,
            is_banned: self.is_banned,
        }
    }
}

impl From<&PublicIdentity> for CurrentUserIdentity {
    fn from(user: &PublicIdentity) -> Self {
        user.to_current_user()
    }
}

/// Minimal identity kept in client auth state
///
/// The only user data the session state machine holds. Created on sign-in or
/// hydration, updated in place by [`IdentityUpdate`], dropped on sign-out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentUserIdentity {
    pub id: Uuid,
    pub username: String,
    pub display_name: Option<String>,
    pub avatar: Option<String>,
    pub user_type: UserType,
    pub is_verified: bool,
    pub is_active: bool,
    pub is_banned: bool,
}

impl CurrentUserIdentity {
    /// Name to show in the UI: display name, or username when unset.
    pub fn display_name_or_username(&self) -> &str {
        self.display_name
            .as_deref()
            .filter(|name| !name.is_empty())
            .unwrap_or(&self.username)
    }

    /// Apply a partial identity update in place.
    pub fn apply(&mut self, update: &IdentityUpdate) {
        if let Some(username) = &update.username {
            self.username = username.clone();
        }
        if let Some(display_name) = &update.display_name {
            self.display_name = display_name.clone();
        }
        if let Some(avatar) = &update.avatar {
            self.avatar = avatar.clone();
        }
        if let Some(user_type) = update.user_type {
            self.user_type = user_type;
        }
        if let Some(is_verified) = update.is_verified {
            self.is_verified = is_verified;
        }
        if let Some(is_active) = update.is_active {
            self.is_active = is_active;
        }
        if let Some(is_banned) = update.is_banned {
            self.is_banned = is_banned;
        }
    }
}

/// Identity fields that a profile mutation may change
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentityField {
    Username,
    DisplayName,
    Avatar,
    UserType,
    IsVerified,
    IsActive,
    IsBanned,
}

/// Partial identity carrying only changed fields.
///
/// For nullable fields the outer `Option` says "changed", the inner one
/// carries the new (possibly cleared) value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IdentityUpdate {
    pub username: Option<String>,
    pub display_name: Option<Option<String>>,
    pub avatar: Option<Option<String>>,
    pub user_type: Option<UserType>,
    pub is_verified: Option<bool>,
    pub is_active: Option<bool>,
    pub is_banned: Option<bool>,
}

impl IdentityUpdate {
    /// Build an update from a fresh user record and the fields that changed.
    pub fn from_changed(user: &PublicIdentity, changed: &[IdentityField]) -> Self {
        let mut update = IdentityUpdate::default();
        for field in changed {
            match field {
                IdentityField::Username => update.username = Some(user.username.clone()),
                IdentityField::DisplayName => update.display_name = Some(user.display_name.clone()),
                IdentityField::Avatar => update.avatar = Some(user.avatar.clone()),
                IdentityField::UserType => update.user_type = Some(user.user_type),
                IdentityField::IsVerified => update.is_verified = Some(user.is_verified),
                IdentityField::IsActive => update.is_active = Some(user.is_active),
                IdentityField::IsBanned => update.is_banned = Some(user.is_banned),
            }
        }
        update
    }

    pub fn is_empty(&self) -> bool {
        *self == IdentityUpdate::default()
    }
}
