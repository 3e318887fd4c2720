//! Input validation
//!
//! Field rules applied to register and login bodies before any lookup or
//! hashing happens. Each check returns the first violation as a
//! [`SharedError::ValidationError`].

use crate::shared::api::{LoginRequest, RegisterRequest};
use crate::shared::error::SharedError;

pub const USERNAME_MIN_LEN: usize = 3;
pub const USERNAME_MAX_LEN: usize = 30;
pub const PASSWORD_MIN_LEN: usize = 8;
pub const DISPLAY_NAME_MAX_LEN: usize = 50;
pub const EMAIL_MAX_LEN: usize = 254;

/// Special characters accepted (and one of which is required) in passwords
pub const PASSWORD_SPECIALS: &str = "@$!%*?&";

const PASSWORD_POLICY_MESSAGE: &str = "Password must contain at least 8 characters, one uppercase letter, one lowercase letter, one number, and one special character";

pub fn validate_email(email: &str) -> Result<(), SharedError> {
    let invalid = || SharedError::validation("email", "Invalid email format");

    if email.is_empty() || email.len() > EMAIL_MAX_LEN || email.chars().any(char::is_whitespace) {
        return Err(invalid());
    }

    let (local, domain) = email.split_once('@').ok_or_else(invalid)?;
    if local.is_empty() || domain.contains('@') {
        return Err(invalid());
    }

    let labels: Vec<&str> = domain.split('.').collect();
    if labels.len() < 2 || labels.iter().any(|label| label.is_empty()) {
        return Err(invalid());
    }
    if labels.last().map(|tld| tld.len() < 2).unwrap_or(true) {
        return Err(invalid());
    }

    Ok(())
}

pub fn validate_username(username: &str) -> Result<(), SharedError> {
    let len = username.chars().count();
    if len < USERNAME_MIN_LEN {
        return Err(SharedError::validation(
            "username",
            "Username must be at least 3 characters",
        ));
    }
    if len > USERNAME_MAX_LEN {
        return Err(SharedError::validation(
            "username",
            "Username must be at most 30 characters",
        ));
    }
    if !username
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
    {
        return Err(SharedError::validation(
            "username",
            "Username can only contain letters, numbers, underscores, and hyphens",
        ));
    }
    Ok(())
}

/// Password policy: at least 8 characters drawn from letters, digits and
/// `@$!%*?&`, with at least one of each class.
pub fn validate_password(password: &str) -> Result<(), SharedError> {
    if password.chars().count() < PASSWORD_MIN_LEN {
        return Err(SharedError::validation(
            "password",
            "Password must be at least 8 characters",
        ));
    }

    let is_special = |c: char| PASSWORD_SPECIALS.contains(c);
    let allowed = password
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || is_special(c));
    let has_lower = password.chars().any(|c| c.is_ascii_lowercase());
    let has_upper = password.chars().any(|c| c.is_ascii_uppercase());
    let has_digit = password.chars().any(|c| c.is_ascii_digit());
    let has_special = password.chars().any(is_special);

    if allowed && has_lower && has_upper && has_digit && has_special {
        Ok(())
    } else {
        Err(SharedError::validation("password", PASSWORD_POLICY_MESSAGE))
    }
}

pub fn validate_display_name(display_name: &str) -> Result<(), SharedError> {
    if display_name.chars().count() > DISPLAY_NAME_MAX_LEN {
        return Err(SharedError::validation(
            "displayName",
            "Display name must be at most 50 characters",
        ));
    }
    Ok(())
}

/// Trim a display name and treat blank as absent.
pub fn normalize_display_name(display_name: Option<&str>) -> Option<String> {
    display_name
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_string)
}

/// Lower-case and trim an email for lookup and storage.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

pub fn validate_login(request: &LoginRequest) -> Result<(), SharedError> {
    validate_email(request.email.trim())?;
    validate_password(&request.password)
}

pub fn validate_registration(request: &RegisterRequest) -> Result<(), SharedError> {
    validate_email(request.email.trim())?;
    validate_username(request.username.trim())?;
    validate_password(&request.password)?;
    if let Some(confirm) = &request.confirm_password {
        if confirm != &request.password {
            return Err(SharedError::validation(
                "confirmPassword",
                "Passwords do not match",
            ));
        }
    }
    if let Some(display_name) = normalize_display_name(request.display_name.as_deref()) {
        validate_display_name(&display_name)?;
    }
    Ok(())
}
