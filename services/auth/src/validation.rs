//! Input validation utilities

use regex::Regex;
use std::sync::OnceLock;

use crate::error::{AuthError, AuthResult};

pub const USERNAME_MIN_LEN: usize = 3;
pub const USERNAME_MAX_LEN: usize = 50;
pub const PASSWORD_MIN_LEN: usize = 6;
/// Longest address SMTP can carry; fits the `email` column
pub const EMAIL_MAX_LEN: usize = 254;

/// Validate a registration request.
///
/// Rules run in a fixed order and the first failure is the one reported:
/// presence, username length, email shape, password length.
pub fn validate_registration(username: &str, email: &str, password: &str) -> AuthResult<()> {
    if username.is_empty() || email.is_empty() || password.is_empty() {
        return Err(AuthError::validation("All fields are required", None));
    }

    validate_username(username).map_err(|msg| AuthError::validation(msg, Some("username")))?;
    validate_email(email).map_err(|msg| AuthError::validation(msg, Some("email")))?;
    validate_password(password).map_err(|msg| AuthError::validation(msg, Some("password")))?;

    Ok(())
}

/// Validate username length
pub fn validate_username(username: &str) -> Result<(), String> {
    let len = username.chars().count();
    if !(USERNAME_MIN_LEN..=USERNAME_MAX_LEN).contains(&len) {
        return Err(format!(
            "Username must be between {} and {} characters",
            USERNAME_MIN_LEN, USERNAME_MAX_LEN
        ));
    }

    Ok(())
}

/// Validate email against a basic `local@domain.tld` shape
pub fn validate_email(email: &str) -> Result<(), String> {
    static EMAIL_REGEX: OnceLock<Regex> = OnceLock::new();
    let regex = EMAIL_REGEX.get_or_init(|| {
        Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("Failed to compile email regex")
    });

    if email.chars().count() > EMAIL_MAX_LEN || !regex.is_match(email) {
        return Err("Please enter a valid email address".to_string());
    }

    Ok(())
}

/// Validate password length
pub fn validate_password(password: &str) -> Result<(), String> {
    if password.chars().count() < PASSWORD_MIN_LEN {
        return Err(format!(
            "Password must be at least {} characters long",
            PASSWORD_MIN_LEN
        ));
    }

    Ok(())
}
