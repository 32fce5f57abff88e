use std::sync::LazyLock;

use regex::Regex;

use crate::error::AppError;

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap());

static SLUG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z0-9][a-z0-9-]{1,99}$").unwrap());

pub const MIN_PASSWORD_LEN: usize = 8;

pub fn email(value: &str) -> Result<(), AppError> {
    if EMAIL_RE.is_match(value.trim()) {
        Ok(())
    } else {
        Err(AppError::BadRequest("Invalid email address".to_string()))
    }
}

pub fn password(value: &str) -> Result<(), AppError> {
    if value.chars().count() >= MIN_PASSWORD_LEN {
        Ok(())
    } else {
        Err(AppError::BadRequest(format!(
            "Password must be at least {MIN_PASSWORD_LEN} characters"
        )))
    }
}

pub fn slug(value: &str) -> Result<(), AppError> {
    if SLUG_RE.is_match(value) {
        Ok(())
    } else {
        Err(AppError::BadRequest(
            "Slug must be 2-100 lowercase letters, digits or hyphens".to_string(),
        ))
    }
}

pub fn required(field: &str, value: &str) -> Result<(), AppError> {
    if value.trim().is_empty() {
        Err(AppError::BadRequest(format!("{field} is required")))
    } else {
        Ok(())
    }
}

/// Inclusive character-length bounds on a trimmed value.
pub fn length(field: &str, value: &str, min: usize, max: usize) -> Result<(), AppError> {
    let len = value.trim().chars().count();
    if (min..=max).contains(&len) {
        Ok(())
    } else {
        Err(AppError::BadRequest(format!(
            "{field} must be between {min} and {max} characters"
        )))
    }
}
