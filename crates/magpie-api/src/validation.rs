//! Input validation utilities for the Magpie API
//!
//! This module provides validation functions for API requests.

use validator::ValidationError;

/// Maximum length for username field
pub const MAX_USERNAME_LENGTH: usize = 64;

/// Maximum length for password field
pub const MAX_PASSWORD_LENGTH: usize = 128;

/// Maximum length of a single submitted URL
pub const MAX_URL_LENGTH: usize = 4096;

/// Split a raw URL list into individual URLs.
///
/// Lines are trimmed and empty lines are dropped, so pasted text with blank
/// lines and trailing whitespace submits cleanly.
pub fn parse_url_list(raw: &str) -> Vec<String> {
    raw.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

/// Validate a parsed URL batch against the per-task quota.
pub fn validate_url_batch(urls: &[String], max_urls: usize) -> Result<(), ValidationError> {
    if urls.is_empty() {
        return Err(ValidationError::new("no_urls"));
    }
    if urls.len() > max_urls {
        return Err(ValidationError::new("too_many_urls"));
    }
    if urls.iter().any(|url| url.len() > MAX_URL_LENGTH) {
        return Err(ValidationError::new("url_too_long"));
    }
    Ok(())
}

/// Validate username format
pub fn validate_username(username: &str) -> Result<(), ValidationError> {
    if username.is_empty() {
        return Err(ValidationError::new("username_empty"));
    }
    if username.len() > MAX_USERNAME_LENGTH {
        return Err(ValidationError::new("username_too_long"));
    }
    Ok(())
}

/// Validate password (basic length check, not security policy)
pub fn validate_password(password: &str) -> Result<(), ValidationError> {
    if password.is_empty() {
        return Err(ValidationError::new("password_empty"));
    }
    if password.len() > MAX_PASSWORD_LENGTH {
        return Err(ValidationError::new("password_too_long"));
    }
    Ok(())
}
