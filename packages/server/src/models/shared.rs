use serde::{Deserialize, Deserializer};

use crate::error::AppError;

/// Serde helper for PATCH semantics on nullable fields.
///
/// * JSON field absent  => `None`          (don't update)
/// * JSON field = null  => `Some(None)`    (set to NULL)
/// * JSON field = value => `Some(Some(v))` (set to value)
pub fn double_option<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Some(Option::deserialize(deserializer)?))
}

/// Pragmatic email shape check: one `@`, non-empty local part, dotted domain,
/// no whitespace. Deliverability is the mail provider's problem.
pub fn is_valid_email(email: &str) -> bool {
    if email.len() > 320 || email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.is_empty() || domain.contains('@') {
        return false;
    }
    match domain.rsplit_once('.') {
        Some((host, tld)) => !host.is_empty() && tld.len() >= 2,
        None => false,
    }
}

pub fn validate_email(email: &str) -> Result<(), AppError> {
    if !is_valid_email(email.trim()) {
        return Err(AppError::Validation("Email address is not valid".into()));
    }
    Ok(())
}

/// Validate a required trimmed text field (1-255 Unicode characters).
pub fn validate_required_text(value: &str, name: &str) -> Result<(), AppError> {
    let value = value.trim();
    if value.is_empty() || value.chars().count() > 255 {
        return Err(AppError::Validation(format!(
            "{name} must be 1-255 characters"
        )));
    }
    Ok(())
}

/// Validate an optional text field (at most 255 characters when present).
pub fn validate_optional_text(value: Option<&str>, name: &str) -> Result<(), AppError> {
    if let Some(value) = value
        && value.trim().chars().count() > 255
    {
        return Err(AppError::Validation(format!(
            "{name} must be at most 255 characters"
        )));
    }
    Ok(())
}

/// Validate an absolute http(s) URL, as required for checkout redirects.
pub fn validate_http_url(value: &str, name: &str) -> Result<(), AppError> {
    let value = value.trim();
    if !(value.starts_with("http://") || value.starts_with("https://")) || value.len() <= 8 {
        return Err(AppError::Validation(format!(
            "{name} must be an absolute http(s) URL"
        )));
    }
    Ok(())
}
