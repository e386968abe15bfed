use url::Url;

use crate::error::{AppError, AppResult};

/// Trims a required text field, rejecting empty or oversized values
pub fn required_text(field: &str, value: &str, max_len: usize) -> AppResult<String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(AppError::Validation(format!("{} cannot be empty", field)));
    }
    if value.chars().count() > max_len {
        return Err(AppError::Validation(format!(
            "{} cannot exceed {} characters",
            field, max_len
        )));
    }
    Ok(value.to_string())
}

/// Trims an optional text field; blank values become `None`
pub fn optional_text(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(String::from)
}

/// Validates an optional link field. Blank values become `None`, anything
/// else must be an absolute http(s) URL.
pub fn optional_url(field: &str, value: Option<&str>) -> AppResult<Option<String>> {
    let Some(value) = optional_text(value) else {
        return Ok(None);
    };

    let parsed = Url::parse(&value)
        .map_err(|_| AppError::Validation(format!("{} must be a valid URL", field)))?;

    match parsed.scheme() {
        "http" | "https" => Ok(Some(value)),
        _ => Err(AppError::Validation(format!(
            "{} must use http or https",
            field
        ))),
    }
}

/// Email validation - checks basic format requirements
pub fn is_valid_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if domain.contains('@') {
        return false;
    }

    if local.is_empty() || local.len() > 64 {
        return false;
    }
    if domain.is_empty() || domain.len() > 255 || !domain.contains('.') {
        return false;
    }

    // Catches "user@.com", "user@domain." and "user@a..b"
    let domain_parts: Vec<&str> = domain.split('.').collect();
    if domain_parts.iter().any(|p| p.is_empty()) {
        return false;
    }

    domain_parts.last().is_some_and(|tld| tld.len() >= 2)
}
