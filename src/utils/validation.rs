use crate::utils::error::{Result, ValidatorError};
use std::cmp::Ordering;
use url::Url;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

fn invalid(field: &str, value: impl ToString, reason: impl Into<String>) -> ValidatorError {
    ValidatorError::InvalidConfigValueError {
        field: field.to_string(),
        value: value.to_string(),
        reason: reason.into(),
    }
}

/// Accepts absolute http(s) URLs only; the LLM client appends its own paths.
pub fn validate_url(field: &str, raw: &str) -> Result<()> {
    if raw.trim().is_empty() {
        return Err(invalid(field, raw, "a URL is required"));
    }

    let url = Url::parse(raw).map_err(|e| invalid(field, raw, format!("not a valid URL ({})", e)))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid(
            field,
            raw,
            format!("scheme '{}' is not supported, use http or https", url.scheme()),
        ));
    }
    Ok(())
}

pub fn validate_path(field: &str, path: &str) -> Result<()> {
    if path.trim().is_empty() {
        return Err(invalid(field, path, "a path is required"));
    }
    if path.contains('\0') {
        return Err(invalid(field, path.escape_default(), "path contains a NUL byte"));
    }
    Ok(())
}

pub fn validate_positive_number(field: &str, value: usize, min: usize) -> Result<()> {
    if value < min {
        return Err(invalid(field, value, format!("must be at least {}", min)));
    }
    Ok(())
}

pub fn validate_non_empty_string(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(invalid(field, value, "must not be blank"));
    }
    Ok(())
}

/// Inclusive range check. Values that do not compare (NaN) are rejected.
pub fn validate_range<T: PartialOrd + std::fmt::Display + Copy>(field: &str, value: T, min: T, max: T) -> Result<()> {
    match (value.partial_cmp(&min), value.partial_cmp(&max)) {
        (Some(Ordering::Less), _) | (_, Some(Ordering::Greater)) | (None, _) | (_, None) => {
            Err(invalid(field, value, format!("must be within [{}, {}]", min, max)))
        }
        _ => Ok(()),
    }
}
