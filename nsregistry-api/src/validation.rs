///! Input validation for namespace requests

use nsregistry_common::Error;
use regex::Regex;
use std::sync::LazyLock;

/// Kubernetes limit for a namespace name (RFC 1123 label)
pub const MAX_NAMESPACE_LENGTH: usize = 63;

static NAMESPACE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-z0-9]([a-z0-9-]*[a-z0-9])?$").unwrap()
});

/// Validation result type
pub type ValidationResult<T> = Result<T, Error>;

/// Namespace name validation
pub fn validate_namespace_name(name: &str) -> ValidationResult<()> {
    require_non_empty("namespace", name)?;

    if name.len() > MAX_NAMESPACE_LENGTH {
        return Err(Error::Validation(format!(
            "namespace too long (max {} characters)",
            MAX_NAMESPACE_LENGTH
        )));
    }

    if !NAMESPACE_REGEX.is_match(name) {
        return Err(Error::Validation(
            "namespace must consist of lower case alphanumeric characters or '-', \
             and must start and end with an alphanumeric character"
                .to_string(),
        ));
    }

    Ok(())
}

/// Reject empty or whitespace-only required fields
pub fn require_non_empty(field: &str, value: &str) -> ValidationResult<()> {
    if value.trim().is_empty() {
        return Err(Error::Validation(format!("{} cannot be empty", field)));
    }
    Ok(())
}

/// Page number and size must both be at least 1; size is capped
pub fn validate_page(page_no: u32, page_size: u32, max_page_size: u32) -> ValidationResult<()> {
    if page_no < 1 {
        return Err(Error::Validation("pageNo must be at least 1".to_string()));
    }
    if page_size < 1 {
        return Err(Error::Validation("pageSize must be at least 1".to_string()));
    }
    if page_size > max_page_size {
        return Err(Error::Validation(format!(
            "pageSize must not exceed {}",
            max_page_size
        )));
    }
    Ok(())
}
