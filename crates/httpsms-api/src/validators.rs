//! Request validation shared by the route handlers.

use httpsms_core::error::DomainError;

/// Longest message body accepted.
pub const MAX_CONTENT_LENGTH: usize = 2048;
/// Page size when the request gives none.
pub const DEFAULT_PAGE_LIMIT: u32 = 20;
/// Largest page size accepted.
pub const MAX_PAGE_LIMIT: u32 = 100;
/// Messages handed to a phone per fetch when the request gives no limit.
pub const DEFAULT_OUTSTANDING_LIMIT: u32 = 10;

/// Checks an E.164 phone number (`+` followed by 7 to 15 digits) and returns
/// it trimmed.
///
/// # Errors
///
/// Returns `DomainError::Validation` naming `field`.
pub fn phone_number(field: &str, value: &str) -> Result<String, DomainError> {
    let value = value.trim();
    let valid = value.strip_prefix('+').is_some_and(|digits| {
        (7..=15).contains(&digits.len()) && digits.bytes().all(|b| b.is_ascii_digit())
    });
    if valid {
        Ok(value.to_owned())
    } else {
        Err(DomainError::Validation(format!(
            "{field} must be an E.164 phone number, got {value:?}"
        )))
    }
}

/// Checks a message body.
///
/// # Errors
///
/// Returns `DomainError::Validation` if the body is blank or too long.
pub fn content(value: &str) -> Result<String, DomainError> {
    if value.trim().is_empty() {
        return Err(DomainError::Validation("content must not be empty".into()));
    }
    if value.chars().count() > MAX_CONTENT_LENGTH {
        return Err(DomainError::Validation(format!(
            "content must be at most {MAX_CONTENT_LENGTH} characters"
        )));
    }
    Ok(value.to_owned())
}

/// Resolves a requested page size.
///
/// # Errors
///
/// Returns `DomainError::Validation` if `limit` is zero or above `max`.
pub fn limit(requested: Option<u32>, default: u32, max: u32) -> Result<u32, DomainError> {
    match requested {
        None => Ok(default),
        Some(limit) if (1..=max).contains(&limit) => Ok(limit),
        Some(limit) => Err(DomainError::Validation(format!(
            "limit must be between 1 and {max}, got {limit}"
        ))),
    }
}

/// Resolves `skip` and `limit` query parameters.
///
/// # Errors
///
/// Returns `DomainError::Validation` for an out-of-range limit.
pub fn page(skip: Option<u32>, requested: Option<u32>) -> Result<(u32, u32), DomainError> {
    Ok((
        skip.unwrap_or(0),
        limit(requested, DEFAULT_PAGE_LIMIT, MAX_PAGE_LIMIT)?,
    ))
}
