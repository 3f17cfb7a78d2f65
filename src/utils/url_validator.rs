//! Long URL validation.
//!
//! Records are deduplicated on the raw long URL string, so validation only
//! accepts or rejects input. It never rewrites it.

use url::Url;

/// Longest accepted long URL, in bytes. Keeps the unique index on `long_url`
/// within PostgreSQL's btree row limit.
pub const MAX_URL_LENGTH: usize = 2048;

/// Errors that can occur during URL validation.
#[derive(Debug, thiserror::Error)]
pub enum UrlValidationError {
    #[error("Invalid URL format: {0}")]
    InvalidFormat(String),

    #[error("Only HTTP and HTTPS protocols are allowed")]
    UnsupportedProtocol,

    #[error("URL must include a host")]
    MissingHost,

    #[error("URL must not exceed {MAX_URL_LENGTH} bytes")]
    TooLong,

    #[error("URL must not contain control characters or surrounding whitespace")]
    InvalidCharacters,
}

/// Checks that `input` is an absolute HTTP(S) URL with a host.
///
/// Rejects potentially dangerous protocols like `javascript:`, `data:`, `file:`, etc.
///
/// # Errors
///
/// Returns [`UrlValidationError::InvalidFormat`] for malformed URLs.
/// Returns [`UrlValidationError::UnsupportedProtocol`] for non-HTTP(S) schemes.
/// Returns [`UrlValidationError::MissingHost`] when the host is empty.
/// Returns [`UrlValidationError::TooLong`] above [`MAX_URL_LENGTH`] bytes.
/// Returns [`UrlValidationError::InvalidCharacters`] for control characters or
/// leading/trailing whitespace. The parser strips those silently, but the raw
/// string is what gets stored and later sent as `Location`.
pub fn validate_long_url(input: &str) -> Result<(), UrlValidationError> {
    if input.len() > MAX_URL_LENGTH {
        return Err(UrlValidationError::TooLong);
    }

    if input.trim() != input || input.chars().any(|c| c.is_control()) {
        return Err(UrlValidationError::InvalidCharacters);
    }

    let url = Url::parse(input).map_err(|e| UrlValidationError::InvalidFormat(e.to_string()))?;

    match url.scheme() {
        "http" | "https" => {}
        _ => return Err(UrlValidationError::UnsupportedProtocol),
    }

    match url.host_str() {
        Some(host) if !host.is_empty() => Ok(()),
        _ => Err(UrlValidationError::MissingHost),
    }
}
