//! DTOs for the URL creation endpoint.

use crate::application::services::DEFAULT_EXPIRES_IN_DAYS;
use crate::domain::entities::UrlRecord;
use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;
use validator::Validate;

/// Compiled regex for custom alias validation.
static CUSTOM_ALIAS_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z0-9]+$").expect("alias regex is valid"));

fn default_expires_in_days() -> i64 {
    DEFAULT_EXPIRES_IN_DAYS
}

/// Request to shorten a single URL.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateUrlRequest {
    /// The original URL to shorten (must be valid HTTP/HTTPS).
    #[validate(url(message = "Invalid URL format"))]
    #[validate(length(max = 2048, message = "URL must be at most 2048 characters"))]
    pub original_url: String,

    /// Optional custom short code.
    #[validate(length(min = 6, max = 8, message = "Custom alias must be 6-8 characters"))]
    #[validate(regex(
        path = *CUSTOM_ALIAS_REGEX,
        message = "Custom alias can only contain letters and digits"
    ))]
    pub custom_alias: Option<String>,

    /// Lifetime in days. Zero or negative values create an already expired link.
    #[serde(default = "default_expires_in_days")]
    #[validate(range(min = -3650, max = 3650))]
    pub expires_in_days: i64,
}

/// A stored mapping as returned by the API.
#[derive(Debug, Serialize)]
pub struct UrlResponse {
    pub short_url: String,
    pub short_code: String,
    pub original_url: String,
    pub expires_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl UrlResponse {
    /// Builds the response for `record`, with `short_url` rooted at `base_url`.
    pub fn from_record(record: &UrlRecord, base_url: &str) -> Self {
        Self {
            short_url: format!("{}/{}", base_url.trim_end_matches('/'), record.short_code),
            short_code: record.short_code.clone(),
            original_url: record.long_url.clone(),
            expires_at: record.expires_at,
            created_at: record.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> CreateUrlRequest {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_expires_in_days_defaults_to_thirty() {
        let req = parse(r#"{"original_url": "https://example.com"}"#);
        assert_eq!(req.expires_in_days, 30);
        assert!(req.custom_alias.is_none());
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_alias_with_hyphen_is_invalid() {
        let req = parse(r#"{"original_url": "https://example.com", "custom_alias": "my-code"}"#);
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_alias_length_bounds() {
        let short = parse(r#"{"original_url": "https://example.com", "custom_alias": "abc"}"#);
        let long = parse(r#"{"original_url": "https://example.com", "custom_alias": "abcdefghi"}"#);
        let ok = parse(r#"{"original_url": "https://example.com", "custom_alias": "promo25"}"#);

        assert!(short.validate().is_err());
        assert!(long.validate().is_err());
        assert!(ok.validate().is_ok());
    }

    #[test]
    fn test_expiry_range() {
        let too_far = parse(r#"{"original_url": "https://example.com", "expires_in_days": 4000}"#);
        let negative = parse(r#"{"original_url": "https://example.com", "expires_in_days": -1}"#);

        assert!(too_far.validate().is_err());
        assert!(negative.validate().is_ok());
    }

    #[test]
    fn test_original_url_length_cap() {
        let long = format!(r#"{{"original_url": "https://example.com/{}"}}"#, "a".repeat(2100));
        assert!(parse(&long).validate().is_err());
    }

    #[test]
    fn test_short_url_joins_base_without_double_slash() {
        let record = UrlRecord::new(
            1,
            "https://example.com".into(),
            "abc123".into(),
            None,
            Utc::now(),
        );

        let a = UrlResponse::from_record(&record, "http://localhost:8000/");
        let b = UrlResponse::from_record(&record, "http://localhost:8000");

        assert_eq!(a.short_url, "http://localhost:8000/abc123");
        assert_eq!(b.short_url, a.short_url);
        assert_eq!(a.original_url, "https://example.com");
    }
}
