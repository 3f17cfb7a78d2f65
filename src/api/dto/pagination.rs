//! Pagination query parameters.

use serde::Deserialize;
use serde_with::{DisplayFromStr, serde_as};

pub const DEFAULT_PAGE_LIMIT: i64 = 10;
pub const MAX_PAGE_LIMIT: i64 = 100;

/// Pagination query parameters.
///
/// Uses `serde_with` to parse numbers from query strings as integers.
#[serde_as]
#[derive(Debug, Deserialize)]
pub struct PaginationParams {
    #[serde_as(as = "Option<DisplayFromStr>")]
    #[serde(default)]
    pub page: Option<i64>,

    #[serde_as(as = "Option<DisplayFromStr>")]
    #[serde(default)]
    pub limit: Option<i64>,
}

impl PaginationParams {
    /// Validates pagination parameters and applies defaults.
    ///
    /// # Defaults
    ///
    /// - `page`: 1
    /// - `limit`: 10
    ///
    /// # Validation
    ///
    /// - Page must be > 0
    /// - Limit must be between 1 and 100
    ///
    /// # Returns
    ///
    /// `(page, limit)` tuple.
    pub fn validate_and_get_page_limit(&self) -> Result<(i64, i64), String> {
        let page = self.page.unwrap_or(1);
        let limit = self.limit.unwrap_or(DEFAULT_PAGE_LIMIT);

        if page < 1 {
            return Err("Page must be greater than 0".to_string());
        }

        if !(1..=MAX_PAGE_LIMIT).contains(&limit) {
            return Err(format!("Limit must be between 1 and {}", MAX_PAGE_LIMIT));
        }

        Ok((page, limit))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(page: Option<i64>, limit: Option<i64>) -> PaginationParams {
        PaginationParams { page, limit }
    }

    #[test]
    fn test_defaults() {
        let (page, limit) = params(None, None).validate_and_get_page_limit().unwrap();
        assert_eq!(page, 1);
        assert_eq!(limit, 10);
    }

    #[test]
    fn test_custom_page_and_limit() {
        let (page, limit) = params(Some(3), Some(50))
            .validate_and_get_page_limit()
            .unwrap();
        assert_eq!(page, 3);
        assert_eq!(limit, 50);
    }

    #[test]
    fn test_page_zero_is_error() {
        assert!(params(Some(0), None).validate_and_get_page_limit().is_err());
        assert!(params(Some(-1), None).validate_and_get_page_limit().is_err());
    }

    #[test]
    fn test_limit_bounds() {
        assert!(params(None, Some(0)).validate_and_get_page_limit().is_err());
        assert!(params(None, Some(1)).validate_and_get_page_limit().is_ok());
        assert!(params(None, Some(100)).validate_and_get_page_limit().is_ok());
        assert!(params(None, Some(101)).validate_and_get_page_limit().is_err());
    }

    #[test]
    fn test_parses_from_query_strings() {
        let json = r#"{"page": "2", "limit": "25"}"#;
        let p: PaginationParams = serde_json::from_str(json).unwrap();
        assert_eq!(p.page, Some(2));
        assert_eq!(p.limit, Some(25));
    }

    #[test]
    fn test_non_numeric_is_error() {
        let json = r#"{"page": "two"}"#;
        assert!(serde_json::from_str::<PaginationParams>(json).is_err());
    }
}
