//! DTOs for URL management endpoints.

use serde::{Deserialize, Serialize};

use crate::api::dto::shorten::UrlResponse;

/// Query for `DELETE /api/v1/urls`. Exactly one field must be set.
#[derive(Debug, Deserialize)]
pub struct DeleteUrlQuery {
    pub short_code: Option<String>,
    pub long_url: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct DeleteUrlResponse {
    pub deleted: bool,
}

/// One page of stored mappings, newest first.
#[derive(Debug, Serialize)]
pub struct UrlListResponse {
    pub items: Vec<UrlResponse>,
    pub total: i64,
    pub page: i64,
    pub limit: i64,
}
