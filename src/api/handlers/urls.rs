//! Handlers for listing and deleting stored URLs.

use axum::{
    Json,
    extract::{Query, State},
};
use serde_json::json;

use crate::api::dto::pagination::PaginationParams;
use crate::api::dto::shorten::UrlResponse;
use crate::api::dto::urls::{DeleteUrlQuery, DeleteUrlResponse, UrlListResponse};
use crate::domain::entities::DeleteFilter;
use crate::error::AppError;
use crate::state::AppState;

/// Deletes one mapping by short code or by long URL.
///
/// # Endpoint
///
/// `DELETE /api/v1/urls?short_code=abc123` or `DELETE /api/v1/urls?long_url=...`
///
/// Deleting a mapping that does not exist is not an error.
///
/// # Response
///
/// ```json
/// { "deleted": true }
/// ```
///
/// # Errors
///
/// Returns 400 Bad Request unless exactly one filter is given.
pub async fn delete_url_handler(
    State(state): State<AppState>,
    Query(query): Query<DeleteUrlQuery>,
) -> Result<Json<DeleteUrlResponse>, AppError> {
    let filter = DeleteFilter::from_parts(query.short_code, query.long_url).ok_or_else(|| {
        AppError::bad_request(
            "Provide exactly one of short_code or long_url",
            json!({}),
        )
    })?;

    let deleted = state.shortener.delete(filter).await?;

    Ok(Json(DeleteUrlResponse { deleted }))
}

/// Lists stored mappings, newest first.
///
/// # Endpoint
///
/// `GET /api/v1/urls?page=1&limit=10`
///
/// # Query Parameters
///
/// - `page` (optional): 1-indexed page number (default: 1)
/// - `limit` (optional): items per page, 1-100 (default: 10)
///
/// Expired mappings are listed too; they stay stored until deleted.
///
/// # Errors
///
/// Returns 400 Bad Request if pagination is out of range.
pub async fn list_urls_handler(
    State(state): State<AppState>,
    Query(pagination): Query<PaginationParams>,
) -> Result<Json<UrlListResponse>, AppError> {
    let (page, limit) = pagination
        .validate_and_get_page_limit()
        .map_err(|msg| AppError::bad_request(msg, json!({})))?;

    let result = state.shortener.list(page, limit).await?;

    let items = result
        .items
        .iter()
        .map(|record| UrlResponse::from_record(record, &state.base_url))
        .collect();

    Ok(Json(UrlListResponse {
        items,
        total: result.total,
        page: result.page,
        limit: result.limit,
    }))
}
