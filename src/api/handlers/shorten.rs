//! Handler for the URL creation endpoint.

use axum::{Json, extract::State, http::StatusCode};
use serde_json::json;
use validator::Validate;

use crate::api::dto::shorten::{CreateUrlRequest, UrlResponse};
use crate::application::services::CreateOutcome;
use crate::error::AppError;
use crate::state::AppState;

/// Creates a short URL for a long URL.
///
/// # Endpoint
///
/// `POST /api/v1/urls/create`
///
/// # Request Body
///
/// ```json
/// {
///   "original_url": "https://example.com/a",
///   "custom_alias": "promo25",   // optional
///   "expires_in_days": 30        // optional, default 30
/// }
/// ```
///
/// # Response Codes
///
/// - **201 Created**: A new mapping was stored
/// - **200 OK**: The long URL was already mapped; the existing mapping is returned
/// - **409 Conflict**: The alias is taken, or the URL is mapped to a different code
///
/// # Response
///
/// ```json
/// {
///   "short_url": "http://localhost:8000/promo25",
///   "short_code": "promo25",
///   "original_url": "https://example.com/a",
///   "expires_at": "2026-11-18T10:00:00Z",
///   "created_at": "2026-10-19T10:00:00Z"
/// }
/// ```
///
/// # Errors
///
/// Returns 400 Bad Request if the URL, alias or expiry is invalid.
pub async fn create_url_handler(
    State(state): State<AppState>,
    Json(payload): Json<CreateUrlRequest>,
) -> Result<(StatusCode, Json<UrlResponse>), AppError> {
    payload.validate()?;

    let alias = payload.custom_alias.as_deref();

    let outcome = state
        .shortener
        .create(&payload.original_url, alias, payload.expires_in_days)
        .await?;

    match outcome {
        CreateOutcome::Created(record) => Ok((
            StatusCode::CREATED,
            Json(UrlResponse::from_record(&record, &state.base_url)),
        )),
        CreateOutcome::AlreadyExists(record) => match alias {
            Some(alias) if alias != record.short_code => Err(AppError::conflict(
                "URL is already shortened with a different code",
                json!({ "short_code": record.short_code }),
            )),
            _ => Ok((
                StatusCode::OK,
                Json(UrlResponse::from_record(&record, &state.base_url)),
            )),
        },
        CreateOutcome::CodeTaken => Err(AppError::conflict(
            "Custom alias is already in use",
            json!({ "custom_alias": alias }),
        )),
    }
}
