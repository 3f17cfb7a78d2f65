//! Handler for short URL redirect.

use axum::{
    extract::{Path, State},
    response::Redirect,
};
use serde_json::json;
use tracing::debug;

use crate::error::AppError;
use crate::state::AppState;

/// Redirects a short code to its original URL.
///
/// # Endpoint
///
/// `GET /{code}`
///
/// # Request Flow
///
/// 1. Check cache for the projection (cache key: `url:{code}`)
/// 2. On cache miss, query the registry
/// 3. Treat expired records as missing
/// 4. Populate the cache
/// 5. Return 307 Temporary Redirect
///
/// Cache errors fall back to the registry.
///
/// # Errors
///
/// Returns 404 Not Found if the short code doesn't exist or has expired.
pub async fn redirect_handler(
    Path(code): Path<String>,
    State(state): State<AppState>,
) -> Result<Redirect, AppError> {
    match state.shortener.resolve(&code).await? {
        Some(projection) => Ok(Redirect::temporary(&projection.long_url)),
        None => {
            debug!(code = %code, "Short code not found");
            Err(AppError::not_found(
                "Short URL not found",
                json!({ "short_code": code }),
            ))
        }
    }
}
