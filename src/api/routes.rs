//! API route configuration.

use crate::api::handlers::{create_url_handler, delete_url_handler, list_urls_handler};
use crate::api::middleware::rate_limit;
use crate::state::AppState;
use axum::{
    Router, middleware,
    routing::{get, post},
};

/// Versioned API routes, nested under `/api/v1`.
///
/// # Endpoints
///
/// - `POST   /urls/create`   - Shorten a URL (write rate limit)
/// - `GET    /urls`          - List stored mappings (paginated)
/// - `DELETE /urls`          - Delete a mapping by `short_code` or `long_url`
pub fn v1_routes(state: AppState) -> Router<AppState> {
    let create = Router::new()
        .route("/urls/create", post(create_url_handler))
        .route_layer(middleware::from_fn_with_state(state, rate_limit::write_layer));

    Router::new()
        .route("/urls", get(list_urls_handler).delete(delete_url_handler))
        .merge(create)
}
