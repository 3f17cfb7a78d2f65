//! Top-level router configuration.
//!
//! # Route Structure
//!
//! - `GET  /`            - Service banner
//! - `GET  /{code}`      - Short link redirect (read rate limit)
//! - `GET  /health`      - Health check: database, cache
//! - `/api/v1/*`         - REST API
//!
//! # Middleware
//!
//! - **Tracing** - Structured request/response logging
//! - **Rate limiting** - Per-client sliding window, separate write and read budgets
//! - **Path normalization** - Trailing slash handling

use crate::api;
use crate::api::handlers::{health_handler, redirect_handler, root_handler};
use crate::api::middleware::{rate_limit, tracing};
use crate::state::AppState;
use axum::routing::get;
use axum::{Router, middleware};
use tower::Layer;
use tower_http::normalize_path::{NormalizePath, NormalizePathLayer};

/// Constructs the application router with all routes and middleware.
///
/// Trailing slashes are trimmed before routing.
pub fn app_router(state: AppState) -> NormalizePath<Router> {
    NormalizePathLayer::trim_trailing_slash().layer(router(state))
}

/// All routes and middleware, without path normalization.
///
/// Client identity for rate limiting follows `state.behind_proxy`: when set,
/// `X-Forwarded-For` / `X-Real-IP` are trusted instead of the peer socket
/// address. Enable only behind a trusted reverse proxy.
pub fn router(state: AppState) -> Router {
    let redirect = Router::new()
        .route("/{code}", get(redirect_handler))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            rate_limit::read_layer,
        ));

    Router::new()
        .route("/", get(root_handler))
        .route("/health", get(health_handler))
        .merge(redirect)
        .nest("/api/v1", api::routes::v1_routes(state.clone()))
        .with_state(state)
        .layer(tracing::layer())
}
