//! Rate limiting middleware using a sliding window per client.

use axum::{
    extract::{ConnectInfo, Request, State},
    http::{HeaderValue, header},
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde_json::json;
use std::net::SocketAddr;
use tracing::debug;

use crate::application::services::TrafficClass;
use crate::error::AppError;
use crate::state::AppState;
use crate::utils::client_identity::client_identity;

/// Limits write traffic (link creation).
///
/// # Limits
///
/// `RATE_LIMIT_WRITE_MAX` requests per `RATE_LIMIT_WINDOW_SECONDS`
/// (default: 10 per 60s) per client.
///
/// # Example
///
/// ```rust,ignore
/// let api = Router::new()
///     .route("/urls/create", post(create_url_handler))
///     .route_layer(middleware::from_fn_with_state(state.clone(), rate_limit::write_layer));
/// ```
pub async fn write_layer(State(st): State<AppState>, req: Request, next: Next) -> Response {
    enforce(&st, TrafficClass::Write, req, next).await
}

/// Limits read traffic (redirects).
///
/// # Limits
///
/// `RATE_LIMIT_READ_MAX` requests per `RATE_LIMIT_WINDOW_SECONDS`
/// (default: 1000 per 60s) per client.
pub async fn read_layer(State(st): State<AppState>, req: Request, next: Next) -> Response {
    enforce(&st, TrafficClass::Read, req, next).await
}

/// Admits or rejects the request.
///
/// Requests exceeding the limit receive `429 Too Many Requests` with a
/// `Retry-After` header set to the window length. Rejected requests never
/// reach the handler.
async fn enforce(st: &AppState, class: TrafficClass, req: Request, next: Next) -> Response {
    let peer = req
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| *addr);

    let identity = client_identity(req.headers(), peer, st.behind_proxy);

    if st.limiter.is_allowed(&identity, class) {
        return next.run(req).await;
    }

    metrics::counter!("rate_limit_rejections_total", "class" => class.to_string()).increment(1);
    debug!(%identity, %class, "Rate limit exceeded");

    let policy = st.limiter.policy(class);
    let window_seconds = policy.window.as_secs();

    let mut response = AppError::rate_limited(
        "Too many requests",
        json!({
            "class": class.to_string(),
            "limit": policy.max_requests,
            "window_seconds": window_seconds,
        }),
    )
    .into_response();

    response
        .headers_mut()
        .insert(header::RETRY_AFTER, HeaderValue::from(window_seconds));

    response
}
