use std::sync::Arc;

use crate::application::services::{ShortenerService, SlidingWindowLimiter};

/// Shared handler state. Cheap to clone.
#[derive(Clone)]
pub struct AppState {
    pub shortener: Arc<ShortenerService>,
    pub limiter: Arc<SlidingWindowLimiter>,
    /// Prefix for `short_url` in responses, e.g. `http://localhost:8000`.
    pub base_url: String,
    /// Trust `X-Forwarded-For` / `X-Real-IP` for client identity.
    pub behind_proxy: bool,
}

impl AppState {
    pub fn new(
        shortener: Arc<ShortenerService>,
        limiter: Arc<SlidingWindowLimiter>,
        base_url: impl Into<String>,
        behind_proxy: bool,
    ) -> Self {
        Self {
            shortener,
            limiter,
            base_url: base_url.into(),
            behind_proxy,
        }
    }
}
