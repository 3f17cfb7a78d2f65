#![allow(dead_code)]

use axum::{Router, extract::ConnectInfo};
use axum_test::TestServer;
use chrono::{Duration as ChronoDuration, Utc};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use url_shortener::application::services::{
    RateLimitPolicy, ShortenerService, ShortenerSettings, SlidingWindowLimiter,
};
use url_shortener::domain::entities::{NewUrlRecord, UrlRecord};
use url_shortener::domain::repositories::UrlRegistry;
use url_shortener::infrastructure::cache::MemoryCache;
use url_shortener::infrastructure::persistence::MemoryUrlRegistry;
use url_shortener::routes::router;
use url_shortener::state::AppState;
use url_shortener::utils::code_generator::EntropyCodeGenerator;

pub const BASE_URL: &str = "http://localhost:8000";

/// Handles to the in-process backends behind a test server.
pub struct TestApp {
    pub state: AppState,
    pub registry: Arc<MemoryUrlRegistry>,
    pub cache: Arc<MemoryCache>,
}

pub fn create_test_app() -> TestApp {
    create_test_app_with_limits(1000, 1000)
}

pub fn create_test_app_with_limits(write_max: usize, read_max: usize) -> TestApp {
    let registry = Arc::new(MemoryUrlRegistry::new());
    let cache = Arc::new(MemoryCache::new(Duration::from_secs(3600)));

    let shortener = Arc::new(ShortenerService::new(
        registry.clone(),
        cache.clone(),
        Arc::new(EntropyCodeGenerator),
        ShortenerSettings::default(),
    ));

    let window = Duration::from_secs(60);
    let limiter = Arc::new(SlidingWindowLimiter::new(
        RateLimitPolicy::new(write_max, window),
        RateLimitPolicy::new(read_max, window),
    ));

    let state = AppState::new(shortener, limiter, BASE_URL, false);

    TestApp {
        state,
        registry,
        cache,
    }
}

/// Serves the full router with a fixed peer address of `127.0.0.1`.
pub fn test_server(state: AppState) -> TestServer {
    test_server_from(state, "127.0.0.1:12345")
}

pub fn test_server_from(state: AppState, peer: &str) -> TestServer {
    let addr: SocketAddr = peer.parse().unwrap();
    let app: Router = router(state).layer(MockConnectInfoLayer(addr));
    TestServer::new(app).unwrap()
}

pub async fn create_test_link(registry: &MemoryUrlRegistry, code: &str, url: &str) -> UrlRecord {
    registry
        .insert(NewUrlRecord {
            long_url: url.to_string(),
            short_code: code.to_string(),
            expires_at: Some(Utc::now() + ChronoDuration::days(30)),
        })
        .await
        .unwrap()
}

pub async fn create_expired_link(registry: &MemoryUrlRegistry, code: &str, url: &str) -> UrlRecord {
    registry
        .insert(NewUrlRecord {
            long_url: url.to_string(),
            short_code: code.to_string(),
            expires_at: Some(Utc::now() - ChronoDuration::hours(1)),
        })
        .await
        .unwrap()
}

#[derive(Clone)]
pub struct MockConnectInfoLayer(pub SocketAddr);

impl<S> tower::Layer<S> for MockConnectInfoLayer {
    type Service = MockConnectInfoService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        MockConnectInfoService {
            inner,
            addr: self.0,
        }
    }
}

#[derive(Clone)]
pub struct MockConnectInfoService<S> {
    inner: S,
    addr: SocketAddr,
}

impl<S, B> tower::Service<axum::http::Request<B>> for MockConnectInfoService<S>
where
    S: tower::Service<axum::http::Request<B>> + Clone + Send + 'static,
    S::Future: Send + 'static,
    B: Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = S::Future;

    fn poll_ready(
        &mut self,
        cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: axum::http::Request<B>) -> Self::Future {
        req.extensions_mut().insert(ConnectInfo(self.addr));
        self.inner.call(req)
    }
}
