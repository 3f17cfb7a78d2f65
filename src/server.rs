//! HTTP server initialization and runtime setup.
//!
//! Handles registry and cache setup, the rate limiter sweeper, and the Axum
//! server lifecycle.

use crate::application::services::{ShortenerService, SlidingWindowLimiter};
use crate::config::{CacheFallback, Config, RegistryBackend};
use crate::domain::repositories::UrlRegistry;
use crate::infrastructure::cache::{CacheService, MemoryCache, NullCache, RedisCache};
use crate::infrastructure::persistence::{MemoryUrlRegistry, PgUrlRegistry};
use crate::routes::app_router;
use crate::state::AppState;
use crate::utils::code_generator::EntropyCodeGenerator;

use anyhow::{Context, Result};
use axum::ServiceExt;
use axum::extract::Request;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio_retry::Retry;
use tokio_retry::strategy::{ExponentialBackoff, jitter};

/// Attempts made to reach PostgreSQL at startup after the first failure.
const DB_CONNECT_RETRIES: usize = 5;

/// How often the in-process cache drops expired entries.
const CACHE_PURGE_INTERVAL: Duration = Duration::from_secs(60);

/// Runs the HTTP server with the given configuration.
///
/// Initializes:
/// - URL registry (PostgreSQL with migrations, or in-memory)
/// - Cache (Redis, with memory or no-op fallback)
/// - Sliding-window rate limiter and its sweeper task
/// - Axum HTTP server with graceful shutdown
///
/// # Errors
///
/// Returns an error if:
/// - Database connection or migration fails
/// - Server bind fails
/// - Server runtime error occurs
pub async fn run(config: Config) -> Result<()> {
    let shortener = Arc::new(build_shortener(&config).await?);

    let limiter = Arc::new(SlidingWindowLimiter::new(
        config.write_policy(),
        config.read_policy(),
    ));
    spawn_limiter_sweeper(limiter.clone(), config.rate_limit_window());

    let state = AppState::new(
        shortener,
        limiter,
        config.base_url.clone(),
        config.behind_proxy,
    );

    let app = app_router(state);

    let addr: SocketAddr = config
        .listen_addr
        .parse()
        .with_context(|| format!("Invalid LISTEN address '{}'", config.listen_addr))?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Listening on http://{addr}");

    axum::serve(
        listener,
        ServiceExt::<Request>::into_make_service_with_connect_info::<SocketAddr>(app),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    tracing::info!("Server stopped");

    Ok(())
}

/// Builds the shortener service over the configured registry and cache.
pub async fn build_shortener(config: &Config) -> Result<ShortenerService> {
    let registry = build_registry(config).await?;
    let cache = build_cache(config).await;

    Ok(ShortenerService::new(
        registry,
        cache,
        Arc::new(EntropyCodeGenerator),
        config.shortener_settings(),
    ))
}

/// Connects the configured registry backend, applying migrations for PostgreSQL.
pub async fn build_registry(config: &Config) -> Result<Arc<dyn UrlRegistry>> {
    match config.registry_backend {
        RegistryBackend::Postgres => {
            let pool = connect_database(config).await?;

            sqlx::migrate!("./migrations")
                .run(&pool)
                .await
                .context("Failed to apply migrations")?;
            tracing::info!("Migrations applied");

            Ok(Arc::new(PgUrlRegistry::new(Arc::new(pool))))
        }
        RegistryBackend::Memory => {
            tracing::warn!("Using in-memory registry; links are lost on restart");
            Ok(Arc::new(MemoryUrlRegistry::new()))
        }
    }
}

/// Opens the PostgreSQL pool, retrying with exponential backoff.
///
/// # Errors
///
/// Returns an error if no database URL is configured or every attempt fails.
pub async fn connect_database(config: &Config) -> Result<PgPool> {
    let database_url = config
        .database_url
        .as_deref()
        .context("DATABASE_URL is not configured")?;

    let options = PgPoolOptions::new()
        .max_connections(config.db_max_connections)
        .acquire_timeout(Duration::from_secs(config.db_connect_timeout))
        .idle_timeout(Duration::from_secs(config.db_idle_timeout))
        .max_lifetime(Duration::from_secs(config.db_max_lifetime));

    let strategy = ExponentialBackoff::from_millis(100)
        .max_delay(Duration::from_secs(5))
        .map(jitter)
        .take(DB_CONNECT_RETRIES);

    let pool = Retry::spawn(strategy, || {
        let options = options.clone();
        async move {
            options.connect(database_url).await.inspect_err(|e| {
                tracing::warn!("Database connection attempt failed: {}", e);
            })
        }
    })
    .await
    .context("Failed to connect to database")?;

    tracing::info!("Connected to database");

    Ok(pool)
}

/// Selects the cache backend.
///
/// Redis when configured and reachable; otherwise the `CACHE_BACKEND` fallback.
/// Never fails: the service runs correctly without a cache.
pub async fn build_cache(config: &Config) -> Arc<dyn CacheService> {
    if let Some(redis_url) = &config.redis_url {
        match RedisCache::connect(redis_url, config.cache_ttl_seconds).await {
            Ok(redis) => {
                tracing::info!("Cache enabled (Redis)");
                return Arc::new(redis);
            }
            Err(e) => {
                tracing::warn!("Failed to connect to Redis: {}. Using fallback cache.", e);
            }
        }
    }

    match config.cache_fallback {
        CacheFallback::Memory => {
            tracing::info!("Cache enabled (in-process)");
            let cache = Arc::new(MemoryCache::new(Duration::from_secs(
                config.cache_ttl_seconds,
            )));
            spawn_cache_purger(cache.clone(), CACHE_PURGE_INTERVAL);
            cache as Arc<dyn CacheService>
        }
        CacheFallback::Disabled => {
            tracing::info!("Cache disabled (NullCache)");
            Arc::new(NullCache::new())
        }
    }
}

/// Periodically drops idle rate-limit buckets.
fn spawn_limiter_sweeper(limiter: Arc<SlidingWindowLimiter>, every: Duration) {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;

            let removed = limiter.sweep();
            if removed > 0 {
                tracing::debug!(
                    removed,
                    remaining = limiter.tracked_buckets(),
                    "Swept idle rate-limit buckets"
                );
            }
        }
    });
}

/// Periodically drops expired entries from the in-process cache.
fn spawn_cache_purger(cache: Arc<MemoryCache>, every: Duration) {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;

            let removed = cache.purge_expired().await;
            if removed > 0 {
                tracing::debug!(removed, "Purged expired cache entries");
            }
        }
    });
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }

    tracing::info!("Shutdown signal received");
}
