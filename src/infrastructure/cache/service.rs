//! Cache service trait and error types.

use async_trait::async_trait;

use crate::domain::entities::UrlProjection;

/// Errors that can occur during cache operations.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("Cache connection error: {0}")]
    ConnectionError(String),
    #[error("Cache operation error: {0}")]
    OperationError(String),
    #[error("Cache payload error: {0}")]
    SerializationError(String),
}

/// Result type for cache operations.
pub type CacheResult<T> = Result<T, CacheError>;

/// Trait for caching URL projections keyed by short code.
///
/// Backends report failures honestly. The fail-open policy (treat any error
/// or timeout as a miss, never surface it to users) is applied by
/// [`crate::application::services::ShortenerService`], where it is visible.
///
/// # Implementations
///
/// - [`crate::infrastructure::cache::RedisCache`] - Redis-backed cache with TTL support
/// - [`crate::infrastructure::cache::MemoryCache`] - Process-local TTL cache
/// - [`crate::infrastructure::cache::NullCache`] - No-op implementation for disabled caching
#[async_trait]
pub trait CacheService: Send + Sync {
    /// Retrieves the cached projection for a short code.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(projection))` on cache hit
    /// - `Ok(None)` on cache miss
    async fn get(&self, short_code: &str) -> CacheResult<Option<UrlProjection>>;

    /// Stores a projection with the backend's configured TTL.
    async fn put(&self, short_code: &str, projection: &UrlProjection) -> CacheResult<()>;

    /// Removes a cached projection.
    ///
    /// Removing an absent key is not an error.
    async fn invalidate(&self, short_code: &str) -> CacheResult<()>;

    /// Checks if the cache backend is healthy.
    ///
    /// Used by health check endpoints to report cache status.
    async fn health_check(&self) -> bool;

    /// Short backend name for logs and health output.
    fn backend_name(&self) -> &'static str;
}
