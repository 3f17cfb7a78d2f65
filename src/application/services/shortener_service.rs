//! Create, resolve, delete and list orchestration.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use chrono::{TimeDelta, Utc};
use serde_json::json;
use tokio::time::timeout;
use tracing::{debug, info, warn};

use crate::domain::entities::{DeleteFilter, NewUrlRecord, UniqueField, UrlProjection, UrlRecord};
use crate::domain::repositories::{RegistryError, RegistryResult, UrlRegistry};
use crate::error::AppError;
use crate::infrastructure::cache::{CacheResult, CacheService};
use crate::utils::code_generator::{
    CodeGenerator, DEFAULT_CODE_LENGTH, FALLBACK_CODE_LENGTH, is_base62, validate_custom_code,
};
use crate::utils::url_validator::validate_long_url;

/// Default lifetime of a new record.
pub const DEFAULT_EXPIRES_IN_DAYS: i64 = 30;

/// Largest accepted `expires_in_days`, in either direction.
pub const MAX_EXPIRES_IN_DAYS: i64 = 3650;

/// Result of a create request.
///
/// Conflicts are ordinary outcomes here, not errors. The caller decides how
/// to present them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CreateOutcome {
    /// A new record was stored.
    Created(UrlRecord),
    /// The long URL already has a mapping; carries the stored record.
    AlreadyExists(UrlRecord),
    /// The requested custom code belongs to another record.
    CodeTaken,
}

/// One page of records, newest first.
#[derive(Debug, Clone)]
pub struct UrlPage {
    pub items: Vec<UrlRecord>,
    pub total: i64,
    pub page: i64,
    pub limit: i64,
}

/// Tunables for [`ShortenerService`].
#[derive(Debug, Clone, Copy)]
pub struct ShortenerSettings {
    /// Generated-code attempts at the default length before the long fallback.
    pub max_attempts: usize,
    pub registry_timeout: Duration,
    pub cache_timeout: Duration,
}

impl Default for ShortenerSettings {
    fn default() -> Self {
        Self {
            max_attempts: 10,
            registry_timeout: Duration::from_secs(2),
            cache_timeout: Duration::from_millis(200),
        }
    }
}

/// Orchestrates code generation, the registry and the cache.
///
/// Holds no per-request state. Every operation is safe to run concurrently;
/// races between creates are settled by the registry's unique constraints.
///
/// # Failure policy
///
/// - Registry errors and timeouts fail the operation (the registry is the source of truth).
/// - Cache errors and timeouts are logged and treated as a miss or a no-op.
pub struct ShortenerService {
    registry: Arc<dyn UrlRegistry>,
    cache: Arc<dyn CacheService>,
    generator: Arc<dyn CodeGenerator>,
    settings: ShortenerSettings,
}

impl ShortenerService {
    /// Creates a new shortener service.
    pub fn new(
        registry: Arc<dyn UrlRegistry>,
        cache: Arc<dyn CacheService>,
        generator: Arc<dyn CodeGenerator>,
        settings: ShortenerSettings,
    ) -> Self {
        Self {
            registry,
            cache,
            generator,
            settings,
        }
    }

    /// Shortens `long_url`.
    ///
    /// Without a custom code, candidates are generated at 6 characters and
    /// checked against the registry up to `max_attempts` times; after that one
    /// 8-character code is used unchecked.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] for a malformed URL, custom code or
    /// expiry. Returns [`AppError::Internal`] on registry failure or timeout.
    pub async fn create(
        &self,
        long_url: &str,
        custom_code: Option<&str>,
        expires_in_days: i64,
    ) -> Result<CreateOutcome, AppError> {
        validate_long_url(long_url)?;

        if let Some(code) = custom_code {
            validate_custom_code(code)?;
        }

        let expires_at = expiry_from_days(expires_in_days)?;

        let short_code = match custom_code {
            Some(code) => code.to_string(),
            None => self.generate_unique_code(long_url).await?,
        };

        let new_record = NewUrlRecord {
            long_url: long_url.to_string(),
            short_code,
            expires_at: Some(expires_at),
        };

        let inserted = self
            .with_registry_timeout("insert", self.registry.insert(new_record))
            .await;

        match inserted {
            Ok(record) => {
                info!(short_code = %record.short_code, "Created short link");
                Ok(CreateOutcome::Created(record))
            }
            Err(RegistryError::Conflict {
                field: UniqueField::LongUrl,
            }) => {
                let existing = self
                    .with_registry_timeout(
                        "find_by_long_url",
                        self.registry.find_by_long_url(long_url),
                    )
                    .await?;

                match existing {
                    Some(record) => {
                        debug!(short_code = %record.short_code, "Long URL already mapped");
                        Ok(CreateOutcome::AlreadyExists(record))
                    }
                    None => Err(AppError::internal(
                        "Conflicting record disappeared during create",
                        json!({ "long_url": long_url }),
                    )),
                }
            }
            Err(RegistryError::Conflict {
                field: UniqueField::ShortCode,
            }) => match custom_code {
                Some(_) => Ok(CreateOutcome::CodeTaken),
                None => Err(AppError::internal(
                    "Failed to generate unique code",
                    json!({ "reason": "Fallback code collided" }),
                )),
            },
            Err(e) => Err(e.into()),
        }
    }

    /// Resolves a short code to its projection.
    ///
    /// Cache hits are returned without an expiration check: an entry means
    /// "recently known good", bounded by the cache TTL. Registry hits are
    /// checked against the current UTC time and expired records read as absent.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on registry failure or timeout.
    pub async fn resolve(&self, short_code: &str) -> Result<Option<UrlProjection>, AppError> {
        if short_code.is_empty() || short_code.len() > FALLBACK_CODE_LENGTH || !is_base62(short_code)
        {
            return Ok(None);
        }

        if let Some(hit) = self.cache_get(short_code).await {
            metrics::counter!("shortener_cache_hits_total").increment(1);
            return Ok(Some(hit));
        }
        metrics::counter!("shortener_cache_misses_total").increment(1);

        let record = self
            .with_registry_timeout(
                "find_by_short_code",
                self.registry.find_by_short_code(short_code),
            )
            .await?;

        let Some(record) = record else {
            return Ok(None);
        };

        if record.is_expired_at(Utc::now()) {
            debug!(short_code, "Record expired");
            return Ok(None);
        }

        let projection = record.projection();
        self.cache_put(short_code, &projection).await;

        Ok(Some(projection))
    }

    /// Physically deletes one record and invalidates its cache entry.
    ///
    /// Returns whether a record was removed. Removing nothing is not an error.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on registry failure or timeout.
    pub async fn delete(&self, filter: DeleteFilter) -> Result<bool, AppError> {
        let requested_code = match &filter {
            DeleteFilter::ShortCode(code) => Some(code.clone()),
            DeleteFilter::LongUrl(_) => None,
        };

        let removed = self
            .with_registry_timeout("delete", self.registry.delete(filter))
            .await?;

        let code_to_invalidate = removed
            .as_ref()
            .map(|record| record.short_code.clone())
            .or(requested_code);

        if let Some(code) = code_to_invalidate {
            self.cache_invalidate(&code).await;
        }

        match removed {
            Some(record) => {
                info!(short_code = %record.short_code, "Deleted short link");
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Lists records newest first.
    ///
    /// `page` is 1-indexed.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] if `page < 1` or `limit < 1`.
    /// Returns [`AppError::Internal`] on registry failure or timeout.
    pub async fn list(&self, page: i64, limit: i64) -> Result<UrlPage, AppError> {
        if page < 1 || limit < 1 {
            return Err(AppError::bad_request(
                "Page and limit must be positive",
                json!({ "page": page, "limit": limit }),
            ));
        }

        let offset = (page - 1).saturating_mul(limit);

        let total = self
            .with_registry_timeout("count_all", self.registry.count_all())
            .await?;
        let items = self
            .with_registry_timeout("list_page", self.registry.list_page(offset, limit))
            .await?;

        Ok(UrlPage {
            items,
            total,
            page,
            limit,
        })
    }

    /// Checks that the registry answers within the timeout.
    pub async fn registry_health(&self) -> Result<(), AppError> {
        self.with_registry_timeout("ping", self.registry.ping())
            .await
            .map_err(AppError::from)
    }

    /// Checks the cache backend; a timeout counts as unhealthy.
    pub async fn cache_health(&self) -> bool {
        timeout(self.settings.cache_timeout, self.cache.health_check())
            .await
            .unwrap_or(false)
    }

    /// Name of the configured cache backend.
    pub fn cache_backend(&self) -> &'static str {
        self.cache.backend_name()
    }

    async fn generate_unique_code(&self, long_url: &str) -> Result<String, AppError> {
        for attempt in 1..=self.settings.max_attempts {
            let code = self.generator.generate(long_url, DEFAULT_CODE_LENGTH);

            let existing = self
                .with_registry_timeout("find_by_short_code", self.registry.find_by_short_code(&code))
                .await?;

            if existing.is_none() {
                return Ok(code);
            }

            debug!(attempt, code = %code, "Generated code collided");
        }

        warn!(
            attempts = self.settings.max_attempts,
            "Code attempts exhausted, using {}-character code", FALLBACK_CODE_LENGTH
        );
        Ok(self.generator.generate(long_url, FALLBACK_CODE_LENGTH))
    }

    async fn with_registry_timeout<T>(
        &self,
        operation: &'static str,
        call: impl Future<Output = RegistryResult<T>>,
    ) -> RegistryResult<T> {
        match timeout(self.settings.registry_timeout, call).await {
            Ok(result) => result,
            Err(_) => {
                warn!(operation, "Registry call timed out");
                Err(RegistryError::Timeout(operation))
            }
        }
    }

    async fn with_cache_timeout<T>(
        &self,
        operation: &'static str,
        short_code: &str,
        call: impl Future<Output = CacheResult<T>>,
    ) -> Option<T> {
        match timeout(self.settings.cache_timeout, call).await {
            Ok(Ok(value)) => Some(value),
            Ok(Err(e)) => {
                warn!(operation, short_code, error = %e, "Cache call failed, continuing without cache");
                None
            }
            Err(_) => {
                warn!(operation, short_code, "Cache call timed out, continuing without cache");
                None
            }
        }
    }

    async fn cache_get(&self, short_code: &str) -> Option<UrlProjection> {
        self.with_cache_timeout("get", short_code, self.cache.get(short_code))
            .await
            .flatten()
    }

    async fn cache_put(&self, short_code: &str, projection: &UrlProjection) {
        self.with_cache_timeout("put", short_code, self.cache.put(short_code, projection))
            .await;
    }

    async fn cache_invalidate(&self, short_code: &str) {
        self.with_cache_timeout("invalidate", short_code, self.cache.invalidate(short_code))
            .await;
    }
}

/// Absolute UTC expiry `days` from now. Zero or negative days are already expired.
fn expiry_from_days(days: i64) -> Result<chrono::DateTime<Utc>, AppError> {
    let out_of_range = || {
        AppError::bad_request(
            "expires_in_days is out of range",
            json!({ "expires_in_days": days, "max": MAX_EXPIRES_IN_DAYS }),
        )
    };

    if days.abs() > MAX_EXPIRES_IN_DAYS {
        return Err(out_of_range());
    }

    TimeDelta::try_days(days)
        .and_then(|delta| Utc::now().checked_add_signed(delta))
        .ok_or_else(out_of_range)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::repositories::MockUrlRegistry;
    use crate::infrastructure::cache::{CacheError, MemoryCache, NullCache};
    use crate::infrastructure::persistence::MemoryUrlRegistry;
    use crate::utils::code_generator::EntropyCodeGenerator;
    use chrono::Duration as ChronoDuration;

    struct FixedGenerator(&'static str);

    struct FailingCache;

    #[async_trait::async_trait]
    impl CacheService for FailingCache {
        async fn get(&self, _short_code: &str) -> CacheResult<Option<UrlProjection>> {
            Err(CacheError::ConnectionError("refused".into()))
        }

        async fn put(&self, _short_code: &str, _projection: &UrlProjection) -> CacheResult<()> {
            Err(CacheError::ConnectionError("refused".into()))
        }

        async fn invalidate(&self, _short_code: &str) -> CacheResult<()> {
            Err(CacheError::ConnectionError("refused".into()))
        }

        async fn health_check(&self) -> bool {
            false
        }

        fn backend_name(&self) -> &'static str {
            "failing"
        }
    }

    struct SlowRegistry;

    #[async_trait::async_trait]
    impl UrlRegistry for SlowRegistry {
        async fn find_by_long_url(&self, _: &str) -> RegistryResult<Option<UrlRecord>> {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok(None)
        }

        async fn find_by_short_code(&self, _: &str) -> RegistryResult<Option<UrlRecord>> {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok(None)
        }

        async fn insert(&self, _: NewUrlRecord) -> RegistryResult<UrlRecord> {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Err(RegistryError::Backend("unreachable".into()))
        }

        async fn delete(&self, _: DeleteFilter) -> RegistryResult<Option<UrlRecord>> {
            Ok(None)
        }

        async fn count_all(&self) -> RegistryResult<i64> {
            Ok(0)
        }

        async fn list_page(&self, _: i64, _: i64) -> RegistryResult<Vec<UrlRecord>> {
            Ok(vec![])
        }

        async fn ping(&self) -> RegistryResult<()> {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok(())
        }
    }

    struct SlowCache;

    #[async_trait::async_trait]
    impl CacheService for SlowCache {
        async fn get(&self, _short_code: &str) -> CacheResult<Option<UrlProjection>> {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok(None)
        }

        async fn put(&self, _short_code: &str, _projection: &UrlProjection) -> CacheResult<()> {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok(())
        }

        async fn invalidate(&self, _short_code: &str) -> CacheResult<()> {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok(())
        }

        async fn health_check(&self) -> bool {
            tokio::time::sleep(Duration::from_secs(5)).await;
            true
        }

        fn backend_name(&self) -> &'static str {
            "slow"
        }
    }

    impl CodeGenerator for FixedGenerator {
        fn generate(&self, _seed: &str, length: usize) -> String {
            self.0.chars().cycle().take(length).collect()
        }
    }

    fn record(id: i64, url: &str, code: &str) -> UrlRecord {
        UrlRecord::new(
            id,
            url.to_string(),
            code.to_string(),
            Some(Utc::now() + ChronoDuration::days(30)),
            Utc::now(),
        )
    }

    fn service(registry: MockUrlRegistry) -> ShortenerService {
        ShortenerService::new(
            Arc::new(registry),
            Arc::new(NullCache::new()),
            Arc::new(EntropyCodeGenerator),
            ShortenerSettings::default(),
        )
    }

    #[tokio::test]
    async fn test_create_generates_six_char_code() {
        let mut registry = MockUrlRegistry::new();
        registry
            .expect_find_by_short_code()
            .times(1)
            .returning(|_| Ok(None));
        registry
            .expect_insert()
            .withf(|new| new.short_code.len() == 6 && is_base62(&new.short_code))
            .times(1)
            .returning(|new| Ok(record(1, &new.long_url, &new.short_code)));

        let outcome = service(registry)
            .create("https://example.com/a", None, DEFAULT_EXPIRES_IN_DAYS)
            .await
            .unwrap();

        assert!(matches!(outcome, CreateOutcome::Created(r) if r.short_code.len() == 6));
    }

    #[tokio::test]
    async fn test_create_sets_expiry_in_days() {
        let mut registry = MockUrlRegistry::new();
        registry.expect_find_by_short_code().returning(|_| Ok(None));
        registry
            .expect_insert()
            .withf(|new| {
                let expires = new.expires_at.unwrap();
                let expected = Utc::now() + ChronoDuration::days(7);
                (expected - expires).num_seconds().abs() < 5
            })
            .times(1)
            .returning(|new| Ok(record(1, &new.long_url, &new.short_code)));

        let outcome = service(registry)
            .create("https://example.com/a", None, 7)
            .await
            .unwrap();

        assert!(matches!(outcome, CreateOutcome::Created(_)));
    }

    #[tokio::test]
    async fn test_create_retries_colliding_codes() {
        let mut registry = MockUrlRegistry::new();
        let mut calls = 0;
        registry
            .expect_find_by_short_code()
            .times(3)
            .returning(move |code| {
                calls += 1;
                if calls < 3 {
                    Ok(Some(record(9, "https://taken.example", code)))
                } else {
                    Ok(None)
                }
            });
        registry
            .expect_insert()
            .withf(|new| new.short_code.len() == 6)
            .times(1)
            .returning(|new| Ok(record(1, &new.long_url, &new.short_code)));

        let outcome = service(registry)
            .create("https://example.com/a", None, DEFAULT_EXPIRES_IN_DAYS)
            .await
            .unwrap();

        assert!(matches!(outcome, CreateOutcome::Created(_)));
    }

    #[tokio::test]
    async fn test_create_falls_back_to_eight_chars() {
        let mut registry = MockUrlRegistry::new();
        registry
            .expect_find_by_short_code()
            .times(10)
            .returning(|code| Ok(Some(record(9, "https://taken.example", code))));
        registry
            .expect_insert()
            .withf(|new| new.short_code == "zzzzzzzz")
            .times(1)
            .returning(|new| Ok(record(1, &new.long_url, &new.short_code)));

        let svc = ShortenerService::new(
            Arc::new(registry),
            Arc::new(NullCache::new()),
            Arc::new(FixedGenerator("z")),
            ShortenerSettings::default(),
        );

        let outcome = svc
            .create("https://example.com/a", None, DEFAULT_EXPIRES_IN_DAYS)
            .await
            .unwrap();

        assert!(matches!(outcome, CreateOutcome::Created(r) if r.short_code == "zzzzzzzz"));
    }

    #[tokio::test]
    async fn test_create_long_url_conflict_returns_existing() {
        let mut registry = MockUrlRegistry::new();
        registry.expect_find_by_short_code().returning(|_| Ok(None));
        registry.expect_insert().times(1).returning(|_| {
            Err(RegistryError::Conflict {
                field: UniqueField::LongUrl,
            })
        });
        let existing = record(5, "https://example.com/a", "exist1");
        registry
            .expect_find_by_long_url()
            .withf(|url| url == "https://example.com/a")
            .times(1)
            .returning(move |_| Ok(Some(existing.clone())));

        let outcome = service(registry)
            .create("https://example.com/a", None, DEFAULT_EXPIRES_IN_DAYS)
            .await
            .unwrap();

        assert!(matches!(outcome, CreateOutcome::AlreadyExists(r) if r.id == 5 && r.short_code == "exist1"));
    }

    #[tokio::test]
    async fn test_create_custom_code_taken() {
        let mut registry = MockUrlRegistry::new();
        registry.expect_find_by_short_code().times(0);
        registry
            .expect_insert()
            .withf(|new| new.short_code == "promo25")
            .times(1)
            .returning(|_| {
                Err(RegistryError::Conflict {
                    field: UniqueField::ShortCode,
                })
            });

        let outcome = service(registry)
            .create("https://example.com/a", Some("promo25"), DEFAULT_EXPIRES_IN_DAYS)
            .await
            .unwrap();

        assert_eq!(outcome, CreateOutcome::CodeTaken);
    }

    #[tokio::test]
    async fn test_create_invalid_custom_code_never_touches_registry() {
        let mut registry = MockUrlRegistry::new();
        registry.expect_insert().times(0);
        registry.expect_find_by_short_code().times(0);

        let result = service(registry)
            .create("https://example.com/a", Some("no"), DEFAULT_EXPIRES_IN_DAYS)
            .await;

        assert!(matches!(result, Err(AppError::Validation { .. })));
    }

    #[tokio::test]
    async fn test_create_invalid_url() {
        let registry = MockUrlRegistry::new();

        let result = service(registry)
            .create("not-a-url", None, DEFAULT_EXPIRES_IN_DAYS)
            .await;

        assert!(matches!(result, Err(AppError::Validation { .. })));
    }

    #[tokio::test]
    async fn test_create_expiry_out_of_range() {
        let registry = MockUrlRegistry::new();

        let result = service(registry)
            .create("https://example.com/a", None, MAX_EXPIRES_IN_DAYS + 1)
            .await;

        assert!(matches!(result, Err(AppError::Validation { .. })));
    }

    #[tokio::test]
    async fn test_create_backend_failure_is_internal() {
        let mut registry = MockUrlRegistry::new();
        registry.expect_find_by_short_code().returning(|_| Ok(None));
        registry
            .expect_insert()
            .returning(|_| Err(RegistryError::Backend("connection refused".into())));

        let result = service(registry)
            .create("https://example.com/a", None, DEFAULT_EXPIRES_IN_DAYS)
            .await;

        assert!(matches!(result, Err(AppError::Internal { .. })));
    }

    #[tokio::test]
    async fn test_resolve_expired_record_is_absent() {
        let mut registry = MockUrlRegistry::new();
        registry.expect_find_by_short_code().times(1).returning(|code| {
            Ok(Some(UrlRecord::new(
                1,
                "https://example.com/a".into(),
                code.into(),
                Some(Utc::now() - ChronoDuration::seconds(1)),
                Utc::now() - ChronoDuration::days(1),
            )))
        });

        let cache = Arc::new(MemoryCache::new(Duration::from_secs(60)));
        let svc = ShortenerService::new(
            Arc::new(registry),
            cache.clone(),
            Arc::new(EntropyCodeGenerator),
            ShortenerSettings::default(),
        );

        assert!(svc.resolve("abc123").await.unwrap().is_none());
        assert!(!cache.contains("abc123").await);
    }

    #[tokio::test]
    async fn test_resolve_malformed_code_skips_registry() {
        let mut registry = MockUrlRegistry::new();
        registry.expect_find_by_short_code().times(0);

        let svc = service(registry);
        assert!(svc.resolve("favicon.ico").await.unwrap().is_none());
        assert!(svc.resolve("waytoolongcode").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_resolve_registry_failure_surfaces() {
        let mut registry = MockUrlRegistry::new();
        registry
            .expect_find_by_short_code()
            .returning(|_| Err(RegistryError::Backend("down".into())));

        let result = service(registry).resolve("abc123").await;
        assert!(matches!(result, Err(AppError::Internal { .. })));
    }

    #[tokio::test]
    async fn test_delete_by_long_url_invalidates_discovered_code() {
        let mut registry = MockUrlRegistry::new();
        registry
            .expect_delete()
            .withf(|f| *f == DeleteFilter::LongUrl("https://example.com/a".into()))
            .times(1)
            .returning(|_| Ok(Some(record(1, "https://example.com/a", "abc123"))));

        let cache = Arc::new(MemoryCache::new(Duration::from_secs(60)));
        cache
            .put(
                "abc123",
                &record(1, "https://example.com/a", "abc123").projection(),
            )
            .await
            .unwrap();

        let svc = ShortenerService::new(
            Arc::new(registry),
            cache.clone(),
            Arc::new(EntropyCodeGenerator),
            ShortenerSettings::default(),
        );

        let deleted = svc
            .delete(DeleteFilter::LongUrl("https://example.com/a".into()))
            .await
            .unwrap();

        assert!(deleted);
        assert!(!cache.contains("abc123").await);
    }

    #[tokio::test]
    async fn test_delete_nothing_is_not_an_error() {
        let mut registry = MockUrlRegistry::new();
        registry.expect_delete().times(1).returning(|_| Ok(None));

        let deleted = service(registry)
            .delete(DeleteFilter::ShortCode("nothere".into()))
            .await
            .unwrap();

        assert!(!deleted);
    }

    #[tokio::test]
    async fn test_list_computes_offset() {
        let mut registry = MockUrlRegistry::new();
        registry.expect_count_all().times(1).returning(|| Ok(42));
        registry
            .expect_list_page()
            .withf(|offset, limit| *offset == 20 && *limit == 10)
            .times(1)
            .returning(|_, _| Ok(vec![]));

        let page = service(registry).list(3, 10).await.unwrap();

        assert_eq!(page.total, 42);
        assert_eq!(page.page, 3);
        assert_eq!(page.limit, 10);
    }

    #[tokio::test]
    async fn test_list_rejects_zero_page() {
        let registry = MockUrlRegistry::new();
        assert!(matches!(
            service(registry).list(0, 10).await,
            Err(AppError::Validation { .. })
        ));
    }

    #[tokio::test]
    async fn test_cache_failures_are_swallowed() {
        let mut registry = MockUrlRegistry::new();
        registry
            .expect_find_by_short_code()
            .times(1)
            .returning(|code| Ok(Some(record(1, "https://example.com/a", code))));
        registry
            .expect_delete()
            .times(1)
            .returning(|_| Ok(Some(record(1, "https://example.com/a", "abc123"))));

        let svc = ShortenerService::new(
            Arc::new(registry),
            Arc::new(FailingCache),
            Arc::new(EntropyCodeGenerator),
            ShortenerSettings::default(),
        );

        let hit = svc.resolve("abc123").await.unwrap().unwrap();
        assert_eq!(hit.long_url, "https://example.com/a");

        assert!(
            svc.delete(DeleteFilter::ShortCode("abc123".into()))
                .await
                .unwrap()
        );
        assert!(!svc.cache_health().await);
    }

    #[tokio::test]
    async fn test_cache_hit_skips_registry() {
        let mut registry = MockUrlRegistry::new();
        registry.expect_find_by_short_code().times(0);

        let cache = Arc::new(MemoryCache::new(Duration::from_secs(60)));
        cache
            .put(
                "abc123",
                &record(1, "https://example.com/a", "abc123").projection(),
            )
            .await
            .unwrap();

        let svc = ShortenerService::new(
            Arc::new(registry),
            cache,
            Arc::new(EntropyCodeGenerator),
            ShortenerSettings::default(),
        );

        let hit = svc.resolve("abc123").await.unwrap().unwrap();
        assert_eq!(hit.short_code, "abc123");
    }

    #[tokio::test]
    async fn test_registry_timeout_names_operation() {
        let svc = ShortenerService::new(
            Arc::new(SlowRegistry),
            Arc::new(NullCache::new()),
            Arc::new(EntropyCodeGenerator),
            ShortenerSettings {
                registry_timeout: Duration::from_millis(20),
                ..ShortenerSettings::default()
            },
        );

        let err = svc.resolve("abc123").await.unwrap_err();
        assert!(
            matches!(err, AppError::Internal { ref details, .. } if details["operation"] == "find_by_short_code")
        );

        assert!(svc.registry_health().await.is_err());
    }

    #[tokio::test]
    async fn test_cache_timeout_reads_as_miss() {
        let mut registry = MockUrlRegistry::new();
        registry
            .expect_find_by_short_code()
            .times(1)
            .returning(|code| Ok(Some(record(1, "https://example.com/a", code))));

        let svc = ShortenerService::new(
            Arc::new(registry),
            Arc::new(SlowCache),
            Arc::new(EntropyCodeGenerator),
            ShortenerSettings {
                cache_timeout: Duration::from_millis(20),
                ..ShortenerSettings::default()
            },
        );

        let started = std::time::Instant::now();
        let hit = svc.resolve("abc123").await.unwrap().unwrap();

        assert_eq!(hit.long_url, "https://example.com/a");
        assert!(started.elapsed() < Duration::from_secs(1));
        assert!(!svc.cache_health().await);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_creates_store_one_record() {
        let registry = Arc::new(MemoryUrlRegistry::new());
        let svc = Arc::new(ShortenerService::new(
            registry.clone(),
            Arc::new(NullCache::new()),
            Arc::new(EntropyCodeGenerator),
            ShortenerSettings::default(),
        ));

        let handles: Vec<_> = (0..16)
            .map(|_| {
                let svc = svc.clone();
                tokio::spawn(async move {
                    svc.create("https://example.com/race", None, DEFAULT_EXPIRES_IN_DAYS)
                        .await
                        .unwrap()
                })
            })
            .collect();

        let mut created = Vec::new();
        let mut existing = Vec::new();
        for handle in handles {
            match handle.await.unwrap() {
                CreateOutcome::Created(r) => created.push(r),
                CreateOutcome::AlreadyExists(r) => existing.push(r),
                CreateOutcome::CodeTaken => panic!("generated code reported as taken"),
            }
        }

        assert_eq!(created.len(), 1);
        assert_eq!(existing.len(), 15);
        assert!(existing.iter().all(|r| r.short_code == created[0].short_code));
        assert_eq!(registry.count_all().await.unwrap(), 1);
    }

    #[test]
    fn test_zero_day_expiry_is_now() {
        let expires = expiry_from_days(0).unwrap();
        assert!(expires <= Utc::now());
    }
}
