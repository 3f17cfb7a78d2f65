//! Repository trait for URL record persistence.

use crate::domain::entities::{DeleteFilter, NewUrlRecord, UniqueField, UrlRecord};
use async_trait::async_trait;

/// Errors surfaced by a [`UrlRegistry`].
///
/// `Conflict` is an expected outcome of concurrent or duplicate creates and is
/// branched on by the caller. The other variants are hard failures.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("unique constraint violated on {field}")]
    Conflict { field: UniqueField },

    #[error("registry operation timed out: {0}")]
    Timeout(&'static str),

    #[error("registry backend error: {0}")]
    Backend(String),
}

pub type RegistryResult<T> = Result<T, RegistryError>;

/// Source of truth for URL records.
///
/// Implementations enforce, atomically and in storage, that no two records share
/// a long URL and no two records share a short code. Callers never rely on a
/// check-then-act sequence for uniqueness.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgUrlRegistry`] - PostgreSQL implementation
/// - [`crate::infrastructure::persistence::MemoryUrlRegistry`] - In-process store
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UrlRegistry: Send + Sync {
    /// Finds a record by its long URL, regardless of expiration.
    async fn find_by_long_url(&self, long_url: &str) -> RegistryResult<Option<UrlRecord>>;

    /// Finds a record by its short code, regardless of expiration.
    async fn find_by_short_code(&self, short_code: &str) -> RegistryResult<Option<UrlRecord>>;

    /// Inserts a record.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::Conflict`] naming the violated constraint if the
    /// long URL or the short code is already stored.
    async fn insert(&self, new_record: NewUrlRecord) -> RegistryResult<UrlRecord>;

    /// Physically deletes the record matching `filter`.
    ///
    /// Returns the removed record, or `None` if nothing matched.
    async fn delete(&self, filter: DeleteFilter) -> RegistryResult<Option<UrlRecord>>;

    /// Counts all stored records, expired ones included.
    async fn count_all(&self) -> RegistryResult<i64>;

    /// Lists records newest first.
    async fn list_page(&self, offset: i64, limit: i64) -> RegistryResult<Vec<UrlRecord>>;

    /// Checks that the backend answers queries.
    async fn ping(&self) -> RegistryResult<()>;
}
