//! PostgreSQL implementation of the URL registry.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use std::sync::Arc;

use crate::domain::entities::{DeleteFilter, NewUrlRecord, UniqueField, UrlRecord};
use crate::domain::repositories::{RegistryError, RegistryResult, UrlRegistry};

const LONG_URL_CONSTRAINT: &str = "urls_long_url_key";
const SHORT_CODE_CONSTRAINT: &str = "urls_short_code_key";

#[derive(FromRow)]
struct UrlRow {
    id: i64,
    long_url: String,
    short_code: String,
    expires_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
}

impl From<UrlRow> for UrlRecord {
    fn from(r: UrlRow) -> Self {
        UrlRecord::new(r.id, r.long_url, r.short_code, r.expires_at, r.created_at)
    }
}

/// Maps a driver error to a registry error.
///
/// Unique violations are identified by constraint name so the caller can tell
/// a taken long URL from a taken short code.
fn map_sqlx_error(e: sqlx::Error) -> RegistryError {
    if let Some(db) = e.as_database_error()
        && db.is_unique_violation()
    {
        match db.constraint() {
            Some(LONG_URL_CONSTRAINT) => {
                return RegistryError::Conflict {
                    field: UniqueField::LongUrl,
                };
            }
            Some(SHORT_CODE_CONSTRAINT) => {
                return RegistryError::Conflict {
                    field: UniqueField::ShortCode,
                };
            }
            _ => {}
        }
    }

    RegistryError::Backend(e.to_string())
}

/// PostgreSQL registry for URL records.
///
/// Every mutation is a single statement, so uniqueness is decided by the
/// database under concurrent creates.
pub struct PgUrlRegistry {
    pool: Arc<PgPool>,
}

impl PgUrlRegistry {
    /// Creates a new registry with a database connection pool.
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UrlRegistry for PgUrlRegistry {
    async fn find_by_long_url(&self, long_url: &str) -> RegistryResult<Option<UrlRecord>> {
        let row = sqlx::query_as::<_, UrlRow>(
            r#"
            SELECT id, long_url, short_code, expires_at, created_at
            FROM urls
            WHERE long_url = $1
            "#,
        )
        .bind(long_url)
        .fetch_optional(self.pool.as_ref())
        .await
        .map_err(map_sqlx_error)?;

        Ok(row.map(UrlRecord::from))
    }

    async fn find_by_short_code(&self, short_code: &str) -> RegistryResult<Option<UrlRecord>> {
        let row = sqlx::query_as::<_, UrlRow>(
            r#"
            SELECT id, long_url, short_code, expires_at, created_at
            FROM urls
            WHERE short_code = $1
            "#,
        )
        .bind(short_code)
        .fetch_optional(self.pool.as_ref())
        .await
        .map_err(map_sqlx_error)?;

        Ok(row.map(UrlRecord::from))
    }

    async fn insert(&self, new_record: NewUrlRecord) -> RegistryResult<UrlRecord> {
        let row = sqlx::query_as::<_, UrlRow>(
            r#"
            INSERT INTO urls (long_url, short_code, expires_at)
            VALUES ($1, $2, $3)
            RETURNING id, long_url, short_code, expires_at, created_at
            "#,
        )
        .bind(&new_record.long_url)
        .bind(&new_record.short_code)
        .bind(new_record.expires_at)
        .fetch_one(self.pool.as_ref())
        .await
        .map_err(map_sqlx_error)?;

        Ok(row.into())
    }

    async fn delete(&self, filter: DeleteFilter) -> RegistryResult<Option<UrlRecord>> {
        let query = match &filter {
            DeleteFilter::ShortCode(code) => sqlx::query_as::<_, UrlRow>(
                r#"
                DELETE FROM urls
                WHERE short_code = $1
                RETURNING id, long_url, short_code, expires_at, created_at
                "#,
            )
            .bind(code),
            DeleteFilter::LongUrl(url) => sqlx::query_as::<_, UrlRow>(
                r#"
                DELETE FROM urls
                WHERE long_url = $1
                RETURNING id, long_url, short_code, expires_at, created_at
                "#,
            )
            .bind(url),
        };

        let row = query
            .fetch_optional(self.pool.as_ref())
            .await
            .map_err(map_sqlx_error)?;

        Ok(row.map(UrlRecord::from))
    }

    async fn count_all(&self) -> RegistryResult<i64> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM urls")
            .fetch_one(self.pool.as_ref())
            .await
            .map_err(map_sqlx_error)
    }

    async fn list_page(&self, offset: i64, limit: i64) -> RegistryResult<Vec<UrlRecord>> {
        let rows = sqlx::query_as::<_, UrlRow>(
            r#"
            SELECT id, long_url, short_code, expires_at, created_at
            FROM urls
            ORDER BY created_at DESC, id DESC
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(self.pool.as_ref())
        .await
        .map_err(map_sqlx_error)?;

        Ok(rows.into_iter().map(UrlRecord::from).collect())
    }

    async fn ping(&self) -> RegistryResult<()> {
        sqlx::query("SELECT 1")
            .execute(self.pool.as_ref())
            .await
            .map_err(map_sqlx_error)?;
        Ok(())
    }
}
