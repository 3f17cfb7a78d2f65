//! Process-local TTL cache.

use super::service::{CacheResult, CacheService};
use crate::domain::entities::UrlProjection;
use async_trait::async_trait;
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

struct Entry {
    projection: UrlProjection,
    expires_at: Instant,
}

/// In-memory cache with per-entry TTL.
///
/// Expired entries are dropped on read and by [`MemoryCache::purge_expired`],
/// which the server calls periodically. Created at process start and injected
/// like any other backend, so tests get an isolated instance.
pub struct MemoryCache {
    entries: RwLock<HashMap<String, Entry>>,
    ttl: Duration,
}

impl MemoryCache {
    /// Creates an empty cache whose entries live for `ttl`.
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            ttl,
        }
    }

    /// Returns whether a live entry exists, without touching it.
    pub async fn contains(&self, short_code: &str) -> bool {
        self.entries
            .read()
            .await
            .get(short_code)
            .is_some_and(|e| e.expires_at > Instant::now())
    }

    /// Number of stored entries, expired ones included.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Drops every expired entry. Returns how many were removed.
    pub async fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|_, e| e.expires_at > now);
        before - entries.len()
    }
}

#[async_trait]
impl CacheService for MemoryCache {
    async fn get(&self, short_code: &str) -> CacheResult<Option<UrlProjection>> {
        let now = Instant::now();

        {
            let entries = self.entries.read().await;
            match entries.get(short_code) {
                Some(entry) if entry.expires_at > now => {
                    return Ok(Some(entry.projection.clone()));
                }
                Some(_) => {}
                None => return Ok(None),
            }
        }

        let mut entries = self.entries.write().await;
        if entries
            .get(short_code)
            .is_some_and(|e| e.expires_at <= now)
        {
            entries.remove(short_code);
        }
        Ok(None)
    }

    async fn put(&self, short_code: &str, projection: &UrlProjection) -> CacheResult<()> {
        let entry = Entry {
            projection: projection.clone(),
            expires_at: Instant::now() + self.ttl,
        };
        self.entries
            .write()
            .await
            .insert(short_code.to_string(), entry);
        Ok(())
    }

    async fn invalidate(&self, short_code: &str) -> CacheResult<()> {
        self.entries.write().await.remove(short_code);
        Ok(())
    }

    async fn health_check(&self) -> bool {
        true
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}
