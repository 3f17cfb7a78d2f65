//! In-process implementation of the URL registry.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::{BTreeMap, HashMap};
use tokio::sync::RwLock;

use crate::domain::entities::{DeleteFilter, NewUrlRecord, UniqueField, UrlRecord};
use crate::domain::repositories::{RegistryError, RegistryResult, UrlRegistry};

#[derive(Default)]
struct State {
    next_id: i64,
    records: BTreeMap<i64, UrlRecord>,
    by_long_url: HashMap<String, i64>,
    by_short_code: HashMap<String, i64>,
}

impl State {
    fn remove(&mut self, id: i64) -> Option<UrlRecord> {
        let record = self.records.remove(&id)?;
        self.by_long_url.remove(&record.long_url);
        self.by_short_code.remove(&record.short_code);
        Some(record)
    }
}

/// Registry kept in process memory.
///
/// Both uniqueness checks and the insert happen under one write lock, which
/// gives the same all-or-nothing behaviour as the database constraints.
/// Used by tests and by deployments running without PostgreSQL.
#[derive(Default)]
pub struct MemoryUrlRegistry {
    state: RwLock<State>,
}

impl MemoryUrlRegistry {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UrlRegistry for MemoryUrlRegistry {
    async fn find_by_long_url(&self, long_url: &str) -> RegistryResult<Option<UrlRecord>> {
        let state = self.state.read().await;
        Ok(state
            .by_long_url
            .get(long_url)
            .and_then(|id| state.records.get(id))
            .cloned())
    }

    async fn find_by_short_code(&self, short_code: &str) -> RegistryResult<Option<UrlRecord>> {
        let state = self.state.read().await;
        Ok(state
            .by_short_code
            .get(short_code)
            .and_then(|id| state.records.get(id))
            .cloned())
    }

    async fn insert(&self, new_record: NewUrlRecord) -> RegistryResult<UrlRecord> {
        let mut state = self.state.write().await;

        if state.by_long_url.contains_key(&new_record.long_url) {
            return Err(RegistryError::Conflict {
                field: UniqueField::LongUrl,
            });
        }
        if state.by_short_code.contains_key(&new_record.short_code) {
            return Err(RegistryError::Conflict {
                field: UniqueField::ShortCode,
            });
        }

        state.next_id += 1;
        let record = UrlRecord::new(
            state.next_id,
            new_record.long_url,
            new_record.short_code,
            new_record.expires_at,
            Utc::now(),
        );

        state
            .by_long_url
            .insert(record.long_url.clone(), record.id);
        state
            .by_short_code
            .insert(record.short_code.clone(), record.id);
        state.records.insert(record.id, record.clone());

        Ok(record)
    }

    async fn delete(&self, filter: DeleteFilter) -> RegistryResult<Option<UrlRecord>> {
        let mut state = self.state.write().await;

        let id = match &filter {
            DeleteFilter::ShortCode(code) => state.by_short_code.get(code).copied(),
            DeleteFilter::LongUrl(url) => state.by_long_url.get(url).copied(),
        };

        Ok(id.and_then(|id| state.remove(id)))
    }

    async fn count_all(&self) -> RegistryResult<i64> {
        Ok(self.state.read().await.records.len() as i64)
    }

    async fn list_page(&self, offset: i64, limit: i64) -> RegistryResult<Vec<UrlRecord>> {
        let state = self.state.read().await;

        let mut records: Vec<&UrlRecord> = state.records.values().collect();
        records.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));

        Ok(records
            .into_iter()
            .skip(offset.max(0) as usize)
            .take(limit.max(0) as usize)
            .cloned()
            .collect())
    }

    async fn ping(&self) -> RegistryResult<()> {
        Ok(())
    }
}
