// In-memory store implementation using DashMap
use crate::domain::error::CacheError;
use crate::domain::model::{by_popularity, CacheEntry};
use crate::domain::traits::CacheStore;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;

/// Thread-safe in-process store collaborator
///
/// Used for `--memory` runs and tests. Nothing survives the process.
pub struct MemoryStore {
    map: DashMap<String, CacheEntry>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            map: DashMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CacheStore for MemoryStore {
    async fn get_by_key(&self, key: &str) -> Result<Option<CacheEntry>, CacheError> {
        Ok(self.map.get(key).map(|entry| entry.value().clone()))
    }

    async fn upsert(&self, entry: &CacheEntry) -> Result<CacheEntry, CacheError> {
        self.map.insert(entry.key.clone(), entry.clone());
        Ok(entry.clone())
    }

    async fn update_usage(
        &self,
        key: &str,
        usage_count: u64,
        last_used_at: DateTime<Utc>,
    ) -> Result<(), CacheError> {
        if let Some(mut entry) = self.map.get_mut(key) {
            entry.usage_count = usage_count;
            entry.last_used_at = last_used_at;
        }
        Ok(())
    }

    async fn query_by_brand_model(
        &self,
        brand: &str,
        model: &str,
        fresh_at: DateTime<Utc>,
        limit: usize,
    ) -> Result<Vec<CacheEntry>, CacheError> {
        let mut found: Vec<CacheEntry> = self
            .map
            .iter()
            .filter(|entry| {
                entry.brand.eq_ignore_ascii_case(brand)
                    && entry.model.eq_ignore_ascii_case(model)
                    && !entry.is_expired(fresh_at)
            })
            .map(|entry| entry.value().clone())
            .collect();

        found.sort_by(by_popularity);
        found.truncate(limit);
        Ok(found)
    }
}
