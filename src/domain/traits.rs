use crate::domain::error::CacheError;
use crate::domain::model::CacheEntry;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Trait for the persistence collaborator behind the resolver
///
/// All durable cache state lives behind this trait. Implementations must not
/// retry on their own behalf; a failed call is reported as one error.
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Fetch an entry by its exact key, expired or not
    async fn get_by_key(&self, key: &str) -> Result<Option<CacheEntry>, CacheError>;

    /// Insert or replace the entry stored under `entry.key`
    async fn upsert(&self, entry: &CacheEntry) -> Result<CacheEntry, CacheError>;

    /// Overwrite the usage counters of an existing entry
    async fn update_usage(
        &self,
        key: &str,
        usage_count: u64,
        last_used_at: DateTime<Utc>,
    ) -> Result<(), CacheError>;

    /// Entries for one product that are still fresh at `fresh_at`.
    ///
    /// Brand and model match case-insensitively. Results are ordered by usage
    /// count descending, then by most recent use, and capped at `limit`.
    async fn query_by_brand_model(
        &self,
        brand: &str,
        model: &str,
        fresh_at: DateTime<Utc>,
        limit: usize,
    ) -> Result<Vec<CacheEntry>, CacheError>;
}

/// Source of the current time
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
