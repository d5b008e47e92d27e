//! Cache resolver: decides whether an earlier AI answer can be reused.
//!
//! The resolver keeps no state between calls. Every read and write goes
//! through the [`CacheStore`] collaborator and every timestamp comes from the
//! injected [`Clock`]. Store failures are returned as errors; turning them
//! into a miss is left to the boundary layer in `application::query`.

use crate::domain::error::CacheError;
use crate::domain::key::{build_key, hash_question, normalize_question};
use crate::domain::model::{by_popularity, CacheEntry, CacheKind};
use crate::domain::traits::{CacheStore, Clock, SystemClock};
use chrono::{DateTime, Duration, SubsecRound, Utc};
use std::sync::Arc;
use tracing::debug;

#[derive(Clone)]
pub struct CacheResolver {
    store: Arc<dyn CacheStore>,
    clock: Arc<dyn Clock>,
    ttl: Duration,
}

impl CacheResolver {
    pub fn new(store: Arc<dyn CacheStore>, ttl: Duration) -> Self {
        Self {
            store,
            clock: Arc::new(SystemClock),
            ttl,
        }
    }

    /// Resolver using the built-in TTL for `kind`
    pub fn for_kind(store: Arc<dyn CacheStore>, kind: CacheKind) -> Self {
        Self::new(store, kind.default_ttl())
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn build_key(&self, brand: &str, model: &str, question: &str) -> String {
        build_key(brand, model, question)
    }

    /// Exact lookup. `Ok(None)` means absent or expired.
    ///
    /// A fresh hit has its usage count bumped and `last_used_at` moved to now;
    /// the returned entry reflects that update.
    pub async fn lookup(
        &self,
        brand: &str,
        model: &str,
        question: &str,
    ) -> Result<Option<CacheEntry>, CacheError> {
        validate(brand, model, question)?;
        let key = build_key(brand, model, question);

        let Some(mut entry) = self.store.get_by_key(&key).await? else {
            debug!(%key, "cache miss");
            return Ok(None);
        };

        let now = self.now();
        if entry.is_expired(now) {
            debug!(%key, expires_at = %entry.expires_at, "cache entry expired");
            return Ok(None);
        }

        entry.touch(now);
        self.store
            .update_usage(&key, entry.usage_count, entry.last_used_at)
            .await?;
        debug!(%key, usage_count = entry.usage_count, "cache hit");

        Ok(Some(entry))
    }

    /// Persist a freshly computed payload, replacing any entry under the same key.
    pub async fn store(
        &self,
        brand: &str,
        model: &str,
        question: &str,
        prompt: &str,
        payload: serde_json::Value,
    ) -> Result<CacheEntry, CacheError> {
        validate(brand, model, question)?;
        if payload.is_null() {
            return Err(CacheError::Validation("payload must not be null".into()));
        }

        let now = self.now();
        let entry = CacheEntry {
            key: build_key(brand, model, question),
            brand: brand.to_string(),
            model: model.to_string(),
            question: question.to_string(),
            question_hash: hash_question(&normalize_question(question)),
            prompt: prompt.to_string(),
            payload,
            usage_count: 1,
            last_used_at: now,
            created_at: now,
            expires_at: now + self.ttl,
        };

        let saved = self.store.upsert(&entry).await?;
        debug!(key = %saved.key, expires_at = %saved.expires_at, "cache entry stored");
        Ok(saved)
    }

    /// Exact match if there is one, otherwise the most used fresh entries for the product.
    ///
    /// Only the exact path counts as a use; entries returned from the product
    /// scan keep their usage counters untouched.
    pub async fn find_similar(
        &self,
        brand: &str,
        model: &str,
        question: &str,
        limit: usize,
    ) -> Result<Vec<CacheEntry>, CacheError> {
        if limit == 0 {
            return Err(CacheError::Validation("limit must be at least 1".into()));
        }

        if let Some(exact) = self.lookup(brand, model, question).await? {
            return Ok(vec![exact]);
        }

        let now = self.now();
        let mut candidates = self
            .store
            .query_by_brand_model(brand, model, now, limit)
            .await?;

        candidates.retain(|entry| !entry.is_expired(now));
        candidates.sort_by(by_popularity);
        candidates.truncate(limit);

        debug!(brand, model, found = candidates.len(), "similar cache entries");
        Ok(candidates)
    }

    // stores keep millisecond timestamps
    fn now(&self) -> DateTime<Utc> {
        self.clock.now().trunc_subsecs(3)
    }
}

fn validate(brand: &str, model: &str, question: &str) -> Result<(), CacheError> {
    for (name, value) in [("brand", brand), ("model", model), ("question", question)] {
        if value.trim().is_empty() {
            return Err(CacheError::Validation(format!("{} must not be empty", name)));
        }
    }
    Ok(())
}
