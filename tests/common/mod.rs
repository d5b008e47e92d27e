#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use insight_cache::domain::traits::{CacheStore, Clock};
use insight_cache::{CacheEntry, CacheError};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// Clock pinned to a settable instant
pub struct TestClock {
    now: Mutex<DateTime<Utc>>,
}

impl TestClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(now),
        }
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock().unwrap();
        *now += by;
    }
}

impl Clock for TestClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap()
    }
}

pub fn start_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap()
}

/// Store whose every call fails, counting how often it was reached
#[derive(Default)]
pub struct FailingStore {
    pub calls: AtomicUsize,
}

impl FailingStore {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn fail<T>(&self) -> Result<T, CacheError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(CacheError::StoreUnavailable("connection refused".into()))
    }
}

#[async_trait]
impl CacheStore for FailingStore {
    async fn get_by_key(&self, _key: &str) -> Result<Option<CacheEntry>, CacheError> {
        self.fail()
    }

    async fn upsert(&self, _entry: &CacheEntry) -> Result<CacheEntry, CacheError> {
        self.fail()
    }

    async fn update_usage(
        &self,
        _key: &str,
        _usage_count: u64,
        _last_used_at: DateTime<Utc>,
    ) -> Result<(), CacheError> {
        self.fail()
    }

    async fn query_by_brand_model(
        &self,
        _brand: &str,
        _model: &str,
        _fresh_at: DateTime<Utc>,
        _limit: usize,
    ) -> Result<Vec<CacheEntry>, CacheError> {
        self.fail()
    }
}

/// Build an entry directly, bypassing the resolver
pub fn raw_entry(
    key: &str,
    brand: &str,
    model: &str,
    usage_count: u64,
    last_used_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
) -> CacheEntry {
    CacheEntry {
        key: key.to_string(),
        brand: brand.to_string(),
        model: model.to_string(),
        question: format!("question for {}", key),
        question_hash: "0".to_string(),
        prompt: String::new(),
        payload: serde_json::json!({ "key": key }),
        usage_count,
        last_used_at,
        created_at: last_used_at,
        expires_at,
    }
}
