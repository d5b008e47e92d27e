use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

// 缓存条目
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CacheEntry {
    pub key: String,
    pub brand: String, // 保留调用方大小写
    pub model: String,
    pub question: String, // 原始问题
    pub question_hash: String,
    pub prompt: String, // 仅用于审计
    pub payload: serde_json::Value,
    pub usage_count: u64,
    pub last_used_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl CacheEntry {
    /// An entry stays fresh up to and including its expiry instant.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }

    /// Record one more hit.
    pub fn touch(&mut self, now: DateTime<Utc>) {
        self.usage_count = self.usage_count.saturating_add(1);
        self.last_used_at = now;
    }
}

/// Popularity order: usage count descending, then most recently used, then key.
pub fn by_popularity(a: &CacheEntry, b: &CacheEntry) -> Ordering {
    b.usage_count
        .cmp(&a.usage_count)
        .then_with(|| b.last_used_at.cmp(&a.last_used_at))
        .then_with(|| a.key.cmp(&b.key))
}

// 缓存类型，仅决定 TTL
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum CacheKind {
    #[default]
    Question,
    Search,
}

impl CacheKind {
    pub fn default_ttl(self) -> Duration {
        match self {
            CacheKind::Question => Duration::days(30),
            CacheKind::Search => Duration::days(7),
        }
    }
}

// 存储统计
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct CacheStats {
    pub total_entries: u64,
    pub fresh_entries: u64,
    pub expired_entries: u64,
    pub total_usage: u64,
}
