//! 边界层测试：错误降级与回源计算

mod common;

use common::{start_time, FailingStore, TestClock};
use insight_cache::application::query::{
    cached_insight, resolve_or_compute, similar_insights, ResolvedFrom,
};
use insight_cache::infrastructure::storage::cache::MemoryStore;
use insight_cache::{CacheError, CacheKind, CacheResolver};
use serde_json::json;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

fn memory_resolver() -> (Arc<MemoryStore>, CacheResolver) {
    let store = Arc::new(MemoryStore::new());
    let clock = Arc::new(TestClock::new(start_time()));
    let resolver = CacheResolver::for_kind(store.clone(), CacheKind::Question).with_clock(clock);
    (store, resolver)
}

#[tokio::test]
async fn test_store_failure_downgraded_to_miss() {
    let resolver = CacheResolver::for_kind(Arc::new(FailingStore::default()), CacheKind::Question);

    let found = cached_insight(&resolver, "Acme", "X1", "q").await.unwrap();
    assert!(found.is_none());

    let similar = similar_insights(&resolver, "Acme", "X1", "q", 3).await.unwrap();
    assert!(similar.is_empty());
}

#[tokio::test]
async fn test_validation_not_downgraded() {
    let (_store, resolver) = memory_resolver();
    let err = cached_insight(&resolver, "Acme", "", "q").await.unwrap_err();
    assert!(matches!(err, CacheError::Validation(_)));
}

#[tokio::test]
async fn test_compute_on_miss_then_serve_from_cache() {
    let (store, resolver) = memory_resolver();
    let computed = AtomicUsize::new(0);

    for _ in 0..2 {
        let resolved = resolve_or_compute(&resolver, "Acme", "X1", "Is it good?", || async {
            computed.fetch_add(1, Ordering::SeqCst);
            Ok::<_, CacheError>(("prompt".to_string(), json!({ "rating": 4 })))
        })
        .await
        .unwrap();
        assert_eq!(resolved.payload, json!({ "rating": 4 }));
    }

    assert_eq!(computed.load(Ordering::SeqCst), 1);
    assert_eq!(store.len(), 1);

    let third = resolve_or_compute(&resolver, "acme", "x1", "is it good", || async {
        Ok::<_, CacheError>((String::new(), json!(null)))
    })
    .await
    .unwrap();
    assert_eq!(third.source, ResolvedFrom::Cache);
    assert_eq!(third.entry.unwrap().usage_count, 3);
}

#[tokio::test]
async fn test_fresh_result_survives_store_outage() {
    let resolver = CacheResolver::for_kind(Arc::new(FailingStore::default()), CacheKind::Question);

    let resolved = resolve_or_compute(&resolver, "Acme", "X1", "q", || async {
        Ok::<_, CacheError>(("p".to_string(), json!({ "fresh": true })))
    })
    .await
    .unwrap();

    assert_eq!(resolved.source, ResolvedFrom::Fresh);
    assert_eq!(resolved.payload, json!({ "fresh": true }));
    assert!(resolved.entry.is_none());
}

#[tokio::test]
async fn test_compute_error_propagates() {
    let (store, resolver) = memory_resolver();

    let err = resolve_or_compute(&resolver, "Acme", "X1", "q", || async {
        Err::<(String, serde_json::Value), _>(CacheError::StoreUnavailable(
            "llm gateway down".into(),
        ))
    })
    .await
    .unwrap_err();

    assert!(matches!(err, CacheError::StoreUnavailable(_)));
    assert!(store.is_empty());
}
