use crate::application::resolver::CacheResolver;
use crate::domain::error::CacheError;
use crate::domain::model::CacheEntry;
use serde::{Deserialize, Serialize};
use std::future::Future;
use tracing::warn;

// 结果来源
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum ResolvedFrom {
    Cache,
    Fresh,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Resolved {
    pub payload: serde_json::Value,
    pub source: ResolvedFrom,
    /// Stored entry; `None` when a fresh result could not be written back
    pub entry: Option<CacheEntry>,
}

/// Lookup that treats store failures as a miss.
///
/// Validation errors still surface: retrying with the same input cannot help.
pub async fn cached_insight(
    resolver: &CacheResolver,
    brand: &str,
    model: &str,
    question: &str,
) -> Result<Option<CacheEntry>, CacheError> {
    match resolver.lookup(brand, model, question).await {
        Ok(found) => Ok(found),
        Err(e) if e.is_store_failure() => {
            warn!("Error checking cache: {}", e);
            Ok(None)
        }
        Err(e) => Err(e),
    }
}

/// Similar-entry search that treats store failures as "nothing similar".
pub async fn similar_insights(
    resolver: &CacheResolver,
    brand: &str,
    model: &str,
    question: &str,
    limit: usize,
) -> Result<Vec<CacheEntry>, CacheError> {
    match resolver.find_similar(brand, model, question, limit).await {
        Ok(found) => Ok(found),
        Err(e) if e.is_store_failure() => {
            warn!("Error finding similar results: {}", e);
            Ok(Vec::new())
        }
        Err(e) => Err(e),
    }
}

/// Serve from cache, or run `compute` and write its result back.
///
/// `compute` yields the prompt it used together with the payload. Failing to
/// save a fresh payload is logged; the payload is still returned.
pub async fn resolve_or_compute<F, Fut, E>(
    resolver: &CacheResolver,
    brand: &str,
    model: &str,
    question: &str,
    compute: F,
) -> Result<Resolved, E>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<(String, serde_json::Value), E>>,
    E: From<CacheError>,
{
    // 1. Cache
    if let Some(entry) = cached_insight(resolver, brand, model, question).await? {
        return Ok(Resolved {
            payload: entry.payload.clone(),
            source: ResolvedFrom::Cache,
            entry: Some(entry),
        });
    }

    // 2. Fresh result
    let (prompt, payload) = compute().await?;

    // 3. Write back
    let entry = match resolver
        .store(brand, model, question, &prompt, payload.clone())
        .await
    {
        Ok(saved) => Some(saved),
        Err(e) if e.is_store_failure() => {
            warn!("Error saving to cache: {}", e);
            None
        }
        Err(e) => return Err(e.into()),
    };

    Ok(Resolved {
        payload,
        source: ResolvedFrom::Fresh,
        entry,
    })
}
