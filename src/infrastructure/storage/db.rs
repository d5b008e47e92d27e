use crate::domain::error::CacheError;
use crate::domain::model::{CacheEntry, CacheStats};
use crate::domain::traits::CacheStore;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::OptionalExtension;
use std::io::Cursor;
use std::path::Path;
use tokio_rusqlite::{params, Connection};
use tracing::debug;
use zstd::stream::{decode_all, encode_all};

const ENTRY_COLUMNS: &str = "search_key, brand, model, user_question, question_hash, ai_prompt, \
     ai_response, usage_count, last_used_at, created_at, expires_at";

pub async fn init_database(db_path: &Path) -> Result<Connection, CacheError> {
    let db = Connection::open(db_path.to_path_buf()).await?;
    create_schema(&db).await?;
    Ok(db)
}

pub async fn init_memory_database() -> Result<Connection, CacheError> {
    let db = Connection::open_in_memory().await?;
    create_schema(&db).await?;
    Ok(db)
}

async fn create_schema(db: &Connection) -> Result<(), CacheError> {
    db.call(|conn| {
        conn.execute(
            "CREATE TABLE IF NOT EXISTS search_cache (
                search_key TEXT PRIMARY KEY,
                brand TEXT NOT NULL,
                model TEXT NOT NULL,
                user_question TEXT NOT NULL,
                question_hash TEXT NOT NULL,
                ai_prompt TEXT NOT NULL,
                ai_response BLOB NOT NULL,
                usage_count INTEGER NOT NULL,
                last_used_at INTEGER NOT NULL,
                created_at INTEGER NOT NULL,
                expires_at INTEGER NOT NULL
            )",
            [],
        )?;

        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_search_cache_product
             ON search_cache(brand COLLATE NOCASE, model COLLATE NOCASE)",
            [],
        )?;

        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_search_cache_expires ON search_cache(expires_at)",
            [],
        )?;

        Ok::<_, rusqlite::Error>(())
    })
    .await?;

    Ok(())
}

/// SQLite-backed store collaborator
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    pub fn new(conn: Connection) -> Self {
        Self { conn }
    }

    /// Entry counts as of `now`
    pub async fn stats(&self, now: DateTime<Utc>) -> Result<CacheStats, CacheError> {
        let now_ms = now.timestamp_millis();
        let (total, fresh, usage): (i64, i64, i64) = self
            .conn
            .call(move |conn| {
                conn.query_row(
                    "SELECT COUNT(*),
                            COALESCE(SUM(CASE WHEN expires_at >= ?1 THEN 1 ELSE 0 END), 0),
                            COALESCE(SUM(usage_count), 0)
                     FROM search_cache",
                    params![now_ms],
                    |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
                )
            })
            .await?;

        let total = total.max(0) as u64;
        let fresh = fresh.max(0) as u64;
        Ok(CacheStats {
            total_entries: total,
            fresh_entries: fresh,
            expired_entries: total.saturating_sub(fresh),
            total_usage: usage.max(0) as u64,
        })
    }
}

#[async_trait]
impl CacheStore for SqliteStore {
    async fn get_by_key(&self, key: &str) -> Result<Option<CacheEntry>, CacheError> {
        let key = key.to_string();
        let entry = self
            .conn
            .call(move |conn| {
                conn.query_row(
                    &format!("SELECT {} FROM search_cache WHERE search_key = ?", ENTRY_COLUMNS),
                    params![key],
                    row_to_entry,
                )
                .optional()
            })
            .await?;

        Ok(entry)
    }

    async fn upsert(&self, entry: &CacheEntry) -> Result<CacheEntry, CacheError> {
        let compressed = encode_payload(&entry.payload)?;
        let row = entry.clone();

        self.conn
            .call(move |conn| {
                conn.execute(
                    &format!(
                        "INSERT OR REPLACE INTO search_cache ({})
                         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
                        ENTRY_COLUMNS
                    ),
                    params![
                        row.key,
                        row.brand,
                        row.model,
                        row.question,
                        row.question_hash,
                        row.prompt,
                        compressed,
                        to_sql_count(row.usage_count),
                        row.last_used_at.timestamp_millis(),
                        row.created_at.timestamp_millis(),
                        row.expires_at.timestamp_millis()
                    ],
                )
            })
            .await?;

        Ok(entry.clone())
    }

    async fn update_usage(
        &self,
        key: &str,
        usage_count: u64,
        last_used_at: DateTime<Utc>,
    ) -> Result<(), CacheError> {
        let key_owned = key.to_string();
        let last_used_ms = last_used_at.timestamp_millis();
        let count = to_sql_count(usage_count);

        let changed = self
            .conn
            .call(move |conn| {
                conn.execute(
                    "UPDATE search_cache SET usage_count = ?, last_used_at = ? WHERE search_key = ?",
                    params![count, last_used_ms, key_owned],
                )
            })
            .await?;

        if changed == 0 {
            debug!(key, "usage update matched no rows");
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
        let brand = brand.to_string();
        let model = model.to_string();
        let fresh_ms = fresh_at.timestamp_millis();
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);

        let entries = self
            .conn
            .call(move |conn| {
                let mut stmt = conn.prepare(&format!(
                    "SELECT {} FROM search_cache
                     WHERE brand = ?1 COLLATE NOCASE
                       AND model = ?2 COLLATE NOCASE
                       AND expires_at >= ?3
                     ORDER BY usage_count DESC, last_used_at DESC, search_key ASC
                     LIMIT ?4",
                    ENTRY_COLUMNS
                ))?;
                let rows = stmt.query_map(params![brand, model, fresh_ms, limit], row_to_entry)?;
                rows.collect::<Result<Vec<_>, _>>()
            })
            .await?;

        Ok(entries)
    }
}

fn row_to_entry(row: &rusqlite::Row<'_>) -> rusqlite::Result<CacheEntry> {
    let compressed: Vec<u8> = row.get(6)?;
    let payload = decode_payload(&compressed).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(6, rusqlite::types::Type::Blob, Box::new(e))
    })?;
    let usage_count: i64 = row.get(7)?;

    Ok(CacheEntry {
        key: row.get(0)?,
        brand: row.get(1)?,
        model: row.get(2)?,
        question: row.get(3)?,
        question_hash: row.get(4)?,
        prompt: row.get(5)?,
        payload,
        usage_count: usage_count.max(0) as u64,
        last_used_at: millis_column(row, 8)?,
        created_at: millis_column(row, 9)?,
        expires_at: millis_column(row, 10)?,
    })
}

fn millis_column(row: &rusqlite::Row<'_>, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    let ms: i64 = row.get(idx)?;
    DateTime::<Utc>::from_timestamp_millis(ms)
        .ok_or(rusqlite::Error::IntegralValueOutOfRange(idx, ms))
}

fn to_sql_count(count: u64) -> i64 {
    i64::try_from(count).unwrap_or(i64::MAX)
}

fn encode_payload(payload: &serde_json::Value) -> Result<Vec<u8>, CacheError> {
    let serialized = serde_json::to_vec(payload)?;
    encode_all(Cursor::new(&serialized), 0).map_err(|e| CacheError::Compression(e.to_string()))
}

fn decode_payload(compressed: &[u8]) -> Result<serde_json::Value, CacheError> {
    let decompressed =
        decode_all(Cursor::new(compressed)).map_err(|e| CacheError::Compression(e.to_string()))?;
    Ok(serde_json::from_slice(&decompressed)?)
}
