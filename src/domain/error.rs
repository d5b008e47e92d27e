use thiserror::Error;

#[derive(Error, Debug)]
pub enum CacheError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(#[from] tokio_rusqlite::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Compression error: {0}")]
    Compression(String),

    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl CacheError {
    /// Whether the error came from the store collaborator rather than the caller's input.
    pub fn is_store_failure(&self) -> bool {
        matches!(
            self,
            CacheError::Database(_)
                | CacheError::Sqlite(_)
                | CacheError::Json(_)
                | CacheError::Compression(_)
                | CacheError::StoreUnavailable(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_is_not_store_failure() {
        assert!(!CacheError::Validation("brand is empty".into()).is_store_failure());
        assert!(!CacheError::Config("bad".into()).is_store_failure());
    }

    #[test]
    fn test_store_errors_classified() {
        assert!(CacheError::StoreUnavailable("timeout".into()).is_store_failure());
        assert!(CacheError::Compression("zstd".into()).is_store_failure());
        assert!(CacheError::Sqlite(rusqlite::Error::QueryReturnedNoRows).is_store_failure());
    }
}
