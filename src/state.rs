use crate::application::resolver::CacheResolver;
use crate::domain::model::CacheKind;
use crate::domain::traits::CacheStore;
use crate::infrastructure::config::Config;
use crate::infrastructure::storage::cache::MemoryStore;
use crate::infrastructure::storage::db::SqliteStore;
use std::sync::Arc;

#[derive(Clone)]
pub enum StoreHandle {
    Sqlite(Arc<SqliteStore>),
    Memory(Arc<MemoryStore>),
}

impl StoreHandle {
    pub fn as_dyn(&self) -> Arc<dyn CacheStore> {
        match self {
            StoreHandle::Sqlite(store) => store.clone(),
            StoreHandle::Memory(store) => store.clone(),
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    pub store: StoreHandle,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(store: StoreHandle, config: Config) -> Self {
        Self {
            store,
            config: Arc::new(config),
        }
    }

    /// Resolver for one cache kind, using the configured TTL
    pub fn resolver(&self, kind: CacheKind) -> CacheResolver {
        CacheResolver::new(self.store.as_dyn(), self.config.cache.ttl_for(kind))
    }
}
