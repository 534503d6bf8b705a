use crate::cache::cache::Cache;
use crate::memory_store::bucket_store::BucketMemoryStore;
use crate::memory_store::dash_map_store::DashMapMemoryStore;
use crate::memory_store::shared_store_state::SharedStoreState;
use crate::memory_store::StoreEngine;
use crate::server::timer;
use std::sync::Arc;

pub struct MemcacheStoreConfig {
    engine: StoreEngine,
    memory_limit: u64,
}

impl MemcacheStoreConfig {
    pub fn new(engine: StoreEngine, memory_limit: u64) -> MemcacheStoreConfig {
        MemcacheStoreConfig {
            engine,
            memory_limit,
        }
    }
}

pub struct MemcacheStoreBuilder {}

impl MemcacheStoreBuilder {
    pub fn from_config(
        config: MemcacheStoreConfig,
        timer: Arc<dyn timer::Timer + Send + Sync>,
    ) -> Arc<dyn Cache + Send + Sync> {
        let store_state = SharedStoreState::new(timer, config.memory_limit);
        match config.engine {
            StoreEngine::Buckets => Arc::new(BucketMemoryStore::new(store_state)),
            StoreEngine::DashMap => Arc::new(DashMapMemoryStore::new(store_state)),
        }
    }
}
