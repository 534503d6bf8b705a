use crate::cache::cache::Cache;
use crate::memcache::builder::{MemcacheStoreBuilder, MemcacheStoreConfig};
use crate::memcache::store::MemcStore;
use crate::memory_store::StoreEngine;
use crate::server::timer;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Arbitrary fixed start so that absolute timestamps in tests are realistic.
pub const MOCK_START_TIME: u64 = 1_700_000_000;

pub struct MockSystemTimer {
    pub current_time: AtomicU64,
}

pub trait SetableTimer: timer::Timer {
    fn set(&self, time: u64);
    fn add_seconds(&self, seconds: u64);
}

impl MockSystemTimer {
    pub fn new() -> Self {
        MockSystemTimer {
            current_time: AtomicU64::new(MOCK_START_TIME),
        }
    }
}

impl Default for MockSystemTimer {
    fn default() -> Self {
        Self::new()
    }
}

impl timer::Timer for MockSystemTimer {
    fn timestamp(&self) -> u64 {
        self.current_time.load(Ordering::Acquire)
    }
}

impl SetableTimer for MockSystemTimer {
    fn set(&self, time: u64) {
        self.current_time.store(time, Ordering::Release)
    }

    fn add_seconds(&self, seconds: u64) {
        self.current_time.fetch_add(seconds, Ordering::AcqRel);
    }
}

pub struct MockServer {
    pub timer: Arc<MockSystemTimer>,
    pub storage: MemcStore,
}

impl MockServer {
    pub fn new(store: Arc<dyn Cache + Send + Sync>, timer: Arc<MockSystemTimer>) -> Self {
        MockServer {
            storage: MemcStore::new(store, timer.clone()),
            timer,
        }
    }
}

pub struct StoreWithMockTimer {
    pub timer: Arc<MockSystemTimer>,
    pub memc_store: Arc<MemcStore>,
}

pub fn create_storage(engine: StoreEngine, memory_limit: u64) -> StoreWithMockTimer {
    let timer = Arc::new(MockSystemTimer::new());
    let config = MemcacheStoreConfig::new(engine, memory_limit);
    let store = MemcacheStoreBuilder::from_config(config, timer.clone());
    let memc_store = Arc::new(MemcStore::new(store, timer.clone()));
    StoreWithMockTimer { timer, memc_store }
}

fn create_server(engine: StoreEngine, memory_limit: u64) -> MockServer {
    let timer = Arc::new(MockSystemTimer::new());
    let config = MemcacheStoreConfig::new(engine, memory_limit);
    MockServer::new(
        MemcacheStoreBuilder::from_config(config, timer.clone()),
        timer,
    )
}

pub fn create_bucket_server() -> MockServer {
    create_server(StoreEngine::Buckets, 0)
}

pub fn create_dash_map_server() -> MockServer {
    create_server(StoreEngine::DashMap, 0)
}

pub fn create_server_with_memory_limit(engine: StoreEngine, memory_limit: u64) -> MockServer {
    create_server(engine, memory_limit)
}
