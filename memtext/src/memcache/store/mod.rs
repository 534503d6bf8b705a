use crate::cache::cache::{
    Cache, EdgePosition, ItemStats, KeyType as CacheKeyType, PutMode,
    Record as CacheRecord, ValueType,
};
use crate::cache::error::Result;
use crate::cache::expiration::{self, Expiration};
use crate::server::timer::Timer;
use std::sync::Arc;

pub type Record = CacheRecord;
pub type KeyType = CacheKeyType;

/**
 * Implements Memcache commands based
 * on Key Value Store
 */
pub struct MemcStore {
    store: Arc<dyn Cache + Send + Sync>,
    timer: Arc<dyn Timer + Send + Sync>,
}

impl MemcStore {
    pub fn new(
        store: Arc<dyn Cache + Send + Sync>,
        timer: Arc<dyn Timer + Send + Sync>,
    ) -> MemcStore {
        MemcStore { store, timer }
    }

    pub fn timestamp(&self) -> u64 {
        self.timer.timestamp()
    }

    /// Resolves the `exptime` of a command against the store clock.
    pub fn expiration(&self, exptime: i64) -> Expiration {
        expiration::resolve_expiration(exptime, self.timestamp())
    }

    pub fn set(&self, key: KeyType, record: Record) -> Result<()> {
        self.store.put(key, record, PutMode::Unconditional)
    }

    pub fn get(&self, key: &KeyType) -> Result<Record> {
        self.store.get(key)
    }

    pub fn add(&self, key: KeyType, record: Record) -> Result<()> {
        self.store.put(key, record, PutMode::OnlyIfAbsent)
    }

    pub fn replace(&self, key: KeyType, record: Record) -> Result<()> {
        self.store.put(key, record, PutMode::OnlyIfPresent)
    }

    pub fn append(&self, key: &KeyType, value: ValueType) -> Result<()> {
        self.store.mutate_edge(key, value, EdgePosition::Append)
    }

    pub fn prepend(&self, key: &KeyType, value: ValueType) -> Result<()> {
        self.store.mutate_edge(key, value, EdgePosition::Prepend)
    }

    pub fn increment(&self, key: &KeyType, delta: u64) -> Result<u64> {
        self.store.incr_decr(key, delta, true)
    }

    pub fn decrement(&self, key: &KeyType, delta: u64) -> Result<u64> {
        self.store.incr_decr(key, delta, false)
    }

    pub fn delete(&self, key: &KeyType) -> Result<()> {
        self.store.remove(key)
    }

    /// A delay of 0 or less flushes immediately, otherwise every item
    /// expires no later than the resolved delay.
    pub fn flush(&self, delay: i64) {
        if delay <= 0 {
            self.store.clear();
        } else {
            self.store.expire_all(self.expiration(delay));
        }
    }

    pub fn item_stats(&self) -> ItemStats {
        self.store.item_stats()
    }
}

#[cfg(test)]
mod replace_tests;

#[cfg(test)]
mod test_utils {
    pub use super::*;
    pub use crate::cache::error::CacheError;
    pub use crate::cache::expiration::Expiration;
    pub use crate::mock::mock_server::{
        create_bucket_server, create_dash_map_server, create_server_with_memory_limit,
        MockServer, SetableTimer,
    };
    pub use crate::mock::value::{from_slice, from_string};
    pub use crate::memory_store::StoreEngine;
    pub use bytes::{BufMut, Bytes, BytesMut};

    pub fn record(value: &str) -> Record {
        Record::new(from_string(value), 0, Expiration::Never)
    }
}
