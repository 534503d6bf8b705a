use crate::cache::cache::{
    Cache, EdgePosition, ItemStats, KeyType, PutMode, Record, ValueType,
};
use crate::cache::error::{CacheError, Result};
use crate::cache::expiration::Expiration;
use crate::memory_store::shared_store_state::{SharedStoreState, StoredRecord};

use bytes::Bytes;
use parking_lot::Mutex;

/// Prime bucket count, keeps djb2 clustering low.
pub const DEFAULT_BUCKET_COUNT: usize = 10_007;

struct Entry {
    key: KeyType,
    stored: StoredRecord,
}

type Chain = Vec<Entry>;

/// djb2 string hash: `h = h * 33 + byte`, starting from 5381.
#[inline]
pub fn djb2(key: &[u8]) -> u32 {
    key.iter().fold(5381u32, |hash, &byte| {
        (hash << 5).wrapping_add(hash).wrapping_add(byte as u32)
    })
}

/// Fixed size hash table with one lock per bucket.
///
/// No operation holds two bucket locks at once, `clear` and `expire_all`
/// visit the buckets one after another.
pub struct BucketMemoryStore {
    buckets: Box<[Mutex<Chain>]>,
    store_state: SharedStoreState,
}

impl BucketMemoryStore {
    pub fn new(store_state: SharedStoreState) -> BucketMemoryStore {
        Self::with_bucket_count(store_state, DEFAULT_BUCKET_COUNT)
    }

    pub fn with_bucket_count(store_state: SharedStoreState, bucket_count: usize) -> BucketMemoryStore {
        let bucket_count = bucket_count.max(1);
        info!("Number of buckets: {}", bucket_count);
        let buckets = (0..bucket_count)
            .map(|_| Mutex::new(Chain::new()))
            .collect::<Vec<_>>()
            .into_boxed_slice();
        BucketMemoryStore {
            buckets,
            store_state,
        }
    }

    #[inline]
    fn bucket_index(&self, key: &[u8]) -> usize {
        djb2(key) as usize % self.buckets.len()
    }

    #[inline]
    fn bucket(&self, key: &[u8]) -> &Mutex<Chain> {
        &self.buckets[self.bucket_index(key)]
    }

    /// Position of the live entry for `key`. A dead entry found on the way
    /// is unlinked.
    fn find_live(&self, chain: &mut Chain, key: &[u8]) -> Option<usize> {
        let idx = chain.iter().position(|entry| entry.key[..] == key[..])?;
        if self.store_state.is_live(&chain[idx].stored) {
            return Some(idx);
        }
        let dead = chain.remove(idx);
        self.store_state.on_remove(dead.stored.len());
        None
    }

    /// Unlinks every dead entry of a chain.
    fn sweep(&self, chain: &mut Chain) {
        chain.retain(|entry| {
            let live = self.store_state.is_live(&entry.stored);
            if !live {
                self.store_state.on_remove(entry.stored.len());
            }
            live
        });
    }
}

/// Builds `prefix || suffix` without aborting on allocation failure.
pub(crate) fn concat_value(prefix: &[u8], suffix: &[u8]) -> Result<ValueType> {
    let mut value: Vec<u8> = Vec::new();
    value
        .try_reserve_exact(prefix.len() + suffix.len())
        .map_err(|_err| CacheError::OutOfMemory)?;
    value.extend_from_slice(prefix);
    value.extend_from_slice(suffix);
    Ok(Bytes::from(value))
}

impl Cache for BucketMemoryStore {
    fn get(&self, key: &KeyType) -> Result<Record> {
        let mut chain = self.bucket(key).lock();
        match self.find_live(&mut chain, key) {
            Some(idx) => Ok(chain[idx].stored.record.clone()),
            None => Err(CacheError::NotFound),
        }
    }

    fn put(&self, key: KeyType, mut record: Record, mode: PutMode) -> Result<()> {
        let mut chain = self.bucket(&key).lock();
        let found = self.find_live(&mut chain, &key);
        match (mode, found) {
            (PutMode::OnlyIfAbsent, Some(_)) => return Err(CacheError::KeyExists),
            (PutMode::OnlyIfPresent, None) => return Err(CacheError::NotFound),
            _ => {}
        }

        let epoch = self.store_state.epoch();
        match found {
            Some(idx) => {
                let entry = &mut chain[idx];
                self.store_state
                    .reserve_bytes(entry.stored.len(), record.len())?;
                self.store_state.stamp_cas(&mut record);
                entry.stored = StoredRecord::new(record, epoch);
            }
            None => {
                chain
                    .try_reserve(1)
                    .map_err(|_err| CacheError::OutOfMemory)?;
                self.store_state.reserve_bytes(0, record.len())?;
                self.store_state.stamp_cas(&mut record);
                chain.push(Entry {
                    key,
                    stored: StoredRecord::new(record, epoch),
                });
                self.store_state.on_insert();
            }
        }
        Ok(())
    }

    fn mutate_edge(&self, key: &KeyType, data: ValueType, position: EdgePosition) -> Result<()> {
        let mut chain = self.bucket(key).lock();
        let idx = self
            .find_live(&mut chain, key)
            .ok_or(CacheError::NotFound)?;
        let record = &mut chain[idx].stored.record;
        let new_value = match position {
            EdgePosition::Append => concat_value(&record.value, &data)?,
            EdgePosition::Prepend => concat_value(&data, &record.value)?,
        };
        self.store_state
            .reserve_bytes(record.value.len(), new_value.len())?;
        record.value = new_value;
        self.store_state.stamp_cas(record);
        Ok(())
    }

    fn incr_decr(&self, key: &KeyType, delta: u64, increment: bool) -> Result<u64> {
        let mut chain = self.bucket(key).lock();
        let idx = self
            .find_live(&mut chain, key)
            .ok_or(CacheError::NotFound)?;
        let record = &mut chain[idx].stored.record;
        let new_value = self
            .store_state
            .incr_decr_common(record, delta, increment)?;
        let new_bytes = Bytes::from(new_value.to_string());
        self.store_state
            .reserve_bytes(record.value.len(), new_bytes.len())?;
        record.value = new_bytes;
        self.store_state.stamp_cas(record);
        Ok(new_value)
    }

    fn remove(&self, key: &KeyType) -> Result<()> {
        let mut chain = self.bucket(key).lock();
        let idx = self
            .find_live(&mut chain, key)
            .ok_or(CacheError::NotFound)?;
        let removed = chain.remove(idx);
        self.store_state.on_remove(removed.stored.len());
        Ok(())
    }

    fn clear(&self) {
        let epoch = self.store_state.bump_epoch();
        debug!("Flushing store, new epoch {}", epoch);
        for bucket in self.buckets.iter() {
            let mut chain = bucket.lock();
            self.sweep(&mut chain);
        }
    }

    fn expire_all(&self, deadline: Expiration) {
        for bucket in self.buckets.iter() {
            let mut chain = bucket.lock();
            self.sweep(&mut chain);
            for entry in chain.iter_mut() {
                let header = &mut entry.stored.record.header;
                header.expiration = header.expiration.earliest(deadline);
            }
        }
    }

    fn item_stats(&self) -> ItemStats {
        self.store_state.item_stats()
    }
}
