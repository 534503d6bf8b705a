use crate::cache::cache::{
    Cache, EdgePosition, ItemStats, KeyType, PutMode, Record, ValueType,
};
use crate::cache::error::{CacheError, Result};
use crate::cache::expiration::Expiration;
use crate::memory_store::bucket_store::concat_value;
use crate::memory_store::shared_store_state::{SharedStoreState, StoredRecord};

use bytes::Bytes;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

type Storage = DashMap<KeyType, StoredRecord>;

/// Store engine backed by `DashMap`, shards play the role of buckets.
pub struct DashMapMemoryStore {
    memory: Storage,
    store_state: SharedStoreState,
}

impl DashMapMemoryStore {
    pub fn new(store_state: SharedStoreState) -> DashMapMemoryStore {
        let parallelism = std::thread::available_parallelism().map_or(1, usize::from);
        let shards = Self::get_number_of_shards(parallelism);
        info!("Number of shards: {}", shards);
        DashMapMemoryStore {
            memory: DashMap::with_shard_amount(shards),
            store_state,
        }
    }

    // Number of shards is the closest power of 2 below parallelism^2 / 4,
    // never less than 2.
    fn get_number_of_shards(parallelism: usize) -> usize {
        let parallelism = parallelism.clamp(2, 192);

        let optimal_number_shards = parallelism.pow(2) / 4;
        if optimal_number_shards < 2 {
            return 2;
        }

        let closest_power_of_2 = optimal_number_shards.ilog2();
        let shards_power_of_2 = 2usize.pow(closest_power_of_2);
        debug!("Available parallelism: {}", parallelism);
        debug!("Optimal number of shards: {}", optimal_number_shards);

        shards_power_of_2.max(2)
    }

    /// Looks up the live entry for `key`, removing a dead one.
    /// Must be called while the shard lock is held through `entry`.
    fn live_entry<'a>(
        &self,
        entry: Entry<'a, KeyType, StoredRecord>,
    ) -> Option<dashmap::mapref::entry::OccupiedEntry<'a, KeyType, StoredRecord>> {
        match entry {
            Entry::Occupied(occupied) => {
                if self.store_state.is_live(occupied.get()) {
                    Some(occupied)
                } else {
                    let (_key, dead) = occupied.remove_entry();
                    self.store_state.on_remove(dead.len());
                    None
                }
            }
            Entry::Vacant(_) => None,
        }
    }
}

impl Cache for DashMapMemoryStore {
    fn get(&self, key: &KeyType) -> Result<Record> {
        match self.live_entry(self.memory.entry(key.clone())) {
            Some(entry) => Ok(entry.get().record.clone()),
            None => Err(CacheError::NotFound),
        }
    }

    fn put(&self, key: KeyType, mut record: Record, mode: PutMode) -> Result<()> {
        let entry = self.memory.entry(key);
        let present = matches!(&entry, Entry::Occupied(occupied) if self.store_state.is_live(occupied.get()));
        match (mode, present) {
            (PutMode::OnlyIfAbsent, true) => return Err(CacheError::KeyExists),
            (PutMode::OnlyIfPresent, false) => {
                // reclaim a dead entry while the shard is locked
                self.live_entry(entry);
                return Err(CacheError::NotFound);
            }
            _ => {}
        }

        let epoch = self.store_state.epoch();
        match entry {
            Entry::Occupied(mut occupied) => {
                let old_len = occupied.get().len();
                self.store_state.reserve_bytes(old_len, record.len())?;
                if !present {
                    // a dead entry is replaced by a new item
                    self.store_state.on_remove(0);
                    self.store_state.on_insert();
                }
                self.store_state.stamp_cas(&mut record);
                occupied.insert(StoredRecord::new(record, epoch));
            }
            Entry::Vacant(vacant) => {
                self.store_state.reserve_bytes(0, record.len())?;
                self.store_state.stamp_cas(&mut record);
                vacant.insert(StoredRecord::new(record, epoch));
                self.store_state.on_insert();
            }
        }
        Ok(())
    }

    fn mutate_edge(&self, key: &KeyType, data: ValueType, position: EdgePosition) -> Result<()> {
        let mut entry = self
            .live_entry(self.memory.entry(key.clone()))
            .ok_or(CacheError::NotFound)?;
        let record = &mut entry.get_mut().record;
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
        let mut entry = self
            .live_entry(self.memory.entry(key.clone()))
            .ok_or(CacheError::NotFound)?;
        let record = &mut entry.get_mut().record;
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
        let entry = self
            .live_entry(self.memory.entry(key.clone()))
            .ok_or(CacheError::NotFound)?;
        let (_key, removed) = entry.remove_entry();
        self.store_state.on_remove(removed.len());
        Ok(())
    }

    fn clear(&self) {
        let epoch = self.store_state.bump_epoch();
        debug!("Flushing store, new epoch {}", epoch);
        self.memory.retain(|_key, stored| {
            let live = self.store_state.is_live(stored);
            if !live {
                self.store_state.on_remove(stored.len());
            }
            live
        });
    }

    fn expire_all(&self, deadline: Expiration) {
        self.memory.retain(|_key, stored| {
            if !self.store_state.is_live(stored) {
                self.store_state.on_remove(stored.len());
                return false;
            }
            let header = &mut stored.record.header;
            header.expiration = header.expiration.earliest(deadline);
            true
        });
    }

    fn item_stats(&self) -> ItemStats {
        self.store_state.item_stats()
    }
}
