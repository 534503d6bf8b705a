use crate::cache::cache::{ItemStats, Record};
use crate::cache::error::{CacheError, Result};
use crate::cache::expiration;
use crate::server::timer::Timer;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// A record as kept by a store, stamped with the flush epoch it was written in.
#[derive(Clone, Debug)]
pub struct StoredRecord {
    pub(crate) record: Record,
    pub(crate) epoch: u64,
}

impl StoredRecord {
    pub fn new(record: Record, epoch: u64) -> StoredRecord {
        StoredRecord { record, epoch }
    }

    pub fn len(&self) -> usize {
        self.record.len()
    }
}

/// State shared by every bucket of a store: the clock, the flush epoch and
/// the item counters.
///
/// Counters are atomics so that updating them never takes a lock other than
/// the bucket lock the caller already holds.
pub struct SharedStoreState {
    timer: Arc<dyn Timer + Send + Sync>,
    flush_epoch: AtomicU64,
    cas_id: AtomicU64,
    curr_items: AtomicU64,
    total_items: AtomicU64,
    bytes: AtomicU64,
    // 0 means unlimited
    memory_limit: u64,
}

impl SharedStoreState {
    pub fn new(timer: Arc<dyn Timer + Send + Sync>, memory_limit: u64) -> SharedStoreState {
        SharedStoreState {
            timer,
            flush_epoch: AtomicU64::new(0),
            cas_id: AtomicU64::new(1),
            curr_items: AtomicU64::new(0),
            total_items: AtomicU64::new(0),
            bytes: AtomicU64::new(0),
            memory_limit,
        }
    }

    pub fn timestamp(&self) -> u64 {
        self.timer.timestamp()
    }

    pub fn epoch(&self) -> u64 {
        self.flush_epoch.load(Ordering::Acquire)
    }

    /// Invalidates every record stamped with the current epoch.
    pub fn bump_epoch(&self) -> u64 {
        self.flush_epoch.fetch_add(1, Ordering::AcqRel) + 1
    }

    /// Gives `record` a cas unique that no other committed write shares.
    pub fn stamp_cas(&self, record: &mut Record) {
        record.header.cas = self.cas_id.fetch_add(1, Ordering::Relaxed);
    }

    pub fn is_live(&self, stored: &StoredRecord) -> bool {
        stored.epoch == self.epoch()
            && expiration::is_live(stored.record.header.expiration, self.timestamp())
    }

    /// Accounts for a value growing from `old_len` to `new_len` bytes.
    /// Fails without side effects when the memory limit would be exceeded.
    pub fn reserve_bytes(&self, old_len: usize, new_len: usize) -> Result<()> {
        let (old_len, new_len) = (old_len as u64, new_len as u64);
        if new_len <= old_len {
            self.bytes.fetch_sub(old_len - new_len, Ordering::AcqRel);
            return Ok(());
        }
        let delta = new_len - old_len;
        let limit = self.memory_limit;
        self.bytes
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |used| {
                let next = used.checked_add(delta)?;
                if limit != 0 && next > limit {
                    None
                } else {
                    Some(next)
                }
            })
            .map(|_| ())
            .map_err(|_used| CacheError::OutOfMemory)
    }

    /// Called after a new record was linked into a bucket. Its bytes must
    /// already be reserved.
    pub fn on_insert(&self) {
        self.curr_items.fetch_add(1, Ordering::AcqRel);
        self.total_items.fetch_add(1, Ordering::AcqRel);
    }

    /// Called after a record of `len` bytes was unlinked from a bucket.
    pub fn on_remove(&self, len: usize) {
        self.curr_items.fetch_sub(1, Ordering::AcqRel);
        self.bytes.fetch_sub(len as u64, Ordering::AcqRel);
    }

    pub fn item_stats(&self) -> ItemStats {
        ItemStats {
            curr_items: self.curr_items.load(Ordering::Acquire),
            total_items: self.total_items.load(Ordering::Acquire),
            bytes: self.bytes.load(Ordering::Acquire),
            limit_maxbytes: self.memory_limit,
        }
    }

    /// Parses a stored value as u64 and applies `delta` to it.
    pub fn incr_decr_common(&self, record: &Record, delta: u64, increment: bool) -> Result<u64> {
        let value = std::str::from_utf8(&record.value)
            .map_err(|_err| CacheError::ArithOnNonNumeric)?
            .parse::<u64>()
            .map_err(|_err| CacheError::ArithOnNonNumeric)?;
        if increment {
            Ok(value.wrapping_add(delta))
        } else {
            Ok(value.saturating_sub(delta))
        }
    }
}
