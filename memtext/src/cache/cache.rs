use super::error::Result;
use super::expiration::Expiration;
use bytes::Bytes;

/// Cache key type
pub type KeyType = Bytes;

/// Cache value associated with a key
pub type ValueType = Bytes;

/// Longest key accepted by the store and the protocol.
pub const MAX_KEY_LENGTH: usize = 250;

/// Meta data stored with cache value
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CacheMetaData {
    // 0 until a store commits the record
    pub(crate) cas: u64,
    pub(crate) flags: u32,
    pub(crate) expiration: Expiration,
}

impl CacheMetaData {
    pub fn new(flags: u32, expiration: Expiration) -> CacheMetaData {
        CacheMetaData {
            cas: 0,
            flags,
            expiration,
        }
    }

    pub fn cas(&self) -> u64 {
        self.cas
    }

    pub fn flags(&self) -> u32 {
        self.flags
    }

    pub fn get_expiration(&self) -> Expiration {
        self.expiration
    }
}

/// Value and meta data stored in cache
#[derive(Clone, Debug)]
pub struct Record {
    pub(crate) header: CacheMetaData,
    pub(crate) value: ValueType,
}

impl Record {
    pub fn new(value: ValueType, flags: u32, expiration: Expiration) -> Record {
        let header = CacheMetaData::new(flags, expiration);
        Record { header, value }
    }

    pub fn value(&self) -> &ValueType {
        &self.value
    }

    pub fn flags(&self) -> u32 {
        self.header.flags
    }

    /// Unique stamp of the last write that changed this record.
    pub fn cas(&self) -> u64 {
        self.header.cas
    }

    pub fn len(&self) -> usize {
        self.value.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl PartialEq for Record {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}

/// Precondition of a `put`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PutMode {
    /// Insert or overwrite.
    Unconditional,
    /// Fail with `KeyExists` when a live entry exists.
    OnlyIfAbsent,
    /// Fail with `NotFound` when no live entry exists.
    OnlyIfPresent,
}

/// End of an existing value that `mutate_edge` extends.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EdgePosition {
    Append,
    Prepend,
}

/// Snapshot of the item counters of a store.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ItemStats {
    pub curr_items: u64,
    pub total_items: u64,
    pub bytes: u64,
    pub limit_maxbytes: u64,
}

// An abstraction over a generic key <=> value store
//
// Every mutating call is all-or-nothing: it either commits while holding the
// lock that guards the key, or returns an error leaving the store untouched.
pub trait Cache {
    /// Returns a copy of the live record associated with a key.
    /// An expired or flushed entry is removed and reported as `NotFound`.
    fn get(&self, key: &KeyType) -> Result<Record>;

    /// Stores a record according to `mode`.
    ///
    /// - `Unconditional` always stores
    /// - `OnlyIfAbsent` fails with `KeyExists` when a live entry exists
    /// - `OnlyIfPresent` fails with `NotFound` when no live entry exists
    fn put(&self, key: KeyType, record: Record, mode: PutMode) -> Result<()>;

    /// Concatenates `data` to the live value at the requested end.
    /// Flags and expiration of the existing entry are kept.
    fn mutate_edge(&self, key: &KeyType, data: ValueType, position: EdgePosition) -> Result<()>;

    /// Adds or subtracts `delta` from a decimal value, returns the new value.
    /// Increments wrap around at 2^64, decrements saturate at 0.
    fn incr_decr(&self, key: &KeyType, delta: u64, increment: bool) -> Result<u64>;

    /// Removes a live entry, `NotFound` when there is none.
    fn remove(&self, key: &KeyType) -> Result<()>;

    /// Removes every entry. No reader observes an entry stored before the
    /// call once it has started.
    fn clear(&self);

    /// Caps the expiration of every live entry to `deadline`.
    fn expire_all(&self, deadline: Expiration);

    /// Current values of the item counters.
    fn item_stats(&self) -> ItemStats;
}
