use clap::ValueEnum;

pub mod bucket_store;
pub mod dash_map_store;
pub mod shared_store_state;

#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum, Debug)]
pub enum StoreEngine {
    /// fixed size hash table with a lock per bucket
    Buckets,
    /// store based on dashmap library
    DashMap,
}

impl StoreEngine {
    pub fn as_str(&self) -> &'static str {
        match self {
            StoreEngine::Buckets => "Bucket hash table backend",
            StoreEngine::DashMap => "DashMap backend",
        }
    }
}
