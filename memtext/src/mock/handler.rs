use crate::memcache::store::MemcStore;
use crate::memcache_server::handler::TextHandler;
use crate::memcache_server::stats::ServerStats;
use crate::memory_store::StoreEngine;
use crate::mock::mock_server::{create_storage, MockSystemTimer, MOCK_START_TIME};
use crate::protocol::text::request::{
    GetRequest, StorageCommand, StorageRequest, TextRequest,
};
use crate::protocol::text::response::TextResponse;

use bytes::Bytes;
use std::sync::Arc;

pub const MOCK_THREADS: usize = 4;

pub struct TextHandlerWithTimer {
    pub handler: TextHandler,
    pub timer: Arc<MockSystemTimer>,
    pub storage: Arc<MemcStore>,
    pub stats: Arc<ServerStats>,
}

impl TextHandlerWithTimer {
    pub fn handle_request(&self, request: TextRequest) -> Option<TextResponse> {
        self.handler.handle_request(request)
    }
}

fn create_handler(engine: StoreEngine, memory_limit: u64) -> TextHandlerWithTimer {
    let store_with_timer = create_storage(engine, memory_limit);
    let stats = Arc::new(ServerStats::new(MOCK_THREADS, MOCK_START_TIME));
    TextHandlerWithTimer {
        handler: TextHandler::new(store_with_timer.memc_store.clone(), stats.clone()),
        timer: store_with_timer.timer,
        storage: store_with_timer.memc_store,
        stats,
    }
}

pub fn create_bucket_handler() -> TextHandlerWithTimer {
    create_handler(StoreEngine::Buckets, 0)
}

pub fn create_dash_map_handler() -> TextHandlerWithTimer {
    create_handler(StoreEngine::DashMap, 0)
}

pub fn create_handler_with_memory_limit(
    engine: StoreEngine,
    memory_limit: u64,
) -> TextHandlerWithTimer {
    create_handler(engine, memory_limit)
}

pub fn create_storage_request(
    command: StorageCommand,
    key: &str,
    flags: u32,
    exptime: i64,
    value: Bytes,
) -> TextRequest {
    TextRequest::Storage(StorageRequest {
        command,
        key: Bytes::from(key.to_string()),
        flags,
        exptime,
        value,
        noreply: false,
    })
}

pub fn create_set_request(key: &str, value: Bytes) -> TextRequest {
    create_storage_request(StorageCommand::Set, key, 0, 0, value)
}

pub fn create_get_request(keys: &[&str]) -> TextRequest {
    create_retrieval_request(keys, false)
}

pub fn create_gets_request(keys: &[&str]) -> TextRequest {
    create_retrieval_request(keys, true)
}

fn create_retrieval_request(keys: &[&str], with_cas: bool) -> TextRequest {
    TextRequest::Get(GetRequest {
        keys: keys
            .iter()
            .map(|key| Bytes::from(key.to_string()))
            .collect(),
        with_cas,
    })
}

/// Value of a `STAT` line in a stats response.
pub fn find_stat(response: &TextResponse, name: &str) -> Option<String> {
    match response {
        TextResponse::Stats(stats) => stats
            .iter()
            .find(|(stat, _)| *stat == name)
            .map(|(_, value)| value.clone()),
        _ => None,
    }
}
