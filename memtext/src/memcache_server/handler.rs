use crate::cache::error::{CacheError, Result};
use crate::memcache::store;
use crate::memcache_server::stats::{self, ServerStats};
use crate::protocol::text::request::{
    DeleteRequest, FlushRequest, GetRequest, IncrDecrRequest, StorageCommand, StorageRequest,
    TextRequest,
};
use crate::protocol::text::response::{TextResponse, ValueEntry};
use crate::version::MEMTEXT_VERSION;
use std::process;
use std::sync::Arc;

const BAD_DATA_CHUNK: &str = "bad data chunk";

fn storage_error_to_response(err: CacheError) -> TextResponse {
    match err {
        CacheError::NotFound | CacheError::KeyExists => TextResponse::NotStored,
        CacheError::ArithOnNonNumeric => TextResponse::ClientError(err.to_string()),
        CacheError::OutOfMemory => {
            debug!("Memory limit reached, write rejected");
            TextResponse::ServerError(err.to_string())
        }
        CacheError::ValueTooLarge => TextResponse::ServerError(err.to_string()),
    }
}

fn into_quiet(response: TextResponse, noreply: bool) -> Option<TextResponse> {
    if noreply {
        None
    } else {
        Some(response)
    }
}

/// Executes decoded requests against the store.
pub struct TextHandler {
    storage: Arc<store::MemcStore>,
    stats: Arc<ServerStats>,
}

impl TextHandler {
    pub fn new(storage: Arc<store::MemcStore>, stats: Arc<ServerStats>) -> TextHandler {
        TextHandler { storage, stats }
    }

    /// Returns the response to send back, `None` when nothing is sent.
    pub fn handle_request(&self, request: TextRequest) -> Option<TextResponse> {
        match request {
            TextRequest::Storage(storage_request) => {
                let noreply = storage_request.noreply;
                into_quiet(self.store(storage_request), noreply)
            }
            TextRequest::Get(get_request) => Some(self.get(get_request)),
            TextRequest::Delete(delete_request) => {
                let noreply = delete_request.noreply;
                into_quiet(self.delete(delete_request), noreply)
            }
            TextRequest::Increment(incr_request) => {
                let noreply = incr_request.noreply;
                into_quiet(self.incr_decr(incr_request, true), noreply)
            }
            TextRequest::Decrement(decr_request) => {
                let noreply = decr_request.noreply;
                into_quiet(self.incr_decr(decr_request, false), noreply)
            }
            TextRequest::Flush(flush_request) => {
                let noreply = flush_request.noreply;
                into_quiet(self.flush(flush_request), noreply)
            }
            TextRequest::Stats => Some(self.stats()),
            TextRequest::Version => Some(TextResponse::Version(String::from(MEMTEXT_VERSION))),
            TextRequest::Verbosity { noreply } => into_quiet(TextResponse::Ok, noreply),
            TextRequest::Noop => Some(TextResponse::Ok),
            TextRequest::Quit => None,
            TextRequest::ItemTooLarge { noreply } => into_quiet(
                storage_error_to_response(CacheError::ValueTooLarge),
                noreply,
            ),
            TextRequest::BadDataChunk => {
                Some(TextResponse::ClientError(String::from(BAD_DATA_CHUNK)))
            }
            TextRequest::Invalid(reason) => Some(TextResponse::ClientError(String::from(reason))),
            TextRequest::Unknown => Some(TextResponse::Error),
        }
    }

    fn store(&self, request: StorageRequest) -> TextResponse {
        stats::increment(&self.stats.cmd_set);
        let result: Result<()> = match request.command {
            StorageCommand::Set | StorageCommand::Add | StorageCommand::Replace => {
                let expiration = self.storage.expiration(request.exptime);
                let record = store::Record::new(request.value, request.flags, expiration);
                match request.command {
                    StorageCommand::Add => self.storage.add(request.key, record),
                    StorageCommand::Replace => self.storage.replace(request.key, record),
                    _ => self.storage.set(request.key, record),
                }
            }
            // flags and exptime of the request are ignored
            StorageCommand::Append => self.storage.append(&request.key, request.value),
            StorageCommand::Prepend => self.storage.prepend(&request.key, request.value),
        };
        match result {
            Ok(()) => TextResponse::Stored,
            Err(err) => storage_error_to_response(err),
        }
    }

    fn get(&self, request: GetRequest) -> TextResponse {
        stats::increment(&self.stats.cmd_get);
        let mut entries = Vec::with_capacity(request.keys.len());
        for key in request.keys {
            match self.storage.get(&key) {
                Ok(record) => {
                    stats::increment(&self.stats.get_hits);
                    entries.push(ValueEntry {
                        flags: record.flags(),
                        cas: request.with_cas.then_some(record.cas()),
                        value: record.value,
                        key,
                    });
                }
                Err(_err) => stats::increment(&self.stats.get_misses),
            }
        }
        TextResponse::Values(entries)
    }

    fn delete(&self, request: DeleteRequest) -> TextResponse {
        match self.storage.delete(&request.key) {
            Ok(()) => {
                stats::increment(&self.stats.delete_hits);
                TextResponse::Deleted
            }
            Err(_err) => {
                stats::increment(&self.stats.delete_misses);
                TextResponse::NotFound
            }
        }
    }

    fn incr_decr(&self, request: IncrDecrRequest, increment: bool) -> TextResponse {
        let (result, hits, misses) = if increment {
            (
                self.storage.increment(&request.key, request.delta),
                &self.stats.incr_hits,
                &self.stats.incr_misses,
            )
        } else {
            (
                self.storage.decrement(&request.key, request.delta),
                &self.stats.decr_hits,
                &self.stats.decr_misses,
            )
        };
        match result {
            Ok(value) => {
                stats::increment(hits);
                TextResponse::Numeric(value)
            }
            Err(CacheError::NotFound) => {
                stats::increment(misses);
                TextResponse::NotFound
            }
            Err(err) => storage_error_to_response(err),
        }
    }

    fn flush(&self, request: FlushRequest) -> TextResponse {
        stats::increment(&self.stats.cmd_flush);
        self.storage.flush(request.delay);
        TextResponse::Ok
    }

    fn stats(&self) -> TextResponse {
        let now = self.storage.timestamp();
        let mut stats: Vec<(&'static str, String)> = vec![
            ("pid", process::id().to_string()),
            ("uptime", now.saturating_sub(self.stats.started_at()).to_string()),
            ("time", now.to_string()),
            ("version", String::from(MEMTEXT_VERSION)),
        ];
        stats.extend(
            self.stats
                .snapshot()
                .into_iter()
                .map(|(name, value)| (name, value.to_string())),
        );
        let items = self.storage.item_stats();
        stats.extend([
            ("curr_items", items.curr_items.to_string()),
            ("total_items", items.total_items.to_string()),
            ("bytes", items.bytes.to_string()),
            ("limit_maxbytes", items.limit_maxbytes.to_string()),
        ]);
        TextResponse::Stats(stats)
    }
}
