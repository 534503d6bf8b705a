use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio_util::sync::CancellationToken;

use crate::{
    memcache::{
        self,
        cli::parser::MemtextdConfig,
        store::MemcStore,
    },
    memcache_server::{
        memc_tcp::{self, MemcacheServerConfig, MemcacheTcpServer},
        stats::ServerStats,
    },
    server::timer::{self, Timer},
};

/// Everything the listeners of one server share.
pub struct ServerContext {
    cancellation_token: CancellationToken,
    system_timer: Arc<timer::SystemTimer>,
    storage: Arc<MemcStore>,
    stats: Arc<ServerStats>,
    limit_connections: Option<Arc<Semaphore>>,
}

impl ServerContext {
    pub fn get_default_server_context(config: &MemtextdConfig) -> Self {
        let cancellation_token = CancellationToken::new();
        let system_timer = Arc::new(timer::SystemTimer::new(cancellation_token.clone()));
        let store_config =
            memcache::builder::MemcacheStoreConfig::new(config.store_engine, config.memory_limit);
        let store = memcache::builder::MemcacheStoreBuilder::from_config(
            store_config,
            system_timer.clone(),
        );
        let storage = Arc::new(MemcStore::new(store, system_timer.clone()));
        let stats = Arc::new(ServerStats::new(config.threads, system_timer.timestamp()));
        Self {
            cancellation_token,
            system_timer,
            storage,
            stats,
            limit_connections: memc_tcp::connection_limiter(config.connection_limit),
        }
    }

    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancellation_token.clone()
    }

    pub fn system_timer(&self) -> Arc<timer::SystemTimer> {
        self.system_timer.clone()
    }

    pub fn storage(&self) -> Arc<MemcStore> {
        self.storage.clone()
    }

    pub fn stats(&self) -> Arc<ServerStats> {
        self.stats.clone()
    }

    pub fn tcp_server(&self, config: MemcacheServerConfig) -> MemcacheTcpServer {
        MemcacheTcpServer::new(
            config,
            self.storage(),
            self.stats(),
            self.limit_connections.clone(),
            self.cancellation_token(),
        )
    }
}
