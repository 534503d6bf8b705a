use socket2::{Domain, SockAddr, Socket, Type};
use std::net::SocketAddr;
use std::sync::Arc;

use tokio::io;
use tokio::net::TcpListener;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tokio_util::sync::CancellationToken;

use tracing::{debug, error, info};

use super::client_handler;
use super::stats::ServerStats;
use crate::memcache::store as storage;

#[derive(Clone, Copy, Debug)]
pub struct MemcacheServerConfig {
    idle_timeout_secs: u64,
    item_size_limit: u64,
    listen_backlog: u32,
}

impl MemcacheServerConfig {
    pub fn new(idle_timeout_secs: u64, item_size_limit: u64, listen_backlog: u32) -> Self {
        MemcacheServerConfig {
            idle_timeout_secs,
            item_size_limit,
            listen_backlog,
        }
    }
}

/// Builds the limiter shared by every listener, `None` when unbounded.
pub fn connection_limiter(connection_limit: u32) -> Option<Arc<Semaphore>> {
    if connection_limit == 0 {
        None
    } else {
        Some(Arc::new(Semaphore::new(connection_limit as usize)))
    }
}

#[derive(Clone)]
pub struct MemcacheTcpServer {
    storage: Arc<storage::MemcStore>,
    stats: Arc<ServerStats>,
    limit_connections: Option<Arc<Semaphore>>,
    config: MemcacheServerConfig,
    cancellation_token: CancellationToken,
}

impl MemcacheTcpServer {
    pub fn new(
        config: MemcacheServerConfig,
        storage: Arc<storage::MemcStore>,
        stats: Arc<ServerStats>,
        limit_connections: Option<Arc<Semaphore>>,
        cancellation_token: CancellationToken,
    ) -> MemcacheTcpServer {
        MemcacheTcpServer {
            storage,
            stats,
            limit_connections,
            config,
            cancellation_token,
        }
    }

    /// Accepts connections until the cancellation token fires, one task per
    /// client.
    pub async fn run(&mut self, addr: SocketAddr) -> io::Result<()> {
        let listener = self.get_tcp_listener(addr)?;
        info!("Listening on: {}", addr);
        loop {
            tokio::select! {
                connection = listener.accept() => {
                    match connection {
                        Ok((socket, peer_addr)) => {
                            if let Err(err) = socket.set_nodelay(true) {
                                error!("Cannot set TCP_NODELAY for {}: {}", peer_addr, err);
                            }
                            // the accepted socket waits here while the server is full
                            let permit = match self.acquire_permit().await {
                                Some(permit) => permit,
                                None => {
                                    debug!("Listener on {} cancelled", addr);
                                    return Ok(());
                                }
                            };
                            let mut client = client_handler::Client::new(
                                Arc::clone(&self.storage),
                                Arc::clone(&self.stats),
                                socket,
                                peer_addr,
                                self.get_client_config(),
                                permit,
                            );
                            // Like with other small servers, we'll `spawn` this client to ensure it
                            // runs concurrently with all other clients.
                            tokio::spawn(async move { client.handle().await });
                        },
                        Err(err) => {
                            error!("Accept error: {}", err);
                        }
                    }
                }
                _ = self.cancellation_token.cancelled() => {
                    debug!("Listener on {} cancelled", addr);
                    return Ok(());
                }
            }
        }
    }

    /// Waits for a free connection slot. `Some(None)` means no limit,
    /// `None` means the server is shutting down.
    async fn acquire_permit(&self) -> Option<Option<OwnedSemaphorePermit>> {
        let semaphore = match &self.limit_connections {
            Some(semaphore) => Arc::clone(semaphore),
            None => return Some(None),
        };
        tokio::select! {
            permit = semaphore.acquire_owned() => permit.ok().map(Some),
            _ = self.cancellation_token.cancelled() => None,
        }
    }

    fn get_tcp_listener(&mut self, addr: SocketAddr) -> Result<TcpListener, std::io::Error> {
        let socket = Socket::new(Domain::for_address(addr), Type::STREAM, None)?;
        socket.set_reuse_address(true)?;
        // every current thread runtime binds its own listener on the same port
        #[cfg(unix)]
        socket.set_reuse_port(true)?;
        socket.set_nonblocking(true)?;
        debug!("Binding to addr: {:?}", addr);
        let sock_addr = SockAddr::from(addr);
        if let Err(err) = socket.bind(&sock_addr) {
            error!("Can't bind to: {:?}, err {:?}", addr, err);
            return Err(err);
        }

        if let Err(err) = socket.listen(self.config.listen_backlog as i32) {
            error!("Listen error: {:?}", err);
            return Err(err);
        }

        let std_listener: std::net::TcpListener = socket.into();
        TcpListener::from_std(std_listener)
    }

    fn get_client_config(&self) -> client_handler::ClientConfig {
        client_handler::ClientConfig {
            item_size_limit: self.config.item_size_limit,
            idle_timeout_secs: self.config.idle_timeout_secs,
        }
    }
}
