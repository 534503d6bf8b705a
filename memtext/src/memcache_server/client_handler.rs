use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::io;
use tokio::net::TcpStream;
use tokio::sync::OwnedSemaphorePermit;
use tokio::time::timeout;
use tracing::{debug, error, info, trace};

use super::handler;
use super::stats::ServerStats;
use crate::memcache::store as storage;
use crate::protocol::text::codec::ProtocolError;
use crate::protocol::text::connection::MemcacheTextConnection;
use crate::protocol::text::request::TextRequest;
use crate::protocol::text::response::TextResponse;

const LINE_TOO_LONG: &str = "line too long";

#[derive(Clone, Copy, Debug)]
pub struct ClientConfig {
    pub(crate) item_size_limit: u64,
    /// 0 disables the timeout
    pub(crate) idle_timeout_secs: u64,
}

pub struct Client {
    stream: MemcacheTextConnection<TcpStream>,
    addr: SocketAddr,
    config: ClientConfig,
    handler: handler::TextHandler,
    stats: Arc<ServerStats>,
    /// Max connection permit, returned to the listener when the client is
    /// dropped, even if the task handling it panics.
    _permit: Option<OwnedSemaphorePermit>,
}

impl Client {
    pub fn new(
        store: Arc<storage::MemcStore>,
        stats: Arc<ServerStats>,
        socket: TcpStream,
        addr: SocketAddr,
        config: ClientConfig,
        permit: Option<OwnedSemaphorePermit>,
    ) -> Self {
        stats.connection_opened();
        Client {
            stream: MemcacheTextConnection::new(socket, config.item_size_limit),
            addr,
            config,
            handler: handler::TextHandler::new(store, stats.clone()),
            stats,
            _permit: permit,
        }
    }

    pub async fn handle(&mut self) {
        debug!("New client connected: {}", self.addr);

        // One request at a time: decode, execute, answer, repeat until the
        // client quits or the socket fails.
        loop {
            let frame = if self.config.idle_timeout_secs == 0 {
                self.stream.read_frame().await
            } else {
                match timeout(
                    Duration::from_secs(self.config.idle_timeout_secs),
                    self.stream.read_frame(),
                )
                .await
                {
                    Ok(frame) => frame,
                    Err(err) => {
                        debug!(
                            "Timeout {}s elapsed, disconnecting client: {}, error: {}",
                            self.config.idle_timeout_secs, self.addr, err
                        );
                        return;
                    }
                }
            };
            if self.handle_frame(frame).await {
                return;
            }
        }
    }

    /// Returns true if we should leave client receive loop
    async fn handle_frame(&mut self, frame: Result<Option<TextRequest>, ProtocolError>) -> bool {
        match frame {
            Ok(Some(request)) => self.handle_request(request).await,
            Ok(None) => {
                debug!("Connection closed: {}", self.addr);
                true
            }
            Err(ProtocolError::LineTooLong(len)) => {
                debug!("Line too long ({} bytes) from client: {}", len, self.addr);
                let response = TextResponse::ClientError(String::from(LINE_TOO_LONG));
                if let Err(err) = self.stream.write(response).await {
                    log_protocol_error(err);
                }
                self.close().await;
                true
            }
            Err(ProtocolError::Incomplete) => {
                debug!("Client {} disconnected in the middle of a request", self.addr);
                true
            }
            Err(ProtocolError::Io(err)) => {
                log_error(err);
                true
            }
        }
    }

    /// Handles single memcached text request
    /// Returns true if we should leave client receive loop
    async fn handle_request(&mut self, request: TextRequest) -> bool {
        trace!("Got request {:?}", request);

        if let TextRequest::Quit = request {
            debug!("Closing client socket quit command");
            self.close().await;
            return true;
        }

        let name = request.name();
        match self.handler.handle_request(request) {
            Some(response) => {
                trace!("Sending response to {} {:?}", name, response);
                if let Err(err) = self.stream.write(response).await {
                    error!("error on sending response; error = {:?}", err);
                    return true;
                }
                false
            }
            None => false,
        }
    }

    async fn close(&mut self) {
        if let Err(err) = self.stream.shutdown().await {
            log_protocol_error(err);
        }
    }
}

impl Drop for Client {
    fn drop(&mut self) {
        self.stats.connection_closed();
    }
}

fn log_protocol_error(err: ProtocolError) {
    match err {
        ProtocolError::Io(err) => log_error(err),
        other => error!("Error: {}", other),
    }
}

fn log_error(e: io::Error) {
    // in most cases its not an error
    // client may just drop connection
    match e.kind() {
        io::ErrorKind::NotConnected
        | io::ErrorKind::ConnectionReset
        | io::ErrorKind::BrokenPipe => info!("Error: {}", e),
        _ => error!("Error: {}", e),
    }
}
