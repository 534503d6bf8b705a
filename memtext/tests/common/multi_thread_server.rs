use std::net::SocketAddr;

use memtext::{
    memcache,
    memcache_server::{
        runtime_builder::start_memtext_server_with_ctxt, server_context::ServerContext,
    },
};
use tokio_util::sync::CancellationToken;

use crate::common::{random_port::PSEUDO_RANDOM_PORT, MemtextdServerParamsBuilder, TextClient};

/// In process server, stopped and joined when dropped.
pub struct MemtextdTestServer {
    thread_join_handle: Option<std::thread::JoinHandle<std::io::Result<()>>>,
    cancellation_token: CancellationToken,
    port: u16,
}

impl MemtextdTestServer {
    fn new(
        thread_join_handle: std::thread::JoinHandle<std::io::Result<()>>,
        cancellation_token: CancellationToken,
        port: u16,
    ) -> MemtextdTestServer {
        MemtextdTestServer {
            thread_join_handle: Some(thread_join_handle),
            cancellation_token,
            port,
        }
    }

    fn kill(&mut self) {
        self.cancellation_token.cancel();
        if let Some(thread_join_handle) = self.thread_join_handle.take() {
            match thread_join_handle.join() {
                Ok(Ok(())) => {}
                Ok(Err(err)) => eprintln!("Server stopped with error: {err}"),
                Err(_) => eprintln!("Server thread panicked"),
            }
        }
    }

    pub fn addr(&self) -> SocketAddr {
        SocketAddr::from(([127, 0, 0, 1], self.port))
    }

    #[allow(dead_code)]
    pub fn get_connection_string(&self) -> String {
        format!(
            "memcache://127.0.0.1:{}?timeout=5&tcp_nodelay=true&protocol=ascii",
            self.port
        )
    }

    /// `memcache` crate client, connected once the listener accepts.
    #[allow(dead_code)]
    pub fn memcache_client(&self) -> ::memcache::Client {
        drop(TextClient::connect(self.addr()));
        match ::memcache::connect(self.get_connection_string()) {
            Ok(client) => client,
            Err(err) => panic!("Cannot connect memcache client: {}", err),
        }
    }
}

impl Drop for MemtextdTestServer {
    fn drop(&mut self) {
        self.kill();
    }
}

fn spawn_server_args(args: Vec<String>) -> MemtextdTestServer {
    let config = match memcache::cli::parser::parse(args) {
        Ok(config) => config,
        Err(err) => panic!("Invalid test server arguments: {}", err),
    };
    let ctxt = ServerContext::get_default_server_context(&config);
    let cancellation_token = ctxt.cancellation_token();
    let port = config.port;
    let handle = std::thread::spawn(move || start_memtext_server_with_ctxt(config, ctxt));
    MemtextdTestServer::new(handle, cancellation_token, port)
}

pub fn spawn_server(mut params: MemtextdServerParamsBuilder) -> MemtextdTestServer {
    let port = PSEUDO_RANDOM_PORT.lock().unwrap().get_next_port();
    params.with_port(port);
    let args = params.build();
    spawn_server_args(args)
}
