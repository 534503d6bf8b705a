pub mod multi_thread_server;
pub mod params_builder;
pub mod random_port;
pub mod text_client;

#[allow(unused_imports)]
pub use multi_thread_server::{spawn_server, MemtextdTestServer};
pub use params_builder::MemtextdServerParamsBuilder;
#[allow(unused_imports)]
pub use text_client::{TextClient, Value};

#[allow(dead_code)]
pub fn spawn_default_server() -> MemtextdTestServer {
    spawn_server(MemtextdServerParamsBuilder::new())
}
