pub mod client_handler;
pub mod handler;
pub mod memc_tcp;
pub mod runtime_builder;
pub mod server_context;
pub mod stats;
