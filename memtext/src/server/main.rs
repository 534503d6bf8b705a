use crate::memcache;
use crate::memcache_server;
use byte_unit::{Byte, UnitType};
use log::{error, info};
use std::process;
use tracing_log::LogTracer;

pub fn run(args: Vec<String>) {
    let cli_config = match memcache::cli::parser::parse(args) {
        Ok(config) => config,
        Err(err) => err.exit(),
    };

    if let Err(err) = LogTracer::init() {
        eprintln!("Cannot initialize logger: {}", err);
        process::exit(1);
    }
    // Vary the output based on how many times the user used the "verbose" flag
    // (i.e. 'myprog -v -v -v' or 'myprog -vvv' vs 'myprog -v'
    tracing_subscriber::fmt()
        .with_max_level(cli_config.log_level())
        .init();

    info!("Listen address: {}", cli_config.listen_address);
    info!("Listen port: {}", cli_config.port);
    info!("Connection limit: {}", cli_config.connection_limit);
    info!("Number of threads: {}", cli_config.threads);
    info!("Store engine: {}", cli_config.store_engine.as_str());
    info!("Idle timeout: {}s", cli_config.idle_timeout_secs);
    info!(
        "Max item size: {}",
        Byte::from_u64(cli_config.item_size_limit).get_appropriate_unit(UnitType::Binary)
    );
    info!(
        "Memory limit: {}",
        Byte::from_u64(cli_config.memory_limit).get_appropriate_unit(UnitType::Binary)
    );

    if let Err(err) = memcache_server::runtime_builder::start_memtext_server(cli_config) {
        error!("Server stopped: {}", err);
        process::exit(1);
    }
}
