use crate::memory_store::StoreEngine;
use crate::version;
use byte_unit::{Byte, Unit};
use clap::{Parser, ValueEnum};
use std::net::IpAddr;

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum RuntimeType {
    /// one single threaded runtime per worker thread
    CurrentThread,
    /// work stealing thread pool
    MultiThread,
}

impl RuntimeType {
    pub fn as_str(&self) -> &'static str {
        match self {
            RuntimeType::CurrentThread => "Work handled withing current thread runtime",
            RuntimeType::MultiThread => "Work stealing threadpool runtime",
        }
    }
}

const DEFAULT_PORT: u16 = 11211;
const DEFAULT_ADDRESS: &str = "127.0.0.1";
const CONNECTION_LIMIT: u32 = 0;
const LISTEN_BACKLOG: u32 = 1024;
const MEMORY_LIMIT: &str = "64MiB";
const MAX_ITEM_SIZE: &str = "1MiB";
const MAX_ITEM_SIZE_LIMIT_MIB: u64 = 1024;
const MIN_ITEM_SIZE: u64 = 1024;

fn default_threads() -> usize {
    num_cpus::get_physical() + 1
}

fn parse_byte_size(value: &str) -> Result<u64, String> {
    Byte::parse_str(value, true)
        .map(|byte| byte.as_u64())
        .map_err(|err| format!("invalid size '{}': {}", value, err))
}

/// Plain numbers are megabytes, anything else goes through `byte_unit`.
fn parse_memory_limit(value: &str) -> Result<u64, String> {
    if let Ok(megabytes) = value.parse::<u64>() {
        return Byte::from_u64_with_unit(megabytes, Unit::MiB)
            .map(|byte| byte.as_u64())
            .ok_or_else(|| format!("memory limit too large: {}", value));
    }
    parse_byte_size(value)
}

fn parse_item_size(value: &str) -> Result<u64, String> {
    let size = parse_byte_size(value)?;
    let max = MAX_ITEM_SIZE_LIMIT_MIB * 1024 * 1024;
    if size < MIN_ITEM_SIZE {
        return Err(format!("Max item size cannot be less than: {}", MIN_ITEM_SIZE));
    }
    if size > max {
        return Err(format!(
            "Max item size cannot be greater than: {}",
            Byte::from_u64(max).get_appropriate_unit(byte_unit::UnitType::Binary)
        ));
    }
    Ok(size)
}

#[derive(Parser, Debug, Clone)]
#[command(
    author,
    version = version::MEMTEXT_VERSION,
    about = "memtextd - memcached text protocol compatible server",
    long_about = None
)]
pub struct MemtextdConfig {
    /// TCP port to listen on
    #[arg(short, long, default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// interface to listen on
    #[arg(short = 'l', long = "listen", default_value = DEFAULT_ADDRESS)]
    pub listen_address: IpAddr,

    /// max simultaneous connections, 0 means no limit
    #[arg(short, long, default_value_t = CONNECTION_LIMIT)]
    pub connection_limit: u32,

    /// set the backlog queue limit
    #[arg(short, long, default_value_t = LISTEN_BACKLOG)]
    pub backlog_limit: u32,

    /// item memory limit, plain numbers are megabytes, 0 means no limit
    #[arg(short, long, value_parser = parse_memory_limit, default_value = MEMORY_LIMIT)]
    pub memory_limit: u64,

    /// max item size (min: 1KiB, max: 1024MiB)
    #[arg(short = 'I', long = "max-item-size", value_parser = parse_item_size, default_value = MAX_ITEM_SIZE)]
    pub item_size_limit: u64,

    /// number of threads to use
    #[arg(short, long, default_value_t = default_threads())]
    pub threads: usize,

    /// runtime type to use
    #[arg(short, long, value_enum, default_value_t = RuntimeType::CurrentThread)]
    pub runtime_type: RuntimeType,

    /// store engine to use
    #[arg(short, long, value_enum, default_value_t = StoreEngine::Buckets)]
    pub store_engine: StoreEngine,

    /// seconds of inactivity before a client is disconnected, 0 means never
    #[arg(long = "idle-timeout", default_value_t = 0)]
    pub idle_timeout_secs: u64,

    /// sets the level of verbosity
    #[arg(short, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

impl MemtextdConfig {
    pub fn log_level(&self) -> tracing::Level {
        // Vary the output based on how many times the user used the "verbose" flag
        // (i.e. 'myprog -v -v -v' or 'myprog -vvv' vs 'myprog -v'
        match self.verbose {
            0 => tracing::Level::ERROR,
            1 => tracing::Level::WARN,
            2 => tracing::Level::INFO,
            3 => tracing::Level::DEBUG,
            _ => tracing::Level::TRACE,
        }
    }
}

pub fn parse(args: Vec<String>) -> Result<MemtextdConfig, clap::Error> {
    MemtextdConfig::try_parse_from(args)
}
