extern crate core_affinity;
use crate::memcache::cli::parser::{MemtextdConfig, RuntimeType};
use crate::memcache_server::memc_tcp::MemcacheServerConfig;
use crate::memcache_server::server_context::ServerContext;
use std::io;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread::JoinHandle;
use tokio::runtime::Builder;

fn get_worker_thread_name() -> String {
    static ATOMIC_ID: AtomicUsize = AtomicUsize::new(0);
    let id = ATOMIC_ID.fetch_add(1, Ordering::SeqCst);
    format!("memtextd-wrk-{}", id)
}

fn create_multi_thread_runtime(worker_threads: usize) -> io::Result<tokio::runtime::Runtime> {
    Builder::new_multi_thread()
        .thread_name_fn(get_worker_thread_name)
        .worker_threads(worker_threads.max(1))
        .enable_all()
        .build()
}

fn create_current_thread_runtime() -> io::Result<tokio::runtime::Runtime> {
    Builder::new_current_thread()
        .thread_name_fn(get_worker_thread_name)
        .enable_all()
        .build()
}

fn get_server_config(config: &MemtextdConfig) -> MemcacheServerConfig {
    MemcacheServerConfig::new(
        config.idle_timeout_secs,
        config.item_size_limit,
        config.backlog_limit,
    )
}

/// One single threaded runtime and one listener per worker thread, the
/// kernel balances connections between listeners bound with SO_REUSEPORT.
fn run_current_thread_server(config: MemtextdConfig, ctxt: ServerContext) -> io::Result<()> {
    let addr = SocketAddr::new(config.listen_address, config.port);
    let memc_config = get_server_config(&config);
    let core_ids = core_affinity::get_core_ids().unwrap_or_default();

    let mut workers: Vec<JoinHandle<io::Result<()>>> = Vec::with_capacity(config.threads);
    for i in 0..config.threads.max(1) {
        let mut tcp_server = ctxt.tcp_server(memc_config);
        let cancellation_token = ctxt.cancellation_token();
        let core_id = core_ids.get(i % core_ids.len().max(1)).copied();
        let spawned = std::thread::Builder::new()
            .name(format!("memtextd-listener-{}", i))
            .spawn(move || {
                debug!("Creating runtime {}", i);
                if let Some(core_id) = core_id {
                    if core_affinity::set_for_current(core_id) {
                        debug!(
                            "Thread pinned {:?} to core {:?}",
                            std::thread::current().id(),
                            core_id.id
                        );
                    } else {
                        warn!("Cannot pin thread to core {}", core_id.id);
                    }
                }
                let result = create_current_thread_runtime()
                    .and_then(|runtime| runtime.block_on(tcp_server.run(addr)));
                if let Err(err) = &result {
                    error!("Listener {} failed: {}", i, err);
                    cancellation_token.cancel();
                }
                result
            });
        match spawned {
            Ok(handle) => workers.push(handle),
            Err(err) => {
                ctxt.cancellation_token().cancel();
                join_workers(workers)?;
                return Err(err);
            }
        }
    }

    match create_current_thread_runtime() {
        Ok(timer_runtime) => timer_runtime.block_on(ctxt.system_timer().run()),
        Err(err) => {
            ctxt.cancellation_token().cancel();
            join_workers(workers)?;
            return Err(err);
        }
    }
    join_workers(workers)
}

fn join_workers(workers: Vec<JoinHandle<io::Result<()>>>) -> io::Result<()> {
    let mut result = Ok(());
    for worker in workers {
        match worker.join() {
            Ok(Ok(())) => {}
            Ok(Err(err)) => result = Err(err),
            Err(_panic) => result = Err(io::Error::other("listener thread panicked")),
        }
    }
    result
}

/// A single listener on a work stealing thread pool.
fn run_threadpool_server(config: MemtextdConfig, ctxt: ServerContext) -> io::Result<()> {
    let addr = SocketAddr::new(config.listen_address, config.port);
    let runtime = create_multi_thread_runtime(config.threads)?;
    let mut tcp_server = ctxt.tcp_server(get_server_config(&config));
    let cancellation_token = ctxt.cancellation_token();
    let server_handle = runtime.spawn(async move {
        let result = tcp_server.run(addr).await;
        if let Err(err) = &result {
            error!("Listener failed: {}", err);
            cancellation_token.cancel();
        }
        result
    });
    let system_timer = ctxt.system_timer();
    runtime.block_on(async move {
        system_timer.run().await;
        server_handle.await.map_err(io::Error::other)?
    })
}

/// Runs the server until the context's cancellation token fires.
pub fn start_memtext_server_with_ctxt(config: MemtextdConfig, ctxt: ServerContext) -> io::Result<()> {
    info!("Runtime type: {}", config.runtime_type.as_str());
    match config.runtime_type {
        RuntimeType::CurrentThread => run_current_thread_server(config, ctxt),
        RuntimeType::MultiThread => run_threadpool_server(config, ctxt),
    }
}

pub fn start_memtext_server(config: MemtextdConfig) -> io::Result<()> {
    let ctxt = ServerContext::get_default_server_context(&config);
    start_memtext_server_with_ctxt(config, ctxt)
}
