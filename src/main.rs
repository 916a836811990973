use std::sync::Arc;

mod api;
mod bom;
mod catalog;
mod config;
mod handler;
mod http;
mod logger;
mod serial;
mod server;
mod store;

use server::{Surface, SignalHandler};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cfg = config::Config::load()?;
    logger::init(&cfg)?;

    // Build the Tokio runtime; `server.workers` sets the thread count
    let mut runtime_builder = tokio::runtime::Builder::new_multi_thread();
    runtime_builder.enable_all();
    if let Some(workers) = cfg.server.workers {
        runtime_builder.worker_threads(workers);
    }
    let runtime = runtime_builder.build()?;

    runtime.block_on(async_main(cfg))
}

async fn async_main(cfg: config::Config) -> Result<(), Box<dyn std::error::Error>> {
    let viewer_addr = cfg.get_socket_addr()?;
    let manager_addr = cfg.get_api_socket_addr()?;

    let viewer_listener = server::create_listener(viewer_addr, cfg.performance.backlog)?;
    let manager_listener = server::create_listener(manager_addr, cfg.performance.backlog)?;

    let state = Arc::new(config::AppState::new(&cfg).await);
    let signals = Arc::new(SignalHandler::new());
    server::start_signal_handler(Arc::clone(&signals), Arc::clone(&state))?;

    logger::log_server_start(&viewer_addr, &manager_addr, &cfg);

    // LocalSet for spawn_local support
    let local = tokio::task::LocalSet::new();
    local
        .run_until(async move {
            let manager = tokio::task::spawn_local(server::start_server_loop(
                manager_listener,
                Arc::clone(&state),
                Arc::clone(&signals),
                Surface::Manager,
            ));
            server::start_server_loop(viewer_listener, state, signals, Surface::Viewer).await;
            if let Err(e) = manager.await {
                logger::log_error(&format!("Manager listener task failed: {e}"));
            }
        })
        .await;

    Ok(())
}
