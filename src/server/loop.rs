// Server loop module
// Accepts connections for one surface until shutdown is requested

use std::sync::atomic::AtomicUsize;
use std::sync::Arc;
use tokio::net::TcpListener;

use super::connection::{accept_connection, Surface};
use super::signal::SignalHandler;
use crate::config::AppState;
use crate::logger;

/// Accept loop shared by the viewer and manager listeners
///
/// Returns once the signal handler requests shutdown. Connections already
/// being served keep running on the `LocalSet` until they finish or time out.
pub async fn start_server_loop(
    listener: TcpListener,
    state: Arc<AppState>,
    signals: Arc<SignalHandler>,
    surface: Surface,
) {
    let active_connections = Arc::new(AtomicUsize::new(0));

    loop {
        // Register for the wakeup before checking the flag so a shutdown
        // between the two is not missed
        let shutdown = signals.shutdown.notified();
        tokio::pin!(shutdown);
        shutdown.as_mut().enable();
        if signals.is_shutdown_requested() {
            break;
        }

        tokio::select! {
            accept_result = listener.accept() => match accept_result {
                Ok((stream, peer_addr)) => {
                    accept_connection(stream, peer_addr, &state, &active_connections, surface);
                }
                Err(e) => match surface {
                    Surface::Manager => {
                        logger::log_api_error(&format!("Failed to accept connection: {e}"));
                    }
                    Surface::Viewer => {
                        logger::log_error(&format!("Failed to accept connection: {e}"));
                    }
                },
            },
            () = &mut shutdown => break,
        }
    }

    logger::log_listener_stopped(surface.name());
}
