// Signal handling module (nginx-style)
//
// Supported signals:
// - SIGHUP:  Reload the viewer's component table from disk
// - SIGTERM: Graceful shutdown
// - SIGINT:  Graceful shutdown (Ctrl+C)

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::Notify;

use crate::config::AppState;
use crate::logger;

/// Signal handler state
pub struct SignalHandler {
    /// Shutdown signal (SIGTERM, SIGINT)
    pub shutdown: Notify,
    /// Whether shutdown has been requested
    shutdown_requested: AtomicBool,
}

impl SignalHandler {
    pub const fn new() -> Self {
        Self {
            shutdown: Notify::const_new(),
            shutdown_requested: AtomicBool::new(false),
        }
    }

    pub fn is_shutdown_requested(&self) -> bool {
        self.shutdown_requested.load(Ordering::SeqCst)
    }

    /// Flag shutdown and wake every server loop
    pub fn request_shutdown(&self) {
        self.shutdown_requested.store(true, Ordering::SeqCst);
        self.shutdown.notify_waiters();
    }
}

impl Default for SignalHandler {
    fn default() -> Self {
        Self::new()
    }
}

/// Start signal handlers (Unix only)
///
/// Registration happens before this returns, so a failure is reported to
/// the caller instead of inside the background task.
///
/// | Signal  | Action                 | Nginx Equivalent  |
/// |---------|------------------------|-------------------|
/// | SIGHUP  | Reload component table | `nginx -s reload` |
/// | SIGTERM | Graceful stop          | `nginx -s stop`   |
/// | SIGINT  | Graceful stop          | Ctrl+C            |
#[cfg(unix)]
pub fn start_signal_handler(
    handler: Arc<SignalHandler>,
    state: Arc<AppState>,
) -> std::io::Result<()> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut sighup = signal(SignalKind::hangup())?;
    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigint = signal(SignalKind::interrupt())?;

    logger::log_signals_registered(std::process::id());

    tokio::spawn(async move {
        loop {
            tokio::select! {
                _ = sighup.recv() => {
                    logger::log_reload_triggered();
                    state.reload_table().await;
                }
                _ = sigterm.recv() => {
                    logger::log_shutdown("SIGTERM");
                    handler.request_shutdown();
                    break;
                }
                _ = sigint.recv() => {
                    logger::log_shutdown("SIGINT");
                    handler.request_shutdown();
                    break;
                }
            }
        }
    });

    Ok(())
}

/// Non-unix fallback - only handles Ctrl+C
#[cfg(not(unix))]
pub fn start_signal_handler(
    handler: Arc<SignalHandler>,
    _state: Arc<AppState>,
) -> std::io::Result<()> {
    tokio::spawn(async move {
        if let Ok(()) = tokio::signal::ctrl_c().await {
            logger::log_shutdown("Ctrl+C");
            handler.request_shutdown();
        }
    });
    Ok(())
}
