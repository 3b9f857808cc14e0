// Signal handling module
//
// Ctrl+C (and SIGTERM on Unix) trip a single Notify that the accept loop
// selects on. Tests trip the same Notify directly, so shutdown needs no
// process-level signals there.

use std::sync::Arc;
use tokio::sync::Notify;

use crate::logger;

/// Spawn the signal watcher and return the shutdown handle
///
/// The Notify holds a permit, so a signal that arrives before the accept
/// loop starts waiting is not lost.
pub fn spawn_shutdown_listener() -> Arc<Notify> {
    let shutdown = Arc::new(Notify::new());
    spawn_watcher(Arc::clone(&shutdown));
    shutdown
}

#[cfg(unix)]
fn spawn_watcher(shutdown: Arc<Notify>) {
    use tokio::signal::unix::{signal, SignalKind};

    tokio::spawn(async move {
        let Ok(mut sigterm) = signal(SignalKind::terminate()) else {
            logger::log_error("Failed to register SIGTERM handler");
            return;
        };
        let Ok(mut sigint) = signal(SignalKind::interrupt()) else {
            logger::log_error("Failed to register SIGINT handler");
            return;
        };

        tokio::select! {
            _ = sigterm.recv() => logger::log_shutdown_signal("SIGTERM"),
            _ = sigint.recv() => logger::log_shutdown_signal("SIGINT"),
        }

        shutdown.notify_one();
    });
}

/// Windows fallback, only Ctrl+C is supported
#[cfg(not(unix))]
fn spawn_watcher(shutdown: Arc<Notify>) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            logger::log_shutdown_signal("Ctrl+C");
            shutdown.notify_one();
        }
    });
}
