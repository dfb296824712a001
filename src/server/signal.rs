// Signal handling module
//
// SIGTERM and SIGINT (Ctrl+C) both request a graceful shutdown.

use std::sync::Arc;

use tokio::sync::Notify;

use crate::logger;

/// Spawn a task that notifies `shutdown` once a stop signal arrives.
///
/// Uses `notify_one` so a signal delivered before the server loop starts
/// waiting is not lost.
pub fn start_signal_handler(shutdown: Arc<Notify>) {
    tokio::spawn(async move {
        match wait_for_stop_signal().await {
            Ok(name) => {
                logger::log_info(&format!("[SIGNAL] {name} received, shutting down"));
                shutdown.notify_one();
            }
            Err(e) => logger::log_error(&format!("Failed to register signal handlers: {e}")),
        }
    });
}

#[cfg(unix)]
async fn wait_for_stop_signal() -> std::io::Result<&'static str> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigint = signal(SignalKind::interrupt())?;

    tokio::select! {
        _ = sigterm.recv() => Ok("SIGTERM"),
        _ = sigint.recv() => Ok("SIGINT"),
    }
}

#[cfg(not(unix))]
async fn wait_for_stop_signal() -> std::io::Result<&'static str> {
    tokio::signal::ctrl_c().await?;
    Ok("Ctrl+C")
}
