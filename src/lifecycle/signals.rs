//! OS signal handling.
//!
//! Ctrl-C triggers a graceful shutdown. A running provider call is not
//! aborted; the process exits once the input loop returns.

use tokio::task::JoinHandle;

use crate::lifecycle::shutdown::Shutdown;

/// Trigger `shutdown` on the first Ctrl-C.
pub fn spawn_ctrl_c_handler(shutdown: Shutdown) -> JoinHandle<()> {
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                tracing::info!("Interrupt received, shutting down");
                shutdown.trigger();
            }
            Err(e) => tracing::error!(error = %e, "Failed to listen for Ctrl-C"),
        }
    })
}
