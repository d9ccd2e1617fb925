//! Shutdown coordination for the console.

use tokio::sync::broadcast;

/// Coordinator for graceful shutdown.
///
/// Provides a broadcast channel that the input loop and the session listener
/// subscribe to.
#[derive(Clone)]
pub struct Shutdown {
    /// Broadcast channel sender.
    tx: broadcast::Sender<()>,
}

impl Shutdown {
    /// Create a new shutdown coordinator.
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(1);
        Self { tx }
    }

    /// Subscribe to the shutdown signal.
    pub fn subscribe(&self) -> broadcast::Receiver<()> {
        self.tx.subscribe()
    }

    /// Trigger the shutdown signal.
    pub fn trigger(&self) {
        let _ = self.tx.send(());
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}
