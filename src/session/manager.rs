//! Connection state machine driver.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::broadcast::{self, error::RecvError};
use tokio::sync::watch;

use crate::blockchain::provider::ProviderFacade;
use crate::blockchain::types::{BlockchainError, Session, SessionEvent};
use crate::console::StatusSink;
use crate::session::state::ConnectionState;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("cannot {action} while {from}")]
    InvalidTransition {
        action: &'static str,
        from: ConnectionState,
    },

    #[error("wallet connection failed: {0}")]
    ConnectFailed(#[source] BlockchainError),

    #[error("connection cancelled")]
    Cancelled,
}

/// Owns the [`ConnectionState`]; the only place it is mutated.
pub struct ConnectionManager {
    provider: Arc<dyn ProviderFacade>,
    sink: Arc<dyn StatusSink>,
    state: watch::Sender<ConnectionState>,
    /// Bumped under the watch lock on every state write.
    generation: AtomicU64,
}

impl ConnectionManager {
    pub fn new(provider: Arc<dyn ProviderFacade>, sink: Arc<dyn StatusSink>) -> Self {
        let (state, _) = watch::channel(ConnectionState::Disconnected);
        Self {
            provider,
            sink,
            state,
            generation: AtomicU64::new(0),
        }
    }

    pub fn state(&self) -> ConnectionState {
        *self.state.borrow()
    }

    /// Observe state changes.
    pub fn subscribe(&self) -> watch::Receiver<ConnectionState> {
        self.state.subscribe()
    }

    /// Write the current state's line to the log without transitioning.
    pub fn announce(&self) {
        self.sink.replace(self.state().status_line());
    }

    /// Open a wallet session. Only legal while disconnected.
    pub async fn request_connect(&self) -> Result<Session, SessionError> {
        let mut from = ConnectionState::Disconnected;
        let started = self.state.send_if_modified(|state| {
            from = *state;
            if *state == ConnectionState::Disconnected {
                *state = ConnectionState::Connecting;
                self.bump();
                true
            } else {
                false
            }
        });
        if !started {
            return Err(SessionError::InvalidTransition {
                action: "connect",
                from,
            });
        }
        self.announce_transition(ConnectionState::Connecting);

        match self.provider.connect().await {
            Ok(session) => {
                let next = ConnectionState::from(session);
                let completed = self.state.send_if_modified(|state| {
                    if *state == ConnectionState::Connecting {
                        *state = next;
                        self.bump();
                        true
                    } else {
                        false
                    }
                });
                if !completed {
                    // Disconnected while the wallet was still prompting.
                    tracing::info!("Connection completed after cancellation, closing session");
                    if let Err(e) = self.provider.disconnect().await {
                        tracing::warn!(error = %e, "Failed to close cancelled session");
                    }
                    return Err(SessionError::Cancelled);
                }
                self.announce_transition(next);
                Ok(session)
            }
            Err(e) => {
                tracing::warn!(error = %e, "Wallet connection failed");
                self.transition_from(ConnectionState::Connecting, ConnectionState::Disconnected);
                Err(SessionError::ConnectFailed(e))
            }
        }
    }

    /// Tear the session down. Always ends disconnected.
    pub async fn request_disconnect(&self) -> Result<(), SessionError> {
        let from = self.state();
        if from == ConnectionState::Disconnected {
            return Err(SessionError::InvalidTransition {
                action: "disconnect",
                from,
            });
        }

        if let Err(e) = self.provider.disconnect().await {
            tracing::warn!(error = %e, "Session teardown failed");
        }
        let closed = self.state.send_if_modified(|state| {
            if *state == ConnectionState::Disconnected {
                return false;
            }
            *state = ConnectionState::Disconnected;
            self.bump();
            true
        });
        if closed {
            self.announce_transition(ConnectionState::Disconnected);
        }
        Ok(())
    }

    /// Re-derive the state from the session the wallet reports now.
    ///
    /// Ignored while a connect is pending; its result decides the state. The
    /// answer is also dropped when any transition landed while the provider
    /// was being asked, so a stale read never undoes a connect or disconnect.
    pub async fn refresh(&self) -> ConnectionState {
        let (entry, generation) = {
            let state = self.state.borrow();
            (*state, self.generation.load(Ordering::SeqCst))
        };
        if entry == ConnectionState::Connecting {
            return entry;
        }

        let next = match self.provider.current_session().await {
            Ok(session) => ConnectionState::from(session),
            Err(e) => {
                tracing::warn!(error = %e, "Could not read wallet session, treating as gone");
                ConnectionState::Disconnected
            }
        };

        let mut stale = false;
        let changed = self.state.send_if_modified(|state| {
            if self.generation.load(Ordering::SeqCst) != generation {
                stale = true;
                return false;
            }
            if *state == next {
                return false;
            }
            *state = next;
            self.bump();
            true
        });
        if stale {
            tracing::debug!(read = %next, "Dropping session read overtaken by a transition");
        }
        if changed {
            self.announce_transition(next);
        }
        self.state()
    }

    /// Refresh on every session notification until the provider closes the
    /// stream or shutdown fires.
    pub async fn run_event_listener(
        &self,
        mut events: broadcast::Receiver<SessionEvent>,
        mut shutdown: broadcast::Receiver<()>,
    ) {
        loop {
            tokio::select! {
                _ = shutdown.recv() => break,
                event = events.recv() => match event {
                    Ok(event) => {
                        tracing::debug!(?event, "Session event");
                        self.refresh().await;
                    }
                    Err(RecvError::Lagged(skipped)) => {
                        tracing::warn!(skipped, "Missed session events");
                        self.refresh().await;
                    }
                    Err(RecvError::Closed) => break,
                },
            }
        }
        tracing::debug!("Session event listener stopped");
    }

    /// Move to `next` only if the state is still `from`.
    fn transition_from(&self, from: ConnectionState, next: ConnectionState) {
        let moved = self.state.send_if_modified(|state| {
            if *state != from {
                return false;
            }
            *state = next;
            self.bump();
            true
        });
        if moved {
            self.announce_transition(next);
        }
    }

    fn bump(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
    }

    fn announce_transition(&self, next: ConnectionState) {
        tracing::info!(state = %next, "Connection state changed");
        self.sink.append(next.status_line());
    }
}
