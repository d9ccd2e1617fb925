//! Wallet connection states.
//!
//! # State Transitions
//! ```text
//! Disconnected → Connecting: request_connect
//! Connecting → Connected: provider opened a session
//! Connecting → Disconnected: provider failed, user cancelled or disconnected
//! Connected → Disconnected: request_disconnect, or the session disappeared
//! Connected → Connected: the wallet switched account or chain
//! ```

use alloy::primitives::Address;
use std::fmt;

use crate::blockchain::types::{ChainId, Session};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionState {
    #[default]
    Disconnected,
    Connecting,
    Connected { account: Address, chain_id: ChainId },
}

impl ConnectionState {
    pub fn is_connected(&self) -> bool {
        matches!(self, ConnectionState::Connected { .. })
    }

    /// Account of the active session.
    pub fn account(&self) -> Option<Address> {
        match self {
            ConnectionState::Connected { account, .. } => Some(*account),
            _ => None,
        }
    }

    /// Line written to the status log on entering this state.
    pub fn status_line(&self) -> &'static str {
        match self {
            ConnectionState::Disconnected => "wallet not connected. connect a wallet to use actions",
            ConnectionState::Connecting => "wallet connecting",
            ConnectionState::Connected { .. } => "wallet connected",
        }
    }
}

impl From<Session> for ConnectionState {
    fn from(session: Session) -> Self {
        ConnectionState::Connected {
            account: session.account,
            chain_id: session.chain_id,
        }
    }
}

impl From<Option<Session>> for ConnectionState {
    fn from(session: Option<Session>) -> Self {
        session.map(Into::into).unwrap_or(ConnectionState::Disconnected)
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConnectionState::Disconnected => f.write_str("disconnected"),
            ConnectionState::Connecting => f.write_str("connecting"),
            ConnectionState::Connected { account, chain_id } => {
                write!(f, "connected ({} on chain {})", account, chain_id)
            }
        }
    }
}
