//! Wallet session subsystem.
//!
//! # Data Flow
//! ```text
//! UI connect / disconnect
//!     → manager.rs (guards legal transitions, calls the provider)
//!     → state.rs (ConnectionState published on a watch channel)
//!     → StatusSink (one line per transition)
//!
//! Provider session events (account/chain switch, revocation)
//!     → manager.rs refresh (re-read the session, never assume it survived)
//! ```

pub mod manager;
pub mod state;

pub use manager::{ConnectionManager, SessionError};
pub use state::ConnectionState;
