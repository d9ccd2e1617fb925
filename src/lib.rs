//! Wallet console library.
//!
//! Connects a wallet to a chain node and runs a fixed menu of actions
//! against it, one at a time, reporting progress to an observable status log.

pub mod actions;
pub mod blockchain;
pub mod config;
pub mod console;
pub mod lifecycle;
pub mod observability;
pub mod session;

pub use actions::{ActionOrchestrator, ActionOutcome, ActionRequest};
pub use blockchain::ProviderFacade;
pub use config::ConsoleConfig;
pub use console::{ConsoleLog, StatusSink};
pub use session::{ConnectionManager, ConnectionState};
