//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Load config → Validate → Build client + wallet → Wire components
//!
//! Shutdown (shutdown.rs):
//!     Signal or `quit` → stop input loop → stop session listener → Exit
//!
//! Signals (signals.rs):
//!     SIGINT → Trigger graceful shutdown
//! ```

pub mod shutdown;
pub mod signals;
pub mod startup;

pub use shutdown::Shutdown;
pub use startup::{build_app, App, StartupError};
