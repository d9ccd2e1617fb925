//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → tracing events (structured fields, never key material)
//!     → spans per action run (kind + run_id)
//!
//! Consumers:
//!     → stderr, pretty or JSON lines
//! ```
//!
//! The status log is the user channel; tracing is the diagnostic channel and
//! the only place raw provider errors appear.

pub mod logging;

pub use logging::init_logging;
