//! Action orchestration subsystem.
//!
//! # Data Flow
//! ```text
//! UI event (ActionRequest)
//!     → guard.rs (single flight: reject while another action runs)
//!     → orchestrator.rs (connection precondition, then provider calls in order)
//!     → StatusSink (progress lines, then final line or the generic error)
//!     → ActionOutcome returned to the caller
//! ```
//!
//! # Design Decisions
//! - Contenders are rejected, not queued
//! - Provider error detail goes to tracing only
//! - No timeouts or retries at this layer; the RPC client owns timeouts

pub mod guard;
pub mod orchestrator;
pub mod types;
pub mod units;

pub use guard::InFlightGuard;
pub use orchestrator::{ActionOrchestrator, ActionSettings};
pub use types::{ActionError, ActionOutcome, ActionRequest};
