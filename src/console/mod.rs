//! Status log sink.
//!
//! # Data Flow
//! ```text
//! ConnectionManager / ActionOrchestrator
//!     → StatusSink (reset / replace / append / show_error / finish)
//!     → ConsoleLog (watch channel of ConsoleSnapshot)
//!     → UI subscribers re-render on every change
//! ```
//!
//! Rendering is not done here; the binary prints snapshots, tests read them.

use tokio::sync::watch;

/// The only failure text users ever see.
pub const GENERIC_ERROR: &str = "An error occurred";

/// Append/replace log that progress and outcomes are written into.
pub trait StatusSink: Send + Sync {
    /// Clear the buffer and mark work as in progress.
    fn reset(&self);

    /// Replace the whole buffer with one line.
    fn replace(&self, line: &str);

    /// Add a line after the existing ones.
    fn append(&self, line: &str);

    /// Replace the buffer with the generic failure line and stop loading.
    fn show_error(&self);

    /// Mark work as done.
    fn finish(&self);
}

/// Point-in-time view of the log.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConsoleSnapshot {
    pub lines: Vec<String>,
    pub loading: bool,
}

impl ConsoleSnapshot {
    /// Lines separated by a blank line.
    pub fn render(&self) -> String {
        self.lines.join("\n\n")
    }
}

/// In-memory [`StatusSink`] whose content is observable through a watch channel.
#[derive(Debug)]
pub struct ConsoleLog {
    state: watch::Sender<ConsoleSnapshot>,
}

impl ConsoleLog {
    pub fn new() -> Self {
        let (state, _) = watch::channel(ConsoleSnapshot::default());
        Self { state }
    }

    /// Receive every update to the log.
    pub fn subscribe(&self) -> watch::Receiver<ConsoleSnapshot> {
        self.state.subscribe()
    }

    pub fn snapshot(&self) -> ConsoleSnapshot {
        self.state.borrow().clone()
    }

    pub fn lines(&self) -> Vec<String> {
        self.state.borrow().lines.clone()
    }
}

impl Default for ConsoleLog {
    fn default() -> Self {
        Self::new()
    }
}

impl StatusSink for ConsoleLog {
    fn reset(&self) {
        self.state.send_modify(|s| {
            s.lines.clear();
            s.loading = true;
        });
    }

    fn replace(&self, line: &str) {
        self.state.send_modify(|s| {
            s.lines.clear();
            s.lines.push(line.to_string());
        });
    }

    fn append(&self, line: &str) {
        self.state.send_modify(|s| s.lines.push(line.to_string()));
    }

    fn show_error(&self) {
        self.state.send_modify(|s| {
            s.lines.clear();
            s.lines.push(GENERIC_ERROR.to_string());
            s.loading = false;
        });
    }

    fn finish(&self) {
        self.state.send_modify(|s| s.loading = false);
    }
}
