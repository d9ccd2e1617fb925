//! Single-flight guard.
//!
//! Contenders are rejected, never queued. The permit clears the flag when
//! dropped, so every exit path releases it: normal return, `?`, panic, or the
//! caller dropping the future mid-await.

use std::sync::atomic::{AtomicBool, Ordering};

#[derive(Debug, Default)]
pub struct InFlightGuard {
    busy: AtomicBool,
}

/// Proof that the holder owns the guard. Releases on drop.
#[derive(Debug)]
pub struct FlightPermit<'a> {
    guard: &'a InFlightGuard,
}

impl InFlightGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take the guard, or `None` if an action already holds it.
    pub fn try_acquire(&self) -> Option<FlightPermit<'_>> {
        self.busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| FlightPermit { guard: self })
    }

    pub fn is_held(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }
}

impl Drop for FlightPermit<'_> {
    fn drop(&mut self) {
        self.guard.busy.store(false, Ordering::Release);
    }
}
