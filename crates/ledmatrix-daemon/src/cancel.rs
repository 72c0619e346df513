//! Cooperative cancellation shared between the remote listener and the
//! playback loop.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// A raise-once flag observed at frame boundaries.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests that the running animation stop.
    pub fn raise(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    #[cfg(test)]
    pub fn is_raised(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    /// Consumes a pending request, returning whether one was pending.
    pub fn take(&self) -> bool {
        self.0.swap(false, Ordering::SeqCst)
    }

    /// Drops any pending request.
    pub fn clear(&self) {
        self.0.store(false, Ordering::SeqCst);
    }
}
