//! Cancellation for effects that would otherwise run forever.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Cloneable stop flag shared between an effect and whoever embeds it.
///
/// Once stopped, a handle stays stopped.
#[derive(Debug, Clone, Default)]
pub struct StopHandle {
    stopped: Arc<AtomicBool>,
}

impl StopHandle {
    /// Create a handle that is still running.
    pub fn new() -> Self {
        Self::default()
    }

    /// Signal every clone of this handle to stop.
    pub fn stop(&self) {
        self.stopped.store(true, Ordering::Relaxed);
    }

    /// Whether [`stop`](Self::stop) has been called on any clone.
    pub fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::Relaxed)
    }
}
