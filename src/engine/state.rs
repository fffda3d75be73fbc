use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Single-slot "reload in progress" flag.
#[derive(Debug, Clone, Default)]
pub struct ReloadState {
    running: Arc<AtomicBool>,
}

/// Holds the RUNNING slot; the flag returns to IDLE when this is dropped.
#[derive(Debug)]
pub struct ReloadGuard {
    running: Arc<AtomicBool>,
}

impl ReloadState {
    /// Starts IDLE.
    pub fn new() -> Self {
        Self::default()
    }

    /// Atomically moves IDLE -> RUNNING. Returns None if a reload already runs.
    pub fn try_begin(&self) -> Option<ReloadGuard> {
        self.running
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| ReloadGuard {
                running: self.running.clone(),
            })
    }

    /// True while a `ReloadGuard` is alive.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }
}

impl Drop for ReloadGuard {
    fn drop(&mut self) {
        self.running.store(false, Ordering::Release);
    }
}
