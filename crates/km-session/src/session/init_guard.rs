use std::sync::atomic::{AtomicBool, Ordering};

/// Holds the initialization latch; releases it on drop
pub(crate) struct InitGuard<'a> {
    latch: &'a AtomicBool,
}

impl<'a> InitGuard<'a> {
    /// `None` when another initialization is already running
    pub(crate) fn acquire(latch: &'a AtomicBool) -> Option<Self> {
        latch
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self { latch })
    }
}

impl Drop for InitGuard<'_> {
    fn drop(&mut self) {
        self.latch.store(false, Ordering::Release);
    }
}
