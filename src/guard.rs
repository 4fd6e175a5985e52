use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

/// OperationGuard
///
/// Single-flight flag for session-mutating requests. The session store does not
/// queue concurrent logins, logouts or role updates, so the shell refuses to
/// start one while another is pending.
#[derive(Clone, Default)]
pub struct OperationGuard {
    in_flight: Arc<AtomicBool>,
}

impl OperationGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claims the flag, or returns `None` if an operation is already pending.
    /// The flag is released when the returned permit is dropped.
    pub fn try_begin(&self) -> Option<OperationPermit> {
        self.in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| OperationPermit {
                in_flight: Arc::clone(&self.in_flight),
            })
    }
}

/// Held for the duration of one session-mutating operation.
#[must_use = "the operation guard is released as soon as the permit is dropped"]
pub struct OperationPermit {
    in_flight: Arc<AtomicBool>,
}

impl Drop for OperationPermit {
    fn drop(&mut self) {
        self.in_flight.store(false, Ordering::Release);
    }
}
