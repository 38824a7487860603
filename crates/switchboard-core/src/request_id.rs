//! Request tickets for latest-only async results.
//!
//! A response is applied only if its ticket is still the newest one issued.
//! Starting another request or calling [`RequestGate::cancel`] makes every
//! earlier ticket stale.

use std::sync::atomic::{AtomicU64, Ordering};

/// Opaque request id for matching async results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RequestId(u64);

/// Issues tickets and answers whether a ticket is still current.
#[derive(Debug, Default)]
pub struct RequestGate {
    current: AtomicU64,
}

impl RequestGate {
    /// Start a new request and mark it as the active one.
    pub fn begin(&self) -> RequestId {
        RequestId(self.current.fetch_add(1, Ordering::SeqCst).wrapping_add(1))
    }

    /// Supersede any in-flight request.
    pub fn cancel(&self) {
        self.current.fetch_add(1, Ordering::SeqCst);
    }

    /// Returns true if no newer request or cancellation happened since `id`.
    pub fn is_active(&self, id: RequestId) -> bool {
        self.current.load(Ordering::SeqCst) == id.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_latest_request_is_active() {
        let gate = RequestGate::default();
        let first = gate.begin();
        let second = gate.begin();
        assert!(!gate.is_active(first));
        assert!(gate.is_active(second));
    }

    #[test]
    fn test_cancel_supersedes_outstanding() {
        let gate = RequestGate::default();
        let id = gate.begin();
        gate.cancel();
        assert!(!gate.is_active(id));
    }
}
