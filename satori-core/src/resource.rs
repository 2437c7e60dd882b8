//! Cooperative resource limits.
//!
//! The term manager owns a [`ResourceLimit`] and hands clones of the shared
//! handle to the SAT engine and the preprocessing tactics. The limit is
//! poll-only: long-running loops call [`ResourceLimit::charge`] and abandon
//! their work with an *unknown* verdict once it returns `false`. Nothing is
//! interrupted preemptively.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

/// Shared cancellation flag plus an optional step budget.
#[derive(Debug, Default)]
pub struct ResourceLimit {
    canceled: AtomicBool,
    /// Maximum number of charged steps; 0 means unlimited.
    budget: AtomicU64,
    used: AtomicU64,
}

impl ResourceLimit {
    /// Create an unlimited, shareable limit.
    #[must_use]
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Request cancellation of all work holding this handle.
    pub fn cancel(&self) {
        self.canceled.store(true, Ordering::Relaxed);
    }

    /// Set the step budget (0 = unlimited) and reset the usage counter.
    pub fn set_budget(&self, steps: u64) {
        self.budget.store(steps, Ordering::Relaxed);
        self.used.store(0, Ordering::Relaxed);
    }

    /// Record `steps` units of work. Returns `false` once the budget is
    /// exhausted or cancellation was requested; callers must then unwind.
    pub fn charge(&self, steps: u64) -> bool {
        let used = self.used.fetch_add(steps, Ordering::Relaxed) + steps;
        if self.canceled.load(Ordering::Relaxed) {
            return false;
        }
        let budget = self.budget.load(Ordering::Relaxed);
        budget == 0 || used <= budget
    }

    /// Check the limit without charging work against it.
    #[must_use]
    pub fn exceeded(&self) -> bool {
        if self.canceled.load(Ordering::Relaxed) {
            return true;
        }
        let budget = self.budget.load(Ordering::Relaxed);
        budget != 0 && self.used.load(Ordering::Relaxed) > budget
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unlimited_by_default() {
        let limit = ResourceLimit::new();
        assert!(limit.charge(1_000_000));
        assert!(!limit.exceeded());
    }

    #[test]
    fn test_budget_exhaustion() {
        let limit = ResourceLimit::new();
        limit.set_budget(10);
        assert!(limit.charge(10));
        assert!(!limit.charge(1));
        assert!(limit.exceeded());
    }

    #[test]
    fn test_cancel() {
        let limit = ResourceLimit::new();
        assert!(limit.charge(1));
        limit.cancel();
        assert!(!limit.charge(1));
        assert!(limit.exceeded());
    }
}
