/*!
 * Lock-Free Scheduler Statistics
 * Atomic counters for zero-contention tracking in hot dispatch paths
 */

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

/// Atomic scheduler statistics for lock-free updates
///
/// # Performance
/// - Cache-line aligned to prevent false sharing
/// - All counters use relaxed ordering; the load counter is the one value
///   callers may read without the dispatch lock, and a plain atomic load is
///   exactly the guarantee that query needs
#[repr(C, align(64))]
#[derive(Debug, Default)]
pub struct AtomicSchedStats {
    context_switches: AtomicU64,
    preemptions: AtomicU64,
    forward_wakeups_requested: AtomicU64,
    forward_wakeups_delivered: AtomicU64,
    load: AtomicUsize,
}

impl AtomicSchedStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Increment context switches (lock-free)
    ///
    /// # Performance
    /// Hot path - called on every CPU hand-off
    #[inline(always)]
    pub fn inc_context_switches(&self) {
        self.context_switches.fetch_add(1, Ordering::Relaxed);
    }

    /// Increment preemptions (lock-free)
    #[inline(always)]
    pub fn inc_preemptions(&self) {
        self.preemptions.fetch_add(1, Ordering::Relaxed);
    }

    /// Count a wakeup-forwarding attempt
    #[inline(always)]
    pub fn inc_forward_requested(&self) {
        self.forward_wakeups_requested.fetch_add(1, Ordering::Relaxed);
    }

    /// Count a delivered wakeup IPI
    #[inline(always)]
    pub fn inc_forward_delivered(&self) {
        self.forward_wakeups_delivered.fetch_add(1, Ordering::Relaxed);
    }

    /// Increment the runnable-thread load counter
    #[inline(always)]
    pub fn load_add(&self) {
        self.load.fetch_add(1, Ordering::Relaxed);
    }

    /// Decrement the runnable-thread load counter
    #[inline(always)]
    pub fn load_rem(&self) {
        self.load.fetch_sub(1, Ordering::Relaxed);
    }

    /// Current runnable-thread count, readable without the dispatch lock
    #[inline(always)]
    pub fn load(&self) -> usize {
        self.load.load(Ordering::Relaxed)
    }

    /// Get snapshot of current stats
    ///
    /// # Note
    /// Counter values may not be perfectly consistent with each other under
    /// concurrent updates, but each individual value is accurate. Acceptable
    /// for monitoring.
    pub fn snapshot(&self) -> SchedStats {
        SchedStats {
            context_switches: self.context_switches.load(Ordering::Relaxed),
            preemptions: self.preemptions.load(Ordering::Relaxed),
            forward_wakeups_requested: self.forward_wakeups_requested.load(Ordering::Relaxed),
            forward_wakeups_delivered: self.forward_wakeups_delivered.load(Ordering::Relaxed),
            load: self.load.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time scheduler statistics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedStats {
    pub context_switches: u64,
    pub preemptions: u64,
    pub forward_wakeups_requested: u64,
    pub forward_wakeups_delivered: u64,
    /// Threads currently counted toward the load average
    pub load: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_counter() {
        let stats = AtomicSchedStats::new();
        stats.load_add();
        stats.load_add();
        stats.load_rem();
        assert_eq!(stats.load(), 1);
    }

    #[test]
    fn test_snapshot() {
        let stats = AtomicSchedStats::new();
        stats.inc_context_switches();
        stats.inc_preemptions();
        stats.inc_forward_requested();
        let snap = stats.snapshot();
        assert_eq!(snap.context_switches, 1);
        assert_eq!(snap.preemptions, 1);
        assert_eq!(snap.forward_wakeups_requested, 1);
        assert_eq!(snap.forward_wakeups_delivered, 0);
    }
}
