/*!
 * Scheduler Traits
 * Injected capabilities at the subsystem boundaries
 *
 * The scheduler core never touches machine state directly: the context-switch
 * primitive, inter-processor interrupts, and the lock subsystem's wait-queue
 * re-sort are all narrow interfaces supplied at construction. Tests and
 * harnesses inject recording fakes; the defaults do nothing.
 */

use crate::core::types::{CpuId, Priority, Tid};

/// Low-level context hand-off primitive
///
/// Called under the dispatch lock at the single point where a CPU transfers
/// control between threads. Implementations must not re-enter the scheduler.
pub trait ContextSwitcher: Send + Sync {
    /// Suspend `from`'s execution context and resume `to`'s
    fn switch(&self, cpu: CpuId, from: Tid, to: Tid);
}

/// Inter-processor interrupt delivery
///
/// Both operations are best-effort latency optimizations; dropping them on
/// the floor never affects correctness.
pub trait CpuKicker: Send + Sync {
    /// Prompt `cpu` to re-evaluate its run queue at the next return point
    fn wakeup(&self, cpu: CpuId);

    /// Force an immediate reschedule on `cpu`
    fn preempt(&self, cpu: CpuId);
}

/// Lock-subsystem callback for priority changes
///
/// When a thread blocked on a lock changes priority, the lock's wait queue
/// may need re-sorting so priority inheritance propagates correctly.
pub trait PriorityObserver: Send + Sync {
    fn priority_changed(&self, tid: Tid, old: Priority, new: Priority);
}

/// Default no-op context switcher
#[derive(Debug, Default)]
pub struct NullSwitcher;

impl ContextSwitcher for NullSwitcher {
    fn switch(&self, _cpu: CpuId, _from: Tid, _to: Tid) {}
}

/// Default no-op IPI sink
#[derive(Debug, Default)]
pub struct NullKicker;

impl CpuKicker for NullKicker {
    fn wakeup(&self, _cpu: CpuId) {}
    fn preempt(&self, _cpu: CpuId) {}
}

/// Default no-op priority observer
#[derive(Debug, Default)]
pub struct NullObserver;

impl PriorityObserver for NullObserver {
    fn priority_changed(&self, _tid: Tid, _old: Priority, _new: Priority) {}
}
