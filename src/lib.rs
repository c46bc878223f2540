/*!
 * Timeshare Scheduler
 * Preemptive priority-decay thread scheduler with multiprocessor dispatch
 *
 * The classic time-sharing design: thread priorities are recomputed from an
 * exponentially decayed CPU-usage estimator and a per-process nice value, so
 * CPU hogs drift down the priority space and interactive work bubbles up.
 * Runnable threads live in priority-bucketed run queues, one global queue
 * plus one per CPU for pinned, bound, and affinity-restricted work, and a
 * best-effort IPI forwarding layer shortens wakeup latency on idle CPUs.
 *
 * The scheduler is a passive context object: it owns every thread record and
 * all queue state behind one dispatch lock, and the embedding system drives
 * it through the entry points (`sched_add`, `sched_switch`, `sched_clock`,
 * `schedcpu`, ...) while supplying machine behavior through the capability
 * traits in [`traits`].
 */

pub mod core;
pub mod cpuset;
pub mod runq;
pub mod sched;
pub mod thread;
pub mod traits;

pub use crate::core::errors::SchedError;
pub use crate::core::types::{CpuId, FixPt, Pid, Priority, SchedResult, Tid};
pub use crate::cpuset::CpuSet;
pub use crate::sched::{
    AddFlags, DecayCommand, DecayTask, ForwardWakeupConfig, SchedConfig, SchedStats, Scheduler,
    SwitchFlags,
};
pub use crate::thread::{SchedClass, ThreadSnapshot, ThreadState};
pub use crate::traits::{ContextSwitcher, CpuKicker, PriorityObserver};
