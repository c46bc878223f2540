/*!
 * Thread Model
 * Schedulable entity state plus the scheduler's per-thread extension record
 */

use crate::core::types::{CpuId, FixPt, Pid, Priority, Tid};
use crate::cpuset::CpuSet;
use serde::{Deserialize, Serialize};

// Priority bands, 0-255 with lower numerically meaning more urgent.
pub const PRI_MIN: Priority = 0;
pub const PRI_MAX: Priority = 255;
pub const PRI_MIN_ITHD: Priority = 16;
pub const PRI_MAX_ITHD: Priority = 47;
pub const PRI_MIN_REALTIME: Priority = 48;
pub const PRI_MAX_REALTIME: Priority = 79;
pub const PRI_MIN_KERN: Priority = 80;
pub const PRI_MAX_KERN: Priority = 119;
pub const PRI_MIN_TIMESHARE: Priority = 120;
pub const PRI_MAX_TIMESHARE: Priority = 223;
pub const PRI_MIN_IDLE: Priority = 224;
pub const PRI_MAX_IDLE: Priority = 255;

/// Time-share priority of a nice-0 thread with no accumulated CPU usage
pub const PUSER: Priority = 140;

/// Nice value bounds
pub const NICE_MIN: i32 = -20;
pub const NICE_MAX: i32 = 20;

/// Scheduling class, selecting a base priority band
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SchedClass {
    /// Interrupt threads, most urgent band
    Interrupt,
    /// Fixed real-time priorities
    Realtime,
    /// Decay-scheduled user threads
    Timeshare,
    /// Only runs when nothing else will
    Idle,
}

impl SchedClass {
    /// Default priority for a freshly created thread of this class
    pub const fn default_priority(&self) -> Priority {
        match self {
            Self::Interrupt => PRI_MIN_ITHD,
            Self::Realtime => PRI_MIN_REALTIME,
            Self::Timeshare => PUSER,
            Self::Idle => PRI_MAX_IDLE,
        }
    }
}

/// Thread states as the scheduler sees them
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ThreadState {
    /// Ready to be handed to sched_add (never run, or just taken off a CPU)
    CanRun,
    /// Enqueued on a run queue, waiting for a CPU
    Runq,
    /// Executing on some CPU
    Running,
    /// Inhibited: voluntarily sleeping (I/O, timers)
    Sleeping,
    /// Inhibited: blocked on a lock, subject to priority lending
    Blocked,
    /// Terminal
    Exited,
}

impl ThreadState {
    /// True when the thread may not be put on a run queue
    #[inline]
    pub fn is_inhibited(&self) -> bool {
        matches!(self, Self::Sleeping | Self::Blocked | Self::Exited)
    }
}

/// Identity of the run queue currently holding a thread
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunqId {
    Global,
    Cpu(CpuId),
}

/// Scheduler extension record, one per thread
///
/// `cpticks` and `slptime` are mutually exclusive accounting: each decay
/// interval credits a thread with one or the other, never both.
#[derive(Debug, Clone, Default)]
pub struct TdSched {
    /// Decayed CPU percentage estimate, fixed point; reporting only
    pub pctcpu: FixPt,
    /// Scheduler-clock ticks since the last decay pass
    pub cpticks: u32,
    /// Decay intervals spent asleep since last run
    pub slptime: u32,
    /// Run queue currently holding the thread, if any
    pub runq: Option<RunqId>,
    /// Bucket index within that run queue
    pub rqindex: usize,
    /// Remaining scheduler-clock ticks in the current quantum
    pub slice: u32,
    /// Affinity excludes at least one present CPU
    pub affinity_restricted: bool,
}

/// A schedulable entity
#[derive(Debug, Clone)]
pub struct Thread {
    pub id: Tid,
    pub proc_id: Pid,
    pub class: SchedClass,
    pub state: ThreadState,

    /// Active priority, possibly lent
    pub pri: Priority,
    /// Priority before any lending
    pub base_pri: Priority,
    /// Computed time-share priority (resetpriority output)
    pub user_pri: Priority,
    /// Active priority is currently lent from a lock waiter
    pub borrowing: bool,

    /// Long-term decayed CPU usage estimate, drives time-share priority
    pub estcpu: u32,

    /// Ran at some point since the last decay pass
    pub did_run: bool,
    /// A more urgent thread is waiting; reschedule at the next opportunity
    pub needresched: bool,
    /// The last switch-out was due to quantum expiry
    pub slice_end: bool,
    /// Excluded from the load average (idle threads)
    pub no_load: bool,

    /// Nesting count of temporary pins to the last-used CPU
    pub pinned: u32,
    /// Persistent administrative binding to one CPU
    pub bound_cpu: Option<CpuId>,
    /// CPU the thread last ran on
    pub last_cpu: Option<CpuId>,
    /// CPU currently executing the thread, if running
    pub on_cpu: Option<CpuId>,
    /// CPUs the thread is allowed to run on
    pub affinity: CpuSet,

    pub sched: TdSched,
}

impl Thread {
    pub fn new(id: Tid, proc_id: Pid, class: SchedClass, ncpus: usize, slice: u32) -> Self {
        let pri = class.default_priority();
        Self {
            id,
            proc_id,
            class,
            state: ThreadState::CanRun,
            pri,
            base_pri: pri,
            user_pri: pri,
            borrowing: false,
            estcpu: 0,
            did_run: false,
            needresched: false,
            slice_end: false,
            no_load: false,
            pinned: 0,
            bound_cpu: None,
            last_cpu: None,
            on_cpu: None,
            affinity: CpuSet::all(ncpus),
            sched: TdSched {
                slice,
                ..TdSched::default()
            },
        }
    }

    /// THREAD_CAN_SCHED: is this thread allowed to run on `cpu`?
    #[inline]
    pub fn can_sched(&self, cpu: CpuId) -> bool {
        self.affinity.test(cpu)
    }
}

/// Point-in-time view of a thread, for reporting surfaces
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThreadSnapshot {
    pub id: Tid,
    pub proc_id: Pid,
    pub class: SchedClass,
    pub state: ThreadState,
    pub priority: Priority,
    pub user_priority: Priority,
    pub estcpu: u32,
    /// Recent CPU utilization in percent
    pub pctcpu: f64,
    pub last_cpu: Option<CpuId>,
    pub bound_cpu: Option<CpuId>,
}
