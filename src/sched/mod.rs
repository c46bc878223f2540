/*!
 * Scheduler
 * Preemptive priority-decay multiprocessor dispatch core
 *
 * All mutable state (run queues, thread registry, load bookkeeping, the
 * idle-CPU mask) lives behind one dispatch lock, preserving the classic
 * single-spinlock coordination model: any CPU may run any entry point, and
 * an insertion is visible to every other CPU the moment the lock drops.
 * Machine specifics are injected through the capability traits.
 */

use crate::core::types::{CpuId, FixPt, Pid, Tid, FSCALE};
use crate::cpuset::{CpuSet, MAX_CPUS};
use crate::runq::RunQueue;
use crate::thread::{SchedClass, Thread, ThreadSnapshot, ThreadState, PRI_MAX_IDLE};
use crate::traits::{ContextSwitcher, CpuKicker, NullKicker, NullObserver, NullSwitcher, PriorityObserver};
use log::info;
use parking_lot::{Mutex, MutexGuard};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

mod decay;
mod dispatch;
mod priority;
mod smp;
mod stats;
mod task;

pub use dispatch::{AddFlags, SwitchFlags};
pub use stats::{AtomicSchedStats, SchedStats};
pub use task::{DecayCommand, DecayTask};

/// Wakeup-forwarding knobs, mirroring the historical ipiwakeup tunables
#[derive(Debug, Clone, Copy)]
pub struct ForwardWakeupConfig {
    /// Master switch for forwarding wakeup IPIs to idle CPUs
    pub enabled: bool,
    /// Find idle CPUs through the maintained idle mask
    pub use_mask: bool,
    /// Find idle CPUs by scanning per-CPU state (cross-checked against the
    /// mask when both are on)
    pub use_loop: bool,
    /// Narrow the target set to a single CPU
    pub one_cpu: bool,
    /// Prefer idle CPUs whose hyperthread sibling is also idle
    pub htt2: bool,
}

impl Default for ForwardWakeupConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            use_mask: true,
            use_loop: false,
            one_cpu: false,
            htt2: false,
        }
    }
}

/// Scheduler configuration, fixed at construction
#[derive(Debug, Clone)]
pub struct SchedConfig {
    /// Number of CPUs to dispatch across
    pub ncpus: usize,
    /// Scheduler-clock rate in ticks per second
    pub stathz: u32,
    /// Quantum length in scheduler-clock ticks
    pub slice_ticks: u32,
    /// Tolerance added to the global-queue candidate when comparing against
    /// the per-CPU queue, and the head-bucket window searched for a thread
    /// with affinity for the choosing CPU
    pub runq_fuzz: usize,
    /// Allow immediate preemption of a running thread
    pub preemption: bool,
    /// Preempt for any more urgent thread, not just interrupt-band ones
    pub full_preemption: bool,
    pub ipi_wakeup: ForwardWakeupConfig,
}

impl SchedConfig {
    pub fn new(ncpus: usize) -> Self {
        Self {
            ncpus,
            stathz: 127,
            slice_ticks: 10,
            runq_fuzz: 1,
            preemption: true,
            full_preemption: false,
            ipi_wakeup: ForwardWakeupConfig::default(),
        }
    }
}

impl Default for SchedConfig {
    fn default() -> Self {
        Self::new(1)
    }
}

/// Per-process state the scheduler cares about
#[derive(Debug)]
pub(crate) struct Proc {
    pub nice: i32,
    pub threads: Vec<Tid>,
}

/// Per-CPU dispatch state
#[derive(Debug)]
pub(crate) struct CpuState {
    /// Thread currently executing on this CPU (the idle thread when idle)
    pub current: Tid,
    pub idle_thread: Tid,
}

/// Everything the dispatch lock protects
pub(crate) struct SchedInner {
    pub threads: HashMap<Tid, Thread>,
    pub procs: HashMap<Pid, Proc>,
    /// Queue for threads any CPU may run
    pub global_runq: RunQueue,
    /// One queue per CPU for pinned/bound/affinity-restricted work
    pub cpu_runqs: Vec<RunQueue>,
    pub cpus: Vec<CpuState>,
    /// CPUs currently in their idle thread; written only when a CPU enters
    /// or leaves idle, read by any CPU under the dispatch lock
    pub idle_cpus: CpuSet,
    /// One-minute load average, fixed point
    pub loadavg: FixPt,
    pub loadav_phase: u32,
    /// Harness pinned the load average; stop tracking it
    pub loadavg_frozen: bool,
}

impl SchedInner {
    /// Registry lookup for internal paths; absence is scheduler corruption
    #[inline]
    pub fn thread(&self, tid: Tid) -> &Thread {
        self.threads
            .get(&tid)
            .unwrap_or_else(|| panic!("thread {} missing from registry", tid))
    }

    #[inline]
    pub fn thread_mut(&mut self, tid: Tid) -> &mut Thread {
        self.threads
            .get_mut(&tid)
            .unwrap_or_else(|| panic!("thread {} missing from registry", tid))
    }
}

/// The scheduler context object
///
/// Construct one per system (or per test) and share it behind an `Arc`; all
/// entry points take `&self` and serialize on the internal dispatch lock.
pub struct Scheduler {
    pub(crate) inner: Mutex<SchedInner>,
    pub(crate) stats: AtomicSchedStats,
    pub(crate) config: SchedConfig,
    pub(crate) switcher: Arc<dyn ContextSwitcher>,
    pub(crate) kicker: Arc<dyn CpuKicker>,
    pub(crate) observer: Arc<dyn PriorityObserver>,
    next_tid: AtomicU64,
}

impl Scheduler {
    /// Create a scheduler with one idle thread per CPU, all CPUs idle
    pub fn new(config: SchedConfig) -> Self {
        assert!(
            config.ncpus >= 1 && config.ncpus <= MAX_CPUS,
            "CPU count {} out of range",
            config.ncpus
        );

        let mut threads = HashMap::new();
        let mut cpus = Vec::with_capacity(config.ncpus);
        let mut idle_tids = Vec::with_capacity(config.ncpus);
        for cpu in 0..config.ncpus {
            let tid = (cpu + 1) as Tid;
            let mut td = Thread::new(tid, 0, SchedClass::Idle, config.ncpus, config.slice_ticks);
            td.pri = PRI_MAX_IDLE;
            td.base_pri = PRI_MAX_IDLE;
            td.no_load = true;
            td.bound_cpu = Some(cpu);
            td.affinity = CpuSet::single(cpu);
            td.state = ThreadState::Running;
            td.on_cpu = Some(cpu);
            threads.insert(tid, td);
            idle_tids.push(tid);
            cpus.push(CpuState {
                current: tid,
                idle_thread: tid,
            });
        }

        let mut procs = HashMap::new();
        procs.insert(
            0,
            Proc {
                nice: 0,
                threads: idle_tids,
            },
        );

        info!(
            "Scheduler initialized: {} CPUs, stathz={}, slice={} ticks",
            config.ncpus, config.stathz, config.slice_ticks
        );

        let ncpus = config.ncpus;
        Self {
            inner: Mutex::new(SchedInner {
                threads,
                procs,
                global_runq: RunQueue::new(),
                cpu_runqs: (0..ncpus).map(|_| RunQueue::new()).collect(),
                cpus,
                idle_cpus: CpuSet::all(ncpus),
                loadavg: 0,
                loadav_phase: 0,
                loadavg_frozen: false,
            }),
            stats: AtomicSchedStats::new(),
            next_tid: AtomicU64::new(ncpus as u64 + 1),
            config,
            switcher: Arc::new(NullSwitcher),
            kicker: Arc::new(NullKicker),
            observer: Arc::new(NullObserver),
        }
    }

    /// Inject the context-switch primitive
    pub fn with_switcher(mut self, switcher: Arc<dyn ContextSwitcher>) -> Self {
        self.switcher = switcher;
        self
    }

    /// Inject the IPI delivery capability
    pub fn with_kicker(mut self, kicker: Arc<dyn CpuKicker>) -> Self {
        self.kicker = kicker;
        self
    }

    /// Inject the lock-subsystem priority observer
    pub fn with_observer(mut self, observer: Arc<dyn PriorityObserver>) -> Self {
        self.observer = observer;
        self
    }

    #[inline]
    pub(crate) fn lock(&self) -> MutexGuard<'_, SchedInner> {
        self.inner.lock()
    }

    #[inline]
    pub(crate) fn alloc_tid(&self) -> Tid {
        self.next_tid.fetch_add(1, Ordering::Relaxed)
    }

    /// Number of CPUs this scheduler dispatches across
    #[inline]
    pub fn ncpus(&self) -> usize {
        self.config.ncpus
    }

    /// Current runnable-thread count
    ///
    /// # Performance
    /// Lock-free: reads a single atomic counter.
    #[inline]
    pub fn sched_load(&self) -> usize {
        self.stats.load()
    }

    /// Is there anything for `cpu` to run besides its idle thread?
    pub fn sched_runnable(&self, cpu: CpuId) -> bool {
        let inner = self.lock();
        !inner.global_runq.is_empty() || !inner.cpu_runqs[cpu].is_empty()
    }

    /// Thread currently executing on `cpu`
    pub fn curthread(&self, cpu: CpuId) -> Tid {
        self.lock().cpus[cpu].current
    }

    /// The designated idle thread of `cpu`
    pub fn idle_thread(&self, cpu: CpuId) -> Tid {
        self.lock().cpus[cpu].idle_thread
    }

    /// Counter snapshot
    pub fn stats(&self) -> SchedStats {
        self.stats.snapshot()
    }

    /// One-minute load average
    pub fn load_average(&self) -> f64 {
        crate::core::types::from_fixpt(self.lock().loadavg)
    }

    /// Pin the load average for a harness; automatic tracking stops
    pub fn set_load_average(&self, loadavg: f64) {
        let mut inner = self.lock();
        inner.loadavg = crate::core::types::to_fixpt(loadavg);
        inner.loadavg_frozen = true;
    }

    /// Point-in-time view of one thread
    pub fn thread_snapshot(&self, tid: Tid) -> crate::core::types::SchedResult<ThreadSnapshot> {
        let inner = self.lock();
        let td = inner
            .threads
            .get(&tid)
            .ok_or(crate::core::SchedError::UnknownThread(tid))?;
        Ok(Self::snapshot_of(td))
    }

    /// Point-in-time view of every registered thread
    pub fn all_snapshots(&self) -> Vec<ThreadSnapshot> {
        let inner = self.lock();
        let mut snaps: Vec<_> = inner.threads.values().map(Self::snapshot_of).collect();
        snaps.sort_by_key(|s| s.id);
        snaps
    }

    fn snapshot_of(td: &Thread) -> ThreadSnapshot {
        ThreadSnapshot {
            id: td.id,
            proc_id: td.proc_id,
            class: td.class,
            state: td.state,
            priority: td.pri,
            user_priority: td.user_pri,
            estcpu: td.estcpu,
            pctcpu: td.sched.pctcpu as f64 * 100.0 / FSCALE as f64,
            last_cpu: td.last_cpu,
            bound_cpu: td.bound_cpu,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_construction_all_cpus_idle() {
        let sched = Scheduler::new(SchedConfig::new(4));
        assert_eq!(sched.ncpus(), 4);
        assert_eq!(sched.sched_load(), 0);
        for cpu in 0..4 {
            assert_eq!(sched.curthread(cpu), sched.idle_thread(cpu));
            assert!(!sched.sched_runnable(cpu));
        }
        let inner = sched.lock();
        assert_eq!(inner.idle_cpus.count(), 4);
    }

    #[test]
    fn test_idle_threads_excluded_from_load() {
        let sched = Scheduler::new(SchedConfig::new(2));
        let inner = sched.lock();
        for cpu in 0..2 {
            let td = inner.thread(inner.cpus[cpu].idle_thread);
            assert!(td.no_load);
            assert_eq!(td.bound_cpu, Some(cpu));
        }
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn test_zero_cpus_rejected() {
        let _ = Scheduler::new(SchedConfig::new(0));
    }
}
