/*!
 * Dispatch Core
 * Run-queue transitions, thread selection, context hand-off, lifecycle hooks
 *
 * State machine per thread: CanRun -> Runq (sched_add) -> chosen
 * (sched_choose) -> Running (sched_switch) -> back to Runq, or inhibited
 * (sched_sleep / sched_block) until sched_wakeup, or Exited. Violations of
 * those transitions are collaborator bugs and panic.
 */

use super::{SchedInner, Scheduler};
use crate::core::types::{CpuId, Pid, Priority, SchedResult, Tid};
use crate::core::SchedError;
use crate::cpuset::CpuSet;
use crate::sched::decay::loadfactor;
use crate::sched::priority::{estcpulim, INVERSE_ESTCPU_WEIGHT};
use crate::thread::{RunqId, SchedClass, Thread, ThreadState, PRI_MAX_ITHD};
use log::{info, trace};

/// Flags for [`Scheduler::sched_add`]
#[derive(Debug, Clone, Copy, Default)]
pub struct AddFlags {
    /// The caller is giving up the CPU; do not preempt or forward on its
    /// behalf
    pub yielding: bool,
    /// The thread was preempted; reinsert at the head of its bucket
    pub preempted: bool,
}

/// Flags for [`Scheduler::sched_switch`]
#[derive(Debug, Clone, Copy, Default)]
pub struct SwitchFlags {
    /// Involuntary switch: a more urgent thread displaced the current one
    pub preempt: bool,
}

impl Scheduler {
    // ---- lifecycle -------------------------------------------------------

    /// Register a new thread in the CanRun state; hand it to `sched_add` to
    /// make it runnable
    pub fn thread_create(&self, pid: Pid, class: SchedClass) -> Tid {
        let tid = self.alloc_tid();
        let mut inner = self.lock();
        let td = Thread::new(tid, pid, class, self.config.ncpus, self.config.slice_ticks);
        inner.threads.insert(tid, td);
        inner
            .procs
            .entry(pid)
            .or_insert_with(|| super::Proc {
                nice: 0,
                threads: Vec::new(),
            })
            .threads
            .push(tid);
        info!("thread {} created (proc {}, class {:?})", tid, pid, class);
        tid
    }

    /// Fork hook: create a child thread inheriting the parent's scheduling
    /// state (usage estimate, priorities, affinity)
    pub fn sched_fork(&self, parent: Tid, child_pid: Pid) -> SchedResult<Tid> {
        let tid = self.alloc_tid();
        let mut inner = self.lock();
        let ptd = inner
            .threads
            .get(&parent)
            .ok_or(SchedError::UnknownThread(parent))?;
        let mut child = Thread::new(
            tid,
            child_pid,
            ptd.class,
            self.config.ncpus,
            self.config.slice_ticks,
        );
        child.estcpu = ptd.estcpu;
        child.pri = ptd.base_pri;
        child.base_pri = ptd.base_pri;
        child.user_pri = ptd.user_pri;
        child.affinity = ptd.affinity;
        child.sched.affinity_restricted = ptd.sched.affinity_restricted;
        let parent_nice = inner.procs[&ptd.proc_id].nice;
        inner.threads.insert(tid, child);
        inner
            .procs
            .entry(child_pid)
            .or_insert_with(|| super::Proc {
                nice: parent_nice,
                threads: Vec::new(),
            })
            .threads
            .push(tid);
        info!("thread {} forked from {} into proc {}", tid, parent, child_pid);
        Ok(tid)
    }

    /// Exit hook: fold the child's accumulated CPU usage into the parent so
    /// fork-heavy workloads cannot shed usage history, then retire the child
    pub fn sched_exit(&self, parent: Tid, child: Tid) -> SchedResult<()> {
        let mut inner = self.lock();
        if !inner.threads.contains_key(&parent) {
            return Err(SchedError::UnknownThread(parent));
        }
        let ctd = inner
            .threads
            .get(&child)
            .ok_or(SchedError::UnknownThread(child))?;
        let child_est = ctd.estcpu;
        let child_proc = ctd.proc_id;
        if ctd.state == ThreadState::Runq {
            self.rem_locked(&mut inner, child);
        }

        let ptd = inner.thread_mut(parent);
        ptd.estcpu = estcpulim(ptd.estcpu + child_est);

        // A still-running child stays on its CPU until the next switch
        // cleans it up; anything else retires immediately.
        inner.thread_mut(child).state = ThreadState::Exited;
        if let Some(proc) = inner.procs.get_mut(&child_proc) {
            proc.threads.retain(|&t| t != child);
        }
        info!("thread {} exited ({} estcpu folded into {})", child, child_est, parent);
        Ok(())
    }

    // ---- making threads runnable ----------------------------------------

    /// Transition a thread to the Runq state and place it on a run queue
    ///
    /// `from_cpu` identifies the CPU on whose behalf the call is made; it is
    /// the preemption and wakeup-forwarding vantage point.
    pub fn sched_add(&self, tid: Tid, from_cpu: CpuId, flags: AddFlags) -> SchedResult<()> {
        let mut inner = self.lock();
        if !inner.threads.contains_key(&tid) {
            return Err(SchedError::UnknownThread(tid));
        }
        self.add_locked(&mut inner, from_cpu, tid, flags);
        Ok(())
    }

    pub(crate) fn add_locked(
        &self,
        inner: &mut SchedInner,
        from_cpu: CpuId,
        tid: Tid,
        flags: AddFlags,
    ) {
        let td = inner.thread(tid);
        assert!(
            !td.state.is_inhibited(),
            "sched_add: thread {} is inhibited ({:?})",
            tid,
            td.state
        );
        assert_eq!(
            td.state,
            ThreadState::CanRun,
            "sched_add: thread {} not ready to run",
            tid
        );
        assert!(
            td.sched.runq.is_none(),
            "sched_add: thread {} already on a run queue",
            tid
        );

        let pri = td.pri;
        let no_load = td.no_load;
        let bound = td.bound_cpu;
        let pinned = td.pinned > 0;
        let last = td.last_cpu;
        let restricted = td.sched.affinity_restricted;

        // Placement: explicit binding beats pinning beats affinity; anything
        // unrestricted goes to the global queue.
        let placement = if let Some(c) = bound {
            Some(c)
        } else if pinned {
            Some(last.unwrap_or(from_cpu))
        } else if restricted {
            Some(self.sched_pickcpu(inner, tid))
        } else {
            None
        };

        let (idx, runq_id) = match placement {
            Some(c) => (inner.cpu_runqs[c].add(tid, pri, flags.preempted), RunqId::Cpu(c)),
            None => (
                inner.global_runq.add(tid, pri, flags.preempted),
                RunqId::Global,
            ),
        };
        let td = inner.thread_mut(tid);
        td.state = ThreadState::Runq;
        td.sched.runq = Some(runq_id);
        td.sched.rqindex = idx;
        if !no_load {
            self.stats.load_add();
        }
        trace!("thread {} runnable on {:?} (pri {})", tid, runq_id, pri);

        match placement {
            // Targeted at another CPU: poke it rather than ourselves.
            Some(c) if c != from_cpu => self.kick_other_cpu(inner, pri, c),
            _ => {
                let mut forwarded = false;
                if placement.is_none() && !flags.yielding {
                    forwarded = self.forward_wakeup(inner, from_cpu);
                }
                if !forwarded && !flags.yielding {
                    self.maybe_preempt(inner, from_cpu, tid);
                }
            }
        }
    }

    /// Immediate-preemption check on the calling CPU
    ///
    /// Returns true when the newcomer displaced the running thread right
    /// here; false leaves at most a reschedule flag behind.
    fn maybe_preempt(&self, inner: &mut SchedInner, cpu: CpuId, tid: Tid) -> bool {
        let ctid = inner.cpus[cpu].current;
        if ctid == tid {
            return false;
        }
        let cpri = inner.thread(ctid).pri;
        let pri = inner.thread(tid).pri;
        if pri >= cpri {
            return false;
        }
        let cur_is_idle = ctid == inner.cpus[cpu].idle_thread;
        if !self.config.preemption
            || (!cur_is_idle && !self.config.full_preemption && pri > PRI_MAX_ITHD)
        {
            inner.thread_mut(ctid).needresched = true;
            return false;
        }
        trace!("preempting thread {} on cpu {} for thread {}", ctid, cpu, tid);
        self.switch_locked(inner, cpu, SwitchFlags { preempt: true });
        true
    }

    // ---- selection and hand-off ------------------------------------------

    /// Pick the most urgent runnable thread for `cpu` and take it off its
    /// queue; falls back to the CPU's idle thread
    pub fn sched_choose(&self, cpu: CpuId) -> Tid {
        let mut inner = self.lock();
        self.choose_locked(&mut inner, cpu)
    }

    pub(crate) fn choose_locked(&self, inner: &mut SchedInner, cpu: CpuId) -> Tid {
        let fuzz = self.config.runq_fuzz;
        let threads = &inner.threads;
        let global = inner
            .global_runq
            .choose_fuzz(fuzz, |t| threads[&t].last_cpu == Some(cpu));
        let local = inner.cpu_runqs[cpu].choose();

        let pick = match (global, local) {
            (None, None) => None,
            (Some(g), None) => Some((g, RunqId::Global)),
            (None, Some(l)) => Some((l, RunqId::Cpu(cpu))),
            (Some(g), Some(l)) => {
                let gpri = inner.thread(g).pri as usize;
                let lpri = inner.thread(l).pri as usize;
                // Favor locality: the per-CPU queue wins when its candidate
                // is at least as urgent, the global side handicapped by the
                // fuzz tolerance. Never reorders entries within one queue.
                if lpri < gpri + fuzz {
                    Some((l, RunqId::Cpu(cpu)))
                } else {
                    Some((g, RunqId::Global))
                }
            }
        };

        match pick {
            None => inner.cpus[cpu].idle_thread,
            Some((tid, rq)) => {
                let idx = inner.thread(tid).sched.rqindex;
                match rq {
                    RunqId::Global => inner.global_runq.remove(tid, idx),
                    RunqId::Cpu(c) => inner.cpu_runqs[c].remove(tid, idx),
                }
                let td = inner.thread_mut(tid);
                td.sched.runq = None;
                td.did_run = true;
                trace!("cpu {} chose thread {} from {:?}", cpu, tid, rq);
                tid
            }
        }
    }

    /// Take the current thread off `cpu` and hand the CPU to the next
    /// selection, re-enqueueing the outgoing thread if it is still runnable
    ///
    /// Returns the thread now running on `cpu`. This is the only suspension
    /// point in the scheduler; the injected context switcher is invoked
    /// under the dispatch lock and must not re-enter.
    pub fn sched_switch(&self, cpu: CpuId, flags: SwitchFlags) -> Tid {
        let mut inner = self.lock();
        self.switch_locked(&mut inner, cpu, flags)
    }

    pub(crate) fn switch_locked(
        &self,
        inner: &mut SchedInner,
        cpu: CpuId,
        flags: SwitchFlags,
    ) -> Tid {
        let cur = inner.cpus[cpu].current;
        let idle = inner.cpus[cpu].idle_thread;

        let td = inner.thread_mut(cur);
        td.last_cpu = Some(cpu);
        let was_slice_end = td.slice_end;
        td.needresched = false;
        td.slice_end = false;
        td.on_cpu = None;
        let no_load = td.no_load;

        let requeue = if cur == idle {
            td.state = ThreadState::CanRun;
            false
        } else if td.state == ThreadState::Running {
            td.state = ThreadState::CanRun;
            true
        } else {
            // Went to sleep, blocked on a lock, or exited before switching
            // out.
            false
        };

        // The outgoing thread stops counting toward load here; a requeue
        // below re-adds it, leaving the counter balanced.
        if !no_load {
            self.stats.load_rem();
        }

        if requeue {
            // Yielding insert: the outgoing thread must not immediately
            // preempt us back. Preempted threads that still had quantum
            // left resume at the head of their bucket.
            self.add_locked(
                inner,
                cpu,
                cur,
                AddFlags {
                    yielding: true,
                    preempted: flags.preempt && !was_slice_end,
                },
            );
        }

        let next = self.choose_locked(inner, cpu);
        let ntd = inner.thread_mut(next);
        ntd.state = ThreadState::Running;
        ntd.on_cpu = Some(cpu);

        if next != cur {
            inner.cpus[cpu].current = next;
            if next == idle {
                inner.idle_cpus.set(cpu);
            } else {
                inner.idle_cpus.clear(cpu);
            }
            self.stats.inc_context_switches();
            if flags.preempt {
                self.stats.inc_preemptions();
            }
            trace!("cpu {} switching {} -> {}", cpu, cur, next);
            self.switcher.switch(cpu, cur, next);
        }
        next
    }

    /// Voluntarily give up `cpu`; equal-priority threads get their turn
    pub fn sched_relinquish(&self, cpu: CpuId) -> Tid {
        self.sched_switch(cpu, SwitchFlags::default())
    }

    // ---- removing threads ------------------------------------------------

    /// Take a thread off its run queue without running it (priority
    /// relocation, teardown)
    pub fn sched_rem(&self, tid: Tid) -> SchedResult<()> {
        let mut inner = self.lock();
        if !inner.threads.contains_key(&tid) {
            return Err(SchedError::UnknownThread(tid));
        }
        self.rem_locked(&mut inner, tid);
        Ok(())
    }

    pub(crate) fn rem_locked(&self, inner: &mut SchedInner, tid: Tid) {
        let td = inner.thread(tid);
        assert!(
            td.state == ThreadState::Runq && td.sched.runq.is_some(),
            "sched_rem: thread {} not on a run queue",
            tid
        );
        let idx = td.sched.rqindex;
        let rq = td.sched.runq.unwrap();
        let no_load = td.no_load;
        match rq {
            RunqId::Global => inner.global_runq.remove(tid, idx),
            RunqId::Cpu(c) => inner.cpu_runqs[c].remove(tid, idx),
        }
        let td = inner.thread_mut(tid);
        td.sched.runq = None;
        td.state = ThreadState::CanRun;
        if !no_load {
            self.stats.load_rem();
        }
    }

    // ---- clock and sleep/wakeup -----------------------------------------

    /// Scheduler-clock tick for `cpu`: charge the running thread and detect
    /// quantum expiry
    ///
    /// Call once per hardware clock interrupt per CPU.
    pub fn sched_clock(&self, cpu: CpuId) {
        let mut inner = self.lock();
        let cur = inner.cpus[cpu].current;
        let idle = inner.cpus[cpu].idle_thread;
        let td = inner.thread_mut(cur);
        td.sched.cpticks += 1;
        td.estcpu = estcpulim(td.estcpu + 1);
        let refresh = td.estcpu % INVERSE_ESTCPU_WEIGHT == 0;
        if cur != idle {
            if td.sched.slice > 0 {
                td.sched.slice -= 1;
            }
            if td.sched.slice == 0 {
                td.sched.slice = self.config.slice_ticks;
                td.needresched = true;
                td.slice_end = true;
            }
        }
        if refresh {
            self.resetpriority(&mut inner, cur);
            self.resetpriority_thread(&mut inner, cur);
        }
    }

    /// Put the running thread to sleep; it stops accruing cpticks and starts
    /// accruing slptime at the next decay pass
    ///
    /// The caller follows up with `sched_switch` to actually leave the CPU.
    /// An optional kernel sleep priority applies to time-share threads.
    pub fn sched_sleep(&self, tid: Tid, pri: Option<Priority>) -> SchedResult<()> {
        let mut inner = self.lock();
        let td = inner
            .threads
            .get_mut(&tid)
            .ok_or(SchedError::UnknownThread(tid))?;
        assert_eq!(
            td.state,
            ThreadState::Running,
            "sched_sleep: thread {} not running",
            tid
        );
        td.sched.slptime = 0;
        td.state = ThreadState::Sleeping;
        let timeshare = td.class == SchedClass::Timeshare;
        if let Some(p) = pri {
            if timeshare {
                self.sched_prio_locked(&mut inner, tid, p);
            }
        }
        Ok(())
    }

    /// Block the running thread on a lock; priority lending applies while in
    /// this state
    pub fn sched_block(&self, tid: Tid) -> SchedResult<()> {
        let mut inner = self.lock();
        let td = inner
            .threads
            .get_mut(&tid)
            .ok_or(SchedError::UnknownThread(tid))?;
        assert_eq!(
            td.state,
            ThreadState::Running,
            "sched_block: thread {} not running",
            tid
        );
        td.sched.slptime = 0;
        td.state = ThreadState::Blocked;
        Ok(())
    }

    /// Wake an inhibited thread and make it runnable again
    ///
    /// A thread that slept across decay intervals first catches up on the
    /// decay it missed so stale usage does not depress its priority.
    pub fn sched_wakeup(&self, tid: Tid, from_cpu: CpuId) -> SchedResult<()> {
        let mut inner = self.lock();
        if !inner.threads.contains_key(&tid) {
            return Err(SchedError::UnknownThread(tid));
        }
        let loadfac = loadfactor(inner.loadavg);
        let td = inner.thread_mut(tid);
        assert!(
            matches!(td.state, ThreadState::Sleeping | ThreadState::Blocked),
            "sched_wakeup: thread {} not asleep ({:?})",
            tid,
            td.state
        );
        let slept_long = td.sched.slptime > 1;
        if slept_long {
            Self::updatepri(td, loadfac);
        }
        td.sched.slptime = 0;
        td.state = ThreadState::CanRun;
        if slept_long {
            self.resetpriority(&mut inner, tid);
        }
        self.add_locked(&mut inner, from_cpu, tid, AddFlags::default());
        Ok(())
    }

    // ---- placement restrictions -----------------------------------------

    /// Persistently bind a thread to one CPU
    pub fn sched_bind(&self, tid: Tid, cpu: CpuId) -> SchedResult<()> {
        if cpu >= self.config.ncpus {
            return Err(SchedError::InvalidCpu {
                cpu,
                ncpus: self.config.ncpus,
            });
        }
        let mut inner = self.lock();
        let (state, cur_runq, on_cpu) = {
            let td = inner
                .threads
                .get_mut(&tid)
                .ok_or(SchedError::UnknownThread(tid))?;
            td.bound_cpu = Some(cpu);
            (td.state, td.sched.runq, td.on_cpu)
        };
        info!("thread {} bound to cpu {}", tid, cpu);
        match state {
            ThreadState::Runq if cur_runq != Some(RunqId::Cpu(cpu)) => {
                self.rem_locked(&mut inner, tid);
                self.add_locked(&mut inner, cpu, tid, AddFlags::default());
            }
            ThreadState::Running if on_cpu != Some(cpu) => {
                inner.thread_mut(tid).needresched = true;
                self.kicker.wakeup(on_cpu.unwrap());
            }
            _ => {}
        }
        Ok(())
    }

    /// Release an administrative binding
    pub fn sched_unbind(&self, tid: Tid) -> SchedResult<()> {
        let mut inner = self.lock();
        let td = inner
            .threads
            .get_mut(&tid)
            .ok_or(SchedError::UnknownThread(tid))?;
        td.bound_cpu = None;
        Ok(())
    }

    /// Temporarily pin a thread to its last-used CPU; nests
    pub fn sched_pin(&self, tid: Tid) -> SchedResult<()> {
        let mut inner = self.lock();
        let td = inner
            .threads
            .get_mut(&tid)
            .ok_or(SchedError::UnknownThread(tid))?;
        td.pinned += 1;
        Ok(())
    }

    /// Undo one level of pinning
    pub fn sched_unpin(&self, tid: Tid) -> SchedResult<()> {
        let mut inner = self.lock();
        let td = inner
            .threads
            .get_mut(&tid)
            .ok_or(SchedError::UnknownThread(tid))?;
        if td.pinned == 0 {
            return Err(SchedError::NotPinned(tid));
        }
        td.pinned -= 1;
        Ok(())
    }

    /// Replace a thread's allowed-CPU set and recompute its restriction flag
    pub fn sched_affinity(&self, tid: Tid, set: CpuSet) -> SchedResult<()> {
        let allowed = set.and(&CpuSet::all(self.config.ncpus));
        if allowed.is_empty() {
            return Err(SchedError::EmptyAffinity);
        }
        let mut inner = self.lock();
        let (state, on_cpu) = {
            let td = inner
                .threads
                .get_mut(&tid)
                .ok_or(SchedError::UnknownThread(tid))?;
            td.affinity = allowed;
            td.sched.affinity_restricted = allowed.count() < self.config.ncpus;
            (td.state, td.on_cpu)
        };
        match state {
            // Re-place under the new mask.
            ThreadState::Runq => {
                let from = allowed.first_set().unwrap();
                self.rem_locked(&mut inner, tid);
                self.add_locked(&mut inner, from, tid, AddFlags::default());
            }
            ThreadState::Running if !allowed.test(on_cpu.unwrap()) => {
                inner.thread_mut(tid).needresched = true;
                self.kicker.wakeup(on_cpu.unwrap());
            }
            _ => {}
        }
        Ok(())
    }

    // ---- queries ---------------------------------------------------------

    /// Active priority of a thread
    pub fn thread_priority(&self, tid: Tid) -> SchedResult<Priority> {
        self.lock()
            .threads
            .get(&tid)
            .map(|td| td.pri)
            .ok_or(SchedError::UnknownThread(tid))
    }

    /// Computed user priority of a thread
    pub fn user_priority(&self, tid: Tid) -> SchedResult<Priority> {
        self.lock()
            .threads
            .get(&tid)
            .map(|td| td.user_pri)
            .ok_or(SchedError::UnknownThread(tid))
    }

    /// Scheduler-visible state of a thread
    pub fn thread_state(&self, tid: Tid) -> SchedResult<ThreadState> {
        self.lock()
            .threads
            .get(&tid)
            .map(|td| td.state)
            .ok_or(SchedError::UnknownThread(tid))
    }

    /// Reschedule-requested flag of a thread
    pub fn needresched(&self, tid: Tid) -> SchedResult<bool> {
        self.lock()
            .threads
            .get(&tid)
            .map(|td| td.needresched)
            .ok_or(SchedError::UnknownThread(tid))
    }
}
