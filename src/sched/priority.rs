/*!
 * Priority Model
 * Time-share priority computation, priority lending, nice handling
 */

use super::{SchedInner, Scheduler};
use crate::core::types::{Pid, Priority, SchedResult, Tid};
use crate::core::SchedError;
use crate::runq::{bucket_of, RQ_PPQ};
use crate::sched::dispatch::AddFlags;
use crate::thread::{
    SchedClass, ThreadState, NICE_MAX, NICE_MIN, PRI_MAX_TIMESHARE, PRI_MIN_TIMESHARE, PUSER,
};
use log::debug;

/// Priority points per unit of decayed CPU usage: estcpu/8 feeds the
/// time-share priority offset
pub const INVERSE_ESTCPU_WEIGHT: u32 = 8;

/// Priority points per nice unit
pub const NICE_WEIGHT: i32 = 1;

/// Ceiling on the decayed CPU-usage estimator, chosen so the usage and nice
/// offsets together stay inside the time-share band
pub const ESTCPU_MAX: u32 =
    INVERSE_ESTCPU_WEIGHT * ((NICE_MAX - NICE_MIN) as u32 * NICE_WEIGHT as u32 - RQ_PPQ as u32)
        + INVERSE_ESTCPU_WEIGHT
        - 1;

/// Clamp an estcpu accumulator to its ceiling
#[inline]
pub fn estcpulim(estcpu: u32) -> u32 {
    estcpu.min(ESTCPU_MAX)
}

impl Scheduler {
    /// Recompute the user priority of a time-share thread from its decayed
    /// CPU usage and its process's nice value
    ///
    /// Only the user priority changes here; pushing it into the active
    /// priority is `resetpriority_thread`'s job.
    pub(crate) fn resetpriority(&self, inner: &mut SchedInner, tid: Tid) {
        let td = inner.thread(tid);
        if td.class != SchedClass::Timeshare {
            return;
        }
        let nice = inner.procs[&td.proc_id].nice;
        let raw = PUSER as i32 + (td.estcpu / INVERSE_ESTCPU_WEIGHT) as i32 + NICE_WEIGHT * nice;
        let newpriority = raw.clamp(PRI_MIN_TIMESHARE as i32, PRI_MAX_TIMESHARE as i32) as Priority;
        inner.thread_mut(tid).user_pri = newpriority;
    }

    /// Push a recomputed user priority into the active priority, unless the
    /// active priority currently sits outside the time-share band (the thread
    /// is boosted or lent elsewhere)
    pub(crate) fn resetpriority_thread(&self, inner: &mut SchedInner, tid: Tid) {
        let td = inner.thread(tid);
        if td.pri < PRI_MIN_TIMESHARE || td.pri > PRI_MAX_TIMESHARE {
            return;
        }
        let user = td.user_pri;
        self.sched_prio_locked(inner, tid, user);
        self.maybe_resched(inner, tid);
    }

    /// Preemption evaluation after a priority change: if the thread is
    /// running and a more urgent candidate waits on a queue it could drain,
    /// flag it for reschedule rather than waiting for the next tick
    fn maybe_resched(&self, inner: &mut SchedInner, tid: Tid) {
        let td = inner.thread(tid);
        let cpu = match (td.state, td.on_cpu) {
            (ThreadState::Running, Some(cpu)) => cpu,
            _ => return,
        };
        let pri = td.pri;
        let global = inner.global_runq.choose().map(|t| inner.thread(t).pri);
        let local = inner.cpu_runqs[cpu].choose().map(|t| inner.thread(t).pri);
        let best = match (global, local) {
            (Some(g), Some(l)) => Some(g.min(l)),
            (a, b) => a.or(b),
        };
        if let Some(best) = best {
            if best < pri {
                inner.thread_mut(tid).needresched = true;
            }
        }
    }

    /// Set the active priority, relocating the thread to the matching
    /// run-queue bucket when necessary
    ///
    /// A bucket change is always remove + reinsert; the queues never carry a
    /// thread whose priority maps elsewhere.
    pub(crate) fn sched_priority_locked(&self, inner: &mut SchedInner, tid: Tid, prio: Priority) {
        let td = inner.thread_mut(tid);
        if td.pri == prio {
            return;
        }
        td.pri = prio;
        if td.state == ThreadState::Runq && td.sched.rqindex != bucket_of(prio) {
            let from = td.last_cpu.unwrap_or(0);
            self.rem_locked(inner, tid);
            self.add_locked(
                inner,
                from,
                tid,
                AddFlags {
                    yielding: true,
                    preempted: false,
                },
            );
        }
    }

    /// Set a thread's base priority
    ///
    /// While the thread is borrowing a more urgent priority the active value
    /// stays put; it catches up when the loan is released. A change to a
    /// lock-blocked thread is reported to the lock subsystem so it can
    /// re-sort its wait queue.
    pub(crate) fn sched_prio_locked(&self, inner: &mut SchedInner, tid: Tid, prio: Priority) {
        let td = inner.thread_mut(tid);
        td.base_pri = prio;
        if td.borrowing && td.pri < prio {
            return;
        }
        let oldpri = td.pri;
        self.sched_priority_locked(inner, tid, prio);
        let td = inner.thread(tid);
        if td.state == ThreadState::Blocked && td.pri != oldpri {
            let newpri = td.pri;
            self.observer.priority_changed(tid, oldpri, newpri);
        }
    }

    pub(crate) fn lend_prio_locked(&self, inner: &mut SchedInner, tid: Tid, prio: Priority) {
        inner.thread_mut(tid).borrowing = true;
        self.sched_priority_locked(inner, tid, prio);
    }

    /// Set the base priority of a thread
    pub fn sched_prio(&self, tid: Tid, prio: Priority) -> SchedResult<()> {
        let mut inner = self.lock();
        if !inner.threads.contains_key(&tid) {
            return Err(SchedError::UnknownThread(tid));
        }
        self.sched_prio_locked(&mut inner, tid, prio);
        Ok(())
    }

    /// Set the user priority of a thread directly
    pub fn sched_user_prio(&self, tid: Tid, prio: Priority) -> SchedResult<()> {
        let mut inner = self.lock();
        let td = inner
            .threads
            .get_mut(&tid)
            .ok_or(SchedError::UnknownThread(tid))?;
        td.user_pri = prio;
        Ok(())
    }

    /// Lend a priority to a thread holding a contested lock
    ///
    /// The active priority is forced to `prio` and flagged as borrowed; it
    /// will not relax past the lender's floor until unlent.
    pub fn sched_lend_prio(&self, tid: Tid, prio: Priority) -> SchedResult<()> {
        let mut inner = self.lock();
        if !inner.threads.contains_key(&tid) {
            return Err(SchedError::UnknownThread(tid));
        }
        debug!("lend priority {} to thread {}", prio, tid);
        self.lend_prio_locked(&mut inner, tid, prio);
        Ok(())
    }

    /// Release a priority loan
    ///
    /// `prio` is the most urgent priority still required by remaining lock
    /// waiters (or an idle-band sentinel when none remain). The thread drops
    /// to its own base or user priority only when that satisfies the floor;
    /// otherwise the loan continues at the floor.
    pub fn sched_unlend_prio(&self, tid: Tid, prio: Priority) -> SchedResult<()> {
        let mut inner = self.lock();
        let td = inner
            .threads
            .get(&tid)
            .ok_or(SchedError::UnknownThread(tid))?;
        let base = if td.base_pri >= PRI_MIN_TIMESHARE && td.base_pri <= PRI_MAX_TIMESHARE {
            td.user_pri
        } else {
            td.base_pri
        };
        if prio >= base {
            inner.thread_mut(tid).borrowing = false;
            self.sched_prio_locked(&mut inner, tid, base);
        } else {
            self.lend_prio_locked(&mut inner, tid, prio);
        }
        Ok(())
    }

    /// Change a process's nice value and refresh every member thread
    pub fn sched_nice(&self, pid: Pid, nice: i32) -> SchedResult<()> {
        if !(NICE_MIN..=NICE_MAX).contains(&nice) {
            return Err(SchedError::InvalidNice(nice));
        }
        let mut inner = self.lock();
        let proc = inner
            .procs
            .get_mut(&pid)
            .ok_or(SchedError::UnknownProcess(pid))?;
        proc.nice = nice;
        let members = proc.threads.clone();
        debug!("process {} nice set to {} ({} threads)", pid, nice, members.len());
        for tid in members {
            self.resetpriority(&mut inner, tid);
            self.resetpriority_thread(&mut inner, tid);
        }
        Ok(())
    }

    /// Nice value of a process
    pub fn nice(&self, pid: Pid) -> SchedResult<i32> {
        self.lock()
            .procs
            .get(&pid)
            .map(|p| p.nice)
            .ok_or(SchedError::UnknownProcess(pid))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_estcpu_ceiling() {
        // 8 * (40 - 4) + 7
        assert_eq!(ESTCPU_MAX, 295);
        assert_eq!(estcpulim(1000), ESTCPU_MAX);
        assert_eq!(estcpulim(10), 10);
    }

    #[test]
    fn test_priority_offset_stays_in_band() {
        // Worst case: max estcpu and max nice still land inside the band
        let worst =
            PUSER as u32 + ESTCPU_MAX / INVERSE_ESTCPU_WEIGHT + NICE_MAX as u32 * NICE_WEIGHT as u32;
        assert!(worst <= PRI_MAX_TIMESHARE as u32 + RQ_PPQ as u32);
    }
}
