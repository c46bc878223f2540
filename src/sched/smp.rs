/*!
 * SMP Load Balancing & Wakeup Forwarding
 * CPU selection for restricted threads and best-effort idle-CPU signaling
 *
 * Nothing here is load-bearing for correctness: a wakeup that is not
 * forwarded is picked up at the target CPU's next natural reschedule point.
 * Forwarding only shortens the latency between a thread becoming runnable
 * and some CPU noticing.
 */

use super::{SchedInner, Scheduler};
use crate::core::types::{CpuId, Priority, Tid};
use crate::cpuset::CpuSet;
use crate::thread::PRI_MAX_ITHD;
use log::{trace, warn};

impl Scheduler {
    /// Pick the target CPU for an affinity-restricted thread
    ///
    /// The last-used CPU wins while it remains eligible (cache warmth);
    /// otherwise the eligible CPU with the shortest run queue, scanned in
    /// id order with strict less-than, so ties stably go to the lowest id.
    pub(crate) fn sched_pickcpu(&self, inner: &SchedInner, tid: Tid) -> CpuId {
        let td = inner.thread(tid);
        if let Some(last) = td.last_cpu {
            if td.can_sched(last) {
                return last;
            }
        }
        let mut best: Option<(CpuId, usize)> = None;
        for cpu in 0..self.config.ncpus {
            if !td.can_sched(cpu) {
                continue;
            }
            let qlen = inner.cpu_runqs[cpu].len();
            if best.map_or(true, |(_, blen)| qlen < blen) {
                best = Some((cpu, qlen));
            }
        }
        best.expect("affinity mask excludes every present CPU").0
    }

    /// Forward a wakeup to an idle CPU so the new global-queue thread runs
    /// sooner than the target's next reschedule point
    ///
    /// Returns true when at least one wakeup IPI went out.
    pub(crate) fn forward_wakeup(&self, inner: &mut SchedInner, from_cpu: CpuId) -> bool {
        self.stats.inc_forward_requested();
        let cfg = self.config.ipi_wakeup;
        if !cfg.enabled || (!cfg.use_mask && !cfg.use_loop) {
            return false;
        }
        // An idle caller runs the thread itself; there is nothing to forward.
        if inner.idle_cpus.test(from_cpu) {
            return false;
        }
        if inner.idle_cpus.is_empty() {
            return false;
        }

        let mut map = CpuSet::new();
        if cfg.use_mask {
            map = inner.idle_cpus;
            map.clear(from_cpu);
        }
        if cfg.use_loop {
            let mut scanned = CpuSet::new();
            for cpu in 0..self.config.ncpus {
                if cpu != from_cpu && inner.cpus[cpu].current == inner.cpus[cpu].idle_thread {
                    scanned.set(cpu);
                }
            }
            if cfg.use_mask && scanned != map {
                // Both methods enabled: they must agree, or the idle mask
                // upkeep has drifted from reality.
                warn!(
                    "forward_wakeup: idle-mask {:?} disagrees with scan {:?}",
                    map, scanned
                );
            }
            map = scanned;
        }

        if cfg.htt2 {
            // Prefer CPUs whose hyperthread sibling is also idle, so the
            // woken thread does not share a core with busy work.
            let mut paired = CpuSet::new();
            for cpu in map.iter() {
                let sibling = cpu ^ 1;
                if sibling >= self.config.ncpus || map.test(sibling) {
                    paired.set(cpu);
                }
            }
            if !paired.is_empty() {
                map = paired;
            }
        }

        if cfg.one_cpu {
            match map.first_set() {
                Some(cpu) => map = CpuSet::single(cpu),
                None => return false,
            }
        }

        if map.is_empty() {
            return false;
        }
        for cpu in map.iter() {
            trace!("forwarding wakeup to idle cpu {}", cpu);
            self.stats.inc_forward_delivered();
            self.kicker.wakeup(cpu);
        }
        true
    }

    /// Poke a specific CPU that just received a targeted thread
    ///
    /// Idle targets get a wakeup IPI. Busy targets get a preemption IPI
    /// when the newcomer is urgent enough to warrant it, or are merely
    /// flagged to reschedule at their next return point.
    pub(crate) fn kick_other_cpu(&self, inner: &mut SchedInner, pri: Priority, cpu: CpuId) {
        if inner.idle_cpus.test(cpu) {
            trace!("kick: cpu {} idle, sending wakeup", cpu);
            self.stats.inc_forward_delivered();
            self.kicker.wakeup(cpu);
            return;
        }
        let ctid = inner.cpus[cpu].current;
        let cpri = inner.thread(ctid).pri;
        if pri >= cpri {
            return;
        }
        if self.config.preemption && (self.config.full_preemption || pri <= PRI_MAX_ITHD) {
            trace!("kick: preemption IPI to cpu {}", cpu);
            self.kicker.preempt(cpu);
            return;
        }
        inner.thread_mut(ctid).needresched = true;
        self.kicker.wakeup(cpu);
    }
}
