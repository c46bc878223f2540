/*!
 * CPU-Usage Decay Engine
 * The once-per-second pass that ages usage estimators and refreshes priorities
 *
 * The decay constant is chosen so that roughly 90% of accumulated usage is
 * forgotten after 5 * loadavg seconds: recent CPU hogs lose urgency quickly,
 * while bursty-but-mostly-idle work is not punished forever.
 */

use super::{SchedInner, Scheduler};
use crate::core::types::{FixPt, SchedResult, Tid, FSCALE, FSHIFT};
use crate::core::SchedError;
use crate::thread::ThreadState;
use log::trace;

/// Decay factor for the reporting-only pctcpu estimator: ~95% retained per
/// aging step, so an estimate dies off over about 20 seconds of sleep
pub const CCPU: FixPt = 1948; // 0.95122 * FSCALE

/// Fractional bits of CCPU
pub const CCPU_SHIFT: u32 = 11;

/// One-minute exponential coefficient for the load average, applied every
/// five decay passes
const CEXP_1MIN: FixPt = 1884; // 0.92004 * FSCALE

/// loadfac = 2 * loadavg, fixed point
#[inline]
pub(crate) fn loadfactor(loadavg: FixPt) -> FixPt {
    2 * loadavg
}

/// One interval of load-dependent decay: estcpu * loadfac / (loadfac + 1)
#[inline]
pub(crate) fn decay_cpu(loadfac: FixPt, estcpu: u32) -> u32 {
    ((loadfac * estcpu as u64) / (loadfac + FSCALE)) as u32
}

impl Scheduler {
    /// Run one decay pass over every thread in the system
    ///
    /// Invoked at 1 Hz by the housekeeping task ([`super::DecayTask`]), or
    /// directly by harnesses that step virtual time. Holds the dispatch lock
    /// for the whole pass, the moral equivalent of the process-list read
    /// lock the pass requires.
    pub fn schedcpu(&self) {
        let mut inner = self.lock();
        self.update_loadavg(&mut inner);
        let loadfac = loadfactor(inner.loadavg);
        let stathz = self.config.stathz as u64;

        let tids: Vec<Tid> = inner.threads.keys().copied().collect();
        for tid in tids {
            let td = inner.thread_mut(tid);
            if td.state == ThreadState::Exited {
                continue;
            }

            // Awake: on a run queue, on a CPU, or ran since the last pass.
            let awake = td.state == ThreadState::Runq
                || td.state == ThreadState::Running
                || td.did_run;
            td.did_run = false;

            // Age the reporting-only percent-CPU estimate and fold in the
            // ticks credited this interval, scaled for the clock rate.
            td.sched.pctcpu = (td.sched.pctcpu * CCPU) >> FSHIFT;
            if td.sched.cpticks != 0 {
                td.sched.pctcpu +=
                    100 * ((td.sched.cpticks as u64) << (FSHIFT - CCPU_SHIFT)) / stathz;
                td.sched.cpticks = 0;
            }

            if awake {
                // Woke after sleeping across intervals: apply the decay it
                // missed before resuming normal accounting.
                if td.sched.slptime > 1 {
                    Self::updatepri(td, loadfac);
                }
                td.sched.slptime = 0;
            } else {
                td.sched.slptime += 1;
                if td.sched.slptime > 1 {
                    // Still asleep; its decay is settled until wakeup.
                    continue;
                }
            }

            td.estcpu = decay_cpu(loadfac, td.estcpu);
            self.resetpriority(&mut inner, tid);
            self.resetpriority_thread(&mut inner, tid);
        }
    }

    /// Retroactive decay for a thread that slept across decay intervals
    ///
    /// A sleep longer than 5 * loadfac intervals drives the estimator to
    /// zero outright; shorter sleeps replay the per-interval decay once per
    /// missed interval (one less than slept, the current interval having
    /// already been counted).
    pub(crate) fn updatepri(td: &mut crate::thread::Thread, loadfac: FixPt) {
        let slptime = td.sched.slptime as u64;
        if slptime > 5 * (loadfac >> FSHIFT) {
            td.estcpu = 0;
            return;
        }
        let mut newcpu = td.estcpu;
        for _ in 1..slptime {
            if newcpu == 0 {
                break;
            }
            newcpu = decay_cpu(loadfac, newcpu);
        }
        td.estcpu = newcpu;
    }

    /// Refresh the one-minute load average from the runnable count
    ///
    /// Sampled every fifth pass, like the classic 5-second load window.
    fn update_loadavg(&self, inner: &mut SchedInner) {
        if inner.loadavg_frozen {
            return;
        }
        inner.loadav_phase += 1;
        if inner.loadav_phase % 5 != 0 {
            return;
        }
        let nrun = self.stats.load() as u64;
        inner.loadavg =
            (CEXP_1MIN * inner.loadavg + nrun * FSCALE * (FSCALE - CEXP_1MIN)) >> FSHIFT;
        trace!(
            "loadavg refreshed: {:.2} ({} runnable)",
            inner.loadavg as f64 / FSCALE as f64,
            nrun
        );
    }

    /// Decayed CPU-percentage estimate for a thread, fixed point
    ///
    /// Reporting surface only; scheduling decisions never look at this.
    pub fn sched_pctcpu(&self, tid: Tid) -> SchedResult<FixPt> {
        self.lock()
            .threads
            .get(&tid)
            .map(|td| td.sched.pctcpu)
            .ok_or(SchedError::UnknownThread(tid))
    }

    /// Decayed CPU usage as a percentage
    pub fn sched_pctcpu_percent(&self, tid: Tid) -> SchedResult<f64> {
        Ok(self.sched_pctcpu(tid)? as f64 * 100.0 / FSCALE as f64)
    }

    /// Current decayed usage estimator for a thread
    pub fn estcpu(&self, tid: Tid) -> SchedResult<u32> {
        self.lock()
            .threads
            .get(&tid)
            .map(|td| td.estcpu)
            .ok_or(SchedError::UnknownThread(tid))
    }
}
