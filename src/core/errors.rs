/*!
 * Error Types
 * Recoverable scheduler errors with thiserror, miette, and serde support
 *
 * Internal consistency violations (enqueueing an inhibited thread, removing a
 * thread that is not on a run queue) are not represented here: those are
 * contract bugs in a collaborator and panic, the userspace analogue of a
 * kernel assertion failure.
 */

use crate::core::types::{CpuId, Pid, Tid};
use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Scheduler-related errors with serialization support
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Diagnostic)]
#[serde(tag = "error_type", content = "details", rename_all = "snake_case")]
pub enum SchedError {
    #[error("Thread {0} not registered with the scheduler")]
    #[diagnostic(
        code(sched::unknown_thread),
        help("The thread may have exited or was never created through this scheduler.")
    )]
    UnknownThread(Tid),

    #[error("Process {0} not registered with the scheduler")]
    #[diagnostic(
        code(sched::unknown_process),
        help("No thread belonging to this process has been created.")
    )]
    UnknownProcess(Pid),

    #[error("CPU {cpu} out of range ({ncpus} CPUs present)")]
    #[diagnostic(
        code(sched::invalid_cpu),
        help("CPU ids are 0-based and bounded by the configured CPU count.")
    )]
    InvalidCpu { cpu: CpuId, ncpus: usize },

    #[error("Nice value {0} outside the allowed -20..=20 range")]
    #[diagnostic(code(sched::invalid_nice), help("Clamp the nice value before calling."))]
    InvalidNice(i32),

    #[error("Affinity mask selects no CPUs")]
    #[diagnostic(
        code(sched::empty_affinity),
        help("A thread must remain eligible for at least one CPU.")
    )]
    EmptyAffinity,

    #[error("Thread {0} is not pinned")]
    #[diagnostic(
        code(sched::not_pinned),
        help("sched_unpin must pair with a prior sched_pin on the same thread.")
    )]
    NotPinned(Tid),
}
