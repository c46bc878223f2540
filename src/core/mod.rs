/*!
 * Core Module
 * Shared types and errors
 */

pub mod errors;
pub mod types;

pub use errors::SchedError;
pub use types::{CpuId, FixPt, Pid, Priority, SchedResult, Tid, FSCALE, FSHIFT};
