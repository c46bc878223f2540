/*!
 * Core Types
 * Common types shared across the scheduler
 */

/// Thread ID type
pub type Tid = u64;

/// Process ID type
pub type Pid = u32;

/// CPU identifier
pub type CpuId = usize;

/// Priority level (0-255, lower is more urgent)
pub type Priority = u8;

/// Fixed-point scalar (FSHIFT fractional bits)
pub type FixPt = u64;

/// Fractional bits in a [`FixPt`]
pub const FSHIFT: u32 = 11;

/// One, in fixed point
pub const FSCALE: FixPt = 1 << FSHIFT;

/// Convert a float to fixed point (construction/config paths only)
#[inline]
pub fn to_fixpt(v: f64) -> FixPt {
    (v * FSCALE as f64) as FixPt
}

/// Convert a fixed-point value back to a float
#[inline]
pub fn from_fixpt(v: FixPt) -> f64 {
    v as f64 / FSCALE as f64
}

/// Common result type for scheduler operations
pub type SchedResult<T> = Result<T, super::errors::SchedError>;
