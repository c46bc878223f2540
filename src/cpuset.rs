/*!
 * CPU Set
 * Fixed-size CPU bitset with named bit operations
 */

use crate::core::types::CpuId;
use serde::{Deserialize, Serialize};

/// Maximum number of CPUs a single set can describe
pub const MAX_CPUS: usize = 64;

/// Set of CPU ids, used for affinity masks and idle-CPU tracking
///
/// # Performance
/// Single-word representation; every operation is O(1).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CpuSet(u64);

impl CpuSet {
    /// Empty set
    #[inline]
    pub const fn new() -> Self {
        Self(0)
    }

    /// Set containing CPUs `0..n`
    #[inline]
    pub fn all(n: usize) -> Self {
        assert!(n <= MAX_CPUS, "CPU count {} exceeds MAX_CPUS", n);
        if n == MAX_CPUS {
            Self(u64::MAX)
        } else {
            Self((1u64 << n) - 1)
        }
    }

    /// Set containing exactly one CPU
    #[inline]
    pub fn single(cpu: CpuId) -> Self {
        let mut s = Self::new();
        s.set(cpu);
        s
    }

    #[inline]
    pub fn set(&mut self, cpu: CpuId) {
        assert!(cpu < MAX_CPUS, "CPU id {} exceeds MAX_CPUS", cpu);
        self.0 |= 1u64 << cpu;
    }

    #[inline]
    pub fn clear(&mut self, cpu: CpuId) {
        assert!(cpu < MAX_CPUS, "CPU id {} exceeds MAX_CPUS", cpu);
        self.0 &= !(1u64 << cpu);
    }

    #[inline]
    pub fn test(&self, cpu: CpuId) -> bool {
        cpu < MAX_CPUS && self.0 & (1u64 << cpu) != 0
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    /// Number of CPUs in the set
    #[inline]
    pub fn count(&self) -> usize {
        self.0.count_ones() as usize
    }

    /// Lowest-numbered CPU in the set, if any
    #[inline]
    pub fn first_set(&self) -> Option<CpuId> {
        if self.0 == 0 {
            None
        } else {
            Some(self.0.trailing_zeros() as CpuId)
        }
    }

    /// Intersection with another set
    #[inline]
    pub fn and(&self, other: &CpuSet) -> CpuSet {
        CpuSet(self.0 & other.0)
    }

    /// Iterate over member CPU ids in ascending order
    pub fn iter(&self) -> impl Iterator<Item = CpuId> + '_ {
        let bits = self.0;
        (0..MAX_CPUS).filter(move |c| bits & (1u64 << c) != 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_clear_test() {
        let mut s = CpuSet::new();
        assert!(s.is_empty());
        s.set(3);
        s.set(17);
        assert!(s.test(3));
        assert!(s.test(17));
        assert!(!s.test(4));
        assert_eq!(s.count(), 2);
        s.clear(3);
        assert!(!s.test(3));
        assert_eq!(s.first_set(), Some(17));
    }

    #[test]
    fn test_all() {
        let s = CpuSet::all(4);
        assert_eq!(s.count(), 4);
        assert!(s.test(0) && s.test(3));
        assert!(!s.test(4));
        assert_eq!(CpuSet::all(MAX_CPUS).count(), MAX_CPUS);
    }

    #[test]
    fn test_iter_order() {
        let mut s = CpuSet::new();
        s.set(5);
        s.set(1);
        s.set(40);
        let cpus: Vec<_> = s.iter().collect();
        assert_eq!(cpus, vec![1, 5, 40]);
    }
}
