/*!
 * Run Queue
 * Priority-bucketed FIFO queues of runnable threads
 *
 * The priority space (0-255) is folded into RQ_NQS buckets of RQ_PPQ adjacent
 * priorities each. A one-word bitmap tracks occupied buckets so selection is a
 * find-first-set away; within a bucket threads run in arrival order.
 */

use crate::core::types::{Priority, Tid};
use std::collections::VecDeque;

/// Number of priority buckets
pub const RQ_NQS: usize = 64;

/// Priorities folded into one bucket
pub const RQ_PPQ: usize = 4;

/// Bucket index for a priority value
#[inline]
pub fn bucket_of(pri: Priority) -> usize {
    pri as usize / RQ_PPQ
}

/// A single run queue: bitmap plus per-bucket FIFO lists
#[derive(Debug)]
pub struct RunQueue {
    status: u64,
    queues: Vec<VecDeque<Tid>>,
    count: usize,
}

impl RunQueue {
    pub fn new() -> Self {
        Self {
            status: 0,
            queues: (0..RQ_NQS).map(|_| VecDeque::new()).collect(),

            count: 0,
        }
    }

    /// Enqueue a thread into the bucket for `pri`
    ///
    /// Preempted threads go to the head of their bucket so they resume before
    /// later arrivals of equal priority; everything else goes to the tail.
    pub fn add(&mut self, tid: Tid, pri: Priority, preempted: bool) -> usize {
        let idx = bucket_of(pri);
        if preempted {
            self.queues[idx].push_front(tid);
        } else {
            self.queues[idx].push_back(tid);
        }
        self.status |= 1u64 << idx;
        self.count += 1;
        idx
    }

    /// Lowest-numbered (most urgent) occupied bucket
    #[inline]
    fn first_set(&self) -> Option<usize> {
        if self.status == 0 {
            None
        } else {
            Some(self.status.trailing_zeros() as usize)
        }
    }

    /// Peek the head of the most urgent occupied bucket
    pub fn choose(&self) -> Option<Tid> {
        let idx = self.first_set()?;
        self.queues[idx].front().copied()
    }

    /// Peek the most urgent bucket, biased toward a preferred thread
    ///
    /// Scans up to `fuzz` entries at the head of the bucket and picks the
    /// first one `prefer` accepts (a thread that last ran on the choosing
    /// CPU); falls back to strict FIFO head. Candidates beyond the fuzz
    /// window are never considered, so relative bucket order is preserved.
    pub fn choose_fuzz<F>(&self, fuzz: usize, prefer: F) -> Option<Tid>
    where
        F: Fn(Tid) -> bool,
    {
        let idx = self.first_set()?;
        let queue = &self.queues[idx];
        if fuzz > 1 {
            for &tid in queue.iter().take(fuzz) {
                if prefer(tid) {
                    return Some(tid);
                }
            }
        }
        queue.front().copied()
    }

    /// Remove a thread known to sit in bucket `idx`
    ///
    /// Panics if the thread is not there: callers track run-queue membership
    /// and a miss means scheduler state is corrupt.
    pub fn remove(&mut self, tid: Tid, idx: usize) {
        let queue = &mut self.queues[idx];
        let pos = queue
            .iter()
            .position(|&t| t == tid)
            .unwrap_or_else(|| panic!("thread {} not in run-queue bucket {}", tid, idx));
        queue.remove(pos);
        if queue.is_empty() {
            self.status &= !(1u64 << idx);
        }
        self.count -= 1;
    }

    /// Number of queued threads
    #[inline]
    pub fn len(&self) -> usize {
        self.count
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }
}

impl Default for RunQueue {
    fn default() -> Self {
        Self::new()
    }
}
