//! Per-Run Metrics
//!
//! Cheap per-worker progress counters for the experiment.
//!
//! ## Design
//!
//! - One counter per worker, `CachePadded` so adjacent workers' hot counters
//!   never share a cache line.
//! - Workers bump only their own slot with a relaxed `fetch_add`; there is no
//!   cross-worker read on the hot path.
//! - Aggregation happens after the join barrier opens, when the values are
//!   exact (join establishes happens-before).
//!
//! These counters track increments *attempted* by each worker, which is why
//! their sum equals `workers * rounds` even in unsynchronized runs where the
//! shared counter itself comes up short. The gap between the two is the
//! lost-update count.

use crossbeam_utils::CachePadded;
use std::sync::atomic::{AtomicU64, Ordering};

/// Per-worker completed-round counters for one run.
#[derive(Debug)]
pub struct RunMetrics {
    completed: Vec<CachePadded<AtomicU64>>,
}

impl RunMetrics {
    /// Metrics for `workers` workers, all counters at zero.
    pub fn new(workers: usize) -> Self {
        Self {
            completed: (0..workers)
                .map(|_| CachePadded::new(AtomicU64::new(0)))
                .collect(),
        }
    }

    /// Record one completed round for `worker`.
    ///
    /// # Panics
    /// Panics if `worker` is out of range.
    #[inline]
    pub fn record_round(&self, worker: usize) {
        self.completed[worker].fetch_add(1, Ordering::Relaxed);
    }

    /// Rounds completed per worker. Exact only after the workers are joined.
    pub fn per_worker(&self) -> Vec<u64> {
        self.completed
            .iter()
            .map(|c| c.load(Ordering::Relaxed))
            .collect()
    }

    /// Total rounds completed across all workers.
    pub fn total(&self) -> u64 {
        self.completed
            .iter()
            .map(|c| c.load(Ordering::Relaxed))
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_at_zero() {
        let metrics = RunMetrics::new(3);
        assert_eq!(metrics.per_worker(), vec![0, 0, 0]);
        assert_eq!(metrics.total(), 0);
    }

    #[test]
    fn records_per_worker_independently() {
        let metrics = RunMetrics::new(2);
        metrics.record_round(0);
        metrics.record_round(0);
        metrics.record_round(1);
        assert_eq!(metrics.per_worker(), vec![2, 1]);
        assert_eq!(metrics.total(), 3);
    }
}
