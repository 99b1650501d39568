//! Counted Join Barrier
//!
//! The completion mechanism between workers and the orchestrator: a barrier
//! initialized with the number of expected workers, decremented by each worker
//! when its loop finishes, and awaited by the orchestrator until it reaches
//! zero.
//!
//! # Semantics
//!
//! - `done()` may be called from any thread; each call consumes one expected
//!   completion.
//! - `wait()` blocks until all expected completions have arrived. No timeout,
//!   no cancellation: a worker that never signals would hang the waiter, which
//!   is acceptable here because worker loops are bounded by construction.
//! - The barrier is single-use. A new run builds a new barrier.

use std::sync::{Condvar, Mutex};

/// Blocks a waiter until a fixed number of completion signals arrive.
#[derive(Debug)]
pub struct CompletionBarrier {
    remaining: Mutex<usize>,
    all_done: Condvar,
}

impl CompletionBarrier {
    /// Barrier expecting `count` completion signals.
    pub fn new(count: usize) -> Self {
        Self {
            remaining: Mutex::new(count),
            all_done: Condvar::new(),
        }
    }

    /// Signal one completion.
    ///
    /// # Panics
    /// Panics if more signals arrive than the barrier was built for; that is
    /// an orchestration bug, not a runtime condition.
    pub fn done(&self) {
        let mut remaining = self.remaining.lock().expect("barrier mutex poisoned");
        *remaining = remaining
            .checked_sub(1)
            .expect("completion barrier signaled more times than its count");
        if *remaining == 0 {
            // Only the waiter sleeps on this condvar, but notify_all keeps
            // the barrier correct if that ever changes.
            self.all_done.notify_all();
        }
    }

    /// Block until the count reaches zero.
    ///
    /// Returns immediately for a zero-count barrier.
    pub fn wait(&self) {
        let mut remaining = self.remaining.lock().expect("barrier mutex poisoned");
        while *remaining > 0 {
            remaining = self
                .all_done
                .wait(remaining)
                .expect("barrier mutex poisoned");
        }
    }

    /// Completions still outstanding (for tests and debugging).
    pub fn outstanding(&self) -> usize {
        *self.remaining.lock().expect("barrier mutex poisoned")
    }
}
