//! Shared Counter and Increment Strategies
//!
//! # Design
//!
//! One `u64` cell shared by every worker of a run, with two ways to bump it:
//!
//! - **Unsynchronized**: the logical read-modify-write is performed as two
//!   independent atomic steps (load, pause, store). When two workers
//!   interleave between the load and the store, one increment is silently
//!   lost. This is the defect being demonstrated, not a bug to fix.
//! - **Mutex-guarded**: the same load-pause-store sequence runs under an
//!   exclusive lock guard, so the pause cannot be interrupted by the other
//!   worker and every increment lands.
//!
//! # Why atomics for the "unsynchronized" path
//!
//! A plain `u64` written from two threads without synchronization is a data
//! race, which Rust defines as undefined behavior. Splitting the
//! read-modify-write into a relaxed load and a relaxed store reproduces the
//! lost-update defect at the logical level with the same observable outcome,
//! without UB. (`fetch_add` would of course fix the race; that is exactly
//! what this path refuses to use.)
//!
//! # Correctness Invariants
//!
//! - Locked mode: after a run of W workers x N rounds, `get() == W * N`.
//! - Either mode: `get() <= W * N`. Every store writes `observed + 1`, so
//!   the value never exceeds the number of increments performed; lost
//!   updates only ever lower the total.
//! - Post-run reads are exact: `get()` is called after the workers are
//!   joined, and thread join establishes happens-before, so `Relaxed` is
//!   sufficient throughout.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use crate::pacing::Pacing;

// ============================================================================
// IncrementMode
// ============================================================================

/// Which increment strategy a run uses.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IncrementMode {
    /// Load, pause, store. Lost updates expected under contention.
    Unsynchronized,
    /// Load, pause, store under an exclusive lock. Loss-free.
    MutexGuarded,
}

impl IncrementMode {
    /// Stable label used in reports and stderr stats.
    pub fn label(self) -> &'static str {
        match self {
            IncrementMode::Unsynchronized => "unsynchronized",
            IncrementMode::MutexGuarded => "mutex-guarded",
        }
    }
}

impl fmt::Display for IncrementMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ============================================================================
// SharedCounter
// ============================================================================

/// The one shared mutable resource of an experiment.
///
/// Owned by the orchestrator and lent by reference to workers for the
/// duration of a run. Reset to zero at the start of each run so repeated
/// experiments are independent of prior history.
#[derive(Debug, Default)]
pub struct SharedCounter {
    value: AtomicU64,
    /// Guards the `MutexGuarded` read-modify-write path only. The
    /// unsynchronized path deliberately bypasses it.
    guard: Mutex<()>,
}

impl SharedCounter {
    /// New counter at zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current value.
    ///
    /// Exact only once the workers mutating this counter have been joined.
    pub fn get(&self) -> u64 {
        self.value.load(Ordering::Relaxed)
    }

    /// Reset to zero for a fresh run.
    pub fn reset(&self) {
        self.value.store(0, Ordering::Relaxed);
    }

    /// Perform one increment using the given strategy, pausing mid-flight to
    /// widen the race window.
    pub fn increment(&self, mode: IncrementMode, pacing: &dyn Pacing) {
        match mode {
            IncrementMode::Unsynchronized => self.increment_unsync(pacing),
            IncrementMode::MutexGuarded => self.increment_locked(pacing),
        }
    }

    /// Read, pause, write: two independent steps, no mutual exclusion.
    ///
    /// The pause sits exactly where the defect lives: another worker that
    /// runs in the window reads the same stale value, and one of the two
    /// stores overwrites the other.
    fn increment_unsync(&self, pacing: &dyn Pacing) {
        let observed = self.value.load(Ordering::Relaxed);
        pacing.pause();
        self.value.store(observed + 1, Ordering::Relaxed);
    }

    /// The same read-pause-write sequence, wrapped in a lock guard.
    ///
    /// The pause happens while holding the lock, so the other worker blocks
    /// instead of interleaving; the whole sequence is atomic with respect to
    /// other locked increments.
    fn increment_locked(&self, pacing: &dyn Pacing) {
        let _guard = self.guard.lock().expect("counter mutex poisoned");
        let observed = self.value.load(Ordering::Relaxed);
        pacing.pause();
        self.value.store(observed + 1, Ordering::Relaxed);
    }
}
