//! Injectable Race-Window Pacing
//!
//! # Purpose
//!
//! The race demonstration only works if the scheduler gets a chance to
//! interleave the two workers between a counter read and the matching write.
//! This module makes that deliberate suspension point an explicit, injectable
//! strategy instead of a hard-coded sleep, so that:
//!
//! - the CLI can widen or narrow the window (`--pause-us`, `--jitter-us`),
//! - tests can disable it entirely (`NoPause`) for fast deterministic runs,
//! - jittered runs stay reproducible (seeded RNG, not wall-clock entropy).
//!
//! # Contract
//!
//! `pause()` is called exactly once per increment, between the read and the
//! write of the counter (unsynchronized path) or inside the critical section
//! (locked path). Implementations must return; they may sleep, yield, or do
//! nothing, but they must not block indefinitely.
//!
//! # Thread Safety
//!
//! One pacing instance is shared by reference across all workers of a run,
//! so implementations are `Send + Sync`. The jittered strategy serializes
//! its RNG behind a mutex; contention there is irrelevant next to the sleep
//! it is about to perform.

use std::sync::Mutex;
use std::thread;
use std::time::Duration;

use crate::rng::XorShift64;

/// Delay strategy that widens the race window inside an increment.
pub trait Pacing: Send + Sync {
    /// Suspend the calling worker briefly (or not at all).
    fn pause(&self);
}

// ============================================================================
// MicroSleep - Fixed Duration
// ============================================================================

/// Sleep for a fixed duration on every pause.
///
/// The default experiment uses 1 microsecond, matching the original
/// demonstration: long enough that the OS almost always deschedules the
/// worker mid-increment, short enough that a 1000-round run stays fast.
#[derive(Clone, Debug)]
pub struct MicroSleep {
    dur: Duration,
}

impl MicroSleep {
    /// Fixed pause of `micros` microseconds.
    pub fn from_micros(micros: u64) -> Self {
        Self {
            dur: Duration::from_micros(micros),
        }
    }
}

impl Pacing for MicroSleep {
    fn pause(&self) {
        thread::sleep(self.dur);
    }
}

// ============================================================================
// YieldHint - Scheduler Hint Only
// ============================================================================

/// Yield the time slice without sleeping.
///
/// Cheaper than `MicroSleep` and still forces interleaving on any
/// multi-runnable system. The statistical race-observability tests use this
/// so that 100 trials finish in well under a second.
#[derive(Clone, Copy, Debug, Default)]
pub struct YieldHint;

impl Pacing for YieldHint {
    fn pause(&self) {
        thread::yield_now();
    }
}

// ============================================================================
// JitterSleep - Seeded Random Duration
// ============================================================================

/// Sleep a seeded-random duration in `[0, max_micros)` on every pause.
///
/// Deterministic for a given seed: reruns with the same seed draw the same
/// jitter sequence (modulo OS sleep precision, which the contract never
/// depends on).
#[derive(Debug)]
pub struct JitterSleep {
    max_micros: u64,
    rng: Mutex<XorShift64>,
}

impl JitterSleep {
    /// Jittered pause bounded by `max_micros`, drawing from `seed`.
    ///
    /// # Panics
    /// Panics (debug) if `max_micros` is 0; use [`NoPause`] for that.
    pub fn new(max_micros: u64, seed: u64) -> Self {
        debug_assert!(max_micros > 0, "use NoPause for a zero-width window");
        Self {
            max_micros,
            rng: Mutex::new(XorShift64::new(seed)),
        }
    }
}

impl Pacing for JitterSleep {
    fn pause(&self) {
        let micros = {
            let mut rng = self.rng.lock().expect("jitter rng mutex poisoned");
            rng.next_below(self.max_micros)
        };
        thread::sleep(Duration::from_micros(micros));
    }
}

// ============================================================================
// NoPause - Disabled
// ============================================================================

/// Do nothing: the race window is whatever the hardware gives us.
///
/// Used by tests that need speed (safe-mode determinism holds regardless of
/// pacing) and by the bounded-above property test, which must hold even when
/// the window is not widened at all.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoPause;

impl Pacing for NoPause {
    fn pause(&self) {}
}
