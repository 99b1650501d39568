//! Experiment Orchestrator
//!
//! Runs the concurrent counter experiment: reset the shared counter, spawn
//! the configured workers on named OS threads (all using the same increment
//! strategy), block on the counted join barrier, reap the thread handles, and
//! fold the outcome into a [`RunResult`].
//!
//! # Run Lifecycle
//!
//! ```text
//! Idle ──spawn──▶ Running ──barrier opens──▶ Joined ──RunResult──▶ Reported
//!   ▲                                                                  │
//!   └────────────────────── counter.reset() ◀──────────────────────────┘
//! ```
//!
//! A run has no cancellation path: workers always complete their bounded
//! loops, and the orchestrator blocks without timeout. The only fallible step
//! is thread spawn, surfaced as `io::Error`.
//!
//! # Correctness Invariants
//!
//! - **Safe mode**: `actual == workers * rounds`, deterministically, on every
//!   run. The lock serializes every read-pause-write sequence.
//! - **Unsafe mode**: `actual <= workers * rounds` is the only guarantee.
//!   The final value is scheduler-dependent and non-deterministic; lost
//!   updates lower the total but can never raise it.
//! - **Run independence**: the counter is reset on entry, so repeated runs on
//!   one `Experiment` do not observe prior history.
//! - **Work conservation**: per-worker metrics always sum to
//!   `workers * rounds` — workers never skip rounds, they only lose updates.

use std::fmt;
use std::io;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use crate::barrier::CompletionBarrier;
use crate::counter::{IncrementMode, SharedCounter};
use crate::metrics::RunMetrics;
use crate::pacing::{MicroSleep, Pacing};
use crate::report::ReportSink;

// ============================================================================
// Configuration
// ============================================================================

/// Configuration for one experiment.
///
/// # Defaults
///
/// | Parameter | Default | Rationale |
/// |-----------|---------|-----------|
/// | `increments_per_worker` | 1000 | The canonical demo scenario (2×1000) |
/// | `workers` | 2 | Two contenders are enough to lose updates |
/// | `pacing` | 1 µs sleep | Reliably widens the race window |
#[derive(Clone)]
pub struct ExperimentConfig {
    /// Rounds each worker performs (N). Fixed for the run.
    pub increments_per_worker: u64,

    /// Number of concurrent workers. Minimum 2: a single worker cannot
    /// contend with itself, and the demonstration would be vacuous.
    pub workers: usize,

    /// Race-window pacing, shared by every worker of the run.
    ///
    /// Swap in [`NoPause`](crate::pacing::NoPause) in tests for speed, or
    /// [`YieldHint`](crate::pacing::YieldHint) for a fast-but-wide window.
    pub pacing: Arc<dyn Pacing>,
}

impl Default for ExperimentConfig {
    fn default() -> Self {
        Self {
            increments_per_worker: 1000,
            workers: 2,
            pacing: Arc::new(MicroSleep::from_micros(1)),
        }
    }
}

impl fmt::Debug for ExperimentConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExperimentConfig")
            .field("increments_per_worker", &self.increments_per_worker)
            .field("workers", &self.workers)
            .finish_non_exhaustive()
    }
}

impl ExperimentConfig {
    fn validate(&self) -> io::Result<()> {
        if self.workers < 2 {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "experiment needs at least 2 workers to contend",
            ));
        }
        if self.increments_per_worker == 0 {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "increments_per_worker must be >= 1",
            ));
        }
        Ok(())
    }
}

// ============================================================================
// RunResult
// ============================================================================

/// Outcome of one run. Immutable once computed.
#[derive(Clone, Debug)]
pub struct RunResult {
    /// Strategy the run used.
    pub mode: IncrementMode,
    /// Workers that contended on the counter.
    pub workers: usize,
    /// Rounds each worker performed.
    pub rounds_per_worker: u64,
    /// `workers * rounds_per_worker`.
    pub expected: u64,
    /// Final counter value after all workers joined.
    pub actual: u64,
    /// Increments attempted per worker (always `rounds_per_worker` each).
    pub rounds_completed: Vec<u64>,
    /// Wall-clock duration of the run.
    pub elapsed: Duration,
}

impl RunResult {
    /// Did every increment land?
    pub fn succeeded(&self) -> bool {
        self.actual == self.expected
    }

    /// Increments lost to the race. Zero on success.
    pub fn lost(&self) -> u64 {
        self.expected - self.actual
    }

    /// One-line greppable `key=value` summary for stderr.
    pub fn stats_line(&self) -> String {
        format!(
            "mode={} workers={} expected={} actual={} lost={} elapsed_ms={}",
            self.mode,
            self.workers,
            self.expected,
            self.actual,
            self.lost(),
            self.elapsed.as_millis(),
        )
    }
}

impl fmt::Display for RunResult {
    /// The per-run report: label, expected, actual, verdict (and loss on
    /// failure). This is the process's sole stdout surface.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "RUN {}: {} workers x {} increments",
            self.mode, self.workers, self.rounds_per_worker
        )?;
        writeln!(f, "  expected: {}", self.expected)?;
        writeln!(f, "  actual:   {}", self.actual)?;
        if self.succeeded() {
            writeln!(f, "  OK: every increment landed")
        } else {
            writeln!(f, "  FAIL: {} increments lost to the race", self.lost())
        }
    }
}

// ============================================================================
// Experiment
// ============================================================================

/// Owns the shared counter and runs experiments against it.
///
/// All shared mutable state of a run (counter, lock, barrier, metrics) lives
/// in fields owned here or on the run's stack, passed by reference into the
/// workers. No globals, so independent experiments can run in parallel test
/// cases.
#[derive(Debug)]
pub struct Experiment {
    config: ExperimentConfig,
    counter: SharedCounter,
}

impl Experiment {
    /// Build an experiment, validating the configuration.
    pub fn new(config: ExperimentConfig) -> io::Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            counter: SharedCounter::new(),
        })
    }

    /// The configuration this experiment runs with.
    pub fn config(&self) -> &ExperimentConfig {
        &self.config
    }

    /// The shared counter (exact between runs; racy during one).
    pub fn counter(&self) -> &SharedCounter {
        &self.counter
    }

    /// Run one experiment in the given mode.
    ///
    /// Blocks until every worker has signaled the join barrier and been
    /// reaped. Returns `Err` only if a worker thread fails to spawn; already
    /// spawned workers run to completion regardless.
    pub fn run(&self, mode: IncrementMode) -> io::Result<RunResult> {
        let cfg = &self.config;
        self.counter.reset();

        let barrier = CompletionBarrier::new(cfg.workers);
        let metrics = RunMetrics::new(cfg.workers);
        let started = Instant::now();

        thread::scope(|scope| -> io::Result<()> {
            let mut handles = Vec::with_capacity(cfg.workers);
            for worker in 0..cfg.workers {
                let counter = &self.counter;
                let pacing: &dyn Pacing = cfg.pacing.as_ref();
                let barrier = &barrier;
                let metrics = &metrics;
                let rounds = cfg.increments_per_worker;

                let handle = thread::Builder::new()
                    .name(format!("deposit-{worker}"))
                    .spawn_scoped(scope, move || {
                        for _ in 0..rounds {
                            counter.increment(mode, pacing);
                            metrics.record_round(worker);
                        }
                        barrier.done();
                    })?;
                handles.push(handle);
            }

            // Wait for all completion signals, then reap the handles. The
            // barrier is the completion contract; the join propagates any
            // worker panic (which would be a bug, not an outcome).
            barrier.wait();
            for handle in handles {
                handle
                    .join()
                    .expect("worker panicked");
            }
            Ok(())
        })?;

        let elapsed = started.elapsed();
        let actual = self.counter.get();
        let expected = cfg.increments_per_worker * cfg.workers as u64;

        Ok(RunResult {
            mode,
            workers: cfg.workers,
            rounds_per_worker: cfg.increments_per_worker,
            expected,
            actual,
            rounds_completed: metrics.per_worker(),
            elapsed,
        })
    }

    /// Run the full demonstration: unsafe first, then safe, writing both
    /// reports to `sink` (flushed before returning).
    pub fn run_demo(&self, sink: &dyn ReportSink) -> io::Result<(RunResult, RunResult)> {
        let unsafe_run = self.run(IncrementMode::Unsynchronized)?;
        sink.write_all(unsafe_run.to_string().as_bytes());

        let safe_run = self.run(IncrementMode::MutexGuarded)?;
        sink.write_all(safe_run.to_string().as_bytes());

        sink.flush();
        Ok((unsafe_run, safe_run))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pacing::NoPause;
    use crate::report::VecSink;

    fn quick_config(increments: u64, workers: usize) -> ExperimentConfig {
        ExperimentConfig {
            increments_per_worker: increments,
            workers,
            pacing: Arc::new(NoPause),
        }
    }

    #[test]
    fn safe_mode_is_exact() {
        let experiment = Experiment::new(quick_config(500, 2)).unwrap();
        let result = experiment.run(IncrementMode::MutexGuarded).unwrap();
        assert_eq!(result.actual, 1000);
        assert_eq!(result.expected, 1000);
        assert!(result.succeeded());
        assert_eq!(result.lost(), 0);
    }

    #[test]
    fn unsafe_mode_never_exceeds_expected() {
        let experiment = Experiment::new(quick_config(500, 2)).unwrap();
        let result = experiment.run(IncrementMode::Unsynchronized).unwrap();
        assert!(result.actual <= result.expected);
    }

    #[test]
    fn every_worker_attempts_all_rounds() {
        let experiment = Experiment::new(quick_config(200, 3)).unwrap();
        let result = experiment.run(IncrementMode::Unsynchronized).unwrap();
        // Workers never skip rounds; they only lose updates.
        assert_eq!(result.rounds_completed, vec![200, 200, 200]);
    }

    #[test]
    fn runs_are_independent_of_history() {
        let experiment = Experiment::new(quick_config(300, 2)).unwrap();
        let _ = experiment.run(IncrementMode::Unsynchronized).unwrap();
        // A safe run after a (possibly lossy) unsafe run starts from zero.
        let safe = experiment.run(IncrementMode::MutexGuarded).unwrap();
        assert_eq!(safe.actual, 600);
    }

    #[test]
    fn rejects_single_worker() {
        let err = Experiment::new(quick_config(10, 1)).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidInput);
    }

    #[test]
    fn rejects_zero_increments() {
        let err = Experiment::new(quick_config(0, 2)).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidInput);
    }

    #[test]
    fn report_text_carries_label_totals_and_verdict() {
        let experiment = Experiment::new(quick_config(50, 2)).unwrap();
        let result = experiment.run(IncrementMode::MutexGuarded).unwrap();
        let text = result.to_string();
        assert!(text.contains("RUN mutex-guarded"));
        assert!(text.contains("expected: 100"));
        assert!(text.contains("actual:   100"));
        assert!(text.contains("OK: every increment landed"));
    }

    #[test]
    fn stats_line_is_greppable() {
        let experiment = Experiment::new(quick_config(50, 2)).unwrap();
        let result = experiment.run(IncrementMode::MutexGuarded).unwrap();
        let line = result.stats_line();
        assert!(line.contains("mode=mutex-guarded"));
        assert!(line.contains("expected=100"));
        assert!(line.contains("actual=100"));
        assert!(line.contains("lost=0"));
    }

    #[test]
    fn demo_reports_unsafe_then_safe() {
        let experiment = Experiment::new(quick_config(100, 2)).unwrap();
        let sink = VecSink::new();
        let (unsafe_run, safe_run) = experiment.run_demo(&sink).unwrap();

        assert!(unsafe_run.actual <= unsafe_run.expected);
        assert!(safe_run.succeeded());

        let out = String::from_utf8(sink.take()).unwrap();
        let unsafe_at = out.find("RUN unsynchronized").expect("unsafe report");
        let safe_at = out.find("RUN mutex-guarded").expect("safe report");
        assert!(unsafe_at < safe_at, "unsafe report must come first");
    }
}
