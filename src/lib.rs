//! Concurrent counter race lab: lost updates vs. mutex-serialized increments.
//!
//! ## Scope
//! This crate runs a fixed-shape, in-process concurrency correctness
//! demonstration. Two (or more) worker threads each perform N increments
//! against one shared counter, under two strategies:
//!
//! - **Unsynchronized**: the read-modify-write is two independent steps with
//!   a deliberate pause between them; interleaving loses updates.
//! - **Mutex-guarded**: the same sequence under an exclusive lock; every
//!   increment lands.
//!
//! ## Key invariants
//! - Safe mode is exact: final value == workers × N, on every run.
//! - Unsafe mode is bounded above: final value ≤ workers × N, always.
//!   Lost updates lower the total, never raise it.
//! - Runs are independent: the counter resets on entry to each run.
//!
//! ## Run flow
//! `reset -> spawn workers -> workers increment (paced) -> join barrier
//! opens -> handles reaped -> RunResult -> report sink`
//!
//! ## Notable entry points
//! - [`Experiment`] / [`ExperimentConfig`]: orchestrate runs.
//! - [`SharedCounter`] / [`IncrementMode`]: the contended state.
//! - [`Pacing`] implementations: injectable race-window widening.
//! - [`ReportSink`]: where reports go (`StdoutSink`, `VecSink` for tests).
//! - [`handoff`]: channel-based companions (rendezvous handoff, first-to-finish).
//!
//! ## What this is not
//! No networking, no persistence, no multi-process coordination, no
//! general-purpose scheduler. The "failure" it reports (lost increments) is
//! the demonstrated outcome, not a program error.

pub mod barrier;
pub mod counter;
pub mod experiment;
pub mod handoff;
pub mod metrics;
pub mod pacing;
pub mod report;
pub mod rng;

pub use barrier::CompletionBarrier;
pub use counter::{IncrementMode, SharedCounter};
pub use experiment::{Experiment, ExperimentConfig, RunResult};
pub use metrics::RunMetrics;
pub use pacing::{JitterSleep, MicroSleep, NoPause, Pacing, YieldHint};
pub use report::{ReportSink, StdoutSink, VecSink};
