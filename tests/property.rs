//! Property tests for the counter invariants.
//!
//! Run with: `cargo test --test property`
//!
//! Each case spins up real threads, so case counts are kept low; the
//! properties are about totals, not about any particular interleaving.

use proptest::prelude::*;
use race_lab::{Experiment, ExperimentConfig, IncrementMode, NoPause};
use std::sync::Arc;

fn experiment(n: u64, workers: usize) -> Experiment {
    Experiment::new(ExperimentConfig {
        increments_per_worker: n,
        workers,
        pacing: Arc::new(NoPause),
    })
    .expect("valid config")
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    /// Serialized increments are loss-free: for all N >= 1, safe mode lands
    /// exactly workers * N.
    #[test]
    fn safe_mode_is_exact(n in 1u64..=64, workers in 2usize..=4) {
        let result = experiment(n, workers)
            .run(IncrementMode::MutexGuarded)
            .unwrap();
        prop_assert_eq!(result.actual, n * workers as u64);
        prop_assert!(result.succeeded());
    }

    /// Lost updates only ever reduce the total: for all N >= 1, unsafe mode
    /// never exceeds workers * N, even with no widened window at all.
    #[test]
    fn unsafe_mode_is_bounded_above(n in 1u64..=64, workers in 2usize..=4) {
        let result = experiment(n, workers)
            .run(IncrementMode::Unsynchronized)
            .unwrap();
        prop_assert!(result.actual <= n * workers as u64);
        prop_assert_eq!(result.lost(), result.expected - result.actual);
    }

    /// Reset idempotence: a safe run is exact regardless of what ran before
    /// on the same experiment.
    #[test]
    fn prior_runs_never_contaminate(n in 1u64..=32) {
        let exp = experiment(n, 2);
        let _ = exp.run(IncrementMode::Unsynchronized).unwrap();
        let safe = exp.run(IncrementMode::MutexGuarded).unwrap();
        prop_assert_eq!(safe.actual, n * 2);
    }
}
