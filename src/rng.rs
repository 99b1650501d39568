//! Tiny deterministic RNG for jittered pacing and handoff races.
//!
//! **Generator**: XorShift64. Simple, fast, and deterministic: same seed,
//! same sequence, which is what makes jittered experiments reproducible.
//! We are sampling sleep durations in a demo, not doing Monte Carlo.
//!
//! **Bounded sampling**: Lemire's nearly-divisionless method (multiply-high
//! with rare rejection) instead of `% upper`.
//!
//! **No `Copy`**: copying an RNG duplicates the stream, causing identical
//! "random" decisions. Use `Clone` explicitly when forking per-worker streams.

/// Deterministic RNG for pacing decisions.
///
/// NOT thread-safe. Each worker forks its own instance from a master seed;
/// shared use goes through a `Mutex` (see `pacing::JitterSleep`).
#[derive(Clone, Debug)]
pub struct XorShift64 {
    state: u64,
}

impl XorShift64 {
    /// Create a new RNG with the given seed.
    ///
    /// Seed 0 is mapped to a non-zero value to avoid the all-zero lockup state.
    #[inline]
    pub fn new(seed: u64) -> Self {
        let seed = if seed == 0 { 0x9E3779B97F4A7C15 } else { seed };
        Self { state: seed }
    }

    /// Next u64 using XorShift64.
    ///
    /// Shift constants (13, 7, 17) are from Marsaglia's "Xorshift RNGs" paper
    /// and give a full-period generator.
    #[inline]
    pub fn next_u64(&mut self) -> u64 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.state = x;
        x
    }

    /// Uniform value in `[0, upper)`.
    ///
    /// Power-of-two bounds take a bitmask fast path; everything else uses
    /// Lemire's method.
    ///
    /// # Panics
    /// Panics (debug) if `upper` is 0.
    #[inline]
    pub fn next_below(&mut self, upper: u64) -> u64 {
        debug_assert!(upper > 0, "upper bound must be > 0");

        if upper.is_power_of_two() {
            // High bits: XorShift's low bits are weaker.
            return (self.next_u64() >> 1) & (upper - 1);
        }

        // Lemire rejection threshold: 2^64 mod upper, the zone that would bias.
        let threshold = upper.wrapping_neg() % upper;
        loop {
            let x = self.next_u64();
            let m = (x as u128) * (upper as u128);
            if (m as u64) >= threshold {
                return (m >> 64) as u64;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_same_sequence() {
        let mut a = XorShift64::new(42);
        let mut b = XorShift64::new(42);
        for _ in 0..100 {
            assert_eq!(a.next_u64(), b.next_u64());
        }
    }

    #[test]
    fn zero_seed_does_not_lock_up() {
        let mut rng = XorShift64::new(0);
        let first = rng.next_u64();
        assert_ne!(first, 0);
        assert_ne!(first, rng.next_u64());
    }

    #[test]
    fn bounded_values_stay_in_range() {
        let mut rng = XorShift64::new(7);
        for upper in [1u64, 2, 3, 10, 64, 100, 1 << 40] {
            for _ in 0..200 {
                assert!(rng.next_below(upper) < upper);
            }
        }
    }

    #[test]
    fn clone_forks_identical_stream() {
        let mut a = XorShift64::new(99);
        let mut b = a.clone();
        assert_eq!(a.next_u64(), b.next_u64());
    }
}
