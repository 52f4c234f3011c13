//! Seedable random integers for the games.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Source of uniformly distributed integers.
pub trait RandomSource {
    /// Draw an integer from `low..=high`. Callers guarantee `low <= high`.
    fn between(&mut self, low: i64, high: i64) -> i64;
}

/// [`RandomSource`] backed by the standard seedable PRNG.
#[derive(Debug, Clone)]
pub struct SeededRandom {
    rng: StdRng,
}

impl SeededRandom {
    /// Deterministic generator; identical seeds replay identical sequences.
    pub fn from_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn from_entropy() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    /// Seeded when `seed` is set, entropy-backed otherwise.
    pub fn new(seed: Option<u64>) -> Self {
        match seed {
            Some(seed) => Self::from_seed(seed),
            None => Self::from_entropy(),
        }
    }
}

impl RandomSource for SeededRandom {
    fn between(&mut self, low: i64, high: i64) -> i64 {
        self.rng.gen_range(low..=high)
    }
}
