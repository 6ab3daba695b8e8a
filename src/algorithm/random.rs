//! Pluggable random source used for tie-breaking among qualifying candidates

use rand::{Rng, SeedableRng, rngs::StdRng};

/// Source of uniform random choices
///
/// The selector and grid synthesis draw all randomness through this trait so
/// tests can substitute a scripted sequence.
pub trait RandomSource {
    /// Uniform index in `0..len`
    ///
    /// Callers never pass `len == 0`; implementations return 0 if they do.
    fn choose_index(&mut self, len: usize) -> usize;

    /// Uniform value in `[0, 1)`
    fn unit(&mut self) -> f64;
}

/// Seeded random selector for reproducible stochastic choices
#[derive(Clone, Debug)]
pub struct RandomSelector {
    rng: StdRng,
}

impl RandomSelector {
    /// Create a deterministic random selector
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Create a selector seeded from operating system entropy
    pub fn from_entropy() -> Self {
        Self {
            rng: StdRng::from_os_rng(),
        }
    }
}

impl RandomSource for RandomSelector {
    fn choose_index(&mut self, len: usize) -> usize {
        if len == 0 {
            return 0;
        }
        self.rng.random_range(0..len)
    }

    fn unit(&mut self) -> f64 {
        self.rng.random::<f64>()
    }
}
