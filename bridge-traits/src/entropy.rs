//! Entropy Source Abstractions
//!
//! Pluggable randomness used for select tie-breaking and for jittering
//! simulated task durations. None of the toolkit's correctness depends on the
//! quality of the numbers; a deterministic source is perfectly valid.

use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Entropy source trait
///
/// # Contract
///
/// `next_int(bound)` returns an integer in `[0, bound)`. `bound` must be
/// greater than zero.
pub trait EntropySource: Send + Sync {
    fn next_int(&self, bound: usize) -> usize;
}

/// Entropy drawn from the thread-local RNG.
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadRngEntropy;

impl EntropySource for ThreadRngEntropy {
    fn next_int(&self, bound: usize) -> usize {
        assert!(bound > 0, "entropy bound must be greater than 0");
        rand::thread_rng().gen_range(0..bound)
    }
}

/// Deterministic entropy for reproducible runs and tests.
#[derive(Debug)]
pub struct SeededEntropy {
    seed: u64,
    rng: Mutex<StdRng>,
}

impl SeededEntropy {
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }
}

impl EntropySource for SeededEntropy {
    fn next_int(&self, bound: usize) -> usize {
        assert!(bound > 0, "entropy bound must be greater than 0");
        self.rng.lock().gen_range(0..bound)
    }
}
