//! Injectable random sources for question selection.

use std::collections::VecDeque;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// The randomness a selection policy consumes.
pub trait RandomSource: Send {
    /// A uniform draw from `[0, 1)`.
    fn unit(&mut self) -> f64;

    /// A uniform index in `0..len`. `len` is never zero.
    fn index(&mut self, len: usize) -> usize;
}

/// A [`RandomSource`] backed by a standard PRNG.
pub struct SeededRandom {
    rng: StdRng,
}

impl SeededRandom {
    /// Seed from the operating system.
    pub fn from_entropy() -> Self {
        Self {
            rng: StdRng::from_os_rng(),
        }
    }

    /// A reproducible sequence.
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl RandomSource for SeededRandom {
    fn unit(&mut self) -> f64 {
        self.rng.random::<f64>()
    }

    fn index(&mut self, len: usize) -> usize {
        self.rng.random_range(0..len)
    }
}

/// Replays fixed draws, for forcing a particular selection path.
///
/// Once a queue runs dry it yields `0.0` and index `0`.
#[derive(Debug, Default, Clone)]
pub struct ScriptedRandom {
    units: VecDeque<f64>,
    indices: VecDeque<usize>,
}

impl ScriptedRandom {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue unit draws.
    pub fn with_units(mut self, units: impl IntoIterator<Item = f64>) -> Self {
        self.units.extend(units);
        self
    }

    /// Queue index draws. Each is reduced modulo the requested length.
    pub fn with_indices(mut self, indices: impl IntoIterator<Item = usize>) -> Self {
        self.indices.extend(indices);
        self
    }
}

impl RandomSource for ScriptedRandom {
    fn unit(&mut self) -> f64 {
        self.units.pop_front().unwrap_or(0.0)
    }

    fn index(&mut self, len: usize) -> usize {
        self.indices.pop_front().unwrap_or(0) % len
    }
}
