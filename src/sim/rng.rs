//! Injected randomness
//!
//! AI code never calls a global PRNG. Everything random (dash angles, spawn points, wander
//! re-rolls, particle scatter) goes through a `RandomSource` owned by the session.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

/// Uniform random numbers for the simulation
pub trait RandomSource {
    /// Uniform in [0, 1)
    fn next_f32(&mut self) -> f32;

    /// True with probability `p`
    fn chance(&mut self, p: f32) -> bool {
        self.next_f32() < p
    }

    /// Uniform in [lo, hi)
    fn range(&mut self, lo: f32, hi: f32) -> f32 {
        lo + self.next_f32() * (hi - lo)
    }

    /// Uniform index in 0..n (n > 0)
    fn index(&mut self, n: usize) -> usize {
        ((self.next_f32() * n as f32) as usize).min(n.saturating_sub(1))
    }
}

impl RandomSource for Pcg32 {
    fn next_f32(&mut self) -> f32 {
        self.random::<f32>()
    }
}

/// Seeded generator for hosts that want reproducible sessions
pub fn seeded(seed: u64) -> Box<dyn RandomSource> {
    Box::new(Pcg32::seed_from_u64(seed))
}

/// Generator seeded from the thread RNG
pub fn from_entropy() -> Box<dyn RandomSource> {
    Box::new(Pcg32::from_rng(&mut rand::rng()))
}

/// Always returns the same value
#[derive(Debug, Clone, Copy)]
pub struct FixedRng(pub f32);

impl RandomSource for FixedRng {
    fn next_f32(&mut self) -> f32 {
        self.0
    }
}

/// Cycles through a fixed list of values
#[derive(Debug, Clone)]
pub struct SequenceRng {
    values: Vec<f32>,
    cursor: usize,
}

impl SequenceRng {
    pub fn new(values: Vec<f32>) -> Self {
        Self { values, cursor: 0 }
    }
}

impl RandomSource for SequenceRng {
    fn next_f32(&mut self) -> f32 {
        if self.values.is_empty() {
            return 0.0;
        }
        let v = self.values[self.cursor % self.values.len()];
        self.cursor += 1;
        v
    }
}
