use std::fmt;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Source of uniform randomness used for every sampled quantity in the
/// animation (launch sites, burst angles, lifetimes, glow rolls).
///
/// Only [`RandomSource::next_unit`] must be provided; the remaining helpers
/// derive from it so scripted sources behave identically to real ones.
pub trait RandomSource {
    /// Uniform sample in `[0, 1)`.
    fn next_unit(&mut self) -> f32;

    /// Uniform sample in `[min, max]`.
    fn uniform(&mut self, min: f32, max: f32) -> f32 {
        min + (max - min) * self.next_unit()
    }

    /// Uniform integer in the inclusive range `[min, max]`.
    fn uniform_int(&mut self, min: u32, max: u32) -> u32 {
        if max <= min {
            return min;
        }
        let span = max - min;
        let offset = (self.next_unit() * (span as f32 + 1.0)) as u32;
        min + offset.min(span)
    }

    /// Returns `true` with the given probability.
    fn chance(&mut self, probability: f32) -> bool {
        self.next_unit() < probability
    }

    /// Uniform index into a collection of `len` items. `len` must be non-zero.
    fn index(&mut self, len: usize) -> usize {
        let index = (self.next_unit() * len as f32) as usize;
        index.min(len.saturating_sub(1))
    }
}

/// [`RandomSource`] backed by a ChaCha generator.
pub struct RngSource {
    rng: ChaCha8Rng,
}

impl RngSource {
    /// Seeds from the operating system; every run looks different.
    pub fn from_entropy() -> Self {
        Self {
            rng: ChaCha8Rng::from_entropy(),
        }
    }

    /// Reproducible sequence for tests and `--seed` runs.
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }
}

impl RandomSource for RngSource {
    fn next_unit(&mut self) -> f32 {
        self.rng.gen::<f32>()
    }
}

impl fmt::Debug for RngSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RngSource").finish()
    }
}

/// Replays a fixed list of unit values in a loop.
#[derive(Debug, Clone)]
pub struct ScriptedSource {
    values: Vec<f32>,
    cursor: usize,
}

impl ScriptedSource {
    /// Values are clamped into `[0, 1)`. An empty list behaves like `[0.0]`.
    pub fn new(values: Vec<f32>) -> Self {
        let values = if values.is_empty() {
            vec![0.0]
        } else {
            values
                .into_iter()
                .map(|value| value.clamp(0.0, 1.0 - f32::EPSILON))
                .collect()
        };
        Self { values, cursor: 0 }
    }

    /// Always returns the same value.
    pub fn constant(value: f32) -> Self {
        Self::new(vec![value])
    }

    /// Number of values drawn so far.
    pub fn draws(&self) -> usize {
        self.cursor
    }
}

impl RandomSource for ScriptedSource {
    fn next_unit(&mut self) -> f32 {
        let value = self.values[self.cursor % self.values.len()];
        self.cursor += 1;
        value
    }
}
