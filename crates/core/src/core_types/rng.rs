//! Random sampling for seeding, reseed jitter, and turbulence.
//!
//! One generator lives for the whole simulation. Seeding it makes a run
//! fully reproducible, which the tests rely on.

use crate::core_types::vec3::Vec3;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Bounded uniform float source.
#[derive(Debug, Clone)]
pub struct FlowRng {
    inner: StdRng,
}

impl FlowRng {
    /// Deterministic generator for reproducible runs.
    pub fn from_seed(seed: u64) -> Self {
        Self {
            inner: StdRng::seed_from_u64(seed),
        }
    }

    /// Generator seeded from the operating system.
    pub fn from_entropy() -> Self {
        Self {
            inner: StdRng::from_os_rng(),
        }
    }

    /// Uniform sample in `[min, max)`.
    ///
    /// Degenerate ranges (`min >= max`, or non-finite bounds) return `min`
    /// (or 0 when `min` itself is not finite) instead of panicking.
    pub fn range(&mut self, min: f32, max: f32) -> f32 {
        if !min.is_finite() {
            return 0.0;
        }
        if !max.is_finite() || min >= max {
            return min;
        }
        self.inner.random_range(min..max)
    }

    /// Uniform sample in `[-amount, amount)`; zero for non-positive amounts.
    pub fn jitter(&mut self, amount: f32) -> f32 {
        if amount > 0.0 {
            self.range(-amount, amount)
        } else {
            0.0
        }
    }

    /// Independent per-axis jitter.
    pub fn jitter_vec(&mut self, amount: f32) -> Vec3 {
        Vec3::new(
            self.jitter(amount),
            self.jitter(amount),
            self.jitter(amount),
        )
    }

    /// Uniform index in `0..len`; 0 when `len` is 0.
    pub fn index(&mut self, len: usize) -> usize {
        if len == 0 {
            0
        } else {
            self.inner.random_range(0..len)
        }
    }
}

impl Default for FlowRng {
    fn default() -> Self {
        Self::from_entropy()
    }
}
