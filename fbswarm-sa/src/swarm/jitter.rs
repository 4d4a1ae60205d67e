//! Injectable random perturbation for agent scores
//!
//! Each agent adds a uniform random amount in `[0, span)` to its score. The
//! source of that randomness is passed in explicitly so tests and replays can
//! fix it.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Produces the random perturbation added to an agent score
pub trait JitterSource {
    /// Sample a value in `[0, span)`; returns 0 for a non-positive span
    fn sample(&mut self, span: f64) -> f64;
}

/// Uniform jitter drawn from any `rand` generator
#[derive(Debug, Clone)]
pub struct RandomJitter<R> {
    rng: R,
}

impl<R: Rng> RandomJitter<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }
}

impl RandomJitter<StdRng> {
    /// Reproducible jitter from a fixed seed
    pub fn seeded(seed: u64) -> Self {
        Self::new(StdRng::seed_from_u64(seed))
    }

    /// Jitter seeded from operating system entropy
    pub fn from_entropy() -> Self {
        Self::new(StdRng::from_entropy())
    }
}

impl<R: Rng> JitterSource for RandomJitter<R> {
    fn sample(&mut self, span: f64) -> f64 {
        if span <= 0.0 {
            return 0.0;
        }
        self.rng.gen_range(0.0..span)
    }
}

/// Jitter that always lands at the same fraction of the span
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedJitter {
    fraction: f64,
}

impl FixedJitter {
    /// `fraction` is clamped into `[0, 1)`
    pub fn new(fraction: f64) -> Self {
        Self {
            fraction: fraction.clamp(0.0, 1.0 - f64::EPSILON),
        }
    }

    /// No perturbation at all
    pub fn zero() -> Self {
        Self::new(0.0)
    }
}

impl JitterSource for FixedJitter {
    fn sample(&mut self, span: f64) -> f64 {
        if span <= 0.0 {
            return 0.0;
        }
        self.fraction * span
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_random_jitter_stays_in_range() {
        let mut jitter = RandomJitter::seeded(7);
        for _ in 0..1_000 {
            let value = jitter.sample(35.0);
            assert!((0.0..35.0).contains(&value), "out of range: {}", value);
        }
    }

    #[test]
    fn test_seeded_jitter_is_reproducible() {
        let mut a = RandomJitter::seeded(1234);
        let mut b = RandomJitter::seeded(1234);
        for _ in 0..10 {
            assert_eq!(a.sample(50.0), b.sample(50.0));
        }
    }

    #[test]
    fn test_zero_span() {
        assert_eq!(RandomJitter::seeded(1).sample(0.0), 0.0);
        assert_eq!(FixedJitter::new(0.5).sample(0.0), 0.0);
    }

    #[test]
    fn test_fixed_jitter() {
        let mut half = FixedJitter::new(0.5);
        assert_eq!(half.sample(30.0), 15.0);
        assert_eq!(FixedJitter::zero().sample(50.0), 0.0);
    }

    #[test]
    fn test_fixed_jitter_never_reaches_span() {
        let mut max = FixedJitter::new(3.0);
        assert!(max.sample(30.0) < 30.0);
    }
}
