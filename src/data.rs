//! Input data generation.
//!
//! The benchmark operates on two equal-length buffers of 32-bit floats,
//! generated once and shared read-only by every strategy.  The default
//! generator draws from the thread-local OS-entropy RNG, so runs are not
//! reproducible — fine for throughput measurement, useless for regression
//! testing, which is why a seeded variant exists alongside it.

use std::ops::Range;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Two equal-length input buffers.
///
/// Both buffers always have the same length; the constructors enforce it.
/// Strategies receive the set behind an `Arc` and never mutate it.
#[derive(Debug, Clone)]
pub struct InputSet {
    pub a: Vec<f32>,
    pub b: Vec<f32>,
}

impl InputSet {
    /// Wrap two existing buffers.  Panics if the lengths differ.
    pub fn from_vecs(a: Vec<f32>, b: Vec<f32>) -> Self {
        assert_eq!(a.len(), b.len(), "input buffers must have equal length");
        Self { a, b }
    }

    /// Number of elements in each buffer.
    pub fn len(&self) -> usize {
        self.a.len()
    }

    pub fn is_empty(&self) -> bool {
        self.a.is_empty()
    }
}

/// Generate `len` elements per buffer, each drawn independently from a
/// uniform distribution over `range`.
///
/// Seeded from OS entropy; two invocations produce different data.  The
/// range must be non-empty (`start < end`).
pub fn generate(len: usize, range: Range<f32>) -> InputSet {
    let mut rng = rand::thread_rng();
    fill(&mut rng, len, range)
}

/// Deterministic variant of [`generate`] for tests and comparisons that
/// need identical inputs across runs.
pub fn generate_seeded(len: usize, range: Range<f32>, seed: u64) -> InputSet {
    let mut rng = StdRng::seed_from_u64(seed);
    fill(&mut rng, len, range)
}

fn fill<R: Rng>(rng: &mut R, len: usize, range: Range<f32>) -> InputSet {
    let a = (0..len).map(|_| rng.gen_range(range.clone())).collect();
    let b = (0..len).map(|_| rng.gen_range(range.clone())).collect();
    InputSet { a, b }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn buffers_have_the_requested_length() {
        for len in [1usize, 7, 64, 1024] {
            let inputs = generate(len, 0.0..1.0);
            assert_eq!(inputs.a.len(), len);
            assert_eq!(inputs.b.len(), len);
            assert_eq!(inputs.len(), len);
        }
    }

    #[test]
    fn elements_stay_within_the_range() {
        let inputs = generate(4096, -2.5..7.5);
        for &x in inputs.a.iter().chain(inputs.b.iter()) {
            assert!((-2.5..7.5).contains(&x), "value {x} out of range");
        }
    }

    #[test]
    fn seeded_generation_is_reproducible() {
        let first = generate_seeded(512, 0.0..1.0, 42);
        let second = generate_seeded(512, 0.0..1.0, 42);
        assert_eq!(first.a, second.a);
        assert_eq!(first.b, second.b);
    }

    #[test]
    fn the_two_buffers_are_independent() {
        let inputs = generate_seeded(512, 0.0..1.0, 7);
        assert_ne!(inputs.a, inputs.b);
    }

    #[test]
    fn zero_length_yields_empty_buffers() {
        let inputs = generate(0, 0.0..1.0);
        assert!(inputs.is_empty());
    }

    #[test]
    #[should_panic(expected = "equal length")]
    fn mismatched_buffers_are_rejected() {
        let _ = InputSet::from_vecs(vec![1.0, 2.0], vec![1.0]);
    }
}
