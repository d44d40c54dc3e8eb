//! Injectable randomness for circle placement and pulse selection.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

pub trait RandomSource {
    /// Uniform value in `[0, 1)`.
    fn next_f64(&mut self) -> f64;

    /// Uniform index in `0..len`; `len` must be non-zero.
    fn next_index(&mut self, len: usize) -> usize {
        ((self.next_f64() * len as f64) as usize).min(len.saturating_sub(1))
    }
}

pub struct ThreadRandom {
    rng: StdRng,
}

impl ThreadRandom {
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Default for ThreadRandom {
    fn default() -> Self {
        Self::new()
    }
}

impl RandomSource for ThreadRandom {
    fn next_f64(&mut self) -> f64 {
        self.rng.gen_range(0.0..1.0)
    }
}

/// Replays a fixed list of values, wrapping around at the end.
#[derive(Debug, Clone)]
pub struct SequenceRandom {
    values: Vec<f64>,
    position: usize,
}

impl SequenceRandom {
    pub fn new(values: Vec<f64>) -> Self {
        Self {
            values,
            position: 0,
        }
    }
}

impl RandomSource for SequenceRandom {
    fn next_f64(&mut self) -> f64 {
        if self.values.is_empty() {
            return 0.0;
        }
        let value = self.values[self.position % self.values.len()];
        self.position += 1;
        value.clamp(0.0, 0.999_999)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sequence_wraps() {
        let mut rng = SequenceRandom::new(vec![0.1, 0.2]);
        assert_eq!(rng.next_f64(), 0.1);
        assert_eq!(rng.next_f64(), 0.2);
        assert_eq!(rng.next_f64(), 0.1);
    }

    #[test]
    fn test_empty_sequence_yields_zero() {
        let mut rng = SequenceRandom::new(Vec::new());
        assert_eq!(rng.next_f64(), 0.0);
    }

    #[test]
    fn test_next_index_in_range() {
        let mut rng = SequenceRandom::new(vec![0.0, 0.5, 1.0]);
        assert_eq!(rng.next_index(4), 0);
        assert_eq!(rng.next_index(4), 2);
        assert_eq!(rng.next_index(4), 3);
    }

    #[test]
    fn test_thread_random_range() {
        let mut rng = ThreadRandom::seeded(7);
        for _ in 0..1000 {
            let v = rng.next_f64();
            assert!((0.0..1.0).contains(&v));
        }
    }
}
