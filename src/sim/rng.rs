//! Seeded random source
//!
//! One instance per run, owned by `GameState`. Output is a pure function of
//! the seed and the number of calls made so far.

use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

#[derive(Debug, Clone)]
pub struct RandomSource {
    seed: u64,
    draws: u64,
    rng: Pcg32,
}

impl RandomSource {
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            draws: 0,
            rng: Pcg32::seed_from_u64(seed),
        }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Number of values drawn so far
    pub fn draws(&self) -> u64 {
        self.draws
    }

    /// Uniform float in `[0, 1)`
    pub fn next_float(&mut self) -> f32 {
        self.draws += 1;
        self.rng.random::<f32>()
    }

    /// Uniform integer in `[min, max]` (bounds may be given in either order)
    pub fn next_int(&mut self, min: i32, max: i32) -> i32 {
        self.draws += 1;
        let (lo, hi) = if min <= max { (min, max) } else { (max, min) };
        self.rng.random_range(lo..=hi)
    }

    /// Uniform float in `[min, max)`
    pub fn range(&mut self, min: f32, max: f32) -> f32 {
        min + (max - min) * self.next_float()
    }

    /// Pick one element, `None` for an empty slice
    pub fn pick<'a, T>(&mut self, items: &'a [T]) -> Option<&'a T> {
        if items.is_empty() {
            return None;
        }
        let idx = self.next_int(0, items.len() as i32 - 1) as usize;
        items.get(idx)
    }

    /// Shuffled copy of `items`
    pub fn shuffle<T: Clone>(&mut self, items: &[T]) -> Vec<T> {
        self.draws += 1;
        let mut out = items.to_vec();
        out.shuffle(&mut self.rng);
        out
    }
}
