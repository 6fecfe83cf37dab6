//! Seeded random source threaded through a run.
//!
//! Every random decision a run makes goes through one `RngSource`, so the
//! whole simulation is a pure function of the seed and the caller's inputs.
//! Each helper consumes a fixed number of draws, which keeps the stream
//! position stable across platforms.

use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RngSource {
    rng: ChaCha8Rng,
    draws: u64,
}

impl RngSource {
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            draws: 0,
        }
    }

    pub fn next_u64(&mut self) -> u64 {
        self.draws += 1;
        self.rng.next_u64()
    }

    /// Uniform float in `[0, 1)` built from the top 53 bits of one draw.
    pub fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 * (1.0 / (1u64 << 53) as f64)
    }

    /// Uniform integer in `[lo, hi)`. Returns `lo` without drawing when the range is empty.
    pub fn next_range(&mut self, lo: i64, hi: i64) -> i64 {
        if hi <= lo {
            return lo;
        }
        let span = hi.abs_diff(lo);
        lo.wrapping_add((self.next_u64() % span) as i64)
    }

    /// Bernoulli trial. Certain outcomes do not consume a draw.
    pub fn roll(&mut self, chance: f64) -> bool {
        if chance <= 0.0 {
            return false;
        }
        if chance >= 1.0 {
            return true;
        }
        self.next_f64() < chance
    }

    /// Index chosen proportionally to `weights`, or `None` when every weight is zero.
    pub fn pick_weighted(&mut self, weights: &[u32]) -> Option<usize> {
        let total: u64 = weights.iter().map(|w| *w as u64).sum();
        if total == 0 {
            return None;
        }
        let mut point = self.next_range(0, total as i64) as u64;
        for (index, weight) in weights.iter().enumerate() {
            let weight = *weight as u64;
            if point < weight {
                return Some(index);
            }
            point -= weight;
        }
        None
    }

    /// First `k` positions of a partial Fisher-Yates shuffle over `0..n`.
    pub fn sample_indices(&mut self, n: usize, k: usize) -> Vec<usize> {
        let k = k.min(n);
        let mut indices: Vec<usize> = (0..n).collect();
        for i in 0..k {
            let j = self.next_range(i as i64, n as i64) as usize;
            indices.swap(i, j);
        }
        indices.truncate(k);
        indices
    }

    /// Number of draws consumed so far.
    pub fn draws(&self) -> u64 {
        self.draws
    }
}
