//! Deterministic random number generation.
//!
//! RULE: Nothing in the pipeline may call any platform RNG.
//! Every stochastic stage takes an explicit seed and derives its own
//! StageRng from (seed XOR stage_index). This means:
//!   - Two stages handed the same seed never share a stream.
//!   - Each stage's stream is fully reproducible in isolation.
//!
//! Sampling goes through `rand` and `rand_distr`; StageRng only owns the
//! seeded generator. Invalid distribution parameters fall back to a
//! degenerate draw instead of panicking.

use rand::{distributions::WeightedIndex, seq::SliceRandom, Rng, RngCore, SeedableRng};
use rand_distr::{Beta, Distribution, Exp, LogNormal, Normal, Poisson};
use rand_pcg::Pcg64Mcg;

/// A named, deterministic RNG for a single pipeline stage.
pub struct StageRng {
    pub name: &'static str,
    inner: Pcg64Mcg,
}

impl StageRng {
    /// Create a stage RNG from an explicit seed and the stage slot.
    pub fn new(seed: u64, slot: StageSlot) -> Self {
        let derived_seed = seed ^ (slot as u64).wrapping_mul(0x9e37_79b9_7f4a_7c15);
        Self {
            name: slot.name(),
            inner: Pcg64Mcg::seed_from_u64(derived_seed),
        }
    }

    /// Roll a float in [0.0, 1.0).
    pub fn next_f64(&mut self) -> f64 {
        self.inner.gen()
    }

    /// Draw a raw u64 (full range).
    pub fn next_u64(&mut self) -> u64 {
        self.inner.next_u64()
    }

    /// Roll a u64 in [low, high). Panics on an empty range.
    pub fn range_u64(&mut self, low: u64, high: u64) -> u64 {
        self.inner.gen_range(low..high)
    }

    /// Roll an index in [0, n). Panics when n is 0.
    pub fn next_index(&mut self, n: usize) -> usize {
        self.inner.gen_range(0..n)
    }

    /// Uniform float in [low, high).
    pub fn uniform(&mut self, low: f64, high: f64) -> f64 {
        if low < high {
            self.inner.gen_range(low..high)
        } else {
            low
        }
    }

    /// Bernoulli trial: returns true with probability p.
    pub fn chance(&mut self, p: f64) -> bool {
        self.next_f64() < p
    }

    pub fn normal(&mut self, mean: f64, std_dev: f64) -> f64 {
        match Normal::new(mean, std_dev) {
            Ok(d) => d.sample(&mut self.inner),
            Err(_) => mean,
        }
    }

    /// exp(N(mu, sigma)).
    pub fn log_normal(&mut self, mu: f64, sigma: f64) -> f64 {
        match LogNormal::new(mu, sigma) {
            Ok(d) => d.sample(&mut self.inner),
            Err(_) => mu.exp(),
        }
    }

    /// Exponential draw with the given mean.
    pub fn exponential(&mut self, mean: f64) -> f64 {
        match Exp::new(1.0 / mean) {
            Ok(d) if mean > 0.0 => d.sample(&mut self.inner),
            _ => 0.0,
        }
    }

    /// Poisson draw; a non-positive rate yields 0.
    pub fn poisson(&mut self, lambda: f64) -> u64 {
        match Poisson::new(lambda) {
            Ok(d) => {
                let k: f64 = d.sample(&mut self.inner);
                k as u64
            }
            Err(_) => 0,
        }
    }

    /// Beta draw in (0, 1).
    pub fn beta(&mut self, alpha: f64, beta: f64) -> f64 {
        match Beta::new(alpha, beta) {
            Ok(d) => d.sample(&mut self.inner),
            Err(_) => alpha / (alpha + beta),
        }
    }

    /// Pick an index according to `weights` (need not sum to 1).
    /// Falls back to a uniform pick when no weight is positive.
    pub fn pick_weighted(&mut self, weights: &[f64]) -> usize {
        match WeightedIndex::new(weights) {
            Ok(d) => d.sample(&mut self.inner),
            Err(_) => self.next_index(weights.len().max(1)),
        }
    }

    /// `amount` distinct indices from [0, n), in draw order.
    pub fn sample_indices(&mut self, n: usize, amount: usize) -> Vec<usize> {
        rand::seq::index::sample(&mut self.inner, n, amount.min(n)).into_vec()
    }

    pub fn shuffle<T>(&mut self, items: &mut [T]) {
        items.shuffle(&mut self.inner);
    }
}

/// Stable stage slot assignments.
/// NEVER reorder or remove entries. Append only.
/// Reordering changes every stage's stream.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u64)]
pub enum StageSlot {
    Split = 0,
    Bootstrap = 1,
    Boosting = 2,
    Bernoulli = 3,
    Clustering = 4,
    Customers = 5,
    Campaigns = 6,
    Outliers = 7,
    // Add new stages here, append only.
}

impl StageSlot {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Split => "split",
            Self::Bootstrap => "bootstrap",
            Self::Boosting => "boosting",
            Self::Bernoulli => "bernoulli",
            Self::Clustering => "clustering",
            Self::Customers => "customers",
            Self::Campaigns => "campaigns",
            Self::Outliers => "outliers",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_same_stream() {
        let mut a = StageRng::new(42, StageSlot::Bernoulli);
        let mut b = StageRng::new(42, StageSlot::Bernoulli);
        for _ in 0..100 {
            assert_eq!(a.next_u64(), b.next_u64());
        }
    }

    #[test]
    fn stages_do_not_share_streams() {
        let mut split = StageRng::new(42, StageSlot::Split);
        let mut draws = StageRng::new(42, StageSlot::Bernoulli);
        let a: Vec<u64> = (0..8).map(|_| split.next_u64()).collect();
        let b: Vec<u64> = (0..8).map(|_| draws.next_u64()).collect();
        assert_ne!(a, b);
    }

    #[test]
    fn shuffle_is_a_permutation() {
        let mut rng = StageRng::new(7, StageSlot::Split);
        let mut items: Vec<usize> = (0..50).collect();
        rng.shuffle(&mut items);
        let mut sorted = items.clone();
        sorted.sort_unstable();
        assert_eq!(sorted, (0..50).collect::<Vec<_>>());
    }

    #[test]
    fn beta_draws_stay_in_unit_interval() {
        let mut rng = StageRng::new(3, StageSlot::Campaigns);
        for _ in 0..200 {
            let x = rng.beta(2.0, 50.0);
            assert!(x > 0.0 && x < 1.0, "beta draw {x} out of range");
        }
    }

    #[test]
    fn poisson_mean_holds_for_large_rates() {
        for lambda in [3.0, 1000.0] {
            let mut rng = StageRng::new(42, StageSlot::Customers);
            let mean = (0..2000).map(|_| rng.poisson(lambda) as f64).sum::<f64>() / 2000.0;
            assert!(
                (mean - lambda).abs() < lambda * 0.05,
                "poisson({lambda}) sample mean {mean}"
            );
        }
    }

    /// 2^63 + 1 does not divide 2^64, so a modulo reduction would put
    /// almost every draw in the lower half.
    #[test]
    fn bounded_draws_are_unbiased() {
        let mut rng = StageRng::new(11, StageSlot::Split);
        let n = (1u64 << 63) + 1;
        let upper = (0..4000).filter(|_| rng.range_u64(0, n) >= n / 2).count();
        assert!((1800..=2200).contains(&upper), "upper half draws {upper} of 4000");
    }

    #[test]
    fn weighted_pick_follows_weights() {
        let mut rng = StageRng::new(5, StageSlot::Campaigns);
        let mut counts = [0usize; 3];
        for _ in 0..3000 {
            counts[rng.pick_weighted(&[0.0, 1.0, 3.0])] += 1;
        }
        assert_eq!(counts[0], 0);
        assert!(counts[2] > counts[1] * 2, "counts {counts:?}");
        assert!(rng.pick_weighted(&[0.0, 0.0]) < 2);
    }

    #[test]
    fn sampled_indices_are_distinct() {
        let mut rng = StageRng::new(9, StageSlot::Bootstrap);
        let mut picked = rng.sample_indices(10, 4);
        assert_eq!(picked.len(), 4);
        picked.sort_unstable();
        picked.dedup();
        assert_eq!(picked.len(), 4);
        assert!(picked.iter().all(|&i| i < 10));
    }
}
