//! The single pseudo-random source threaded through planning and resolution.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Seedable RNG used by every random mode of a fill.
///
/// Two fills with the same seed and inputs draw the same sequence and so
/// produce identical output.
#[derive(Debug, Clone)]
pub struct FillRng {
    rng: StdRng,
    seed: Option<u64>,
}

impl FillRng {
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            seed: Some(seed),
        }
    }

    /// Seeded from the operating system.
    pub fn from_os() -> Self {
        Self {
            rng: StdRng::from_os_rng(),
            seed: None,
        }
    }

    pub fn from_seed(seed: Option<u64>) -> Self {
        match seed {
            Some(s) => Self::seeded(s),
            None => Self::from_os(),
        }
    }

    pub fn seed(&self) -> Option<u64> {
        self.seed
    }

    /// Uniform draw from `[min, max]`; returns `min` for an empty range.
    pub fn uniform(&mut self, min: f64, max: f64) -> f64 {
        if max > min {
            self.rng.random_range(min..=max)
        } else {
            min
        }
    }

    /// Uniform index in `[0, len)`; zero when `len` is zero.
    pub fn index(&mut self, len: usize) -> usize {
        if len > 1 {
            self.rng.random_range(0..len)
        } else {
            0
        }
    }
}
