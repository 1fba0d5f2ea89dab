use rand::{Rng, SeedableRng};
use rand_pcg::Pcg64;

/// Picks one entry out of a pool of `len` candidates.
///
/// Implementations must return an index below `len`; `len` is never zero
/// because catalogs are validated before drawing.
pub trait TextSelector {
    fn pick_index(&mut self, len: usize) -> usize;
}

/// Uniform random selection backed by a PCG generator.
#[derive(Debug, Clone)]
pub struct RandomSelector {
    rng: Pcg64,
}

impl RandomSelector {
    /// Seeded from OS entropy.
    pub fn new() -> Self {
        Self {
            rng: Pcg64::from_entropy(),
        }
    }

    /// Reproducible selection for simulations and tests.
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: Pcg64::seed_from_u64(seed),
        }
    }
}

impl Default for RandomSelector {
    fn default() -> Self {
        Self::new()
    }
}

impl TextSelector for RandomSelector {
    fn pick_index(&mut self, len: usize) -> usize {
        if len == 0 {
            return 0;
        }
        self.rng.gen_range(0..len)
    }
}

/// Always picks the first entry.
#[derive(Debug, Clone, Copy, Default)]
pub struct FirstSelector;

impl TextSelector for FirstSelector {
    fn pick_index(&mut self, _len: usize) -> usize {
        0
    }
}
