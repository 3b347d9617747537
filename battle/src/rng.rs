//! Randomness port
//!
//! Accuracy rolls, status chances and strategy tie-breaks all draw from one
//! generator per arena. Tests seed it; production uses entropy.

use rand::rngs::SmallRng;
use rand::{Rng, RngCore, SeedableRng};

/// Generator owned by an arena
pub type ArenaRng = Box<dyn RngCore + Send>;

/// Deterministic generator for reproducible battles
pub fn seeded(seed: u64) -> ArenaRng {
    Box::new(SmallRng::seed_from_u64(seed))
}

pub fn from_entropy() -> ArenaRng {
    Box::new(SmallRng::from_entropy())
}

/// Seeded when a seed is given, entropy otherwise
pub fn from_seed(seed: Option<u64>) -> ArenaRng {
    match seed {
        Some(seed) => seeded(seed),
        None => from_entropy(),
    }
}

/// Roll a d100 and compare against a percentage (0..=100)
pub(crate) fn roll_percent(rng: &mut dyn RngCore, chance: u8) -> bool {
    rng.gen_range(1..=100u32) <= u32::from(chance)
}
