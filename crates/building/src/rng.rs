//! Deterministic placement RNG.
//!
//! Wraps `ChaCha8Rng` so prefab variant selection is reproducible: identical
//! seeds and identical placement sequences pick identical variants.

use bitcode::{Decode, Encode};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::config::DEFAULT_SEED;

/// Captures the full internal state of a `ChaCha8Rng` so it can be
/// round-tripped through bitcode alongside a grid snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode)]
pub struct RngSnapshot {
    seed: [u8; 32],
    word_pos: u128,
    stream: u64,
}

impl RngSnapshot {
    fn from_rng(rng: &ChaCha8Rng) -> Self {
        Self {
            seed: rng.get_seed(),
            word_pos: rng.get_word_pos(),
            stream: rng.get_stream(),
        }
    }

    fn to_rng(&self) -> ChaCha8Rng {
        let mut rng = ChaCha8Rng::from_seed(self.seed);
        rng.set_stream(self.stream);
        rng.set_word_pos(self.word_pos);
        rng
    }
}

/// Seeded RNG used for all placement randomness.
#[derive(Debug, Clone)]
pub struct PlacementRng(pub ChaCha8Rng);

impl Default for PlacementRng {
    fn default() -> Self {
        Self::from_seed_u64(DEFAULT_SEED)
    }
}

impl PlacementRng {
    pub fn from_seed_u64(seed: u64) -> Self {
        Self(ChaCha8Rng::seed_from_u64(seed))
    }

    pub fn snapshot(&self) -> RngSnapshot {
        RngSnapshot::from_rng(&self.0)
    }

    pub fn restore(snapshot: &RngSnapshot) -> Self {
        Self(snapshot.to_rng())
    }
}
