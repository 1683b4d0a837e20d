//! Uniform random selection shared by every shuffle in the game
//!
//! Answer placement, the fifty-fifty pick and phone-a-friend sampling all go
//! through [`draw`], so a seeded `StdRng` reproduces a whole game in tests.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Randomness source owned by the game
pub type GameRng = StdRng;

pub fn from_os() -> GameRng {
    StdRng::from_os_rng()
}

pub fn seeded(seed: u64) -> GameRng {
    StdRng::seed_from_u64(seed)
}

/// Take up to `count` items from `pool`, uniformly without replacement.
///
/// Repeatedly picks a random remaining index and removes it. Drawing the whole
/// pool yields a uniform permutation.
pub fn draw<T, R: Rng + ?Sized>(mut pool: Vec<T>, count: usize, rng: &mut R) -> Vec<T> {
    let mut chosen = Vec::with_capacity(count.min(pool.len()));
    while chosen.len() < count && !pool.is_empty() {
        let idx = rng.random_range(0..pool.len());
        chosen.push(pool.remove(idx));
    }
    chosen
}

/// Uniform permutation of `pool`
pub fn shuffled<T, R: Rng + ?Sized>(pool: Vec<T>, rng: &mut R) -> Vec<T> {
    let len = pool.len();
    draw(pool, len, rng)
}
