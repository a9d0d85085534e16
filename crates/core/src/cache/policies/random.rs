//! Random Replacement Policy.
//!
//! This policy evicts a pseudo-random way. It uses a xorshift generator
//! rather than a full RNG so runs stay reproducible.

use super::ReplacementPolicy;

/// Base seed mixed with the set index.
const SEED: u64 = 123456789;

/// Random Policy state for one set.
#[derive(Debug)]
pub struct RandomPolicy {
    /// Number of ways in the set.
    ways: usize,
    /// Internal state for the pseudo-random number generator.
    state: u64,
}

impl RandomPolicy {
    /// Creates a new Random policy for a set of `ways` ways.
    ///
    /// `stream` decorrelates the sequences of different sets.
    pub const fn new(ways: usize, stream: u64) -> Self {
        let state = SEED ^ stream.wrapping_mul(0x9E37_79B9_7F4A_7C15);
        Self {
            ways,
            // xorshift never leaves the all-zero state.
            state: if state == 0 { SEED } else { state },
        }
    }
}

impl ReplacementPolicy for RandomPolicy {
    /// Access patterns do not affect random replacement.
    fn update(&mut self, _way: usize) {}

    fn get_victim(&mut self) -> usize {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.state = x;
        (x as usize) % self.ways
    }
}
