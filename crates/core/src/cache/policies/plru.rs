//! Pseudo-LRU (PLRU) Replacement Policy.
//!
//! PLRU approximates Least Recently Used with one bit per way. Touching a way
//! sets its bit; once every bit is set, all bits except the latest are
//! cleared. The victim is the lowest way whose bit is clear.
//!
//! # Performance
//!
//! - **Time Complexity:** `update()` and `get_victim()` are O(1) / O(W)
//! - **Space Complexity:** W bits per set
//! - **Worst Case:** Pathological patterns can evict useful lines early

use super::ReplacementPolicy;

/// Widest set a PLRU policy can track, one MRU bit per way.
pub const PLRU_MAX_WAYS: usize = u64::BITS as usize;

/// PLRU Policy state for one set.
#[derive(Debug)]
pub struct PlruPolicy {
    /// One MRU bit per way.
    usage: u64,
    /// Number of ways in the set.
    ways: usize,
}

impl PlruPolicy {
    /// Creates a new PLRU policy for a set of `ways` ways.
    ///
    /// # Panics
    ///
    /// Panics if `ways` exceeds [`PLRU_MAX_WAYS`].
    pub fn new(ways: usize) -> Self {
        assert!(ways <= PLRU_MAX_WAYS, "PLRU supports at most {PLRU_MAX_WAYS} ways, got {ways}");
        Self { usage: 0, ways }
    }

    const fn all_ones(&self) -> u64 {
        if self.ways == PLRU_MAX_WAYS {
            u64::MAX
        } else {
            (1 << self.ways) - 1
        }
    }
}

impl ReplacementPolicy for PlruPolicy {
    fn update(&mut self, way: usize) {
        let mask = 1 << way;
        self.usage |= mask;

        let all_ones = self.all_ones();
        if self.usage & all_ones == all_ones {
            self.usage = mask;
        }
    }

    fn get_victim(&mut self) -> usize {
        (0..self.ways)
            .find(|&i| (self.usage >> i) & 1 == 0)
            .unwrap_or(0)
    }
}
