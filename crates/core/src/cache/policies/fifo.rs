//! First-In, First-Out (FIFO) Replacement Policy.
//!
//! This policy evicts the oldest line in a set, regardless of how recently
//! it was accessed. It operates as a round-robin pointer over the ways.
//! When a fill lands on the way under the pointer, the pointer advances.
//!
//! # Performance
//!
//! - **Time Complexity:** `update()` and `get_victim()` are O(1)
//! - **Space Complexity:** O(1) per set
//! - **Best Case:** Streaming accesses where all lines have equal importance
//! - **Worst Case:** Workloads with strong temporal locality

use super::ReplacementPolicy;

/// FIFO Policy state for one set.
#[derive(Debug)]
pub struct FifoPolicy {
    /// The next way to be evicted.
    next_way: usize,
    /// Number of ways in the set.
    ways: usize,
}

impl FifoPolicy {
    /// Creates a new FIFO policy for a set of `ways` ways.
    pub const fn new(ways: usize) -> Self {
        Self { next_way: 0, ways }
    }
}

impl ReplacementPolicy for FifoPolicy {
    /// Advances the pointer when the touched way is the current head, which
    /// keeps fills in first-in order. Hits on other ways are ignored.
    fn update(&mut self, way: usize) {
        if self.next_way == way {
            self.next_way = (self.next_way + 1) % self.ways;
        }
    }

    fn get_victim(&mut self) -> usize {
        self.next_way
    }
}
