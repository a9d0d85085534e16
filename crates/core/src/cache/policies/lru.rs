//! Least Recently Used (LRU) Replacement Policy.
//!
//! This policy evicts the line that has not been accessed for the longest time.
//! It maintains a usage stack for the set. When a way is touched, it moves
//! to the top (Most Recently Used position). The bottom of the stack is the
//! Least Recently Used way.
//!
//! # Performance
//!
//! - **Time Complexity:**
//!   - `update()`: O(W) where W is the associativity
//!   - `get_victim()`: O(1)
//! - **Space Complexity:** O(W) per set
//! - **Worst Case:** Scanning patterns larger than the set (thrashing)

use super::ReplacementPolicy;

/// LRU Policy state for one set.
#[derive(Debug)]
pub struct LruPolicy {
    /// Usage stack; index 0 is MRU, the last index is LRU.
    usage: Vec<usize>,
}

impl LruPolicy {
    /// Creates a new LRU policy for a set of `ways` ways.
    ///
    /// The initial stack is `[0, 1, .., ways - 1]`, so the highest way is the
    /// first victim.
    pub fn new(ways: usize) -> Self {
        Self {
            usage: (0..ways).collect(),
        }
    }
}

impl ReplacementPolicy for LruPolicy {
    /// Moves `way` to the MRU position, shifting the others down.
    fn update(&mut self, way: usize) {
        if let Some(pos) = self.usage.iter().position(|&x| x == way) {
            let _ = self.usage.remove(pos);
        }
        self.usage.insert(0, way);
    }

    fn get_victim(&mut self) -> usize {
        self.usage.last().copied().unwrap_or(0)
    }
}
