//! Most Recently Used (MRU) Replacement Policy.
//!
//! This policy evicts the line that was accessed most recently.
//! While counter-intuitive for standard workloads, MRU suits cyclic access
//! patterns (loops) whose footprint exceeds the set: the most recently used
//! line is the one least likely to be needed again soon.

use super::ReplacementPolicy;

/// MRU Policy state for one set.
#[derive(Debug)]
pub struct MruPolicy {
    /// Usage stack; index 0 is the MRU position (the victim).
    usage: Vec<usize>,
}

impl MruPolicy {
    /// Creates a new MRU policy for a set of `ways` ways.
    pub fn new(ways: usize) -> Self {
        Self {
            usage: (0..ways).collect(),
        }
    }
}

impl ReplacementPolicy for MruPolicy {
    fn update(&mut self, way: usize) {
        if let Some(pos) = self.usage.iter().position(|&x| x == way) {
            let _ = self.usage.remove(pos);
        }
        self.usage.insert(0, way);
    }

    fn get_victim(&mut self) -> usize {
        self.usage.first().copied().unwrap_or(0)
    }
}
