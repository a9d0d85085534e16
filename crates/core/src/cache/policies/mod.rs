//! Cache Replacement Policies.
//!
//! Every associative set owns one policy object that tracks the recency state
//! of its ways and nominates a victim when a fill finds no empty way.
//!
//! # Policies
//!
//! - `Fifo`: First-In, First-Out (round-robin).
//! - `Lru`: Least Recently Used.
//! - `Mru`: Most Recently Used.
//! - `Plru`: Pseudo-LRU (one bit per way).
//! - `Random`: Pseudo-random selection.

/// First-In, First-Out replacement policy.
pub mod fifo;

/// Least Recently Used replacement policy.
pub mod lru;

/// Most Recently Used replacement policy.
pub mod mru;

/// Pseudo-LRU replacement policy.
pub mod plru;

/// Random replacement policy.
pub mod random;

use std::fmt;

pub use fifo::FifoPolicy;
pub use lru::LruPolicy;
pub use mru::MruPolicy;
pub use plru::{PLRU_MAX_WAYS, PlruPolicy};
pub use random::RandomPolicy;

use crate::config::ReplacementPolicy as PolicyType;

/// Trait for per-set replacement policies.
///
/// Defines the interface for updating usage state and selecting victim ways.
pub trait ReplacementPolicy: fmt::Debug + Send + Sync {
    /// Updates the policy state when a way is filled or accessed.
    ///
    /// # Arguments
    ///
    /// * `way` - The way index within the set that was touched.
    fn update(&mut self, way: usize);

    /// Selects the way to evict.
    ///
    /// # Returns
    ///
    /// The index of the way to evict, always `< ways`.
    fn get_victim(&mut self) -> usize;
}

/// Builds the policy selected by `kind` for a set of `ways` ways.
///
/// `set_index` seeds policies that need per-set randomness.
pub fn build(kind: PolicyType, ways: usize, set_index: usize) -> Box<dyn ReplacementPolicy> {
    match kind {
        PolicyType::Fifo => Box::new(FifoPolicy::new(ways)),
        PolicyType::Random => Box::new(RandomPolicy::new(ways, set_index as u64)),
        PolicyType::Plru => Box::new(PlruPolicy::new(ways)),
        PolicyType::Lru => Box::new(LruPolicy::new(ways)),
        PolicyType::Mru => Box::new(MruPolicy::new(ways)),
    }
}
