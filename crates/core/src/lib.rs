//! Set-associative cache core for architecture simulators.
//!
//! This crate models a single cache level of a simulated memory hierarchy:
//! 1. **Cache:** Address decomposition, line lookup, fill, eviction and invalidation.
//! 2. **Sets:** Per-set data storage, metadata slots, locks and replacement policies.
//! 3. **Metadata:** Per-line coherence state, sub-block usage and dirty-word tracking.
//! 4. **Promotion:** Hybrid-tier migration of hot lines into the fast ways of a set.
//! 5. **Collaborators:** Optional fault injection and address-home lookup.

/// Cache, associative sets, replacement policies and the promotion heuristic.
pub mod cache;
/// Common types (access kinds, core ids, errors).
pub mod common;
/// Cache configuration (defaults, enums, geometry).
pub mod config;
/// Fault-injection hooks invoked around line reads and writes.
pub mod fault;
/// Address-to-home-node lookup for distributed cache configurations.
pub mod home;
/// Per-line metadata and its cache-type variants.
pub mod metadata;
/// Cache statistics snapshots.
pub mod stats;

/// Top-level cache type; construct with `Cache::new`.
pub use crate::cache::Cache;
/// Cache configuration; use `CacheConfig::default()` or load from JSON.
pub use crate::config::CacheConfig;
/// Error type for configuration failures.
pub use crate::common::CacheError;
/// Per-line metadata record.
pub use crate::metadata::LineMetadata;
