//! Cache statistics snapshots.
//!
//! The cache keeps only raw counters; [`CacheStats`] derives misses and hit
//! rate from them and serializes for the simulator's statistics output.

use serde::Serialize;

/// Counters of one cache at a point in time.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CacheStats {
    /// Cache name.
    pub name: String,
    /// Accesses counted while enabled.
    pub accesses: u64,
    /// Hits counted while enabled.
    pub hits: u64,
    /// `accesses - hits`.
    pub misses: u64,
    /// `hits / accesses`, or 0 with no accesses.
    pub hit_rate: f64,
    /// Fills per set, when tracked.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub set_usage: Option<Vec<u64>>,
}

impl CacheStats {
    /// Builds a snapshot from raw counters.
    pub fn new(name: &str, accesses: u64, hits: u64, set_usage: Option<Vec<u64>>) -> Self {
        let hit_rate = if accesses == 0 {
            0.0
        } else {
            hits as f64 / accesses as f64
        };
        Self {
            name: name.to_owned(),
            accesses,
            hits,
            misses: accesses.saturating_sub(hits),
            hit_rate,
            set_usage,
        }
    }

    /// Serializes the snapshot as JSON.
    ///
    /// # Errors
    ///
    /// Returns the serializer error; counters always serialize, so this only
    /// fails on writer-level problems.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
