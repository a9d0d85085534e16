//! Configuration for a single cache level.
//!
//! This module defines the structures and enums used to parameterize a cache:
//! 1. **Defaults:** Baseline geometry and promotion-heuristic constants.
//! 2. **Structures:** [`CacheConfig`] (geometry, type, policy) and [`PromotionConfig`].
//! 3. **Enums:** Cache type, replacement policy and set-index hash selection.
//!
//! Configuration is usually deserialized from JSON by the surrounding simulator;
//! `CacheConfig::default()` gives a small private L1.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::Deserialize;

use crate::cache::policies::PLRU_MAX_WAYS;
use crate::common::{CacheError, CoreId};
use crate::metadata::{DIRTY_WORDS, USAGE_REGION_BITS, UsageMask};

/// Default configuration constants.
///
/// These values define the baseline cache when a field is not explicitly
/// present in the configuration document.
mod defaults {
    /// Default number of sets.
    pub const NUM_SETS: usize = 64;

    /// Default associativity (8 ways).
    pub const ASSOCIATIVITY: usize = 8;

    /// Default cache line size in bytes (64 bytes).
    pub const LINE_SIZE: usize = 64;

    /// Number of low-index ways forming the fast tier of a hybrid set.
    pub const FAST_TIER_LINES: usize = 4;

    /// Access count at which a slow-tier line is considered for promotion.
    pub const PROMOTION_THRESHOLD: u32 = 3;

    /// Number of per-line promotion counters kept by every set.
    pub const TRACKED_LINES: usize = 16;

    /// Granularity of the data swap performed on promotion.
    pub const SWAP_CHUNK_BYTES: usize = 8;
}

/// Cache types; selects the line metadata variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CacheType {
    /// Private first-level cache.
    #[default]
    #[serde(alias = "pr_l1", alias = "PR_L1_CACHE")]
    PrivateL1,
    /// Private second-level cache.
    #[serde(alias = "pr_l2", alias = "PR_L2_CACHE")]
    PrivateL2,
    /// Cache shared between cores.
    #[serde(alias = "SHARED_CACHE")]
    Shared,
}

impl CacheType {
    /// Raw numeric code of this type, as used by simulator front-ends.
    pub const fn code(self) -> u32 {
        match self {
            Self::PrivateL1 => 1,
            Self::PrivateL2 => 2,
            Self::Shared => 3,
        }
    }
}

impl TryFrom<u32> for CacheType {
    type Error = CacheError;

    fn try_from(code: u32) -> Result<Self, Self::Error> {
        match code {
            1 => Ok(Self::PrivateL1),
            2 => Ok(Self::PrivateL2),
            3 => Ok(Self::Shared),
            other => {
                tracing::error!(code = other, "unrecognized cache type");
                Err(CacheError::UnrecognizedCacheType(other))
            }
        }
    }
}

impl FromStr for CacheType {
    type Err = CacheError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "private_l1" | "pr_l1" | "pr_l1_cache" => Ok(Self::PrivateL1),
            "private_l2" | "pr_l2" | "pr_l2_cache" => Ok(Self::PrivateL2),
            "shared" | "shared_cache" => Ok(Self::Shared),
            _ => {
                tracing::error!(name = s, "unrecognized cache type");
                Err(CacheError::UnrecognizedCacheTypeName(s.to_owned()))
            }
        }
    }
}

impl fmt::Display for CacheType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::PrivateL1 => "private_l1",
            Self::PrivateL2 => "private_l2",
            Self::Shared => "shared",
        };
        f.write_str(name)
    }
}

/// Cache replacement policy algorithms.
///
/// Specifies the algorithm used to select which way to evict when a new
/// line must be installed in a full set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReplacementPolicy {
    /// Least Recently Used replacement policy.
    ///
    /// Evicts the way that was accessed least recently.
    #[default]
    #[serde(alias = "Lru", alias = "LRU")]
    Lru,
    /// Pseudo-LRU replacement policy.
    ///
    /// Approximates LRU with one bit per way.
    #[serde(alias = "Plru", alias = "PLRU")]
    Plru,
    /// First In First Out replacement policy.
    ///
    /// Evicts the oldest way in the set (round-robin).
    #[serde(alias = "Fifo", alias = "FIFO", alias = "round_robin")]
    Fifo,
    /// Random replacement policy.
    ///
    /// Evicts a pseudo-randomly selected way.
    #[serde(alias = "Random")]
    Random,
    /// Most Recently Used replacement policy.
    ///
    /// Evicts the way that was accessed most recently.
    #[serde(alias = "Mru", alias = "MRU")]
    Mru,
}

impl FromStr for ReplacementPolicy {
    type Err = CacheError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "lru" => Ok(Self::Lru),
            "plru" => Ok(Self::Plru),
            "fifo" | "round_robin" => Ok(Self::Fifo),
            "random" => Ok(Self::Random),
            "mru" => Ok(Self::Mru),
            _ => Err(CacheError::UnknownReplacementPolicy(s.to_owned())),
        }
    }
}

/// Set-index hash functions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HashFunction {
    /// Low block-number bits; requires a power-of-two set count.
    #[default]
    Mask,
    /// Block number modulo the set count.
    Mod,
}

impl FromStr for HashFunction {
    type Err = CacheError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "mask" => Ok(Self::Mask),
            "mod" => Ok(Self::Mod),
            _ => Err(CacheError::UnknownHash(s.to_owned())),
        }
    }
}

/// Constants of the hybrid-tier promotion heuristic.
///
/// Ways `[0, fast_lines)` form the fast tier. A slow-tier way whose counter
/// reaches `threshold` swaps places with the coldest fast-tier way, after
/// which all `tracked_lines` counters of the set are cleared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct PromotionConfig {
    /// Number of fast-tier ways.
    pub fast_lines: usize,
    /// Counter value that triggers a promotion attempt.
    pub threshold: u32,
    /// Number of per-way counters kept by each set.
    pub tracked_lines: usize,
    /// Bytes moved per read/write step of the swap.
    pub chunk_bytes: usize,
}

impl Default for PromotionConfig {
    fn default() -> Self {
        Self {
            fast_lines: defaults::FAST_TIER_LINES,
            threshold: defaults::PROMOTION_THRESHOLD,
            tracked_lines: defaults::TRACKED_LINES,
            chunk_bytes: defaults::SWAP_CHUNK_BYTES,
        }
    }
}

/// Configuration of one cache level.
///
/// # Examples
///
/// ```
/// use hcsim_core::config::{CacheConfig, CacheType, ReplacementPolicy};
///
/// let json = r#"{
///     "name": "L2",
///     "num_sets": 512,
///     "associativity": 16,
///     "line_size": 64,
///     "policy": "lru",
///     "cache_type": "pr_l2"
/// }"#;
///
/// let config = CacheConfig::from_json_str(json).unwrap();
/// assert_eq!(config.cache_type, CacheType::PrivateL2);
/// assert_eq!(config.policy, ReplacementPolicy::Lru);
/// assert_eq!(config.size_bytes(), 512 * 16 * 64);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Cache name used in logs and statistics.
    pub name: String,
    /// Name of the configuration section the cache was built from.
    pub cfg_name: String,
    /// Core owning this cache.
    pub core_id: CoreId,
    /// Number of sets.
    pub num_sets: usize,
    /// Ways per set.
    pub associativity: usize,
    /// Line size in bytes.
    pub line_size: usize,
    /// Replacement policy used by every set.
    pub policy: ReplacementPolicy,
    /// Cache type; selects the line metadata variant.
    pub cache_type: CacheType,
    /// Set-index hash.
    pub hash: HashFunction,
    /// Hybrid-tier promotion constants.
    pub promotion: PromotionConfig,
    /// Count fills per set.
    pub track_set_usage: bool,
    /// Initial state of the statistics enable flag.
    pub enabled: bool,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            name: String::from("L1-D"),
            cfg_name: String::from("perf_model/l1_dcache"),
            core_id: 0,
            num_sets: defaults::NUM_SETS,
            associativity: defaults::ASSOCIATIVITY,
            line_size: defaults::LINE_SIZE,
            policy: ReplacementPolicy::default(),
            cache_type: CacheType::default(),
            hash: HashFunction::default(),
            promotion: PromotionConfig::default(),
            track_set_usage: false,
            enabled: false,
        }
    }
}

impl CacheConfig {
    /// Parses and validates a configuration from a JSON document.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::Config`] for malformed JSON and
    /// [`CacheError::InvalidGeometry`] when validation fails.
    pub fn from_json_str(json: &str) -> Result<Self, CacheError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a configuration file.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::Io`] if the file cannot be read, otherwise the
    /// errors of [`CacheConfig::from_json_str`].
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, CacheError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// Total data capacity in bytes.
    pub const fn size_bytes(&self) -> usize {
        self.num_sets * self.associativity * self.line_size
    }

    /// Checks that the geometry can be decomposed into tag, set and offset.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::InvalidGeometry`] describing the first problem found.
    pub fn validate(&self) -> Result<(), CacheError> {
        let fail = |reason: String| Err(CacheError::geometry(&self.name, reason));

        if self.num_sets == 0 {
            return fail("cache must have at least one set".into());
        }
        if self.associativity == 0 {
            return fail("cache must have at least one way".into());
        }
        if !self.line_size.is_power_of_two() {
            return fail(format!("line size {} is not a power of two", self.line_size));
        }
        if self.line_size < DIRTY_WORDS {
            return fail(format!(
                "line size {} is smaller than {DIRTY_WORDS} dirty words",
                self.line_size
            ));
        }
        if self.line_size >> USAGE_REGION_BITS > UsageMask::REGIONS {
            return fail(format!(
                "line size {} exceeds the {}-region usage mask",
                self.line_size,
                UsageMask::REGIONS
            ));
        }
        if self.hash == HashFunction::Mask && !self.num_sets.is_power_of_two() {
            return fail(format!(
                "mask hash needs a power-of-two set count, got {}",
                self.num_sets
            ));
        }

        if self.policy == ReplacementPolicy::Plru && self.associativity > PLRU_MAX_WAYS {
            return fail(format!(
                "plru supports at most {PLRU_MAX_WAYS} ways, got {}",
                self.associativity
            ));
        }

        let promo = &self.promotion;
        if promo.fast_lines > promo.tracked_lines {
            return fail(format!(
                "{} fast-tier lines exceed {} tracked counters",
                promo.fast_lines, promo.tracked_lines
            ));
        }
        if promo.chunk_bytes == 0 || self.line_size % promo.chunk_bytes != 0 {
            return fail(format!(
                "swap chunk of {} bytes does not divide the line",
                promo.chunk_bytes
            ));
        }
        Ok(())
    }
}
