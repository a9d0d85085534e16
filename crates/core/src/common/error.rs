//! Configuration error definitions.
//!
//! Only configuration problems are reported through [`CacheError`]. Misses are
//! not errors (they surface as `None` or `false`), and corrupted addressing or
//! associativity is an invariant violation that panics.

use thiserror::Error;

/// Errors raised while building or configuring a cache.
#[derive(Debug, Error)]
pub enum CacheError {
    /// A numeric cache type outside the known set.
    #[error("unrecognized cache type ({0})")]
    UnrecognizedCacheType(u32),

    /// A cache type name outside the known set.
    #[error("unrecognized cache type `{0}`")]
    UnrecognizedCacheTypeName(String),

    /// A replacement policy name with no implementation.
    #[error("unknown replacement policy `{0}`")]
    UnknownReplacementPolicy(String),

    /// A set-index hash name with no implementation.
    #[error("unknown hash function `{0}`")]
    UnknownHash(String),

    /// Geometry that cannot be decomposed into tag, set and offset.
    #[error("invalid cache geometry for `{name}`: {reason}")]
    InvalidGeometry {
        /// Name of the offending cache.
        name: String,
        /// What is wrong with the geometry.
        reason: String,
    },

    /// Malformed configuration document.
    #[error("failed to parse cache configuration: {0}")]
    Config(#[from] serde_json::Error),

    /// Configuration file could not be read.
    #[error("failed to read cache configuration: {0}")]
    Io(#[from] std::io::Error),
}

impl CacheError {
    pub(crate) fn geometry(name: &str, reason: impl Into<String>) -> Self {
        Self::InvalidGeometry {
            name: name.to_owned(),
            reason: reason.into(),
        }
    }
}
