//! Coherence states stored in line metadata.
//!
//! The cache core only stores and compares these values; transitions belong
//! to the coherence protocol driving the cache.

/// Coherence state of a cache line.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum CacheState {
    /// Not present; the reset state.
    #[default]
    Invalid,
    /// Clean copy possibly held by other caches.
    Shared,
    /// Shared copy with an upgrade request in flight.
    SharedUpgrading,
    /// Clean copy held by this cache only.
    Exclusive,
    /// Dirty copy that other caches may share; this cache answers requests.
    Owned,
    /// Dirty copy held by this cache only.
    Modified,
}

impl CacheState {
    /// Whether a load may be served from a line in this state.
    #[inline]
    pub const fn is_readable(self) -> bool {
        !matches!(self, Self::Invalid)
    }

    /// Whether a store may be performed without a coherence request.
    #[inline]
    pub const fn is_writable(self) -> bool {
        matches!(self, Self::Exclusive | Self::Modified)
    }

    /// Whether the line holds data newer than the next level.
    #[inline]
    pub const fn is_dirty(self) -> bool {
        matches!(self, Self::Owned | Self::Modified)
    }
}
