//! Memory Access Types.
//!
//! This module defines how accesses are classified at the cache-line level.
//! These types are used for the following:
//! 1. **Data Movement:** Deciding whether a hit copies out of or into the line.
//! 2. **Fault Injection:** Choosing between the pre-read and post-write hooks.
//! 3. **Statistics Tracking:** Attributing hits to loads or stores.

use serde::{Deserialize, Serialize};

/// Identifier of a simulated core.
pub type CoreId = u32;

/// Kind of access performed on a resident cache line.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AccessKind {
    /// Data read access.
    ///
    /// Copies bytes out of the line into the caller's buffer.
    Load,

    /// Data write access.
    ///
    /// Copies bytes from the caller's buffer into the line.
    Store,
}

impl AccessKind {
    /// Returns `true` for stores.
    #[inline]
    pub const fn is_store(self) -> bool {
        matches!(self, Self::Store)
    }
}

/// Components of the memory hierarchy a line can be cached in.
///
/// Private L2 metadata uses this to remember which L1 holds a copy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MemComponent {
    /// Level-1 instruction cache.
    L1I,
    /// Level-1 data cache.
    L1D,
    /// Level-2 cache.
    L2,
    /// Last-level cache.
    L3,
    /// Main memory.
    Dram,
}
