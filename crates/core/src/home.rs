//! Address-to-home-node lookup.
//!
//! In distributed (NUCA) configurations each slice of a shared cache only sees
//! the addresses homed at its node. Indexing sets by the raw block number would
//! then leave most sets unused, so the cache indexes by the node-local
//! ("linear") block number instead.

use std::fmt;

use crate::common::CoreId;

/// Resolves which node owns an address.
pub trait AddressHomeLookup: fmt::Debug + Send + Sync {
    /// Node owning `addr`.
    fn home(&self, addr: u64) -> CoreId;

    /// Block number of `addr` within its home node's address space.
    fn linear_block(&self, addr: u64) -> u64;
}

/// Interleaves blocks of `2^granularity_bits` bytes across a list of nodes.
#[derive(Debug, Clone)]
pub struct InterleavedHomeLookup {
    granularity_bits: u32,
    homes: Vec<CoreId>,
}

impl InterleavedHomeLookup {
    /// Creates a lookup interleaving over `homes`.
    ///
    /// # Panics
    ///
    /// Panics if `homes` is empty.
    pub fn new(granularity_bits: u32, homes: Vec<CoreId>) -> Self {
        assert!(!homes.is_empty(), "home lookup needs at least one node");
        Self {
            granularity_bits,
            homes,
        }
    }

    /// Number of nodes addresses are spread over.
    pub fn num_homes(&self) -> usize {
        self.homes.len()
    }
}

impl AddressHomeLookup for InterleavedHomeLookup {
    fn home(&self, addr: u64) -> CoreId {
        let module = (addr >> self.granularity_bits) % self.homes.len() as u64;
        self.homes[module as usize]
    }

    fn linear_block(&self, addr: u64) -> u64 {
        (addr >> self.granularity_bits) / self.homes.len() as u64
    }
}
