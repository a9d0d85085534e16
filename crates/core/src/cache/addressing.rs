//! Address decomposition.
//!
//! An address splits into:
//! 1. **Tag:** The block number (`addr >> log2(line_size)`), so a tag alone
//!    rebuilds the line address.
//! 2. **Set index:** A hash of the block number, or of the node-local block
//!    number when an address-home lookup is configured.
//! 3. **Block offset:** The byte within the line.

use std::sync::Arc;

use crate::config::HashFunction;
use crate::home::AddressHomeLookup;

/// Geometry-derived address split for one cache.
#[derive(Debug, Clone)]
pub struct AddressLayout {
    log_line_size: u32,
    num_sets: usize,
    hash: HashFunction,
    home: Option<Arc<dyn AddressHomeLookup>>,
}

impl AddressLayout {
    /// Creates a layout for a validated geometry.
    ///
    /// # Panics
    ///
    /// Panics if `line_size` is not a power of two or `num_sets` is zero.
    pub fn new(
        line_size: usize,
        num_sets: usize,
        hash: HashFunction,
        home: Option<Arc<dyn AddressHomeLookup>>,
    ) -> Self {
        assert!(line_size.is_power_of_two(), "line size {line_size} is not a power of two");
        assert!(num_sets > 0, "cache needs at least one set");
        Self {
            log_line_size: line_size.trailing_zeros(),
            num_sets,
            hash,
            home,
        }
    }

    /// Line size in bytes.
    pub const fn line_size(&self) -> usize {
        1 << self.log_line_size
    }

    /// Number of sets addresses are spread over.
    pub const fn num_sets(&self) -> usize {
        self.num_sets
    }

    /// Splits `addr` into `(tag, set_index)`.
    pub fn split(&self, addr: u64) -> (u64, usize) {
        let tag = addr >> self.log_line_size;
        let block = self
            .home
            .as_ref()
            .map_or(tag, |home| home.linear_block(addr));

        let set_index = match self.hash {
            HashFunction::Mask => (block & (self.num_sets as u64 - 1)) as usize,
            HashFunction::Mod => (block % self.num_sets as u64) as usize,
        };
        assert!(
            set_index < self.num_sets,
            "set index {set_index} out of range for {} sets",
            self.num_sets
        );
        (tag, set_index)
    }

    /// Splits `addr` into `(tag, set_index, block_offset)`.
    pub fn split_with_offset(&self, addr: u64) -> (u64, usize, usize) {
        let (tag, set_index) = self.split(addr);
        let offset = self.block_offset(addr);
        assert!(offset < self.line_size(), "block offset {offset} exceeds line");
        debug_assert_eq!(self.tag_to_address(tag) | offset as u64, addr);
        (tag, set_index, offset)
    }

    /// Byte offset of `addr` within its line.
    pub const fn block_offset(&self, addr: u64) -> usize {
        (addr & ((1 << self.log_line_size) - 1)) as usize
    }

    /// Line address of `tag`.
    pub const fn tag_to_address(&self, tag: u64) -> u64 {
        tag << self.log_line_size
    }
}
