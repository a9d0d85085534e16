//! Fixed-width bit sets carried by line metadata.
//!
//! Each type wraps a plain integer and exposes named set/clear/query
//! operations so callers never shift masks by hand.

use crate::common::CoreId;

/// Log2 of the byte width of one usage region.
pub const USAGE_REGION_BITS: u32 = 3;

/// Number of dirty-word bits per line.
pub const DIRTY_WORDS: usize = 8;

/// Sub-block usage mask, one bit per `2^USAGE_REGION_BITS`-byte region.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct UsageMask(u64);

impl UsageMask {
    /// Number of regions the mask can describe.
    pub const REGIONS: usize = u64::BITS as usize;

    /// Creates a mask from raw bits.
    pub const fn from_bits(bits: u64) -> Self {
        Self(bits)
    }

    /// Raw bits of the mask.
    pub const fn bits(self) -> u64 {
        self.0
    }

    /// Mask of the regions overlapping the byte range `[offset, offset + size)`.
    ///
    /// An empty range covers no region.
    ///
    /// # Panics
    ///
    /// Panics if the range extends past the last describable region.
    pub fn covering(offset: usize, size: usize) -> Self {
        if size == 0 {
            return Self(0);
        }
        let first = offset >> USAGE_REGION_BITS;
        let last = (offset + size - 1) >> USAGE_REGION_BITS;
        assert!(
            last < Self::REGIONS,
            "usage range {offset}+{size} exceeds {} regions",
            Self::REGIONS
        );

        let below_first = (1u64 << first) - 1;
        let through_last = if last + 1 == Self::REGIONS {
            u64::MAX
        } else {
            (1u64 << (last + 1)) - 1
        };
        Self(through_last & !below_first)
    }

    /// ORs `other` into this mask; returns `true` if any new bit was set.
    pub const fn merge(&mut self, other: Self) -> bool {
        let fresh = other.0 & !self.0 != 0;
        self.0 |= other.0;
        fresh
    }

    /// Whether region `region` has been touched.
    pub const fn contains(self, region: usize) -> bool {
        region < Self::REGIONS && (self.0 >> region) & 1 == 1
    }
}

/// Per-word dirty mask: one bit per eighth of the line.
///
/// Any index outside `0..8` clears the whole mask: an unknown word means
/// nothing can be trusted to be dirty.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct DirtyWords(u8);

impl DirtyWords {
    /// Creates a mask from raw bits.
    pub const fn from_bits(bits: u8) -> Self {
        Self(bits)
    }

    /// Raw bits of the mask.
    pub const fn bits(self) -> u8 {
        self.0
    }

    /// Marks word `i` dirty.
    pub const fn set(&mut self, i: usize) {
        if i < DIRTY_WORDS {
            self.0 |= 1 << i;
        } else {
            self.0 = 0;
        }
    }

    /// Marks word `i` clean.
    pub const fn reset(&mut self, i: usize) {
        if i < DIRTY_WORDS {
            self.0 &= !(1 << i);
        } else {
            self.0 = 0;
        }
    }

    /// Whether word `i` is dirty.
    pub const fn is_set(self, i: usize) -> bool {
        i < DIRTY_WORDS && (self.0 >> i) & 1 == 1
    }

    /// Whether any word is dirty.
    pub const fn any(self) -> bool {
        self.0 != 0
    }
}

/// Provenance flags of a line.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LineOption {
    /// Filled by a prefetcher.
    Prefetch,
    /// Filled during cache warmup.
    Warmup,
}

impl LineOption {
    /// All options, in bit order.
    pub const ALL: [Self; 2] = [Self::Prefetch, Self::Warmup];

    const fn bit(self) -> u8 {
        match self {
            Self::Prefetch => 1 << 0,
            Self::Warmup => 1 << 1,
        }
    }

    /// Name of the option as printed in statistics.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Prefetch => "prefetch",
            Self::Warmup => "warmup",
        }
    }
}

/// Name of the option with bit index `index`, or `"invalid"`.
pub fn option_name(index: usize) -> &'static str {
    LineOption::ALL.get(index).map_or("invalid", |opt| opt.name())
}

/// Set of [`LineOption`] flags.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct LineOptions(u8);

impl LineOptions {
    /// Creates an option set from raw bits.
    pub const fn from_bits(bits: u8) -> Self {
        Self(bits)
    }

    /// Raw bits of the set.
    pub const fn bits(self) -> u8 {
        self.0
    }

    /// Adds `option`.
    pub const fn insert(&mut self, option: LineOption) {
        self.0 |= option.bit();
    }

    /// Removes `option`.
    pub const fn remove(&mut self, option: LineOption) {
        self.0 &= !option.bit();
    }

    /// Whether `option` is present.
    pub const fn contains(self, option: LineOption) -> bool {
        self.0 & option.bit() != 0
    }
}

/// Set of cores sharing a line, for shared-cache metadata.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct SharerSet(u128);

impl SharerSet {
    /// Highest number of distinct cores the set can track.
    pub const MAX_CORES: usize = u128::BITS as usize;

    /// The set with no sharers.
    pub const EMPTY: Self = Self(0);

    fn bit(core: CoreId) -> u128 {
        assert!(
            (core as usize) < Self::MAX_CORES,
            "core {core} exceeds the {} trackable sharers",
            Self::MAX_CORES
        );
        1u128 << core
    }

    /// Adds `core`; returns `true` if it was not already a sharer.
    pub fn insert(&mut self, core: CoreId) -> bool {
        let bit = Self::bit(core);
        let fresh = self.0 & bit == 0;
        self.0 |= bit;
        fresh
    }

    /// Removes `core`; returns `true` if it was a sharer.
    pub fn remove(&mut self, core: CoreId) -> bool {
        let bit = Self::bit(core);
        let present = self.0 & bit != 0;
        self.0 &= !bit;
        present
    }

    /// Whether `core` is a sharer.
    pub fn contains(self, core: CoreId) -> bool {
        self.0 & Self::bit(core) != 0
    }

    /// Number of sharers.
    pub const fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    /// Whether there are no sharers.
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Removes every sharer.
    pub const fn clear(&mut self) {
        self.0 = 0;
    }

    /// Iterates over sharer ids in ascending order.
    pub fn iter(self) -> impl Iterator<Item = CoreId> {
        (0..Self::MAX_CORES as CoreId).filter(move |&core| self.0 & (1u128 << core) != 0)
    }
}
