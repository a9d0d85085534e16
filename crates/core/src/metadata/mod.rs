//! Per-line cache metadata.
//!
//! Every storage slot of a set carries one [`LineMetadata`] record holding:
//! 1. **Identity:** The address tag; `INVALID_TAG` marks an empty slot.
//! 2. **Coherence:** The protocol state and owning core.
//! 3. **Usage:** Which sub-block regions and which words have been touched or written.
//! 4. **Variant fields:** Extra state selected by the cache type (sharers, L1 location).

/// Fixed-width bit sets (usage, dirty words, options, sharers).
pub mod bits;

/// Coherence states.
pub mod state;

pub use bits::{
    DIRTY_WORDS, DirtyWords, LineOption, LineOptions, SharerSet, USAGE_REGION_BITS, UsageMask,
    option_name,
};
pub use state::CacheState;

use crate::common::{CoreId, MemComponent};
use crate::config::CacheType;

/// Tag value of a slot that holds no line.
pub const INVALID_TAG: u64 = !0;

/// Fields that only some cache types carry.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LineKind {
    /// Private L1 lines carry nothing extra.
    PrivateL1,
    /// Private L2 lines remember which L1 holds a copy.
    PrivateL2 {
        /// L1 cache the line is also present in, if any.
        cached_loc: Option<MemComponent>,
    },
    /// Shared-cache lines track which cores hold copies.
    Shared {
        /// Cores holding a copy.
        sharers: SharerSet,
    },
}

impl LineKind {
    const fn for_type(cache_type: CacheType) -> Self {
        match cache_type {
            CacheType::PrivateL1 => Self::PrivateL1,
            CacheType::PrivateL2 => Self::PrivateL2 { cached_loc: None },
            CacheType::Shared => Self::Shared {
                sharers: SharerSet::EMPTY,
            },
        }
    }

    const fn cache_type(&self) -> CacheType {
        match self {
            Self::PrivateL1 => CacheType::PrivateL1,
            Self::PrivateL2 { .. } => CacheType::PrivateL2,
            Self::Shared { .. } => CacheType::Shared,
        }
    }

    const fn reset(&mut self) {
        match self {
            Self::PrivateL1 => {}
            Self::PrivateL2 { cached_loc } => *cached_loc = None,
            Self::Shared { sharers } => sharers.clear(),
        }
    }
}

/// Metadata of one cache line.
///
/// A record belongs to exactly one slot of one set. The variant is fixed when
/// the record is created and never changes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LineMetadata {
    tag: u64,
    state: CacheState,
    owner: CoreId,
    usage: UsageMask,
    dirty: DirtyWords,
    options: LineOptions,
    kind: LineKind,
}

impl LineMetadata {
    /// Creates an empty record of the variant matching `cache_type`.
    pub const fn create(cache_type: CacheType) -> Self {
        Self::new(cache_type, INVALID_TAG, CacheState::Invalid, LineOptions::from_bits(0))
    }

    /// Creates an empty record from a raw cache-type code.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::UnrecognizedCacheType`](crate::CacheError::UnrecognizedCacheType)
    /// (logged at error level) when `code` names no cache type.
    pub fn create_from_code(code: u32) -> Result<Self, crate::CacheError> {
        CacheType::try_from(code).map(Self::create)
    }

    /// Creates a record with the given tag, state and options.
    pub const fn new(
        cache_type: CacheType,
        tag: u64,
        state: CacheState,
        options: LineOptions,
    ) -> Self {
        Self {
            tag,
            state,
            owner: 0,
            usage: UsageMask::from_bits(0),
            dirty: DirtyWords::from_bits(0),
            options,
            kind: LineKind::for_type(cache_type),
        }
    }

    /// Cache type this record was created for.
    pub const fn cache_type(&self) -> CacheType {
        self.kind.cache_type()
    }

    /// Variant-specific fields.
    pub const fn kind(&self) -> &LineKind {
        &self.kind
    }

    /// Address tag.
    pub const fn tag(&self) -> u64 {
        self.tag
    }

    /// Sets the address tag.
    pub const fn set_tag(&mut self, tag: u64) {
        self.tag = tag;
    }

    /// Whether the slot holds a line.
    pub const fn is_valid(&self) -> bool {
        self.tag != INVALID_TAG
    }

    /// Coherence state.
    pub const fn state(&self) -> CacheState {
        self.state
    }

    /// Sets the coherence state.
    pub const fn set_state(&mut self, state: CacheState) {
        self.state = state;
    }

    /// Core holding ownership of the line.
    pub const fn owner(&self) -> CoreId {
        self.owner
    }

    /// Sets the owning core.
    pub const fn set_owner(&mut self, owner: CoreId) {
        self.owner = owner;
    }

    /// Empties the record: sentinel tag and `Invalid` state.
    ///
    /// Usage, dirty and option bits are left as they were; they carry no
    /// meaning until the record is reused.
    pub const fn invalidate(&mut self) {
        self.tag = INVALID_TAG;
        self.state = CacheState::Invalid;
        self.kind.reset();
    }

    /// Copies every field of `other` into `self`.
    ///
    /// Variant fields are copied only when both records share a cache type.
    pub fn clone_from_line(&mut self, other: &Self) {
        self.tag = other.tag;
        self.state = other.state;
        self.owner = other.owner;
        self.usage = other.usage;
        self.dirty = other.dirty;
        self.options = other.options;
        if self.cache_type() == other.cache_type() {
            self.kind.clone_from(&other.kind);
        }
    }

    /// Sub-block usage mask.
    pub const fn usage(&self) -> UsageMask {
        self.usage
    }

    /// Marks the regions overlapping `[offset, offset + size)` as used.
    ///
    /// Returns `true` if at least one region was not used before.
    pub fn update_usage(&mut self, offset: usize, size: usize) -> bool {
        self.update_usage_mask(UsageMask::covering(offset, size))
    }

    /// Marks the regions of `mask` as used.
    ///
    /// Returns `true` if at least one region was not used before.
    pub const fn update_usage_mask(&mut self, mask: UsageMask) -> bool {
        self.usage.merge(mask)
    }

    /// Marks word `i` dirty; any `i >= 8` clears the whole mask.
    pub const fn set_dirty_bit(&mut self, i: usize) {
        self.dirty.set(i);
    }

    /// Marks word `i` clean; any `i >= 8` clears the whole mask.
    pub const fn reset_dirty_bit(&mut self, i: usize) {
        self.dirty.reset(i);
    }

    /// Replaces the dirty mask with `other`'s.
    pub const fn copy_dirty_word(&mut self, other: &Self) {
        self.dirty = other.dirty;
    }

    /// Raw dirty-word mask.
    pub const fn dirty_word(&self) -> u8 {
        self.dirty.bits()
    }

    /// Dirty-word mask.
    pub const fn dirty_words(&self) -> DirtyWords {
        self.dirty
    }

    /// Option flags.
    pub const fn options(&self) -> LineOptions {
        self.options
    }

    /// Whether `option` is set.
    pub const fn has_option(&self, option: LineOption) -> bool {
        self.options.contains(option)
    }

    /// Sets `option`.
    pub const fn set_option(&mut self, option: LineOption) {
        self.options.insert(option);
    }

    /// Clears `option`.
    pub const fn clear_option(&mut self, option: LineOption) {
        self.options.remove(option);
    }

    /// L1 cache holding a copy of a private-L2 line.
    pub const fn cached_location(&self) -> Option<MemComponent> {
        match self.kind {
            LineKind::PrivateL2 { cached_loc } => cached_loc,
            _ => None,
        }
    }

    /// Records the L1 holding a copy. Ignored for other variants.
    pub const fn set_cached_location(&mut self, component: MemComponent) {
        if let LineKind::PrivateL2 { cached_loc } = &mut self.kind {
            *cached_loc = Some(component);
        }
    }

    /// Forgets the L1 copy. Ignored for other variants.
    pub const fn clear_cached_location(&mut self) {
        if let LineKind::PrivateL2 { cached_loc } = &mut self.kind {
            *cached_loc = None;
        }
    }

    /// Adds a sharer; returns `true` if it was new. Always `false` for private variants.
    pub fn add_sharer(&mut self, core: CoreId) -> bool {
        match &mut self.kind {
            LineKind::Shared { sharers } => sharers.insert(core),
            _ => false,
        }
    }

    /// Removes a sharer; returns `true` if it was present.
    pub fn remove_sharer(&mut self, core: CoreId) -> bool {
        match &mut self.kind {
            LineKind::Shared { sharers } => sharers.remove(core),
            _ => false,
        }
    }

    /// Whether `core` holds a copy of a shared-cache line.
    pub fn has_sharer(&self, core: CoreId) -> bool {
        match self.kind {
            LineKind::Shared { sharers } => sharers.contains(core),
            _ => false,
        }
    }

    /// Number of sharers of a shared-cache line.
    pub const fn num_sharers(&self) -> usize {
        match self.kind {
            LineKind::Shared { sharers } => sharers.len(),
            _ => 0,
        }
    }

    /// Sharers of a shared-cache line.
    pub const fn sharers(&self) -> SharerSet {
        match self.kind {
            LineKind::Shared { sharers } => sharers,
            _ => SharerSet::EMPTY,
        }
    }
}
