//! Set-Associative Cache.
//!
//! This module implements one level of a simulated cache hierarchy. It
//! decomposes addresses, forwards them to the owning [`CacheSet`], moves data
//! in and out of lines, reports evictions, drives the optional fault injector
//! and runs the hybrid-tier promotion heuristic.
//!
//! Each set sits behind its own lock. Single calls on [`Cache`] hold that lock
//! for one operation only; a caller that needs a peek → access → insert
//! sequence to be atomic takes a [`SetGuard`] with [`Cache::set_lock`] and
//! runs the whole sequence on it.

/// Address decomposition into tag, set index and block offset.
pub mod addressing;

/// Cache replacement policy implementations (FIFO, LRU, MRU, PLRU, Random).
pub mod policies;

/// Hybrid-tier promotion heuristic.
pub mod promotion;

/// Associative set storage.
pub mod set;

use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use tracing::{debug, trace, warn};

use self::addressing::AddressLayout;
use self::set::CacheSet;
use crate::common::{AccessKind, CacheError, CoreId};
use crate::config::{CacheConfig, CacheType, PromotionConfig};
use crate::fault::FaultInjector;
use crate::home::AddressHomeLookup;
use crate::metadata::LineMetadata;
use crate::stats::CacheStats;

/// A line pushed out of the cache by [`Cache::insert`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Eviction {
    /// Line address rebuilt from the evicted tag.
    pub address: u64,
    /// Metadata the line had when it was evicted.
    pub metadata: LineMetadata,
    /// Line contents at eviction time.
    pub data: Vec<u8>,
}

/// One cache level: a fixed array of associative sets.
pub struct Cache {
    name: String,
    cfg_name: String,
    core_id: CoreId,
    associativity: usize,
    cache_type: CacheType,
    promotion: PromotionConfig,
    layout: AddressLayout,
    sets: Vec<Mutex<CacheSet>>,
    enabled: AtomicBool,
    accesses: AtomicU64,
    hits: AtomicU64,
    set_usage: Option<Vec<AtomicU64>>,
    fault_injector: Option<Arc<dyn FaultInjector>>,
}

impl fmt::Debug for Cache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cache")
            .field("name", &self.name)
            .field("num_sets", &self.sets.len())
            .field("associativity", &self.associativity)
            .field("line_size", &self.layout.line_size())
            .field("cache_type", &self.cache_type)
            .field("fault_injector", &self.fault_injector)
            .finish_non_exhaustive()
    }
}

impl Cache {
    /// Creates an empty cache.
    ///
    /// # Arguments
    ///
    /// * `config` - Geometry, cache type, policy and promotion constants
    /// * `fault_injector` - Optional observer of line reads and writes
    /// * `home_lookup` - Optional home-node lookup for distributed configurations
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::InvalidGeometry`] if `config` does not validate.
    pub fn new(
        config: &CacheConfig,
        fault_injector: Option<Arc<dyn FaultInjector>>,
        home_lookup: Option<Arc<dyn AddressHomeLookup>>,
    ) -> Result<Self, CacheError> {
        config.validate()?;

        let sets = (0..config.num_sets)
            .map(|index| {
                Mutex::new(CacheSet::new(
                    config.cache_type,
                    config.associativity,
                    config.line_size,
                    config.policy,
                    index,
                    config.promotion.tracked_lines,
                ))
            })
            .collect();
        let set_usage = config
            .track_set_usage
            .then(|| (0..config.num_sets).map(|_| AtomicU64::new(0)).collect());

        debug!(
            cache = %config.name,
            sets = config.num_sets,
            ways = config.associativity,
            line = config.line_size,
            cache_type = %config.cache_type,
            "cache created"
        );

        Ok(Self {
            name: config.name.clone(),
            cfg_name: config.cfg_name.clone(),
            core_id: config.core_id,
            associativity: config.associativity,
            cache_type: config.cache_type,
            promotion: config.promotion,
            layout: AddressLayout::new(
                config.line_size,
                config.num_sets,
                config.hash,
                home_lookup,
            ),
            sets,
            enabled: AtomicBool::new(config.enabled),
            accesses: AtomicU64::new(0),
            hits: AtomicU64::new(0),
            set_usage,
            fault_injector,
        })
    }

    /// Cache name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Configuration section the cache was built from.
    pub fn cfg_name(&self) -> &str {
        &self.cfg_name
    }

    /// Core owning the cache.
    pub const fn core_id(&self) -> CoreId {
        self.core_id
    }

    /// Number of sets.
    pub fn num_sets(&self) -> usize {
        self.sets.len()
    }

    /// Ways per set.
    pub const fn associativity(&self) -> usize {
        self.associativity
    }

    /// Line size in bytes.
    pub const fn line_size(&self) -> usize {
        self.layout.line_size()
    }

    /// Cache type (metadata variant).
    pub const fn cache_type(&self) -> CacheType {
        self.cache_type
    }

    /// Promotion constants in effect.
    pub const fn promotion(&self) -> &PromotionConfig {
        &self.promotion
    }

    /// Address decomposition of this cache.
    pub const fn layout(&self) -> &AddressLayout {
        &self.layout
    }

    /// Splits `addr` into `(tag, set_index)`.
    pub fn split_address(&self, addr: u64) -> (u64, usize) {
        self.layout.split(addr)
    }

    /// Splits `addr` into `(tag, set_index, block_offset)`.
    pub fn split_address_with_offset(&self, addr: u64) -> (u64, usize, usize) {
        self.layout.split_with_offset(addr)
    }

    /// Line address of `tag`.
    pub const fn tag_to_address(&self, tag: u64) -> u64 {
        self.layout.tag_to_address(tag)
    }

    fn lock_index(&self, set_index: usize) -> SetGuard<'_> {
        assert!(
            set_index < self.sets.len(),
            "set index {set_index} out of range for {} sets",
            self.sets.len()
        );
        let set = self.sets[set_index].lock().unwrap_or_else(|poisoned| {
            warn!(cache = %self.name, set = set_index, "recovering poisoned set lock");
            poisoned.into_inner()
        });
        SetGuard {
            cache: self,
            set_index,
            set,
        }
    }

    /// Locks the set owning `addr`.
    ///
    /// The returned guard serializes every operation on that set until it is
    /// dropped. Calling single-shot methods of `self` for the same set while
    /// holding the guard deadlocks; use the guard's methods instead.
    pub fn set_lock(&self, addr: u64) -> SetGuard<'_> {
        let (_, set_index) = self.layout.split(addr);
        self.lock_index(set_index)
    }

    /// Looks up `addr` without touching replacement state or counters.
    pub fn peek(&self, addr: u64) -> Option<LineMetadata> {
        self.set_lock(addr).peek(addr).cloned()
    }

    /// Reads or writes `buf.len()` bytes at `addr` if the line is resident.
    ///
    /// See [`SetGuard::access`].
    pub fn access(
        &self,
        addr: u64,
        kind: AccessKind,
        buf: &mut [u8],
        now: u64,
        update_replacement: bool,
    ) -> Option<LineMetadata> {
        self.set_lock(addr)
            .access(addr, kind, buf, now, update_replacement)
            .cloned()
    }

    /// Invalidates the line holding `addr`; returns whether one was present.
    pub fn invalidate(&self, addr: u64) -> bool {
        self.set_lock(addr).invalidate(addr)
    }

    /// Fills the line of `addr` with `fill`.
    ///
    /// See [`SetGuard::insert`].
    pub fn insert(&self, addr: u64, fill: &[u8], now: u64) -> Option<Eviction> {
        self.set_lock(addr).insert(addr, fill, now)
    }

    /// Records an access to way `line_index` of set `set_index` for the
    /// promotion heuristic.
    ///
    /// See [`SetGuard::record_line_access`].
    pub fn record_line_access(&self, set_index: usize, line_index: usize) -> Option<usize> {
        self.lock_index(set_index).record_line_access(line_index)
    }

    /// Set index of `addr`.
    pub fn set_index(&self, addr: u64) -> usize {
        let (_, set_index) = self.layout.split(addr);
        assert!(
            set_index < self.sets.len(),
            "set index {set_index} out of range for {} sets",
            self.sets.len()
        );
        set_index
    }

    /// Way holding `addr`.
    ///
    /// # Panics
    ///
    /// Panics if the line is not resident: callers only ask for coordinates
    /// of lines they have just found.
    pub fn block_index(&self, addr: u64) -> usize {
        self.set_lock(addr).block_index(addr)
    }

    /// Counts one access, and one hit if `hit`, while statistics are enabled.
    pub fn update_counters(&self, hit: bool) {
        if self.is_enabled() {
            let _ = self.accesses.fetch_add(1, Ordering::Relaxed);
            if hit {
                let _ = self.hits.fetch_add(1, Ordering::Relaxed);
            }
        }
    }

    /// Counts `count` accesses that all hit, while statistics are enabled.
    pub fn update_hits(&self, _kind: AccessKind, count: u64) {
        if self.is_enabled() {
            let _ = self.accesses.fetch_add(count, Ordering::Relaxed);
            let _ = self.hits.fetch_add(count, Ordering::Relaxed);
        }
    }

    /// Starts counting accesses.
    pub fn enable(&self) {
        self.enabled.store(true, Ordering::Relaxed);
    }

    /// Stops counting accesses.
    pub fn disable(&self) {
        self.enabled.store(false, Ordering::Relaxed);
    }

    /// Whether accesses are being counted.
    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Relaxed)
    }

    /// Number of counted accesses.
    pub fn accesses(&self) -> u64 {
        self.accesses.load(Ordering::Relaxed)
    }

    /// Number of counted hits.
    pub fn hits(&self) -> u64 {
        self.hits.load(Ordering::Relaxed)
    }

    /// Fills per set, when set-usage tracking is configured.
    pub fn set_usage(&self) -> Option<Vec<u64>> {
        self.set_usage
            .as_ref()
            .map(|usage| usage.iter().map(|n| n.load(Ordering::Relaxed)).collect())
    }

    /// Snapshot of the counters.
    pub fn stats(&self) -> CacheStats {
        CacheStats::new(&self.name, self.accesses(), self.hits(), self.set_usage())
    }
}

/// Exclusive access to one set of a [`Cache`].
///
/// Obtained from [`Cache::set_lock`]; the set stays locked until the guard is
/// dropped.
pub struct SetGuard<'a> {
    cache: &'a Cache,
    set_index: usize,
    set: MutexGuard<'a, CacheSet>,
}

impl fmt::Debug for SetGuard<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SetGuard")
            .field("cache", &self.cache.name)
            .field("set_index", &self.set_index)
            .finish_non_exhaustive()
    }
}

impl SetGuard<'_> {
    /// Index of the locked set.
    pub const fn set_index(&self) -> usize {
        self.set_index
    }

    /// The locked set.
    pub fn set(&self) -> &CacheSet {
        &self.set
    }

    fn tag_of(&self, addr: u64) -> (u64, usize) {
        let (tag, set_index, offset) = self.cache.layout.split_with_offset(addr);
        assert_eq!(
            set_index, self.set_index,
            "address {addr:#x} does not belong to locked set {}",
            self.set_index
        );
        (tag, offset)
    }

    fn slot_id(&self, way: usize) -> usize {
        self.set_index * self.cache.associativity + way
    }

    /// Looks up `addr` without touching replacement state or counters.
    pub fn peek(&self, addr: u64) -> Option<&LineMetadata> {
        let (tag, _) = self.tag_of(addr);
        self.set.find(tag).map(|way| self.set.line(way))
    }

    /// Looks up `addr` for a metadata update (coherence state, dirty bits).
    pub fn peek_mut(&mut self, addr: u64) -> Option<&mut LineMetadata> {
        let (tag, _) = self.tag_of(addr);
        let way = self.set.find(tag)?;
        Some(self.set.line_mut(way))
    }

    /// Reads or writes `buf.len()` bytes at `addr` if the line is resident.
    ///
    /// A miss returns `None` and moves no data. On a hit, a `Load` runs the
    /// fault injector's pre-read hook over the line storage and then copies it
    /// into `buf`; a `Store` copies `buf` into the line and then runs the
    /// post-write hook. `update_replacement` decides whether the access
    /// counts toward the replacement policy.
    ///
    /// # Panics
    ///
    /// Panics if the access crosses the end of the line.
    pub fn access(
        &mut self,
        addr: u64,
        kind: AccessKind,
        buf: &mut [u8],
        now: u64,
        update_replacement: bool,
    ) -> Option<&mut LineMetadata> {
        match kind {
            AccessKind::Load => self.read_hit(addr, buf, now, update_replacement),
            AccessKind::Store => self.write_hit(addr, buf, now, update_replacement),
        }
    }

    /// Loads `buf.len()` bytes at `addr`, updating replacement state.
    pub fn load(&mut self, addr: u64, buf: &mut [u8], now: u64) -> Option<&mut LineMetadata> {
        self.read_hit(addr, buf, now, true)
    }

    /// Stores `data` at `addr`, updating replacement state.
    pub fn store(&mut self, addr: u64, data: &[u8], now: u64) -> Option<&mut LineMetadata> {
        self.write_hit(addr, data, now, true)
    }

    fn lookup(&self, addr: u64) -> Option<(usize, usize)> {
        let (tag, offset) = self.tag_of(addr);
        let way = self.set.find(tag);
        if way.is_none() {
            trace!(cache = %self.cache.name, addr = format_args!("{addr:#x}"), "miss");
        }
        way.map(|way| (way, offset))
    }

    fn read_hit(
        &mut self,
        addr: u64,
        buf: &mut [u8],
        now: u64,
        update_replacement: bool,
    ) -> Option<&mut LineMetadata> {
        let (way, offset) = self.lookup(addr)?;
        let slot = self.slot_id(way);
        if let Some(injector) = &self.cache.fault_injector {
            injector.pre_read(addr, slot, self.set.data_mut(way, offset, buf.len()), now);
        }
        self.set.read_line(way, offset, buf, update_replacement);
        trace!(cache = %self.cache.name, addr = format_args!("{addr:#x}"), way, "load hit");
        Some(self.set.line_mut(way))
    }

    fn write_hit(
        &mut self,
        addr: u64,
        data: &[u8],
        now: u64,
        update_replacement: bool,
    ) -> Option<&mut LineMetadata> {
        let (way, offset) = self.lookup(addr)?;
        let slot = self.slot_id(way);
        self.set.write_line(way, offset, data, update_replacement);
        if let Some(injector) = &self.cache.fault_injector {
            injector.post_write(addr, slot, self.set.data_mut(way, offset, data.len()), now);
        }
        trace!(cache = %self.cache.name, addr = format_args!("{addr:#x}"), way, "store hit");
        Some(self.set.line_mut(way))
    }

    /// Invalidates the line holding `addr`; returns whether one was present.
    pub fn invalidate(&mut self, addr: u64) -> bool {
        let (tag, _) = self.tag_of(addr);
        self.set.invalidate(tag)
    }

    /// Fills the line of `addr` with `fill`.
    ///
    /// Builds fresh metadata of the cache's type carrying the tag of `addr`
    /// and hands it to the set, which copies it into the chosen way. If that
    /// way held a valid line, it is returned. A configured fault injector
    /// then sees the fill as a whole-line write; the evicted data gets no
    /// read callback.
    ///
    /// # Panics
    ///
    /// Panics if `fill` is not exactly one line long or the line is already
    /// resident.
    pub fn insert(&mut self, addr: u64, fill: &[u8], now: u64) -> Option<Eviction> {
        let (tag, _) = self.tag_of(addr);
        assert!(self.set.find(tag).is_none(), "line {addr:#x} is already resident");

        let mut line = LineMetadata::create(self.cache.cache_type);
        line.set_tag(tag);
        let (_, evicted) = self.set.insert(&line, fill);

        let eviction = evicted.map(|(metadata, data)| Eviction {
            address: self.cache.layout.tag_to_address(metadata.tag()),
            metadata,
            data,
        });
        if let Some(eviction) = &eviction {
            debug!(
                cache = %self.cache.name,
                set = self.set_index,
                inserted = format_args!("{addr:#x}"),
                evicted = format_args!("{:#x}", eviction.address),
                "eviction"
            );
        }

        if let Some(injector) = &self.cache.fault_injector {
            let way = self.set.find(tag);
            assert!(way.is_some(), "inserted line {addr:#x} no longer there");
            if let Some(way) = way {
                let slot = self.slot_id(way);
                let line_size = self.set.line_size();
                let line_addr = self.cache.layout.tag_to_address(tag);
                injector.post_write(line_addr, slot, self.set.data_mut(way, 0, line_size), now);
            }
        }

        if let Some(usage) = &self.cache.set_usage {
            let _ = usage[self.set_index].fetch_add(1, Ordering::Relaxed);
        }

        eviction
    }

    /// Way holding `addr`.
    ///
    /// # Panics
    ///
    /// Panics if the line is not resident.
    pub fn block_index(&self, addr: u64) -> usize {
        let (tag, _) = self.tag_of(addr);
        let way = self.set.block_index_for_tag(tag);
        assert!(
            way.is_some_and(|way| way < self.cache.associativity),
            "no resident block for {addr:#x} in set {}",
            self.set_index
        );
        way.unwrap_or_default()
    }

    /// Records an access to `line_index` for the promotion heuristic.
    ///
    /// Returns the fast-tier way the line was moved into when the access
    /// triggered a promotion.
    ///
    /// # Panics
    ///
    /// Panics if `line_index` is not a way of the set.
    pub fn record_line_access(&mut self, line_index: usize) -> Option<usize> {
        let promoted = promotion::record_access(&mut self.set, line_index, &self.cache.promotion);
        if let Some(fast_way) = promoted {
            debug!(
                cache = %self.cache.name,
                set = self.set_index,
                from = line_index,
                to = fast_way,
                "promoted line to fast tier"
            );
        }
        promoted
    }
}
