//! Associative set storage.
//!
//! A [`CacheSet`] owns, for each of its ways:
//! 1. **Data:** `line_size` bytes in one contiguous buffer.
//! 2. **Metadata:** One [`LineMetadata`] record.
//! 3. **Promotion counter:** An access counter used by the hybrid-tier heuristic.
//!
//! plus the replacement policy that nominates victims. Ordinary accesses go
//! through `find`/`read_line`/`write_line`/`insert`/`invalidate`. The promotion
//! heuristic additionally needs to exchange metadata between slots and manage
//! the counters; that privileged surface is the `SlotTable` and nothing else
//! uses it.

use crate::cache::policies::{self, ReplacementPolicy};
use crate::config::{CacheType, ReplacementPolicy as PolicyType};
use crate::metadata::LineMetadata;

/// Metadata and data of a line pushed out by a fill.
pub type EvictedLine = (LineMetadata, Vec<u8>);

/// One associative way-group.
#[derive(Debug)]
pub struct CacheSet {
    lines: Vec<LineMetadata>,
    data: Vec<u8>,
    line_size: usize,
    policy: Box<dyn ReplacementPolicy>,
    promotion_counters: Vec<u32>,
}

impl CacheSet {
    /// Creates an empty set.
    ///
    /// # Arguments
    ///
    /// * `cache_type` - Selects the metadata variant of every slot.
    /// * `ways` - Associativity.
    /// * `line_size` - Bytes per line.
    /// * `policy` - Replacement policy.
    /// * `set_index` - Index of this set, used to seed per-set policy state.
    /// * `tracked_lines` - Number of promotion counters.
    pub fn new(
        cache_type: CacheType,
        ways: usize,
        line_size: usize,
        policy: PolicyType,
        set_index: usize,
        tracked_lines: usize,
    ) -> Self {
        Self {
            lines: vec![LineMetadata::create(cache_type); ways],
            data: vec![0; ways * line_size],
            line_size,
            policy: policies::build(policy, ways, set_index),
            promotion_counters: vec![0; tracked_lines],
        }
    }

    /// Associativity of the set.
    pub fn ways(&self) -> usize {
        self.lines.len()
    }

    /// Bytes per line.
    pub const fn line_size(&self) -> usize {
        self.line_size
    }

    /// Way holding `tag`, if resident.
    pub fn find(&self, tag: u64) -> Option<usize> {
        self.lines
            .iter()
            .position(|line| line.is_valid() && line.tag() == tag)
    }

    /// Metadata of `way`.
    pub fn line(&self, way: usize) -> &LineMetadata {
        &self.lines[way]
    }

    /// Mutable metadata of `way`.
    pub fn line_mut(&mut self, way: usize) -> &mut LineMetadata {
        &mut self.lines[way]
    }

    /// Way index of `tag`, for callers that need raw coordinates.
    pub fn block_index_for_tag(&self, tag: u64) -> Option<usize> {
        self.find(tag)
    }

    fn range(&self, way: usize, offset: usize, len: usize) -> std::ops::Range<usize> {
        assert!(way < self.ways(), "way {way} out of range for {} ways", self.ways());
        assert!(
            offset + len <= self.line_size,
            "access {offset}+{len} crosses a {}-byte line",
            self.line_size
        );
        let start = way * self.line_size + offset;
        start..start + len
    }

    /// Storage of `len` bytes of `way` starting at `offset`.
    pub fn data_mut(&mut self, way: usize, offset: usize, len: usize) -> &mut [u8] {
        let range = self.range(way, offset, len);
        &mut self.data[range]
    }

    /// Copies `buf.len()` bytes of `way` at `offset` into `buf`.
    pub fn read_line(&mut self, way: usize, offset: usize, buf: &mut [u8], update_replacement: bool) {
        let range = self.range(way, offset, buf.len());
        buf.copy_from_slice(&self.data[range]);
        if update_replacement {
            self.policy.update(way);
        }
    }

    /// Copies `buf` into `way` at `offset`.
    pub fn write_line(&mut self, way: usize, offset: usize, buf: &[u8], update_replacement: bool) {
        let range = self.range(way, offset, buf.len());
        self.data[range].copy_from_slice(buf);
        if update_replacement {
            self.policy.update(way);
        }
    }

    /// Installs a copy of `line` with `fill` as its data.
    ///
    /// An empty way is used when one exists; otherwise the replacement policy
    /// picks the victim. Returns the way written and, when that way held a
    /// valid line, its metadata and data.
    ///
    /// # Panics
    ///
    /// Panics if `fill` is not exactly one line long.
    pub fn insert(&mut self, line: &LineMetadata, fill: &[u8]) -> (usize, Option<EvictedLine>) {
        assert_eq!(fill.len(), self.line_size, "fill must cover exactly one line");

        let way = match self.lines.iter().position(|slot| !slot.is_valid()) {
            Some(empty) => empty,
            None => self.policy.get_victim(),
        };
        assert!(way < self.ways(), "replacement policy chose way {way}");

        let range = self.range(way, 0, self.line_size);
        let evicted = self.lines[way]
            .is_valid()
            .then(|| (self.lines[way].clone(), self.data[range.clone()].to_vec()));

        self.lines[way].clone_from_line(line);
        self.data[range].copy_from_slice(fill);
        self.policy.update(way);

        (way, evicted)
    }

    /// Invalidates the line holding `tag`; returns whether one was present.
    pub fn invalidate(&mut self, tag: u64) -> bool {
        match self.find(tag) {
            Some(way) => {
                self.lines[way].invalidate();
                true
            }
            None => false,
        }
    }

    /// Privileged slot access for the promotion heuristic.
    pub(crate) fn slot_table(&mut self) -> SlotTable<'_> {
        SlotTable {
            lines: &mut self.lines,
            counters: &mut self.promotion_counters,
        }
    }

    /// Current promotion counters, one per tracked way.
    pub fn promotion_counters(&self) -> &[u32] {
        &self.promotion_counters
    }
}

/// Direct view of a set's metadata slots and promotion counters.
///
/// Only the promotion heuristic uses this: it moves metadata between slots
/// without going through insert/invalidate, and owns the counters.
#[derive(Debug)]
pub(crate) struct SlotTable<'a> {
    lines: &'a mut [LineMetadata],
    counters: &'a mut [u32],
}

impl SlotTable<'_> {
    /// Increments the counter of `way`; `None` if the way is not tracked.
    pub(crate) fn bump(&mut self, way: usize) -> Option<u32> {
        let counter = self.counters.get_mut(way)?;
        *counter = counter.saturating_add(1);
        Some(*counter)
    }

    /// Lowest-count way among `candidates` whose counter is below `ceiling`.
    /// The first of equal minima wins.
    pub(crate) fn coldest_below(
        &self,
        candidates: std::ops::Range<usize>,
        ceiling: u32,
    ) -> Option<usize> {
        let mut best: Option<(usize, u32)> = None;
        for way in candidates {
            let Some(&count) = self.counters.get(way) else {
                break;
            };
            let floor = best.map_or(ceiling, |(_, c)| c);
            if count < floor {
                best = Some((way, count));
            }
        }
        best.map(|(way, _)| way)
    }

    /// Exchanges the metadata records of two ways.
    pub(crate) fn swap_lines(&mut self, a: usize, b: usize) {
        self.lines.swap(a, b);
    }

    /// Clears every promotion counter of the set.
    pub(crate) fn reset_counters(&mut self) {
        self.counters.fill(0);
    }
}
