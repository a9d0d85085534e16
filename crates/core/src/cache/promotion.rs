//! Hybrid-tier line promotion.
//!
//! Models a set built from a few fast ways (`0..fast_lines`) and a larger
//! slow region. Every access bumps a per-way counter. When a slow way reaches
//! the threshold, it trades places with the coldest fast way whose count is
//! lower than its own: data is exchanged chunk by chunk through the set's
//! read/write path (without touching replacement state), and the metadata
//! records follow their data. Every counter of the set is then cleared,
//! whether or not a swap happened.

use crate::cache::set::CacheSet;
use crate::config::PromotionConfig;

/// Records an access to `way` and promotes it if it is hot enough.
///
/// Returns the fast-tier way the line moved into, if a swap happened.
///
/// # Panics
///
/// Panics if `way` is not a way of `set`.
pub(crate) fn record_access(set: &mut CacheSet, way: usize, cfg: &PromotionConfig) -> Option<usize> {
    assert!(way < set.ways(), "way {way} out of range for {} ways", set.ways());

    let mut table = set.slot_table();
    let count = table.bump(way)?;
    if way < cfg.fast_lines || count < cfg.threshold {
        return None;
    }

    let fast_end = cfg.fast_lines.min(set.ways());
    let target = set.slot_table().coldest_below(0..fast_end, count);
    if let Some(fast_way) = target {
        swap_data(set, fast_way, way, cfg.chunk_bytes);
        set.slot_table().swap_lines(fast_way, way);
    }
    set.slot_table().reset_counters();
    target
}

fn swap_data(set: &mut CacheSet, a: usize, b: usize, chunk: usize) {
    let mut from_a = vec![0u8; chunk];
    let mut from_b = vec![0u8; chunk];
    for offset in (0..set.line_size()).step_by(chunk) {
        set.read_line(a, offset, &mut from_a, false);
        set.read_line(b, offset, &mut from_b, false);
        set.write_line(a, offset, &from_b, false);
        set.write_line(b, offset, &from_a, false);
    }
}
