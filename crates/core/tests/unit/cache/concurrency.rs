//! Concurrent Access Tests.
//!
//! Verifies that threads working on distinct sets do not interfere and that
//! a set guard makes a lookup-then-fill sequence atomic.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;

use hcsim_core::common::AccessKind;
use hcsim_core::config::CacheConfig;
use pretty_assertions::assert_eq;

use crate::common::harness::{LINE, block_in_set, cache, pattern, small_config};

#[test]
fn threads_on_distinct_sets_see_their_own_data() {
    let cache = cache(&small_config());

    thread::scope(|s| {
        for set in 0..8 {
            let cache = &cache;
            let _ = s.spawn(move || {
                for n in 0..4 {
                    let addr = block_in_set(set, n, 8);
                    assert!(cache.insert(addr, &pattern((set * 4 + n) as u8), 0).is_none());
                }
                for _ in 0..100 {
                    for n in 0..4 {
                        let addr = block_in_set(set, n, 8);
                        let mut line = vec![0; LINE];
                        assert!(cache.access(addr, AccessKind::Load, &mut line, 0, true).is_some());
                        assert_eq!(line, pattern((set * 4 + n) as u8));
                        cache.update_counters(true);
                    }
                }
            });
        }
    });

    assert_eq!(cache.accesses(), 8 * 100 * 4);
    assert_eq!(cache.hits(), cache.accesses());
}

#[test]
fn guarded_lookup_then_fill_inserts_once() {
    let cache = cache(&small_config());
    let fills = AtomicUsize::new(0);

    thread::scope(|s| {
        for _ in 0..8 {
            let _ = s.spawn(|| {
                let mut set = cache.set_lock(0x1000);
                if set.peek(0x1000).is_none() {
                    let _ = fills.fetch_add(1, Ordering::Relaxed);
                    assert!(set.insert(0x1000, &pattern(0), 0).is_none());
                }
            });
        }
    });

    assert_eq!(fills.load(Ordering::Relaxed), 1);
    assert!(cache.peek(0x1000).is_some());
}

#[test]
fn contended_set_stays_consistent() {
    let config = CacheConfig {
        num_sets: 1,
        associativity: 2,
        ..small_config()
    };
    let cache = cache(&config);

    thread::scope(|s| {
        for t in 0..4 {
            let cache = &cache;
            let _ = s.spawn(move || {
                for i in 0..50 {
                    let addr = ((t * 50 + i) * LINE) as u64;
                    let mut set = cache.set_lock(addr);
                    if set.peek(addr).is_none() {
                        let _ = set.insert(addr, &pattern(t as u8), 0);
                    }
                    assert!(set.peek(addr).is_some());
                }
            });
        }
    });

    let guard = cache.set_lock(0);
    let resident = (0..guard.set().ways())
        .filter(|&way| guard.set().line(way).is_valid())
        .count();
    assert_eq!(resident, 2);
}
