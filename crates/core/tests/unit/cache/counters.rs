//! Statistics Counter Tests.
//!
//! Verifies the enable flag, access/hit counting, set-usage tracking and the
//! statistics snapshot.

use hcsim_core::common::AccessKind;
use hcsim_core::config::CacheConfig;
use pretty_assertions::assert_eq;
use proptest::prelude::*;

use crate::common::harness::{block_in_set, cache, pattern, small_config};

#[test]
fn enabled_cache_counts_accesses_and_hits() {
    let cache = cache(&small_config());
    cache.update_counters(true);
    cache.update_counters(false);
    cache.update_counters(true);

    assert_eq!(cache.accesses(), 3);
    assert_eq!(cache.hits(), 2);
}

#[test]
fn disabling_freezes_counters() {
    let cache = cache(&small_config());
    cache.update_counters(true);
    cache.disable();
    assert!(!cache.is_enabled());

    cache.update_counters(true);
    cache.update_hits(AccessKind::Load, 10);
    assert_eq!((cache.accesses(), cache.hits()), (1, 1));

    cache.enable();
    cache.update_hits(AccessKind::Store, 4);
    assert_eq!((cache.accesses(), cache.hits()), (5, 5));
}

#[test]
fn counters_start_disabled_by_default_config() {
    let config = CacheConfig {
        enabled: false,
        ..small_config()
    };
    let cache = cache(&config);
    cache.update_counters(true);
    assert_eq!(cache.accesses(), 0);
}

#[test]
fn set_usage_counts_fills_per_set() {
    let config = CacheConfig {
        track_set_usage: true,
        associativity: 1,
        ..small_config()
    };
    let cache = cache(&config);
    for n in 0..3 {
        let _ = cache.insert(block_in_set(2, n, 8), &pattern(0), 0);
    }
    let _ = cache.insert(block_in_set(5, 0, 8), &pattern(0), 0);

    assert_eq!(cache.set_usage(), Some(vec![0, 0, 3, 0, 0, 1, 0, 0]));
}

#[test]
fn set_usage_is_absent_unless_configured() {
    let cache = cache(&small_config());
    let _ = cache.insert(0x1000, &pattern(0), 0);
    assert_eq!(cache.set_usage(), None);
}

#[test]
fn stats_snapshot_serializes() {
    let cache = cache(&small_config());
    for hit in [true, true, true, false] {
        cache.update_counters(hit);
    }

    let stats = cache.stats();
    assert_eq!(stats.name, "test-L1");
    assert_eq!(stats.misses, 1);
    assert!((stats.hit_rate - 0.75).abs() < f64::EPSILON);

    let json: serde_json::Value = serde_json::from_str(&stats.to_json().unwrap()).unwrap();
    assert_eq!(json["accesses"], 4);
    assert_eq!(json["hits"], 3);
}

proptest! {
    #[test]
    fn hits_never_exceed_accesses(outcomes in proptest::collection::vec(any::<bool>(), 0..200)) {
        let cache = cache(&small_config());
        for &hit in &outcomes {
            cache.update_counters(hit);
        }
        prop_assert_eq!(cache.accesses(), outcomes.len() as u64);
        prop_assert_eq!(cache.hits(), outcomes.iter().filter(|&&h| h).count() as u64);
        prop_assert!(cache.hits() <= cache.accesses());
    }

    #[test]
    fn disabled_cache_never_counts(outcomes in proptest::collection::vec(any::<bool>(), 0..200)) {
        let cache = cache(&small_config());
        cache.disable();
        for &hit in &outcomes {
            cache.update_counters(hit);
            cache.update_hits(AccessKind::Load, 1);
        }
        prop_assert_eq!(cache.accesses(), 0);
        prop_assert_eq!(cache.hits(), 0);
    }
}
