//! Fault Injection Hook Tests.
//!
//! Verifies when the injector is called, which address, slot and bytes it
//! sees, and that a corrupting injector changes the data a load returns.

use std::sync::Arc;

use hcsim_core::common::AccessKind;
use pretty_assertions::assert_eq;

use crate::common::harness::{LINE, cache, cache_with_injector, pattern, small_config};
use crate::common::mocks::fault::{BitFlipInjector, FaultEvent, Hook, RecordingInjector};

fn recording() -> (Arc<RecordingInjector>, hcsim_core::Cache) {
    let injector = Arc::new(RecordingInjector::default());
    let cache = cache_with_injector(&small_config(), injector.clone());
    (injector, cache)
}

#[test]
fn fill_is_reported_as_whole_line_write() {
    let (injector, cache) = recording();
    // 0x1047 lives in set 1; the first fill of the set lands in way 0.
    let _ = cache.insert(0x1047, &pattern(0x10), 42);

    assert_eq!(
        injector.events(),
        vec![FaultEvent {
            hook: Hook::PostWrite,
            addr: 0x1040,
            slot: 4,
            data: pattern(0x10),
            now: 42,
        }]
    );
}

#[test]
fn load_runs_pre_read_over_the_accessed_bytes() {
    let (injector, cache) = recording();
    let _ = cache.insert(0x1000, &pattern(0), 0);
    let _ = cache.insert(0x1200, &pattern(0x40), 0);

    let mut buf = [0; 4];
    let _ = cache.access(0x1208, AccessKind::Load, &mut buf, 9, true);

    let events = injector.events();
    assert_eq!(events.len(), 3);
    assert_eq!(
        events[2],
        FaultEvent {
            hook: Hook::PreRead,
            addr: 0x1208,
            slot: 1,
            data: pattern(0x40)[8..12].to_vec(),
            now: 9,
        }
    );
}

#[test]
fn store_runs_post_write_after_the_copy() {
    let (injector, cache) = recording();
    let _ = cache.insert(0x1000, &pattern(0), 0);

    let mut buf = [0xAB; 8];
    let _ = cache.access(0x1010, AccessKind::Store, &mut buf, 3, true);

    let last = injector.events().pop().unwrap();
    assert_eq!(last.hook, Hook::PostWrite);
    assert_eq!(last.addr, 0x1010);
    assert_eq!(last.data, vec![0xAB; 8]);
    assert_eq!(last.now, 3);
}

#[test]
fn guard_store_writes_line_and_reports_post_write() {
    let (injector, cache) = recording();
    let _ = cache.insert(0x1000, &pattern(0), 0);

    let data = [0x5A; 4];
    {
        let mut set = cache.set_lock(0x1000);
        assert!(set.store(0x1020, &data, 7).is_some());
        assert!(set.store(0x1200, &data, 7).is_none());
    }

    let last = injector.events().pop().unwrap();
    assert_eq!(last.hook, Hook::PostWrite);
    assert_eq!(last.addr, 0x1020);
    assert_eq!(last.data, data.to_vec());
    assert_eq!(last.now, 7);

    let mut line = vec![0; LINE];
    let _ = cache.access(0x1000, AccessKind::Load, &mut line, 8, false);
    assert_eq!(&line[0x20..0x24], &data);
    assert_eq!(&line[..0x20], &pattern(0)[..0x20]);
}

#[test]
fn misses_and_peeks_skip_the_injector() {
    let (injector, cache) = recording();
    let mut buf = [0; 8];

    let _ = cache.access(0x1000, AccessKind::Load, &mut buf, 0, true);
    let _ = cache.access(0x1000, AccessKind::Store, &mut buf, 0, true);
    let _ = cache.peek(0x1000);
    assert!(injector.events().is_empty());
}

#[test]
fn eviction_gets_no_read_callback() {
    let config = hcsim_core::CacheConfig {
        associativity: 1,
        ..small_config()
    };
    let injector = Arc::new(RecordingInjector::default());
    let cache = cache_with_injector(&config, injector.clone());

    let _ = cache.insert(0x1000, &pattern(0), 0);
    let eviction = cache.insert(0x1200, &pattern(1), 1);
    assert!(eviction.is_some());

    let hooks: Vec<Hook> = injector.events().iter().map(|e| e.hook).collect();
    assert_eq!(hooks, vec![Hook::PostWrite, Hook::PostWrite]);
}

#[test]
fn corrupting_injector_changes_loaded_data() {
    let injector = Arc::new(BitFlipInjector);
    let faulty = cache_with_injector(&small_config(), injector);
    let clean = cache(&small_config());

    for c in [&faulty, &clean] {
        let _ = c.insert(0x2000, &pattern(0x20), 0);
    }

    let mut from_faulty = vec![0; LINE];
    let mut from_clean = vec![0; LINE];
    let _ = faulty.access(0x2000, AccessKind::Load, &mut from_faulty, 1, true);
    let _ = clean.access(0x2000, AccessKind::Load, &mut from_clean, 1, true);

    assert_eq!(from_clean, pattern(0x20));
    assert_eq!(from_faulty[0], 0x20 ^ 1);
    assert_eq!(&from_faulty[1..], &from_clean[1..]);
}
