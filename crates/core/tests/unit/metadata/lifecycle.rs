//! Line Metadata Lifecycle Tests.
//!
//! Covers the per-type factory, invalidation, copying between records and
//! the fields that only some cache types carry.

use hcsim_core::CacheError;
use hcsim_core::LineMetadata;
use hcsim_core::common::MemComponent;
use hcsim_core::config::CacheType;
use hcsim_core::metadata::{
    CacheState, INVALID_TAG, LineKind, LineOption, LineOptions, option_name,
};
use pretty_assertions::assert_eq;
use rstest::rstest;

#[rstest]
#[case(CacheType::PrivateL1)]
#[case(CacheType::PrivateL2)]
#[case(CacheType::Shared)]
fn create_yields_empty_record_of_type(#[case] cache_type: CacheType) {
    let line = LineMetadata::create(cache_type);
    assert_eq!(line.cache_type(), cache_type);
    assert_eq!(line.tag(), INVALID_TAG);
    assert!(!line.is_valid());
    assert_eq!(line.state(), CacheState::Invalid);
    assert_eq!(line.usage().bits(), 0);
    assert_eq!(line.dirty_word(), 0);
    assert_eq!(line.options(), LineOptions::default());
}

#[test]
fn create_from_code_maps_known_codes() {
    assert_eq!(
        LineMetadata::create_from_code(2).unwrap().kind(),
        &LineKind::PrivateL2 { cached_loc: None }
    );
    assert!(matches!(
        LineMetadata::create_from_code(0),
        Err(CacheError::UnrecognizedCacheType(0))
    ));
}

#[test]
fn invalidate_clears_identity_but_not_usage() {
    let mut line = LineMetadata::new(
        CacheType::PrivateL1,
        0x40,
        CacheState::Modified,
        LineOptions::default(),
    );
    let _ = line.update_usage(0, 16);
    line.set_dirty_bit(2);
    line.set_option(LineOption::Prefetch);

    line.invalidate();

    assert!(!line.is_valid());
    assert_eq!(line.state(), CacheState::Invalid);
    assert_eq!(line.usage().bits(), 0b11);
    assert_eq!(line.dirty_word(), 0b100);
    assert!(line.has_option(LineOption::Prefetch));
}

#[test]
fn invalidate_drops_variant_payload() {
    let mut shared = LineMetadata::create(CacheType::Shared);
    shared.set_tag(1);
    assert!(shared.add_sharer(3));
    shared.invalidate();
    assert_eq!(shared.num_sharers(), 0);

    let mut l2 = LineMetadata::create(CacheType::PrivateL2);
    l2.set_tag(1);
    l2.set_cached_location(MemComponent::L1D);
    l2.invalidate();
    assert_eq!(l2.cached_location(), None);
}

#[test]
fn clone_from_line_copies_everything_of_same_type() {
    let mut src = LineMetadata::new(
        CacheType::Shared,
        0x99,
        CacheState::Owned,
        LineOptions::default(),
    );
    src.set_owner(5);
    src.set_dirty_bit(7);
    src.set_option(LineOption::Warmup);
    let _ = src.add_sharer(1);
    let _ = src.add_sharer(64);

    let mut dst = LineMetadata::create(CacheType::Shared);
    dst.clone_from_line(&src);
    assert_eq!(dst, src);
}

#[test]
fn clone_from_line_across_types_keeps_own_variant() {
    let mut src = LineMetadata::create(CacheType::Shared);
    src.set_tag(0x10);
    src.set_state(CacheState::Shared);
    let _ = src.add_sharer(2);

    let mut dst = LineMetadata::create(CacheType::PrivateL2);
    dst.clone_from_line(&src);

    assert_eq!(dst.tag(), 0x10);
    assert_eq!(dst.state(), CacheState::Shared);
    assert_eq!(dst.cache_type(), CacheType::PrivateL2);
    assert_eq!(dst.num_sharers(), 0);
}

#[test]
fn sharers_track_cores() {
    let mut line = LineMetadata::create(CacheType::Shared);
    assert!(line.add_sharer(0));
    assert!(line.add_sharer(127));
    assert!(!line.add_sharer(0), "second add is not new");

    assert!(line.has_sharer(127));
    assert_eq!(line.num_sharers(), 2);
    assert_eq!(line.sharers().iter().collect::<Vec<_>>(), vec![0, 127]);

    assert!(line.remove_sharer(0));
    assert!(!line.remove_sharer(0));
    assert_eq!(line.num_sharers(), 1);
}

#[test]
fn private_lines_ignore_sharer_updates() {
    let mut line = LineMetadata::create(CacheType::PrivateL1);
    assert!(!line.add_sharer(1));
    assert!(!line.has_sharer(1));
    assert!(line.sharers().is_empty());

    line.set_cached_location(MemComponent::L1I);
    assert_eq!(line.cached_location(), None);
}

#[test]
fn cached_location_round_trips_on_private_l2() {
    let mut line = LineMetadata::create(CacheType::PrivateL2);
    line.set_cached_location(MemComponent::L1I);
    assert_eq!(line.cached_location(), Some(MemComponent::L1I));
    line.clear_cached_location();
    assert_eq!(line.cached_location(), None);
}

#[test]
#[should_panic(expected = "trackable sharers")]
fn sharer_id_beyond_capacity_panics() {
    let mut line = LineMetadata::create(CacheType::Shared);
    let _ = line.add_sharer(128);
}

#[test]
fn options_set_and_clear_independently() {
    let mut line = LineMetadata::create(CacheType::PrivateL1);
    line.set_option(LineOption::Prefetch);
    line.set_option(LineOption::Warmup);
    line.clear_option(LineOption::Prefetch);

    assert!(!line.has_option(LineOption::Prefetch));
    assert!(line.has_option(LineOption::Warmup));
    assert_eq!(option_name(0), "prefetch");
    assert_eq!(option_name(1), "warmup");
    assert_eq!(option_name(2), "invalid");
}

#[test]
fn state_predicates() {
    assert!(!CacheState::Invalid.is_readable());
    assert!(CacheState::SharedUpgrading.is_readable());
    assert!(CacheState::Exclusive.is_writable());
    assert!(!CacheState::Owned.is_writable());
    assert!(CacheState::Owned.is_dirty());
    assert!(!CacheState::Exclusive.is_dirty());
}
