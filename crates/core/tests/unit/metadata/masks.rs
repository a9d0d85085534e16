//! Usage and Dirty-Word Mask Tests.

use hcsim_core::LineMetadata;
use hcsim_core::config::CacheType;
use hcsim_core::metadata::{DIRTY_WORDS, UsageMask};
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use rstest::rstest;

fn line() -> LineMetadata {
    LineMetadata::create(CacheType::PrivateL1)
}

#[rstest]
#[case(0, 1, 0b1)]
#[case(0, 8, 0b1)]
#[case(7, 2, 0b11)]
#[case(16, 24, 0b11100)]
#[case(0, 64, 0xFF)]
fn usage_marks_overlapping_regions(#[case] offset: usize, #[case] size: usize, #[case] bits: u64) {
    let mut line = line();
    assert!(line.update_usage(offset, size));
    assert_eq!(line.usage().bits(), bits);
}

#[test]
fn usage_reports_only_new_regions() {
    let mut line = line();
    assert!(line.update_usage(0, 8));
    assert!(!line.update_usage(2, 4), "region 0 already used");
    assert!(line.update_usage(4, 8), "region 1 is new");
    assert!(!line.update_usage(0, 0), "empty access touches nothing");
    assert!(!line.update_usage_mask(UsageMask::from_bits(0b11)));
}

#[test]
fn dirty_bits_set_and_reset() {
    let mut line = line();
    line.set_dirty_bit(0);
    line.set_dirty_bit(7);
    assert_eq!(line.dirty_word(), 0b1000_0001);
    assert!(line.dirty_words().is_set(7));

    line.reset_dirty_bit(0);
    assert_eq!(line.dirty_word(), 0b1000_0000);
}

#[rstest]
#[case(DIRTY_WORDS)]
#[case(63)]
#[case(usize::MAX)]
fn out_of_range_dirty_index_clears_mask(#[case] index: usize) {
    let mut line = line();
    line.set_dirty_bit(3);
    line.set_dirty_bit(index);
    assert_eq!(line.dirty_word(), 0);

    line.set_dirty_bit(3);
    line.reset_dirty_bit(index);
    assert_eq!(line.dirty_word(), 0);
}

#[test]
fn copy_dirty_word_replaces_mask() {
    let mut src = line();
    src.set_dirty_bit(1);
    src.set_dirty_bit(6);
    let mut dst = line();
    dst.set_dirty_bit(4);

    dst.copy_dirty_word(&src);
    assert_eq!(dst.dirty_word(), src.dirty_word());
    assert!(!dst.dirty_words().is_set(4));
}

proptest! {
    #[test]
    fn repeated_usage_update_is_never_new(offset in 0usize..64, size in 1usize..=8) {
        prop_assume!(offset + size <= 64);
        let mut line = line();
        prop_assert!(line.update_usage(offset, size));
        prop_assert!(!line.update_usage(offset, size));
    }

    #[test]
    fn set_then_reset_restores_mask(initial in 0u8..=255, i in 0usize..DIRTY_WORDS) {
        let mut line = line();
        for bit in 0..DIRTY_WORDS {
            if initial >> bit & 1 == 1 {
                line.set_dirty_bit(bit);
            }
        }
        prop_assume!(!line.dirty_words().is_set(i));

        line.set_dirty_bit(i);
        prop_assert!(line.dirty_words().is_set(i));
        line.reset_dirty_bit(i);
        prop_assert_eq!(line.dirty_word(), initial);
    }
}
