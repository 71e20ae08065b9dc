//! Property tests for the fetch cursor invariants

use chrono::NaiveDate;
use harvester::harvest::cursor::Cursor;
use proptest::prelude::*;

fn start_day() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()
}

proptest! {
    #[test]
    fn floor_is_monotonic_within_a_day(
        candidates in prop::collection::vec(prop::option::of(0u64..10_000), 1..50)
    ) {
        let mut cursor = Cursor::new(start_day());
        let mut last = cursor.floor();
        for candidate in candidates {
            cursor.advance(candidate);
            prop_assert!(cursor.floor() >= last);
            last = cursor.floor();
        }
    }

    #[test]
    fn window_only_shrinks_and_never_below_one(
        raw_lens in prop::collection::vec(0usize..2000, 1..50)
    ) {
        let mut cursor = Cursor::new(start_day());
        let mut last = cursor.delta_days();
        for raw_len in raw_lens {
            cursor.adapt_window(raw_len, 1000);
            prop_assert!(cursor.delta_days() <= last);
            prop_assert!(cursor.delta_days() >= 1);
            last = cursor.delta_days();
        }
    }

    #[test]
    fn full_pages_never_touch_the_window(
        raw_lens in prop::collection::vec(1000usize..5000, 1..50)
    ) {
        let mut cursor = Cursor::new(start_day());
        for raw_len in raw_lens {
            cursor.adapt_window(raw_len, 1000);
        }
        prop_assert_eq!(cursor.delta_days(), 7);
    }
}
