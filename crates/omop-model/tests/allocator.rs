//! Allocator behavior over arbitrary seeds and call counts.

use omop_model::IdTracker;
use proptest::prelude::*;

proptest! {
    #[test]
    fn ids_are_consecutive_from_seed(max in 0i64..1_000_000, n in 1usize..200) {
        let mut tracker = IdTracker::new(Some(max));
        let ids: Vec<i64> = (0..n).map(|_| tracker.next_id()).collect();
        let expected: Vec<i64> = (max + 1..max + 1 + n as i64).collect();
        prop_assert_eq!(ids, expected);
    }
}

#[test]
fn unreadable_destination_seeds_at_one() {
    let mut tracker = IdTracker::new(None);
    let ids: Vec<i64> = (0..5).map(|_| tracker.next_id()).collect();
    assert_eq!(ids, vec![1, 2, 3, 4, 5]);
}
