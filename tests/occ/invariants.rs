//! Invariant Property Tests
//!
//! Random insert and move sequences against one store; after every step
//! the store must still satisfy the overlap invariant and the version
//! counters must match the number of accepted updates.

use crate::{seeded, window};
use proptest::prelude::*;
use slotlock::{
    find_overlapping_pairs, Booking, InMemoryStore, NewBooking, OwnerId, RecordId, RecordStore,
    ResourceId, TimeWindow, VersionConflict,
};
use std::collections::HashMap;

#[derive(Debug, Clone)]
enum Op {
    Insert { room: usize, start: u32, len: u32 },
    Move { pick: usize, start: u32, len: u32 },
    Rename { pick: usize },
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        (0usize..3, 0u32..20, 1u32..4)
            .prop_map(|(room, start, len)| Op::Insert { room, start, len }),
        (any::<usize>(), 0u32..20, 1u32..4)
            .prop_map(|(pick, start, len)| Op::Move { pick, start, len }),
        any::<usize>().prop_map(|pick| Op::Rename { pick }),
    ]
}

fn naive_conflict(
    bookings: &[Booking],
    exclude: Option<RecordId>,
    room: ResourceId,
    w: &TimeWindow,
) -> bool {
    bookings.iter().any(|b| {
        Some(b.id) != exclude
            && b.resource == room
            && b.window.start() < w.end()
            && w.start() < b.window.end()
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_store_never_admits_overlap(ops in proptest::collection::vec(op(), 1..40)) {
        let store = InMemoryStore::new();
        let rooms = [ResourceId::new(), ResourceId::new(), ResourceId::new()];
        let mut ids: Vec<RecordId> = Vec::new();
        let mut updates: HashMap<RecordId, u64> = HashMap::new();

        for op in ops {
            let before = store.all();
            match op {
                Op::Insert { room, start, len } => {
                    let w = window(start, start + len);
                    let expected_reject = naive_conflict(&before, None, rooms[room], &w);
                    let res = store.insert(NewBooking {
                        resource: rooms[room],
                        owner: OwnerId::new(),
                        window: w,
                        subject: "p".to_string(),
                    });
                    prop_assert_eq!(res.is_err(), expected_reject);
                    if let Ok(b) = res {
                        prop_assert_eq!(b.version, 0);
                        ids.push(b.id);
                    }
                }
                Op::Move { pick, start, len } => {
                    if ids.is_empty() {
                        continue;
                    }
                    let id = ids[pick % ids.len()];
                    let current = store.get(id).unwrap();
                    let mut c = current.to_candidate();
                    c.window = window(start, start + len);
                    let expected_reject = naive_conflict(&before, Some(id), c.resource, &c.window);
                    match store.commit(&c, current.version) {
                        Ok(v) => {
                            prop_assert!(!expected_reject);
                            prop_assert_eq!(v, current.version + 1);
                            *updates.entry(id).or_default() += 1;
                        }
                        Err(e) => {
                            prop_assert!(expected_reject);
                            prop_assert!(e.is_validation());
                            prop_assert_eq!(store.get(id).unwrap(), current);
                        }
                    }
                }
                Op::Rename { pick } => {
                    if ids.is_empty() {
                        continue;
                    }
                    let id = ids[pick % ids.len()];
                    let current = store.get(id).unwrap();
                    let mut c = current.to_candidate();
                    c.subject.push('!');
                    prop_assert_eq!(
                        store.commit(&c, current.version).unwrap(),
                        current.version + 1
                    );
                    *updates.entry(id).or_default() += 1;
                }
            }
            prop_assert!(find_overlapping_pairs(&store.all()).is_empty());
        }

        for id in ids {
            let expected = updates.get(&id).copied().unwrap_or(0);
            prop_assert_eq!(store.get(id).unwrap().version, expected);
        }
    }

    #[test]
    fn prop_stale_version_always_conflicts(bumps in 1u64..6, stale in 0u64..6) {
        prop_assume!(stale < bumps);
        let (store, r) = seeded();
        for _ in 0..bumps {
            let current = store.get(r.id).unwrap();
            store.commit(&current.to_candidate(), current.version).unwrap();
        }
        let err = store.commit(&r.to_candidate(), stale).unwrap_err();
        prop_assert_eq!(
            err.conflict().copied(),
            Some(VersionConflict { id: r.id, expected: stale, actual: bumps })
        );
        prop_assert_eq!(store.get(r.id).unwrap().version, bumps);
    }
}
