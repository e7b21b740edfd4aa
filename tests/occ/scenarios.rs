//! Walkthrough Scenarios
//!
//! Two users editing one meeting, replayed step by step so the
//! interleaving is exact rather than left to the scheduler.

use crate::*;

/// A fetches, B fetches, A commits, B commits stale
#[test]
fn test_stale_commit_reports_expected_and_actual() {
    let (store, r) = seeded();

    let a_base = store.get(r.id).unwrap();
    let b_base = store.get(r.id).unwrap();
    assert_eq!(a_base.version, 0);
    assert_eq!(b_base.version, 0);

    let mut a = a_base.to_candidate();
    a.subject = "X".to_string();
    assert_eq!(store.commit(&a, a_base.version).unwrap(), 1);

    let mut b = b_base.to_candidate();
    b.window = b.window.shifted(ChronoDuration::hours(1));
    let err = store.commit(&b, b_base.version).unwrap_err();

    assert_eq!(
        err.conflict(),
        Some(&VersionConflict {
            id: r.id,
            expected: 0,
            actual: 1,
        })
    );
    let stored = store.get(r.id).unwrap();
    assert_eq!(stored.version, 1);
    assert_eq!(stored.subject, "X");
    assert_eq!(stored.window, window(10, 12));
}

/// The same race, with B going through the retry coordinator
#[test]
fn test_retry_recovers_from_stale_commit() {
    let (store, r) = seeded();
    let ctx = Context::new(Arc::clone(&store)).with_config(fast_retry(3));

    let rival = Arc::clone(&store);
    let mut first = true;
    let outcome = ctx
        .retry()
        .execute_with_retry(r.id, |c| {
            if first {
                first = false;
                let current = rival.get(r.id).unwrap();
                let mut a = current.to_candidate();
                a.subject = "X".to_string();
                rival.commit(&a, current.version).unwrap();
            }
            c.window = c.window.shifted(ChronoDuration::hours(1));
        })
        .unwrap();

    assert_eq!(outcome, RetryOutcome { version: 2, attempts: 2 });
    let stored = store.get(r.id).unwrap();
    assert_eq!(stored.subject, "X");
    assert_eq!(stored.window, window(11, 13));
}

/// B escalates and the policy applies B's window on top of A's subject
#[test]
fn test_manual_apply_mine_keeps_their_subject() {
    let (store, r) = seeded();
    let ctx = Context::new(Arc::clone(&store));

    let rival = Arc::clone(&store);
    let mut first = true;
    let b_mutation = |c: &mut Candidate| {
        if first {
            first = false;
            let current = rival.get(r.id).unwrap();
            let mut a = current.to_candidate();
            a.subject = "X".to_string();
            rival.commit(&a, current.version).unwrap();
        }
        c.window = c.window.shifted(ChronoDuration::hours(1));
    };

    let policy = |report: &ConflictReport| {
        assert_eq!(report.conflict.expected, 0);
        assert_eq!(report.conflict.actual, 1);
        assert_eq!(report.current.subject, "X");
        assert_eq!(report.attempted.window, window(11, 13));
        assert_eq!(report.my_changes(), vec![Field::Window]);
        assert_eq!(report.their_changes(), vec![Field::Subject]);
        Resolution::ApplyMine(report.my_changes())
    };

    let outcome = ctx.manual().resolve(r.id, b_mutation, &policy).unwrap();
    assert_eq!(
        outcome,
        ResolveOutcome::Committed {
            version: 2,
            escalated: true
        }
    );

    let stored = store.get(r.id).unwrap();
    assert_eq!(stored.version, 2);
    assert_eq!(stored.subject, "X");
    assert_eq!(stored.window, window(11, 13));
}

/// Including `Subject` in ApplyMine overwrites the winner's subject
#[test]
fn test_manual_apply_mine_with_subject_overwrites() {
    let (store, r) = seeded();
    let ctx = Context::new(Arc::clone(&store));

    let rival = Arc::clone(&store);
    let mut first = true;
    let b_mutation = |c: &mut Candidate| {
        if first {
            first = false;
            let current = rival.get(r.id).unwrap();
            let mut a = current.to_candidate();
            a.subject = "X".to_string();
            rival.commit(&a, current.version).unwrap();
        }
        c.window = c.window.shifted(ChronoDuration::hours(1));
    };

    let policy = ApplyMinePolicy::fields(vec![Field::Window, Field::Subject]);
    ctx.manual().resolve(r.id, b_mutation, &policy).unwrap();

    let stored = store.get(r.id).unwrap();
    assert_eq!(stored.subject, "Team meeting");
    assert_eq!(stored.window, window(11, 13));
}

#[test]
fn test_overlap_rejected_touching_accepted() {
    let store = InMemoryStore::new();
    let room = ResourceId::new();
    book(&store, room, 10, 12);

    let overlapping = store
        .insert(NewBooking {
            resource: room,
            owner: OwnerId::new(),
            window: window(11, 13),
            subject: "clash".to_string(),
        })
        .unwrap_err();
    assert!(overlapping.is_validation());

    let touching = store
        .insert(NewBooking {
            resource: room,
            owner: OwnerId::new(),
            window: window(12, 13),
            subject: "next".to_string(),
        })
        .unwrap();
    assert_eq!(touching.version, 0);
    assert_eq!(store.list_by_resource(room).len(), 2);
}

#[test]
fn test_overlap_rejected_on_commit() {
    let store = InMemoryStore::new();
    let room = ResourceId::new();
    let first = book(&store, room, 10, 12);
    let second = book(&store, room, 14, 15);

    let mut moved = second.to_candidate();
    moved.window = TimeWindow::new(at(11), at(13)).unwrap();
    match store.commit(&moved, second.version).unwrap_err() {
        Error::Validation(v) => {
            assert_eq!(v.conflicting, first.id);
            assert_eq!(v.candidate, Some(second.id));
            assert_eq!(v.resource, room);
        }
        other => panic!("expected Validation, got {:?}", other),
    }
    assert_eq!(store.get(second.id).unwrap().version, 0);

    moved.window = TimeWindow::new(at(12), at(13)).unwrap();
    assert_eq!(store.commit(&moved, second.version).unwrap(), 1);
}

#[test]
fn test_other_resource_never_overlaps() {
    let store = InMemoryStore::new();
    book(&store, ResourceId::new(), 10, 12);
    book(&store, ResourceId::new(), 10, 12);
    assert!(find_overlapping_pairs(&store.all()).is_empty());
}

#[test]
fn test_delete_is_version_checked() {
    let (store, r) = seeded();
    let mut c = r.to_candidate();
    c.subject = "moved on".to_string();
    store.commit(&c, 0).unwrap();

    assert!(store.delete(r.id, 0).unwrap_err().is_conflict());
    store.delete(r.id, 1).unwrap();
    assert!(store.get(r.id).unwrap_err().is_not_found());
}
