//! Retry Policy Tests
//!
//! - Attempt bounds and the error returned when they run out
//! - Which errors are retried
//! - Backoff waits and cancellation

use crate::*;
use std::time::{Duration, Instant};

/// Commits a rival change on each of the first `times` calls
fn contended(store: Arc<InMemoryStore>, id: RecordId, times: u32) -> impl FnMut(&mut Candidate) {
    let mut calls = 0;
    move |c: &mut Candidate| {
        calls += 1;
        if calls <= times {
            let current = store.get(id).unwrap();
            store.commit(&current.to_candidate(), current.version).unwrap();
        }
        c.subject = "mine".to_string();
    }
}

#[test]
fn test_exhausted_attempts_wrap_last_conflict() {
    let (store, r) = seeded();
    let ctx = Context::new(Arc::clone(&store)).with_config(fast_retry(2));

    let err = ctx
        .retry()
        .execute_with_retry(r.id, contended(Arc::clone(&store), r.id, u32::MAX))
        .unwrap_err();

    assert_eq!(err.error_code(), "MaxRetriesExceeded");
    assert!(!err.is_retryable());
    let last = err.conflict().unwrap();
    assert_eq!((last.expected, last.actual), (1, 2));
}

#[test]
fn test_backoff_waits_between_attempts() {
    let (store, r) = seeded();
    let config = RetryConfig::default()
        .with_max_retries(3)
        .with_base_backoff_ms(20)
        .with_jitter_max_ms(1);
    let ctx = Context::new(Arc::clone(&store)).with_config(config);

    let started = Instant::now();
    let outcome = ctx
        .retry()
        .execute_with_retry(r.id, contended(Arc::clone(&store), r.id, 2))
        .unwrap();

    assert_eq!(outcome.attempts, 3);
    // 20ms after attempt 1, 40ms after attempt 2
    assert!(started.elapsed() >= Duration::from_millis(60));
}

#[test]
fn test_cancel_during_backoff_interrupts() {
    let (store, r) = seeded();
    let token = CancelToken::new();
    let config = RetryConfig::default()
        .with_base_backoff_ms(10_000)
        .with_jitter_max_ms(0);
    let ctx = Context::new(Arc::clone(&store))
        .with_config(config)
        .with_cancel_token(token.clone());

    let canceller = std::thread::spawn(move || {
        std::thread::sleep(Duration::from_millis(30));
        token.cancel();
    });

    let started = Instant::now();
    let err = ctx
        .retry()
        .execute_with_retry(r.id, contended(Arc::clone(&store), r.id, 1))
        .unwrap_err();
    canceller.join().unwrap();

    assert!(matches!(err, Error::InterruptedDuringWait { attempt: 1 }));
    assert!(started.elapsed() < Duration::from_secs(5));
    // rival commit landed, ours never did
    assert_eq!(store.get(r.id).unwrap().subject, "Team meeting");
}

/// Overlap violations end the retry loop on the first attempt, even when a
/// later refetch would have found the slot free.
#[test]
fn test_validation_is_fatal_even_if_blocker_would_move() {
    let store = Arc::new(InMemoryStore::new());
    let room = ResourceId::new();
    let mine = book(&store, room, 8, 9);
    let blocker = book(&store, room, 12, 13);
    let ctx = Context::new(Arc::clone(&store)).with_config(fast_retry(3));

    let mover = Arc::clone(&store);
    let mut calls = 0;
    let err = ctx
        .retry()
        .execute_with_retry(mine.id, |c| {
            calls += 1;
            c.window = window(12, 13);
        })
        .unwrap_err();
    assert!(err.is_validation());
    assert_eq!(calls, 1);

    // Once the blocker moves, the very same change goes through.
    let current = mover.get(blocker.id).unwrap();
    let mut moved = current.to_candidate();
    moved.window = window(15, 16);
    mover.commit(&moved, current.version).unwrap();

    let outcome = ctx
        .retry()
        .execute_with_retry(mine.id, |c| c.window = window(12, 13))
        .unwrap();
    assert_eq!(outcome, RetryOutcome { version: 1, attempts: 1 });
}

#[test]
fn test_not_found_is_fatal() {
    let (store, _) = seeded();
    let ctx = Context::new(store);
    let err = ctx
        .retry()
        .execute_with_retry(RecordId::new(777), |_| {})
        .unwrap_err();
    assert!(err.is_not_found());
}

#[test]
fn test_manual_second_commit_runs_once() {
    let (store, r) = seeded();
    let ctx = Context::new(Arc::clone(&store));

    let decisions = std::sync::atomic::AtomicU32::new(0);
    let policy = |_: &ConflictReport| {
        decisions.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        Resolution::ApplyMine(vec![Field::Subject])
    };

    let outcome = ctx
        .manual()
        .resolve(r.id, contended(Arc::clone(&store), r.id, 1), &policy)
        .unwrap();

    assert_eq!(decisions.into_inner(), 1);
    assert_eq!(
        outcome,
        ResolveOutcome::Committed {
            version: 2,
            escalated: true
        }
    );
    assert_eq!(store.get(r.id).unwrap().subject, "mine");
}

#[test]
fn test_config_file_drives_retry() {
    let config = SlotlockConfig::from_toml_str(
        r#"
        [retry]
        max_retries = 1
        base_backoff_ms = 1
        jitter_max_ms = 0
        "#,
    )
    .unwrap();
    assert_eq!(config.simulation, SimulationConfig::default());

    let (store, r) = seeded();
    let ctx = Context::new(Arc::clone(&store)).with_config(config.retry);
    let err = ctx
        .retry()
        .execute_with_retry(r.id, contended(Arc::clone(&store), r.id, 1))
        .unwrap_err();
    assert!(matches!(err, Error::MaxRetriesExceeded { attempts: 1, .. }));
}
