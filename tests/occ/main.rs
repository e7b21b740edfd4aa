//! Optimistic Concurrency Test Suite
//!
//! End-to-end tests through the `slotlock` facade.
//!
//! ## Modules
//!
//! - `scenarios`: the conflict, manual resolution and overlap walkthroughs
//! - `contention`: many writers hammering one record or one resource
//! - `retry_policy`: retry bounds, backoff timing and cancellation
//! - `invariants`: property tests over randomized bookings

pub mod invariants;
pub mod retry_policy;
pub mod scenarios;

pub use chrono::{Duration as ChronoDuration, NaiveDate, NaiveDateTime};
pub use slotlock::*;
pub use std::sync::Arc;

/// 2024-03-01 at `hour:00`
pub fn at(hour: u32) -> NaiveDateTime {
    at_min(hour, 0)
}

/// 2024-03-01 at `hour:minute`
pub fn at_min(hour: u32, minute: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 3, 1)
        .unwrap()
        .and_hms_opt(hour, minute, 0)
        .unwrap()
}

pub fn window(start: u32, end: u32) -> TimeWindow {
    TimeWindow::new(at(start), at(end)).unwrap()
}

/// Insert a booking on `room` and return it at version 0
pub fn book(store: &InMemoryStore, room: ResourceId, start: u32, end: u32) -> Booking {
    store
        .insert(NewBooking {
            resource: room,
            owner: OwnerId::new(),
            window: window(start, end),
            subject: "Team meeting".to_string(),
        })
        .unwrap()
}

/// Store seeded with one 10:00-12:00 booking
pub fn seeded() -> (Arc<InMemoryStore>, Booking) {
    let store = Arc::new(InMemoryStore::new());
    let booking = book(&store, ResourceId::new(), 10, 12);
    (store, booking)
}

/// Retry settings fast enough for tests
pub fn fast_retry(max_retries: u32) -> RetryConfig {
    RetryConfig::default()
        .with_max_retries(max_retries)
        .with_base_backoff_ms(1)
        .with_jitter_max_ms(2)
}
