//! # Slotlock
//!
//! Optimistic concurrency control for time-window bookings.
//!
//! Every booking carries a version. A writer fetches a booking, changes a
//! copy, and commits the copy together with the version it started from.
//! The store accepts the commit only if that version is still current and
//! the new window does not overlap another booking on the same resource;
//! both checks and the write happen as one atomic step.
//!
//! ## Quick Start
//!
//! ```ignore
//! use slotlock::prelude::*;
//!
//! let store = Arc::new(InMemoryStore::new());
//! let booking = store.insert(NewBooking { /* ... */ })?;
//!
//! let ctx = Context::new(store);
//! ctx.retry().execute_with_retry(booking.id, |c| {
//!     c.subject = "Quarterly review".to_string();
//! })?;
//! ```
//!
//! ## Reacting to conflicts
//!
//! - [`RetryCoordinator`] - re-fetch and re-apply with exponential backoff
//! - [`ManualResolutionCoordinator`] - ask a [`ResolutionPolicy`] once
//! - [`Simulation`] - run several actors at the same instant and inspect
//!   what each one saw

#![warn(missing_docs)]

mod error;

pub mod prelude;

pub use error::{Error, OverlapViolation, Result, VersionConflict};

pub use slotlock_core::{
    Booking, Candidate, Field, NewBooking, Owner, OwnerId, RecordId, RecordStore, Resource,
    ResourceId, RetryConfig, SimulationConfig, SlotlockConfig, TimeWindow,
};

pub use slotlock_concurrency::{
    find_overlapping_pairs, validate_window, CommitEntry, CommitKind, InMemoryStore,
};

pub use slotlock_engine::{
    ActorFailure, ActorOutcome, ActorReport, ActorSpec, ApplyMinePolicy, Backoff, CancelToken,
    ConflictReport, Context, KeepExistingPolicy, ManualResolutionCoordinator, Mutation,
    Resolution, ResolutionPolicy, ResolveOutcome, RetryCoordinator, RetryOutcome, Simulation,
    SimulationReport, Strategy,
};
