//! Concurrency layer for slotlock
//!
//! This crate implements the optimistic concurrency control (OCC) store:
//! - Overlap validation of candidate windows against committed bookings
//! - [`InMemoryStore`]: reference [`RecordStore`] with an atomic
//!   version-check + overlap-check + apply section
//! - A commit log recording every successful write in commit order
//!
//! [`RecordStore`]: slotlock_core::RecordStore

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod store;
pub mod validation;

pub use store::{CommitEntry, CommitKind, InMemoryStore};
pub use validation::{find_overlapping_pairs, first_overlap, overlaps, validate_window};
