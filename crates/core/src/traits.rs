//! Storage contract
//!
//! The store is the only durability boundary and the only shared mutable
//! state. Any engine can implement [`RecordStore`] as long as `commit`,
//! `insert` and `delete` keep their check-then-apply steps atomic.

use crate::booking::{Booking, Candidate, NewBooking};
use crate::error::Result;
use crate::types::{RecordId, ResourceId};

/// Versioned record storage with an atomic compare-and-commit
///
/// # Atomicity
///
/// `commit` must, as one indivisible section:
/// 1. Re-read the stored version
/// 2. Return `Error::Conflict` if it differs from `expected_version`
/// 3. Check the candidate against every *other* booking currently stored on
///    the candidate's resource and return `Error::Validation` on overlap
/// 4. Apply the candidate, increment the version, and return it
///
/// Running steps 2 and 3 as separate round trips lets two candidates that
/// each look free be approved before either lands, after which both land
/// and overlap.
pub trait RecordStore: Send + Sync {
    /// Fetch a fresh copy of a booking
    fn get(&self, id: RecordId) -> Result<Booking>;

    /// Atomically version-check, overlap-check, and apply `candidate`
    ///
    /// Returns the new version on success. Neither error path mutates state.
    fn commit(&self, candidate: &Candidate, expected_version: u64) -> Result<u64>;

    /// Create a booking at version 0, overlap-checked atomically
    fn insert(&self, booking: NewBooking) -> Result<Booking>;

    /// Remove a booking if it is still at `expected_version`
    fn delete(&self, id: RecordId, expected_version: u64) -> Result<()>;

    /// Every booking on `resource`, ordered by id
    fn list_by_resource(&self, resource: ResourceId) -> Vec<Booking>;

    /// Every booking, ordered by id
    fn all(&self) -> Vec<Booking>;
}
