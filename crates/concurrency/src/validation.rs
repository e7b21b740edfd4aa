//! Overlap validation
//!
//! Pure functions evaluating the business invariant: among committed
//! bookings sharing a resource, no two windows intersect. A booking is
//! never compared with itself.
//!
//! These functions hold no locks and read no shared state. The store is
//! responsible for calling them inside its commit section with the
//! *current* set of bookings.

use slotlock_core::{Booking, Candidate, OverlapViolation, RecordId, ResourceId, TimeWindow};

/// True iff any booking in `others` shares the candidate's resource and
/// intersects its window, ignoring the candidate's own id
pub fn overlaps<'a, I>(candidate: &Candidate, others: I) -> bool
where
    I: IntoIterator<Item = &'a Booking>,
{
    first_overlap(Some(candidate.id()), candidate.resource, &candidate.window, others).is_some()
}

/// The first booking in `others` that conflicts with `window` on `resource`
///
/// `exclude` names the booking being replaced, if any. Inserts pass `None`.
pub fn first_overlap<'a, I>(
    exclude: Option<RecordId>,
    resource: ResourceId,
    window: &TimeWindow,
    others: I,
) -> Option<&'a Booking>
where
    I: IntoIterator<Item = &'a Booking>,
{
    others.into_iter().find(|other| {
        Some(other.id) != exclude && other.resource == resource && other.window.overlaps(window)
    })
}

/// Like [`first_overlap`] but shaped as a commit-time check
pub fn validate_window<'a, I>(
    exclude: Option<RecordId>,
    resource: ResourceId,
    window: &TimeWindow,
    others: I,
) -> Result<(), OverlapViolation>
where
    I: IntoIterator<Item = &'a Booking>,
{
    match first_overlap(exclude, resource, window, others) {
        Some(other) => Err(OverlapViolation {
            candidate: exclude,
            resource,
            conflicting: other.id,
            window: *window,
        }),
        None => Ok(()),
    }
}

/// Every pair of distinct bookings that violate the invariant
///
/// Used after the fact to audit a store. Pairs are reported once, lower
/// id first.
pub fn find_overlapping_pairs(bookings: &[Booking]) -> Vec<(RecordId, RecordId)> {
    let mut pairs = Vec::new();
    for (i, a) in bookings.iter().enumerate() {
        for b in &bookings[i + 1..] {
            if a.id != b.id && a.resource == b.resource && a.window.overlaps(&b.window) {
                pairs.push((a.id.min(b.id), a.id.max(b.id)));
            }
        }
    }
    pairs.sort();
    pairs
}
