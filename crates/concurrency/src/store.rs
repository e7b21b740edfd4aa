//! In-memory reference store
//!
//! Reads are served straight from a [`DashMap`] and never block writers.
//! Every write (commit, insert, delete) runs under a single commit lock that
//! also guards the per-resource index, so the version check, the overlap
//! check, and the apply step form one atomic section.
//!
//! ## Commit Sequence
//!
//! ```text
//! 1. Acquire commit lock
//! 2. Re-read the stored booking (NotFound if absent)
//! 3. IF stored.version != expected: return Conflict, nothing changed
//! 4. Collect every other booking on the candidate's resource
//! 5. IF any overlaps the candidate: return Validation, nothing changed
//! 6. Write candidate fields with version + 1, update resource index
//! 7. Append to commit log
//! 8. Release commit lock, return new version
//! ```

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use parking_lot::Mutex;
use rustc_hash::{FxHashMap, FxHashSet};
use serde::Serialize;
use slotlock_core::{
    Booking, Candidate, Error, NewBooking, Owner, OwnerId, RecordId, RecordStore, Resource,
    ResourceId, Result, VersionConflict,
};
use std::sync::atomic::{AtomicU64, Ordering};

use crate::validation::validate_window;

/// Kind of write recorded in the commit log
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CommitKind {
    /// Booking created at version 0
    Insert,
    /// Candidate applied through `commit`
    Update,
    /// Booking removed
    Delete,
}

/// One successful write
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommitEntry {
    /// Booking written
    pub id: RecordId,
    /// Version after the write (for deletes, the version removed)
    pub version: u64,
    /// What happened
    pub kind: CommitKind,
    /// Wall-clock time of the write
    pub at: DateTime<Utc>,
}

/// State guarded by the commit lock
#[derive(Default)]
struct CommitState {
    /// Bookings per resource, for overlap checks
    by_resource: FxHashMap<ResourceId, FxHashSet<RecordId>>,
    /// Every successful write in commit order
    log: Vec<CommitEntry>,
}

impl CommitState {
    fn index(&mut self, resource: ResourceId, id: RecordId) {
        self.by_resource.entry(resource).or_default().insert(id);
    }

    fn unindex(&mut self, resource: ResourceId, id: RecordId) {
        if let Some(ids) = self.by_resource.get_mut(&resource) {
            ids.remove(&id);
            if ids.is_empty() {
                self.by_resource.remove(&resource);
            }
        }
    }

    fn record(&mut self, id: RecordId, version: u64, kind: CommitKind) {
        self.log.push(CommitEntry {
            id,
            version,
            kind,
            at: Utc::now(),
        });
    }
}

/// Thread-safe in-memory [`RecordStore`]
///
/// # Thread Safety
///
/// - `get`, `list_by_resource`, `all`: lock-free reads via DashMap
/// - `commit`, `insert`, `delete`: serialized by the commit lock
///
/// The commit lock prevents the TOCTOU race between validation and apply.
/// Without it, the following can happen:
/// 1. A validates [11:00, 13:00) against the room (free)
/// 2. B validates [12:00, 14:00) against the room (still free)
/// 3. A applies
/// 4. B applies using its stale validation, and the room is double-booked
///
/// # Example
///
/// ```ignore
/// use slotlock_concurrency::InMemoryStore;
/// use std::sync::Arc;
///
/// let store = Arc::new(InMemoryStore::new());
/// let booking = store.insert(new_booking)?;
/// assert_eq!(booking.version, 0);
/// ```
pub struct InMemoryStore {
    /// Durable copies, one per booking
    records: DashMap<RecordId, Booking>,

    /// Commit serialization lock
    ///
    /// Held for the whole check-then-apply section of every write.
    commit_lock: Mutex<CommitState>,

    /// Next record id to allocate
    next_id: AtomicU64,

    /// Descriptive catalog, never consulted by the commit protocol
    resources: DashMap<ResourceId, Resource>,
    owners: DashMap<OwnerId, Owner>,
}

impl InMemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self {
            records: DashMap::new(),
            commit_lock: Mutex::new(CommitState::default()),
            next_id: AtomicU64::new(1),
            resources: DashMap::new(),
            owners: DashMap::new(),
        }
    }

    /// Number of bookings currently stored
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Check if the store holds no bookings
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Every successful write so far, in commit order
    pub fn commit_log(&self) -> Vec<CommitEntry> {
        self.commit_lock.lock().log.clone()
    }

    /// Add a resource to the catalog
    pub fn register_resource(&self, resource: Resource) -> ResourceId {
        let id = resource.id;
        self.resources.insert(id, resource);
        id
    }

    /// Add an owner to the catalog
    pub fn register_owner(&self, owner: Owner) -> OwnerId {
        let id = owner.id;
        self.owners.insert(id, owner);
        id
    }

    /// Look up a catalog resource
    pub fn resource(&self, id: ResourceId) -> Option<Resource> {
        self.resources.get(&id).map(|r| r.value().clone())
    }

    /// Look up a catalog owner
    pub fn owner(&self, id: OwnerId) -> Option<Owner> {
        self.owners.get(&id).map(|o| o.value().clone())
    }

    fn current(&self, id: RecordId) -> Result<Booking> {
        self.records
            .get(&id)
            .map(|r| r.value().clone())
            .ok_or(Error::NotFound { id })
    }

    /// Bookings on `resource`. Caller must hold the commit lock.
    fn on_resource(&self, state: &CommitState, resource: ResourceId) -> Vec<Booking> {
        state
            .by_resource
            .get(&resource)
            .map(|ids| {
                ids.iter()
                    .filter_map(|id| self.records.get(id).map(|r| r.value().clone()))
                    .collect()
            })
            .unwrap_or_default()
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordStore for InMemoryStore {
    fn get(&self, id: RecordId) -> Result<Booking> {
        self.current(id)
    }

    fn commit(&self, candidate: &Candidate, expected_version: u64) -> Result<u64> {
        let mut state = self.commit_lock.lock();

        let stored = self.current(candidate.id())?;
        if stored.version != expected_version {
            tracing::debug!(
                id = %candidate.id(),
                expected = expected_version,
                actual = stored.version,
                "commit rejected: stale version"
            );
            return Err(VersionConflict {
                id: candidate.id(),
                expected: expected_version,
                actual: stored.version,
            }
            .into());
        }

        let neighbours = self.on_resource(&state, candidate.resource);
        if let Err(violation) = validate_window(
            Some(candidate.id()),
            candidate.resource,
            &candidate.window,
            &neighbours,
        ) {
            tracing::debug!(
                id = %candidate.id(),
                conflicting = %violation.conflicting,
                "commit rejected: overlap"
            );
            return Err(violation.into());
        }

        let version = stored.version + 1;
        if stored.resource != candidate.resource {
            state.unindex(stored.resource, stored.id);
            state.index(candidate.resource, stored.id);
        }
        self.records.insert(
            candidate.id(),
            Booking {
                id: candidate.id(),
                version,
                resource: candidate.resource,
                owner: candidate.owner,
                window: candidate.window,
                subject: candidate.subject.clone(),
            },
        );
        state.record(candidate.id(), version, CommitKind::Update);

        tracing::debug!(id = %candidate.id(), version, "commit applied");
        Ok(version)
    }

    fn insert(&self, booking: NewBooking) -> Result<Booking> {
        let mut state = self.commit_lock.lock();

        let neighbours = self.on_resource(&state, booking.resource);
        validate_window(None, booking.resource, &booking.window, &neighbours)?;

        let id = RecordId::new(self.next_id.fetch_add(1, Ordering::SeqCst));
        let created = Booking {
            id,
            version: 0,
            resource: booking.resource,
            owner: booking.owner,
            window: booking.window,
            subject: booking.subject,
        };
        self.records.insert(id, created.clone());
        state.index(created.resource, id);
        state.record(id, 0, CommitKind::Insert);

        tracing::debug!(id = %id, resource = %created.resource, "booking inserted");
        Ok(created)
    }

    fn delete(&self, id: RecordId, expected_version: u64) -> Result<()> {
        let mut state = self.commit_lock.lock();

        let stored = self.current(id)?;
        if stored.version != expected_version {
            return Err(VersionConflict {
                id,
                expected: expected_version,
                actual: stored.version,
            }
            .into());
        }

        self.records.remove(&id);
        state.unindex(stored.resource, id);
        state.record(id, stored.version, CommitKind::Delete);

        tracing::debug!(id = %id, version = stored.version, "booking deleted");
        Ok(())
    }

    fn list_by_resource(&self, resource: ResourceId) -> Vec<Booking> {
        let mut bookings: Vec<Booking> = self
            .records
            .iter()
            .filter(|r| r.value().resource == resource)
            .map(|r| r.value().clone())
            .collect();
        bookings.sort_by_key(|b| b.id);
        bookings
    }

    fn all(&self) -> Vec<Booking> {
        let mut bookings: Vec<Booking> = self.records.iter().map(|r| r.value().clone()).collect();
        bookings.sort_by_key(|b| b.id);
        bookings
    }
}
