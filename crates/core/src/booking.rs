//! Versioned booking records
//!
//! A [`Booking`] is the durable, versioned record owned by the store.
//! Callers only ever hold transient copies of it. To change a booking,
//! a caller turns its copy into a [`Candidate`], mutates the candidate,
//! and hands it back to the store together with the version it was
//! derived from.
//!
//! ## Time windows
//!
//! Windows are half-open: `[start, end)`. Two windows that merely touch
//! (`a.end == b.start`) do not overlap.

use crate::error::{Error, Result};
use crate::types::{OwnerId, RecordId, ResourceId};
use chrono::{Duration, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Half-open time interval `[start, end)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "WindowRepr")]
pub struct TimeWindow {
    start: NaiveDateTime,
    end: NaiveDateTime,
}

#[derive(Deserialize)]
struct WindowRepr {
    start: NaiveDateTime,
    end: NaiveDateTime,
}

impl TryFrom<WindowRepr> for TimeWindow {
    type Error = Error;

    fn try_from(repr: WindowRepr) -> Result<Self> {
        TimeWindow::new(repr.start, repr.end)
    }
}

impl TimeWindow {
    /// Create a window, rejecting empty or inverted intervals
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidWindow`] if `end <= start`.
    pub fn new(start: NaiveDateTime, end: NaiveDateTime) -> Result<Self> {
        if end <= start {
            return Err(Error::InvalidWindow { start, end });
        }
        Ok(Self { start, end })
    }

    /// Inclusive lower bound
    pub fn start(&self) -> NaiveDateTime {
        self.start
    }

    /// Exclusive upper bound
    pub fn end(&self) -> NaiveDateTime {
        self.end
    }

    /// Length of the window
    pub fn duration(&self) -> Duration {
        self.end - self.start
    }

    /// Half-open intersection test
    pub fn overlaps(&self, other: &TimeWindow) -> bool {
        self.start < other.end && other.start < self.end
    }

    /// The same window moved by `delta` (negative moves it earlier)
    pub fn shifted(&self, delta: Duration) -> TimeWindow {
        TimeWindow {
            start: self.start + delta,
            end: self.end + delta,
        }
    }
}

impl std::fmt::Display for TimeWindow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}, {})", self.start, self.end)
    }
}

/// A committed, versioned booking
///
/// Instances handed out by the store are snapshots. They go stale as soon
/// as another commit lands and must be re-fetched rather than trusted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Booking {
    /// Stable identity
    pub id: RecordId,
    /// Commit counter: 0 on insert, +1 per successful commit
    pub version: u64,
    /// Resource this booking occupies
    pub resource: ResourceId,
    /// Party that made the booking
    pub owner: OwnerId,
    /// Occupied interval
    pub window: TimeWindow,
    /// Free-form description
    pub subject: String,
}

impl Booking {
    /// Unversioned copy of this booking's fields, ready to be mutated
    pub fn to_candidate(&self) -> Candidate {
        Candidate {
            id: self.id,
            resource: self.resource,
            owner: self.owner,
            window: self.window,
            subject: self.subject.clone(),
        }
    }
}

impl std::fmt::Display for Booking {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Booking {} v{} on {} {} \"{}\"",
            self.id, self.version, self.resource, self.window, self.subject
        )
    }
}

/// Mutable intent derived from a fetched [`Booking`]
///
/// Carries no version. The version it was derived from travels separately
/// as the `expected_version` of a commit. The id is fixed by
/// [`Booking::to_candidate`]; mutations can change every other field but
/// never retarget the commit at a different record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candidate {
    id: RecordId,
    /// Target resource
    pub resource: ResourceId,
    /// Owning party
    pub owner: OwnerId,
    /// Requested interval
    pub window: TimeWindow,
    /// Requested subject
    pub subject: String,
}

impl Candidate {
    /// Booking this candidate would replace
    pub fn id(&self) -> RecordId {
        self.id
    }

    /// Fail with [`Error::Retargeted`] unless this candidate still names `expected`
    pub fn ensure_target(&self, expected: RecordId) -> Result<()> {
        if self.id != expected {
            return Err(Error::Retargeted {
                expected,
                actual: self.id,
            });
        }
        Ok(())
    }

    /// Copy the selected fields of `self` onto `onto`
    ///
    /// Fields not listed keep the value already in `onto`.
    pub fn merge_fields(&self, onto: &mut Candidate, fields: &[Field]) {
        for field in fields {
            match field {
                Field::Resource => onto.resource = self.resource,
                Field::Owner => onto.owner = self.owner,
                Field::Window => onto.window = self.window,
                Field::Subject => onto.subject = self.subject.clone(),
            }
        }
    }

    /// Fields whose values differ between `self` and `other`
    pub fn diff(&self, other: &Candidate) -> Vec<Field> {
        Field::ALL
            .iter()
            .copied()
            .filter(|field| match field {
                Field::Resource => self.resource != other.resource,
                Field::Owner => self.owner != other.owner,
                Field::Window => self.window != other.window,
                Field::Subject => self.subject != other.subject,
            })
            .collect()
    }
}

/// A mutable field of a booking
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Field {
    /// `resource`
    Resource,
    /// `owner`
    Owner,
    /// `window`
    Window,
    /// `subject`
    Subject,
}

impl Field {
    /// Every mutable field
    pub const ALL: [Field; 4] = [Field::Resource, Field::Owner, Field::Window, Field::Subject];
}

/// Fields of a booking to be inserted
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewBooking {
    /// Target resource
    pub resource: ResourceId,
    /// Owning party
    pub owner: OwnerId,
    /// Requested interval
    pub window: TimeWindow,
    /// Free-form description
    pub subject: String,
}

/// Catalog entry for a bookable resource
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resource {
    /// Identity referenced by bookings
    pub id: ResourceId,
    /// Display name
    pub name: String,
    /// Seating capacity
    pub capacity: u32,
    /// Optional description
    pub description: Option<String>,
}

impl Resource {
    /// Create a resource with a fresh id
    pub fn new(name: impl Into<String>, capacity: u32) -> Self {
        Self {
            id: ResourceId::new(),
            name: name.into(),
            capacity,
            description: None,
        }
    }

    /// Attach a description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Catalog entry for a booking party
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Owner {
    /// Identity referenced by bookings
    pub id: OwnerId,
    /// Family name
    pub last_name: String,
    /// Given name
    pub first_name: String,
    /// Contact address
    pub email: String,
}

impl Owner {
    /// Create an owner with a fresh id
    pub fn new(
        last_name: impl Into<String>,
        first_name: impl Into<String>,
        email: impl Into<String>,
    ) -> Self {
        Self {
            id: OwnerId::new(),
            last_name: last_name.into(),
            first_name: first_name.into(),
            email: email.into(),
        }
    }
}
