//! Error types for slotlock
//!
//! Every failure is an explicit variant so that callers must decide what
//! to do with each kind:
//!
//! | Variant | Meaning | Retried automatically |
//! |---------|---------|-----------------------|
//! | NotFound | Record id absent | No |
//! | Conflict | Expected version is stale | Yes |
//! | Validation | Candidate overlaps another booking | No |
//! | MaxRetriesExceeded | Conflicts persisted through every attempt | No |
//! | InterruptedDuringWait | Backoff wait was cancelled | No |
//! | InvalidWindow | `end <= start` | No |
//! | Retargeted | Mutation swapped in a candidate for another record | No |
//!
//! "Give up, conflict persisted" (`MaxRetriesExceeded`) and "the operation
//! was structurally invalid" (`Validation`, `InvalidWindow`) are distinct so
//! callers can retry later or fix their input respectively.

use crate::booking::TimeWindow;
use crate::types::{RecordId, ResourceId};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Version mismatch detected at commit time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Error)]
#[error("version conflict on {id}: expected {expected}, actual {actual}")]
pub struct VersionConflict {
    /// Record the commit targeted
    pub id: RecordId,
    /// Version the caller derived its candidate from
    pub expected: u64,
    /// Version currently stored
    pub actual: u64,
}

/// Overlap invariant violation detected at commit time
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[error("{window} on resource {resource} overlaps booking {conflicting}")]
pub struct OverlapViolation {
    /// Record being committed, `None` for inserts
    pub candidate: Option<RecordId>,
    /// Resource both bookings share
    pub resource: ResourceId,
    /// First committed booking found to intersect
    pub conflicting: RecordId,
    /// Window that was requested
    pub window: TimeWindow,
}

/// All slotlock errors
#[derive(Debug, Error)]
pub enum Error {
    /// Record id absent
    #[error("record {id} not found")]
    NotFound {
        /// Missing id
        id: RecordId,
    },

    /// Expected version did not match the stored version
    #[error("{0}")]
    Conflict(VersionConflict),

    /// Candidate window intersects another booking on the same resource
    #[error("overlap: {0}")]
    Validation(OverlapViolation),

    /// Every automatic attempt ended in a version conflict
    #[error("gave up after {attempts} attempts: {last_conflict}")]
    MaxRetriesExceeded {
        /// Attempts made
        attempts: u32,
        /// Conflict seen on the final attempt
        last_conflict: VersionConflict,
    },

    /// A backoff wait was cancelled before it elapsed
    #[error("interrupted while waiting to retry after attempt {attempt}")]
    InterruptedDuringWait {
        /// Attempt that had just failed when the wait began
        attempt: u32,
    },

    /// Window with `end <= start`
    #[error("invalid window: end {end} is not after start {start}")]
    InvalidWindow {
        /// Requested start
        start: NaiveDateTime,
        /// Requested end
        end: NaiveDateTime,
    },

    /// A mutation replaced its candidate with one for a different record
    #[error("mutation for {expected} produced a candidate for {actual}")]
    Retargeted {
        /// Record the operation was started on
        expected: RecordId,
        /// Record the candidate now names
        actual: RecordId,
    },

    /// Configuration values out of range
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Configuration file could not be parsed
    #[error("config parse error: {0}")]
    ConfigParse(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for slotlock operations
pub type Result<T> = std::result::Result<T, Error>;

impl From<VersionConflict> for Error {
    fn from(conflict: VersionConflict) -> Self {
        Error::Conflict(conflict)
    }
}

impl From<OverlapViolation> for Error {
    fn from(violation: OverlapViolation) -> Self {
        Error::Validation(violation)
    }
}

impl From<toml::de::Error> for Error {
    fn from(e: toml::de::Error) -> Self {
        Error::ConfigParse(e.to_string())
    }
}

impl Error {
    /// Check if this error is retryable.
    ///
    /// Only version conflicts may succeed on retry with fresh data.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Error::Conflict(_))
    }

    /// Check if this is a version conflict
    pub fn is_conflict(&self) -> bool {
        matches!(self, Error::Conflict(_))
    }

    /// Check if this is an overlap violation
    pub fn is_validation(&self) -> bool {
        matches!(self, Error::Validation(_))
    }

    /// Check if this is a not-found error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound { .. })
    }

    /// The version conflict carried by this error, if any
    pub fn conflict(&self) -> Option<&VersionConflict> {
        match self {
            Error::Conflict(c) => Some(c),
            Error::MaxRetriesExceeded { last_conflict, .. } => Some(last_conflict),
            _ => None,
        }
    }

    /// Stable error code
    pub fn error_code(&self) -> &'static str {
        match self {
            Error::NotFound { .. } => "NotFound",
            Error::Conflict(_) => "Conflict",
            Error::Validation(_) => "Validation",
            Error::MaxRetriesExceeded { .. } => "MaxRetriesExceeded",
            Error::InterruptedDuringWait { .. } => "InterruptedDuringWait",
            Error::InvalidWindow { .. } => "InvalidWindow",
            Error::Retargeted { .. } => "Retargeted",
            Error::InvalidConfig(_) => "InvalidConfig",
            Error::ConfigParse(_) => "ConfigParse",
            Error::Io(_) => "Io",
        }
    }
}
