//! Identifier types
//!
//! This module defines the identities used throughout the system:
//! - [`RecordId`]: Stable identity of a booking, allocated by the store
//! - [`ResourceId`]: Weak reference to the resource a booking occupies
//! - [`OwnerId`]: Weak reference to the acting party

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identity of a versioned record
///
/// Allocated sequentially by the store on insert, starting at 1.
/// Never reused, even after the record is deleted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RecordId(u64);

impl RecordId {
    /// Wrap a raw identifier
    pub const fn new(raw: u64) -> Self {
        RecordId(raw)
    }

    /// Raw numeric value
    pub const fn get(&self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for RecordId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Weak reference to a bookable resource
///
/// A booking only records the relation. The resource itself is owned
/// elsewhere and may not even be known to the store.
///
/// # Examples
///
/// ```
/// use slotlock_core::ResourceId;
///
/// let a = ResourceId::new();
/// let b = ResourceId::new();
/// assert_ne!(a, b);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ResourceId(Uuid);

impl ResourceId {
    /// Create a new random ResourceId using UUID v4
    pub fn new() -> Self {
        ResourceId(Uuid::new_v4())
    }

    /// Create ResourceId from raw bytes
    pub fn from_bytes(bytes: [u8; 16]) -> Self {
        ResourceId(Uuid::from_bytes(bytes))
    }
}

impl Default for ResourceId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ResourceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Weak reference to the party that owns a booking
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OwnerId(Uuid);

impl OwnerId {
    /// Create a new random OwnerId using UUID v4
    pub fn new() -> Self {
        OwnerId(Uuid::new_v4())
    }
}

impl Default for OwnerId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for OwnerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
