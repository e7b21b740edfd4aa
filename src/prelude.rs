//! Convenient imports for Slotlock.
//!
//! ```ignore
//! use slotlock::prelude::*;
//!
//! let ctx = Context::new(Arc::new(InMemoryStore::new()));
//! ```

// Store
pub use crate::{InMemoryStore, RecordStore};

// Error handling
pub use crate::error::{Error, Result};

// Data model
pub use crate::{Booking, Candidate, Field, NewBooking, RecordId, ResourceId, OwnerId, TimeWindow};

// Coordinators
pub use crate::{
    ApplyMinePolicy, Context, KeepExistingPolicy, Resolution, ResolutionPolicy, ResolveOutcome,
    RetryConfig,
};

pub use std::sync::Arc;
