//! Unified error types for Slotlock.
//!
//! Every layer reports failures through the same enum, so callers can
//! match on `NotFound`, `Conflict`, `Validation`, `MaxRetriesExceeded`
//! and `InterruptedDuringWait` without converting between crates.

pub use slotlock_core::{Error, OverlapViolation, Result, VersionConflict};
