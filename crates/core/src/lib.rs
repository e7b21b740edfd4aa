//! Core types for slotlock
//!
//! This crate defines the foundational types shared by every layer:
//! - Identifiers: [`RecordId`], [`ResourceId`], [`OwnerId`]
//! - The versioned record model: [`Booking`], [`Candidate`], [`TimeWindow`]
//! - The storage contract: [`RecordStore`]
//! - Errors: [`Error`] and [`Result`]
//! - Configuration: [`RetryConfig`], [`SlotlockConfig`]

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod booking;
pub mod config;
pub mod error;
pub mod traits;
pub mod types;

pub use booking::{Booking, Candidate, Field, NewBooking, Owner, Resource, TimeWindow};
pub use config::{RetryConfig, SimulationConfig, SlotlockConfig};
pub use error::{Error, OverlapViolation, Result, VersionConflict};
pub use traits::RecordStore;
pub use types::{OwnerId, RecordId, ResourceId};
