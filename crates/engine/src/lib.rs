//! Conflict-handling engine for slotlock
//!
//! This crate reacts to the conflicts the store detects:
//! - [`RetryCoordinator`]: bounded automatic retries with exponential
//!   backoff and jitter
//! - [`ManualResolutionCoordinator`]: one-shot escalation to a
//!   [`ResolutionPolicy`]
//! - [`Simulation`]: barrier-synchronized actors for contention testing
//!
//! Coordinators are built from an explicit [`Context`] carrying the store
//! handle, retry configuration, and cancellation token.
//!
//! ## Mutation contract
//!
//! Mutations are `FnMut(&mut Candidate)`. A mutation may run once per
//! attempt, each time against a candidate built from a freshly fetched
//! booking, so it must describe a change relative to whatever state it is
//! given rather than capture a baseline.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod backoff;
pub mod context;
pub mod resolution;
pub mod retry;
pub mod simulation;

pub use backoff::{Backoff, CancelToken};
pub use context::Context;
pub use resolution::{
    ApplyMinePolicy, ConflictReport, KeepExistingPolicy, ManualResolutionCoordinator, Resolution,
    ResolutionPolicy, ResolveOutcome,
};
pub use retry::{RetryCoordinator, RetryOutcome};
pub use simulation::{
    ActorFailure, ActorOutcome, ActorReport, ActorSpec, Mutation, Simulation, SimulationReport,
    Strategy,
};
