//! Manual conflict resolution
//!
//! One commit attempt; on a version conflict the decision is handed to a
//! [`ResolutionPolicy`] exactly once:
//!
//! - `KeepExisting`: stop, nothing else is written
//! - `ApplyMine(fields)`: re-fetch, copy the chosen fields of the attempted
//!   candidate onto the fresh copy, and commit once more
//!
//! A conflict on that second commit is returned to the caller. This is a
//! bounded hand-off, not another retry loop.

use crate::context::Context;
use serde::Serialize;
use slotlock_core::{
    Booking, Candidate, Error, Field, RecordId, RecordStore, Result, VersionConflict,
};

/// Everything a policy needs to decide a conflict
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConflictReport {
    /// Candidate that failed to commit
    pub attempted: Candidate,
    /// Booking the candidate was derived from
    pub base: Booking,
    /// Booking as stored right after the conflict
    pub current: Booking,
    /// The rejected version check
    pub conflict: VersionConflict,
}

impl ConflictReport {
    /// Fields the caller's mutation changed relative to its base
    pub fn my_changes(&self) -> Vec<Field> {
        self.attempted.diff(&self.base.to_candidate())
    }

    /// Fields the competing writer(s) changed since the base
    pub fn their_changes(&self) -> Vec<Field> {
        self.current.to_candidate().diff(&self.base.to_candidate())
    }
}

/// A policy's decision
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// Abandon the attempted change
    KeepExisting,
    /// Apply the listed fields of the attempted candidate onto the latest version
    ApplyMine(Vec<Field>),
}

/// Decides what to do about a detected conflict
///
/// Invoked synchronously on the caller's thread. Implementations may block
/// (for example on console input).
pub trait ResolutionPolicy: Send + Sync {
    /// Choose a resolution for `report`
    fn decide(&self, report: &ConflictReport) -> Resolution;
}

impl<F> ResolutionPolicy for F
where
    F: Fn(&ConflictReport) -> Resolution + Send + Sync,
{
    fn decide(&self, report: &ConflictReport) -> Resolution {
        self(report)
    }
}

/// Always abandons
#[derive(Debug, Clone, Copy, Default)]
pub struct KeepExistingPolicy;

impl ResolutionPolicy for KeepExistingPolicy {
    fn decide(&self, _report: &ConflictReport) -> Resolution {
        Resolution::KeepExisting
    }
}

/// Always applies a fixed field set, or the caller's own changes
#[derive(Debug, Clone, Default)]
pub struct ApplyMinePolicy {
    fields: Option<Vec<Field>>,
}

impl ApplyMinePolicy {
    /// Apply exactly `fields`
    pub fn fields(fields: impl Into<Vec<Field>>) -> Self {
        Self {
            fields: Some(fields.into()),
        }
    }

    /// Apply whichever fields the caller's mutation changed
    pub fn my_changes() -> Self {
        Self { fields: None }
    }
}

impl ResolutionPolicy for ApplyMinePolicy {
    fn decide(&self, report: &ConflictReport) -> Resolution {
        match &self.fields {
            Some(fields) => Resolution::ApplyMine(fields.clone()),
            None => Resolution::ApplyMine(report.my_changes()),
        }
    }
}

/// Final state of a manual resolution
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolveOutcome {
    /// A commit landed
    Committed {
        /// Version written
        version: u64,
        /// Whether the policy was consulted
        escalated: bool,
    },
    /// The policy chose to keep the existing booking
    Abandoned {
        /// Booking as shown to the policy
        current: Booking,
    },
}

/// One-shot escalation to a [`ResolutionPolicy`]
pub struct ManualResolutionCoordinator<'a, S: RecordStore + ?Sized> {
    ctx: &'a Context<S>,
}

impl<'a, S: RecordStore + ?Sized> ManualResolutionCoordinator<'a, S> {
    /// Coordinator using `ctx`'s store
    pub fn new(ctx: &'a Context<S>) -> Self {
        Self { ctx }
    }

    /// Attempt `mutation`, escalating a conflict to `policy`
    ///
    /// # Errors
    ///
    /// - `NotFound` / `Validation` from either commit
    /// - `Retargeted` if the mutation swaps in another record's candidate
    /// - `Conflict` if the post-resolution commit also loses a race
    pub fn resolve<F, P>(&self, id: RecordId, mut mutation: F, policy: &P) -> Result<ResolveOutcome>
    where
        F: FnMut(&mut Candidate),
        P: ResolutionPolicy + ?Sized,
    {
        let store = self.ctx.store();

        let base = store.get(id)?;
        let mut attempted = base.to_candidate();
        mutation(&mut attempted);
        attempted.ensure_target(id)?;

        let conflict = match store.commit(&attempted, base.version) {
            Ok(version) => {
                tracing::info!(id = %id, version, "commit succeeded without conflict");
                return Ok(ResolveOutcome::Committed {
                    version,
                    escalated: false,
                });
            }
            Err(Error::Conflict(conflict)) => conflict,
            Err(e) => return Err(e),
        };

        tracing::warn!(
            id = %id,
            expected = conflict.expected,
            actual = conflict.actual,
            "conflict detected, escalating to resolution policy"
        );

        let current = store.get(id)?;
        let report = ConflictReport {
            attempted,
            base,
            current,
            conflict,
        };

        match policy.decide(&report) {
            Resolution::KeepExisting => {
                tracing::info!(id = %id, "resolution: keep existing");
                Ok(ResolveOutcome::Abandoned {
                    current: report.current,
                })
            }
            Resolution::ApplyMine(fields) => {
                let fresh = store.get(id)?;
                let mut merged = fresh.to_candidate();
                report.attempted.merge_fields(&mut merged, &fields);

                let version = store.commit(&merged, fresh.version).map_err(|e| {
                    tracing::warn!(id = %id, error = %e, "post-resolution commit failed");
                    e
                })?;
                tracing::info!(id = %id, version, ?fields, "resolution: applied mine");
                Ok(ResolveOutcome::Committed {
                    version,
                    escalated: true,
                })
            }
        }
    }
}
