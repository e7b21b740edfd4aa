//! Automatic retry coordinator
//!
//! Drives a mutation against the store until it commits, a non-retryable
//! error occurs, or the attempt bound is reached.
//!
//! ## Attempt Sequence
//!
//! ```text
//! for attempt in 1..=max_attempts:
//!   1. get(id)                      fresh copy, never reused across attempts
//!   2. mutation(&mut candidate)     applied to the fresh copy
//!   3. commit(candidate, version)   version from step 1
//!      Ok          -> done
//!      Conflict    -> last attempt? MaxRetriesExceeded : back off, loop
//!      anything else -> return it unchanged
//! ```
//!
//! Overlap violations are not retried: reapplying the same window against
//! the same bookings would fail the same way. A refetch could in principle
//! change the outcome if the competing booking moves away meanwhile; that
//! case is still treated as fatal.

use crate::backoff::Backoff;
use crate::context::Context;
use slotlock_core::{Candidate, Error, RecordId, RecordStore, Result};

/// Result of a successful retried commit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryOutcome {
    /// Version written by the winning attempt
    pub version: u64,
    /// Attempts used, including the winning one
    pub attempts: u32,
}

/// Bounded retry with exponential backoff and jitter
pub struct RetryCoordinator<'a, S: RecordStore + ?Sized> {
    ctx: &'a Context<S>,
    backoff: Backoff,
}

impl<'a, S: RecordStore + ?Sized> RetryCoordinator<'a, S> {
    /// Coordinator using `ctx`'s store, configuration and token
    pub fn new(ctx: &'a Context<S>) -> Self {
        Self {
            ctx,
            backoff: Backoff::new(ctx.config()),
        }
    }

    /// Retry up to the configured `max_retries` attempts
    pub fn execute_with_retry<F>(&self, id: RecordId, mutation: F) -> Result<RetryOutcome>
    where
        F: FnMut(&mut Candidate),
    {
        self.execute_with_attempts(id, mutation, self.ctx.config().max_retries)
    }

    /// Retry up to `max_attempts` attempts
    ///
    /// # Errors
    ///
    /// - `InvalidConfig` if `max_attempts` is 0
    /// - `NotFound` / `Validation` from the store, immediately
    /// - `Retargeted` if the mutation swaps in another record's candidate
    /// - `MaxRetriesExceeded` wrapping the final conflict
    /// - `InterruptedDuringWait` if the context's token fires during a backoff
    pub fn execute_with_attempts<F>(
        &self,
        id: RecordId,
        mut mutation: F,
        max_attempts: u32,
    ) -> Result<RetryOutcome>
    where
        F: FnMut(&mut Candidate),
    {
        if max_attempts == 0 {
            return Err(Error::InvalidConfig(
                "max_attempts must be at least 1".to_string(),
            ));
        }

        let store = self.ctx.store();
        let mut rng = rand::thread_rng();
        let mut attempt = 0;

        loop {
            attempt += 1;

            let current = store.get(id)?;
            tracing::debug!(id = %id, attempt, version = current.version, "attempt fetched record");

            let mut candidate = current.to_candidate();
            mutation(&mut candidate);
            candidate.ensure_target(id)?;

            let conflict = match store.commit(&candidate, current.version) {
                Ok(version) => {
                    tracing::info!(id = %id, attempt, version, "commit succeeded");
                    return Ok(RetryOutcome {
                        version,
                        attempts: attempt,
                    });
                }
                Err(Error::Conflict(conflict)) => conflict,
                Err(e) => {
                    tracing::warn!(id = %id, attempt, error = %e, "commit failed, not retrying");
                    return Err(e);
                }
            };

            tracing::warn!(
                id = %id,
                attempt,
                expected = conflict.expected,
                actual = conflict.actual,
                "optimistic lock conflict"
            );

            if attempt >= max_attempts {
                tracing::error!(id = %id, attempts = attempt, "retries exhausted");
                return Err(Error::MaxRetriesExceeded {
                    attempts: attempt,
                    last_conflict: conflict,
                });
            }

            let delay = self.backoff.delay_for(attempt, &mut rng);
            tracing::debug!(id = %id, attempt, delay_ms = delay.as_millis() as u64, "backing off");
            self.backoff.wait(delay, attempt, self.ctx.cancel_token())?;
        }
    }
}
