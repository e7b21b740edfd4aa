//! Concurrency simulation harness
//!
//! Runs several actors against one store at the same instant and reports
//! what each one observed. Every actor gets its own thread; a [`Barrier`]
//! releases them together so their fetches land before anyone commits
//! (subject to think time).
//!
//! ```text
//! spawn N threads ── barrier.wait() ──┬─ actor 1: strategy(get, mutate, think, commit)
//!                                     ├─ actor 2: ...
//!                                     └─ actor N: ...
//! join all ── collect ActorReport ── snapshot store ── SimulationReport
//! ```
//!
//! A panicking actor becomes a failed report instead of tearing down the run.

use crate::backoff::CancelToken;
use crate::context::Context;
use crate::resolution::{ResolutionPolicy, ResolveOutcome};
use serde::Serialize;
use slotlock_concurrency::find_overlapping_pairs;
use slotlock_core::{Booking, Candidate, Error, RecordId, RecordStore, RetryConfig};
use std::any::Any;
use std::fmt;
use std::sync::{Arc, Barrier};
use std::thread;
use std::time::{Duration, Instant};

/// Shared, re-runnable change applied to a fetched candidate
pub type Mutation = Arc<dyn Fn(&mut Candidate) + Send + Sync>;

/// How an actor reacts to a version conflict
#[derive(Clone)]
pub enum Strategy {
    /// Single fetch and commit; a conflict is a failure
    Once,
    /// Automatic retries with backoff
    Retry(RetryConfig),
    /// One-shot escalation to a policy
    Manual(Arc<dyn ResolutionPolicy>),
}

impl fmt::Debug for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Strategy::Once => write!(f, "Once"),
            Strategy::Retry(config) => f.debug_tuple("Retry").field(config).finish(),
            Strategy::Manual(_) => write!(f, "Manual(..)"),
        }
    }
}

/// One simulated concurrent user
#[derive(Clone)]
pub struct ActorSpec {
    /// Label used in logs and reports
    pub name: String,
    /// Record the actor edits
    pub target: RecordId,
    /// Change to apply
    pub mutation: Mutation,
    /// Conflict handling
    pub strategy: Strategy,
    /// Pause between mutating and committing
    pub think_time: Duration,
}

impl ActorSpec {
    /// Actor with [`Strategy::Once`] and no think time
    pub fn new<F>(name: impl Into<String>, target: RecordId, mutation: F) -> Self
    where
        F: Fn(&mut Candidate) + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            target,
            mutation: Arc::new(mutation),
            strategy: Strategy::Once,
            think_time: Duration::ZERO,
        }
    }

    /// Single attempt, no conflict handling
    pub fn once(mut self) -> Self {
        self.strategy = Strategy::Once;
        self
    }

    /// Retry with `config`
    pub fn retry(mut self, config: RetryConfig) -> Self {
        self.strategy = Strategy::Retry(config);
        self
    }

    /// Escalate conflicts to `policy`
    pub fn manual(mut self, policy: Arc<dyn ResolutionPolicy>) -> Self {
        self.strategy = Strategy::Manual(policy);
        self
    }

    /// Pause for `think_time` after every mutation
    pub fn think_time(mut self, think_time: Duration) -> Self {
        self.think_time = think_time;
        self
    }
}

impl fmt::Debug for ActorSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActorSpec")
            .field("name", &self.name)
            .field("target", &self.target)
            .field("strategy", &self.strategy)
            .field("think_time", &self.think_time)
            .finish_non_exhaustive()
    }
}

/// What a successful actor achieved
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ActorOutcome {
    /// The actor's change was committed
    Committed {
        /// Version written
        version: u64,
        /// Commit attempts used
        attempts: u32,
    },
    /// A resolution policy kept the competing change
    Abandoned {
        /// Booking the actor gave way to
        current: Booking,
    },
}

/// Why an actor failed
#[derive(Debug)]
pub enum ActorFailure {
    /// The strategy returned an error
    Error(Error),
    /// The actor's thread panicked
    Panicked(String),
}

impl ActorFailure {
    /// The underlying store or coordinator error, if any
    pub fn error(&self) -> Option<&Error> {
        match self {
            ActorFailure::Error(e) => Some(e),
            ActorFailure::Panicked(_) => None,
        }
    }
}

impl fmt::Display for ActorFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActorFailure::Error(e) => write!(f, "{}", e),
            ActorFailure::Panicked(msg) => write!(f, "panicked: {}", msg),
        }
    }
}

/// Per-actor result
#[derive(Debug)]
pub struct ActorReport {
    /// Actor label
    pub name: String,
    /// Record it edited
    pub target: RecordId,
    /// Outcome or failure
    pub result: Result<ActorOutcome, ActorFailure>,
    /// Wall time from release to completion
    pub elapsed: Duration,
}

impl ActorReport {
    /// Check if the actor ended without error
    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }
}

/// Everything observed during one run
#[derive(Debug)]
pub struct SimulationReport {
    /// Reports in actor registration order
    pub actors: Vec<ActorReport>,
    /// Store contents after every actor finished
    pub final_records: Vec<Booking>,
}

impl SimulationReport {
    /// Actors that ended without error
    pub fn successes(&self) -> impl Iterator<Item = &ActorReport> {
        self.actors.iter().filter(|a| a.is_success())
    }

    /// Actors that returned an error or panicked
    pub fn failures(&self) -> impl Iterator<Item = &ActorReport> {
        self.actors.iter().filter(|a| !a.is_success())
    }

    /// Report for the actor called `name`
    pub fn actor(&self, name: &str) -> Option<&ActorReport> {
        self.actors.iter().find(|a| a.name == name)
    }

    /// Pairs of final bookings on the same resource with intersecting windows
    ///
    /// Empty for any correct store.
    pub fn overlap_violations(&self) -> Vec<(RecordId, RecordId)> {
        find_overlapping_pairs(&self.final_records)
    }

    /// Final state of record `id`, if it still exists
    pub fn record(&self, id: RecordId) -> Option<&Booking> {
        self.final_records.iter().find(|b| b.id == id)
    }
}

/// Barrier-synchronized multi-actor run
pub struct Simulation<S: RecordStore + ?Sized + 'static> {
    store: Arc<S>,
    actors: Vec<ActorSpec>,
    cancel: CancelToken,
}

impl<S: RecordStore + ?Sized + 'static> Simulation<S> {
    /// Empty simulation over `store`
    pub fn new(store: Arc<S>) -> Self {
        Self {
            store,
            actors: Vec::new(),
            cancel: CancelToken::new(),
        }
    }

    /// Add an actor
    pub fn actor(mut self, spec: ActorSpec) -> Self {
        self.actors.push(spec);
        self
    }

    /// Share a token that interrupts retry backoffs
    pub fn with_cancel_token(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Run every actor to completion
    pub fn run(self) -> SimulationReport {
        let barrier = Arc::new(Barrier::new(self.actors.len().max(1)));
        tracing::info!(actors = self.actors.len(), "simulation starting");

        let handles: Vec<_> = self
            .actors
            .into_iter()
            .map(|spec| {
                let name = spec.name.clone();
                let target = spec.target;
                let store = Arc::clone(&self.store);
                let barrier = Arc::clone(&barrier);
                let cancel = self.cancel.clone();
                let handle = thread::spawn(move || {
                    barrier.wait();
                    let started = Instant::now();
                    let result = run_actor(store, &spec, cancel);
                    (result, started.elapsed())
                });
                (name, target, handle)
            })
            .collect();

        let actors = handles
            .into_iter()
            .map(|(name, target, handle)| {
                let (result, elapsed) = match handle.join() {
                    Ok((result, elapsed)) => (result.map_err(ActorFailure::Error), elapsed),
                    Err(payload) => (
                        Err(ActorFailure::Panicked(panic_message(payload))),
                        Duration::ZERO,
                    ),
                };
                match &result {
                    Ok(outcome) => tracing::info!(actor = %name, ?outcome, "actor finished"),
                    Err(failure) => tracing::warn!(actor = %name, %failure, "actor failed"),
                }
                ActorReport {
                    name,
                    target,
                    result,
                    elapsed,
                }
            })
            .collect();

        let final_records = self.store.all();
        SimulationReport {
            actors,
            final_records,
        }
    }
}

fn run_actor<S: RecordStore + ?Sized>(
    store: Arc<S>,
    spec: &ActorSpec,
    cancel: CancelToken,
) -> Result<ActorOutcome, Error> {
    let think_time = spec.think_time;
    let mutation = |candidate: &mut Candidate| {
        (spec.mutation)(candidate);
        if !think_time.is_zero() {
            thread::sleep(think_time);
        }
    };

    tracing::debug!(
        actor = %spec.name,
        target = %spec.target,
        strategy = ?spec.strategy,
        "actor released"
    );

    match &spec.strategy {
        Strategy::Once => {
            let current = store.get(spec.target)?;
            let mut candidate = current.to_candidate();
            mutation(&mut candidate);
            candidate.ensure_target(spec.target)?;
            let version = store.commit(&candidate, current.version)?;
            Ok(ActorOutcome::Committed {
                version,
                attempts: 1,
            })
        }
        Strategy::Retry(config) => {
            let ctx = Context::new(store)
                .with_config(*config)
                .with_cancel_token(cancel);
            let outcome = ctx.retry().execute_with_retry(spec.target, mutation)?;
            Ok(ActorOutcome::Committed {
                version: outcome.version,
                attempts: outcome.attempts,
            })
        }
        Strategy::Manual(policy) => {
            let ctx = Context::new(store).with_cancel_token(cancel);
            match ctx.manual().resolve(spec.target, mutation, policy.as_ref())? {
                ResolveOutcome::Committed { version, escalated } => Ok(ActorOutcome::Committed {
                    version,
                    attempts: if escalated { 2 } else { 1 },
                }),
                ResolveOutcome::Abandoned { current } => Ok(ActorOutcome::Abandoned { current }),
            }
        }
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
