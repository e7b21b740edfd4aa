//! The two-user booking race.
//!
//! Actor 1 renames the meeting and dawdles before committing; actor 2
//! pushes the meeting back an hour after a quarter of that pause, so both
//! have fetched the same version before either commits. Extra actors
//! alternate between the two roles.

use anyhow::Result;
use slotlock_concurrency::{CommitEntry, InMemoryStore};
use slotlock_core::{Candidate, RecordId};
use slotlock_engine::{
    ActorSpec, ApplyMinePolicy, KeepExistingPolicy, ResolutionPolicy, Simulation, SimulationReport,
};
use std::sync::Arc;

use crate::console::ConsolePolicy;
use crate::parse::{DemoMode, DemoPlan, PolicyChoice};
use crate::seed::{seed_for_tomorrow, Seeded};

pub struct DemoRun {
    pub seeded: Seeded,
    pub report: SimulationReport,
    pub commit_log: Vec<CommitEntry>,
}

pub fn run_demo(plan: &DemoPlan) -> Result<DemoRun> {
    let store = Arc::new(InMemoryStore::new());
    let seeded = seed_for_tomorrow(&store)?;
    tracing::info!(mode = plan.mode.label(), actors = plan.actors, "starting demo");

    let policy = policy_for(plan.mode);
    let mut sim = Simulation::new(Arc::clone(&store));
    for i in 0..plan.actors {
        sim = sim.actor(actor(plan, i, seeded.booking.id, policy.clone()));
    }
    let report = sim.run();

    Ok(DemoRun {
        seeded,
        report,
        commit_log: store.commit_log(),
    })
}

fn policy_for(mode: DemoMode) -> Option<Arc<dyn ResolutionPolicy>> {
    match mode {
        DemoMode::Manual(PolicyChoice::Console) => Some(Arc::new(ConsolePolicy::stdio())),
        DemoMode::Manual(PolicyChoice::AutoApply) => Some(Arc::new(ApplyMinePolicy::my_changes())),
        DemoMode::Manual(PolicyChoice::AutoKeep) => Some(Arc::new(KeepExistingPolicy)),
        DemoMode::Retry | DemoMode::Plain => None,
    }
}

fn actor(
    plan: &DemoPlan,
    index: usize,
    target: RecordId,
    policy: Option<Arc<dyn ResolutionPolicy>>,
) -> ActorSpec {
    let n = index + 1;
    let spec = if index % 2 == 0 {
        ActorSpec::new(format!("editor-{}", n), target, move |c: &mut Candidate| {
            c.subject = format!("Subject updated by actor {}", n);
        })
        .think_time(plan.think_time)
    } else {
        ActorSpec::new(format!("mover-{}", n), target, |c: &mut Candidate| {
            c.window = c.window.shifted(chrono::Duration::hours(1));
        })
        .think_time(plan.think_time / 4)
    };

    match (plan.mode, policy) {
        (DemoMode::Retry, _) => spec.retry(plan.retry),
        (DemoMode::Manual(_), Some(policy)) => spec.manual(policy),
        _ => spec.once(),
    }
}
