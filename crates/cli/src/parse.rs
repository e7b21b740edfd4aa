//! ArgMatches → CliAction conversion.
//!
//! Command-line values override the loaded configuration; anything not
//! given on the command line keeps its configured value.

use clap::ArgMatches;
use slotlock_core::{RetryConfig, SlotlockConfig};
use std::time::Duration;

/// How the demo actors handle a conflict.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DemoMode {
    /// Automatic retries
    Retry,
    /// Escalate to a resolution policy
    Manual(PolicyChoice),
    /// Single attempt, conflict reported as-is
    Plain,
}

impl DemoMode {
    pub fn label(&self) -> &'static str {
        match self {
            DemoMode::Retry => "retry",
            DemoMode::Manual(_) => "manual",
            DemoMode::Plain => "plain",
        }
    }
}

/// Source of manual resolution decisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PolicyChoice {
    /// Prompt on the console
    Console,
    /// Always apply the loser's changes
    AutoApply,
    /// Always keep the existing booking
    AutoKeep,
}

/// Everything needed to run one demonstration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DemoPlan {
    pub mode: DemoMode,
    pub retry: RetryConfig,
    pub think_time: Duration,
    pub actors: usize,
}

/// The result of parsing the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CliAction {
    /// Seed a store and run the actors
    Run(DemoPlan),
    /// Print the effective configuration
    ShowConfig(SlotlockConfig),
}

/// Convert clap ArgMatches into a CliAction.
pub fn matches_to_action(
    matches: &ArgMatches,
    config: SlotlockConfig,
) -> Result<CliAction, String> {
    let (sub_name, sub_matches) = matches
        .subcommand()
        .ok_or_else(|| "No command provided".to_string())?;

    let mode = match sub_name {
        "retry" => DemoMode::Retry,
        "manual" => DemoMode::Manual(parse_policy(sub_matches)),
        "plain" => DemoMode::Plain,
        "config" => return Ok(CliAction::ShowConfig(config)),
        other => return Err(format!("Unknown command: {}", other)),
    };

    let mut retry = config.retry;
    if let Some(n) = sub_matches.try_get_one::<u32>("max-retries").ok().flatten() {
        retry = retry.with_max_retries(*n);
    }
    retry.validate().map_err(|e| e.to_string())?;

    let think_ms = sub_matches
        .get_one::<u64>("think-ms")
        .copied()
        .unwrap_or(config.simulation.think_time_ms);

    let actors = match sub_matches.get_one::<u64>("actors") {
        Some(n) => usize::try_from(*n).map_err(|_| format!("Too many actors: {}", n))?,
        None => config.simulation.actors,
    };

    Ok(CliAction::Run(DemoPlan {
        mode,
        retry,
        think_time: Duration::from_millis(think_ms),
        actors,
    }))
}

fn parse_policy(matches: &ArgMatches) -> PolicyChoice {
    if matches.get_flag("auto-apply") {
        PolicyChoice::AutoApply
    } else if matches.get_flag("auto-keep") {
        PolicyChoice::AutoKeep
    } else {
        PolicyChoice::Console
    }
}
