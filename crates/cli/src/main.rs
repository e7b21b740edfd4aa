//! Slotlock CLI: watch two users race to edit the same booking.
//!
//! Modes:
//! - **retry**: the loser re-fetches and tries again with backoff
//! - **manual**: the loser is asked whether to keep the winner's booking
//!   or apply its own changes on top
//! - **plain**: no conflict handling, the loser just reports the conflict

mod commands;
mod console;
mod demo;
mod format;
mod parse;
mod seed;

use std::process;

use anyhow::{Context, Result};
use slotlock_core::SlotlockConfig;
use tracing_subscriber::EnvFilter;

use commands::build_cli;
use demo::run_demo;
use format::{format_run, OutputMode};
use parse::{matches_to_action, CliAction};

fn main() {
    let matches = build_cli().get_matches();

    init_tracing(matches.get_count("verbose"));

    let output_mode = if matches.get_flag("json") {
        OutputMode::Json
    } else {
        OutputMode::Human
    };

    let exit_code = match run(&matches, output_mode) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("(error) {:#}", e);
            1
        }
    };
    process::exit(exit_code);
}

fn init_tracing(verbosity: u8) {
    let default_level = match verbosity {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn load_config(matches: &clap::ArgMatches) -> Result<SlotlockConfig> {
    match matches.get_one::<String>("config") {
        Some(path) => SlotlockConfig::load(path)
            .with_context(|| format!("failed to load config from {}", path)),
        None => Ok(SlotlockConfig::default()),
    }
}

fn run(matches: &clap::ArgMatches, output_mode: OutputMode) -> Result<i32> {
    let config = load_config(matches)?;
    let action = matches_to_action(matches, config).map_err(anyhow::Error::msg)?;

    match action {
        CliAction::ShowConfig(config) => {
            let text = toml::to_string_pretty(&config).context("failed to render config")?;
            print!("{}", text);
            Ok(0)
        }
        CliAction::Run(plan) => {
            let run = run_demo(&plan)?;
            println!("{}", format_run(&run, plan.mode.label(), output_mode));
            if run.report.overlap_violations().is_empty() {
                Ok(0)
            } else {
                Ok(1)
            }
        }
    }
}
