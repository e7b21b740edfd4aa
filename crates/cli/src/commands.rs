//! Clap command tree.

use clap::{value_parser, Arg, ArgAction, Command};

/// Build the top-level `slotlock` command.
pub fn build_cli() -> Command {
    Command::new("slotlock")
        .about("Demonstrates optimistic locking on a shared booking")
        .version(env!("CARGO_PKG_VERSION"))
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("config")
                .long("config")
                .short('c')
                .global(true)
                .value_name("FILE")
                .help("TOML file with [retry] and [simulation] tables"),
        )
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .short('v')
                .global(true)
                .action(ArgAction::Count)
                .help("Raise log level (-v debug, -vv trace)"),
        )
        .arg(
            Arg::new("json")
                .long("json")
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Print the report as JSON"),
        )
        .subcommand(with_run_args(
            Command::new("retry")
                .about("Both actors retry automatically with backoff")
                .arg(
                    Arg::new("max-retries")
                        .long("max-retries")
                        .value_name("N")
                        .value_parser(value_parser!(u32).range(1..))
                        .help("Attempts per actor, including the first"),
                ),
        ))
        .subcommand(with_run_args(
            Command::new("manual")
                .about("The losing actor is asked how to resolve the conflict")
                .arg(
                    Arg::new("auto-apply")
                        .long("auto-apply")
                        .action(ArgAction::SetTrue)
                        .conflicts_with("auto-keep")
                        .help("Always apply the loser's changes without prompting"),
                )
                .arg(
                    Arg::new("auto-keep")
                        .long("auto-keep")
                        .action(ArgAction::SetTrue)
                        .help("Always keep the existing booking without prompting"),
                ),
        ))
        .subcommand(with_run_args(
            Command::new("plain").about("Single attempt per actor; the loser reports the conflict"),
        ))
        .subcommand(Command::new("config").about("Print the effective configuration"))
}

fn with_run_args(cmd: Command) -> Command {
    cmd.arg(
        Arg::new("think-ms")
            .long("think-ms")
            .value_name("MS")
            .value_parser(value_parser!(u64))
            .help("Pause of the subject-editing actor between change and commit"),
    )
    .arg(
        Arg::new("actors")
            .long("actors")
            .value_name("N")
            .value_parser(value_parser!(u64).range(1..))
            .help("Number of concurrent actors"),
    )
}
