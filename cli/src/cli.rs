//! # CLI Interface
//!
//! Command-line structure for the `faireum` binary, via `clap` derive.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::logging::LogFormat;

/// Faireum token operator tool.
///
/// Replays scripted call sequences against a fresh token and inspects the
/// release schedule. Nothing here talks to a network; every run starts
/// from an empty deployment.
#[derive(Parser, Debug)]
#[command(
    name = "faireum",
    about = "Faireum token operator tool",
    version,
    propagate_version = true
)]
pub struct FaireumCli {
    /// Log output format.
    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Pretty)]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Replay a JSON scenario of timestamped calls and print the results.
    Simulate(SimulateArgs),
    /// Print the release schedule.
    Schedule(ScheduleArgs),
    /// Print version information and exit.
    Version,
}

#[derive(Parser, Debug)]
pub struct SimulateArgs {
    /// Path to the scenario file (JSON).
    #[arg(long, short = 's')]
    pub script: PathBuf,

    /// Path to a token config file (JSON). Launch defaults when omitted.
    #[arg(long, short = 'c', env = "FAIREUM_CONFIG")]
    pub config: Option<PathBuf>,

    /// Stop at the first rejected call and exit with an error.
    #[arg(long)]
    pub fail_fast: bool,
}

#[derive(Parser, Debug)]
pub struct ScheduleArgs {
    /// Path to a token config file (JSON). Launch defaults when omitted.
    #[arg(long, short = 'c', env = "FAIREUM_CONFIG")]
    pub config: Option<PathBuf>,

    /// Locked amount, in base units, to evaluate at each milestone.
    #[arg(long)]
    pub amount: Option<u128>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli_structure() {
        FaireumCli::command().debug_assert();
    }

    #[test]
    fn parses_simulate_with_flags() {
        let cli = FaireumCli::try_parse_from([
            "faireum",
            "--log-format",
            "json",
            "simulate",
            "--script",
            "launch.json",
            "--fail-fast",
        ])
        .unwrap();
        assert_eq!(cli.log_format, LogFormat::Json);
        match cli.command {
            Commands::Simulate(args) => {
                assert_eq!(args.script, PathBuf::from("launch.json"));
                assert!(args.fail_fast);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
