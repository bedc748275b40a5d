// Copyright (c) 2026 Faireum Foundation Limited. MIT License.
// See LICENSE for details.

//! # Faireum Operator Tool
//!
//! Entry point for the `faireum` binary. Parses CLI arguments, initializes
//! logging, and dispatches to a subcommand:
//!
//! - `simulate` — replay a JSON scenario against a fresh deployment
//! - `schedule` — print the release schedule milestones
//! - `version`  — print build version information
//!
//! Results go to stdout as JSON, one object per line; logs go to stderr.

mod cli;
mod logging;
mod scenario;

use anyhow::{bail, Context, Result};
use clap::Parser;
use serde_json::json;
use std::fs;
use std::path::Path;

use faireum_contracts::encumbrance::ReleaseSchedule;
use faireum_protocol::amount::format_units;
use faireum_protocol::config::BPS_DENOMINATOR;
use faireum_protocol::TokenConfig;

use cli::{Commands, FaireumCli, ScheduleArgs, SimulateArgs};
use scenario::Scenario;

fn main() -> Result<()> {
    let cli = FaireumCli::parse();
    logging::init_logging(logging::DEFAULT_FILTER, cli.log_format);

    match cli.command {
        Commands::Simulate(args) => simulate(args),
        Commands::Schedule(args) => schedule(args),
        Commands::Version => {
            print_version();
            Ok(())
        }
    }
}

/// Loads and validates a token config, or returns the launch defaults.
fn load_config(path: Option<&Path>) -> Result<TokenConfig> {
    let config = match path {
        Some(path) => {
            let raw = fs::read_to_string(path)
                .with_context(|| format!("failed to read config {}", path.display()))?;
            TokenConfig::from_json(&raw)
                .with_context(|| format!("failed to parse config {}", path.display()))?
        }
        None => TokenConfig::default(),
    };
    config.validate().context("invalid release schedule")?;
    Ok(config)
}

fn simulate(args: SimulateArgs) -> Result<()> {
    let config = load_config(args.config.as_deref())?;
    let raw = fs::read_to_string(&args.script)
        .with_context(|| format!("failed to read scenario {}", args.script.display()))?;
    let scenario = Scenario::from_json(&raw)
        .with_context(|| format!("failed to parse scenario {}", args.script.display()))?;

    let report = scenario::run(&scenario, config, args.fail_fast)?;
    for outcome in &report.outcomes {
        println!("{}", serde_json::to_string(outcome)?);
    }
    println!(
        "{}",
        serde_json::to_string(&json!({
            "snapshot": report.snapshot,
            "foreign_balances": foreign_balances_json(&report),
        }))?
    );

    tracing::info!(
        steps = report.outcomes.len(),
        rejected = report.rejected(),
        "scenario finished"
    );
    if let Some(step) = report.halted_at {
        bail!("step {step} was rejected, stopping");
    }
    Ok(())
}

fn foreign_balances_json(report: &scenario::Report) -> serde_json::Value {
    report
        .foreign_balances
        .iter()
        .map(|(holder, balance)| (holder.to_hex(), json!(balance.to_string())))
        .collect::<serde_json::Map<_, _>>()
        .into()
}

fn schedule(args: ScheduleArgs) -> Result<()> {
    let config = load_config(args.config.as_deref())?;
    let schedule = ReleaseSchedule::from_config(&config)?;

    println!(
        "{}",
        json!({ "start": schedule.start(), "milestones": schedule.milestones().len() })
    );
    for milestone in schedule.milestones() {
        let date = schedule.milestone_date(milestone);
        let mut line = json!({
            "after_days": milestone.after_days,
            "date": date,
            "unlocked_bps": milestone.unlocked_bps,
            "unlocked_percent": f64::from(milestone.unlocked_bps) * 100.0
                / f64::from(BPS_DENOMINATOR),
        });
        if let Some(amount) = args.amount {
            let locked = schedule.effective_locked(amount, date);
            line["locked"] = json!(locked.to_string());
            line["locked_tokens"] = json!(format_units(locked, config.decimals));
        }
        println!("{line}");
    }
    Ok(())
}

fn print_version() {
    println!("faireum   {}", env!("CARGO_PKG_VERSION"));
    println!("rustc     {}", rustc_version());
}

/// Returns the Rust compiler version used to build this binary.
fn rustc_version() -> &'static str {
    option_env!("RUSTC_VERSION").unwrap_or("unknown")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn missing_config_uses_launch_defaults() {
        let config = load_config(None).unwrap();
        assert_eq!(config, TokenConfig::default());
    }

    #[test]
    fn config_file_overrides_schedule() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{ "release_schedule": [
                {{ "after_days": 0, "unlocked_bps": 0 }},
                {{ "after_days": 30, "unlocked_bps": 10000 }}
            ] }}"#
        )
        .unwrap();
        let config = load_config(Some(file.path())).unwrap();
        assert_eq!(config.release_schedule.len(), 2);
        assert_eq!(config.symbol, "FAIRC");
    }

    #[test]
    fn config_that_never_unlocks_is_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{ "release_schedule": [ {{ "after_days": 0, "unlocked_bps": 5000 }} ] }}"#
        )
        .unwrap();
        assert!(load_config(Some(file.path())).is_err());
    }

    #[test]
    fn unreadable_config_reports_path() {
        let err = load_config(Some(Path::new("/nonexistent/faireum.json"))).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/faireum.json"));
    }
}
