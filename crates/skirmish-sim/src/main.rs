//! # Skirmish Sim
//!
//! Headless driver for Skirmish arenas.
//!
//! Usage: `skirmish-sim [scenario.toml] [seconds]`
//!
//! Loads a scenario (the built-in one when no path is given), runs it at a
//! fixed 60 frames per second with its scripted input, logs combat events and
//! prints a JSON report of the final arena state.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

mod runner;
mod scenario;
mod script;

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::scenario::Scenario;

/// Run a Skirmish arena scenario headlessly and print a JSON report
#[derive(Debug, Parser)]
#[command(name = "skirmish-sim")]
#[command(about = "Headless driver for Skirmish arenas", long_about = None)]
#[command(version)]
struct Args {
    /// Scenario TOML file (built-in scenario when omitted)
    scenario: Option<PathBuf>,

    /// Simulated seconds
    #[arg(default_value_t = 10.0)]
    seconds: f32,
}

/// Main entry point.
fn main() -> Result<()> {
    let args = Args::parse();

    // Logs go to stderr so stdout carries only the report
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env().add_directive("skirmish=info".parse()?))
        .init();

    info!("Skirmish sim {}", env!("CARGO_PKG_VERSION"));

    let scenario = match &args.scenario {
        Some(path) => Scenario::load(path)?,
        None => Scenario::embedded()?,
    };

    let report = runner::run(scenario, args.seconds);
    println!("{}", serde_json::to_string_pretty(&report)?);

    info!("Skirmish sim finished");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_default_to_embedded_scenario() {
        let args = Args::try_parse_from(["skirmish-sim"]).expect("no args parse");
        assert!(args.scenario.is_none());
        assert_eq!(args.seconds, 10.0);
    }

    #[test]
    fn test_args_positional_scenario_and_seconds() {
        let args = Args::try_parse_from(["skirmish-sim", "arena.toml", "5"]).expect("args parse");
        assert_eq!(args.scenario, Some(PathBuf::from("arena.toml")));
        assert_eq!(args.seconds, 5.0);
    }

    #[test]
    fn test_args_reject_extra_and_bad_values() {
        assert!(Args::try_parse_from(["skirmish-sim", "a.toml", "5", "extra"]).is_err());
        assert!(Args::try_parse_from(["skirmish-sim", "a.toml", "soon"]).is_err());
    }

    #[test]
    fn test_args_help_is_not_a_scenario() {
        let err = Args::try_parse_from(["skirmish-sim", "--help"]).expect_err("help exits");
        assert_eq!(err.kind(), clap::error::ErrorKind::DisplayHelp);
    }
}
