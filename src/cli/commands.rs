//! CLI command handlers.

use std::path::Path;
use std::process::ExitCode;

use tracing::error;

use super::output::{format_json, print_help, print_summary, print_version};
use super::{Args, Command};
use crate::config::ExperimentConfig;
use crate::error::TraplineResult;
use crate::experiment::{run_experiment, ExperimentResult};

/// Overrides given on the command line, applied on top of the file config.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Overrides {
    /// Master seed.
    pub seed: Option<u64>,
    /// Number of runs.
    pub runs: Option<usize>,
    /// Bouts per run.
    pub bouts: Option<usize>,
}

impl Overrides {
    /// Apply to `config` in place.
    pub fn apply(self, config: &mut ExperimentConfig) {
        if let Some(seed) = self.seed {
            config.seed = seed;
        }
        if let Some(runs) = self.runs {
            config.runs = runs;
        }
        if let Some(bouts) = self.bouts {
            config.bouts = bouts;
        }
    }
}

/// Main CLI entry point.
#[must_use]
pub fn run_cli(args: Args) -> ExitCode {
    match args.command {
        Command::Run {
            config_path,
            seed_override,
            runs_override,
            bouts_override,
            json,
        } => {
            let overrides = Overrides {
                seed: seed_override,
                runs: runs_override,
                bouts: bouts_override,
            };
            run_command(config_path.as_deref(), overrides, json)
        }
        Command::Help => {
            print_help();
            ExitCode::SUCCESS
        }
        Command::Version => {
            print_version();
            ExitCode::SUCCESS
        }
    }
}

/// Load the configuration (defaults when `path` is `None`) and apply
/// command-line overrides.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed.
pub fn load_config(path: Option<&Path>, overrides: Overrides) -> TraplineResult<ExperimentConfig> {
    let mut config = match path {
        Some(path) => ExperimentConfig::load(path)?,
        None => ExperimentConfig::default(),
    };
    overrides.apply(&mut config);
    Ok(config)
}

/// Load, run and report.
///
/// # Errors
///
/// Returns configuration and run errors.
pub fn execute(path: Option<&Path>, overrides: Overrides) -> TraplineResult<ExperimentResult> {
    run_experiment(load_config(path, overrides)?)
}

/// Run an experiment and print its summary.
#[must_use]
pub fn run_command(path: Option<&Path>, overrides: Overrides, json: bool) -> ExitCode {
    let result = match execute(path, overrides) {
        Ok(result) => result,
        Err(e) => {
            error!(error = %e, "experiment failed");
            eprintln!("Error: {e}");
            return ExitCode::from(1);
        }
    };

    if json {
        match format_json(&result) {
            Ok(text) => println!("{text}"),
            Err(e) => {
                eprintln!("Error: {e}");
                return ExitCode::from(1);
            }
        }
    } else {
        print_summary(&result);
    }
    ExitCode::SUCCESS
}
