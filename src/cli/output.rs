//! CLI output formatting.
//!
//! Formatting is kept apart from printing so it can be tested.

use serde::Serialize;
use std::fmt::Write as _;

use crate::analysis::{ConvergenceSummary, Statistic};
use crate::config::ExperimentConfig;
use crate::error::{TraplineError, TraplineResult};
use crate::experiment::ExperimentResult;
use crate::foraging::site::{format_route, Route};

/// Print version information.
pub fn print_version() {
    println!("trapline {}", env!("CARGO_PKG_VERSION"));
}

/// Print help message.
pub fn print_help() {
    println!(
        r"trapline - pollinator trapline formation simulator

USAGE:
    trapline <COMMAND> [OPTIONS]

COMMANDS:
    run [experiment.yaml]       Run an experiment (defaults without a file)
        --seed <N>              Override the master seed
        --runs <N>              Override the number of runs
        --bouts <N>             Override the bouts per run
        --json                  Print the result summary as JSON

    help                        Show this help message
    version                     Show version information

EXAMPLES:
    trapline run
    trapline run experiment.yaml --seed 12345
    trapline run --runs 100 --bouts 50 --json

LOGGING:
    Progress is logged to stderr; set RUST_LOG (e.g. RUST_LOG=debug) to
    change verbosity.
"
    );
}

/// Serialized shape of `run --json`: everything except the per-run histories.
#[derive(Debug, Serialize)]
struct JsonReport<'a> {
    config: &'a ExperimentConfig,
    optimal_routes: &'a [Route],
    summary: &'a ConvergenceSummary,
    distance_curve: &'a [f64],
}

/// Render the result as pretty JSON.
///
/// # Errors
///
/// Returns a serialization error if the result cannot be encoded.
pub fn format_json(result: &ExperimentResult) -> TraplineResult<String> {
    let report = JsonReport {
        config: &result.config,
        optimal_routes: &result.optimal_routes,
        summary: &result.summary,
        distance_curve: &result.distance_curve,
    };
    serde_json::to_string_pretty(&report).map_err(|e| TraplineError::serialization(e.to_string()))
}

fn fmt_value(value: Option<f64>) -> String {
    value.map_or_else(|| "n/a".to_string(), |v| format!("{v:.2}"))
}

fn fmt_statistic(stat: &Statistic) -> String {
    format!(
        "mean {}, median {} (n = {})",
        fmt_value(stat.mean),
        fmt_value(stat.median),
        stat.count
    )
}

/// Render the text summary.
#[must_use]
pub fn format_summary(result: &ExperimentResult) -> String {
    let config = &result.config;
    let summary = &result.summary;
    let mut out = String::new();

    let _ = writeln!(out, "Runs: {}  Bouts per run: {}", config.runs, config.bouts);
    let _ = writeln!(out, "Seed: {}", config.seed);
    let factor = config.learning.reinforcement_factor;
    if config.learning.novelty.enabled {
        let _ = writeln!(
            out,
            "Reinforcement: factor {factor}, novelty swap point {}",
            config.learning.novelty.swap_point
        );
    } else {
        let _ = writeln!(out, "Reinforcement: factor {factor}");
    }
    let routes: Vec<String> = result
        .optimal_routes
        .iter()
        .map(|r| format_route(r))
        .collect();
    let _ = writeln!(out, "Optimal routes: {}", routes.join(", "));
    out.push('\n');

    let _ = writeln!(
        out,
        "Distance (all bouts):    {}",
        fmt_statistic(&summary.mean_distance)
    );
    let _ = writeln!(
        out,
        "Distance (1st quarter):  {}",
        fmt_statistic(&summary.first_quarter_distance)
    );
    let _ = writeln!(
        out,
        "Distance (4th quarter):  {}",
        fmt_statistic(&summary.fourth_quarter_distance)
    );
    out.push('\n');

    let _ = writeln!(
        out,
        "Runs that reached the optimum:        {} / {}",
        summary.runs_reaching_optimum, summary.runs
    );
    let _ = writeln!(
        out,
        "Runs that reached a stable optimum:   {} / {}",
        summary.runs_reaching_stable_optimum, summary.runs
    );
    let _ = writeln!(
        out,
        "Bouts to first optimum:   {}",
        fmt_statistic(&summary.bouts_to_first_optimum)
    );
    let _ = writeln!(
        out,
        "Bouts to stable optimum:  {}",
        fmt_statistic(&summary.bouts_to_stable_optimum)
    );
    let _ = writeln!(
        out,
        "Unique routes per run:    {}",
        fmt_statistic(&summary.unique_routes)
    );
    out
}

/// Print the text summary.
pub fn print_summary(result: &ExperimentResult) {
    print!("{}", format_summary(result));
}
