//! Top-level experiment: every run, every bout, one call.
//!
//! # Example
//!
//! ```rust
//! use trapline::prelude::*;
//!
//! let config = ExperimentConfig::builder()
//!     .runs(4)
//!     .bouts(20)
//!     .seed(42)
//!     .parallel(false)
//!     .build();
//! let result = Experiment::new(config).unwrap().run().unwrap();
//! assert_eq!(result.runs.len(), 4);
//! assert_eq!(result.summary.runs, 4);
//! ```

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::analysis::{ConvergenceAnalyzer, ConvergenceSummary};
use crate::config::ExperimentConfig;
use crate::engine::rng::SimRng;
use crate::engine::scheduler::WorkStealingScheduler;
use crate::error::TraplineResult;
use crate::foraging::run::{simulate_run, RunOutput, RunSettings};
use crate::foraging::site::Route;
use crate::foraging::transition::TransitionModel;

/// Log progress every this many runs.
const PROGRESS_INTERVAL: usize = 100;

/// Everything an experiment produced, for reporting collaborators.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExperimentResult {
    /// Configuration the experiment ran with.
    pub config: ExperimentConfig,
    /// Optimal routes the analysis compared against.
    pub optimal_routes: Vec<Route>,
    /// Per-run outputs, in run order.
    pub runs: Vec<RunOutput>,
    /// Aggregate convergence statistics.
    pub summary: ConvergenceSummary,
    /// Mean distance at each bout index across runs.
    pub distance_curve: Vec<f64>,
}

/// A validated, ready-to-run experiment.
#[derive(Debug, Clone)]
pub struct Experiment {
    config: ExperimentConfig,
    settings: RunSettings,
    analyzer: ConvergenceAnalyzer,
}

impl Experiment {
    /// Validate `config` and prepare the shared run settings.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the config, the landscape, the
    /// optimal routes or the initial transition model are invalid.
    pub fn new(config: ExperimentConfig) -> TraplineResult<Self> {
        config.check()?;
        let settings = config.run_settings()?;
        // fail fast on a style that cannot produce a model for this landscape
        TransitionModel::initialize(settings.style, &settings.distances)?;
        let analyzer = config.analyzer()?;
        Ok(Self {
            config,
            settings,
            analyzer,
        })
    }

    /// Configuration.
    #[must_use]
    pub const fn config(&self) -> &ExperimentConfig {
        &self.config
    }

    /// Settings shared by every run.
    #[must_use]
    pub const fn settings(&self) -> &RunSettings {
        &self.settings
    }

    /// Analyzer used for the summary.
    #[must_use]
    pub const fn analyzer(&self) -> &ConvergenceAnalyzer {
        &self.analyzer
    }

    /// Run number `index` with its own RNG stream.
    ///
    /// # Errors
    ///
    /// Returns the run's error tagged with its index.
    pub fn run_single(&self, index: usize) -> TraplineResult<RunOutput> {
        let mut rng = SimRng::for_stream(self.config.seed, index as u64);
        let output = simulate_run(&self.settings, &mut rng).map_err(|e| e.in_run(index))?;
        if (index + 1) % PROGRESS_INTERVAL == 0 {
            info!(run = index + 1, total = self.config.runs, "run finished");
        }
        Ok(output)
    }

    /// Run every run and analyse the results.
    ///
    /// # Errors
    ///
    /// Returns the error of the lowest-indexed failing run.
    pub fn run(&self) -> TraplineResult<ExperimentResult> {
        let runs = self.config.runs;
        info!(
            runs,
            bouts = self.config.bouts,
            seed = self.config.seed,
            parallel = self.config.execution.parallel,
            "starting experiment"
        );

        let outputs: Vec<TraplineResult<RunOutput>> = if self.config.execution.parallel {
            let scheduler = self
                .config
                .execution
                .workers
                .map_or_else(WorkStealingScheduler::new, WorkStealingScheduler::with_workers);
            scheduler.execute(runs, |index| self.run_single(index))
        } else {
            (0..runs).map(|index| self.run_single(index)).collect()
        };

        let runs = outputs
            .into_iter()
            .collect::<TraplineResult<Vec<RunOutput>>>()
            .inspect_err(|e| warn!(error = %e, "experiment aborted"))?;

        let summary = self.analyzer.summarize(&runs);
        info!(
            reached_optimum = summary.runs_reaching_optimum,
            reached_stable = summary.runs_reaching_stable_optimum,
            "experiment finished"
        );

        Ok(ExperimentResult {
            config: self.config.clone(),
            optimal_routes: self.analyzer.optimal_routes().to_vec(),
            distance_curve: ConvergenceAnalyzer::distance_curve(&runs),
            summary,
            runs,
        })
    }
}

/// Build and run an experiment in one call.
///
/// # Errors
///
/// Returns configuration errors or the first failing run.
pub fn run_experiment(config: ExperimentConfig) -> TraplineResult<ExperimentResult> {
    Experiment::new(config)?.run()
}
