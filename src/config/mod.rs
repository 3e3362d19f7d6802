//! Experiment configuration with YAML schema and validation.
//!
//! Implements Poka-Yoke (mistake-proofing) through:
//! - Type-safe configuration structs (`deny_unknown_fields`)
//! - Schema validation via `validator`
//! - Semantic validation of the landscape and optimal routes
//!
//! # Example YAML
//!
//! ```yaml
//! runs: 1000
//! bouts: 250
//! seed: 42
//! initial_style: fixed-asymmetric
//! learning:
//!   reinforcement_factor: 2.5
//!   novelty:
//!     enabled: false
//!     swap_point: 50
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;
use validator::Validate;

use crate::analysis::ConvergenceAnalyzer;
use crate::error::{TraplineError, TraplineResult};
use crate::foraging::distance::DistanceMatrix;
use crate::foraging::reinforcement::ReinforcementPolicy;
use crate::foraging::run::RunSettings;
use crate::foraging::site::{route_from_ids, Route};
use crate::foraging::transition::InitialStyle;

/// Top-level experiment configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct ExperimentConfig {
    /// Schema version for forward compatibility.
    #[validate(length(min = 1))]
    #[serde(default = "default_schema_version")]
    pub schema_version: String,

    /// Number of independent runs (agents).
    #[validate(range(min = 1))]
    #[serde(default = "default_runs")]
    pub runs: usize,

    /// Bouts per run.
    #[validate(range(min = 1))]
    #[serde(default = "default_bouts")]
    pub bouts: usize,

    /// Master seed; run `k` uses stream `k` of it.
    #[serde(default = "default_seed")]
    pub seed: u64,

    /// How the initial transition matrix is built.
    #[serde(default)]
    pub initial_style: InitialStyle,

    /// Landscape configuration.
    #[validate(nested)]
    #[serde(default)]
    pub landscape: LandscapeConfig,

    /// Learning rule configuration.
    #[validate(nested)]
    #[serde(default)]
    pub learning: LearningConfig,

    /// Execution configuration.
    #[validate(nested)]
    #[serde(default)]
    pub execution: ExecutionConfig,
}

fn default_schema_version() -> String {
    "1.0".to_string()
}

const fn default_runs() -> usize {
    1000
}

const fn default_bouts() -> usize {
    250
}

const fn default_seed() -> u64 {
    42
}

impl Default for ExperimentConfig {
    fn default() -> Self {
        Self {
            schema_version: default_schema_version(),
            runs: default_runs(),
            bouts: default_bouts(),
            seed: default_seed(),
            initial_style: InitialStyle::default(),
            landscape: LandscapeConfig::default(),
            learning: LearningConfig::default(),
            execution: ExecutionConfig::default(),
        }
    }
}

impl ExperimentConfig {
    /// Load configuration from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - File cannot be read
    /// - YAML parsing fails
    /// - Validation fails
    pub fn load<P: AsRef<Path>>(path: P) -> TraplineResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse configuration from YAML string.
    ///
    /// # Errors
    ///
    /// Returns error if parsing or validation fails.
    pub fn from_yaml(yaml: &str) -> TraplineResult<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.check()?;
        Ok(config)
    }

    /// Serialize to YAML.
    ///
    /// # Errors
    ///
    /// Returns error if serialization fails.
    pub fn to_yaml(&self) -> TraplineResult<String> {
        serde_yaml::to_string(self).map_err(|e| TraplineError::serialization(e.to_string()))
    }

    /// Create a builder for configuration.
    #[must_use]
    pub fn builder() -> ExperimentConfigBuilder {
        ExperimentConfigBuilder::default()
    }

    /// Run schema and semantic validation.
    ///
    /// # Errors
    ///
    /// Returns the first violated constraint.
    pub fn check(&self) -> TraplineResult<()> {
        self.validate()?;
        self.validate_semantic()
    }

    /// Validate semantic constraints beyond schema.
    fn validate_semantic(&self) -> TraplineResult<()> {
        if !self.learning.reinforcement_factor.is_finite() {
            return Err(TraplineError::config(
                "reinforcement factor must be finite",
            ));
        }
        if !self.learning.novelty.swap_point.is_finite() {
            return Err(TraplineError::config("swap point must be finite"));
        }
        if self.execution.workers == Some(0) {
            return Err(TraplineError::config("worker count must be positive"));
        }
        let _ = self.distance_matrix()?;
        let _ = self.analyzer()?;
        Ok(())
    }

    /// The validated (and scaled) distance matrix.
    ///
    /// # Errors
    ///
    /// Returns `InvalidDistanceMatrix` for a malformed override, or a
    /// configuration error for a bad scale.
    pub fn distance_matrix(&self) -> TraplineResult<DistanceMatrix> {
        let base = match &self.landscape.distances {
            Some(rows) => DistanceMatrix::from_rows(rows)?,
            None => DistanceMatrix::default(),
        };
        base.scaled(self.landscape.scale)
    }

    /// The reinforcement policy.
    #[must_use]
    pub const fn policy(&self) -> ReinforcementPolicy {
        if self.learning.novelty.enabled {
            ReinforcementPolicy::with_novelty(
                self.learning.reinforcement_factor,
                self.learning.novelty.swap_point,
            )
        } else {
            ReinforcementPolicy::fixed(self.learning.reinforcement_factor)
        }
    }

    /// Settings shared by every run.
    ///
    /// # Errors
    ///
    /// Returns an error for an invalid landscape.
    pub fn run_settings(&self) -> TraplineResult<RunSettings> {
        Ok(RunSettings {
            distances: self.distance_matrix()?,
            style: self.initial_style,
            policy: self.policy(),
            bouts: self.bouts,
        })
    }

    /// Analyzer for the configured optimal routes, or for the routes found by
    /// exhaustive search when none are configured.
    ///
    /// # Errors
    ///
    /// Returns an error for malformed routes or an invalid landscape.
    pub fn analyzer(&self) -> TraplineResult<ConvergenceAnalyzer> {
        match &self.landscape.optimal_routes {
            Some(ids) => {
                let routes = ids
                    .iter()
                    .map(|r| route_from_ids(r))
                    .collect::<TraplineResult<Vec<Route>>>()?;
                ConvergenceAnalyzer::new(routes)
            }
            None => Ok(ConvergenceAnalyzer::from_distances(&self.distance_matrix()?)),
        }
    }
}

/// Configuration builder for programmatic construction.
#[derive(Debug, Default)]
pub struct ExperimentConfigBuilder {
    runs: Option<usize>,
    bouts: Option<usize>,
    seed: Option<u64>,
    initial_style: Option<InitialStyle>,
    reinforcement_factor: Option<f64>,
    swap_point: Option<f64>,
    distances: Option<Vec<Vec<f64>>>,
    scale: Option<f64>,
    optimal_routes: Option<Vec<Vec<usize>>>,
    parallel: Option<bool>,
    workers: Option<usize>,
}

impl ExperimentConfigBuilder {
    /// Set the number of runs.
    #[must_use]
    pub const fn runs(mut self, runs: usize) -> Self {
        self.runs = Some(runs);
        self
    }

    /// Set the number of bouts per run.
    #[must_use]
    pub const fn bouts(mut self, bouts: usize) -> Self {
        self.bouts = Some(bouts);
        self
    }

    /// Set the master seed.
    #[must_use]
    pub const fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Set the initial probability style.
    #[must_use]
    pub const fn initial_style(mut self, style: InitialStyle) -> Self {
        self.initial_style = Some(style);
        self
    }

    /// Set the base reinforcement factor.
    #[must_use]
    pub const fn reinforcement_factor(mut self, factor: f64) -> Self {
        self.reinforcement_factor = Some(factor);
        self
    }

    /// Enable the novelty extension with the given swap point.
    #[must_use]
    pub const fn novelty(mut self, swap_point: f64) -> Self {
        self.swap_point = Some(swap_point);
        self
    }

    /// Override the distance matrix.
    #[must_use]
    #[allow(clippy::missing_const_for_fn)] // Vec doesn't impl Copy
    pub fn distances(mut self, rows: Vec<Vec<f64>>) -> Self {
        self.distances = Some(rows);
        self
    }

    /// Divide every distance by `scale`.
    #[must_use]
    pub const fn scale(mut self, scale: f64) -> Self {
        self.scale = Some(scale);
        self
    }

    /// Supply the optimal routes instead of searching for them.
    #[must_use]
    #[allow(clippy::missing_const_for_fn)]
    pub fn optimal_routes(mut self, routes: Vec<Vec<usize>>) -> Self {
        self.optimal_routes = Some(routes);
        self
    }

    /// Run on the work-stealing scheduler or sequentially.
    #[must_use]
    pub const fn parallel(mut self, parallel: bool) -> Self {
        self.parallel = Some(parallel);
        self
    }

    /// Number of worker threads for parallel execution.
    #[must_use]
    pub const fn workers(mut self, workers: usize) -> Self {
        self.workers = Some(workers);
        self
    }

    /// Build the configuration.
    #[must_use]
    pub fn build(self) -> ExperimentConfig {
        let mut config = ExperimentConfig::default();

        if let Some(runs) = self.runs {
            config.runs = runs;
        }
        if let Some(bouts) = self.bouts {
            config.bouts = bouts;
        }
        if let Some(seed) = self.seed {
            config.seed = seed;
        }
        if let Some(style) = self.initial_style {
            config.initial_style = style;
        }
        if let Some(factor) = self.reinforcement_factor {
            config.learning.reinforcement_factor = factor;
        }
        if let Some(swap_point) = self.swap_point {
            config.learning.novelty = NoveltyConfig {
                enabled: true,
                swap_point,
            };
        }
        if self.distances.is_some() {
            config.landscape.distances = self.distances;
        }
        if let Some(scale) = self.scale {
            config.landscape.scale = scale;
        }
        if self.optimal_routes.is_some() {
            config.landscape.optimal_routes = self.optimal_routes;
        }
        if let Some(parallel) = self.parallel {
            config.execution.parallel = parallel;
        }
        if self.workers.is_some() {
            config.execution.workers = self.workers;
        }

        config
    }
}

/// Landscape configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct LandscapeConfig {
    /// Optional 6×6 distance matrix replacing the default map.
    #[serde(default)]
    pub distances: Option<Vec<Vec<f64>>>,
    /// Divisor applied to every distance.
    #[validate(range(exclusive_min = 0.0))]
    #[serde(default = "default_scale")]
    pub scale: f64,
    /// Optional optimal routes; found by exhaustive search when absent.
    #[serde(default)]
    pub optimal_routes: Option<Vec<Vec<usize>>>,
}

const fn default_scale() -> f64 {
    1.0
}

impl Default for LandscapeConfig {
    fn default() -> Self {
        Self {
            distances: None,
            scale: default_scale(),
            optimal_routes: None,
        }
    }
}

/// Learning rule configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct LearningConfig {
    /// Base reinforcement factor.
    #[serde(default = "default_reinforcement_factor")]
    pub reinforcement_factor: f64,
    /// Novelty extension.
    #[validate(nested)]
    #[serde(default)]
    pub novelty: NoveltyConfig,
}

const fn default_reinforcement_factor() -> f64 {
    2.5
}

impl Default for LearningConfig {
    fn default() -> Self {
        Self {
            reinforcement_factor: default_reinforcement_factor(),
            novelty: NoveltyConfig::default(),
        }
    }
}

/// Novelty extension configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct NoveltyConfig {
    /// Whether the extension is active.
    #[serde(default)]
    pub enabled: bool,
    /// Roughly how many repeats of a route before reinforcement inverts.
    #[validate(range(exclusive_min = 0.0))]
    #[serde(default = "default_swap_point")]
    pub swap_point: f64,
}

const fn default_swap_point() -> f64 {
    50.0
}

impl Default for NoveltyConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            swap_point: default_swap_point(),
        }
    }
}

/// Execution configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct ExecutionConfig {
    /// Execute runs on the work-stealing scheduler.
    #[serde(default = "default_true")]
    pub parallel: bool,
    /// Worker threads; defaults to available parallelism.
    #[serde(default)]
    pub workers: Option<usize>,
}

const fn default_true() -> bool {
    true
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        Self {
            parallel: true,
            workers: None,
        }
    }
}
