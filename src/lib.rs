//! # trapline
//!
//! Reproducible simulation of pollinator trapline formation.
//!
//! A single forager leaves its nest, visits five flowers and returns. Its
//! choice of next site is drawn from a learned transition matrix; whenever a
//! completed bout is at least as short as the best so far, every transition
//! it used is reinforced. Over many bouts the forager settles on a short,
//! repeatable circuit (a trapline). Many independent runs are simulated and
//! the speed of convergence is measured.
//!
//! - Deterministic: every run draws from its own partitioned PCG stream
//! - Stop-on-error: a corrupted transition row halts the run (Jidoka)
//! - Parallel: runs are load-leveled over a work-stealing scheduler
//!
//! ## Example
//!
//! ```rust
//! use trapline::prelude::*;
//!
//! let config = ExperimentConfig::builder()
//!     .runs(10)
//!     .bouts(50)
//!     .seed(42)
//!     .build();
//! let result = run_experiment(config).unwrap();
//! assert_eq!(result.summary.runs, 10);
//! ```

#![forbid(unsafe_code)]
#![deny(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![warn(clippy::pedantic, clippy::nursery)]
#![allow(
    clippy::module_name_repetitions,
    clippy::similar_names,
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::missing_const_for_fn,
    clippy::needless_range_loop,
)]

pub mod analysis;
pub mod cli;
pub mod config;
pub mod engine;
pub mod error;
pub mod experiment;
pub mod foraging;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::analysis::{ConvergenceAnalyzer, ConvergenceSummary, RunConvergence};
    pub use crate::config::{ExperimentConfig, ExperimentConfigBuilder};
    pub use crate::engine::jidoka::DistributionGuard;
    pub use crate::engine::rng::SimRng;
    pub use crate::error::{TraplineError, TraplineResult};
    pub use crate::experiment::{run_experiment, Experiment, ExperimentResult};
    pub use crate::foraging::{
        BoutOutcome, DestinationSource, DistanceMatrix, InitialStyle, ReinforcementPolicy, Route,
        RunOutput, ScriptedDestinations, Site, TransitionModel,
    };
}

/// Re-export for public API
pub use error::{TraplineError, TraplineResult};
