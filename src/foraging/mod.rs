//! Trapline formation: a single forager learning a route among six sites.
//!
//! Leaves first:
//! - [`site`]: site ids and routes
//! - [`distance`]: the static distance map
//! - [`transition`]: the learned row-stochastic transition model
//! - [`reinforcement`]: when and how strongly a bout is rewarded
//! - [`bout`]: the per-bout state machine
//! - [`run`]: repeated bouts of one agent

pub mod bout;
pub mod distance;
pub mod reinforcement;
pub mod run;
pub mod site;
pub mod transition;

pub use bout::{
    BoutController, BoutOutcome, BoutRecord, BoutReport, BoutState, DestinationSource,
    ScriptedDestinations,
};
pub use distance::DistanceMatrix;
pub use reinforcement::{Novelty, ReinforcementPolicy};
pub use run::{simulate_run, Agent, BoutSummary, RunOrchestrator, RunOutput, RunSettings};
pub use site::{Route, Site, SITE_COUNT};
pub use transition::{InitialStyle, TransitionModel};
