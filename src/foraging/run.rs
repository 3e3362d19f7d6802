//! Run orchestration: one agent, many bouts.
//!
//! Only the transition model and the run minimum distance survive from one
//! bout to the next; everything else is rebuilt at the nest.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::debug;

use super::bout::{BoutController, BoutOutcome, BoutReport, DestinationSource};
use super::distance::DistanceMatrix;
use super::reinforcement::{should_reinforce, ReinforcementPolicy};
use super::site::Route;
use super::transition::{InitialStyle, TransitionModel};
use crate::error::{TraplineError, TraplineResult};

/// Everything a run needs, shared read-only between runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSettings {
    /// Landscape.
    pub distances: DistanceMatrix,
    /// Initial transition matrix style.
    pub style: InitialStyle,
    /// Reinforcement rule.
    pub policy: ReinforcementPolicy,
    /// Bouts per run.
    pub bouts: usize,
}

impl Default for RunSettings {
    fn default() -> Self {
        Self {
            distances: DistanceMatrix::default(),
            style: InitialStyle::default(),
            policy: ReinforcementPolicy::default(),
            bouts: 250,
        }
    }
}

/// The forager: its learned model and the best distance it has flown.
#[derive(Debug, Clone, PartialEq)]
pub struct Agent {
    model: TransitionModel,
    min_distance: f64,
}

impl Agent {
    /// Fresh agent with an untrained model.
    ///
    /// # Errors
    ///
    /// Returns an error if the initial model cannot be built.
    pub fn new(settings: &RunSettings) -> TraplineResult<Self> {
        Ok(Self::with_model(TransitionModel::initialize(
            settings.style,
            &settings.distances,
        )?))
    }

    /// Fresh agent with a given model.
    #[must_use]
    pub const fn with_model(model: TransitionModel) -> Self {
        Self {
            model,
            min_distance: f64::INFINITY,
        }
    }

    /// Current transition model.
    #[must_use]
    pub const fn model(&self) -> &TransitionModel {
        &self.model
    }

    /// Shortest completed bout so far (`+inf` before the first one).
    #[must_use]
    pub const fn min_distance(&self) -> f64 {
        self.min_distance
    }
}

/// What happened in one bout of a run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoutSummary {
    /// Completed or Aborted.
    pub outcome: BoutOutcome,
    /// Total distance.
    pub distance: f64,
    /// How many times this exact route has occurred in the run so far.
    pub repeat_count: usize,
    /// Factor applied, if the bout was reinforced.
    pub reinforcement: Option<f64>,
}

/// Per-run outputs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunOutput {
    /// Total distance of each bout.
    pub distances: Vec<f64>,
    /// Visited sequence of each bout, aborted ones included.
    pub routes: Vec<Route>,
    /// Outcome of each bout.
    pub outcomes: Vec<BoutOutcome>,
    /// Factor applied at each bout, `None` when it did not reinforce.
    pub reinforcements: Vec<Option<f64>>,
    /// Shortest completed bout, `None` if no bout completed.
    pub min_distance: Option<f64>,
}

impl RunOutput {
    /// Number of bouts recorded.
    #[must_use]
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    /// Whether no bout was recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Number of completed bouts.
    #[must_use]
    pub fn completed(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| **o == BoutOutcome::Completed)
            .count()
    }
}

/// Drives one agent through a fixed number of bouts.
#[derive(Debug)]
pub struct RunOrchestrator<'a> {
    settings: &'a RunSettings,
    agent: Agent,
    output: RunOutput,
    route_counts: HashMap<Route, usize>,
}

impl<'a> RunOrchestrator<'a> {
    /// Start a run with a fresh agent.
    ///
    /// # Errors
    ///
    /// Returns an error if the agent cannot be built.
    pub fn new(settings: &'a RunSettings) -> TraplineResult<Self> {
        Ok(Self::with_agent(settings, Agent::new(settings)?))
    }

    /// Start a run with a given agent.
    #[must_use]
    pub fn with_agent(settings: &'a RunSettings, agent: Agent) -> Self {
        Self {
            settings,
            agent,
            output: RunOutput {
                distances: Vec::with_capacity(settings.bouts),
                routes: Vec::with_capacity(settings.bouts),
                outcomes: Vec::with_capacity(settings.bouts),
                reinforcements: Vec::with_capacity(settings.bouts),
                min_distance: None,
            },
            route_counts: HashMap::new(),
        }
    }

    /// The agent.
    #[must_use]
    pub const fn agent(&self) -> &Agent {
        &self.agent
    }

    /// Outputs recorded so far.
    #[must_use]
    pub const fn output(&self) -> &RunOutput {
        &self.output
    }

    /// Run one bout, record it and apply reinforcement.
    ///
    /// # Errors
    ///
    /// Propagates sampling and reinforcement errors.
    pub fn run_bout<S>(&mut self, source: &mut S) -> TraplineResult<BoutSummary>
    where
        S: DestinationSource + ?Sized,
    {
        let BoutReport {
            outcome,
            sequence,
            counts,
            distance,
        } = BoutController::new().run(self.agent.model(), source, &self.settings.distances)?;

        let repeat_count = {
            let seen = self.route_counts.entry(sequence.clone()).or_insert(0);
            *seen += 1;
            *seen
        };

        let reinforcement = if should_reinforce(outcome, distance, self.agent.min_distance) {
            self.agent.min_distance = distance;
            let factor = self.settings.policy.effective_factor(repeat_count);
            debug!(
                bout = self.output.len(),
                distance,
                repeat_count,
                factor,
                "reinforcing route"
            );
            self.agent.model.reinforce(&counts, factor)?;
            Some(factor)
        } else {
            None
        };

        self.output.distances.push(distance);
        self.output.routes.push(sequence);
        self.output.outcomes.push(outcome);
        self.output.reinforcements.push(reinforcement);
        if self.agent.min_distance.is_finite() {
            self.output.min_distance = Some(self.agent.min_distance);
        }

        Ok(BoutSummary {
            outcome,
            distance,
            repeat_count,
            reinforcement,
        })
    }

    /// Run all remaining bouts and hand back the outputs.
    ///
    /// # Errors
    ///
    /// Stops at the first failing bout.
    pub fn run<S>(mut self, source: &mut S) -> TraplineResult<RunOutput>
    where
        S: DestinationSource + ?Sized,
    {
        while self.output.len() < self.settings.bouts {
            self.run_bout(source)?;
        }
        Ok(self.output)
    }
}

/// Run a complete fresh run with `source`.
///
/// # Errors
///
/// Returns the first error raised inside the run.
pub fn simulate_run<S>(settings: &RunSettings, source: &mut S) -> TraplineResult<RunOutput>
where
    S: DestinationSource + ?Sized,
{
    if settings.bouts == 0 {
        return Err(TraplineError::config("bouts per run must be positive"));
    }
    RunOrchestrator::new(settings)?.run(source)
}


#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod proptests {
    use super::*;
    use crate::engine::rng::SimRng;
    use proptest::prelude::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        /// The run minimum never increases and only reinforced bouts set it.
        #[test]
        fn prop_monotone_minimum(seed in any::<u64>(), weighted in any::<bool>()) {
            let settings = RunSettings {
                bouts: 60,
                style: if weighted { InitialStyle::DistanceWeighted } else { InitialStyle::FixedAsymmetric },
                ..RunSettings::default()
            };
            let mut rng = SimRng::new(seed);
            let output = simulate_run(&settings, &mut rng).unwrap();

            let mut minimum = f64::INFINITY;
            for ((distance, outcome), reinforced) in output
                .distances
                .iter()
                .zip(&output.outcomes)
                .zip(&output.reinforcements)
            {
                let expected = *outcome == BoutOutcome::Completed && *distance <= minimum;
                prop_assert_eq!(reinforced.is_some(), expected);
                if expected {
                    prop_assert!(*distance <= minimum);
                    minimum = *distance;
                }
            }
        }
    }
}
