//! One foraging bout: leave the nest, visit flowers, come back.
//!
//! ```text
//! AtNest ──step──▶ Traveling ──step──▶ ... ──▶ Completed | Aborted
//! ```
//!
//! Each step samples a destination, records the traversal and moves. Landing
//! on the nest before all six sites were seen aborts the bout; seeing the
//! sixth site triggers a forced flight home and completes it.

use serde::{Deserialize, Serialize};
use tracing::trace;

use super::distance::DistanceMatrix;
use super::site::{Route, Site, SITE_COUNT};
use super::transition::{CountMatrix, TransitionModel};
use crate::engine::rng::SimRng;
use crate::error::{TraplineError, TraplineResult};

/// State of the bout state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BoutState {
    /// At the nest, no move made yet.
    AtNest,
    /// Away from the nest.
    Traveling,
    /// Visited every flower and returned (terminal).
    Completed,
    /// Returned to the nest early (terminal).
    Aborted,
}

impl BoutState {
    /// Whether the state is terminal.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Aborted)
    }
}

/// Terminal classification of a bout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BoutOutcome {
    /// All flowers visited before returning.
    Completed,
    /// Returned to the nest early.
    Aborted,
}

/// Where the next destination comes from.
///
/// The seeded RNG samples the transition model; a script replays fixed
/// destinations regardless of the model.
pub trait DestinationSource {
    /// Pick the site to fly to from `from`.
    ///
    /// # Errors
    ///
    /// Returns an error if no destination can be produced.
    fn next_destination(&mut self, model: &TransitionModel, from: Site) -> TraplineResult<Site>;
}

impl DestinationSource for SimRng {
    fn next_destination(&mut self, model: &TransitionModel, from: Site) -> TraplineResult<Site> {
        model.sample(from, self)
    }
}

/// Fixed list of destinations, consumed in order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScriptedDestinations {
    script: Vec<Site>,
    cursor: usize,
}

impl ScriptedDestinations {
    /// Script from sites.
    #[must_use]
    pub const fn new(script: Vec<Site>) -> Self {
        Self { script, cursor: 0 }
    }

    /// Script from raw ids.
    ///
    /// # Errors
    ///
    /// Returns `InvalidSite` for an out-of-range id.
    pub fn from_ids(ids: &[usize]) -> TraplineResult<Self> {
        Ok(Self::new(super::site::route_from_ids(ids)?))
    }

    /// Destinations not yet consumed.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.script.len() - self.cursor
    }
}

impl DestinationSource for ScriptedDestinations {
    fn next_destination(&mut self, _model: &TransitionModel, _from: Site) -> TraplineResult<Site> {
        let site = self
            .script
            .get(self.cursor)
            .copied()
            .ok_or(TraplineError::ScriptExhausted {
                consumed: self.cursor,
            })?;
        self.cursor += 1;
        Ok(site)
    }
}

/// Per-bout traversal counters and visited sequence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoutRecord {
    counts: CountMatrix,
    sequence: Route,
    /// Bit `i` set once site `i` was seen.
    seen: u8,
    location: Site,
}

impl Default for BoutRecord {
    fn default() -> Self {
        Self {
            counts: [[0; SITE_COUNT]; SITE_COUNT],
            sequence: vec![Site::NEST],
            seen: 1,
            location: Site::NEST,
        }
    }
}

impl BoutRecord {
    /// Fresh record with the forager at the nest.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Fly from the current location to `to`.
    pub fn record_move(&mut self, to: Site) {
        self.counts[self.location.index()][to.index()] += 1;
        self.location = to;
        self.sequence.push(to);
        self.seen |= 1 << to.index();
    }

    /// Number of distinct sites seen, nest included.
    #[must_use]
    pub const fn unique_count(&self) -> usize {
        self.seen.count_ones() as usize
    }

    /// Current location.
    #[must_use]
    pub const fn location(&self) -> Site {
        self.location
    }

    /// Traversal counts.
    #[must_use]
    pub const fn counts(&self) -> &CountMatrix {
        &self.counts
    }

    /// Visited sequence, starting at the nest.
    #[must_use]
    pub fn sequence(&self) -> &[Site] {
        &self.sequence
    }

    /// Number of moves made so far.
    #[must_use]
    pub fn moves(&self) -> usize {
        self.sequence.len() - 1
    }

    /// Total distance of all recorded traversals.
    #[must_use]
    pub fn total_distance(&self, distances: &DistanceMatrix) -> f64 {
        distances.weighted_sum(&self.counts)
    }
}

/// Summary of a finished bout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoutReport {
    /// Completed or Aborted.
    pub outcome: BoutOutcome,
    /// Visited sequence.
    pub sequence: Route,
    /// Traversal counts.
    pub counts: CountMatrix,
    /// Total distance flown.
    pub distance: f64,
}

/// Drives one bout to a terminal state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoutController {
    record: BoutRecord,
    state: BoutState,
}

impl Default for BoutController {
    fn default() -> Self {
        Self {
            record: BoutRecord::new(),
            state: BoutState::AtNest,
        }
    }
}

impl BoutController {
    /// Controller at the nest with an empty record.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current state.
    #[must_use]
    pub const fn state(&self) -> BoutState {
        self.state
    }

    /// Record so far.
    #[must_use]
    pub const fn record(&self) -> &BoutRecord {
        &self.record
    }

    /// Perform one transition. Does nothing once terminal.
    ///
    /// # Errors
    ///
    /// Propagates errors from the destination source.
    pub fn step<S>(&mut self, model: &TransitionModel, source: &mut S) -> TraplineResult<BoutState>
    where
        S: DestinationSource + ?Sized,
    {
        if self.state.is_terminal() {
            return Ok(self.state);
        }

        let next = source.next_destination(model, self.record.location())?;
        self.record.record_move(next);

        self.state = if next.is_nest() {
            BoutState::Aborted
        } else if self.record.unique_count() == SITE_COUNT {
            self.record.record_move(Site::NEST);
            BoutState::Completed
        } else {
            BoutState::Traveling
        };
        Ok(self.state)
    }

    /// Step until terminal and report.
    ///
    /// # Errors
    ///
    /// Propagates errors from the destination source.
    pub fn run<S>(
        mut self,
        model: &TransitionModel,
        source: &mut S,
        distances: &DistanceMatrix,
    ) -> TraplineResult<BoutReport>
    where
        S: DestinationSource + ?Sized,
    {
        while !self.state.is_terminal() {
            self.step(model, source)?;
        }
        let outcome = match self.state {
            BoutState::Completed => BoutOutcome::Completed,
            _ => BoutOutcome::Aborted,
        };
        let distance = self.record.total_distance(distances);
        trace!(?outcome, distance, moves = self.record.moves(), "bout finished");
        Ok(BoutReport {
            outcome,
            distance,
            counts: self.record.counts,
            sequence: self.record.sequence,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::foraging::site::route_from_ids;
    use crate::foraging::transition::InitialStyle;

    fn model() -> TransitionModel {
        TransitionModel::initialize(InitialStyle::FixedAsymmetric, &DistanceMatrix::default())
            .unwrap()
    }

    #[test]
    fn test_scripted_complete_bout() {
        let mut script = ScriptedDestinations::from_ids(&[1, 2, 3, 4, 5]).unwrap();
        let report = BoutController::new()
            .run(&model(), &mut script, &DistanceMatrix::default())
            .unwrap();
        assert_eq!(report.outcome, BoutOutcome::Completed);
        assert_eq!(report.sequence, route_from_ids(&[0, 1, 2, 3, 4, 5, 0]).unwrap());
        assert_eq!(report.distance, 300.0);
        assert_eq!(report.counts[5][0], 1);
        assert_eq!(script.remaining(), 0);
    }

    #[test]
    fn test_scripted_aborted_bout() {
        let mut script = ScriptedDestinations::from_ids(&[1, 0, 2]).unwrap();
        let mut controller = BoutController::new();
        let m = model();
        assert_eq!(controller.state(), BoutState::AtNest);
        assert_eq!(controller.step(&m, &mut script).unwrap(), BoutState::Traveling);
        assert_eq!(controller.step(&m, &mut script).unwrap(), BoutState::Aborted);
        // terminal: no further destination consumed
        assert_eq!(controller.step(&m, &mut script).unwrap(), BoutState::Aborted);
        assert_eq!(script.remaining(), 1);

        let report = controller
            .run(&m, &mut script, &DistanceMatrix::default())
            .unwrap();
        assert_eq!(report.outcome, BoutOutcome::Aborted);
        assert_eq!(report.sequence, route_from_ids(&[0, 1, 0]).unwrap());
        assert_eq!(report.distance, 100.0);
    }

    #[test]
    fn test_revisits_count_twice() {
        // 0→1→2→1→3→4→5→0 walks 1-2 and 2-1
        let mut script = ScriptedDestinations::from_ids(&[1, 2, 1, 3, 4, 5]).unwrap();
        let distances = DistanceMatrix::default();
        let report = BoutController::new()
            .run(&model(), &mut script, &distances)
            .unwrap();
        assert_eq!(report.outcome, BoutOutcome::Completed);
        assert_eq!(report.distance, distances.route_length(&report.sequence));
        assert_eq!(report.distance, 50.0 + 50.0 + 50.0 + 80.0 + 50.0 + 50.0 + 50.0);
    }

    #[test]
    fn test_exhausted_script_is_error() {
        let mut script = ScriptedDestinations::from_ids(&[1, 2]).unwrap();
        let err = BoutController::new()
            .run(&model(), &mut script, &DistanceMatrix::default())
            .unwrap_err();
        assert!(matches!(err, TraplineError::ScriptExhausted { consumed: 2 }));
    }

    #[test]
    fn test_record_unique_count() {
        let mut record = BoutRecord::new();
        assert_eq!(record.unique_count(), 1);
        record.record_move(Site::new(2).unwrap());
        record.record_move(Site::new(3).unwrap());
        record.record_move(Site::new(2).unwrap());
        assert_eq!(record.unique_count(), 3);
        assert_eq!(record.moves(), 3);
        assert_eq!(record.counts()[2][3], 1);
        assert_eq!(record.counts()[3][2], 1);
    }

    #[test]
    fn test_random_bout_terminates() {
        let m = model();
        let mut rng = SimRng::new(42);
        for _ in 0..200 {
            let report = BoutController::new()
                .run(&m, &mut rng, &DistanceMatrix::default())
                .unwrap();
            assert_eq!(report.sequence.first(), Some(&Site::NEST));
            assert_eq!(report.sequence.last(), Some(&Site::NEST));
        }
    }
}
