//! Convergence analysis across independent runs.
//!
//! Measures how quickly the optimal trapline first appears, when it becomes
//! stable (three identical optimal bouts in a row), how many distinct routes a
//! run explores, and how bout distances fall from the first to the last
//! quarter of a run.

pub mod stats;

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

pub use stats::Statistic;

use crate::error::{TraplineError, TraplineResult};
use crate::foraging::distance::DistanceMatrix;
use crate::foraging::run::RunOutput;
use crate::foraging::site::{format_route, Route, Site, SITE_COUNT};

/// Convergence figures of one run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunConvergence {
    /// 1-based bout at which an optimal route first appeared.
    pub bouts_to_first_optimum: Option<usize>,
    /// Bout count at which an optimal route had been flown three times in a row.
    pub bouts_to_stable_optimum: Option<usize>,
    /// Distinct routes flown.
    pub unique_routes: usize,
    /// Mean distance over all bouts.
    pub mean_distance: Option<f64>,
    /// Mean distance over the first quarter of the bouts.
    pub first_quarter_distance: Option<f64>,
    /// Mean distance over the fourth quarter of the bouts.
    pub fourth_quarter_distance: Option<f64>,
}

/// Aggregate convergence statistics over all runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConvergenceSummary {
    /// Number of runs analysed.
    pub runs: usize,
    /// Runs that flew an optimal route at least once.
    pub runs_reaching_optimum: usize,
    /// Runs that reached a stable optimum.
    pub runs_reaching_stable_optimum: usize,
    /// Bouts to first optimum (runs that never got there are omitted).
    pub bouts_to_first_optimum: Statistic,
    /// Bouts to stable optimum (runs that never got there are omitted).
    pub bouts_to_stable_optimum: Statistic,
    /// Distinct routes per run.
    pub unique_routes: Statistic,
    /// Per-run mean distance.
    pub mean_distance: Statistic,
    /// Per-run mean distance over the first quarter.
    pub first_quarter_distance: Statistic,
    /// Per-run mean distance over the fourth quarter.
    pub fourth_quarter_distance: Statistic,
}

/// Compares run histories against a known set of optimal routes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConvergenceAnalyzer {
    optimal_routes: Vec<Route>,
}

impl ConvergenceAnalyzer {
    /// Analyzer with an explicit optimal route set.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the set is empty or a route is not a
    /// nest-to-nest cycle visiting every flower exactly once.
    pub fn new(optimal_routes: Vec<Route>) -> TraplineResult<Self> {
        if optimal_routes.is_empty() {
            return Err(TraplineError::config("optimal route set is empty"));
        }
        for route in &optimal_routes {
            check_cycle(route)?;
        }
        Ok(Self { optimal_routes })
    }

    /// Analyzer whose optimal routes are found by exhaustive search.
    #[must_use]
    pub fn from_distances(distances: &DistanceMatrix) -> Self {
        let (_, optimal_routes) = distances.shortest_cycles();
        Self { optimal_routes }
    }

    /// The optimal routes.
    #[must_use]
    pub fn optimal_routes(&self) -> &[Route] {
        &self.optimal_routes
    }

    /// Whether `route` is one of the optimal routes.
    #[must_use]
    pub fn is_optimal(&self, route: &[Site]) -> bool {
        self.optimal_routes.iter().any(|r| r.as_slice() == route)
    }

    /// 1-based index of the first optimal bout.
    #[must_use]
    pub fn bouts_to_first_optimum(&self, routes: &[Route]) -> Option<usize> {
        routes
            .iter()
            .position(|r| self.is_optimal(r))
            .map(|i| i + 1)
    }

    /// Smallest `b >= 2` with bouts `b-2..=b` identical and optimal, reported
    /// as `b - 1`.
    #[must_use]
    pub fn bouts_to_stable_optimum(&self, routes: &[Route]) -> Option<usize> {
        (2..routes.len())
            .find(|&b| {
                routes[b] == routes[b - 1] && routes[b] == routes[b - 2] && self.is_optimal(&routes[b])
            })
            .map(|b| b - 1)
    }

    /// Number of distinct routes.
    #[must_use]
    pub fn unique_route_count(routes: &[Route]) -> usize {
        routes.iter().collect::<HashSet<_>>().len()
    }

    /// Convergence figures of one run.
    #[must_use]
    pub fn analyze_run(&self, run: &RunOutput) -> RunConvergence {
        let quarter = run.distances.len() / 4;
        RunConvergence {
            bouts_to_first_optimum: self.bouts_to_first_optimum(&run.routes),
            bouts_to_stable_optimum: self.bouts_to_stable_optimum(&run.routes),
            unique_routes: Self::unique_route_count(&run.routes),
            mean_distance: stats::mean(&run.distances),
            first_quarter_distance: stats::mean(&run.distances[..quarter]),
            fourth_quarter_distance: stats::mean(&run.distances[3 * quarter..]),
        }
    }

    /// Aggregate statistics over `runs`.
    #[must_use]
    pub fn summarize(&self, runs: &[RunOutput]) -> ConvergenceSummary {
        let per_run: Vec<RunConvergence> = runs.iter().map(|r| self.analyze_run(r)).collect();

        let collect = |f: fn(&RunConvergence) -> Option<f64>| -> Vec<f64> {
            per_run.iter().filter_map(f).collect()
        };
        let first = collect(|r| r.bouts_to_first_optimum.map(|b| b as f64));
        let stable = collect(|r| r.bouts_to_stable_optimum.map(|b| b as f64));

        ConvergenceSummary {
            runs: runs.len(),
            runs_reaching_optimum: first.len(),
            runs_reaching_stable_optimum: stable.len(),
            bouts_to_first_optimum: Statistic::from_samples(&first),
            bouts_to_stable_optimum: Statistic::from_samples(&stable),
            unique_routes: Statistic::from_samples(&collect(|r| Some(r.unique_routes as f64))),
            mean_distance: Statistic::from_samples(&collect(|r| r.mean_distance)),
            first_quarter_distance: Statistic::from_samples(&collect(|r| {
                r.first_quarter_distance
            })),
            fourth_quarter_distance: Statistic::from_samples(&collect(|r| {
                r.fourth_quarter_distance
            })),
        }
    }

    /// Mean distance at each bout index across runs.
    ///
    /// Runs shorter than the longest one simply stop contributing.
    #[must_use]
    pub fn distance_curve(runs: &[RunOutput]) -> Vec<f64> {
        let longest = runs.iter().map(|r| r.distances.len()).max().unwrap_or(0);
        (0..longest)
            .filter_map(|b| {
                let column: Vec<f64> = runs
                    .iter()
                    .filter_map(|r| r.distances.get(b).copied())
                    .collect();
                stats::mean(&column)
            })
            .collect()
    }
}

/// Nest-to-nest cycle visiting every flower exactly once.
fn check_cycle(route: &[Site]) -> TraplineResult<()> {
    let valid = route.len() == SITE_COUNT + 1
        && route.first() == Some(&Site::NEST)
        && route.last() == Some(&Site::NEST)
        && route[1..SITE_COUNT]
            .iter()
            .collect::<HashSet<_>>()
            .len()
            == SITE_COUNT - 1
        && route[1..SITE_COUNT].iter().all(|s| !s.is_nest());
    if valid {
        Ok(())
    } else {
        Err(TraplineError::config(format!(
            "optimal route {} is not a nest cycle through all flowers",
            format_route(route)
        )))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::foraging::bout::BoutOutcome;
    use crate::foraging::site::route_from_ids;

    const FORWARD: [usize; 7] = [0, 1, 2, 3, 4, 5, 0];
    const BACKWARD: [usize; 7] = [0, 5, 4, 3, 2, 1, 0];
    const OTHER: [usize; 7] = [0, 1, 5, 4, 3, 2, 0];
    const ABORTED: [usize; 3] = [0, 1, 0];

    fn routes(ids: &[&[usize]]) -> Vec<Route> {
        ids.iter().map(|r| route_from_ids(r).unwrap()).collect()
    }

    fn run_of(ids: &[&[usize]], distances: Vec<f64>) -> RunOutput {
        let routes = routes(ids);
        RunOutput {
            outcomes: vec![BoutOutcome::Completed; routes.len()],
            reinforcements: vec![None; routes.len()],
            routes,
            distances,
            min_distance: None,
        }
    }

    fn analyzer() -> ConvergenceAnalyzer {
        ConvergenceAnalyzer::from_distances(&DistanceMatrix::default())
    }

    #[test]
    fn test_default_optimal_routes() {
        let a = analyzer();
        assert_eq!(a.optimal_routes(), routes(&[&FORWARD, &BACKWARD]).as_slice());
        assert!(a.is_optimal(&route_from_ids(&BACKWARD).unwrap()));
        assert!(!a.is_optimal(&route_from_ids(&OTHER).unwrap()));
    }

    #[test]
    fn test_explicit_routes_validated() {
        assert!(ConvergenceAnalyzer::new(routes(&[&FORWARD])).is_ok());
        assert!(ConvergenceAnalyzer::new(Vec::new()).is_err());
        assert!(ConvergenceAnalyzer::new(routes(&[&ABORTED])).is_err());
        assert!(ConvergenceAnalyzer::new(routes(&[&[0, 1, 1, 3, 4, 5, 0]])).is_err());
    }

    #[test]
    fn test_first_optimum_is_earliest_of_either() {
        let a = analyzer();
        let history = routes(&[&ABORTED, &OTHER, &BACKWARD, &FORWARD]);
        assert_eq!(a.bouts_to_first_optimum(&history), Some(3));
        assert_eq!(a.bouts_to_first_optimum(&routes(&[&OTHER, &ABORTED])), None);
    }

    #[test]
    fn test_stable_optimum() {
        let a = analyzer();
        // bouts 2,3,4 (0-based) are identical optimal routes: b = 4, report 3
        let history = routes(&[&OTHER, &FORWARD, &BACKWARD, &BACKWARD, &BACKWARD, &FORWARD]);
        assert_eq!(a.bouts_to_stable_optimum(&history), Some(3));

        // three identical non-optimal routes do not count
        let history = routes(&[&OTHER, &OTHER, &OTHER, &FORWARD, &FORWARD]);
        assert_eq!(a.bouts_to_stable_optimum(&history), None);

        // alternating directions never stabilise
        let history = routes(&[&FORWARD, &BACKWARD, &FORWARD, &BACKWARD]);
        assert_eq!(a.bouts_to_stable_optimum(&history), None);

        let history = routes(&[&FORWARD, &FORWARD, &FORWARD]);
        assert_eq!(a.bouts_to_stable_optimum(&history), Some(1));
    }

    #[test]
    fn test_unique_routes() {
        let history = routes(&[&FORWARD, &ABORTED, &FORWARD, &OTHER, &ABORTED]);
        assert_eq!(ConvergenceAnalyzer::unique_route_count(&history), 3);
    }

    #[test]
    fn test_analyze_run_quarters() {
        let ids: Vec<&[usize]> = vec![&OTHER[..]; 8];
        let run = run_of(&ids, vec![400.0, 600.0, 350.0, 350.0, 300.0, 300.0, 300.0, 320.0]);
        let conv = analyzer().analyze_run(&run);
        assert_eq!(conv.first_quarter_distance, Some(500.0));
        assert_eq!(conv.fourth_quarter_distance, Some(310.0));
        assert_eq!(conv.mean_distance, Some(365.0));
        assert_eq!(conv.unique_routes, 1);
    }

    #[test]
    fn test_short_run_has_no_first_quarter() {
        let run = run_of(&[&FORWARD, &FORWARD], vec![300.0, 300.0]);
        let conv = analyzer().analyze_run(&run);
        assert_eq!(conv.first_quarter_distance, None);
        assert_eq!(conv.fourth_quarter_distance, Some(300.0));
    }

    #[test]
    fn test_summarize_omits_runs_without_optimum() {
        let a = analyzer();
        let runs = vec![
            run_of(&[&OTHER, &FORWARD, &FORWARD, &FORWARD], vec![350.0, 300.0, 300.0, 300.0]),
            run_of(&[&OTHER, &OTHER, &OTHER, &OTHER], vec![350.0; 4]),
            run_of(&[&BACKWARD, &OTHER, &OTHER, &OTHER], vec![300.0, 350.0, 350.0, 350.0]),
        ];
        let summary = a.summarize(&runs);
        assert_eq!(summary.runs, 3);
        assert_eq!(summary.runs_reaching_optimum, 2);
        assert_eq!(summary.runs_reaching_stable_optimum, 1);
        assert_eq!(summary.bouts_to_first_optimum.mean, Some(1.5));
        assert_eq!(summary.bouts_to_stable_optimum.median, Some(2.0));
        assert_eq!(summary.unique_routes.count, 3);
        assert_eq!(summary.unique_routes.mean, Some(5.0 / 3.0));
    }

    #[test]
    fn test_distance_curve() {
        let runs = vec![
            run_of(&[&OTHER, &FORWARD], vec![350.0, 300.0]),
            run_of(&[&OTHER, &OTHER, &OTHER], vec![450.0, 350.0, 350.0]),
        ];
        assert_eq!(
            ConvergenceAnalyzer::distance_curve(&runs),
            vec![400.0, 325.0, 350.0]
        );
        assert!(ConvergenceAnalyzer::distance_curve(&[]).is_empty());
    }
}
