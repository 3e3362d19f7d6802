//! Transition model: the forager's row-stochastic movement preferences.
//!
//! Row `i` holds the probability of flying from site `i` to each other site.
//! The model owns its matrix exclusively; callers only ever receive copies.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::distance::DistanceMatrix;
use super::site::{Site, SITE_COUNT};
use crate::engine::jidoka::DistributionGuard;
use crate::engine::rng::SimRng;
use crate::error::{TraplineError, TraplineResult};

/// A 6×6 probability (or weight) table.
pub type ProbabilityMatrix = [[f64; SITE_COUNT]; SITE_COUNT];

/// Per-bout traversal counts, `[from][to]`.
pub type CountMatrix = [[u32; SITE_COUNT]; SITE_COUNT];

/// Hand-set starting weights (Lihoreau 2012): flower rows weigh the
/// preferred neighbours 0.6 and the rest 0.1; the nest row splits 0.8/0.2
/// between the two flowers next to it.
pub const FIXED_ASYMMETRIC_WEIGHTS: ProbabilityMatrix = [
    [0.0, 0.8, 0.0, 0.0, 0.0, 0.2],
    [0.6, 0.0, 0.6, 0.1, 0.1, 0.6],
    [0.1, 0.6, 0.0, 0.6, 0.1, 0.1],
    [0.1, 0.1, 0.6, 0.0, 0.6, 0.1],
    [0.1, 0.1, 0.1, 0.6, 0.0, 0.6],
    [0.6, 0.6, 0.1, 0.1, 0.6, 0.0],
];

/// How the initial transition matrix is built.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum InitialStyle {
    /// [`FIXED_ASYMMETRIC_WEIGHTS`], normalized.
    #[default]
    FixedAsymmetric,
    /// Cell `(i, j)` = `Σ_k d(i,k)² − d(i,j)²`, normalized: nearer sites are
    /// more likely.
    DistanceWeighted,
}

/// Row-stochastic transition model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransitionModel {
    probabilities: ProbabilityMatrix,
    #[serde(default)]
    guard: DistributionGuard,
}

impl TransitionModel {
    /// Build the initial model for `style`.
    ///
    /// # Errors
    ///
    /// Returns `ZeroProbabilityRow` if a row cannot be normalized (for
    /// example a distance-weighted row on a degenerate map).
    pub fn initialize(style: InitialStyle, distances: &DistanceMatrix) -> TraplineResult<Self> {
        let weights = match style {
            InitialStyle::FixedAsymmetric => FIXED_ASYMMETRIC_WEIGHTS,
            InitialStyle::DistanceWeighted => distance_weights(distances),
        };
        Self::from_weights(weights)
    }

    /// Build a model from raw non-negative weights, normalizing each row.
    ///
    /// # Errors
    ///
    /// Returns a configuration error for negative, non-finite or self
    /// transition weights, and `ZeroProbabilityRow` for an all-zero row.
    pub fn from_weights(weights: ProbabilityMatrix) -> TraplineResult<Self> {
        for (i, row) in weights.iter().enumerate() {
            if let Some((j, w)) = row
                .iter()
                .enumerate()
                .find(|(_, w)| !w.is_finite() || **w < 0.0)
            {
                return Err(TraplineError::config(format!(
                    "transition weight [{i}][{j}] = {w} must be finite and non-negative"
                )));
            }
            if row[i] != 0.0 {
                return Err(TraplineError::config(format!(
                    "self-transition weight [{i}][{i}] must be zero"
                )));
            }
        }
        let mut probabilities = weights;
        normalize_rows(&mut probabilities).map_err(|row| TraplineError::ZeroProbabilityRow { row })?;
        Ok(Self {
            probabilities,
            guard: DistributionGuard::default(),
        })
    }

    /// Replace the guard used before sampling.
    #[must_use]
    pub const fn with_guard(mut self, guard: DistributionGuard) -> Self {
        self.guard = guard;
        self
    }

    /// Divide each row by its L1 sum.
    ///
    /// # Errors
    ///
    /// Returns `InvalidDistribution` if a row sums to zero.
    pub fn normalize(&mut self) -> TraplineResult<()> {
        normalize_rows(&mut self.probabilities)
            .map_err(|row| TraplineError::invalid_distribution(row, "row sums to zero"))
    }

    /// Draw the next site from the row of `current`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidDistribution` if the row is not a probability
    /// distribution (see [`DistributionGuard`]).
    pub fn sample(&self, current: Site, rng: &mut SimRng) -> TraplineResult<Site> {
        let row = &self.probabilities[current.index()];
        self.guard.check_row(current.index(), row)?;

        let u = rng.gen_f64();
        let mut cumulative = 0.0;
        let mut last_positive = None;
        for (j, &p) in row.iter().enumerate() {
            if p <= 0.0 {
                continue;
            }
            cumulative += p;
            last_positive = Some(j);
            if u < cumulative {
                return Site::new(j);
            }
        }
        // u fell in the rounding gap above the cumulative sum
        match last_positive {
            Some(j) => Site::new(j),
            None => Err(TraplineError::invalid_distribution(
                current.index(),
                "no positive weight",
            )),
        }
    }

    /// Scale every traversed edge by `count * factor`, then renormalize.
    ///
    /// Untouched edges keep multiplier 1, as does any edge whose product is
    /// exactly zero. A negative `factor` is applied as is.
    ///
    /// # Errors
    ///
    /// Returns `InvalidDistribution` if a row collapses to zero.
    pub fn reinforce(&mut self, counts: &CountMatrix, factor: f64) -> TraplineResult<()> {
        for (row, count_row) in self.probabilities.iter_mut().zip(counts.iter()) {
            for (p, &n) in row.iter_mut().zip(count_row.iter()) {
                *p *= edge_multiplier(n, factor);
            }
        }
        debug!(factor, "reinforced transition matrix");
        self.normalize()
    }

    /// Probability of moving `from` → `to`.
    #[must_use]
    pub const fn probability(&self, from: Site, to: Site) -> f64 {
        self.probabilities[from.index()][to.index()]
    }

    /// Copy of one row.
    #[must_use]
    pub const fn row(&self, from: Site) -> [f64; SITE_COUNT] {
        self.probabilities[from.index()]
    }

    /// Copy of the whole matrix.
    #[must_use]
    pub const fn matrix(&self) -> ProbabilityMatrix {
        self.probabilities
    }
}

/// Multiplier applied to an edge traversed `count` times.
#[must_use]
pub fn edge_multiplier(count: u32, factor: f64) -> f64 {
    if count == 0 {
        return 1.0;
    }
    let m = f64::from(count) * factor;
    if m == 0.0 {
        1.0
    } else {
        m
    }
}

/// Squared-distance weights for [`InitialStyle::DistanceWeighted`].
fn distance_weights(distances: &DistanceMatrix) -> ProbabilityMatrix {
    let mut weights = [[0.0; SITE_COUNT]; SITE_COUNT];
    for from in Site::all() {
        let squared = distances.row(from).map(|d| d * d);
        let total: f64 = squared.iter().sum();
        for (j, w) in weights[from.index()].iter_mut().enumerate() {
            if j != from.index() {
                *w = total - squared[j];
            }
        }
    }
    weights
}

/// L1-normalize every row in place; `Err(row)` for the first zero row.
fn normalize_rows(matrix: &mut ProbabilityMatrix) -> Result<(), usize> {
    for (i, row) in matrix.iter_mut().enumerate() {
        let l1: f64 = row.iter().map(|p| p.abs()).sum();
        if l1 == 0.0 {
            return Err(i);
        }
        row.iter_mut().for_each(|p| *p /= l1);
    }
    Ok(())
}
