//! Static distance map between the nest and the five flowers.

use serde::{Deserialize, Serialize};

use super::site::{Route, Site, SITE_COUNT};
use crate::error::{TraplineError, TraplineResult};

/// Tolerance when comparing cycle lengths during exhaustive search.
const LENGTH_TOLERANCE: f64 = 1e-9;

/// Default landscape.
///
/// ```text
///        0    1    2    3    4    5
///  0  [  0,  50, 100, 120, 100,  50]   nest
///  1  [ 50,   0,  50,  80,  80,  50]
///  2  [100,  50,   0,  50,  80,  80]
///  3  [120,  80,  50,   0,  50,  80]
///  4  [100,  80,  80,  50,   0,  50]
///  5  [ 50,  50,  80,  80,  50,   0]
/// ```
pub const DEFAULT_DISTANCES: [[f64; SITE_COUNT]; SITE_COUNT] = [
    [0.0, 50.0, 100.0, 120.0, 100.0, 50.0],
    [50.0, 0.0, 50.0, 80.0, 80.0, 50.0],
    [100.0, 50.0, 0.0, 50.0, 80.0, 80.0],
    [120.0, 80.0, 50.0, 0.0, 50.0, 80.0],
    [100.0, 80.0, 80.0, 50.0, 0.0, 50.0],
    [50.0, 50.0, 80.0, 80.0, 50.0, 0.0],
];

/// Immutable, validated 6×6 distance table.
///
/// Invariants: symmetric, zero diagonal, finite and non-negative.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Vec<f64>>", into = "Vec<Vec<f64>>")]
pub struct DistanceMatrix {
    cells: [[f64; SITE_COUNT]; SITE_COUNT],
}

impl Default for DistanceMatrix {
    fn default() -> Self {
        Self {
            cells: DEFAULT_DISTANCES,
        }
    }
}

impl DistanceMatrix {
    /// Build from a fixed-size table.
    ///
    /// # Errors
    ///
    /// Returns `InvalidDistanceMatrix` if the table breaks an invariant.
    #[allow(clippy::float_cmp)]
    pub fn from_array(cells: [[f64; SITE_COUNT]; SITE_COUNT]) -> TraplineResult<Self> {
        for (i, row) in cells.iter().enumerate() {
            for (j, &d) in row.iter().enumerate() {
                if !d.is_finite() {
                    return Err(TraplineError::distance_matrix(format!(
                        "d[{i}][{j}] = {d} is not finite"
                    )));
                }
                if d < 0.0 {
                    return Err(TraplineError::distance_matrix(format!(
                        "d[{i}][{j}] = {d} is negative"
                    )));
                }
                if d != cells[j][i] {
                    return Err(TraplineError::distance_matrix(format!(
                        "not symmetric: d[{i}][{j}] = {d}, d[{j}][{i}] = {}",
                        cells[j][i]
                    )));
                }
            }
            if row[i] != 0.0 {
                return Err(TraplineError::distance_matrix(format!(
                    "diagonal d[{i}][{i}] = {} must be zero",
                    row[i]
                )));
            }
        }
        Ok(Self { cells })
    }

    /// Build from nested rows, as read from configuration.
    ///
    /// # Errors
    ///
    /// Returns `InvalidDistanceMatrix` if the table is not 6×6 or breaks an
    /// invariant.
    pub fn from_rows(rows: &[Vec<f64>]) -> TraplineResult<Self> {
        if rows.len() != SITE_COUNT {
            return Err(TraplineError::distance_matrix(format!(
                "expected {SITE_COUNT} rows, got {}",
                rows.len()
            )));
        }
        let mut cells = [[0.0; SITE_COUNT]; SITE_COUNT];
        for (i, row) in rows.iter().enumerate() {
            if row.len() != SITE_COUNT {
                return Err(TraplineError::distance_matrix(format!(
                    "row {i} has {} columns, expected {SITE_COUNT}",
                    row.len()
                )));
            }
            cells[i].copy_from_slice(row);
        }
        Self::from_array(cells)
    }

    /// Distance between two sites.
    #[must_use]
    pub const fn get(&self, from: Site, to: Site) -> f64 {
        self.cells[from.index()][to.index()]
    }

    /// Copy of the underlying table.
    #[must_use]
    pub const fn to_array(&self) -> [[f64; SITE_COUNT]; SITE_COUNT] {
        self.cells
    }

    /// Copy of one row.
    #[must_use]
    pub const fn row(&self, from: Site) -> [f64; SITE_COUNT] {
        self.cells[from.index()]
    }

    /// Every distance divided by `divisor`.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if `divisor` is not a positive finite
    /// number.
    pub fn scaled(&self, divisor: f64) -> TraplineResult<Self> {
        if !(divisor.is_finite() && divisor > 0.0) {
            return Err(TraplineError::config(format!(
                "distance scale must be positive and finite, got {divisor}"
            )));
        }
        let mut cells = self.cells;
        cells
            .iter_mut()
            .flatten()
            .for_each(|d| *d /= divisor);
        Ok(Self { cells })
    }

    /// Total length walked along `route` (sum over consecutive pairs).
    #[must_use]
    pub fn route_length(&self, route: &[Site]) -> f64 {
        route
            .windows(2)
            .map(|pair| self.get(pair[0], pair[1]))
            .sum()
    }

    /// Sum of `distance ⊙ counts`; an edge walked twice costs twice.
    #[must_use]
    pub fn weighted_sum(&self, counts: &[[u32; SITE_COUNT]; SITE_COUNT]) -> f64 {
        self.cells
            .iter()
            .flatten()
            .zip(counts.iter().flatten())
            .map(|(&d, &n)| d * f64::from(n))
            .sum()
    }

    /// Shortest nest-to-nest cycles through all five flowers.
    ///
    /// Exhaustive search over the 120 flower orderings. Returns the minimum
    /// length and every cycle within tolerance of it, in lexicographic order
    /// (both directions of a symmetric cycle are returned).
    #[must_use]
    pub fn shortest_cycles(&self) -> (f64, Vec<Route>) {
        let mut flowers: Vec<Site> = Site::flowers().collect();
        let mut cycles = Vec::new();
        permute(&mut flowers, 0, &mut cycles);
        cycles.sort();

        let mut best = f64::INFINITY;
        let mut optimal: Vec<Route> = Vec::new();
        for cycle in cycles {
            let length = self.route_length(&cycle);
            if length < best - LENGTH_TOLERANCE {
                best = length;
                optimal.clear();
                optimal.push(cycle);
            } else if (length - best).abs() <= LENGTH_TOLERANCE {
                optimal.push(cycle);
            }
        }
        (best, optimal)
    }
}

/// Collect every ordering of `items[k..]` as a closed nest cycle.
fn permute(items: &mut [Site], k: usize, out: &mut Vec<Route>) {
    if k == items.len() {
        let mut route = Vec::with_capacity(items.len() + 2);
        route.push(Site::NEST);
        route.extend_from_slice(items);
        route.push(Site::NEST);
        out.push(route);
        return;
    }
    for i in k..items.len() {
        items.swap(k, i);
        permute(items, k + 1, out);
        items.swap(k, i);
    }
}

impl TryFrom<Vec<Vec<f64>>> for DistanceMatrix {
    type Error = TraplineError;

    fn try_from(rows: Vec<Vec<f64>>) -> Result<Self, Self::Error> {
        Self::from_rows(&rows)
    }
}

impl From<DistanceMatrix> for Vec<Vec<f64>> {
    fn from(matrix: DistanceMatrix) -> Self {
        matrix.cells.iter().map(|row| row.to_vec()).collect()
    }
}
