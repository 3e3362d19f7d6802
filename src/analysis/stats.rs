//! Descriptive statistics over per-run figures.

use serde::{Deserialize, Serialize};

/// Mean and median of a sample; both `None` when the sample is empty.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Statistic {
    /// Sample size.
    pub count: usize,
    /// Arithmetic mean.
    pub mean: Option<f64>,
    /// Median (mean of the two middle values for even sizes).
    pub median: Option<f64>,
}

impl Statistic {
    /// Describe `samples`.
    #[must_use]
    pub fn from_samples(samples: &[f64]) -> Self {
        Self {
            count: samples.len(),
            mean: mean(samples),
            median: median(samples),
        }
    }
}

/// Arithmetic mean, `None` for an empty slice.
#[must_use]
pub fn mean(samples: &[f64]) -> Option<f64> {
    if samples.is_empty() {
        None
    } else {
        Some(samples.iter().sum::<f64>() / samples.len() as f64)
    }
}

/// Median, `None` for an empty slice.
#[must_use]
pub fn median(samples: &[f64]) -> Option<f64> {
    if samples.is_empty() {
        return None;
    }
    let mut sorted = samples.to_vec();
    sorted.sort_by(f64::total_cmp);
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        Some((sorted[mid - 1] + sorted[mid]) / 2.0)
    } else {
        Some(sorted[mid])
    }
}
