//! Jidoka (自働化) - stop-the-line checks on transition distributions.
//!
//! A transition row is only sampled if it is a genuine probability
//! distribution. Anything else halts the run with
//! [`TraplineError::InvalidDistribution`] instead of silently drawing from a
//! corrupted row.
//!
//! # Anomaly Types
//!
//! 1. **Non-finite weights**: NaN or Inf in the row
//! 2. **Negative weights**: produced by reinforcement with a negative factor
//! 3. **Sum drift**: the row no longer sums to 1 within tolerance
//!
//! # Severity Levels
//!
//! - **Acceptable**: within tolerance, continue normally
//! - **Warning**: sum drift above `warning_fraction * tolerance`, log and continue
//! - **Critical**: tolerance exceeded or a negative weight, stop the line
//! - **Fatal**: non-finite weight, halt immediately

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{TraplineError, TraplineResult};

/// Default tolerance on `|row sum - 1|`.
pub const DEFAULT_ROW_TOLERANCE: f64 = 1e-9;

/// Severity levels for a row inspection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ViolationSeverity {
    /// Acceptable variance within tolerance (continue).
    Acceptable,
    /// Approaching tolerance boundary (log, continue).
    Warning,
    /// Tolerance exceeded (stop the line).
    Critical,
    /// Unrecoverable state (halt immediately).
    Fatal,
}

/// Guard configuration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GuardConfig {
    /// Maximum allowed `|row sum - 1|`.
    pub tolerance: f64,
    /// Warn when drift exceeds this fraction of `tolerance`.
    pub warning_fraction: f64,
}

impl Default for GuardConfig {
    fn default() -> Self {
        Self {
            tolerance: DEFAULT_ROW_TOLERANCE,
            warning_fraction: 0.8,
        }
    }
}

/// Inspects transition rows before they are sampled.
///
/// # Example
///
/// ```rust
/// use trapline::engine::jidoka::{DistributionGuard, ViolationSeverity};
///
/// let guard = DistributionGuard::default();
/// let row = [0.0, 0.5, 0.25, 0.25, 0.0, 0.0];
/// assert_eq!(guard.classify(&row), ViolationSeverity::Acceptable);
/// assert!(guard.check_row(0, &row).is_ok());
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct DistributionGuard {
    config: GuardConfig,
}

impl DistributionGuard {
    /// Create a guard with the given configuration.
    #[must_use]
    pub const fn new(config: GuardConfig) -> Self {
        Self { config }
    }

    /// Get current configuration.
    #[must_use]
    pub const fn config(&self) -> &GuardConfig {
        &self.config
    }

    /// Classify a row without failing.
    #[must_use]
    pub fn classify(&self, row: &[f64]) -> ViolationSeverity {
        if row.iter().any(|w| !w.is_finite()) {
            return ViolationSeverity::Fatal;
        }
        if row.iter().any(|&w| w < 0.0) {
            return ViolationSeverity::Critical;
        }
        let drift = (row.iter().sum::<f64>() - 1.0).abs();
        if drift > self.config.tolerance {
            ViolationSeverity::Critical
        } else if drift > self.config.tolerance * self.config.warning_fraction {
            ViolationSeverity::Warning
        } else {
            ViolationSeverity::Acceptable
        }
    }

    /// Check that `row` (the outgoing distribution of site `index`) can be
    /// sampled.
    ///
    /// # Errors
    ///
    /// Returns `InvalidDistribution` for Critical or Fatal rows.
    pub fn check_row(&self, index: usize, row: &[f64]) -> TraplineResult<()> {
        match self.classify(row) {
            ViolationSeverity::Acceptable => Ok(()),
            ViolationSeverity::Warning => {
                warn!(
                    row = index,
                    sum = row.iter().sum::<f64>(),
                    "transition row approaching tolerance"
                );
                Ok(())
            }
            ViolationSeverity::Critical | ViolationSeverity::Fatal => {
                Err(TraplineError::invalid_distribution(index, describe(row)))
            }
        }
    }
}

/// First reason a row is unusable, for the error message.
fn describe(row: &[f64]) -> String {
    if let Some((col, w)) = row.iter().enumerate().find(|(_, w)| !w.is_finite()) {
        return format!("non-finite weight {w} at column {col}");
    }
    if let Some((col, w)) = row.iter().enumerate().find(|(_, &w)| w < 0.0) {
        return format!("negative weight {w} at column {col}");
    }
    format!("weights sum to {}", row.iter().sum::<f64>())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_row_passes() {
        let guard = DistributionGuard::default();
        let row = [0.0, 0.2, 0.2, 0.2, 0.2, 0.2];
        assert_eq!(guard.classify(&row), ViolationSeverity::Acceptable);
        assert!(guard.check_row(0, &row).is_ok());
    }

    #[test]
    fn test_nan_is_fatal() {
        let guard = DistributionGuard::default();
        let row = [0.0, f64::NAN, 0.5, 0.5, 0.0, 0.0];
        assert_eq!(guard.classify(&row), ViolationSeverity::Fatal);
        let err = guard.check_row(1, &row).unwrap_err();
        assert!(err.to_string().contains("non-finite"));
    }

    #[test]
    fn test_negative_weight_is_critical() {
        // L1-normalized row with a negative cell: |.| sums to 1, signed sum does not
        let row = [0.0, -0.25, 0.25, 0.25, 0.25, 0.0];
        let guard = DistributionGuard::default();
        assert_eq!(guard.classify(&row), ViolationSeverity::Critical);
        let err = guard.check_row(3, &row).unwrap_err();
        assert!(matches!(err, TraplineError::InvalidDistribution { row: 3, .. }));
        assert!(err.to_string().contains("negative weight"));
    }

    #[test]
    fn test_sum_drift_is_critical() {
        let guard = DistributionGuard::default();
        let row = [0.0, 0.3, 0.3, 0.3, 0.0, 0.0];
        assert_eq!(guard.classify(&row), ViolationSeverity::Critical);
        assert!(guard.check_row(0, &row).unwrap_err().to_string().contains("sum to"));
    }

    #[test]
    fn test_warning_band_still_passes() {
        let guard = DistributionGuard::new(GuardConfig {
            tolerance: 1e-3,
            warning_fraction: 0.5,
        });
        let row = [0.0, 0.5, 0.5009, 0.0, 0.0, 0.0];
        assert_eq!(guard.classify(&row), ViolationSeverity::Warning);
        assert!(guard.check_row(0, &row).is_ok());
    }

    #[test]
    fn test_severity_ordering() {
        assert!(ViolationSeverity::Acceptable < ViolationSeverity::Warning);
        assert!(ViolationSeverity::Warning < ViolationSeverity::Critical);
        assert!(ViolationSeverity::Critical < ViolationSeverity::Fatal);
    }
}
