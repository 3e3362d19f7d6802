//! Error types for trapline.
//!
//! All fallible operations return `Result<T, TraplineError>` instead of
//! panicking. Configuration problems are reported at construction time;
//! distribution problems are reported at the moment a bad row is sampled.

use thiserror::Error;

/// Result type alias for trapline operations.
pub type TraplineResult<T> = Result<T, TraplineError>;

/// Unified error type for all trapline operations.
#[derive(Debug, Error)]
pub enum TraplineError {
    // ===== Configuration Errors =====
    /// Invalid configuration parameter.
    #[error("Configuration error: {message}")]
    Config {
        /// Description of the configuration error.
        message: String,
    },

    /// Distance matrix rejected at construction.
    #[error("Invalid distance matrix: {message}")]
    InvalidDistanceMatrix {
        /// What is wrong with the matrix.
        message: String,
    },

    /// A probability row summed to exactly zero before normalization.
    #[error("Probability row {row} sums to zero and cannot be normalized")]
    ZeroProbabilityRow {
        /// Index of the offending row (source site).
        row: usize,
    },

    /// Site identifier outside `0..6`.
    #[error("Site id {0} is out of range (expected 0..=5)")]
    InvalidSite(usize),

    /// YAML parsing error.
    #[error("YAML parsing error: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    /// Validation error.
    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),

    // ===== Runtime Errors =====
    /// A transition row is not a usable probability distribution.
    #[error("Jidoka: invalid distribution in row {row}: {reason}")]
    InvalidDistribution {
        /// Source site whose row failed the check.
        row: usize,
        /// Human readable reason.
        reason: String,
    },

    /// A scripted destination source ran out of destinations.
    #[error("Destination script exhausted after {consumed} moves")]
    ScriptExhausted {
        /// Number of destinations already consumed.
        consumed: usize,
    },

    /// A run failed; wraps the underlying error with the run index.
    #[error("Run {run} failed: {source}")]
    RunFailed {
        /// Zero-based run index.
        run: usize,
        /// Underlying cause.
        #[source]
        source: Box<TraplineError>,
    },

    // ===== I/O Errors =====
    /// File I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl TraplineError {
    /// Create a configuration error with a message.
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a distance matrix error.
    #[must_use]
    pub fn distance_matrix(message: impl Into<String>) -> Self {
        Self::InvalidDistanceMatrix {
            message: message.into(),
        }
    }

    /// Create an invalid distribution error for `row`.
    #[must_use]
    pub fn invalid_distribution(row: usize, reason: impl Into<String>) -> Self {
        Self::InvalidDistribution {
            row,
            reason: reason.into(),
        }
    }

    /// Create a serialization error.
    #[must_use]
    pub fn serialization(message: impl Into<String>) -> Self {
        Self::Serialization(message.into())
    }

    /// Attach a run index to an error raised inside that run.
    #[must_use]
    pub fn in_run(self, run: usize) -> Self {
        Self::RunFailed {
            run,
            source: Box::new(self),
        }
    }

    /// Whether the error was raised while building the experiment, before
    /// any bout was simulated.
    #[must_use]
    pub const fn is_configuration(&self) -> bool {
        matches!(
            self,
            Self::Config { .. }
                | Self::InvalidDistanceMatrix { .. }
                | Self::ZeroProbabilityRow { .. }
                | Self::InvalidSite(_)
                | Self::YamlParse(_)
                | Self::Validation(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_config() {
        let err = TraplineError::config("runs must be positive");
        assert!(err.is_configuration());
        let msg = err.to_string();
        assert!(msg.contains("Configuration error"));
        assert!(msg.contains("runs must be positive"));
    }

    #[test]
    fn test_distance_matrix_is_configuration() {
        let err = TraplineError::distance_matrix("d[0][1] != d[1][0]");
        assert!(err.is_configuration());
        assert!(err.to_string().contains("d[0][1] != d[1][0]"));
    }

    #[test]
    fn test_zero_row_display() {
        let err = TraplineError::ZeroProbabilityRow { row: 3 };
        assert!(err.is_configuration());
        assert!(err.to_string().contains("row 3"));
    }

    #[test]
    fn test_invalid_distribution_is_runtime() {
        let err = TraplineError::invalid_distribution(2, "negative weight -0.5 at column 4");
        assert!(!err.is_configuration());
        let msg = err.to_string();
        assert!(msg.contains("row 2"));
        assert!(msg.contains("negative weight"));
    }

    #[test]
    fn test_in_run_wraps_source() {
        let err = TraplineError::ScriptExhausted { consumed: 4 }.in_run(7);
        let msg = err.to_string();
        assert!(msg.contains("Run 7 failed"));
        assert!(msg.contains("exhausted after 4 moves"));
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_io_from() {
        let err: TraplineError = std::io::Error::other("missing file").into();
        assert!(!err.is_configuration());
        assert!(err.to_string().contains("I/O error"));
    }

    #[test]
    fn test_error_debug() {
        let err = TraplineError::InvalidSite(9);
        let debug = format!("{err:?}");
        assert!(debug.contains("InvalidSite"));
    }
}
