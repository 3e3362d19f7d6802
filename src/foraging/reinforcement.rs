//! Reinforcement policy: when a bout is rewarded, and by how much.

use serde::{Deserialize, Serialize};

use super::bout::BoutOutcome;

/// Slope of the novelty decay per `repeat_count / swap_point`.
pub const NOVELTY_DECAY: f64 = 1.1;

/// Novelty extension settings.
///
/// When enabled, the reinforcement factor shrinks linearly as the same route
/// recurs and turns into suppression once it passes zero.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Novelty {
    /// Roughly how many repeats it takes before reinforcement starts to
    /// lower a route's probability.
    pub swap_point: f64,
}

/// Reinforcement rule of one agent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReinforcementPolicy {
    /// Base multiplicative factor.
    pub base_factor: f64,
    /// Optional novelty extension.
    pub novelty: Option<Novelty>,
}

impl Default for ReinforcementPolicy {
    fn default() -> Self {
        Self {
            base_factor: 2.5,
            novelty: None,
        }
    }
}

impl ReinforcementPolicy {
    /// Policy without the novelty extension.
    #[must_use]
    pub const fn fixed(base_factor: f64) -> Self {
        Self {
            base_factor,
            novelty: None,
        }
    }

    /// Policy with the novelty extension.
    #[must_use]
    pub const fn with_novelty(base_factor: f64, swap_point: f64) -> Self {
        Self {
            base_factor,
            novelty: Some(Novelty { swap_point }),
        }
    }

    /// Factor applied for a route already seen `repeat_count` times in the
    /// run (the current bout included).
    #[must_use]
    pub fn effective_factor(&self, repeat_count: usize) -> f64 {
        match self.novelty {
            None => self.base_factor,
            Some(Novelty { swap_point }) => {
                self.base_factor - NOVELTY_DECAY * (repeat_count as f64 / swap_point)
            }
        }
    }

    /// Repeat count above which the effective factor is negative.
    #[must_use]
    pub fn inversion_threshold(&self) -> Option<f64> {
        self.novelty
            .map(|Novelty { swap_point }| self.base_factor * swap_point / NOVELTY_DECAY)
    }
}

/// Whether a finished bout earns reinforcement.
///
/// Ties with the current minimum also qualify.
#[must_use]
pub fn should_reinforce(outcome: BoutOutcome, distance: f64, run_minimum: f64) -> bool {
    outcome == BoutOutcome::Completed && distance <= run_minimum
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_factor_ignores_repeats() {
        let policy = ReinforcementPolicy::fixed(2.5);
        assert_eq!(policy.effective_factor(1), 2.5);
        assert_eq!(policy.effective_factor(500), 2.5);
        assert!(policy.inversion_threshold().is_none());
    }

    #[test]
    fn test_novelty_factor_values() {
        let policy = ReinforcementPolicy::with_novelty(2.5, 50.0);
        assert!((policy.effective_factor(1) - (2.5 - 1.1 / 50.0)).abs() < 1e-12);
        assert!((policy.effective_factor(50) - 1.4).abs() < 1e-12);
    }

    #[test]
    fn test_novelty_goes_negative_past_threshold() {
        let policy = ReinforcementPolicy::with_novelty(2.5, 50.0);
        let threshold = policy.inversion_threshold().unwrap();
        assert!((threshold - 2.5 * 50.0 / 1.1).abs() < 1e-9);
        let just_above = threshold.floor() as usize + 1;
        assert!(policy.effective_factor(just_above) < 0.0);
        assert!(policy.effective_factor(threshold.floor() as usize) > 0.0);
    }

    #[test]
    fn test_gating() {
        assert!(should_reinforce(BoutOutcome::Completed, 300.0, f64::INFINITY));
        assert!(should_reinforce(BoutOutcome::Completed, 300.0, 300.0));
        assert!(!should_reinforce(BoutOutcome::Completed, 300.1, 300.0));
        assert!(!should_reinforce(BoutOutcome::Aborted, 100.0, 300.0));
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// The novelty factor strictly decreases with every extra repeat.
        #[test]
        fn prop_novelty_strictly_decreasing(
            base in 0.5f64..10.0,
            swap in 1.0f64..200.0,
            repeats in 0usize..10_000,
        ) {
            let policy = ReinforcementPolicy::with_novelty(base, swap);
            prop_assert!(policy.effective_factor(repeats + 1) < policy.effective_factor(repeats));
        }

        /// Negative exactly once repeats exceed base * swap / 1.1.
        #[test]
        fn prop_novelty_sign(base in 0.5f64..10.0, swap in 1.0f64..200.0, repeats in 0usize..10_000) {
            let policy = ReinforcementPolicy::with_novelty(base, swap);
            let threshold = base * swap / NOVELTY_DECAY;
            let factor = policy.effective_factor(repeats);
            if repeats as f64 > threshold + 1e-9 {
                prop_assert!(factor < 0.0);
            } else if (repeats as f64) < threshold - 1e-9 {
                prop_assert!(factor > 0.0);
            }
        }
    }
}
