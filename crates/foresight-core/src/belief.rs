//! Probability weights over the values of a hidden parameter.

use std::collections::BTreeMap;

use crate::error::RolloutError;

/// Tolerance for the weights summing to one.
const SUM_TOLERANCE: f64 = 1e-9;

/// A validated belief: non-negative, finite weights summing to 1.
#[derive(Debug, Clone, PartialEq)]
pub struct Belief<H: Ord> {
    weights: BTreeMap<H, f64>,
}

impl<H: Copy + Ord + core::fmt::Debug> Belief<H> {
    /// Build a belief from `(hypothesis, weight)` pairs.
    ///
    /// Repeated hypotheses have their weights added together.
    ///
    /// # Errors
    ///
    /// Returns [`RolloutError::InvalidBelief`] if the belief is empty, a
    /// weight is negative or not finite, or the weights do not sum to 1.
    pub fn new(weights: impl IntoIterator<Item = (H, f64)>) -> Result<Self, RolloutError> {
        let mut map = BTreeMap::new();
        for (hypothesis, weight) in weights {
            if !weight.is_finite() || weight < 0.0 {
                return Err(RolloutError::InvalidBelief {
                    reason: format!("weight {weight} for {hypothesis:?} is not a probability"),
                });
            }
            *map.entry(hypothesis).or_insert(0.0) += weight;
        }

        if map.is_empty() {
            return Err(RolloutError::InvalidBelief {
                reason: String::from("no hypotheses"),
            });
        }

        let total: f64 = map.values().sum();
        if (total - 1.0).abs() > SUM_TOLERANCE {
            return Err(RolloutError::InvalidBelief {
                reason: format!("weights sum to {total}, expected 1"),
            });
        }

        Ok(Self { weights: map })
    }

    /// Full confidence in a single hypothesis.
    pub fn certain(hypothesis: H) -> Self {
        Self {
            weights: BTreeMap::from([(hypothesis, 1.0)]),
        }
    }

    /// Equal weight on every listed hypothesis.
    ///
    /// # Errors
    ///
    /// Returns [`RolloutError::InvalidBelief`] if `hypotheses` is empty.
    pub fn uniform(hypotheses: impl IntoIterator<Item = H>) -> Result<Self, RolloutError> {
        let hypotheses: Vec<H> = hypotheses.into_iter().collect();
        let count = u32::try_from(hypotheses.len()).map_err(|_| RolloutError::InvalidBelief {
            reason: String::from("too many hypotheses"),
        })?;
        let weight = 1.0 / f64::from(count);
        Self::new(hypotheses.into_iter().map(|h| (h, weight)))
    }

    /// Weight of `hypothesis`; zero when it is not listed.
    pub fn weight(&self, hypothesis: H) -> f64 {
        self.weights.get(&hypothesis).copied().unwrap_or(0.0)
    }

    /// Hypotheses with non-zero weight, in ascending order.
    pub fn support(&self) -> impl Iterator<Item = (H, f64)> + '_ {
        self.weights
            .iter()
            .filter(|(_, weight)| **weight > 0.0)
            .map(|(hypothesis, weight)| (*hypothesis, *weight))
    }

    /// Replace the belief with certainty in `hypothesis`, keeping the other
    /// hypotheses listed at zero weight.
    pub fn collapse_to(&mut self, hypothesis: H) {
        for weight in self.weights.values_mut() {
            *weight = 0.0;
        }
        self.weights.insert(hypothesis, 1.0);
    }
}
