//! Hyper-parameters shared by every algorithm.

use std::collections::HashMap;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::error::ParamError;

/// Hyper-parameters for a single algorithm run.
///
/// Each algorithm reads only the fields it needs; the rest are ignored.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct AlgorithmParams {
    /// Discount factor γ.
    pub gamma: f64,
    /// Learning rate α (sample-based methods).
    pub alpha: f64,
    /// Exploration rate ε for epsilon-greedy control.
    pub epsilon: f64,
    /// Number of training episodes (sample-based methods).
    pub n_episodes: usize,
    /// Convergence threshold θ on the largest value change per sweep
    /// (dynamic programming).
    pub theta: f64,
    /// Lookahead n for n-step TD.
    pub n_step: usize,
}

impl AlgorithmParams {
    /// Builds parameters from a loosely-typed map.
    ///
    /// Missing keys take their default, unrecognized keys are ignored.
    /// Counts are truncated toward zero; negative counts become zero.
    pub fn from_map(map: &HashMap<String, f64>) -> Self {
        let defaults = Self::default();
        let get = |key: &str, default: f64| map.get(key).copied().unwrap_or(default);
        Self {
            gamma: get("gamma", defaults.gamma),
            alpha: get("alpha", defaults.alpha),
            epsilon: get("epsilon", defaults.epsilon),
            n_episodes: get("n_episodes", defaults.n_episodes as f64) as usize,
            theta: get("theta", defaults.theta),
            n_step: get("n_step", defaults.n_step as f64) as usize,
        }
    }

    /// Checks every field against its valid range.
    pub fn validate(&self) -> Result<(), ParamError> {
        if !(0.0..=1.0).contains(&self.gamma) {
            return Err(ParamError::Gamma(self.gamma));
        }
        if !(self.alpha > 0.0 && self.alpha <= 1.0) {
            return Err(ParamError::Alpha(self.alpha));
        }
        if !(0.0..=1.0).contains(&self.epsilon) {
            return Err(ParamError::Epsilon(self.epsilon));
        }
        if !(self.theta > 0.0) {
            return Err(ParamError::Theta(self.theta));
        }
        if self.n_step == 0 {
            return Err(ParamError::NStep);
        }
        Ok(())
    }
}

impl Default for AlgorithmParams {
    fn default() -> Self {
        Self {
            gamma: 0.99,
            alpha: 0.1,
            epsilon: 0.1,
            n_episodes: 500,
            theta: 1e-6,
            n_step: 4,
        }
    }
}
