//! Tabular reinforcement-learning algorithms.
//!
//! Two families share the [`Environment`](crate::environment::Environment)
//! contract:
//!
//! - **Planners** ([`dynamic_programming`]) read the exact dynamics through
//!   [`TransitionModel`](crate::environment::TransitionModel): policy
//!   evaluation, value iteration and policy iteration.
//! - **Learners** drive the environment through `reset`/`step`:
//!   Q-learning and SARSA ([`temporal_difference`]), first-visit Monte Carlo
//!   control ([`monte_carlo`]), and TD(0) / n-step TD prediction
//!   ([`prediction`]).
//!
//! [`run_algorithm`] maps an [`Algorithm`] and [`AlgorithmParams`] to the
//! right routine and normalizes the outcome into an [`AlgorithmResult`].
//!
//! Every routine is bounded by a fixed cap (sweeps, rounds or steps per
//! episode). Hitting a cap truncates softly: the best current estimate is
//! returned along with its full history. Randomness always comes from the
//! caller-supplied RNG, so seeded runs are reproducible.

pub mod config;
pub mod dispatch;
pub mod dynamic_programming;
pub mod error;
pub mod monte_carlo;
pub mod policy;
pub mod prediction;
pub mod q_table;
pub mod temporal_difference;

#[cfg(test)]
mod tests;

use std::fmt;
use std::str::FromStr;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

pub use config::AlgorithmParams;
pub use dispatch::{run_algorithm, run_named, AlgorithmResult, RunReport};
pub use dynamic_programming::{evaluate_policy, greedy_policy, policy_iteration, value_iteration};
pub use error::{DispatchError, ParamError};
pub use monte_carlo::{monte_carlo, ReturnTable, TrajectoryStep};
pub use policy::{epsilon_greedy, random_policy};
pub use prediction::{n_step_td, td_prediction};
pub use q_table::QTable;
pub use temporal_difference::{q_learning, sarsa};

/// Upper bound on environment steps in one episode.
pub const MAX_EPISODE_STEPS: usize = 1000;

/// The algorithms the dispatcher knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Algorithm {
    PolicyIteration,
    ValueIteration,
    MonteCarlo,
    Td,
    NStepTd,
    Sarsa,
    QLearning,
}

impl Algorithm {
    pub const ALL: [Algorithm; 7] = [
        Algorithm::PolicyIteration,
        Algorithm::ValueIteration,
        Algorithm::MonteCarlo,
        Algorithm::Td,
        Algorithm::NStepTd,
        Algorithm::Sarsa,
        Algorithm::QLearning,
    ];

    /// The identifier accepted by [`FromStr`].
    pub fn as_str(&self) -> &'static str {
        match self {
            Algorithm::PolicyIteration => "policy_iteration",
            Algorithm::ValueIteration => "value_iteration",
            Algorithm::MonteCarlo => "monte_carlo",
            Algorithm::Td => "td",
            Algorithm::NStepTd => "n_step_td",
            Algorithm::Sarsa => "sarsa",
            Algorithm::QLearning => "q_learning",
        }
    }

    /// Whether the algorithm learns a Q-table.
    pub fn produces_q_table(&self) -> bool {
        matches!(
            self,
            Algorithm::MonteCarlo | Algorithm::Sarsa | Algorithm::QLearning
        )
    }

    /// Whether the algorithm needs the environment's transition model.
    pub fn requires_model(&self) -> bool {
        matches!(self, Algorithm::PolicyIteration | Algorithm::ValueIteration)
    }
}

impl FromStr for Algorithm {
    type Err = DispatchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|a| a.as_str() == s)
            .ok_or_else(|| DispatchError::UnknownAlgorithm(s.to_string()))
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Output of a planner.
#[derive(Debug, Clone, PartialEq)]
pub struct Planned {
    pub policy: Vec<usize>,
    pub values: Vec<f64>,
    /// Largest value change of every sweep, in order.
    pub history: Vec<f64>,
}

/// Output of a control learner.
#[derive(Debug, Clone, PartialEq)]
pub struct Learned {
    /// Greedy policy of the final Q-table.
    pub policy: Vec<usize>,
    pub q: QTable,
    /// One diagnostic value per episode.
    pub history: Vec<f64>,
}

/// Output of a prediction run.
#[derive(Debug, Clone, PartialEq)]
pub struct Predicted {
    pub values: Vec<f64>,
    /// Mean state value after every episode.
    pub history: Vec<f64>,
}
