//! Maps an algorithm identifier to its routine and normalizes the result.

use std::collections::HashMap;
use std::time::Instant;

use rand::Rng;
use tracing::info;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::config::AlgorithmParams;
use super::dynamic_programming::{policy_iteration, value_iteration};
use super::error::DispatchError;
use super::monte_carlo::monte_carlo;
use super::policy::random_policy;
use super::prediction::{n_step_td, td_prediction};
use super::temporal_difference::{q_learning, sarsa};
use super::{Algorithm, Learned, Planned, Predicted};
use crate::environment::{Environment, TransitionModel};

/// Result shape shared by every algorithm.
///
/// `q_values` is present only for algorithms that learn a Q-table; their
/// `values` are then `max_a Q(s, a)`.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct AlgorithmResult {
    /// One action per state.
    pub policy: Vec<usize>,
    /// One value per state.
    pub values: Vec<f64>,
    /// Per-sweep deltas (planners) or per-episode diagnostics (learners).
    pub history: Vec<f64>,
    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "Option::is_none")
    )]
    pub q_values: Option<Vec<Vec<f64>>>,
}

impl From<Planned> for AlgorithmResult {
    fn from(planned: Planned) -> Self {
        Self {
            policy: planned.policy,
            values: planned.values,
            history: planned.history,
            q_values: None,
        }
    }
}

impl From<Learned> for AlgorithmResult {
    fn from(learned: Learned) -> Self {
        Self {
            policy: learned.policy,
            values: learned.q.state_values(),
            history: learned.history,
            q_values: Some(learned.q.to_rows()),
        }
    }
}

impl AlgorithmResult {
    fn from_prediction(policy: Vec<usize>, predicted: Predicted) -> Self {
        Self {
            policy,
            values: predicted.values,
            history: predicted.history,
            q_values: None,
        }
    }
}

/// Either a completed result or an error message, for callers that want a
/// single record to inspect rather than a `Result`.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(untagged))]
pub enum RunReport {
    Completed(AlgorithmResult),
    Failed { error: String },
}

impl RunReport {
    /// The error message, if the run failed.
    pub fn error(&self) -> Option<&str> {
        match self {
            RunReport::Completed(_) => None,
            RunReport::Failed { error } => Some(error),
        }
    }

    /// The result, if the run completed.
    pub fn result(&self) -> Option<&AlgorithmResult> {
        match self {
            RunReport::Completed(result) => Some(result),
            RunReport::Failed { .. } => None,
        }
    }
}

impl From<Result<AlgorithmResult, DispatchError>> for RunReport {
    fn from(outcome: Result<AlgorithmResult, DispatchError>) -> Self {
        match outcome {
            Ok(result) => RunReport::Completed(result),
            Err(e) => RunReport::Failed {
                error: e.to_string(),
            },
        }
    }
}

fn planning_model<E>(
    env: &E,
    algorithm: Algorithm,
) -> Result<&dyn TransitionModel<State = E::State>, DispatchError>
where
    E: Environment + ?Sized,
{
    env.model()
        .ok_or(DispatchError::MissingTransitionModel(algorithm))
}

/// Runs `algorithm` on `env`.
///
/// `td` and `n_step_td` only predict, so they first draw a uniformly random
/// fixed policy from `rng` and report the values of that policy.
///
/// # Errors
///
/// Fails on out-of-range parameters, or when a planner is asked to run on
/// an environment without a transition model.
pub fn run_algorithm<E, R>(
    env: &mut E,
    algorithm: Algorithm,
    params: &AlgorithmParams,
    rng: &mut R,
) -> Result<AlgorithmResult, DispatchError>
where
    E: Environment + ?Sized,
    R: Rng + ?Sized,
{
    params.validate()?;
    if algorithm.requires_model() && env.model().is_none() {
        return Err(DispatchError::MissingTransitionModel(algorithm));
    }
    info!(
        %algorithm,
        n_states = env.n_states(),
        n_actions = env.n_actions(),
        "running algorithm"
    );
    let started = Instant::now();

    let result: AlgorithmResult = match algorithm {
        Algorithm::PolicyIteration => {
            let model = planning_model(env, algorithm)?;
            policy_iteration(model, params.gamma, params.theta, rng).into()
        }
        Algorithm::ValueIteration => {
            let model = planning_model(env, algorithm)?;
            value_iteration(model, params.gamma, params.theta).into()
        }
        Algorithm::MonteCarlo => monte_carlo(env, params, rng).into(),
        Algorithm::Sarsa => sarsa(env, params, rng).into(),
        Algorithm::QLearning => q_learning(env, params, rng).into(),
        Algorithm::Td => {
            let policy = random_policy(env.n_states(), env.n_actions(), rng);
            let predicted = td_prediction(env, &policy, params);
            AlgorithmResult::from_prediction(policy, predicted)
        }
        Algorithm::NStepTd => {
            let policy = random_policy(env.n_states(), env.n_actions(), rng);
            let predicted = n_step_td(env, &policy, params);
            AlgorithmResult::from_prediction(policy, predicted)
        }
    };

    info!(
        %algorithm,
        elapsed_ms = started.elapsed().as_millis() as u64,
        history_len = result.history.len(),
        "algorithm finished"
    );
    Ok(result)
}

/// Runs the algorithm named `name`, reading parameters from a loose map.
///
/// Missing keys take their defaults and unrecognized keys are ignored.
pub fn run_named<E, R>(
    env: &mut E,
    name: &str,
    params: &HashMap<String, f64>,
    rng: &mut R,
) -> Result<AlgorithmResult, DispatchError>
where
    E: Environment + ?Sized,
    R: Rng + ?Sized,
{
    let algorithm: Algorithm = name.parse()?;
    run_algorithm(env, algorithm, &AlgorithmParams::from_map(params), rng)
}
