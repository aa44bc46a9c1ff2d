//! Model-based planning: policy evaluation, value iteration, greedy policy
//! extraction and policy iteration.
//!
//! Every routine sweeps the states in index order and updates the value
//! function in place, so later states in a sweep already see the new values
//! of earlier ones. A sweep's delta is the largest absolute change it made.
//! Sweeping stops once delta drops below `theta` or after [`MAX_SWEEPS`]
//! sweeps; hitting the cap is a soft truncation, and the current estimate is
//! returned with its full delta history.

use rand::Rng;
use tracing::{debug, warn};

use super::policy::random_policy;
use super::q_table::argmax;
use super::Planned;
use crate::environment::TransitionModel;

/// Upper bound on sweeps per evaluation or value-iteration run.
pub const MAX_SWEEPS: usize = 1000;

/// Upper bound on improvement rounds in policy iteration.
pub const MAX_POLICY_ROUNDS: usize = 100;

/// Expected one-step return of `action` in `state` under `values`.
///
/// Terminal transitions contribute `probability × reward` only.
fn action_value<M>(model: &M, state: &M::State, action: usize, values: &[f64], gamma: f64) -> f64
where
    M: TransitionModel + ?Sized,
{
    model
        .transitions(state, action)
        .iter()
        .map(|t| {
            if t.terminal {
                t.probability * t.reward
            } else {
                let next = model.state_to_idx(&t.next_state);
                t.probability * (t.reward + gamma * values[next])
            }
        })
        .sum()
}

/// `Q(s, ·)` recomputed from the model under `values`.
fn action_values<M>(model: &M, state: &M::State, values: &[f64], gamma: f64) -> Vec<f64>
where
    M: TransitionModel + ?Sized,
{
    (0..model.n_actions())
        .map(|a| action_value(model, state, a, values, gamma))
        .collect()
}

/// Evaluates a fixed deterministic policy.
///
/// # Returns
///
/// `(values, deltas)`: the value function and one delta per sweep.
pub fn evaluate_policy<M>(model: &M, policy: &[usize], gamma: f64, theta: f64) -> (Vec<f64>, Vec<f64>)
where
    M: TransitionModel + ?Sized,
{
    let n = model.n_states();
    let mut values = vec![0.0; n];
    let mut deltas = Vec::new();

    loop {
        let mut delta: f64 = 0.0;
        for s in 0..n {
            let state = model.idx_to_state(s);
            let updated = action_value(model, &state, policy[s], &values, gamma);
            delta = delta.max((values[s] - updated).abs());
            values[s] = updated;
        }
        deltas.push(delta);

        if delta < theta {
            debug!(sweeps = deltas.len(), "policy evaluation converged");
            break;
        }
        if deltas.len() >= MAX_SWEEPS {
            warn!(sweeps = MAX_SWEEPS, delta, "policy evaluation hit the sweep cap");
            break;
        }
    }

    (values, deltas)
}

/// The greedy policy with respect to `values`, lowest action on ties.
pub fn greedy_policy<M>(model: &M, values: &[f64], gamma: f64) -> Vec<usize>
where
    M: TransitionModel + ?Sized,
{
    (0..model.n_states())
        .map(|s| {
            let state = model.idx_to_state(s);
            argmax(&action_values(model, &state, values, gamma))
        })
        .collect()
}

/// Value iteration: Bellman optimality sweeps, then greedy extraction.
pub fn value_iteration<M>(model: &M, gamma: f64, theta: f64) -> Planned
where
    M: TransitionModel + ?Sized,
{
    let n = model.n_states();
    let mut values = vec![0.0; n];
    let mut history = Vec::new();

    loop {
        let mut delta: f64 = 0.0;
        for s in 0..n {
            let state = model.idx_to_state(s);
            let best = action_values(model, &state, &values, gamma)
                .into_iter()
                .fold(f64::NEG_INFINITY, f64::max);
            delta = delta.max((values[s] - best).abs());
            values[s] = best;
        }
        history.push(delta);

        if delta < theta {
            debug!(sweeps = history.len(), "value iteration converged");
            break;
        }
        if history.len() >= MAX_SWEEPS {
            warn!(sweeps = MAX_SWEEPS, delta, "value iteration hit the sweep cap");
            break;
        }
    }

    let policy = greedy_policy(model, &values, gamma);
    Planned {
        policy,
        values,
        history,
    }
}

/// Policy iteration from a uniformly random initial policy.
///
/// Alternates evaluation and greedy improvement until the improved policy
/// equals the previous one, or for at most [`MAX_POLICY_ROUNDS`] rounds.
/// The history is every evaluation's deltas, concatenated.
pub fn policy_iteration<M, R>(model: &M, gamma: f64, theta: f64, rng: &mut R) -> Planned
where
    M: TransitionModel + ?Sized,
    R: Rng + ?Sized,
{
    let mut policy = random_policy(model.n_states(), model.n_actions(), rng);
    let mut history = Vec::new();
    let mut rounds = 0;

    loop {
        let (values, deltas) = evaluate_policy(model, &policy, gamma, theta);
        history.extend(deltas);

        let improved = greedy_policy(model, &values, gamma);
        rounds += 1;
        let stable = improved == policy;
        policy = improved;

        if stable || rounds >= MAX_POLICY_ROUNDS {
            if stable {
                debug!(rounds, "policy iteration stabilized");
            } else {
                warn!(rounds, "policy iteration hit the round cap");
            }
            return Planned {
                policy,
                values,
                history,
            };
        }
    }
}
