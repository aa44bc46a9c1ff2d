//! Value prediction for a fixed deterministic policy: TD(0) and n-step TD.

use tracing::{trace, warn};

use super::config::AlgorithmParams;
use super::{Predicted, MAX_EPISODE_STEPS};
use crate::environment::Environment;

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// TD(0) prediction of the value of `policy`.
///
/// Updates online after every step:
/// `V(s) ← V(s) + α[r + γV(s') − V(s)]`, or `V(s) ← V(s) + α[r − V(s)]`
/// on the terminal step. The history holds the mean value after each episode.
pub fn td_prediction<E>(env: &mut E, policy: &[usize], params: &AlgorithmParams) -> Predicted
where
    E: Environment + ?Sized,
{
    let mut values = vec![0.0; env.n_states()];
    let mut history = Vec::with_capacity(params.n_episodes);

    for episode in 0..params.n_episodes {
        let mut state = env.reset();

        for _ in 0..MAX_EPISODE_STEPS {
            let s = env.state_to_idx(&state);
            let step = env.step(policy[s]);

            let target = if step.done {
                step.reward
            } else {
                step.reward + params.gamma * values[env.state_to_idx(&step.state)]
            };
            values[s] += params.alpha * (target - values[s]);

            state = step.state;
            if step.done {
                break;
            }
        }

        let mean_value = mean(&values);
        trace!(episode, mean_value, "td(0) episode finished");
        history.push(mean_value);
    }

    Predicted { values, history }
}

/// Buffered states and rewards of one n-step TD episode.
///
/// `states[t]` is the state at time `t`; `rewards[t]` is the reward received
/// on arriving at time `t` (`rewards[0]` is unused).
struct NStepBuffer {
    states: Vec<usize>,
    rewards: Vec<f64>,
}

impl NStepBuffer {
    /// Updates `V(s_τ)` toward the return over rewards `τ+1 ..= horizon`,
    /// bootstrapping from `V(s_horizon)` when `bootstrap` is set.
    fn update(&self, values: &mut [f64], tau: usize, horizon: usize, bootstrap: bool, params: &AlgorithmParams) {
        let mut g = 0.0;
        let mut discount = 1.0;
        for i in tau + 1..=horizon {
            g += discount * self.rewards[i];
            discount *= params.gamma;
        }
        if bootstrap {
            g += discount * values[self.states[horizon]];
        }
        let s = self.states[tau];
        values[s] += params.alpha * (g - values[s]);
    }
}

/// n-step TD prediction of the value of `policy`.
///
/// At time `t` the state at `τ = t − n + 1` is updated with
/// `G = Σ_{i=τ+1}^{min(τ+n, T)} γ^{i−τ−1} r_i`, plus `γ^n V(s_{τ+n})` when
/// `τ + n < T`. Once the terminal step arrives, every update still pending
/// (`τ` from `max(0, T − n)` to `T − 1`) is applied with the rewards up to `T`
/// and the episode ends, so the work per episode is bounded by its length
/// rather than by `n`.
///
/// If an episode reaches [`MAX_EPISODE_STEPS`] steps without terminating,
/// the updates still pending are flushed with whatever rewards were observed,
/// bootstrapping from the last state reached. The truncation point is not
/// treated as terminal.
pub fn n_step_td<E>(env: &mut E, policy: &[usize], params: &AlgorithmParams) -> Predicted
where
    E: Environment + ?Sized,
{
    let n = params.n_step;
    let mut values = vec![0.0; env.n_states()];
    let mut history = Vec::with_capacity(params.n_episodes);

    for episode in 0..params.n_episodes {
        let start = env.reset();
        let mut buffer = NStepBuffer {
            states: vec![env.state_to_idx(&start)],
            rewards: vec![0.0],
        };
        let mut t = 0;

        loop {
            let step = env.step(policy[buffer.states[t]]);
            buffer.states.push(env.state_to_idx(&step.state));
            buffer.rewards.push(step.reward);

            if step.done {
                let end = t + 1;
                for tau in end.saturating_sub(n)..end {
                    buffer.update(&mut values, tau, end, false, params);
                }
                break;
            }
            if let Some(tau) = (t + 1).checked_sub(n) {
                buffer.update(&mut values, tau, tau + n, true, params);
            }

            t += 1;
            if t >= MAX_EPISODE_STEPS {
                // s_t is the last state reached; τ < t - n + 1 are done.
                let pending = (t + 1).saturating_sub(n);
                for tau in pending..t {
                    buffer.update(&mut values, tau, t, true, params);
                }
                warn!(episode, steps = t, "n-step td episode truncated at the step cap");
                break;
            }
        }

        let mean_value = mean(&values);
        trace!(episode, mean_value, "n-step td episode finished");
        history.push(mean_value);
    }

    Predicted { values, history }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::environment::{Cell, GridWorld, Move, StateSpace, StepResult};
    use float_eq::assert_float_eq;

    /// A walk along `len` cells; action 0 moves right, anything else waits.
    /// Every step pays −1 and reaching the last cell ends the episode.
    struct Corridor {
        len: usize,
        position: usize,
    }

    impl StateSpace for Corridor {
        type State = usize;

        fn n_states(&self) -> usize {
            self.len
        }

        fn n_actions(&self) -> usize {
            2
        }

        fn state_to_idx(&self, state: &usize) -> usize {
            *state
        }

        fn idx_to_state(&self, idx: usize) -> usize {
            idx
        }
    }

    impl Environment for Corridor {
        fn reset(&mut self) -> usize {
            self.position = 0;
            0
        }

        fn step(&mut self, action: usize) -> StepResult<usize> {
            if action == 0 {
                self.position += 1;
            }
            StepResult {
                state: self.position,
                reward: -1.0,
                done: self.position == self.len - 1,
            }
        }
    }

    fn params(n_step: usize, n_episodes: usize) -> AlgorithmParams {
        AlgorithmParams {
            gamma: 0.9,
            alpha: 0.5,
            n_step,
            n_episodes,
            ..AlgorithmParams::default()
        }
    }

    #[test]
    fn td0_single_episode_by_hand() {
        let mut env = Corridor { len: 3, position: 0 };
        let predicted = td_prediction(&mut env, &[0, 0, 0], &params(1, 1));
        // s0: 0.5 * (-1 + 0.9 * 0) ; s1 terminal: 0.5 * -1
        assert_eq!(predicted.values, vec![-0.5, -0.5, 0.0]);
        assert_float_eq!(predicted.history[0], -1.0 / 3.0, abs <= 1e-12);
    }

    #[test]
    fn td0_converges_on_corridor() {
        let mut env = Corridor { len: 4, position: 0 };
        let predicted = td_prediction(&mut env, &[0; 4], &params(1, 500));
        // V(2) = -1, V(1) = -1.9, V(0) = -2.71
        assert_float_eq!(predicted.values, vec![-2.71, -1.9, -1.0, 0.0], abs_all <= 1e-6);
    }

    #[test]
    fn n_step_matches_monte_carlo_when_n_covers_episode() {
        let mut env = Corridor { len: 4, position: 0 };
        let predicted = n_step_td(&mut env, &[0; 4], &params(10, 1));
        // With n beyond the episode length every update uses the full return.
        assert_float_eq!(
            predicted.values,
            vec![0.5 * -2.71, 0.5 * -1.9, 0.5 * -1.0, 0.0],
            abs_all <= 1e-12
        );
    }

    #[test]
    fn n_step_with_n_one_equals_td0() {
        let policy = vec![0; 6];
        let mut a = Corridor { len: 6, position: 0 };
        let mut b = Corridor { len: 6, position: 0 };
        let td0 = td_prediction(&mut a, &policy, &params(1, 25));
        let one_step = n_step_td(&mut b, &policy, &params(1, 25));
        assert_eq!(td0.values, one_step.values);
        assert_eq!(td0.history, one_step.history);
    }

    #[test]
    fn n_step_bootstraps_before_terminal() {
        let mut env = Corridor { len: 5, position: 0 };
        let predicted = n_step_td(&mut env, &[0; 5], &params(2, 400));
        // True values: V(k) = -(1 - 0.9^(4-k)) / 0.1
        let expected: Vec<f64> = (0..5)
            .map(|k| -(1.0 - 0.9f64.powi(4 - k as i32)) / 0.1)
            .collect();
        assert_float_eq!(predicted.values, expected, abs_all <= 1e-6);
    }

    #[test]
    fn huge_lookahead_finishes_like_full_return() {
        let policy = [0; 4];
        let mut a = Corridor { len: 4, position: 0 };
        let mut b = Corridor { len: 4, position: 0 };
        let full = n_step_td(&mut a, &policy, &params(3, 20));
        let huge = n_step_td(&mut b, &policy, &params(usize::MAX, 20));
        assert_eq!(huge.values, full.values);
        assert_eq!(huge.history.len(), 20);
    }

    #[test]
    fn capped_episode_flushes_pending_updates() {
        // The waiting policy never reaches the end.
        let mut env = Corridor { len: 3, position: 0 };
        let predicted = n_step_td(&mut env, &[1, 1, 1], &params(4, 1));
        assert_eq!(predicted.history.len(), 1);
        assert!(predicted.values[0] < 0.0);
        assert_eq!(predicted.values[1], 0.0);
    }

    #[test]
    fn gridworld_prediction_has_one_value_per_state() {
        let mut env = GridWorld::default();
        let policy = vec![Move::Right.index(); env.n_states()];
        let predicted = td_prediction(&mut env, &policy, &params(1, 3));
        assert_eq!(predicted.values.len(), env.n_states());
        // Walking right along the top row never reaches (4, 4).
        assert!(predicted.values[env.state_to_idx(&Cell::new(0, 4))] < 0.0);
    }
}
