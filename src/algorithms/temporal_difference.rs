//! Temporal-difference control: Q-learning (off-policy) and SARSA
//! (on-policy), both exploring epsilon-greedily over a zero-initialized
//! Q-table.

use rand::Rng;
use tracing::trace;

use super::config::AlgorithmParams;
use super::policy::epsilon_greedy;
use super::q_table::QTable;
use super::{Learned, MAX_EPISODE_STEPS};
use crate::environment::Environment;

/// Q-learning update for one transition.
///
/// `Q(s,a) ← Q(s,a) + α[r + γ max_a' Q(s',a') − Q(s,a)]`, where `next` is
/// `None` for a terminal transition and the target collapses to `r`.
pub fn q_learning_update(
    q: &mut QTable,
    state: usize,
    action: usize,
    reward: f64,
    next: Option<usize>,
    gamma: f64,
    alpha: f64,
) {
    let target = match next {
        Some(s_next) => reward + gamma * q.max(s_next),
        None => reward,
    };
    q.nudge(state, action, target, alpha);
}

/// SARSA update for one transition.
///
/// `Q(s,a) ← Q(s,a) + α[r + γ Q(s',a') − Q(s,a)]`, where `next` carries the
/// successor state and the action already chosen there, and is `None` for a
/// terminal transition.
pub fn sarsa_update(
    q: &mut QTable,
    state: usize,
    action: usize,
    reward: f64,
    next: Option<(usize, usize)>,
    gamma: f64,
    alpha: f64,
) {
    let target = match next {
        Some((s_next, a_next)) => reward + gamma * q.get(s_next, a_next),
        None => reward,
    };
    q.nudge(state, action, target, alpha);
}

/// Off-policy TD control.
///
/// The history holds each episode's undiscounted total reward.
pub fn q_learning<E, R>(env: &mut E, params: &AlgorithmParams, rng: &mut R) -> Learned
where
    E: Environment + ?Sized,
    R: Rng + ?Sized,
{
    let mut q = QTable::new(env.n_states(), env.n_actions());
    let mut history = Vec::with_capacity(params.n_episodes);

    for episode in 0..params.n_episodes {
        let mut state = env.reset();
        let mut total = 0.0;

        for _ in 0..MAX_EPISODE_STEPS {
            let s = env.state_to_idx(&state);
            let a = epsilon_greedy(&q, s, params.epsilon, rng);
            let step = env.step(a);
            total += step.reward;

            let next = (!step.done).then(|| env.state_to_idx(&step.state));
            q_learning_update(&mut q, s, a, step.reward, next, params.gamma, params.alpha);

            state = step.state;
            if step.done {
                break;
            }
        }

        trace!(episode, total, "q-learning episode finished");
        history.push(total);
    }

    Learned {
        policy: q.greedy_policy(),
        q,
        history,
    }
}

/// On-policy TD control.
///
/// The successor action is chosen before the update and then taken, so
/// the target follows the exploring policy itself.
pub fn sarsa<E, R>(env: &mut E, params: &AlgorithmParams, rng: &mut R) -> Learned
where
    E: Environment + ?Sized,
    R: Rng + ?Sized,
{
    let mut q = QTable::new(env.n_states(), env.n_actions());
    let mut history = Vec::with_capacity(params.n_episodes);

    for episode in 0..params.n_episodes {
        let start = env.reset();
        let mut s = env.state_to_idx(&start);
        let mut a = epsilon_greedy(&q, s, params.epsilon, rng);
        let mut total = 0.0;

        for _ in 0..MAX_EPISODE_STEPS {
            let step = env.step(a);
            total += step.reward;

            let s_next = env.state_to_idx(&step.state);
            let a_next = epsilon_greedy(&q, s_next, params.epsilon, rng);
            let next = (!step.done).then_some((s_next, a_next));
            sarsa_update(&mut q, s, a, step.reward, next, params.gamma, params.alpha);

            s = s_next;
            a = a_next;
            if step.done {
                break;
            }
        }

        trace!(episode, total, "sarsa episode finished");
        history.push(total);
    }

    Learned {
        policy: q.greedy_policy(),
        q,
        history,
    }
}
