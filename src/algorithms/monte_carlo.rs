//! First-visit Monte Carlo control.
//!
//! Each episode is rolled out epsilon-greedily and recorded in full. Returns
//! are then accumulated backward, `G ← γG + r`, and only the earliest
//! occurrence of each `(state, action)` pair in the episode contributes to
//! that pair's running average. Sums and counts persist across episodes.

use rand::Rng;
use tracing::trace;

use super::config::AlgorithmParams;
use super::policy::epsilon_greedy;
use super::q_table::QTable;
use super::{Learned, MAX_EPISODE_STEPS};
use crate::environment::Environment;

/// One step of a recorded episode.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrajectoryStep {
    /// Index of the state the action was taken in.
    pub state: usize,
    pub action: usize,
    /// Reward received for taking `action` in `state`.
    pub reward: f64,
}

impl TrajectoryStep {
    pub fn new(state: usize, action: usize, reward: f64) -> Self {
        Self {
            state,
            action,
            reward,
        }
    }
}

/// Running return sums and visit counts, one slot per `(state, action)`.
#[derive(Debug, Clone)]
pub struct ReturnTable {
    n_actions: usize,
    sums: Vec<f64>,
    counts: Vec<u32>,
}

impl ReturnTable {
    pub fn new(n_states: usize, n_actions: usize) -> Self {
        Self {
            n_actions,
            sums: vec![0.0; n_states * n_actions],
            counts: vec![0; n_states * n_actions],
        }
    }

    fn slot(&self, state: usize, action: usize) -> usize {
        state * self.n_actions + action
    }

    /// Number of episodes in which `(state, action)` was first-visited.
    pub fn visits(&self, state: usize, action: usize) -> u32 {
        self.counts[self.slot(state, action)]
    }

    /// Average first-visit return of `(state, action)`, 0 if never visited.
    pub fn mean(&self, state: usize, action: usize) -> f64 {
        let i = self.slot(state, action);
        match self.counts[i] {
            0 => 0.0,
            n => self.sums[i] / n as f64,
        }
    }

    /// Folds one episode into the table and refreshes the affected entries
    /// of `q` with their new averages.
    pub fn record_episode(&mut self, trajectory: &[TrajectoryStep], gamma: f64, q: &mut QTable) {
        let mut first_visit = vec![usize::MAX; self.counts.len()];
        for (t, step) in trajectory.iter().enumerate() {
            let i = self.slot(step.state, step.action);
            if first_visit[i] == usize::MAX {
                first_visit[i] = t;
            }
        }

        let mut g = 0.0;
        for (t, step) in trajectory.iter().enumerate().rev() {
            g = gamma * g + step.reward;
            let i = self.slot(step.state, step.action);
            if first_visit[i] == t {
                self.sums[i] += g;
                self.counts[i] += 1;
                q.set(step.state, step.action, self.sums[i] / self.counts[i] as f64);
            }
        }
    }
}

/// Rolls out one epsilon-greedy episode, capped at [`MAX_EPISODE_STEPS`].
fn rollout<E, R>(env: &mut E, q: &QTable, epsilon: f64, rng: &mut R) -> Vec<TrajectoryStep>
where
    E: Environment + ?Sized,
    R: Rng + ?Sized,
{
    let mut trajectory = Vec::new();
    let mut state = env.reset();

    for _ in 0..MAX_EPISODE_STEPS {
        let s = env.state_to_idx(&state);
        let a = epsilon_greedy(q, s, epsilon, rng);
        let step = env.step(a);
        trajectory.push(TrajectoryStep::new(s, a, step.reward));
        state = step.state;
        if step.done {
            break;
        }
    }

    trajectory
}

/// First-visit Monte Carlo control.
///
/// The history holds, per episode, the mean over states of `max_a Q(s, a)`.
pub fn monte_carlo<E, R>(env: &mut E, params: &AlgorithmParams, rng: &mut R) -> Learned
where
    E: Environment + ?Sized,
    R: Rng + ?Sized,
{
    let mut q = QTable::new(env.n_states(), env.n_actions());
    let mut returns = ReturnTable::new(env.n_states(), env.n_actions());
    let mut history = Vec::with_capacity(params.n_episodes);

    for episode in 0..params.n_episodes {
        let trajectory = rollout(env, &q, params.epsilon, rng);
        returns.record_episode(&trajectory, params.gamma, &mut q);

        let mean_max = q.mean_max();
        trace!(episode, steps = trajectory.len(), mean_max, "monte carlo episode finished");
        history.push(mean_max);
    }

    Learned {
        policy: q.greedy_policy(),
        q,
        history,
    }
}
