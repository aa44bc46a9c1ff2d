//! Action selection: epsilon-greedy exploration and random fixed policies.

use rand::Rng;

use super::q_table::QTable;

/// Epsilon-greedy selection over `Q(state, ·)`.
///
/// With probability `epsilon` a uniformly random action is drawn, otherwise
/// the greedy action (lowest index among ties) is taken.
pub fn epsilon_greedy<R: Rng + ?Sized>(q: &QTable, state: usize, epsilon: f64, rng: &mut R) -> usize {
    if rng.gen::<f64>() < epsilon {
        rng.gen_range(0..q.n_actions())
    } else {
        q.greedy_action(state)
    }
}

/// A fixed policy choosing one uniformly random action per state.
pub fn random_policy<R: Rng + ?Sized>(n_states: usize, n_actions: usize, rng: &mut R) -> Vec<usize> {
    (0..n_states).map(|_| rng.gen_range(0..n_actions)).collect()
}
