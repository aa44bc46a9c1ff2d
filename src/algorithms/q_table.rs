//! Dense action-value table for tabular control.

/// Index of the largest value, preferring the lowest index on ties.
///
/// Returns 0 for an empty slice.
pub fn argmax(values: &[f64]) -> usize {
    let mut best = 0;
    for (i, &v) in values.iter().enumerate().skip(1) {
        if v > values[best] {
            best = i;
        }
    }
    best
}

/// An `n_states × n_actions` table of action values, zero-initialized.
///
/// Stored row-major; row `s` holds `Q(s, ·)`. Out-of-range indices panic.
#[derive(Debug, Clone, PartialEq)]
pub struct QTable {
    n_states: usize,
    n_actions: usize,
    values: Vec<f64>,
}

impl QTable {
    pub fn new(n_states: usize, n_actions: usize) -> Self {
        Self {
            n_states,
            n_actions,
            values: vec![0.0; n_states * n_actions],
        }
    }

    pub fn n_states(&self) -> usize {
        self.n_states
    }

    pub fn n_actions(&self) -> usize {
        self.n_actions
    }

    fn offset(&self, state: usize, action: usize) -> usize {
        assert!(
            action < self.n_actions,
            "action {action} out of range for {} actions",
            self.n_actions
        );
        state * self.n_actions + action
    }

    pub fn get(&self, state: usize, action: usize) -> f64 {
        self.values[self.offset(state, action)]
    }

    pub fn set(&mut self, state: usize, action: usize, value: f64) {
        let i = self.offset(state, action);
        self.values[i] = value;
    }

    /// Moves `Q(s, a)` a fraction `alpha` of the way toward `target`.
    pub fn nudge(&mut self, state: usize, action: usize, target: f64, alpha: f64) {
        let i = self.offset(state, action);
        self.values[i] += alpha * (target - self.values[i]);
    }

    /// `Q(s, ·)` as a slice.
    pub fn row(&self, state: usize) -> &[f64] {
        let start = state * self.n_actions;
        &self.values[start..start + self.n_actions]
    }

    /// `max_a Q(s, a)`.
    pub fn max(&self, state: usize) -> f64 {
        self.row(state)
            .iter()
            .copied()
            .fold(f64::NEG_INFINITY, f64::max)
    }

    /// `argmax_a Q(s, a)` with first-max tie-breaking.
    pub fn greedy_action(&self, state: usize) -> usize {
        argmax(self.row(state))
    }

    /// Greedy action for every state.
    pub fn greedy_policy(&self) -> Vec<usize> {
        (0..self.n_states).map(|s| self.greedy_action(s)).collect()
    }

    /// `max_a Q(s, a)` for every state.
    pub fn state_values(&self) -> Vec<f64> {
        (0..self.n_states).map(|s| self.max(s)).collect()
    }

    /// Mean over states of `max_a Q(s, a)`.
    pub fn mean_max(&self) -> f64 {
        if self.n_states == 0 {
            return 0.0;
        }
        self.state_values().iter().sum::<f64>() / self.n_states as f64
    }

    /// The table as one `Vec` per state.
    pub fn to_rows(&self) -> Vec<Vec<f64>> {
        (0..self.n_states).map(|s| self.row(s).to_vec()).collect()
    }
}
