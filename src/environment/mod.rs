//! The environment contract consumed by the algorithms, plus the built-in
//! grid environments used for experiments and tests.
//!
//! Sample-based algorithms only need [`Environment`]: a finite state space
//! with an index bijection, `reset` and `step`. Dynamic-programming planners
//! additionally need the exact one-step dynamics, exposed through
//! [`TransitionModel`] and reached via [`Environment::model`].
//!
//! The concrete environments are unified under [`EnvironmentKind`], which
//! reports a fixed [`EnvironmentDescriptor`] for each variant instead of
//! letting callers probe for optional fields.

pub mod cliff_walking;
pub mod error;
pub mod frozen_lake;
pub mod grid_world;
pub mod types;

pub use cliff_walking::CliffWalking;
pub use error::EnvironmentError;
pub use frozen_lake::FrozenLake;
pub use grid_world::GridWorld;
pub use types::{Cell, Move};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Result of a single environment step.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct StepResult<S> {
    /// State after the step.
    pub state: S,
    /// Reward received for the step.
    pub reward: f64,
    /// Whether the episode ended.
    pub done: bool,
}

/// One possible outcome of taking an action in a state.
///
/// For a fixed `(state, action)`, the probabilities of all returned
/// transitions sum to 1. A `terminal` transition is never bootstrapped.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Transition<S> {
    pub next_state: S,
    pub probability: f64,
    pub reward: f64,
    pub terminal: bool,
}

impl<S> Transition<S> {
    pub fn new(next_state: S, probability: f64, reward: f64, terminal: bool) -> Self {
        Self {
            next_state,
            probability,
            reward,
            terminal,
        }
    }
}

/// A finite state and action space with a bijection between states and
/// indices in `[0, n_states)`.
///
/// `state_to_idx` and `idx_to_state` must be mutual inverses. The algorithms
/// index their tables with whatever these return and do not validate them.
pub trait StateSpace {
    type State;

    fn n_states(&self) -> usize;

    fn n_actions(&self) -> usize;

    fn state_to_idx(&self, state: &Self::State) -> usize;

    fn idx_to_state(&self, idx: usize) -> Self::State;
}

/// An episodic environment driven through `reset`/`step`.
///
/// Algorithms assume exclusive, sequential use of an environment for the
/// length of one run.
pub trait Environment: StateSpace {
    /// Starts a new episode and returns its initial state.
    fn reset(&mut self) -> Self::State;

    /// Applies `action` in the current state.
    fn step(&mut self, action: usize) -> StepResult<Self::State>;

    /// Exact one-step dynamics, when the environment can provide them.
    fn model(&self) -> Option<&dyn TransitionModel<State = Self::State>> {
        None
    }
}

/// Exact one-step dynamics of an MDP, as needed by the planners.
pub trait TransitionModel: StateSpace {
    /// All outcomes of taking `action` in `state`.
    fn transitions(&self, state: &Self::State, action: usize) -> Vec<Transition<Self::State>>;
}

/// Fixed metadata describing the layout of a built-in environment.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct EnvironmentDescriptor {
    pub name: &'static str,
    pub height: usize,
    pub width: usize,
    pub start: Cell,
    pub goal: Cell,
    /// Cells the agent cannot enter.
    pub obstacles: Vec<Cell>,
    /// Cells that punish the agent on entry (cliff edge, lake holes).
    pub hazards: Vec<Cell>,
}

/// Construction parameters for a built-in environment.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "env", rename_all = "snake_case"))]
pub enum EnvironmentConfig {
    GridWorld {
        size: usize,
        goal: Cell,
        obstacles: Vec<Cell>,
    },
    CliffWalking,
    FrozenLake {
        slippery: bool,
    },
}

impl EnvironmentConfig {
    /// Default configuration for an environment name.
    ///
    /// Recognized names are `gridworld`, `cliffwalking` and `frozenlake`.
    pub fn named(name: &str) -> Result<Self, EnvironmentError> {
        match name {
            "gridworld" => Ok(Self::GridWorld {
                size: GridWorld::DEFAULT_SIZE,
                goal: Cell::new(GridWorld::DEFAULT_SIZE - 1, GridWorld::DEFAULT_SIZE - 1),
                obstacles: Vec::new(),
            }),
            "cliffwalking" => Ok(Self::CliffWalking),
            "frozenlake" => Ok(Self::FrozenLake { slippery: true }),
            other => Err(EnvironmentError::UnknownEnvironment(other.to_string())),
        }
    }

    /// Builds the environment. `seed` drives any stochastic dynamics.
    pub fn build(self, seed: u64) -> Result<EnvironmentKind, EnvironmentError> {
        Ok(match self {
            Self::GridWorld {
                size,
                goal,
                obstacles,
            } => EnvironmentKind::GridWorld(GridWorld::new(size, goal, obstacles)?),
            Self::CliffWalking => EnvironmentKind::CliffWalking(CliffWalking::new()),
            Self::FrozenLake { slippery } => {
                EnvironmentKind::FrozenLake(FrozenLake::new(slippery, seed))
            }
        })
    }
}

/// Tagged union over the built-in environments.
#[derive(Debug, Clone)]
pub enum EnvironmentKind {
    GridWorld(GridWorld),
    CliffWalking(CliffWalking),
    FrozenLake(FrozenLake),
}

impl EnvironmentKind {
    /// Layout metadata for this environment.
    pub fn descriptor(&self) -> EnvironmentDescriptor {
        match self {
            Self::GridWorld(env) => env.descriptor(),
            Self::CliffWalking(env) => env.descriptor(),
            Self::FrozenLake(env) => env.descriptor(),
        }
    }

    /// Action names, indexed by action.
    pub fn action_names(&self) -> &'static [&'static str] {
        &Move::NAMES
    }
}

impl StateSpace for EnvironmentKind {
    type State = Cell;

    fn n_states(&self) -> usize {
        match self {
            Self::GridWorld(env) => env.n_states(),
            Self::CliffWalking(env) => env.n_states(),
            Self::FrozenLake(env) => env.n_states(),
        }
    }

    fn n_actions(&self) -> usize {
        Move::COUNT
    }

    fn state_to_idx(&self, state: &Cell) -> usize {
        match self {
            Self::GridWorld(env) => env.state_to_idx(state),
            Self::CliffWalking(env) => env.state_to_idx(state),
            Self::FrozenLake(env) => env.state_to_idx(state),
        }
    }

    fn idx_to_state(&self, idx: usize) -> Cell {
        match self {
            Self::GridWorld(env) => env.idx_to_state(idx),
            Self::CliffWalking(env) => env.idx_to_state(idx),
            Self::FrozenLake(env) => env.idx_to_state(idx),
        }
    }
}

impl Environment for EnvironmentKind {
    fn reset(&mut self) -> Cell {
        match self {
            Self::GridWorld(env) => env.reset(),
            Self::CliffWalking(env) => env.reset(),
            Self::FrozenLake(env) => env.reset(),
        }
    }

    fn step(&mut self, action: usize) -> StepResult<Cell> {
        match self {
            Self::GridWorld(env) => env.step(action),
            Self::CliffWalking(env) => env.step(action),
            Self::FrozenLake(env) => env.step(action),
        }
    }

    fn model(&self) -> Option<&dyn TransitionModel<State = Cell>> {
        Some(self)
    }
}

impl TransitionModel for EnvironmentKind {
    fn transitions(&self, state: &Cell, action: usize) -> Vec<Transition<Cell>> {
        match self {
            Self::GridWorld(env) => env.transitions(state, action),
            Self::CliffWalking(env) => env.transitions(state, action),
            Self::FrozenLake(env) => env.transitions(state, action),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn all_kinds() -> Vec<EnvironmentKind> {
        ["gridworld", "cliffwalking", "frozenlake"]
            .iter()
            .map(|name| EnvironmentConfig::named(name).unwrap().build(7).unwrap())
            .collect()
    }

    #[test]
    fn index_mapping_is_a_bijection() {
        for env in all_kinds() {
            for i in 0..env.n_states() {
                let state = env.idx_to_state(i);
                assert_eq!(env.state_to_idx(&state), i);
                assert_eq!(env.idx_to_state(env.state_to_idx(&state)), state);
            }
        }
    }

    #[test]
    fn transition_probabilities_sum_to_one() {
        for env in all_kinds() {
            for i in 0..env.n_states() {
                let state = env.idx_to_state(i);
                for a in 0..env.n_actions() {
                    let total: f64 = env
                        .transitions(&state, a)
                        .iter()
                        .map(|t| t.probability)
                        .sum();
                    assert!((total - 1.0).abs() < 1e-9, "state {state} action {a}");
                }
            }
        }
    }

    #[test]
    fn descriptor_matches_state_space() {
        for env in all_kinds() {
            let d = env.descriptor();
            assert_eq!(d.height * d.width, env.n_states());
            assert_eq!(env.action_names().len(), env.n_actions());
        }
    }

    #[test]
    fn every_kind_exposes_a_model() {
        for env in all_kinds() {
            assert!(env.model().is_some());
        }
    }

    #[test]
    fn unknown_name_is_rejected() {
        assert_eq!(
            EnvironmentConfig::named("cartpole"),
            Err(EnvironmentError::UnknownEnvironment("cartpole".to_string()))
        );
    }

    #[cfg(feature = "serde")]
    #[test]
    fn config_deserializes_from_tagged_json() {
        let json = r#"{"env":"frozen_lake","slippery":false}"#;
        let config: EnvironmentConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config, EnvironmentConfig::FrozenLake { slippery: false });
    }
}
