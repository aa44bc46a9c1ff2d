//! An explicit handle over one environment instance.
//!
//! A [`Session`] owns the environment, its current state and the RNG used
//! for training, so callers can hold several independent sessions at once.

use std::collections::HashMap;
use std::fmt;

use rand::rngs::StdRng;
use rand::SeedableRng;
use thiserror::Error;
use tracing::info;

#[cfg(feature = "serde")]
use serde::Serialize;

use crate::algorithms::{run_named, AlgorithmResult, DispatchError};
use crate::environment::{
    Cell, Environment, EnvironmentConfig, EnvironmentDescriptor, EnvironmentError,
    EnvironmentKind, StateSpace, StepResult,
};

/// Upper bound on steps in [`Session::run_episode`].
pub const MAX_EVALUATION_STEPS: usize = 200;

#[derive(Debug, Error, PartialEq)]
pub enum SessionError {
    #[error(transparent)]
    Environment(#[from] EnvironmentError),

    #[error("Action {action} is out of range for {n_actions} actions")]
    ActionOutOfRange { action: usize, n_actions: usize },

    #[error("Policy has {actual} entries but the environment has {expected} states")]
    PolicyLength { expected: usize, actual: usize },

    #[error(transparent)]
    Dispatch(#[from] DispatchError),
}

/// Snapshot of a session's environment.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct EnvironmentInfo {
    pub n_states: usize,
    pub n_actions: usize,
    /// Action names, indexed by action.
    pub actions: Vec<&'static str>,
    /// Current state.
    pub state: Cell,
    pub descriptor: EnvironmentDescriptor,
}

/// One transition of an evaluation episode.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct EpisodeStep {
    pub state: Cell,
    pub action: usize,
    pub reward: f64,
    pub next_state: Cell,
}

/// Outcome of following a fixed policy for one episode.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct EpisodeReport {
    pub trajectory: Vec<EpisodeStep>,
    pub total_reward: f64,
    pub steps: usize,
    /// False when the episode was cut at [`MAX_EVALUATION_STEPS`].
    pub reached_terminal: bool,
}

impl fmt::Display for EpisodeReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== Episode ({} steps) ===", self.steps)?;
        writeln!(f, "  Total reward:      {:.2}", self.total_reward)?;
        writeln!(f, "  Reached terminal:  {}", self.reached_terminal)?;
        if let Some(last) = self.trajectory.last() {
            writeln!(f, "  Final state:       {}", last.next_state)?;
        }
        Ok(())
    }
}

/// An environment instance together with its current state.
#[derive(Debug, Clone)]
pub struct Session {
    env: EnvironmentKind,
    state: Cell,
    rng: StdRng,
}

impl Session {
    /// Builds the environment described by `config` and resets it.
    ///
    /// `seed` drives both the environment's own sampling and training.
    pub fn new(config: EnvironmentConfig, seed: u64) -> Result<Self, SessionError> {
        let mut env = config.build(seed)?;
        let state = env.reset();
        info!(
            environment = env.descriptor().name,
            n_states = env.n_states(),
            seed,
            "environment initialized"
        );
        Ok(Self {
            env,
            state,
            rng: StdRng::seed_from_u64(seed),
        })
    }

    /// Shorthand for [`EnvironmentConfig::named`] followed by [`Session::new`].
    pub fn named(name: &str, seed: u64) -> Result<Self, SessionError> {
        Self::new(EnvironmentConfig::named(name)?, seed)
    }

    pub fn state(&self) -> Cell {
        self.state
    }

    pub fn info(&self) -> EnvironmentInfo {
        EnvironmentInfo {
            n_states: self.env.n_states(),
            n_actions: self.env.n_actions(),
            actions: self.env.action_names().to_vec(),
            state: self.state,
            descriptor: self.env.descriptor(),
        }
    }

    /// Applies `action` to the current state.
    pub fn step(&mut self, action: usize) -> Result<StepResult<Cell>, SessionError> {
        self.check_action(action)?;
        let result = self.env.step(action);
        info!(
            from = %self.state,
            action,
            to = %result.state,
            reward = result.reward,
            done = result.done,
            "step"
        );
        self.state = result.state;
        Ok(result)
    }

    pub fn reset(&mut self) -> Cell {
        self.state = self.env.reset();
        info!(state = %self.state, "environment reset");
        self.state
    }

    /// Trains algorithm `name` on this session's environment.
    ///
    /// Training drives the environment through many episodes, so the session
    /// is reset afterwards.
    pub fn train(
        &mut self,
        name: &str,
        params: &HashMap<String, f64>,
    ) -> Result<AlgorithmResult, SessionError> {
        info!(algorithm = name, "training requested");
        let outcome = run_named(&mut self.env, name, params, &mut self.rng);
        self.state = self.env.reset();
        Ok(outcome?)
    }

    /// Follows `policy` from a fresh reset until a terminal step or
    /// [`MAX_EVALUATION_STEPS`] steps.
    pub fn run_episode(&mut self, policy: &[usize]) -> Result<EpisodeReport, SessionError> {
        let expected = self.env.n_states();
        if policy.len() != expected {
            return Err(SessionError::PolicyLength {
                expected,
                actual: policy.len(),
            });
        }
        if let Some(&action) = policy.iter().find(|&&a| a >= self.env.n_actions()) {
            self.check_action(action)?;
        }

        let mut state = self.env.reset();
        let mut trajectory = Vec::new();
        let mut total_reward = 0.0;
        let mut reached_terminal = false;

        while trajectory.len() < MAX_EVALUATION_STEPS {
            let action = policy[self.env.state_to_idx(&state)];
            let result = self.env.step(action);
            trajectory.push(EpisodeStep {
                state,
                action,
                reward: result.reward,
                next_state: result.state,
            });
            total_reward += result.reward;
            state = result.state;
            if result.done {
                reached_terminal = true;
                break;
            }
        }
        self.state = state;

        let report = EpisodeReport {
            steps: trajectory.len(),
            trajectory,
            total_reward,
            reached_terminal,
        };
        info!(
            steps = report.steps,
            total_reward = report.total_reward,
            reached_terminal = report.reached_terminal,
            "episode finished"
        );
        Ok(report)
    }

    fn check_action(&self, action: usize) -> Result<(), SessionError> {
        let n_actions = self.env.n_actions();
        if action >= n_actions {
            return Err(SessionError::ActionOutOfRange { action, n_actions });
        }
        Ok(())
    }
}
