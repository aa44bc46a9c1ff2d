//! Deterministic square grid with an optional set of walls.

use super::error::EnvironmentError;
use super::types::{apply_action, Cell, Move};
use super::{Environment, EnvironmentDescriptor, StateSpace, StepResult, Transition, TransitionModel};

/// A `size` × `size` grid where the agent starts in the top-left corner and
/// must reach `goal`.
///
/// Every move costs −1; reaching the goal pays +10 and ends the episode.
/// Moves that would leave the grid or enter an obstacle leave the agent in
/// place.
#[derive(Debug, Clone)]
pub struct GridWorld {
    size: usize,
    goal: Cell,
    obstacles: Vec<Cell>,
    position: Cell,
}

impl GridWorld {
    pub const DEFAULT_SIZE: usize = 5;
    pub const START: Cell = Cell::new(0, 0);
    pub const GOAL_REWARD: f64 = 10.0;
    pub const STEP_REWARD: f64 = -1.0;

    /// Creates a grid world.
    ///
    /// # Errors
    ///
    /// Fails if the grid is empty or the goal lies outside it.
    pub fn new(size: usize, goal: Cell, obstacles: Vec<Cell>) -> Result<Self, EnvironmentError> {
        if size == 0 {
            return Err(EnvironmentError::EmptyGrid);
        }
        if goal.row >= size || goal.col >= size {
            return Err(EnvironmentError::GoalOutOfBounds { goal, size });
        }
        Ok(Self {
            size,
            goal,
            obstacles,
            position: Self::START,
        })
    }

    pub fn goal(&self) -> Cell {
        self.goal
    }

    pub fn descriptor(&self) -> EnvironmentDescriptor {
        EnvironmentDescriptor {
            name: "gridworld",
            height: self.size,
            width: self.size,
            start: Self::START,
            goal: self.goal,
            obstacles: self.obstacles.clone(),
            hazards: Vec::new(),
        }
    }

    fn next_cell(&self, from: Cell, action: usize) -> Cell {
        let next = apply_action(from, action, self.size, self.size);
        if self.obstacles.contains(&next) {
            from
        } else {
            next
        }
    }

    fn reward_for(&self, cell: Cell) -> (f64, bool) {
        if cell == self.goal {
            (Self::GOAL_REWARD, true)
        } else {
            (Self::STEP_REWARD, false)
        }
    }
}

impl Default for GridWorld {
    fn default() -> Self {
        let last = Self::DEFAULT_SIZE - 1;
        Self {
            size: Self::DEFAULT_SIZE,
            goal: Cell::new(last, last),
            obstacles: Vec::new(),
            position: Self::START,
        }
    }
}

impl StateSpace for GridWorld {
    type State = Cell;

    fn n_states(&self) -> usize {
        self.size * self.size
    }

    fn n_actions(&self) -> usize {
        Move::COUNT
    }

    fn state_to_idx(&self, state: &Cell) -> usize {
        state.to_index(self.size)
    }

    fn idx_to_state(&self, idx: usize) -> Cell {
        Cell::from_index(idx, self.size)
    }
}

impl Environment for GridWorld {
    fn reset(&mut self) -> Cell {
        self.position = Self::START;
        self.position
    }

    fn step(&mut self, action: usize) -> StepResult<Cell> {
        self.position = self.next_cell(self.position, action);
        let (reward, done) = self.reward_for(self.position);
        StepResult {
            state: self.position,
            reward,
            done,
        }
    }

    fn model(&self) -> Option<&dyn TransitionModel<State = Cell>> {
        Some(self)
    }
}

impl TransitionModel for GridWorld {
    fn transitions(&self, state: &Cell, action: usize) -> Vec<Transition<Cell>> {
        if *state == self.goal {
            return vec![Transition::new(*state, 1.0, 0.0, true)];
        }
        let next = self.next_cell(*state, action);
        let (reward, terminal) = self.reward_for(next);
        vec![Transition::new(next, 1.0, reward, terminal)]
    }
}
