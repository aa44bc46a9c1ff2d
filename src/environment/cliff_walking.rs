//! The 4 × 12 cliff-walking grid.

use super::types::{apply_action, Cell, Move};
use super::{Environment, EnvironmentDescriptor, StateSpace, StepResult, Transition, TransitionModel};

/// Cliff walking: start bottom-left, goal bottom-right, and the cells
/// between them along the bottom row are a cliff.
///
/// Stepping off the cliff costs −100 and sends the agent back to the start
/// without ending the episode.
#[derive(Debug, Clone)]
pub struct CliffWalking {
    position: Cell,
}

impl CliffWalking {
    pub const HEIGHT: usize = 4;
    pub const WIDTH: usize = 12;
    pub const START: Cell = Cell::new(3, 0);
    pub const GOAL: Cell = Cell::new(3, 11);
    pub const CLIFF_REWARD: f64 = -100.0;
    pub const GOAL_REWARD: f64 = 10.0;
    pub const STEP_REWARD: f64 = -1.0;

    pub fn new() -> Self {
        Self {
            position: Self::START,
        }
    }

    pub fn is_cliff(cell: &Cell) -> bool {
        cell.row == Self::HEIGHT - 1 && (1..Self::WIDTH - 1).contains(&cell.col)
    }

    pub fn cliff() -> Vec<Cell> {
        (1..Self::WIDTH - 1)
            .map(|col| Cell::new(Self::HEIGHT - 1, col))
            .collect()
    }

    pub fn descriptor(&self) -> EnvironmentDescriptor {
        EnvironmentDescriptor {
            name: "cliffwalking",
            height: Self::HEIGHT,
            width: Self::WIDTH,
            start: Self::START,
            goal: Self::GOAL,
            obstacles: Vec::new(),
            hazards: Self::cliff(),
        }
    }

    /// Where the agent lands, the reward, and whether the episode ends.
    fn outcome(from: Cell, action: usize) -> (Cell, f64, bool) {
        let next = apply_action(from, action, Self::HEIGHT, Self::WIDTH);
        if Self::is_cliff(&next) {
            (Self::START, Self::CLIFF_REWARD, false)
        } else if next == Self::GOAL {
            (next, Self::GOAL_REWARD, true)
        } else {
            (next, Self::STEP_REWARD, false)
        }
    }
}

impl Default for CliffWalking {
    fn default() -> Self {
        Self::new()
    }
}

impl StateSpace for CliffWalking {
    type State = Cell;

    fn n_states(&self) -> usize {
        Self::HEIGHT * Self::WIDTH
    }

    fn n_actions(&self) -> usize {
        Move::COUNT
    }

    fn state_to_idx(&self, state: &Cell) -> usize {
        state.to_index(Self::WIDTH)
    }

    fn idx_to_state(&self, idx: usize) -> Cell {
        Cell::from_index(idx, Self::WIDTH)
    }
}

impl Environment for CliffWalking {
    fn reset(&mut self) -> Cell {
        self.position = Self::START;
        self.position
    }

    fn step(&mut self, action: usize) -> StepResult<Cell> {
        let (state, reward, done) = Self::outcome(self.position, action);
        self.position = state;
        StepResult {
            state,
            reward,
            done,
        }
    }

    fn model(&self) -> Option<&dyn TransitionModel<State = Cell>> {
        Some(self)
    }
}

impl TransitionModel for CliffWalking {
    fn transitions(&self, state: &Cell, action: usize) -> Vec<Transition<Cell>> {
        if *state == Self::GOAL {
            return vec![Transition::new(*state, 1.0, 0.0, true)];
        }
        let (next, reward, terminal) = Self::outcome(*state, action);
        vec![Transition::new(next, 1.0, reward, terminal)]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cliff_sends_agent_back_to_start() {
        let mut env = CliffWalking::new();
        env.reset();
        let result = env.step(Move::Right.index());
        assert_eq!(result.state, CliffWalking::START);
        assert_eq!(result.reward, -100.0);
        assert!(!result.done);
    }

    #[test]
    fn cliff_cells_are_hazards() {
        let cliff = CliffWalking::cliff();
        assert_eq!(cliff.len(), 10);
        assert!(!CliffWalking::is_cliff(&CliffWalking::START));
        assert!(!CliffWalking::is_cliff(&CliffWalking::GOAL));
        assert_eq!(CliffWalking::new().descriptor().hazards, cliff);
    }

    #[test]
    fn goal_ends_episode() {
        let env = CliffWalking::new();
        let ts = env.transitions(&Cell::new(2, 11), Move::Down.index());
        assert_eq!(ts, vec![Transition::new(CliffWalking::GOAL, 1.0, 10.0, true)]);
    }

    #[test]
    fn model_matches_step_for_cliff_edge() {
        let env = CliffWalking::new();
        let ts = env.transitions(&Cell::new(2, 5), Move::Down.index());
        assert_eq!(
            ts,
            vec![Transition::new(CliffWalking::START, 1.0, -100.0, false)]
        );
    }
}
