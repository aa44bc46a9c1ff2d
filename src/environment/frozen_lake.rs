//! The 4 × 4 frozen lake, with optional slippery ice.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::types::{apply_action, Cell, Move};
use super::{Environment, EnvironmentDescriptor, StateSpace, StepResult, Transition, TransitionModel};

/// Frozen lake on the classic 4 × 4 map.
///
/// ```text
/// S . . .
/// . H . H
/// . . . H
/// H . . G
/// ```
///
/// Falling into a hole ends the episode with −10, reaching the goal ends it
/// with +10, every other move costs −1. On slippery ice the intended move
/// happens with probability 0.7 and each other move with probability 0.1.
///
/// Stepping samples from the same model the planners read, using an RNG
/// seeded at construction. Each reset advances the seed so successive
/// episodes differ but the whole run is reproducible.
#[derive(Debug, Clone)]
pub struct FrozenLake {
    slippery: bool,
    position: Cell,
    rng: StdRng,
    seed: u64,
}

impl FrozenLake {
    pub const SIZE: usize = 4;
    pub const START: Cell = Cell::new(0, 0);
    pub const GOAL: Cell = Cell::new(3, 3);
    pub const HOLES: [Cell; 4] = [
        Cell::new(1, 1),
        Cell::new(1, 3),
        Cell::new(2, 3),
        Cell::new(3, 0),
    ];
    pub const INTENDED_PROBABILITY: f64 = 0.7;
    pub const SLIP_PROBABILITY: f64 = 0.1;
    pub const GOAL_REWARD: f64 = 10.0;
    pub const HOLE_REWARD: f64 = -10.0;
    pub const STEP_REWARD: f64 = -1.0;

    pub fn new(slippery: bool, seed: u64) -> Self {
        Self {
            slippery,
            position: Self::START,
            rng: StdRng::seed_from_u64(seed),
            seed,
        }
    }

    pub fn is_hole(cell: &Cell) -> bool {
        Self::HOLES.contains(cell)
    }

    pub fn descriptor(&self) -> EnvironmentDescriptor {
        EnvironmentDescriptor {
            name: "frozenlake",
            height: Self::SIZE,
            width: Self::SIZE,
            start: Self::START,
            goal: Self::GOAL,
            obstacles: Vec::new(),
            hazards: Self::HOLES.to_vec(),
        }
    }

    fn landing(from: Cell, action: usize, probability: f64) -> Transition<Cell> {
        let next = apply_action(from, action, Self::SIZE, Self::SIZE);
        if Self::is_hole(&next) {
            Transition::new(next, probability, Self::HOLE_REWARD, true)
        } else if next == Self::GOAL {
            Transition::new(next, probability, Self::GOAL_REWARD, true)
        } else {
            Transition::new(next, probability, Self::STEP_REWARD, false)
        }
    }
}

/// Draws one outcome from a transition list by walking its cumulative
/// probabilities. Rounding slack falls through to the last outcome.
fn sample<'a, R: Rng + ?Sized>(
    transitions: &'a [Transition<Cell>],
    rng: &mut R,
) -> &'a Transition<Cell> {
    let mut u = rng.gen::<f64>();
    for t in transitions {
        if u < t.probability {
            return t;
        }
        u -= t.probability;
    }
    &transitions[transitions.len() - 1]
}

impl StateSpace for FrozenLake {
    type State = Cell;

    fn n_states(&self) -> usize {
        Self::SIZE * Self::SIZE
    }

    fn n_actions(&self) -> usize {
        Move::COUNT
    }

    fn state_to_idx(&self, state: &Cell) -> usize {
        state.to_index(Self::SIZE)
    }

    fn idx_to_state(&self, idx: usize) -> Cell {
        Cell::from_index(idx, Self::SIZE)
    }
}

impl Environment for FrozenLake {
    fn reset(&mut self) -> Cell {
        self.rng = StdRng::seed_from_u64(self.seed);
        self.seed = self.seed.wrapping_add(1);
        self.position = Self::START;
        self.position
    }

    fn step(&mut self, action: usize) -> StepResult<Cell> {
        let transitions = self.transitions(&self.position, action);
        let outcome = sample(&transitions, &mut self.rng);
        self.position = outcome.next_state;
        StepResult {
            state: outcome.next_state,
            reward: outcome.reward,
            done: outcome.terminal,
        }
    }

    fn model(&self) -> Option<&dyn TransitionModel<State = Cell>> {
        Some(self)
    }
}

impl TransitionModel for FrozenLake {
    fn transitions(&self, state: &Cell, action: usize) -> Vec<Transition<Cell>> {
        if Self::is_hole(state) || *state == Self::GOAL {
            return vec![Transition::new(*state, 1.0, 0.0, true)];
        }
        if !self.slippery {
            return vec![Self::landing(*state, action, 1.0)];
        }
        Move::all()
            .iter()
            .map(|m| {
                let p = if m.index() == action {
                    Self::INTENDED_PROBABILITY
                } else {
                    Self::SLIP_PROBABILITY
                };
                Self::landing(*state, m.index(), p)
            })
            .collect()
    }
}
