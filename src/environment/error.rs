use thiserror::Error;

use super::types::Cell;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EnvironmentError {
    #[error("Unknown environment: {0}")]
    UnknownEnvironment(String),

    #[error("Grid must have at least one cell")]
    EmptyGrid,

    #[error("Goal {goal} lies outside a {size}x{size} grid")]
    GoalOutOfBounds { goal: Cell, size: usize },
}
