//! Core types shared by the grid-shaped reference environments.
//!
//! Defines the cell coordinate used as the state of every built-in
//! environment and the four compass moves that make up their action space.

use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A cell of a rectangular grid, addressed by row then column.
///
/// Row 0 is the top edge; column 0 is the left edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Cell {
    pub row: usize,
    pub col: usize,
}

impl Cell {
    /// Creates a new cell.
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    /// Row-major index of this cell in a grid `width` columns wide.
    pub fn to_index(&self, width: usize) -> usize {
        self.row * width + self.col
    }

    /// Inverse of [`Cell::to_index`].
    pub fn from_index(idx: usize, width: usize) -> Self {
        Self {
            row: idx / width,
            col: idx % width,
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// One of the four grid moves. The discriminant is the action index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Move {
    Up = 0,
    Down = 1,
    Left = 2,
    Right = 3,
}

impl Move {
    /// Number of moves, i.e. the size of the grid action space.
    pub const COUNT: usize = 4;

    /// Human-readable names, indexed by action.
    pub const NAMES: [&'static str; Self::COUNT] = ["up", "down", "left", "right"];

    /// Returns all moves in action-index order.
    pub fn all() -> [Move; Self::COUNT] {
        [Move::Up, Move::Down, Move::Left, Move::Right]
    }

    /// Maps an action index back to a move, if it is one.
    pub fn from_index(action: usize) -> Option<Move> {
        Self::all().get(action).copied()
    }

    /// Action index of this move.
    pub fn index(&self) -> usize {
        *self as usize
    }

    /// Applies the move to `cell`, clamping at the borders of a
    /// `height` × `width` grid.
    pub fn apply(&self, cell: Cell, height: usize, width: usize) -> Cell {
        let Cell { row, col } = cell;
        match self {
            Move::Up => Cell::new(row.saturating_sub(1), col),
            Move::Down => Cell::new((row + 1).min(height - 1), col),
            Move::Left => Cell::new(row, col.saturating_sub(1)),
            Move::Right => Cell::new(row, (col + 1).min(width - 1)),
        }
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(Self::NAMES[self.index()])
    }
}

/// Applies `action` if it names a move; any other index leaves the agent put.
pub(crate) fn apply_action(cell: Cell, action: usize, height: usize, width: usize) -> Cell {
    match Move::from_index(action) {
        Some(m) => m.apply(cell, height, width),
        None => cell,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_round_trip_covers_grid() {
        for idx in 0..12 {
            let cell = Cell::from_index(idx, 4);
            assert_eq!(cell.to_index(4), idx);
        }
        assert_eq!(Cell::from_index(7, 4), Cell::new(1, 3));
    }

    #[test]
    fn moves_clamp_at_borders() {
        let corner = Cell::new(0, 0);
        assert_eq!(Move::Up.apply(corner, 3, 3), corner);
        assert_eq!(Move::Left.apply(corner, 3, 3), corner);
        assert_eq!(Move::Down.apply(corner, 3, 3), Cell::new(1, 0));

        let far = Cell::new(2, 2);
        assert_eq!(Move::Down.apply(far, 3, 3), far);
        assert_eq!(Move::Right.apply(far, 3, 3), far);
    }

    #[test]
    fn move_indices_match_names() {
        for m in Move::all() {
            assert_eq!(Move::from_index(m.index()), Some(m));
            assert_eq!(m.to_string(), Move::NAMES[m.index()]);
        }
        assert_eq!(Move::from_index(4), None);
    }

    #[test]
    fn unknown_action_is_a_no_op() {
        let cell = Cell::new(1, 1);
        assert_eq!(apply_action(cell, 9, 3, 3), cell);
    }
}
