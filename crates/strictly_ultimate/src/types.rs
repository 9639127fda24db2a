//! Core domain types for Ultimate Tic-Tac-Toe.

use super::action::MoveError;
use serde::{Deserialize, Serialize};

/// Side of the board (a mark placed in a cell).
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    derive_more::Display,
    strum::EnumIter,
)]
pub enum Mark {
    /// Player X (goes first).
    X,
    /// Player O (goes second).
    O,
}

impl Mark {
    /// Returns the opposing mark.
    pub fn opponent(self) -> Self {
        match self {
            Mark::X => Mark::O,
            Mark::O => Mark::X,
        }
    }

    /// Single-character symbol used in text renderings and fingerprints.
    pub fn symbol(self) -> char {
        match self {
            Mark::X => 'X',
            Mark::O => 'O',
        }
    }
}

/// A cell of the 9x9 board or of the 3x3 meta-board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Cell {
    /// Nothing placed (or, on the meta-board, an undecided sub-board).
    #[default]
    Empty,
    /// Cell holds a mark.
    Occupied(Mark),
}

impl Cell {
    /// Returns the mark in this cell, if any.
    pub fn mark(self) -> Option<Mark> {
        match self {
            Cell::Empty => None,
            Cell::Occupied(mark) => Some(mark),
        }
    }

    /// True when no mark is present.
    pub fn is_empty(self) -> bool {
        self == Cell::Empty
    }

    /// Symbol for text output; blank for an empty cell.
    pub fn symbol(self) -> char {
        self.mark().map_or(' ', Mark::symbol)
    }
}

impl From<Option<Mark>> for Cell {
    fn from(mark: Option<Mark>) -> Self {
        mark.map_or(Cell::Empty, Cell::Occupied)
    }
}

/// A position on a 3x3 grid, each axis in `0..3`.
///
/// Used both to address a sub-board within the 9x9 board and to address
/// a local cell within one sub-board.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::Display,
)]
#[display("({row}, {col})")]
pub struct GridPos {
    row: usize,
    col: usize,
}

impl GridPos {
    /// Creates a grid position, or `None` if either axis is outside `0..3`.
    pub fn new(row: usize, col: usize) -> Option<Self> {
        (row < 3 && col < 3).then_some(Self { row, col })
    }

    /// Row within the 3x3 grid.
    pub fn row(&self) -> usize {
        self.row
    }

    /// Column within the 3x3 grid.
    pub fn col(&self) -> usize {
        self.col
    }

    /// All nine positions in row-major order.
    pub fn all() -> impl Iterator<Item = GridPos> {
        (0..3).flat_map(|row| (0..3).map(move |col| GridPos { row, col }))
    }
}

/// Absolute address of a cell on the 9x9 board, each axis in `0..9`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::Display,
)]
#[display("({row}, {col})")]
pub struct Coord {
    row: usize,
    col: usize,
}

impl Coord {
    /// Creates a board coordinate.
    ///
    /// # Errors
    ///
    /// Returns [`MoveError::OutOfBounds`] if either axis is outside `0..9`.
    pub fn new(row: usize, col: usize) -> Result<Self, MoveError> {
        if row < 9 && col < 9 {
            Ok(Self { row, col })
        } else {
            Err(MoveError::OutOfBounds { row, col })
        }
    }

    /// Builds the absolute coordinate of `local` inside sub-board `sub`.
    pub fn from_parts(sub: GridPos, local: GridPos) -> Self {
        Self {
            row: sub.row * 3 + local.row,
            col: sub.col * 3 + local.col,
        }
    }

    /// Absolute row.
    pub fn row(&self) -> usize {
        self.row
    }

    /// Absolute column.
    pub fn col(&self) -> usize {
        self.col
    }

    /// The sub-board containing this cell: `(row / 3, col / 3)`.
    pub fn sub_board(&self) -> GridPos {
        GridPos {
            row: self.row / 3,
            col: self.col / 3,
        }
    }

    /// Position of this cell inside its sub-board: `(row % 3, col % 3)`.
    ///
    /// This is also the sub-board the opponent is routed to after a move here.
    pub fn local(&self) -> GridPos {
        GridPos {
            row: self.row % 3,
            col: self.col % 3,
        }
    }

    /// The `(sub-row, sub-col, local-row, local-col)` form used on the wire.
    pub fn quad(&self) -> [usize; 4] {
        let sub = self.sub_board();
        let local = self.local();
        [sub.row, sub.col, local.row, local.col]
    }

    /// All 81 coordinates in row-major order.
    pub fn all() -> impl Iterator<Item = Coord> {
        (0..9).flat_map(|row| (0..9).map(move |col| Coord { row, col }))
    }
}

/// Outcome state of the match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GameStatus {
    /// Moves are still being played.
    InProgress,
    /// A player completed three sub-boards in a row.
    Won(Mark),
    /// Every cell is filled without a meta-board line.
    Draw,
}

impl GameStatus {
    /// True once the match is terminal.
    pub fn is_over(&self) -> bool {
        !matches!(self, GameStatus::InProgress)
    }

    /// The winner, if the match was won.
    pub fn winner(&self) -> Option<Mark> {
        match self {
            GameStatus::Won(mark) => Some(*mark),
            _ => None,
        }
    }
}
