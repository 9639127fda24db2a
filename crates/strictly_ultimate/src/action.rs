//! First-class move types for Ultimate Tic-Tac-Toe.
//!
//! Moves are domain events: a player placing a mark at a board coordinate.
//! They are recorded in the game history and drive both the active
//! sub-board pointer and the opponent/training protocols.

use super::{Coord, GridPos, Mark};
use serde::{Deserialize, Serialize};

/// A mark placed by a player at an absolute coordinate.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::Display,
)]
#[display("{player} -> {coord}")]
pub struct Move {
    /// The player who placed the mark.
    pub player: Mark,
    /// Where the mark was placed.
    pub coord: Coord,
}

impl Move {
    /// Creates a new move.
    pub fn new(player: Mark, coord: Coord) -> Self {
        Self { player, coord }
    }

    /// The sub-board the next player is sent to by this move.
    pub fn routed_sub_board(&self) -> GridPos {
        self.coord.local()
    }
}

/// Why a move could not be played.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display)]
pub enum MoveError {
    /// A coordinate axis is outside `0..9`.
    #[display("Coordinate ({row}, {col}) is outside the 9x9 board")]
    OutOfBounds {
        /// Requested row.
        row: usize,
        /// Requested column.
        col: usize,
    },

    /// The target cell already holds a mark.
    #[display("Cell {_0} is already occupied")]
    CellOccupied(Coord),

    /// The move is outside the sub-board the player was routed to.
    #[display("Move must be played in sub-board {expected}, not {actual}")]
    WrongSubBoard {
        /// Sub-board the player is required to play in.
        expected: GridPos,
        /// Sub-board the move targeted.
        actual: GridPos,
    },

    /// The game has already ended.
    #[display("Game is already over")]
    GameOver,

    /// A placed mark has not been resolved yet.
    #[display("Previous move has not been resolved")]
    ResolutionPending,
}

impl std::error::Error for MoveError {}
