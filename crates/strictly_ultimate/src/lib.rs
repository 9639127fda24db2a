//! Strictly Ultimate - pure Ultimate Tic-Tac-Toe rules.
//!
//! Nine 3x3 sub-boards make up a 9x9 board. The local position of each move
//! inside its sub-board selects the sub-board the opponent must play in
//! next. Three sub-boards won in a row on the meta-board wins the match.
//!
//! # Architecture
//!
//! - **Board State** ([`BoardState`]): cell grid, meta-board, active pointer
//! - **Rules** ([`rules`]): legality, win and draw detection, enumeration
//! - **Turn engine** ([`Game`]): validate, place, resolve, switch player
//!
//! # Example
//!
//! ```
//! use strictly_ultimate::{Coord, Game, GridPos};
//!
//! let mut game = Game::new();
//! game.play(Coord::new(4, 4)?)?;
//! assert_eq!(game.active_sub_board(), GridPos::new(1, 1));
//! # Ok::<(), strictly_ultimate::MoveError>(())
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod action;
mod board;
mod game;
pub mod rules;
mod types;

pub use action::{Move, MoveError};
pub use board::{Board, BoardState, MetaBoard};
pub use game::{Game, GameSnapshot};
pub use types::{Cell, Coord, GameStatus, GridPos, Mark};
