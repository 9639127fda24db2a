//! Synchronous turn engine for Ultimate Tic-Tac-Toe.
//!
//! A move runs through validate, place, resolve. [`Game::play`] performs the
//! whole sequence; [`Game::place_mark`] and [`Game::resolve`] expose the two
//! halves separately so an async driver can pause between them.

use super::action::{Move, MoveError};
use super::board::{Board, BoardState, MetaBoard};
use super::rules;
use super::types::{Coord, GameStatus, GridPos, Mark};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

/// Ultimate Tic-Tac-Toe game engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Game {
    state: BoardState,
    current_player: Mark,
    status: GameStatus,
    history: Vec<Move>,
    pending: Option<Move>,
}

impl Game {
    /// Creates a new game with X to move and no sub-board constraint.
    #[instrument]
    pub fn new() -> Self {
        Self {
            state: BoardState::new(),
            current_player: Mark::X,
            status: GameStatus::InProgress,
            history: Vec::new(),
            pending: None,
        }
    }

    /// Board, meta-board and active pointer.
    pub fn board_state(&self) -> &BoardState {
        &self.state
    }

    /// The 9x9 cell grid.
    pub fn board(&self) -> &Board {
        self.state.board()
    }

    /// The 3x3 meta-board.
    pub fn meta_board(&self) -> &MetaBoard {
        self.state.meta_board()
    }

    /// Sub-board the next move is routed to, `None` when unconstrained.
    pub fn active_sub_board(&self) -> Option<GridPos> {
        self.state.active_sub_board()
    }

    /// Player whose turn it is.
    pub fn current_player(&self) -> Mark {
        self.current_player
    }

    /// Current match status.
    pub fn status(&self) -> GameStatus {
        self.status
    }

    /// True once the match is won or drawn.
    pub fn is_over(&self) -> bool {
        self.status.is_over()
    }

    /// The winner, if any.
    pub fn winner(&self) -> Option<Mark> {
        self.status.winner()
    }

    /// Every move applied so far, oldest first.
    pub fn history(&self) -> &[Move] {
        &self.history
    }

    /// The most recently applied move.
    pub fn last_move(&self) -> Option<Move> {
        self.pending.or_else(|| self.history.last().copied())
    }

    /// Checks whether `coord` may be played now.
    ///
    /// # Errors
    ///
    /// [`MoveError::GameOver`], [`MoveError::ResolutionPending`], or any rule
    /// violation from [`rules::validate_move`].
    pub fn validate(&self, coord: Coord) -> Result<(), MoveError> {
        if self.is_over() {
            return Err(MoveError::GameOver);
        }
        if self.pending.is_some() {
            return Err(MoveError::ResolutionPending);
        }
        rules::validate_move(&self.state, coord)
    }

    /// Legal moves for the current player; empty once the game is over.
    pub fn valid_moves(&self) -> Vec<Coord> {
        if self.is_over() || self.pending.is_some() {
            return Vec::new();
        }
        rules::enumerate_valid_moves(&self.state)
    }

    /// Sub-boards a presentation should highlight as playable.
    pub fn playable_sub_boards(&self) -> Vec<GridPos> {
        if self.is_over() {
            return Vec::new();
        }
        rules::playable_sub_boards(&self.state)
    }

    /// Validates and places the current player's mark, then routes the
    /// active pointer to `coord.local()`.
    ///
    /// The game stays unresolved until [`Game::resolve`] runs.
    ///
    /// # Errors
    ///
    /// Any error from [`Game::validate`]. State is untouched on error.
    #[instrument(skip(self), fields(player = %self.current_player))]
    pub fn place_mark(&mut self, coord: Coord) -> Result<Move, MoveError> {
        self.validate(coord)?;

        let mv = Move::new(self.current_player, coord);
        self.state.place(coord, mv.player)?;
        self.state.set_active_sub_board(Some(mv.routed_sub_board()));
        self.pending = Some(mv);

        debug!(%mv, routed = %mv.routed_sub_board(), "Mark placed");
        Ok(mv)
    }

    /// Recomputes the meta-board, winner and draw, then switches player.
    ///
    /// Winner detection takes priority over draw. Does nothing when no mark
    /// is pending.
    #[instrument(skip(self))]
    pub fn resolve(&mut self) -> GameStatus {
        let Some(mv) = self.pending.take() else {
            return self.status;
        };

        rules::recompute_meta_board(&mut self.state);

        if let Some(winner) = rules::check_global_winner(&self.state) {
            self.status = GameStatus::Won(winner);
        } else if rules::check_for_draw(&self.state) {
            self.status = GameStatus::Draw;
        }

        self.history.push(mv);
        self.current_player = self.current_player.opponent();

        if self.is_over() {
            info!(status = ?self.status, moves = self.history.len(), "Game over");
        }
        self.status
    }

    /// Places and resolves a move in one step.
    ///
    /// # Errors
    ///
    /// Any error from [`Game::place_mark`].
    pub fn play(&mut self, coord: Coord) -> Result<GameStatus, MoveError> {
        self.place_mark(coord)?;
        Ok(self.resolve())
    }

    /// Immutable projection of the current state.
    pub fn snapshot(&self) -> GameSnapshot {
        GameSnapshot {
            board: self.board().clone(),
            meta_board: self.meta_board().clone(),
            current_player: self.current_player,
            active_sub_board: self.active_sub_board(),
            status: self.status,
            last_move: self.last_move(),
            move_count: self.history.len(),
            playable_sub_boards: self.playable_sub_boards(),
        }
    }
}

impl Default for Game {
    fn default() -> Self {
        Self::new()
    }
}

/// Read-only view of a game, published after every transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameSnapshot {
    /// The 9x9 cell grid.
    pub board: Board,
    /// The 3x3 meta-board.
    pub meta_board: MetaBoard,
    /// Player to move.
    pub current_player: Mark,
    /// Routed sub-board, `None` when unconstrained.
    pub active_sub_board: Option<GridPos>,
    /// Match status.
    pub status: GameStatus,
    /// Last move applied.
    pub last_move: Option<Move>,
    /// Number of resolved moves.
    pub move_count: usize,
    /// Sub-boards open to the next move.
    pub playable_sub_boards: Vec<GridPos>,
}

impl GameSnapshot {
    /// True once the match is won or drawn.
    pub fn is_over(&self) -> bool {
        self.status.is_over()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn coord(row: usize, col: usize) -> Coord {
        Coord::new(row, col).unwrap()
    }

    #[test]
    fn test_place_then_resolve() {
        let mut game = Game::new();
        let mv = game.place_mark(coord(2, 7)).unwrap();
        assert_eq!(mv.player, Mark::X);
        assert_eq!(game.current_player(), Mark::X);
        assert_eq!(game.last_move(), Some(mv));
        assert!(game.valid_moves().is_empty());
        assert_eq!(game.validate(coord(6, 3)), Err(MoveError::ResolutionPending));

        assert_eq!(game.resolve(), GameStatus::InProgress);
        assert_eq!(game.current_player(), Mark::O);
        assert_eq!(game.history(), &[mv]);
        assert_eq!(game.active_sub_board(), GridPos::new(2, 1));
    }

    #[test]
    fn test_resolve_without_pending_is_noop() {
        let mut game = Game::new();
        assert_eq!(game.resolve(), GameStatus::InProgress);
        assert_eq!(game.current_player(), Mark::X);
        assert!(game.history().is_empty());
    }

    #[test]
    fn test_rejected_move_leaves_state() {
        let mut game = Game::new();
        game.play(coord(0, 0)).unwrap();
        let before = game.clone();
        assert!(game.play(coord(8, 8)).is_err());
        assert_eq!(game, before);
    }

    #[test]
    fn test_snapshot_reflects_state() {
        let mut game = Game::new();
        game.play(coord(4, 4)).unwrap();
        let snap = game.snapshot();
        assert_eq!(snap.move_count, 1);
        assert_eq!(snap.current_player, Mark::O);
        assert_eq!(snap.active_sub_board, GridPos::new(1, 1));
        assert_eq!(snap.playable_sub_boards, vec![GridPos::new(1, 1).unwrap()]);
        assert!(!snap.is_over());
    }
}
