//! Move legality and valid-move enumeration.

use crate::{BoardState, Coord, GridPos, MoveError};
use tracing::instrument;

/// Checks a move against the board and the active sub-board pointer.
///
/// - The target cell must be empty.
/// - With no active sub-board (first move), any empty cell is legal.
/// - If the active sub-board is full, any empty cell is legal (free move).
/// - Otherwise the move must land inside the active sub-board.
///
/// # Errors
///
/// [`MoveError::CellOccupied`] or [`MoveError::WrongSubBoard`].
#[instrument(skip(state))]
pub fn validate_move(state: &BoardState, coord: Coord) -> Result<(), MoveError> {
    if !state.board().is_empty(coord) {
        return Err(MoveError::CellOccupied(coord));
    }

    match state.active_sub_board() {
        Some(active) if !state.is_sub_board_full(active) && coord.sub_board() != active => {
            Err(MoveError::WrongSubBoard {
                expected: active,
                actual: coord.sub_board(),
            })
        }
        _ => Ok(()),
    }
}

/// Boolean form of [`validate_move`].
pub fn is_valid_move(state: &BoardState, coord: Coord) -> bool {
    validate_move(state, coord).is_ok()
}

/// Every coordinate that passes [`is_valid_move`], in row-major order.
#[instrument(skip(state))]
pub fn enumerate_valid_moves(state: &BoardState) -> Vec<Coord> {
    Coord::all().filter(|&c| is_valid_move(state, c)).collect()
}

/// Sub-boards the next move may land in, for highlighting.
///
/// The routed sub-board when it still has room; otherwise every sub-board
/// that is not full.
pub fn playable_sub_boards(state: &BoardState) -> Vec<GridPos> {
    match state.active_sub_board() {
        Some(active) if !state.is_sub_board_full(active) => vec![active],
        _ => GridPos::all()
            .filter(|&sub| !state.is_sub_board_full(sub))
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Mark;

    fn coord(row: usize, col: usize) -> Coord {
        Coord::new(row, col).unwrap()
    }

    fn fill_sub_board(state: &mut BoardState, sub: GridPos) {
        // X O X / X O O / O X X: full, no line
        #[rustfmt::skip]
        let pattern = [
            Mark::X, Mark::O, Mark::X,
            Mark::X, Mark::O, Mark::O,
            Mark::O, Mark::X, Mark::X,
        ];
        for (local, mark) in GridPos::all().zip(pattern) {
            state.place(Coord::from_parts(sub, local), mark).unwrap();
        }
    }

    #[test]
    fn test_first_move_anywhere() {
        let state = BoardState::new();
        assert_eq!(enumerate_valid_moves(&state).len(), 81);
    }

    #[test]
    fn test_occupied_cell_rejected() {
        let mut state = BoardState::new();
        state.place(coord(4, 4), Mark::X).unwrap();
        assert_eq!(
            validate_move(&state, coord(4, 4)),
            Err(MoveError::CellOccupied(coord(4, 4)))
        );
    }

    #[test]
    fn test_routed_to_active_sub_board() {
        let mut state = BoardState::new();
        state.set_active_sub_board(GridPos::new(1, 1));
        assert!(is_valid_move(&state, coord(3, 5)));
        assert_eq!(
            validate_move(&state, coord(0, 0)),
            Err(MoveError::WrongSubBoard {
                expected: GridPos::new(1, 1).unwrap(),
                actual: GridPos::new(0, 0).unwrap(),
            })
        );
        let moves = enumerate_valid_moves(&state);
        assert_eq!(moves.len(), 9);
        assert!(moves.iter().all(|c| c.sub_board() == GridPos::new(1, 1).unwrap()));
    }

    #[test]
    fn test_free_move_when_active_full() {
        let mut state = BoardState::new();
        let full = GridPos::new(0, 2).unwrap();
        fill_sub_board(&mut state, full);
        state.set_active_sub_board(Some(full));
        assert_eq!(enumerate_valid_moves(&state).len(), 72);
        assert!(is_valid_move(&state, coord(8, 0)));
        assert_eq!(playable_sub_boards(&state).len(), 8);
        assert!(!playable_sub_boards(&state).contains(&full));
    }

    #[test]
    fn test_won_sub_board_still_routes() {
        let mut state = BoardState::new();
        let sub = GridPos::new(0, 0).unwrap();
        for col in 0..3 {
            state.place(coord(0, col), Mark::X).unwrap();
        }
        state.set_active_sub_board(Some(sub));
        assert_eq!(enumerate_valid_moves(&state).len(), 6);
        assert_eq!(playable_sub_boards(&state), vec![sub]);
    }
}
