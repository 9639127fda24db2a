//! Draw detection.

use crate::BoardState;
use tracing::instrument;

/// True iff every one of the 81 cells is occupied.
///
/// The meta-board does not need to be fully decided: a full sub-board with
/// no line still counts toward the draw. Callers check for a global winner
/// first.
#[instrument(skip(state))]
pub fn check_for_draw(state: &BoardState) -> bool {
    state.board().is_full()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Coord, Mark};

    #[test]
    fn test_empty_board_not_draw() {
        assert!(!check_for_draw(&BoardState::new()));
    }

    #[test]
    fn test_one_empty_cell_not_draw() {
        let mut state = BoardState::new();
        for coord in Coord::all().skip(1) {
            state.place(coord, Mark::X).unwrap();
        }
        assert!(!check_for_draw(&state));
    }

    #[test]
    fn test_full_board_is_draw() {
        let mut state = BoardState::new();
        for (i, coord) in Coord::all().enumerate() {
            let mark = if i % 2 == 0 { Mark::X } else { Mark::O };
            state.place(coord, mark).unwrap();
        }
        assert!(check_for_draw(&state));
    }
}
