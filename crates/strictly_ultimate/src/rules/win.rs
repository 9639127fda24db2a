//! Win detection for sub-boards and the meta-board.

use crate::{BoardState, Cell, GridPos, Mark};
use tracing::{debug, instrument};

/// Winning lines in scan order: rows, then columns, then both diagonals.
const LINES: [[(usize, usize); 3]; 8] = [
    // Rows
    [(0, 0), (0, 1), (0, 2)],
    [(1, 0), (1, 1), (1, 2)],
    [(2, 0), (2, 1), (2, 2)],
    // Columns
    [(0, 0), (1, 0), (2, 0)],
    [(0, 1), (1, 1), (2, 1)],
    [(0, 2), (1, 2), (2, 2)],
    // Diagonals
    [(0, 0), (1, 1), (2, 2)],
    [(0, 2), (1, 1), (2, 0)],
];

/// Returns the mark holding the first complete line of a 3x3 grid.
///
/// Fullness is irrelevant: a grid can be won with empty cells left.
pub fn line_winner(grid: &[[Cell; 3]; 3]) -> Option<Mark> {
    LINES.iter().find_map(|[a, b, c]| {
        let first = grid[a.0][a.1];
        if first == grid[b.0][b.1] && first == grid[c.0][c.1] {
            first.mark()
        } else {
            None
        }
    })
}

/// Checks whether sub-board `sub` has been won.
#[instrument(skip(state))]
pub fn check_sub_board_winner(state: &BoardState, sub: GridPos) -> Option<Mark> {
    line_winner(&state.board().sub_grid(sub))
}

/// Recomputes every meta-board entry from the board.
///
/// Full recomputation rather than an incremental update, so the cache can
/// never go stale.
#[instrument(skip(state))]
pub fn recompute_meta_board(state: &mut BoardState) {
    for sub in GridPos::all() {
        let outcome = Cell::from(check_sub_board_winner(state, sub));
        if state.meta.get(sub) != outcome {
            debug!(%sub, ?outcome, "Sub-board decided");
        }
        state.meta.set(sub, outcome);
    }
}

/// Applies the line test to the meta-board.
#[instrument(skip(state))]
pub fn check_global_winner(state: &BoardState) -> Option<Mark> {
    line_winner(state.meta_board().grid())
}
