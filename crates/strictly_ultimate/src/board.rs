//! Board state: the 9x9 cell grid, the 3x3 meta-board and the active
//! sub-board pointer.
//!
//! Mutators here preserve only storage invariants (an occupied cell is never
//! overwritten). Move legality lives in [`crate::rules`].

use super::{Cell, Coord, GridPos, Mark, MoveError};
use serde::{Deserialize, Serialize};
use tracing::instrument;

/// The 9x9 grid of cells.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Board {
    cells: [[Cell; 9]; 9],
}

impl Board {
    /// Creates an empty board.
    pub fn new() -> Self {
        Self {
            cells: [[Cell::Empty; 9]; 9],
        }
    }

    /// Gets the cell at `coord`.
    pub fn get(&self, coord: Coord) -> Cell {
        self.cells[coord.row()][coord.col()]
    }

    /// Checks if the cell at `coord` is empty.
    pub fn is_empty(&self, coord: Coord) -> bool {
        self.get(coord).is_empty()
    }

    /// Places `mark` at `coord`.
    ///
    /// No routing check is made; callers validate legality first.
    ///
    /// # Errors
    ///
    /// Returns [`MoveError::CellOccupied`] if the cell already holds a mark.
    #[instrument(skip(self))]
    pub fn place(&mut self, coord: Coord, mark: Mark) -> Result<(), MoveError> {
        let cell = &mut self.cells[coord.row()][coord.col()];
        if !cell.is_empty() {
            return Err(MoveError::CellOccupied(coord));
        }
        *cell = Cell::Occupied(mark);
        Ok(())
    }

    /// Extracts the 3x3 local grid of sub-board `sub`.
    pub fn sub_grid(&self, sub: GridPos) -> [[Cell; 3]; 3] {
        let mut grid = [[Cell::Empty; 3]; 3];
        for local in GridPos::all() {
            grid[local.row()][local.col()] = self.get(Coord::from_parts(sub, local));
        }
        grid
    }

    /// True iff all nine cells of sub-board `sub` are occupied.
    pub fn is_sub_board_full(&self, sub: GridPos) -> bool {
        GridPos::all().all(|local| !self.is_empty(Coord::from_parts(sub, local)))
    }

    /// True iff all 81 cells are occupied.
    pub fn is_full(&self) -> bool {
        self.cells.iter().flatten().all(|cell| !cell.is_empty())
    }

    /// All rows of the board.
    pub fn rows(&self) -> &[[Cell; 9]; 9] {
        &self.cells
    }

    /// Formats the board as a human-readable grid with sub-board separators.
    pub fn display(&self) -> String {
        let mut out = String::from("    0 1 2   3 4 5   6 7 8\n");
        for (r, row) in self.cells.iter().enumerate() {
            if r > 0 && r % 3 == 0 {
                out.push_str("   -------+-------+-------\n");
            }
            out.push_str(&format!("{r} "));
            for (c, cell) in row.iter().enumerate() {
                if c > 0 && c % 3 == 0 {
                    out.push_str(" |");
                }
                out.push(' ');
                out.push(match cell {
                    Cell::Empty => '.',
                    Cell::Occupied(mark) => mark.symbol(),
                });
            }
            out.push('\n');
        }
        out
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

/// The 3x3 grid caching each sub-board's outcome.
///
/// A drawn (full, undecided) sub-board stays [`Cell::Empty`] here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetaBoard {
    cells: [[Cell; 3]; 3],
}

impl MetaBoard {
    /// Creates a meta-board with every sub-board undecided.
    pub fn new() -> Self {
        Self {
            cells: [[Cell::Empty; 3]; 3],
        }
    }

    /// Outcome recorded for sub-board `sub`.
    pub fn get(&self, sub: GridPos) -> Cell {
        self.cells[sub.row()][sub.col()]
    }

    /// Records the outcome of sub-board `sub`.
    pub fn set(&mut self, sub: GridPos, cell: Cell) {
        self.cells[sub.row()][sub.col()] = cell;
    }

    /// The whole 3x3 grid.
    pub fn grid(&self) -> &[[Cell; 3]; 3] {
        &self.cells
    }

    /// Formats the meta-board as three short lines.
    pub fn display(&self) -> String {
        self.cells
            .iter()
            .map(|row| {
                row.iter()
                    .map(|cell| match cell {
                        Cell::Empty => "·".to_string(),
                        Cell::Occupied(mark) => mark.to_string(),
                    })
                    .collect::<Vec<_>>()
                    .join(" ")
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl Default for MetaBoard {
    fn default() -> Self {
        Self::new()
    }
}

/// Board, meta-board and active sub-board pointer together.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BoardState {
    pub(crate) board: Board,
    pub(crate) meta: MetaBoard,
    pub(crate) active: Option<GridPos>,
}

impl BoardState {
    /// Fresh state: empty board, undecided meta-board, unconstrained pointer.
    pub fn new() -> Self {
        Self::default()
    }

    /// The 9x9 cell grid.
    pub fn board(&self) -> &Board {
        &self.board
    }

    /// The 3x3 meta-board.
    pub fn meta_board(&self) -> &MetaBoard {
        &self.meta
    }

    /// The sub-board the next move is routed to, or `None` when unconstrained.
    pub fn active_sub_board(&self) -> Option<GridPos> {
        self.active
    }

    /// Places a mark without any legality check.
    ///
    /// # Errors
    ///
    /// Returns [`MoveError::CellOccupied`] if the cell already holds a mark.
    pub fn place(&mut self, coord: Coord, mark: Mark) -> Result<(), MoveError> {
        self.board.place(coord, mark)
    }

    /// Routes the next move to sub-board `sub`.
    pub fn set_active_sub_board(&mut self, sub: Option<GridPos>) {
        self.active = sub;
    }

    /// Delegates to [`Board::is_sub_board_full`].
    pub fn is_sub_board_full(&self, sub: GridPos) -> bool {
        self.board.is_sub_board_full(sub)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn coord(row: usize, col: usize) -> Coord {
        Coord::new(row, col).unwrap()
    }

    #[test]
    fn test_new_board_is_empty() {
        let board = Board::new();
        assert!(Coord::all().all(|c| board.is_empty(c)));
        assert!(!board.is_full());
    }

    #[test]
    fn test_place_rejects_occupied_cell() {
        let mut board = Board::new();
        board.place(coord(3, 4), Mark::X).unwrap();
        assert_eq!(board.get(coord(3, 4)), Cell::Occupied(Mark::X));
        assert_eq!(
            board.place(coord(3, 4), Mark::O),
            Err(MoveError::CellOccupied(coord(3, 4)))
        );
        assert_eq!(board.get(coord(3, 4)), Cell::Occupied(Mark::X));
    }

    #[test]
    fn test_sub_board_full() {
        let mut board = Board::new();
        let sub = GridPos::new(2, 1).unwrap();
        for (i, local) in GridPos::all().enumerate() {
            assert!(!board.is_sub_board_full(sub));
            let mark = if i % 2 == 0 { Mark::X } else { Mark::O };
            board.place(Coord::from_parts(sub, local), mark).unwrap();
        }
        assert!(board.is_sub_board_full(sub));
        assert!(!board.is_sub_board_full(GridPos::new(0, 0).unwrap()));
    }

    #[test]
    fn test_sub_grid_extracts_local_layout() {
        let mut board = Board::new();
        board.place(coord(3, 8), Mark::O).unwrap();
        let grid = board.sub_grid(GridPos::new(1, 2).unwrap());
        assert_eq!(grid[0][2], Cell::Occupied(Mark::O));
        assert_eq!(grid[1][1], Cell::Empty);
    }
}
