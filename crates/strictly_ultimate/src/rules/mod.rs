//! Game rules for Ultimate Tic-Tac-Toe.
//!
//! Pure, deterministic functions over [`BoardState`](crate::BoardState).
//! Rules are separated from board storage so the turn engine and the
//! opponent strategies share one definition of legality.

pub mod draw;
pub mod legality;
pub mod win;

pub use draw::check_for_draw;
pub use legality::{enumerate_valid_moves, is_valid_move, playable_sub_boards, validate_move};
pub use win::{check_global_winner, check_sub_board_winner, line_winner, recompute_meta_board};
