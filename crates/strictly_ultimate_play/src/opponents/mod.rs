//! Opponent strategies for player O.

mod random;
mod remote;

pub use random::RandomOpponent;
pub use remote::RemoteOpponent;

use strictly_ultimate::{Coord, Game};

/// Trait for strategies that pick the opponent's move.
///
/// Implementations only choose; the controller applies the choice through
/// the same validation path a human move takes.
#[async_trait::async_trait]
pub trait OpponentStrategy: Send + std::fmt::Debug {
    /// Picks a move for `game.current_player()`.
    ///
    /// Returns `None` only when `game` has no legal move.
    async fn choose_move(&mut self, game: &Game) -> Option<Coord>;

    /// Returns the strategy's display name.
    fn name(&self) -> &str;
}
