//! Uniform random opponent.

use super::OpponentStrategy;
use rand::SeedableRng;
use rand::seq::SliceRandom;
use rand_chacha::ChaCha8Rng;
use strictly_ultimate::{Coord, Game};
use tracing::{debug, instrument};

/// Picks uniformly among the legal moves. Always available, and the
/// fallback for [`RemoteOpponent`](super::RemoteOpponent).
#[derive(Debug, Clone)]
pub struct RandomOpponent {
    rng: ChaCha8Rng,
}

impl RandomOpponent {
    /// Creates a random opponent seeded from `seed`, or from entropy.
    #[instrument]
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };
        Self { rng }
    }

    /// Synchronous pick used by both strategies.
    pub fn pick(&mut self, game: &Game) -> Option<Coord> {
        let choice = game.valid_moves().choose(&mut self.rng).copied();
        debug!(?choice, "Random move chosen");
        choice
    }
}

#[async_trait::async_trait]
impl OpponentStrategy for RandomOpponent {
    async fn choose_move(&mut self, game: &Game) -> Option<Coord> {
        self.pick(game)
    }

    fn name(&self) -> &str {
        "random"
    }
}
