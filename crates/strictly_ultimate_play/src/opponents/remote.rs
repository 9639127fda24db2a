//! Opponent delegating to the learning service.

use super::{OpponentStrategy, RandomOpponent};
use crate::client::LearningClient;
use crate::protocol::MoveRequest;
use strictly_ultimate::{Coord, Game};
use tracing::{debug, info, instrument, warn};

/// Asks the learning service for a move and falls back to
/// [`RandomOpponent`] on any failure.
///
/// Failures covered: transport errors, timeouts, error statuses,
/// unparseable bodies, responses with no move, and moves that are not
/// legal in the current position.
#[derive(Debug, Clone)]
pub struct RemoteOpponent {
    client: LearningClient,
    fallback: RandomOpponent,
}

impl RemoteOpponent {
    /// Creates a remote opponent using `client`, with a random fallback.
    #[instrument(skip(client), fields(base_url = %client.base_url()))]
    pub fn new(client: LearningClient, seed: Option<u64>) -> Self {
        info!("Creating remote opponent");
        Self {
            client,
            fallback: RandomOpponent::new(seed),
        }
    }

    /// Asks the service; `None` on any failure or illegal answer.
    async fn recommend(&self, game: &Game) -> Option<Coord> {
        let request = MoveRequest::from_game(game);
        let suggested = match self.client.recommend_move(&request).await {
            Ok(Some(suggested)) => suggested,
            Ok(None) => {
                warn!("Service returned no move");
                return None;
            }
            Err(e) => {
                warn!(error = %e, "Move service unavailable");
                return None;
            }
        };

        let Some(coord) = suggested.to_coord() else {
            warn!(?suggested, "Service move is off the board");
            return None;
        };

        if let Err(e) = game.validate(coord) {
            warn!(%coord, error = %e, "Service move is not legal");
            return None;
        }

        debug!(%coord, "Using service move");
        Some(coord)
    }
}

#[async_trait::async_trait]
impl OpponentStrategy for RemoteOpponent {
    async fn choose_move(&mut self, game: &Game) -> Option<Coord> {
        match self.recommend(game).await {
            Some(coord) => Some(coord),
            None => {
                info!("Falling back to random move");
                self.fallback.pick(game)
            }
        }
    }

    fn name(&self) -> &str {
        "remote"
    }
}
