//! Post-match training reports for the learning service.
//!
//! A finished match is reduced to a compact record: a fingerprint of the
//! final position, the final move, a terminal reward and the actions the
//! learner would have had next.

use crate::client::LearningClient;
use crate::protocol::TrainingRecord;
use strictly_ultimate::{Cell, Coord, Game, GameStatus, GridPos, Mark};
use tracing::{info, instrument, warn};

/// Placeholder for each last-move axis before any move.
const NO_MOVE: char = '-';

/// Fingerprint of a position.
///
/// Concatenates, in order: the 81 board marks, the 9 meta-board marks
/// (space for empty), the routed sub-board of the last move (or `--`) and
/// the player who made that move (or `-`).
pub fn state_fingerprint(game: &Game) -> String {
    let mut key = String::with_capacity(81 + 9 + 3);
    key.extend(game.board().rows().iter().flatten().map(|c| c.symbol()));
    key.extend(game.meta_board().grid().iter().flatten().map(|c| c.symbol()));

    match game.last_move() {
        Some(mv) => {
            let routed = mv.routed_sub_board();
            key.push_str(&routed.row().to_string());
            key.push_str(&routed.col().to_string());
            key.push(mv.player.symbol());
        }
        None => {
            key.push(NO_MOVE);
            key.push(NO_MOVE);
            key.push(NO_MOVE);
        }
    }
    key
}

/// Terminal reward from the opponent's (O's) side: `+1` win, `-1` loss,
/// `0` draw or unfinished.
pub fn terminal_reward(status: GameStatus, opponent: Mark) -> f64 {
    match status.winner() {
        Some(winner) if winner == opponent => 1.0,
        Some(_) => -1.0,
        None => 0.0,
    }
}

/// Action quadruples the learner could take next.
///
/// Before any move: all 81. Afterwards: the empty cells of the sub-board
/// routed to by the last move, unless that sub-board is already won.
pub fn next_valid_actions(game: &Game) -> Vec<[usize; 4]> {
    let Some(last) = game.last_move() else {
        return Coord::all().map(|c| c.quad()).collect();
    };

    let routed = last.routed_sub_board();
    if game.meta_board().get(routed) != Cell::Empty {
        return Vec::new();
    }

    GridPos::all()
        .map(|local| Coord::from_parts(routed, local))
        .filter(|&c| game.board().is_empty(c))
        .map(|c| c.quad())
        .collect()
}

/// Builds the record for a finished match.
///
/// Returns `None` while the match is still in progress.
#[instrument(skip(game), fields(status = ?game.status()))]
pub fn training_record(game: &Game, opponent: Mark) -> Option<TrainingRecord> {
    if !game.is_over() {
        return None;
    }

    let state = state_fingerprint(game);
    Some(TrainingRecord {
        next_state: state.clone(),
        state,
        action: game.last_move().map(|mv| mv.coord.quad()),
        reward: terminal_reward(game.status(), opponent),
        next_valid_actions: next_valid_actions(game),
    })
}

/// Delivers training records. Failures are logged and swallowed.
#[derive(Debug, Clone)]
pub struct TrainingReporter {
    client: LearningClient,
}

impl TrainingReporter {
    /// Creates a reporter sending through `client`.
    pub fn new(client: LearningClient) -> Self {
        Self { client }
    }

    /// Sends `record`; returns whether the service acknowledged it.
    #[instrument(skip(self, record), fields(reward = record.reward))]
    pub async fn report(&self, record: TrainingRecord) -> bool {
        match self.client.submit_training(&record).await {
            Ok(()) => {
                info!("Training record delivered");
                true
            }
            Err(e) => {
                warn!(error = %e, "Training service unavailable, record dropped");
                false
            }
        }
    }
}
