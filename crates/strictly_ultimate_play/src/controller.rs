//! Turn controller: the single entry point that mutates a match.
//!
//! A move runs `AwaitingMove -> Applying -> (resolve, switch) ->
//! AwaitingMove | Terminal`. The applying flag is held across the optional
//! mark delay; any move submitted meanwhile is rejected, never queued.
//! After each transition an immutable [`MatchSnapshot`] is published on a
//! `watch` channel.
//!
//! Opponent turns run on a spawned task after the thinking delay. Restart
//! aborts that task and bumps the match generation, so anything still in
//! flight from the old match is discarded.

use crate::client::LearningClient;
use crate::config::{OpponentKind, PlayConfig};
use crate::error::{ConfigError, SubmitRejection};
use crate::opponents::{OpponentStrategy, RandomOpponent, RemoteOpponent};
use crate::training::{TrainingReporter, training_record};
use futures::FutureExt;
use futures::future::BoxFuture;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use strictly_ultimate::{Coord, Game, GameSnapshot, GameStatus, Mark};
use tokio::sync::{Mutex, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument, warn};

/// The mark played by the opponent strategy.
pub const OPPONENT_MARK: Mark = Mark::O;

/// Observable controller phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TurnPhase {
    /// Waiting for `player` to move.
    AwaitingMove(Mark),
    /// A mark by `player` is placed and awaiting resolution.
    Applying(Mark),
    /// The match has ended.
    Terminal,
}

/// Snapshot published after every transition.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchSnapshot {
    /// Board-level view of the game.
    pub game: GameSnapshot,
    /// Controller phase.
    pub phase: TurnPhase,
    /// Strategy controlling O.
    pub opponent: OpponentKind,
    /// Increments on every restart.
    pub generation: u64,
}

impl MatchSnapshot {
    /// True when O is strategy-controlled and it is O's turn.
    pub fn opponent_to_move(&self) -> bool {
        self.opponent.is_enabled() && self.phase == TurnPhase::AwaitingMove(OPPONENT_MARK)
    }

    /// One-line status for display.
    pub fn status_line(&self) -> String {
        match self.game.status {
            GameStatus::Won(mark) if self.opponent.is_enabled() => {
                if mark == OPPONENT_MARK {
                    "AI wins!".to_string()
                } else {
                    "You win!".to_string()
                }
            }
            GameStatus::Won(mark) => format!("Player {} wins!", mark),
            GameStatus::Draw => "Game ended in a draw!".to_string(),
            GameStatus::InProgress if self.opponent_to_move() => {
                format!("Player {}'s turn (AI thinking...)", OPPONENT_MARK)
            }
            GameStatus::InProgress => format!("Player {}'s turn", self.game.current_player),
        }
    }
}

/// Who is submitting a move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Origin {
    Human,
    Opponent { generation: u64 },
}

/// Mutable match state guarded by the controller.
#[derive(Debug)]
struct MatchState {
    game: Game,
    opponent: OpponentKind,
    applying: bool,
    generation: u64,
}

impl MatchState {
    fn phase(&self) -> TurnPhase {
        if self.game.is_over() {
            TurnPhase::Terminal
        } else if self.applying {
            TurnPhase::Applying(self.game.current_player())
        } else {
            TurnPhase::AwaitingMove(self.game.current_player())
        }
    }

    fn snapshot(&self) -> MatchSnapshot {
        MatchSnapshot {
            game: self.game.snapshot(),
            phase: self.phase(),
            opponent: self.opponent,
            generation: self.generation,
        }
    }

    fn opponent_to_move(&self) -> bool {
        self.opponent.is_enabled()
            && !self.applying
            && !self.game.is_over()
            && self.game.current_player() == OPPONENT_MARK
    }
}

/// Result of an applied move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoveOutcome {
    /// Where the mark went.
    pub coord: Coord,
    /// Who placed it.
    pub player: Mark,
    /// Match status after resolution.
    pub status: GameStatus,
}

struct Inner {
    state: Mutex<MatchState>,
    strategy: Mutex<Option<Box<dyn OpponentStrategy>>>,
    pending: std::sync::Mutex<Option<JoinHandle<()>>>,
    reporting: std::sync::Mutex<Option<JoinHandle<bool>>>,
    snapshots: watch::Sender<MatchSnapshot>,
    client: Option<LearningClient>,
    training: bool,
    seed: Option<u64>,
    thinking_delay: Duration,
    mark_delay: Duration,
}

/// Owns one match and serializes every move through [`TurnController::submit_move`].
///
/// Cloning yields another handle to the same match.
#[derive(Clone)]
pub struct TurnController {
    inner: Arc<Inner>,
}

impl std::fmt::Debug for TurnController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TurnController")
            .field("snapshot", &*self.inner.snapshots.borrow())
            .finish()
    }
}

impl TurnController {
    /// Creates a controller for a fresh match.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the remote opponent is requested without a
    /// learning-service client.
    #[instrument(skip(config, client), fields(opponent = %config.opponent()))]
    pub fn new(config: &PlayConfig, client: Option<LearningClient>) -> Result<Self, ConfigError> {
        let opponent = *config.opponent();
        let strategy = build_strategy(opponent, client.as_ref(), *config.seed())?;

        let state = MatchState {
            game: Game::new(),
            opponent,
            applying: false,
            generation: 0,
        };
        let (snapshots, _) = watch::channel(state.snapshot());

        info!("Turn controller ready");
        Ok(Self {
            inner: Arc::new(Inner {
                state: Mutex::new(state),
                strategy: Mutex::new(strategy),
                pending: std::sync::Mutex::new(None),
                reporting: std::sync::Mutex::new(None),
                snapshots,
                client,
                training: *config.service().training(),
                seed: *config.seed(),
                thinking_delay: config.thinking_delay(),
                mark_delay: config.mark_delay(),
            }),
        })
    }

    /// Latest published snapshot.
    pub fn snapshot(&self) -> MatchSnapshot {
        self.inner.snapshots.borrow().clone()
    }

    /// Subscribes to snapshots; the receiver starts at the latest one.
    pub fn subscribe(&self) -> watch::Receiver<MatchSnapshot> {
        self.inner.snapshots.subscribe()
    }

    /// Submits a human move. Returns `true` if it was applied.
    pub async fn submit_move(&self, row: usize, col: usize) -> bool {
        self.try_submit_move(row, col).await.is_ok()
    }

    /// Submits a human move, reporting why it was rejected.
    ///
    /// # Errors
    ///
    /// [`SubmitRejection`] describing why no state changed.
    #[instrument(skip(self))]
    pub async fn try_submit_move(
        &self,
        row: usize,
        col: usize,
    ) -> Result<MoveOutcome, SubmitRejection> {
        let coord = Coord::new(row, col)?;
        self.play(Origin::Human, coord).await
    }

    /// Replaces the opponent strategy.
    ///
    /// Cancels a pending opponent turn; if the new strategy controls the side
    /// to move, schedules its turn.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if `kind` is remote and no client is configured.
    #[instrument(skip(self))]
    pub async fn set_opponent(&self, kind: OpponentKind) -> Result<(), ConfigError> {
        let strategy = build_strategy(kind, self.inner.client.as_ref(), self.inner.seed)?;
        *self.inner.strategy.lock().await = strategy;

        let mut state = self.inner.state.lock().await;
        // A move in its mark delay must finish; it re-reads the opponent on resolve.
        if !state.applying {
            self.cancel_pending();
        }
        state.opponent = kind;
        info!(opponent = %kind, "Opponent reconfigured");
        if state.opponent_to_move() {
            self.schedule_opponent(state.generation);
        }
        self.publish(&state);
        Ok(())
    }

    /// Starts a new match, discarding the current one.
    ///
    /// Waits for the previous match's training report, if one is in flight.
    #[instrument(skip(self))]
    pub async fn restart(&self) {
        self.cancel_pending();
        self.flush_training().await;

        let mut state = self.inner.state.lock().await;
        state.game = Game::new();
        state.applying = false;
        state.generation += 1;
        info!(generation = state.generation, "Match restarted");
        self.publish(&state);
    }

    /// Validate, place, pause, resolve, switch, then trigger follow-ups.
    #[instrument(skip(self))]
    async fn play(&self, origin: Origin, coord: Coord) -> Result<MoveOutcome, SubmitRejection> {
        let (generation, mv) = {
            let mut state = self.inner.state.lock().await;

            if state.applying {
                debug!("Rejected: move already in progress");
                return Err(SubmitRejection::Busy);
            }
            match origin {
                Origin::Human => {
                    if state.opponent.is_enabled()
                        && !state.game.is_over()
                        && state.game.current_player() == OPPONENT_MARK
                    {
                        return Err(SubmitRejection::OpponentTurn);
                    }
                }
                Origin::Opponent { generation } => {
                    if generation != state.generation || !state.opponent.is_enabled() {
                        return Err(SubmitRejection::Superseded);
                    }
                }
            }

            let mv = state.game.place_mark(coord).map_err(|e| {
                debug!(error = %e, "Rejected: illegal move");
                SubmitRejection::Illegal(e)
            })?;
            state.applying = true;
            self.publish(&state);
            (state.generation, mv)
        };

        if !self.inner.mark_delay.is_zero() {
            tokio::time::sleep(self.inner.mark_delay).await;
        }

        let mut state = self.inner.state.lock().await;
        if state.generation != generation {
            debug!("Move discarded: match restarted while applying");
            return Err(SubmitRejection::Superseded);
        }

        let status = state.game.resolve();
        state.applying = false;
        info!(%mv, ?status, "Move applied");

        if status.is_over() {
            self.report_training(&state);
        } else if state.opponent_to_move() {
            self.schedule_opponent(generation);
        }
        self.publish(&state);

        Ok(MoveOutcome {
            coord,
            player: mv.player,
            status,
        })
    }

    /// Spawns the opponent's turn after the thinking delay.
    fn schedule_opponent(&self, generation: u64) {
        debug!(generation, delay = ?self.inner.thinking_delay, "Scheduling opponent turn");
        let handle = tokio::spawn(self.clone().opponent_turn(generation));
        let previous = self
            .inner
            .pending
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .replace(handle);
        if let Some(previous) = previous {
            previous.abort();
        }
    }

    /// Aborts a scheduled opponent turn, if any.
    fn cancel_pending(&self) {
        let pending = self
            .inner
            .pending
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .take();
        if let Some(handle) = pending {
            debug!("Cancelling pending opponent turn");
            handle.abort();
        }
    }

    fn opponent_turn(self, generation: u64) -> BoxFuture<'static, ()> {
        async move {
            tokio::time::sleep(self.inner.thinking_delay).await;

            let game = {
                let state = self.inner.state.lock().await;
                if state.generation != generation || !state.opponent_to_move() {
                    return;
                }
                state.game.clone()
            };

            let choice = {
                let mut strategy = self.inner.strategy.lock().await;
                match strategy.as_mut() {
                    Some(strategy) => {
                        debug!(strategy = strategy.name(), "Opponent choosing move");
                        strategy.choose_move(&game).await
                    }
                    None => return,
                }
            };

            let Some(coord) = choice else {
                warn!("Opponent found no legal move");
                return;
            };

            if let Err(e) = self.play(Origin::Opponent { generation }, coord).await {
                warn!(%coord, error = %e, "Opponent move rejected");
            }
        }
        .boxed()
    }

    /// Hands the finished match to the training reporter when the remote
    /// opponent played it.
    fn report_training(&self, state: &MatchState) {
        if state.opponent != OpponentKind::Remote || !self.inner.training {
            return;
        }
        let Some(client) = self.inner.client.clone() else {
            return;
        };
        let Some(record) = training_record(&state.game, OPPONENT_MARK) else {
            return;
        };

        let reporter = TrainingReporter::new(client);
        let handle = tokio::spawn(async move { reporter.report(record).await });
        *self
            .inner
            .reporting
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner) = Some(handle);
    }

    /// Waits for the training report of the finished match.
    ///
    /// Returns `None` if no report is in flight, otherwise whether the
    /// service acknowledged it.
    pub async fn flush_training(&self) -> Option<bool> {
        let handle = self
            .inner
            .reporting
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .take()?;
        debug!("Waiting for training report");
        match handle.await {
            Ok(delivered) => Some(delivered),
            Err(e) => {
                warn!(error = %e, "Training report task failed");
                None
            }
        }
    }

    fn publish(&self, state: &MatchState) {
        self.inner.snapshots.send_replace(state.snapshot());
    }
}

/// Builds the strategy for `kind`.
fn build_strategy(
    kind: OpponentKind,
    client: Option<&LearningClient>,
    seed: Option<u64>,
) -> Result<Option<Box<dyn OpponentStrategy>>, ConfigError> {
    Ok(match kind {
        OpponentKind::None => None,
        OpponentKind::Random => Some(Box::new(RandomOpponent::new(seed))),
        OpponentKind::Remote => {
            let client = client.ok_or_else(|| {
                ConfigError::new("Remote opponent requires a learning service client")
            })?;
            Some(Box::new(RemoteOpponent::new(client.clone(), seed)))
        }
    })
}
