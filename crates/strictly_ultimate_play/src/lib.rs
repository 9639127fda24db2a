//! Strictly Ultimate Play - async match runtime for Ultimate Tic-Tac-Toe
//!
//! Wraps the pure rules in [`strictly_ultimate`] with a turn controller,
//! opponent strategies and a client for an external learning service.
//!
//! # Architecture
//!
//! - **Controller**: serializes moves, paces turns, publishes snapshots
//! - **Opponents**: random, or service-recommended with random fallback
//! - **Client**: move, train and metrics endpoints of the learning service
//! - **Training**: post-match record built from the final position
//!
//! # Example
//!
//! ```no_run
//! use strictly_ultimate_play::{OpponentKind, PlayConfig, TurnController};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let config = PlayConfig::new(OpponentKind::Random);
//! let controller = TurnController::new(&config, None)?;
//! assert!(controller.submit_move(4, 4).await);
//! println!("{}", controller.snapshot().status_line());
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod client;
mod config;
mod controller;
mod error;
mod opponents;
mod protocol;
pub mod terminal;
mod training;

// Crate-level exports - Configuration
pub use config::{OpponentKind, PlayConfig, SERVICE_URL_ENV, ServiceConfig};

// Crate-level exports - Errors
pub use error::{ConfigError, ServiceError, ServiceErrorKind, SubmitRejection};

// Crate-level exports - Turn controller
pub use controller::{MatchSnapshot, MoveOutcome, OPPONENT_MARK, TurnController, TurnPhase};

// Crate-level exports - Opponents
pub use opponents::{OpponentStrategy, RandomOpponent, RemoteOpponent};

// Crate-level exports - Learning service
pub use client::LearningClient;
pub use protocol::{
    LearningMetrics, MoveRequest, MoveResponse, SuggestedMove, TrainingAck, TrainingRecord,
};
pub use training::{
    TrainingReporter, next_valid_actions, state_fingerprint, terminal_reward, training_record,
};
