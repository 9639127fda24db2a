//! Error types for the match runtime.

use derive_more::{Display, Error};
use strictly_ultimate::MoveError;
use tracing::instrument;

/// What went wrong talking to the learning service.
#[derive(Debug, Clone, PartialEq, Eq, Display)]
pub enum ServiceErrorKind {
    /// Connection or request failure.
    #[display("transport")]
    Transport,
    /// No response within the configured interval.
    #[display("timeout")]
    Timeout,
    /// Non-success HTTP status.
    #[display("status {_0}")]
    Status(u16),
    /// Response body could not be interpreted.
    #[display("malformed response")]
    Malformed,
}

/// Learning-service error with location tracking.
#[derive(Debug, Clone, Display, Error)]
#[display("Service error ({}): {} at {}:{}", kind, message, file, line)]
pub struct ServiceError {
    /// Failure category.
    pub kind: ServiceErrorKind,
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl ServiceError {
    /// Creates a new service error with caller location tracking.
    #[track_caller]
    #[instrument(skip(message))]
    pub fn new(kind: ServiceErrorKind, message: impl Into<String>) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            kind,
            message: message.into(),
            line: loc.line(),
            file: loc.file(),
        }
    }
}

impl From<reqwest::Error> for ServiceError {
    #[track_caller]
    fn from(err: reqwest::Error) -> Self {
        let kind = if err.is_timeout() {
            ServiceErrorKind::Timeout
        } else if err.is_decode() {
            ServiceErrorKind::Malformed
        } else if let Some(status) = err.status() {
            ServiceErrorKind::Status(status.as_u16())
        } else {
            ServiceErrorKind::Transport
        };
        Self::new(kind, err.to_string())
    }
}

/// Configuration error.
#[derive(Debug, Clone, Display, Error)]
#[display("Config error: {} at {}:{}", message, file, line)]
pub struct ConfigError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl ConfigError {
    /// Creates a new configuration error.
    #[track_caller]
    #[instrument(skip(message))]
    pub fn new(message: impl Into<String>) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message: message.into(),
            line: loc.line(),
            file: loc.file(),
        }
    }
}

/// Why a submitted move was not applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum SubmitRejection {
    /// The move breaks the rules or the game is over.
    #[display("Illegal move: {_0}")]
    Illegal(MoveError),
    /// Another move is still being applied.
    #[display("A move is already being applied")]
    Busy,
    /// The side to move is controlled by the opponent strategy.
    #[display("It is the opponent's turn")]
    OpponentTurn,
    /// The match was restarted while the move was in flight.
    #[display("Match was restarted")]
    Superseded,
}

impl std::error::Error for SubmitRejection {}

impl From<MoveError> for SubmitRejection {
    fn from(err: MoveError) -> Self {
        Self::Illegal(err)
    }
}
