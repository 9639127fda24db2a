//! Wire types for the learning service.
//!
//! Boards travel as nested arrays of `"X"`, `"O"` or `null`. Moves travel in
//! sub-board/local form so the service never sees absolute coordinates.

use serde::{Deserialize, Serialize};
use strictly_ultimate::{Cell, Coord, Game, GridPos, Mark};

/// Body of `POST /api/move`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveRequest {
    /// 9x9 marks, `null` for empty.
    pub main_board: Vec<Vec<Option<Mark>>>,
    /// 3x3 sub-board outcomes, `null` for undecided.
    pub meta_board: Vec<Vec<Option<Mark>>>,
    /// Sub-board the last move routed to, `null` before the first move.
    pub last_move: Option<[usize; 2]>,
    /// Player the recommendation is for.
    pub current_player: Mark,
}

impl MoveRequest {
    /// Builds the request describing `game` from the current player's side.
    pub fn from_game(game: &Game) -> Self {
        Self {
            main_board: grid_rows(game.board().rows()),
            meta_board: grid_rows(game.meta_board().grid()),
            last_move: game.last_move().map(|mv| {
                let routed = mv.routed_sub_board();
                [routed.row(), routed.col()]
            }),
            current_player: game.current_player(),
        }
    }
}

fn grid_rows<const N: usize>(rows: &[[Cell; N]; N]) -> Vec<Vec<Option<Mark>>> {
    rows.iter()
        .map(|row| row.iter().map(|cell| cell.mark()).collect())
        .collect()
}

/// A recommended move in sub-board/local form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuggestedMove {
    /// Sub-board row.
    #[serde(alias = "subBoardI")]
    pub sub_board_row: usize,
    /// Sub-board column.
    #[serde(alias = "subBoardJ")]
    pub sub_board_col: usize,
    /// Row inside the sub-board.
    #[serde(alias = "subI")]
    pub local_row: usize,
    /// Column inside the sub-board.
    #[serde(alias = "subJ")]
    pub local_col: usize,
}

impl SuggestedMove {
    /// Converts to an absolute coordinate, `None` if any part is off the grid.
    pub fn to_coord(self) -> Option<Coord> {
        let sub = GridPos::new(self.sub_board_row, self.sub_board_col)?;
        let local = GridPos::new(self.local_row, self.local_col)?;
        Some(Coord::from_parts(sub, local))
    }
}

impl From<Coord> for SuggestedMove {
    fn from(coord: Coord) -> Self {
        let [sub_board_row, sub_board_col, local_row, local_col] = coord.quad();
        Self {
            sub_board_row,
            sub_board_col,
            local_row,
            local_col,
        }
    }
}

/// Body returned by `POST /api/move`.
///
/// Either the move fields sit at the top level or under a `move` key; an
/// `error` field or no move at all means no recommendation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MoveResponse {
    /// `{ "move": { ... } }`, the original service shape.
    Wrapped {
        /// The recommended move.
        #[serde(rename = "move")]
        mv: SuggestedMove,
    },
    /// `{ "subBoardRow": .., "subBoardCol": .., "localRow": .., "localCol": .. }`.
    Flat(SuggestedMove),
    /// Anything else, including `{ "error": "..." }`.
    Absent {
        /// Error text reported by the service.
        #[serde(default)]
        error: Option<String>,
    },
}

impl MoveResponse {
    /// The recommended move, if the response carried one.
    pub fn suggested(&self) -> Option<SuggestedMove> {
        match self {
            MoveResponse::Wrapped { mv } | MoveResponse::Flat(mv) => Some(*mv),
            MoveResponse::Absent { .. } => None,
        }
    }
}

/// Body of `POST /api/train`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrainingRecord {
    /// State fingerprint of the final position.
    pub state: String,
    /// Final move as `[sub-row, sub-col, local-row, local-col]`.
    pub action: Option<[usize; 4]>,
    /// Terminal reward from O's point of view.
    pub reward: f64,
    /// Same as `state`: the position is terminal.
    pub next_state: String,
    /// Quadruples still open in the routed sub-board.
    pub next_valid_actions: Vec<[usize; 4]>,
}

/// Body returned by `POST /api/train`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TrainingAck {
    /// Free-form status, `"success"` from the reference service.
    #[serde(default)]
    pub status: Option<String>,
}

/// Aggregate learning counters from `GET /api/metrics`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LearningMetrics {
    /// Games the service has learned from.
    #[serde(default, alias = "total_games")]
    pub total_games: u64,
    /// Share of games won by the service.
    #[serde(default, alias = "win_rate")]
    pub win_rate: f64,
    /// Distinct state/action pairs learned.
    #[serde(default, alias = "total_states")]
    pub total_states: u64,
    /// Current exploration probability.
    #[serde(default, alias = "exploration_rate")]
    pub exploration_rate: f64,
    /// Games won by the service.
    #[serde(default)]
    pub wins: Option<u64>,
    /// Games lost by the service.
    #[serde(default)]
    pub losses: Option<u64>,
    /// Drawn games.
    #[serde(default)]
    pub draws: Option<u64>,
    /// Mean terminal reward.
    #[serde(default, alias = "average_reward")]
    pub average_reward: Option<f64>,
}

impl std::fmt::Display for LearningMetrics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Total games:      {}", self.total_games)?;
        writeln!(f, "Win rate:         {:.1}%", self.win_rate * 100.0)?;
        writeln!(f, "States learned:   {}", self.total_states)?;
        write!(f, "Exploration rate: {:.3}", self.exploration_rate)
    }
}
