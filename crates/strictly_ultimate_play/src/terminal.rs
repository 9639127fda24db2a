//! Line-based terminal front end.
//!
//! Reads commands from stdin and redraws whenever the controller publishes
//! a settled snapshot. All moves go through [`TurnController`].

use crate::config::OpponentKind;
use crate::controller::{MatchSnapshot, TurnController, TurnPhase};
use derive_more::{Display, Error};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, info, instrument, warn};

const HELP: &str = "Commands: <row> <col> | restart | opponent <none|random|remote> | help | quit";

/// A parsed input line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Place a mark at absolute `(row, col)`.
    Move {
        /// Board row, `0..9`.
        row: usize,
        /// Board column, `0..9`.
        col: usize,
    },
    /// Start a new match.
    Restart,
    /// Switch the opponent strategy.
    Opponent(OpponentKind),
    /// Show the command list.
    Help,
    /// Leave the program.
    Quit,
}

/// Input that is not a command.
#[derive(Debug, Clone, PartialEq, Eq, Display, Error)]
#[display("Unrecognized input '{}'. {}", input, HELP)]
pub struct CommandError {
    /// The offending line, trimmed.
    pub input: String,
}

/// Parses one input line.
///
/// Moves accept `row col`, `row,col` or `row, col`.
pub fn parse_command(line: &str) -> Result<Command, CommandError> {
    let input = line.trim();
    let unrecognized = || CommandError {
        input: input.to_string(),
    };

    let words: Vec<&str> = input
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|w| !w.is_empty())
        .collect();

    match words.as_slice() {
        ["restart" | "r"] => Ok(Command::Restart),
        ["help" | "h" | "?"] => Ok(Command::Help),
        ["quit" | "q" | "exit"] => Ok(Command::Quit),
        ["opponent", kind] => kind
            .parse()
            .map(Command::Opponent)
            .map_err(|_| unrecognized()),
        [row, col] => match (row.parse(), col.parse()) {
            (Ok(row), Ok(col)) => Ok(Command::Move { row, col }),
            _ => Err(unrecognized()),
        },
        _ => Err(unrecognized()),
    }
}

/// Renders a snapshot as board, meta-board and status line.
pub fn render(snapshot: &MatchSnapshot) -> String {
    let game = &snapshot.game;
    let mut out = game.board.display();
    out.push('\n');
    out.push_str("Meta-board:\n");
    out.push_str(&game.meta_board.display());
    out.push_str("\n\n");

    if !game.is_over() {
        match game.active_sub_board {
            Some(sub) if game.playable_sub_boards == [sub] => {
                out.push_str(&format!("Play in sub-board {}\n", sub));
            }
            _ => out.push_str("Free move: any sub-board\n"),
        }
    }
    out.push_str(&snapshot.status_line());
    out
}

/// Runs the interactive loop until `quit` or end of input.
///
/// Snapshots are drawn by a background task; this loop only reads input.
///
/// # Errors
///
/// Returns an error if stdin cannot be read.
#[instrument(skip(controller))]
pub async fn run(controller: TurnController) -> anyhow::Result<()> {
    let mut updates = controller.subscribe();
    println!("{}", HELP);
    println!("{}", render(&updates.borrow_and_update()));

    // Redraw on every settled snapshot
    let renderer = tokio::spawn(async move {
        while updates.changed().await.is_ok() {
            let snapshot = updates.borrow_and_update().clone();
            if !matches!(snapshot.phase, TurnPhase::Applying(_)) {
                println!("{}", render(&snapshot));
            }
        }
    });

    let result = read_commands(&controller).await;
    renderer.abort();
    controller.flush_training().await;

    info!("Leaving match");
    result
}

async fn read_commands(controller: &TurnController) -> anyhow::Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }
        match parse_command(&line) {
            Ok(Command::Quit) => return Ok(()),
            Ok(Command::Help) => println!("{}", HELP),
            Ok(Command::Restart) => controller.restart().await,
            Ok(Command::Opponent(kind)) => {
                if let Err(e) = controller.set_opponent(kind).await {
                    warn!(error = %e, "Opponent not changed");
                    println!("{}", e.message);
                }
            }
            Ok(Command::Move { row, col }) => {
                if let Err(e) = controller.try_submit_move(row, col).await {
                    println!("{}", e);
                }
            }
            Err(e) => println!("{}", e),
        }
    }

    debug!("Input closed");
    Ok(())
}
