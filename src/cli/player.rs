//! Player command implementation: one participant on stdin/stdout.

use std::io;

use tracing::info;
use wayfarer::protocol::score_line;
use wayfarer::{Player, StrategyKind};

use super::CliError;

/// Execute the player command.
///
/// Stdout carries the protocol, so the final score line goes to stderr.
///
/// # Errors
///
/// Returns an error carrying the player's exit code.
pub(crate) fn execute(players: &str, id: &str, strategy: StrategyKind) -> Result<(), CliError> {
    let mut player = Player::from_args(players, id, strategy)?;
    info!(id = player.id(), players = player.players(), %strategy, "player ready");

    let stdin = io::stdin().lock();
    let stdout = io::stdout().lock();
    let scores = player.run(stdin, stdout)?;
    eprintln!("{}", score_line(&scores));
    Ok(())
}
