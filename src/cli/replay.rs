//! Replay command implementation.

use std::path::Path;

use wayfarer::game::compare_views;
use wayfarer::protocol::score_line;
use wayfarer::replay::{Recording, ReplayEngine, describe_event};

use super::CliError;

/// Execute the replay command.
///
/// With `turn` set, prints the board after that many moves. Otherwise walks
/// the whole recording, describing each move, then checks a player mirror
/// rebuilt from the log against the replayed state and prints the scores.
///
/// # Errors
///
/// Returns an error if the recording cannot be loaded or fails verification.
pub(crate) fn execute(
    recording_path: &Path,
    turn: Option<usize>,
    color: bool,
) -> Result<(), CliError> {
    let recording = Recording::load(recording_path).map_err(|e| {
        CliError::new(format!(
            "Failed to load recording {}: {e}",
            recording_path.display()
        ))
    })?;

    if let Some(target_turn) = turn {
        let engine = ReplayEngine::new_at_turn(recording, target_turn)?;
        print!("{}", engine.render_ascii(color));
        return Ok(());
    }

    let mirror = recording.mirror()?;
    let mut engine = ReplayEngine::new(recording)?;
    print!("{}", engine.render_ascii(color));
    while !engine.is_at_end() {
        let event = *engine.step_forward()?;
        println!();
        println!("{}", describe_event(engine.state().path(), &event));
        print!("{}", engine.render_ascii(color));
    }

    let mismatches = compare_views(engine.state(), mirror.board().positions(), mirror.records());
    if let Some(first) = mismatches.first() {
        return Err(CliError::new(format!(
            "player view diverges from the replay ({} problems): {first}",
            mismatches.len()
        )));
    }

    let scores = engine.verify()?;
    println!();
    println!("{}", score_line(&scores));
    Ok(())
}
