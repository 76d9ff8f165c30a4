//! Run command implementation: one in-process game.

use std::path::Path;

use wayfarer::tournament::run_game;
use wayfarer::{GameConfig, StrategyKind};

use super::output::{JsonGameResult, format_text};
use super::{CliError, OutputFormat, load_items, load_path};

/// Execute the run command.
///
/// # Errors
///
/// Returns an error if a deck cannot be loaded, the game fails, or the
/// recording cannot be saved.
pub(crate) fn execute(
    path: &Path,
    items: &Path,
    strategies: &[StrategyKind],
    format: OutputFormat,
    save: Option<&Path>,
    config: &GameConfig,
) -> Result<(), CliError> {
    let path = load_path(path)?;
    let items = load_items(items)?;

    let result = run_game(&path, &items, strategies, config.tie_break)?;

    if let Some(save_path) = save {
        result.recording.save(save_path).map_err(|e| {
            CliError::new(format!("Failed to save recording: {e}"))
        })?;
        tracing::info!(file = %save_path.display(), "recording saved");
    }

    match format {
        OutputFormat::Text => {
            print!("{}", format_text(&result));
        }
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&JsonGameResult::from_game_result(&result))
                .map_err(|e| CliError::new(format!("JSON serialization failed: {e}")))?;
            println!("{json}");
        }
    }

    Ok(())
}
