//! Tournament command implementation.

use std::path::Path;
use std::time::Instant;

use indicatif::{ProgressBar, ProgressStyle};
use wayfarer::tournament::{rotations, run_tournament};
use wayfarer::{GameConfig, StrategyKind};

use super::output::{JsonTournamentResult, format_tournament_csv, format_tournament_text};
use super::{CliError, TournamentFormat, load_items, load_path};

/// Execute the tournament command.
///
/// # Errors
///
/// Returns an error if a deck cannot be loaded or any game fails.
pub(crate) fn execute(
    path: &Path,
    items: &Path,
    strategies: &[StrategyKind],
    threads: Option<usize>,
    format: TournamentFormat,
    progress: bool,
    config: &GameConfig,
) -> Result<(), CliError> {
    let path = load_path(path)?;
    let items = load_items(items)?;

    // Set thread pool size if specified
    if let Some(num_threads) = threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(num_threads)
            .build_global()
            .ok(); // Ignore error if already initialized
    }

    let pb = if progress {
        let pb = ProgressBar::new(rotations(strategies).len() as u64);
        let style = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} games")
            .map_err(|e| CliError::new(format!("progress template: {e}")))?
            .progress_chars("=>-");
        pb.set_style(style);
        Some(pb)
    } else {
        None
    };

    let start = Instant::now();
    let summary = run_tournament(&path, &items, strategies, config.tie_break, || {
        if let Some(pb) = &pb {
            pb.inc(1);
        }
    })?;
    if let Some(pb) = pb {
        pb.finish_with_message("done");
    }
    let duration = start.elapsed();

    match format {
        TournamentFormat::Text => {
            println!();
            print!("{}", format_tournament_text(&summary));
            println!();
            println!("Duration: {:.3}s", duration.as_secs_f64());
        }
        TournamentFormat::Json => {
            let json = serde_json::to_string_pretty(&JsonTournamentResult::from_summary(&summary))
                .map_err(|e| CliError::new(format!("JSON serialization failed: {e}")))?;
            println!("{json}");
        }
        TournamentFormat::Csv => {
            print!("{}", format_tournament_csv(&summary));
        }
    }

    Ok(())
}
