//! Output formatting utilities for CLI.

use std::fmt::Write;

use serde::Serialize;
use wayfarer::tournament::{GameResult, TournamentSummary};

/// JSON-serializable game result.
#[derive(Debug, Serialize)]
pub(super) struct JsonGameResult<'a> {
    /// Path deck in wire form.
    path: &'a str,
    /// Ids sharing the top score.
    winners: &'a [u8],
    /// Accepted moves.
    moves: usize,
    /// Per-player results.
    players: Vec<JsonPlayerResult>,
}

/// JSON-serializable player result.
#[derive(Debug, Serialize)]
pub(super) struct JsonPlayerResult {
    /// Player id.
    id: usize,
    /// Strategy name.
    strategy: &'static str,
    /// Final score.
    score: u32,
}

impl<'a> JsonGameResult<'a> {
    /// Create from a `GameResult`.
    pub(super) fn from_game_result(result: &'a GameResult) -> Self {
        Self {
            path: &result.recording.path,
            winners: &result.winners,
            moves: result.moves,
            players: result
                .strategies
                .iter()
                .zip(&result.scores)
                .enumerate()
                .map(|(id, (strategy, &score))| JsonPlayerResult {
                    id,
                    strategy: strategy.name(),
                    score,
                })
                .collect(),
        }
    }
}

/// Format a game result as human-readable text.
pub(super) fn format_text(result: &GameResult) -> String {
    let mut output = String::new();

    let _ = writeln!(output, "Game Result ({} moves)", result.moves);
    let winners: Vec<String> = result.winners.iter().map(ToString::to_string).collect();
    let _ = writeln!(output, "  Winner: Player {}\n", winners.join(", "));

    for (id, (strategy, score)) in result.strategies.iter().zip(&result.scores).enumerate() {
        let _ = writeln!(output, "  Player {id}: {score} points ({strategy})");
    }

    output
}

/// JSON-serializable tournament result.
#[derive(Debug, Serialize)]
pub(super) struct JsonTournamentResult {
    /// Total games played.
    games_played: usize,
    /// Per-strategy statistics.
    strategies: Vec<JsonStanding>,
}

/// JSON-serializable per-strategy tournament stats.
#[derive(Debug, Serialize)]
pub(super) struct JsonStanding {
    /// Strategy name.
    strategy: &'static str,
    /// Seats occupied.
    seats: u32,
    /// Number of wins.
    wins: u32,
    /// Win rate (0.0-1.0).
    win_rate: f64,
    /// Average score.
    avg_score: f64,
}

impl JsonTournamentResult {
    /// Create from a tournament summary.
    pub(super) fn from_summary(summary: &TournamentSummary) -> Self {
        Self {
            games_played: summary.games.len(),
            strategies: summary
                .standings
                .iter()
                .map(|standing| JsonStanding {
                    strategy: standing.strategy.name(),
                    seats: standing.seats,
                    wins: standing.wins,
                    win_rate: win_rate(standing.wins, standing.seats),
                    avg_score: standing.mean_score(),
                })
                .collect(),
        }
    }
}

fn win_rate(wins: u32, seats: u32) -> f64 {
    if seats == 0 {
        0.0
    } else {
        f64::from(wins) / f64::from(seats)
    }
}

/// Format tournament results as human-readable text.
pub(super) fn format_tournament_text(summary: &TournamentSummary) -> String {
    let mut output = String::new();

    let _ = writeln!(output, "Tournament Results ({} games)", summary.games.len());
    output.push_str("========================================\n\n");

    output.push_str("Win Rates:\n");
    for standing in &summary.standings {
        let _ = writeln!(
            output,
            "  {}: {:.1}% ({} of {} seats)",
            standing.strategy,
            win_rate(standing.wins, standing.seats) * 100.0,
            standing.wins,
            standing.seats
        );
    }

    output.push_str("\nAverage Scores:\n");
    for standing in &summary.standings {
        let _ = writeln!(output, "  {}: {:.2}", standing.strategy, standing.mean_score());
    }

    output.push_str("\nGames:\n");
    for game in &summary.games {
        let lineup: Vec<&str> = game.strategies.iter().map(|s| s.name()).collect();
        let scores: Vec<String> = game.scores.iter().map(ToString::to_string).collect();
        let _ = writeln!(output, "  [{}] -> {}", lineup.join(", "), scores.join(","));
    }

    output
}

/// Format tournament standings as CSV.
pub(super) fn format_tournament_csv(summary: &TournamentSummary) -> String {
    let mut output = String::new();

    // Header
    output.push_str("strategy,seats,wins,win_rate,avg_score\n");

    for standing in &summary.standings {
        let _ = writeln!(
            output,
            "{},{},{},{:.4},{:.2}",
            standing.strategy,
            standing.seats,
            standing.wins,
            win_rate(standing.wins, standing.seats),
            standing.mean_score()
        );
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use wayfarer::tournament::run_tournament;
    use wayfarer::{ItemDeck, PathDeck, StrategyKind, TieBreak};

    fn summary() -> TournamentSummary {
        run_tournament(
            &PathDeck::parse("4;::-Mo1Do1::-").unwrap(),
            &ItemDeck::parse("5ABCDE").unwrap(),
            &[StrategyKind::Collector, StrategyKind::Collector],
            TieBreak::Arrival,
            || {},
        )
        .unwrap()
    }

    #[test]
    fn test_format_text() {
        let summary = summary();
        let text = format_text(&summary.games[0]);
        assert!(text.starts_with("Game Result (4 moves)"));
        assert!(text.contains("Winner: Player 1"));
        assert!(text.contains("Player 1: 3 points (collector)"));
    }

    #[test]
    fn test_format_tournament_csv() {
        let csv = format_tournament_csv(&summary());
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines[0], "strategy,seats,wins,win_rate,avg_score");
        assert_eq!(lines[1], "collector,4,2,0.5000,1.50");
    }

    #[test]
    fn test_json_game_result() {
        let summary = summary();
        let json = serde_json::to_value(JsonGameResult::from_game_result(&summary.games[0])).unwrap();
        assert_eq!(json["moves"], 4);
        assert_eq!(json["players"][1]["score"], 3);
        assert_eq!(json["path"], "4;::-Mo1Do1::-");
    }
}
