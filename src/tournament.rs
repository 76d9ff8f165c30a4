//! Tournament runner for Wayfarer games.
//!
//! Provides a pure function interface: `(decks, strategies) -> GameResult`
//!
//! The tournament runner handles:
//! - In-process games: a dealer with one [`LocalSeat`] per strategy
//! - Cross-checking every player's final scores against the dealer's
//! - Every seating rotation of a line-up, run in parallel with rayon
//! - Aggregating wins and mean scores per strategy

use rayon::prelude::*;
use serde::Serialize;
use thiserror::Error;
use tracing::debug;

use crate::dealer::{Dealer, DealerError, LocalSeat};
use crate::game::{GameState, ItemDeck, MAX_PLAYERS, PathDeck, PlayerId, TieBreak};
use crate::player::Player;
use crate::replay::Recording;
use crate::strategy::StrategyKind;

/// Final result of a game.
#[derive(Debug, Clone, Serialize)]
pub struct GameResult {
    /// Strategy of each seat, in id order.
    pub strategies: Vec<StrategyKind>,
    /// Final scores, in id order.
    pub scores: Vec<u32>,
    /// Ids sharing the top score.
    pub winners: Vec<PlayerId>,
    /// Number of accepted moves.
    pub moves: usize,
    /// The full recording, for saving or replay.
    #[serde(skip)]
    pub recording: Recording,
}

/// Error type for tournament operations.
#[derive(Debug, Error)]
pub enum TournamentError {
    /// No strategies were given.
    #[error("Too few players: 0 (minimum 1)")]
    NoPlayers,
    /// More strategies than a board can seat.
    #[error("Too many players: {0} (maximum {MAX_PLAYERS})")]
    TooManyPlayers(usize),
    /// The dealer aborted the game.
    #[error("game aborted: {0}")]
    Dealer(#[from] DealerError),
    /// A player could not be seated or ended the game with its own error.
    #[error("player {player} failed: {message}")]
    Player {
        /// The failing seat.
        player: PlayerId,
        /// What went wrong.
        message: String,
    },
    /// A player's mirror disagrees with the dealer's final scores.
    #[error("player {player} computed scores {mirror:?}, dealer {dealer:?}")]
    Diverged {
        /// The disagreeing seat.
        player: PlayerId,
        /// Scores from the player's mirror.
        mirror: Vec<u32>,
        /// Authoritative scores.
        dealer: Vec<u32>,
    },
}

/// Run a complete in-process game, one seat per strategy.
///
/// # Determinism
///
/// Given the same decks, strategies and tie-break this function always
/// produces the same `GameResult`.
///
/// # Errors
///
/// Returns an error if the number of strategies is out of range, the game
/// aborts, or any player's final scores disagree with the dealer's.
pub fn run_game(
    path: &PathDeck,
    items: &ItemDeck,
    strategies: &[StrategyKind],
    tie_break: TieBreak,
) -> Result<GameResult, TournamentError> {
    check_player_count(strategies.len())?;

    let seats = strategies
        .iter()
        .enumerate()
        .map(|(id, &strategy)| {
            #[allow(clippy::cast_possible_truncation)]
            let id = id as PlayerId;
            Player::new(strategies.len(), id, strategy)
                .map(LocalSeat::new)
                .map_err(|e| TournamentError::Player {
                    player: id,
                    message: e.to_string(),
                })
        })
        .collect::<Result<Vec<_>, _>>()?;

    let state = GameState::new(path.clone(), items.clone(), strategies.len(), tie_break);
    let mut dealer = Dealer::new(state, seats);
    let scores = dealer.run(|_| {})?;
    let (state, seats) = dealer.into_parts();

    for (id, seat) in seats.into_iter().enumerate() {
        #[allow(clippy::cast_possible_truncation)]
        let player = id as PlayerId;
        match seat.outcome() {
            Some(Ok(mirror)) if *mirror == scores => {}
            Some(Ok(mirror)) => {
                return Err(TournamentError::Diverged {
                    player,
                    mirror: mirror.clone(),
                    dealer: scores,
                });
            }
            Some(Err(e)) => {
                return Err(TournamentError::Player {
                    player,
                    message: e.to_string(),
                });
            }
            None => {
                return Err(TournamentError::Player {
                    player,
                    message: "did not see the end of the game".to_owned(),
                });
            }
        }
    }

    let best = scores.iter().copied().max().unwrap_or(0);
    #[allow(clippy::cast_possible_truncation)]
    let winners = scores
        .iter()
        .enumerate()
        .filter(|&(_, &score)| score == best)
        .map(|(id, _)| id as PlayerId)
        .collect();

    debug!(?scores, moves = state.events().len(), "game complete");
    Ok(GameResult {
        strategies: strategies.to_vec(),
        scores,
        winners,
        moves: state.events().len(),
        recording: Recording::from_state(&state, strategies.to_vec()),
    })
}

/// Every cyclic rotation of a line-up, so each strategy sits in every seat.
#[must_use]
pub fn rotations(strategies: &[StrategyKind]) -> Vec<Vec<StrategyKind>> {
    (0..strategies.len())
        .map(|shift| {
            let mut lineup = strategies.to_vec();
            lineup.rotate_left(shift);
            lineup
        })
        .collect()
}

/// Aggregate standing of one strategy across a tournament.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Standing {
    /// The strategy.
    pub strategy: StrategyKind,
    /// Seats it occupied across all games.
    pub seats: u32,
    /// Seats that finished on the top score (ties included).
    pub wins: u32,
    /// Sum of its scores.
    pub total_score: u64,
}

impl Standing {
    /// Mean score per seat.
    #[must_use]
    pub fn mean_score(&self) -> f64 {
        if self.seats == 0 {
            0.0
        } else {
            #[allow(clippy::cast_precision_loss)]
            let mean = self.total_score as f64 / f64::from(self.seats);
            mean
        }
    }
}

/// Outcome of a whole tournament.
#[derive(Debug, Clone, Serialize)]
pub struct TournamentSummary {
    /// Every game, in rotation order.
    pub games: Vec<GameResult>,
    /// One entry per distinct strategy, in first-appearance order.
    pub standings: Vec<Standing>,
}

/// Play every rotation of `strategies` in parallel.
///
/// `on_game` is called once per finished game, from worker threads.
///
/// # Errors
///
/// Returns the first game error encountered.
pub fn run_tournament(
    path: &PathDeck,
    items: &ItemDeck,
    strategies: &[StrategyKind],
    tie_break: TieBreak,
    on_game: impl Fn() + Sync,
) -> Result<TournamentSummary, TournamentError> {
    check_player_count(strategies.len())?;

    let games = rotations(strategies)
        .par_iter()
        .map(|lineup| {
            let result = run_game(path, items, lineup, tie_break);
            on_game();
            result
        })
        .collect::<Result<Vec<_>, _>>()?;

    let mut standings: Vec<Standing> = Vec::new();
    for game in &games {
        for (id, (&strategy, &score)) in game.strategies.iter().zip(&game.scores).enumerate() {
            let index = match standings.iter().position(|s| s.strategy == strategy) {
                Some(index) => index,
                None => {
                    standings.push(Standing {
                        strategy,
                        seats: 0,
                        wins: 0,
                        total_score: 0,
                    });
                    standings.len() - 1
                }
            };
            let standing = &mut standings[index];
            standing.seats += 1;
            standing.total_score += u64::from(score);
            if game.winners.iter().any(|&w| usize::from(w) == id) {
                standing.wins += 1;
            }
        }
    }

    Ok(TournamentSummary { games, standings })
}

fn check_player_count(players: usize) -> Result<(), TournamentError> {
    if players == 0 {
        return Err(TournamentError::NoPlayers);
    }
    if players > MAX_PLAYERS {
        return Err(TournamentError::TooManyPlayers(players));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decks() -> (PathDeck, ItemDeck) {
        (
            PathDeck::parse("4;::-Mo1Do1::-").unwrap(),
            ItemDeck::parse("5ABCDE").unwrap(),
        )
    }

    #[test]
    fn test_tournament_error_display() {
        assert!(format!("{}", TournamentError::NoPlayers).contains("Too few players"));
        assert!(format!("{}", TournamentError::TooManyPlayers(11)).contains("Too many players"));
    }

    #[test]
    fn test_run_game_player_bounds() {
        let (path, items) = decks();
        assert!(matches!(
            run_game(&path, &items, &[], TieBreak::Arrival),
            Err(TournamentError::NoPlayers)
        ));
        let crowd = vec![StrategyKind::Donor; 11];
        assert!(matches!(
            run_game(&path, &items, &crowd, TieBreak::Arrival),
            Err(TournamentError::TooManyPlayers(11))
        ));
    }

    #[test]
    fn test_collector_trace_game() {
        let (path, items) = decks();
        let result = run_game(
            &path,
            &items,
            &[StrategyKind::Collector, StrategyKind::Collector],
            TieBreak::Arrival,
        )
        .unwrap();
        assert_eq!(result.scores, vec![0, 3]);
        assert_eq!(result.winners, vec![1]);
        assert_eq!(result.moves, 4);
        assert_eq!(result.recording.events.len(), 4);
    }

    #[test]
    fn test_rotations() {
        let lineup = [StrategyKind::Donor, StrategyKind::Collector, StrategyKind::Collector];
        let all = rotations(&lineup);
        assert_eq!(all.len(), 3);
        assert_eq!(all[1], vec![StrategyKind::Collector, StrategyKind::Collector, StrategyKind::Donor]);
    }

    #[test]
    fn test_tournament_standings() {
        let path = PathDeck::parse("9;::-Mo2Do1V12::-Ri2V21Do2::-").unwrap();
        let items = ItemDeck::parse("5ABCDE").unwrap();
        let summary = run_tournament(
            &path,
            &items,
            &[StrategyKind::Donor, StrategyKind::Collector],
            TieBreak::Arrival,
            || {},
        )
        .unwrap();
        assert_eq!(summary.games.len(), 2);
        assert_eq!(summary.standings.len(), 2);
        for standing in &summary.standings {
            assert_eq!(standing.seats, 2);
        }
        let total: u64 = summary.standings.iter().map(|s| s.total_score).sum();
        let expected: u64 = summary
            .games
            .iter()
            .flat_map(|g| g.scores.iter().map(|&s| u64::from(s)))
            .sum();
        assert_eq!(total, expected);
    }
}
