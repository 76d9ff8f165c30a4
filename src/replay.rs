//! Game recordings and the replay engine.
//!
//! A recording holds the two decks, the seating and the dealer's event log.
//! Because every effect follows from the rules, a recording can be replayed
//! move by move and checked against the rules as it goes.
//!
//! # Time Travel
//!
//! - **Forward**: apply the next recorded move
//! - **Backward**: rebuild from move 0 to (`current_turn` - 1)
//! - **Jump to move N**: rebuild from move 0 to N

mod render;

pub use render::{describe_event, render_ascii};

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::{ItemDeckError, PathError, ProtocolError};
use crate::game::{Event, GameState, ItemDeck, MAX_PLAYERS, PathDeck, TieBreak};
use crate::player::Mirror;
use crate::strategy::StrategyKind;

/// Recording format version written by this build.
pub const RECORDING_VERSION: u32 = 1;

/// Everything needed to replay one game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recording {
    /// Format version.
    pub version: u32,
    /// Path deck in wire form.
    pub path: String,
    /// Item deck in file form.
    pub items: String,
    /// Number of participants.
    pub players: usize,
    /// Tie-break policy the dealer used.
    pub tie_break: TieBreak,
    /// Policy of each seat, when the players were in-process.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub strategies: Vec<StrategyKind>,
    /// Accepted moves in order.
    pub events: Vec<Event>,
}

impl Recording {
    /// Record a game from its final (or current) state.
    ///
    /// The item deck is reconstructed from `state`, so the cursor position
    /// is not part of the recording; replays always start from the top.
    #[must_use]
    pub fn from_state(state: &GameState, strategies: Vec<StrategyKind>) -> Self {
        Self {
            version: RECORDING_VERSION,
            path: state.path().to_string(),
            items: state.items().to_string(),
            players: state.players(),
            tie_break: state.tie_break(),
            strategies,
            events: state.events().to_vec(),
        }
    }

    /// Number of recorded moves.
    #[must_use]
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Whether no move was recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// A fresh game state at move 0.
    ///
    /// # Errors
    ///
    /// Returns an error if the player count is out of range or either deck
    /// does not parse.
    pub fn initial_state(&self) -> Result<GameState, ReplayError> {
        self.check_players()?;
        let path = PathDeck::parse(&self.path)?;
        let items = ItemDeck::parse(&self.items)?;
        Ok(GameState::new(path, items, self.players, self.tie_break))
    }

    /// Rebuild a player's mirror from the log alone.
    ///
    /// # Errors
    ///
    /// Returns an error if the player count is out of range, the path does
    /// not parse, or an event cannot be applied.
    pub fn mirror(&self) -> Result<Mirror, ReplayError> {
        self.check_players()?;
        let mut mirror = Mirror::new(PathDeck::parse(&self.path)?, self.players);
        for (turn, event) in self.events.iter().enumerate() {
            mirror
                .apply(event)
                .map_err(|source| ReplayError::IllegalEvent { turn, source })?;
        }
        Ok(mirror)
    }

    /// Save as pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn save(&self, path: &Path) -> Result<(), ReplayError> {
        let file = File::create(path)?;
        serde_json::to_writer_pretty(BufWriter::new(file), self)?;
        Ok(())
    }

    /// Load from JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not a recording.
    pub fn load(path: &Path) -> Result<Self, ReplayError> {
        let file = File::open(path)?;
        let recording: Self = serde_json::from_reader(BufReader::new(file))?;
        if recording.version != RECORDING_VERSION {
            return Err(ReplayError::Version(recording.version));
        }
        recording.check_players()?;
        Ok(recording)
    }

    fn check_players(&self) -> Result<(), ReplayError> {
        if self.players == 0 || self.players > MAX_PLAYERS {
            return Err(ReplayError::PlayerCount(self.players));
        }
        Ok(())
    }
}

/// Error type for replay operations.
#[derive(Debug, Error)]
pub enum ReplayError {
    /// Reading or writing the recording failed.
    #[error("recording i/o failed: {0}")]
    Io(#[from] std::io::Error),
    /// The recording is not valid JSON for this format.
    #[error("recording is malformed: {0}")]
    Json(#[from] serde_json::Error),
    /// The recording was written by an incompatible version.
    #[error("unsupported recording version {0}")]
    Version(u32),
    /// The recorded player count is outside `1..=MAX_PLAYERS`.
    #[error("recorded player count {0} is out of range (1-{MAX_PLAYERS})")]
    PlayerCount(usize),
    /// The recorded path deck does not parse.
    #[error("recorded path is invalid: {0}")]
    Path(#[from] PathError),
    /// The recorded item deck does not parse.
    #[error("recorded item deck is invalid: {0}")]
    ItemDeck(#[from] ItemDeckError),
    /// Move number out of bounds.
    #[error("Move {requested} out of bounds (max: {max_turn})")]
    TurnOutOfBounds {
        /// Requested move.
        requested: usize,
        /// Last move in the recording.
        max_turn: usize,
    },
    /// A recorded move breaks the rules.
    #[error("move {turn} is illegal: {source}")]
    IllegalEvent {
        /// Index of the move.
        turn: usize,
        /// Why it was rejected.
        #[source]
        source: ProtocolError,
    },
    /// A recorded move disagrees with what the rules produce.
    #[error("move {turn} diverges: recorded {recorded:?}, rules give {replayed:?}")]
    Divergent {
        /// Index of the move.
        turn: usize,
        /// What the log says.
        recorded: Event,
        /// What replaying produced.
        replayed: Event,
    },
    /// No moves left.
    #[error("Game is already over")]
    GameOver,
}

/// Replay engine: steps through a recording under the game rules.
#[derive(Debug)]
pub struct ReplayEngine {
    recording: Recording,
    state: GameState,
    current_turn: usize,
}

impl ReplayEngine {
    /// Create a new replay engine from a recording, starting at move 0.
    ///
    /// # Errors
    ///
    /// Returns an error if either deck does not parse.
    pub fn new(recording: Recording) -> Result<Self, ReplayError> {
        Self::new_at_turn(recording, 0)
    }

    /// Create a new replay engine after `target_turn` moves.
    ///
    /// # Errors
    ///
    /// Returns an error if the decks do not parse, the move is out of
    /// bounds, or a recorded move before it fails verification.
    pub fn new_at_turn(recording: Recording, target_turn: usize) -> Result<Self, ReplayError> {
        if target_turn > recording.len() {
            return Err(ReplayError::TurnOutOfBounds {
                requested: target_turn,
                max_turn: recording.len(),
            });
        }
        let state = recording.initial_state()?;
        let mut engine = Self {
            recording,
            state,
            current_turn: 0,
        };
        while engine.current_turn < target_turn {
            engine.step_forward()?;
        }
        Ok(engine)
    }

    /// Get the recording.
    #[must_use]
    pub fn recording(&self) -> &Recording {
        &self.recording
    }

    /// Number of moves applied so far.
    #[must_use]
    pub fn turn(&self) -> usize {
        self.current_turn
    }

    /// Get current game state.
    #[must_use]
    pub fn state(&self) -> &GameState {
        &self.state
    }

    /// Whether every recorded move has been applied.
    #[must_use]
    pub fn is_at_end(&self) -> bool {
        self.current_turn == self.recording.len()
    }

    /// Apply the next recorded move, checking it against the rules.
    ///
    /// # Errors
    ///
    /// Returns [`ReplayError::GameOver`] at the end of the recording, or a
    /// verification error if the move is out of turn, illegal, or its
    /// effect differs from the recorded one.
    pub fn step_forward(&mut self) -> Result<&Event, ReplayError> {
        let turn = self.current_turn;
        let recorded = *self.recording.events.get(turn).ok_or(ReplayError::GameOver)?;

        if self.state.next_player() != Some(recorded.player) {
            return Err(ReplayError::IllegalEvent {
                turn,
                source: ProtocolError::Unexpected {
                    expected: "the participant whose turn it is",
                    got: format!("participant {}", recorded.player),
                },
            });
        }
        let replayed = self
            .state
            .apply_move(recorded.player, recorded.site)
            .map_err(|source| ReplayError::IllegalEvent { turn, source })?;
        if replayed != recorded {
            return Err(ReplayError::Divergent {
                turn,
                recorded,
                replayed,
            });
        }

        self.current_turn += 1;
        Ok(&self.recording.events[turn])
    }

    /// Step backward one move.
    ///
    /// # Errors
    ///
    /// Returns an error if already at move 0.
    pub fn step_backward(&mut self) -> Result<(), ReplayError> {
        let Some(target) = self.current_turn.checked_sub(1) else {
            return Err(ReplayError::TurnOutOfBounds {
                requested: 0,
                max_turn: self.recording.len(),
            });
        };
        self.goto_turn(target)
    }

    /// Jump to the state after `target_turn` moves.
    ///
    /// # Errors
    ///
    /// Returns an error if the move is out of bounds or verification fails.
    pub fn goto_turn(&mut self, target_turn: usize) -> Result<(), ReplayError> {
        if target_turn > self.recording.len() {
            return Err(ReplayError::TurnOutOfBounds {
                requested: target_turn,
                max_turn: self.recording.len(),
            });
        }
        if target_turn < self.current_turn {
            self.state = self.recording.initial_state()?;
            self.current_turn = 0;
        }
        while self.current_turn < target_turn {
            self.step_forward()?;
        }
        Ok(())
    }

    /// Replay the whole recording and return the final scores.
    ///
    /// # Errors
    ///
    /// Returns the first verification failure. A recording that stops
    /// before everyone is home is reported as [`ReplayError::TurnOutOfBounds`].
    pub fn verify(mut self) -> Result<Vec<u32>, ReplayError> {
        self.goto_turn(self.recording.len())?;
        if !self.state.is_game_over() {
            return Err(ReplayError::TurnOutOfBounds {
                requested: self.recording.len() + 1,
                max_turn: self.recording.len(),
            });
        }
        Ok(self.state.scores())
    }

    /// Render current state to text for terminal viewing.
    #[must_use]
    pub fn render_ascii(&self, color: bool) -> String {
        render_ascii(&self.state, self.current_turn, self.recording.len(), color)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::{Effect, compare_views};
    use tempfile::NamedTempFile;

    fn played() -> GameState {
        let mut state = GameState::new(
            PathDeck::parse("4;::-Mo1Do1::-").unwrap(),
            ItemDeck::parse("2AB").unwrap(),
            2,
            TieBreak::Arrival,
        );
        for (player, site) in [(0, 1), (1, 2), (0, 3), (1, 3)] {
            state.apply_move(player, site).unwrap();
        }
        state
    }

    #[test]
    fn test_recording_save_load_roundtrip() {
        let recording = Recording::from_state(&played(), vec![StrategyKind::Collector; 2]);

        let temp_file = NamedTempFile::new().unwrap();
        recording.save(temp_file.path()).unwrap();
        let loaded = Recording::load(temp_file.path()).unwrap();

        assert_eq!(loaded, recording);
        assert_eq!(loaded.len(), 4);
    }

    #[test]
    fn test_player_count_checked() {
        let mut recording = Recording::from_state(&played(), Vec::new());
        recording.players = 300;

        let temp_file = NamedTempFile::new().unwrap();
        recording.save(temp_file.path()).unwrap();
        assert!(matches!(
            Recording::load(temp_file.path()),
            Err(ReplayError::PlayerCount(300))
        ));
        assert!(matches!(
            ReplayEngine::new(recording.clone()),
            Err(ReplayError::PlayerCount(300))
        ));
        assert!(recording.mirror().is_err());

        recording.players = 0;
        assert!(matches!(
            recording.initial_state(),
            Err(ReplayError::PlayerCount(0))
        ));
    }

    #[test]
    fn test_verify_scores() {
        let recording = Recording::from_state(&played(), Vec::new());
        assert_eq!(ReplayEngine::new(recording).unwrap().verify().unwrap(), vec![0, 3]);
    }

    #[test]
    fn test_time_travel() {
        let recording = Recording::from_state(&played(), Vec::new());
        let mut engine = ReplayEngine::new_at_turn(recording, 2).unwrap();
        assert_eq!(engine.state().board().positions(), &[1, 2]);

        engine.step_backward().unwrap();
        assert_eq!(engine.turn(), 1);
        assert_eq!(engine.state().board().positions(), &[1, 0]);

        engine.goto_turn(4).unwrap();
        assert!(engine.is_at_end());
        assert!(matches!(engine.step_forward(), Err(ReplayError::GameOver)));
        assert!(engine.goto_turn(5).is_err());

        engine.goto_turn(0).unwrap();
        assert!(engine.step_backward().is_err());
    }

    #[test]
    fn test_tampered_effect_detected() {
        let mut recording = Recording::from_state(&played(), Vec::new());
        recording.events[1].effect = Effect {
            points: 9,
            ..recording.events[1].effect
        };
        let err = ReplayEngine::new(recording).unwrap().verify().unwrap_err();
        assert!(matches!(err, ReplayError::Divergent { turn: 1, .. }));
    }

    #[test]
    fn test_out_of_turn_detected() {
        let mut recording = Recording::from_state(&played(), Vec::new());
        recording.events.swap(0, 1);
        let err = ReplayEngine::new(recording).unwrap().verify().unwrap_err();
        assert!(matches!(err, ReplayError::IllegalEvent { turn: 0, .. }));
    }

    #[test]
    fn test_unfinished_recording() {
        let mut recording = Recording::from_state(&played(), Vec::new());
        recording.events.truncate(3);
        assert!(ReplayEngine::new(recording).unwrap().verify().is_err());
    }

    #[test]
    fn test_mirror_matches_dealer() {
        let state = played();
        let mirror = Recording::from_state(&state, Vec::new()).mirror().unwrap();
        assert!(compare_views(&state, mirror.board().positions(), mirror.records()).is_empty());
    }

    #[test]
    fn test_replay_error_display() {
        let err = ReplayError::TurnOutOfBounds {
            requested: 15,
            max_turn: 10,
        };
        assert!(format!("{err}").contains("15"));
        assert!(format!("{err}").contains("10"));
        assert!(format!("{}", ReplayError::GameOver).contains("over"));
    }
}
