//! Participant state machine.
//!
//! A player acknowledges, reads the path deck once, then reacts to dealer
//! messages: `YT` runs the decision ladder and answers with `DO<site>`, `HAP`
//! updates the [`Mirror`], `DONE` ends the game. Anything else is fatal.

mod mirror;

pub use mirror::Mirror;

use std::io::{BufRead, Write};

use thiserror::Error;
use tracing::{debug, info};

use crate::error::{PathError, ProtocolError};
use crate::game::{MAX_PLAYERS, PathDeck, PlayerId};
use crate::protocol::{ACK, DealerMessage, PlayerMessage};
use crate::strategy::{Ladder, StrategyKind, View};

/// Why a player stopped early. Each variant has its own exit code.
#[derive(Debug, Error)]
pub enum PlayerError {
    /// The player count argument is not a number in range.
    #[error("Invalid player count")]
    PlayerCount,
    /// The id argument is not a number below the player count.
    #[error("Invalid ID")]
    PlayerId,
    /// The broadcast path deck did not parse.
    #[error("Invalid path")]
    Path(#[source] PathError),
    /// The dealer aborted the game.
    #[error("Early game over")]
    EarlyGameOver,
    /// Anything else that went wrong on the channel.
    #[error("Communications error")]
    Protocol(#[from] ProtocolError),
}

impl PlayerError {
    /// Process exit code for this error.
    #[must_use]
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::PlayerCount => 2,
            Self::PlayerId => 3,
            Self::Path(_) => 4,
            Self::EarlyGameOver => 5,
            Self::Protocol(_) => 6,
        }
    }
}

/// Where the player is in the protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerPhase {
    /// Acknowledged, waiting for the path deck line.
    AwaitingPath,
    /// Waiting for `YT`, `HAP` or `DONE`.
    Idle,
    /// `DONE` received with everyone home.
    Finished,
}

/// What the caller should do after a line was handled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    /// Nothing to send; keep reading.
    Continue,
    /// Send this message, then keep reading.
    Reply(PlayerMessage),
    /// The game is over; these are the final scores.
    Finished(Vec<u32>),
}

/// One participant: identity, decision ladder, and its mirror of the game.
#[derive(Debug)]
pub struct Player {
    id: PlayerId,
    players: usize,
    strategy: StrategyKind,
    ladder: Ladder,
    phase: PlayerPhase,
    mirror: Option<Mirror>,
}

impl Player {
    /// A player `id` of `players`, using `strategy`.
    ///
    /// # Errors
    ///
    /// Returns [`PlayerError::PlayerCount`] unless `1 <= players <= 10`, or
    /// [`PlayerError::PlayerId`] unless `id < players`.
    pub fn new(players: usize, id: PlayerId, strategy: StrategyKind) -> Result<Self, PlayerError> {
        if players == 0 || players > MAX_PLAYERS {
            return Err(PlayerError::PlayerCount);
        }
        if usize::from(id) >= players {
            return Err(PlayerError::PlayerId);
        }
        Ok(Self {
            id,
            players,
            strategy,
            ladder: strategy.ladder(),
            phase: PlayerPhase::AwaitingPath,
            mirror: None,
        })
    }

    /// Build a player from its two command-line arguments.
    ///
    /// Both must be plain decimal numbers; the count is checked first.
    ///
    /// # Errors
    ///
    /// Same as [`Player::new`], plus malformed numbers.
    pub fn from_args(players: &str, id: &str, strategy: StrategyKind) -> Result<Self, PlayerError> {
        let players = parse_decimal(players).ok_or(PlayerError::PlayerCount)?;
        if players == 0 || players > MAX_PLAYERS {
            return Err(PlayerError::PlayerCount);
        }
        let id = parse_decimal(id)
            .and_then(|id| PlayerId::try_from(id).ok())
            .ok_or(PlayerError::PlayerId)?;
        Self::new(players, id, strategy)
    }

    /// This player's id.
    #[must_use]
    pub fn id(&self) -> PlayerId {
        self.id
    }

    /// Number of participants in the game.
    #[must_use]
    pub fn players(&self) -> usize {
        self.players
    }

    /// Decision policy in use.
    #[must_use]
    pub fn strategy(&self) -> StrategyKind {
        self.strategy
    }

    /// Current protocol phase.
    #[must_use]
    pub fn phase(&self) -> PlayerPhase {
        self.phase
    }

    /// The mirror, once the path deck has arrived.
    #[must_use]
    pub fn mirror(&self) -> Option<&Mirror> {
        self.mirror.as_ref()
    }

    /// React to one line from the dealer (newline optional).
    ///
    /// # Errors
    ///
    /// Returns the fatal error for a bad path deck, `EARLY`, or any
    /// protocol violation. The player must not be driven further after an
    /// error.
    pub fn handle_line(&mut self, line: &str) -> Result<Step, PlayerError> {
        match self.phase {
            PlayerPhase::AwaitingPath => {
                let path = PathDeck::parse(line).map_err(PlayerError::Path)?;
                let mirror = Mirror::new(path, self.players);
                debug!(id = self.id, board = %mirror.board().render(), "path received");
                self.mirror = Some(mirror);
                self.phase = PlayerPhase::Idle;
                Ok(Step::Continue)
            }
            PlayerPhase::Idle => self.handle_message(DealerMessage::decode(line)?),
            PlayerPhase::Finished => Err(ProtocolError::Unexpected {
                expected: "end of stream",
                got: line.to_owned(),
            }
            .into()),
        }
    }

    fn handle_message(&mut self, message: DealerMessage) -> Result<Step, PlayerError> {
        let Some(mirror) = self.mirror.as_mut() else {
            return Err(ProtocolError::Unexpected {
                expected: "path deck",
                got: message.to_string(),
            }
            .into());
        };

        match message {
            DealerMessage::YourTurn => {
                let view = View::new(mirror, self.id).ok_or_else(|| ProtocolError::Unexpected {
                    expected: "no turn after reaching the end",
                    got: message.to_string(),
                })?;
                let target = self.ladder.decide(&view);
                debug!(id = self.id, target, "decided");
                Ok(Step::Reply(PlayerMessage::Move(target)))
            }
            DealerMessage::Happened(event) => {
                mirror.apply(&event)?;
                if let Some(record) = mirror.record(event.player) {
                    info!(id = self.id, "{record}");
                }
                debug!(id = self.id, board = %mirror.board().render(), "board");
                Ok(Step::Continue)
            }
            DealerMessage::Done => {
                if !mirror.board().all_terminal() {
                    return Err(ProtocolError::Inconsistent(
                        "game over while participants are still on the path".to_owned(),
                    )
                    .into());
                }
                self.phase = PlayerPhase::Finished;
                Ok(Step::Finished(mirror.scores()))
            }
            DealerMessage::Early => Err(PlayerError::EarlyGameOver),
        }
    }

    /// Play a whole game over a byte stream.
    ///
    /// Writes the acknowledgment, then feeds every input line through
    /// [`Player::handle_line`] and writes replies until `DONE`.
    ///
    /// # Errors
    ///
    /// Returns the first fatal error, including
    /// [`ProtocolError::StreamClosed`] if input ends before `DONE`.
    pub fn run<R: BufRead, W: Write>(&mut self, mut input: R, mut output: W) -> Result<Vec<u32>, PlayerError> {
        output
            .write_all(&[ACK])
            .and_then(|()| output.flush())
            .map_err(ProtocolError::from)?;

        // Lines go through undecoded so framing is judged by `handle_line`
        let mut line = String::new();
        loop {
            line.clear();
            if input.read_line(&mut line).map_err(ProtocolError::from)? == 0 {
                break;
            }
            match self.handle_line(&line)? {
                Step::Continue => {}
                Step::Reply(message) => {
                    output
                        .write_all(message.encode().as_bytes())
                        .and_then(|()| output.flush())
                        .map_err(ProtocolError::from)?;
                }
                Step::Finished(scores) => return Ok(scores),
            }
        }

        Err(ProtocolError::StreamClosed.into())
    }
}

fn parse_decimal(arg: &str) -> Option<usize> {
    if arg.is_empty() || !arg.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    arg.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ready(id: PlayerId) -> Player {
        let mut player = Player::new(2, id, StrategyKind::Collector).unwrap();
        player.handle_line("4;::-Mo1Do1::-\n").unwrap();
        player
    }

    #[test]
    fn test_argument_validation() {
        assert!(matches!(
            Player::from_args("x", "0", StrategyKind::Donor),
            Err(PlayerError::PlayerCount)
        ));
        assert!(matches!(
            Player::from_args("0", "0", StrategyKind::Donor),
            Err(PlayerError::PlayerCount)
        ));
        assert!(matches!(
            Player::from_args("2", "2", StrategyKind::Donor),
            Err(PlayerError::PlayerId)
        ));
        assert!(matches!(
            Player::from_args("2", "-1", StrategyKind::Donor),
            Err(PlayerError::PlayerId)
        ));
        let player = Player::from_args("3", "2", StrategyKind::Donor).unwrap();
        assert_eq!((player.players(), player.id()), (3, 2));
        assert_eq!(player.phase(), PlayerPhase::AwaitingPath);
    }

    #[test]
    fn test_bad_path_is_fatal() {
        let mut player = Player::new(2, 0, StrategyKind::Donor).unwrap();
        let err = player.handle_line("4;::-Mo1Do1").unwrap_err();
        assert_eq!(err.exit_code(), 4);
    }

    #[test]
    fn test_turn_and_event() {
        let mut player = ready(0);
        assert_eq!(
            player.handle_line("YT").unwrap(),
            Step::Reply(PlayerMessage::Move(1))
        );
        assert_eq!(player.handle_line("HAP0,1,0,3,0").unwrap(), Step::Continue);
        let record = player.mirror().unwrap().record(0).unwrap();
        assert_eq!(record.money, 10);
    }

    #[test]
    fn test_done_requires_everyone_home() {
        let mut player = ready(1);
        let err = player.handle_line("DONE").unwrap_err();
        assert_eq!(err.exit_code(), 6);

        let mut player = ready(1);
        player.handle_line("HAP0,3,0,0,0").unwrap();
        player.handle_line("HAP1,3,0,0,0").unwrap();
        assert_eq!(player.handle_line("DONE").unwrap(), Step::Finished(vec![0, 0]));
        assert_eq!(player.phase(), PlayerPhase::Finished);
        assert!(player.handle_line("YT").is_err());
    }

    #[test]
    fn test_early_and_garbage() {
        assert_eq!(ready(0).handle_line("EARLY").unwrap_err().exit_code(), 5);
        assert_eq!(ready(0).handle_line("HELLO").unwrap_err().exit_code(), 6);
        assert_eq!(ready(0).handle_line("HAP2,1,0,0,0").unwrap_err().exit_code(), 6);
        assert_eq!(ready(0).handle_line("HAP0,0,0,0,0").unwrap_err().exit_code(), 6);
    }

    #[test]
    fn test_run_over_buffers() {
        let input = "4;::-Mo1Do1::-\nYT\nHAP0,1,0,3,0\nHAP1,2,3,-7,0\nYT\nHAP0,3,0,0,0\nHAP1,3,0,0,0\nDONE\n";
        let mut output = Vec::new();
        let mut player = Player::new(2, 0, StrategyKind::Collector).unwrap();
        let scores = player.run(input.as_bytes(), &mut output).unwrap();
        assert_eq!(scores, vec![0, 3]);
        assert_eq!(output, b"^DO1\nDO3\n");
    }

    #[test]
    fn test_run_rejects_carriage_returns() {
        let mut player = Player::new(2, 0, StrategyKind::Collector).unwrap();
        let err = player
            .run("4;::-Mo1Do1::-\nYT\r\n".as_bytes(), Vec::new())
            .unwrap_err();
        assert_eq!(err.exit_code(), 6);
        assert!(ready(0).handle_line("YT\r\n").is_err());
    }

    #[test]
    fn test_hostile_effects_are_protocol_errors() {
        let mut player = ready(0);
        player.handle_line("HAP1,1,0,2147483640,0\n").unwrap();
        let err = player.handle_line("HAP1,2,0,1,0\n").unwrap_err();
        assert_eq!(err.exit_code(), 6);
    }

    #[test]
    fn test_run_stream_closed() {
        let mut player = Player::new(2, 0, StrategyKind::Donor).unwrap();
        let err = player.run("4;::-Mo1Do1::-\n".as_bytes(), Vec::new()).unwrap_err();
        assert!(matches!(err, PlayerError::Protocol(ProtocolError::StreamClosed)));
    }
}
