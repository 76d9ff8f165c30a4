//! Orchestrator state machine.
//!
//! The dealer owns the authoritative [`GameState`] and drives every seat
//! through the protocol: collect acknowledgments, broadcast the path deck,
//! then prompt, validate, apply and broadcast one move at a time until every
//! participant stands on the terminal barrier.
//!
//! ```text
//! AwaitingTurn(id) -> AwaitingMove(id) -> ApplyingMove -> Broadcasting -+
//!        ^                                                               |
//!        +------------------------------ (not finished) ----------------+
//!                                        (everyone home) -> Finished
//! ```
//!
//! Any violation aborts the game: `EARLY` goes to every seat, best effort.

mod seat;

pub use seat::{LocalSeat, ProcessSeat, Seat};

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::error::{ItemDeckError, PathError, ProtocolError};
use crate::game::{Event, GameState, PlayerId, assert_invariants};
use crate::protocol::{DealerMessage, PlayerMessage};

/// Why the dealer stopped early. Each variant has its own exit code.
#[derive(Debug, Error)]
pub enum DealerError {
    /// The item deck could not be read or parsed.
    #[error("Error reading deck")]
    ItemDeck(#[source] ItemDeckError),
    /// The path deck could not be read or parsed.
    #[error("Error reading path")]
    Path(#[source] PathError),
    /// A player process could not be started or did not acknowledge.
    #[error("Error starting process")]
    Start {
        /// The participant that failed.
        player: PlayerId,
        /// The underlying failure.
        #[source]
        source: ProtocolError,
    },
    /// A player broke the protocol or vanished mid-game.
    #[error("Communications error")]
    Protocol {
        /// The participant at fault.
        player: PlayerId,
        /// The violation.
        #[source]
        source: ProtocolError,
    },
}

impl DealerError {
    /// Process exit code for this error.
    #[must_use]
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::ItemDeck(_) => 2,
            Self::Path(_) => 3,
            Self::Start { .. } => 4,
            Self::Protocol { .. } => 5,
        }
    }
}

/// Where the dealer is in the game loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DealerPhase {
    /// Waiting for every acknowledgment.
    Handshake,
    /// About to prompt this participant.
    AwaitingTurn(PlayerId),
    /// Prompted; waiting for its move.
    AwaitingMove(PlayerId),
    /// A syntactically valid move arrived.
    ApplyingMove {
        /// The mover.
        player: PlayerId,
        /// Its requested site.
        target: usize,
    },
    /// A move was accepted and must reach every seat.
    Broadcasting(Event),
    /// Scores reported and `DONE` sent.
    Finished,
    /// `EARLY` sent after a violation.
    Aborted,
}

/// Things worth showing while a game runs.
#[derive(Debug, Clone, Copy)]
pub enum Progress<'a> {
    /// Path broadcast; everyone on the starting barrier.
    Started(&'a GameState),
    /// A move was accepted and broadcast.
    Moved(&'a GameState, Event),
    /// Everyone is home; `DONE` follows.
    Finished(&'a GameState),
}

/// The authoritative side of one game.
#[derive(Debug)]
pub struct Dealer<S: Seat> {
    state: GameState,
    seats: Vec<S>,
    phase: DealerPhase,
}

impl<S: Seat> Dealer<S> {
    /// A dealer for `state` with one seat per participant, in id order.
    ///
    /// # Panics
    ///
    /// Panics if the number of seats does not match the number of
    /// participants in `state`.
    #[must_use]
    pub fn new(state: GameState, seats: Vec<S>) -> Self {
        assert_eq!(
            state.players(),
            seats.len(),
            "one seat per participant is required"
        );
        Self {
            state,
            seats,
            phase: DealerPhase::Handshake,
        }
    }

    /// The authoritative state.
    #[must_use]
    pub fn state(&self) -> &GameState {
        &self.state
    }

    /// The seats, in id order.
    #[must_use]
    pub fn seats(&self) -> &[S] {
        &self.seats
    }

    /// Current phase.
    #[must_use]
    pub fn phase(&self) -> DealerPhase {
        self.phase
    }

    /// Give the seats back, e.g. to inspect in-process players.
    #[must_use]
    pub fn into_parts(self) -> (GameState, Vec<S>) {
        (self.state, self.seats)
    }

    /// Play the game to the end.
    ///
    /// `progress` is called after the path broadcast, after every accepted
    /// move, and once everyone is home.
    ///
    /// # Errors
    ///
    /// Returns the first violation. `EARLY` has already been sent to every
    /// seat by then.
    pub fn run(&mut self, mut progress: impl FnMut(Progress<'_>)) -> Result<Vec<u32>, DealerError> {
        match self.drive(&mut progress) {
            Ok(scores) => Ok(scores),
            Err(e) => {
                warn!(error = %e, cause = ?std::error::Error::source(&e), "aborting game");
                self.abort();
                Err(e)
            }
        }
    }

    fn drive(&mut self, progress: &mut impl FnMut(Progress<'_>)) -> Result<Vec<u32>, DealerError> {
        while !matches!(self.phase, DealerPhase::Finished | DealerPhase::Aborted) {
            self.phase = self.step(progress)?;
        }

        let scores = self.state.scores();
        progress(Progress::Finished(&self.state));
        self.broadcast(&DealerMessage::Done.encode())?;
        info!(?scores, moves = self.state.events().len(), "game finished");
        Ok(scores)
    }

    /// Perform the work of the current phase and return the next one.
    fn step(&mut self, progress: &mut impl FnMut(Progress<'_>)) -> Result<DealerPhase, DealerError> {
        let next = match self.phase {
            DealerPhase::Handshake => {
                self.handshake()?;
                progress(Progress::Started(&self.state));
                self.next_turn()
            }
            DealerPhase::AwaitingTurn(player) => {
                self.send_to(player, &DealerMessage::YourTurn.encode())?;
                DealerPhase::AwaitingMove(player)
            }
            DealerPhase::AwaitingMove(player) => {
                let PlayerMessage::Move(target) = self.read_move(player)?;
                DealerPhase::ApplyingMove { player, target }
            }
            DealerPhase::ApplyingMove { player, target } => {
                let event = self
                    .state
                    .apply_move(player, target)
                    .map_err(|source| DealerError::Protocol { player, source })?;
                assert_invariants(&self.state);
                DealerPhase::Broadcasting(event)
            }
            DealerPhase::Broadcasting(event) => {
                self.broadcast(&DealerMessage::Happened(event).encode())?;
                progress(Progress::Moved(&self.state, event));
                self.next_turn()
            }
            phase @ (DealerPhase::Finished | DealerPhase::Aborted) => phase,
        };
        Ok(next)
    }

    fn handshake(&mut self) -> Result<(), DealerError> {
        for (id, seat) in self.seats.iter_mut().enumerate() {
            #[allow(clippy::cast_possible_truncation)]
            let player = id as PlayerId;
            seat.recv_ack()
                .map_err(|source| DealerError::Start { player, source })?;
        }
        debug!(players = self.seats.len(), "all players acknowledged");
        let line = format!("{}\n", self.state.path());
        self.broadcast(&line)
    }

    fn next_turn(&self) -> DealerPhase {
        self.state
            .next_player()
            .map_or(DealerPhase::Finished, DealerPhase::AwaitingTurn)
    }

    fn read_move(&mut self, player: PlayerId) -> Result<PlayerMessage, DealerError> {
        let seat = &mut self.seats[usize::from(player)];
        seat.recv_line()
            .and_then(|line| PlayerMessage::decode(&line))
            .map_err(|source| DealerError::Protocol { player, source })
    }

    fn send_to(&mut self, player: PlayerId, line: &str) -> Result<(), DealerError> {
        self.seats[usize::from(player)]
            .send(line)
            .map_err(|source| DealerError::Protocol { player, source })
    }

    fn broadcast(&mut self, line: &str) -> Result<(), DealerError> {
        for id in 0..self.seats.len() {
            #[allow(clippy::cast_possible_truncation)]
            self.send_to(id as PlayerId, line)?;
        }
        Ok(())
    }

    fn abort(&mut self) {
        let line = DealerMessage::Early.encode();
        for (id, seat) in self.seats.iter_mut().enumerate() {
            if let Err(e) = seat.send(&line) {
                debug!(id, error = %e, "could not deliver EARLY");
            }
        }
        self.phase = DealerPhase::Aborted;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{self, Cursor, Read};
    use std::thread;
    use std::time::Duration;

    use crate::game::{ItemDeck, PathDeck, TieBreak};
    use crate::player::Player;
    use crate::protocol::{ACK, Connection};
    use crate::strategy::StrategyKind;

    /// A scripted player: a fixed reply list and a transcript of what it saw.
    #[derive(Debug, Default)]
    struct Scripted {
        ack: bool,
        replies: Vec<String>,
        seen: Vec<String>,
    }

    impl Scripted {
        fn new(replies: &[&str]) -> Self {
            Self {
                ack: true,
                replies: replies.iter().rev().map(|r| (*r).to_owned()).collect(),
                seen: Vec::new(),
            }
        }
    }

    impl Seat for Scripted {
        fn send(&mut self, line: &str) -> Result<(), ProtocolError> {
            self.seen.push(line.to_owned());
            Ok(())
        }

        fn recv_ack(&mut self) -> Result<(), ProtocolError> {
            if self.ack { Ok(()) } else { Err(ProtocolError::BadAck(b'x')) }
        }

        fn recv_line(&mut self) -> Result<String, ProtocolError> {
            self.replies.pop().ok_or(ProtocolError::StreamClosed)
        }
    }

    fn state(players: usize) -> GameState {
        GameState::new(
            PathDeck::parse("4;::-Mo1Do1::-").unwrap(),
            ItemDeck::parse("1A").unwrap(),
            players,
            TieBreak::Arrival,
        )
    }

    #[test]
    fn test_scripted_game() {
        let seats = vec![Scripted::new(&["DO1", "DO3"]), Scripted::new(&["DO2", "DO3"])];
        let mut dealer = Dealer::new(state(2), seats);
        let scores = dealer.run(|_| {}).unwrap();
        assert_eq!(scores, vec![0, 3]);
        assert_eq!(dealer.phase(), DealerPhase::Finished);

        let expected = [
            "4;::-Mo1Do1::-\n",
            "YT\n",
            "HAP0,1,0,3,0\n",
            "HAP1,2,3,-7,0\n",
            "YT\n",
            "HAP0,3,0,0,0\n",
            "HAP1,3,0,0,0\n",
            "DONE\n",
        ];
        assert_eq!(dealer.seats()[0].seen, expected);
    }

    #[test]
    fn test_illegal_move_aborts() {
        let seats = vec![Scripted::new(&["DO0"]), Scripted::new(&[])];
        let mut dealer = Dealer::new(state(2), seats);
        let err = dealer.run(|_| {}).unwrap_err();
        assert_eq!(err.exit_code(), 5);
        assert_eq!(dealer.phase(), DealerPhase::Aborted);
        for seat in dealer.seats() {
            assert_eq!(seat.seen.last().map(String::as_str), Some("EARLY\n"));
        }
    }

    #[test]
    fn test_malformed_and_closed() {
        let mut dealer = Dealer::new(state(1), vec![Scripted::new(&["DO 1"])]);
        assert!(matches!(
            dealer.run(|_| {}),
            Err(DealerError::Protocol {
                player: 0,
                source: ProtocolError::Malformed(_)
            })
        ));

        let mut dealer = Dealer::new(state(1), vec![Scripted::new(&[])]);
        assert!(matches!(
            dealer.run(|_| {}),
            Err(DealerError::Protocol {
                source: ProtocolError::StreamClosed,
                ..
            })
        ));
    }

    /// Acknowledges, then never answers.
    #[derive(Debug, Default)]
    struct AckThenSilence {
        acked: bool,
    }

    impl Read for AckThenSilence {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            if !self.acked && !buf.is_empty() {
                self.acked = true;
                buf[0] = ACK;
                return Ok(1);
            }
            thread::sleep(Duration::from_secs(1));
            Ok(0)
        }
    }

    #[test]
    fn test_turn_timeout_aborts_with_early() {
        let timeout = Some(Duration::from_millis(50));
        let (mut slow_out, mut other_out) = (Vec::new(), Vec::new());

        let err = {
            let seats = vec![
                Connection::new("player 0", AckThenSilence::default(), &mut slow_out, timeout),
                Connection::new("player 1", Cursor::new(vec![ACK]), &mut other_out, timeout),
            ];
            let mut dealer = Dealer::new(state(2), seats);
            let err = dealer.run(|_| {}).unwrap_err();
            assert_eq!(dealer.phase(), DealerPhase::Aborted);
            err
        };

        assert!(matches!(
            err,
            DealerError::Protocol {
                player: 0,
                source: ProtocolError::Timeout(_)
            }
        ));
        assert_eq!(err.exit_code(), 5);
        assert_eq!(
            String::from_utf8(slow_out).unwrap(),
            "4;::-Mo1Do1::-\nYT\nEARLY\n"
        );
        assert_eq!(String::from_utf8(other_out).unwrap(), "4;::-Mo1Do1::-\nEARLY\n");
    }

    #[test]
    fn test_bad_ack_is_start_failure() {
        let mut seat = Scripted::new(&[]);
        seat.ack = false;
        let mut dealer = Dealer::new(state(1), vec![seat]);
        let err = dealer.run(|_| {}).unwrap_err();
        assert_eq!(err.exit_code(), 4);
        assert_eq!(err.to_string(), "Error starting process");
    }

    #[test]
    fn test_progress_reports_every_move() {
        let seats = (0..2)
            .map(|id| LocalSeat::new(Player::new(2, id, StrategyKind::Collector).unwrap()))
            .collect();
        let mut dealer = Dealer::new(state(2), seats);
        let mut moves = Vec::new();
        let mut finished = false;
        dealer
            .run(|progress| match progress {
                Progress::Moved(_, event) => moves.push((event.player, event.site)),
                Progress::Finished(state) => finished = state.is_game_over(),
                Progress::Started(_) => {}
            })
            .unwrap();
        assert_eq!(moves, vec![(0, 1), (1, 2), (0, 3), (1, 3)]);
        assert!(finished);

        let (_, seats) = dealer.into_parts();
        for seat in seats {
            assert_eq!(seat.outcome().unwrap().as_ref().unwrap(), &vec![0, 3]);
        }
    }
}
