//! Seats: the dealer's end of one player's channel.
//!
//! A seat is either a child process talking over its stdio pipes or a
//! [`Player`] driven in-process. The dealer cannot tell them apart.

use std::collections::VecDeque;
use std::ffi::OsStr;
use std::io::{self, Write};
use std::process::{Child, ChildStdin, Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use tracing::{debug, warn};

use crate::error::ProtocolError;
use crate::game::PlayerId;
use crate::player::{Player, PlayerError, Step};
use crate::protocol::{ACK, Connection};

/// How long a finished child gets to exit on its own before it is killed.
const EXIT_GRACE: Duration = Duration::from_secs(2);

/// The dealer's end of a duplex line channel to one player.
pub trait Seat {
    /// Write one line, newline included.
    ///
    /// # Errors
    ///
    /// Returns an error if the player's input is gone.
    fn send(&mut self, line: &str) -> Result<(), ProtocolError>;

    /// Wait for the single acknowledgment byte.
    ///
    /// # Errors
    ///
    /// Returns an error for a wrong byte, end of stream, or timeout.
    fn recv_ack(&mut self) -> Result<(), ProtocolError>;

    /// Wait for the next line, newline stripped.
    ///
    /// # Errors
    ///
    /// Returns an error at end of stream or on timeout.
    fn recv_line(&mut self) -> Result<String, ProtocolError>;
}

impl<W: Write> Seat for Connection<W> {
    fn send(&mut self, line: &str) -> Result<(), ProtocolError> {
        Connection::send(self, line)
    }

    fn recv_ack(&mut self) -> Result<(), ProtocolError> {
        Connection::recv_ack(self)
    }

    fn recv_line(&mut self) -> Result<String, ProtocolError> {
        Connection::recv_line(self)
    }
}

/// A player running as a child process.
#[derive(Debug)]
pub struct ProcessSeat {
    child: Child,
    connection: Option<Connection<ChildStdin>>,
}

impl ProcessSeat {
    /// Start `program` with arguments `<leading>... <players> <id>` and
    /// piped stdio.
    ///
    /// The child's stderr is discarded when `quiet` is set and inherited
    /// otherwise.
    ///
    /// # Errors
    ///
    /// Returns the spawn error if the program cannot be started.
    pub fn spawn(
        program: &OsStr,
        leading: &[String],
        players: usize,
        id: PlayerId,
        timeout: Option<Duration>,
        quiet: bool,
    ) -> io::Result<Self> {
        let mut child = Command::new(program)
            .args(leading)
            .arg(players.to_string())
            .arg(id.to_string())
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(if quiet { Stdio::null() } else { Stdio::inherit() })
            .spawn()?;

        let (Some(stdin), Some(stdout)) = (child.stdin.take(), child.stdout.take()) else {
            let _ = child.kill();
            return Err(io::Error::other("child stdio was not piped"));
        };
        debug!(id, pid = child.id(), program = %program.to_string_lossy(), "spawned player");

        let label = format!("player {id}");
        Ok(Self {
            child,
            connection: Some(Connection::new(label, stdout, stdin, timeout)),
        })
    }

    fn connection(&mut self) -> Result<&mut Connection<ChildStdin>, ProtocolError> {
        self.connection.as_mut().ok_or(ProtocolError::StreamClosed)
    }
}

impl Seat for ProcessSeat {
    fn send(&mut self, line: &str) -> Result<(), ProtocolError> {
        self.connection()?.send(line)
    }

    fn recv_ack(&mut self) -> Result<(), ProtocolError> {
        self.connection()?.recv_ack()
    }

    fn recv_line(&mut self) -> Result<String, ProtocolError> {
        self.connection()?.recv_line()
    }
}

impl Drop for ProcessSeat {
    fn drop(&mut self) {
        // Closing stdin lets a well-behaved player see end of stream
        drop(self.connection.take());

        let deadline = Instant::now() + EXIT_GRACE;
        loop {
            match self.child.try_wait() {
                Ok(Some(status)) => {
                    debug!(pid = self.child.id(), %status, "player exited");
                    return;
                }
                Ok(None) if Instant::now() < deadline => thread::sleep(Duration::from_millis(10)),
                Ok(None) | Err(_) => break,
            }
        }
        warn!(pid = self.child.id(), "player did not exit, killing it");
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

/// What a [`LocalSeat`] has for the dealer to read next.
#[derive(Debug)]
enum Pending {
    Ack,
    Line(String),
}

/// A [`Player`] driven synchronously inside the dealer's process.
///
/// Every line the dealer sends is handed straight to the player; replies are
/// queued for the dealer's next read. Once the player fails, the seat behaves
/// like a closed stream.
#[derive(Debug)]
pub struct LocalSeat {
    player: Player,
    pending: VecDeque<Pending>,
    outcome: Option<Result<Vec<u32>, PlayerError>>,
}

impl LocalSeat {
    /// Seat an in-process player. Its acknowledgment is queued immediately.
    #[must_use]
    pub fn new(player: Player) -> Self {
        Self {
            player,
            pending: VecDeque::from([Pending::Ack]),
            outcome: None,
        }
    }

    /// The seated player.
    #[must_use]
    pub fn player(&self) -> &Player {
        &self.player
    }

    /// How the player's game ended: its scores, or its fatal error. `None`
    /// while it is still playing.
    #[must_use]
    pub fn outcome(&self) -> Option<&Result<Vec<u32>, PlayerError>> {
        self.outcome.as_ref()
    }
}

impl Seat for LocalSeat {
    fn send(&mut self, line: &str) -> Result<(), ProtocolError> {
        if self.outcome.is_some() {
            return Err(ProtocolError::Io(io::Error::from(io::ErrorKind::BrokenPipe)));
        }
        match self.player.handle_line(line) {
            Ok(Step::Continue) => {}
            Ok(Step::Reply(message)) => self.pending.push_back(Pending::Line(message.to_string())),
            Ok(Step::Finished(scores)) => self.outcome = Some(Ok(scores)),
            Err(e) => {
                debug!(id = self.player.id(), error = %e, "local player stopped");
                self.outcome = Some(Err(e));
            }
        }
        Ok(())
    }

    fn recv_ack(&mut self) -> Result<(), ProtocolError> {
        match self.pending.pop_front() {
            Some(Pending::Ack) => Ok(()),
            Some(Pending::Line(line)) => Err(ProtocolError::BadAck(line.bytes().next().unwrap_or(ACK))),
            None => Err(ProtocolError::StreamClosed),
        }
    }

    fn recv_line(&mut self) -> Result<String, ProtocolError> {
        match self.pending.pop_front() {
            Some(Pending::Line(line)) => Ok(line),
            Some(Pending::Ack) => Err(ProtocolError::BadAck(ACK)),
            None => Err(ProtocolError::StreamClosed),
        }
    }
}
