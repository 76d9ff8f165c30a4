//! Timed duplex line channel to one peer.
//!
//! A dedicated reader thread owns the read half and forwards what it reads
//! over an mpsc channel, so that the owning side can wait with a timeout.

use std::io::{self, BufRead, BufReader, Read, Write};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::thread;
use std::time::Duration;

use tracing::{debug, trace};

use crate::error::ProtocolError;
use crate::protocol::ACK;

/// What the reader thread saw on the stream.
#[derive(Debug)]
pub enum Inbound {
    /// The first byte of the stream, the acknowledgment slot.
    Ack(u8),
    /// One complete line, newline stripped.
    Line(String),
    /// End of stream.
    Closed,
    /// The read failed.
    Failed(io::Error),
}

/// Write half plus a channel fed by the reader thread.
#[derive(Debug)]
pub struct Connection<W: Write> {
    label: String,
    writer: W,
    inbound: Receiver<Inbound>,
    timeout: Option<Duration>,
}

impl<W: Write> Connection<W> {
    /// Wrap a reader and writer. Spawns the reader thread immediately.
    ///
    /// `label` names the peer in log output. With `timeout` set, every
    /// receive fails with [`ProtocolError::Timeout`] once it expires.
    pub fn new<R>(label: impl Into<String>, reader: R, writer: W, timeout: Option<Duration>) -> Self
    where
        R: Read + Send + 'static,
    {
        let label = label.into();
        let (sender, inbound) = mpsc::channel();
        let thread_label = label.clone();

        thread::spawn(move || {
            let mut reader = BufReader::new(reader);
            let mut first = [0u8; 1];
            let message = match reader.read(&mut first) {
                Ok(0) => Inbound::Closed,
                Ok(_) => Inbound::Ack(first[0]),
                Err(e) => Inbound::Failed(e),
            };
            let stop = !matches!(message, Inbound::Ack(_));
            if sender.send(message).is_err() || stop {
                return;
            }

            loop {
                let mut line = String::new();
                let message = match reader.read_line(&mut line) {
                    Ok(0) => Inbound::Closed,
                    // A final line without its newline is still a line
                    Ok(_) => Inbound::Line(line.strip_suffix('\n').unwrap_or(&line).to_owned()),
                    Err(e) => Inbound::Failed(e),
                };
                let stop = !matches!(message, Inbound::Line(_));
                if let Inbound::Line(line) = &message {
                    trace!(peer = %thread_label, %line, "read");
                }
                if sender.send(message).is_err() || stop {
                    return;
                }
            }
        });

        Self {
            label,
            writer,
            inbound,
            timeout,
        }
    }

    /// The peer label.
    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Write one line (newline included) and flush.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::Io`] if the peer's stream is gone.
    pub fn send(&mut self, line: &str) -> Result<(), ProtocolError> {
        debug!(peer = %self.label, line = line.trim_end(), "send");
        self.writer.write_all(line.as_bytes())?;
        self.writer.flush()?;
        Ok(())
    }

    /// Wait for the acknowledgment byte.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::BadAck`] for any other first byte, or the
    /// receive error.
    pub fn recv_ack(&mut self) -> Result<(), ProtocolError> {
        match self.recv()? {
            Inbound::Ack(ACK) => Ok(()),
            Inbound::Ack(other) => Err(ProtocolError::BadAck(other)),
            Inbound::Line(line) => Err(ProtocolError::Unexpected {
                expected: "acknowledgment",
                got: line,
            }),
            Inbound::Closed => Err(ProtocolError::StreamClosed),
            Inbound::Failed(e) => Err(ProtocolError::Io(e)),
        }
    }

    /// Wait for the next line.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::StreamClosed`] at end of stream,
    /// [`ProtocolError::Timeout`] if the timeout expires, or the read error.
    pub fn recv_line(&mut self) -> Result<String, ProtocolError> {
        match self.recv()? {
            Inbound::Line(line) => {
                debug!(peer = %self.label, %line, "recv");
                Ok(line)
            }
            Inbound::Ack(byte) => Err(ProtocolError::BadAck(byte)),
            Inbound::Closed => Err(ProtocolError::StreamClosed),
            Inbound::Failed(e) => Err(ProtocolError::Io(e)),
        }
    }

    fn recv(&mut self) -> Result<Inbound, ProtocolError> {
        match self.timeout {
            Some(timeout) => match self.inbound.recv_timeout(timeout) {
                Ok(message) => Ok(message),
                Err(RecvTimeoutError::Timeout) => Err(ProtocolError::Timeout(timeout)),
                Err(RecvTimeoutError::Disconnected) => Err(ProtocolError::StreamClosed),
            },
            None => self.inbound.recv().map_err(|_| ProtocolError::StreamClosed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn connection(input: &'static [u8], timeout: Option<Duration>) -> Connection<Vec<u8>> {
        Connection::new("test", Cursor::new(input), Vec::new(), timeout)
    }

    #[test]
    fn test_ack_then_lines() {
        let mut conn = connection(b"^DO1\nDO2", None);
        conn.recv_ack().unwrap();
        assert_eq!(conn.recv_line().unwrap(), "DO1");
        assert_eq!(conn.recv_line().unwrap(), "DO2");
        assert!(matches!(conn.recv_line(), Err(ProtocolError::StreamClosed)));
    }

    #[test]
    fn test_bad_ack() {
        let mut conn = connection(b"DO1\n", None);
        assert!(matches!(conn.recv_ack(), Err(ProtocolError::BadAck(b'D'))));
    }

    #[test]
    fn test_empty_stream() {
        let mut conn = connection(b"", None);
        assert!(matches!(conn.recv_ack(), Err(ProtocolError::StreamClosed)));
    }

    #[test]
    fn test_send_flushes_line() {
        let mut conn = connection(b"", None);
        conn.send("YT\n").unwrap();
        conn.send("DONE\n").unwrap();
        assert_eq!(conn.writer, b"YT\nDONE\n");
    }

    /// A peer that says nothing for a long time.
    struct Stalled;

    impl Read for Stalled {
        fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
            thread::sleep(Duration::from_secs(1));
            Ok(0)
        }
    }

    #[test]
    fn test_timeout() {
        let mut conn = Connection::new("silent", Stalled, Vec::new(), Some(Duration::from_millis(20)));
        assert!(matches!(conn.recv_ack(), Err(ProtocolError::Timeout(_))));
    }
}
