//! Error taxonomy shared by the dealer and the players.
//!
//! Every error here is fatal to the side that raises it, with one exception:
//! [`CapacityExceeded`] is the board's refusal to seat someone on a full
//! site. The dealer reports it as [`ProtocolError::IllegalMove`] and it is
//! never surfaced over the wire.

use std::io;
use std::time::Duration;

use thiserror::Error;

use crate::game::PlayerId;

/// A path deck failed structural validation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PathError {
    /// The deck file could not be read.
    #[error("cannot read path deck: {0}")]
    Unreadable(String),
    /// The `<count>;` prefix is missing.
    #[error("path deck has no count delimiter")]
    MissingDelimiter,
    /// The count prefix is not a plain decimal number.
    #[error("path deck count {0:?} is not a number")]
    BadCount(String),
    /// Fewer than two sites were declared.
    #[error("path deck declares {0} sites (minimum 2)")]
    TooShort(usize),
    /// The body does not hold exactly three characters per declared site.
    #[error("path deck body has {actual} characters, expected {expected}")]
    LengthMismatch {
        /// Characters required by the declared count.
        expected: usize,
        /// Characters actually present.
        actual: usize,
    },
    /// The first or last site is not a barrier.
    #[error("site {index} must be a barrier")]
    MissingBarrier {
        /// Offending site index.
        index: usize,
    },
    /// A two-character type tag is not recognized.
    #[error("site {index} has unknown tag {tag:?}")]
    UnknownTag {
        /// Offending site index.
        index: usize,
        /// The tag as read.
        tag: String,
    },
    /// A capacity symbol is not valid for its site kind.
    #[error("site {index} has invalid capacity symbol {symbol:?}")]
    BadCapacity {
        /// Offending site index.
        index: usize,
        /// The capacity character as read.
        symbol: char,
    },
}

/// An item deck failed validation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ItemDeckError {
    /// The deck file could not be read.
    #[error("cannot read item deck: {0}")]
    Unreadable(String),
    /// The count prefix is missing or not a number.
    #[error("item deck has no item count")]
    MissingCount,
    /// The deck declares no items.
    #[error("item deck is empty")]
    Empty,
    /// The number of items does not match the declared count.
    #[error("item deck declares {expected} items but holds {actual}")]
    LengthMismatch {
        /// Declared count.
        expected: usize,
        /// Items actually present.
        actual: usize,
    },
    /// An item letter outside `A`..=`E`.
    #[error("item {index} has unknown class {symbol:?}")]
    UnknownItem {
        /// Position within the deck.
        index: usize,
        /// The character as read.
        symbol: char,
    },
}

/// A site is already at capacity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("site {site} is full ({capacity} occupants)")]
pub struct CapacityExceeded {
    /// The full site.
    pub site: usize,
    /// Its capacity.
    pub capacity: u8,
}

/// A breach of the line protocol, or loss of the peer.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// A line that matches none of the defined message shapes.
    #[error("malformed message {0:?}")]
    Malformed(String),
    /// A well-formed message arriving where another was required.
    #[error("expected {expected}, got {got:?}")]
    Unexpected {
        /// What the state machine was waiting for.
        expected: &'static str,
        /// The message that arrived.
        got: String,
    },
    /// The acknowledgment byte was wrong.
    #[error("bad acknowledgment byte {0:#04x}")]
    BadAck(u8),
    /// A move that breaks the rules of the path.
    #[error("participant {player} may not move from site {from} to site {to}")]
    IllegalMove {
        /// The mover.
        player: PlayerId,
        /// Site the mover occupied.
        from: usize,
        /// Requested target.
        to: usize,
    },
    /// A broadcast that is inconsistent with the receiver's view.
    #[error("inconsistent event: {0}")]
    Inconsistent(String),
    /// The peer closed its stream while more input was expected.
    #[error("stream closed")]
    StreamClosed,
    /// The peer did not answer in time.
    #[error("no response within {0:?}")]
    Timeout(Duration),
    /// Reading or writing the stream failed.
    #[error("i/o failure: {0}")]
    Io(#[from] io::Error),
}

impl ProtocolError {
    /// Shorthand for [`ProtocolError::Malformed`].
    pub(crate) fn malformed(line: &str) -> Self {
        Self::Malformed(line.to_owned())
    }
}
