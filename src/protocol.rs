//! Line protocol between the dealer and its players.
//!
//! After the player's single acknowledgment byte and the dealer's path deck
//! line, every message is one `\n`-terminated line:
//!
//! ```text
//! dealer -> player   YT | HAP<id>,<site>,<points>,<money>,<item> | DONE | EARLY
//! player -> dealer   DO<site>
//! ```
//!
//! Decoding is strict: a line either matches one shape exactly or it is a
//! protocol violation.

mod connection;

pub use connection::{Connection, Inbound};

use std::fmt;

use crate::error::ProtocolError;
use crate::game::{Effect, Event, ItemClass, PlayerId};

/// The acknowledgment byte every player sends before anything else.
pub const ACK: u8 = b'^';

/// A message from the dealer, after the path deck line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DealerMessage {
    /// `YT`: the receiver must move now.
    YourTurn,
    /// `HAP...`: a move was accepted.
    Happened(Event),
    /// `DONE`: the game finished normally.
    Done,
    /// `EARLY`: the game was aborted.
    Early,
}

impl DealerMessage {
    /// Decode one line, with or without its trailing newline.
    ///
    /// Only the item field is range-checked here; whether the id and site
    /// make sense is up to the receiver, which knows the game.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::Malformed`] for anything that is not exactly
    /// one of the four shapes.
    pub fn decode(line: &str) -> Result<Self, ProtocolError> {
        let body = strip_newline(line);
        match body {
            "YT" => return Ok(Self::YourTurn),
            "DONE" => return Ok(Self::Done),
            "EARLY" => return Ok(Self::Early),
            _ => {}
        }

        let fields = body
            .strip_prefix("HAP")
            .ok_or_else(|| ProtocolError::malformed(line))?;
        let mut parts = fields.split(',');
        let mut next = || parts.next().ok_or_else(|| ProtocolError::malformed(line));

        let player = parse_unsigned(next()?)
            .and_then(|id| PlayerId::try_from(id).ok())
            .ok_or_else(|| ProtocolError::malformed(line))?;
        let site = parse_unsigned(next()?).ok_or_else(|| ProtocolError::malformed(line))?;
        let points = parse_unsigned(next()?)
            .and_then(|points| u32::try_from(points).ok())
            .ok_or_else(|| ProtocolError::malformed(line))?;
        let money_delta = parse_signed(next()?).ok_or_else(|| ProtocolError::malformed(line))?;
        let item = parse_unsigned(next()?)
            .and_then(|item| u8::try_from(item).ok())
            .ok_or_else(|| ProtocolError::malformed(line))?;
        if next().is_ok() {
            return Err(ProtocolError::malformed(line));
        }

        let item = match item {
            0 => None,
            wire => Some(ItemClass::from_wire(wire).ok_or_else(|| ProtocolError::malformed(line))?),
        };

        Ok(Self::Happened(Event {
            player,
            site,
            effect: Effect {
                points,
                money_delta,
                item,
            },
        }))
    }

    /// The line to write, including the trailing newline.
    #[must_use]
    pub fn encode(&self) -> String {
        format!("{self}\n")
    }
}

impl fmt::Display for DealerMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::YourTurn => f.write_str("YT"),
            Self::Happened(event) => write!(
                f,
                "HAP{},{},{},{},{}",
                event.player,
                event.site,
                event.effect.points,
                event.effect.money_delta,
                event.effect.item.map_or(0, ItemClass::wire)
            ),
            Self::Done => f.write_str("DONE"),
            Self::Early => f.write_str("EARLY"),
        }
    }
}

/// A message from a player.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerMessage {
    /// `DO<site>`: move to the given site.
    Move(usize),
}

impl PlayerMessage {
    /// Decode one line, with or without its trailing newline.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::Malformed`] unless the line is `DO` followed
    /// by a plain decimal number.
    pub fn decode(line: &str) -> Result<Self, ProtocolError> {
        strip_newline(line)
            .strip_prefix("DO")
            .and_then(parse_unsigned)
            .map(Self::Move)
            .ok_or_else(|| ProtocolError::malformed(line))
    }

    /// The line to write, including the trailing newline.
    #[must_use]
    pub fn encode(self) -> String {
        format!("{self}\n")
    }
}

impl fmt::Display for PlayerMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Move(site) => write!(f, "DO{site}"),
        }
    }
}

/// Format the final score line, e.g. `Scores: 0,3`.
#[must_use]
pub fn score_line(scores: &[u32]) -> String {
    let joined: Vec<String> = scores.iter().map(u32::to_string).collect();
    format!("Scores: {}", joined.join(","))
}

fn strip_newline(line: &str) -> &str {
    line.strip_suffix('\n').unwrap_or(line)
}

/// Digits only: no sign, no whitespace, at least one digit.
fn parse_unsigned(field: &str) -> Option<usize> {
    if field.is_empty() || !field.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    field.parse().ok()
}

/// An optional leading `-` followed by digits.
fn parse_signed(field: &str) -> Option<i32> {
    let (negative, digits) = match field.strip_prefix('-') {
        Some(digits) => (true, digits),
        None => (false, field),
    };
    let magnitude = i32::try_from(parse_unsigned(digits)?).ok()?;
    Some(if negative { -magnitude } else { magnitude })
}
