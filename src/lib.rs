// Allow unwrap in tests (test code is not production)
#![cfg_attr(test, allow(clippy::unwrap_used))]
//! Wayfarer: a turn-based path board game played over a line protocol.
//!
//! One dealer and up to ten players move along a linear path of sites. The
//! dealer owns the authoritative state; each player keeps a mirror built
//! from the dealer's broadcasts and decides its own moves with a fixed
//! decision ladder.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────┐
//! │   CLI / Tournament / Replay         │
//! ├──────────────────┬──────────────────┤
//! │  Dealer (seats)  │  Player (ladder) │
//! ├──────────────────┴──────────────────┤
//! │      Protocol (lines over pipes)    │
//! ├─────────────────────────────────────┤
//! │  Game: path, board, turns, scoring  │
//! └─────────────────────────────────────┘
//! ```
//!
//! Seats abstract the channel, so the same [`Dealer`] drives child processes
//! ([`ProcessSeat`]) and in-process players ([`LocalSeat`]).

pub mod config;
pub mod dealer;
pub mod error;
pub mod game;
pub mod player;
pub mod protocol;
pub mod replay;
pub mod strategy;
pub mod tournament;

pub use config::{ConfigError, GameConfig};
pub use dealer::{Dealer, DealerError, LocalSeat, ProcessSeat, Seat};
pub use error::{CapacityExceeded, ItemDeckError, PathError, ProtocolError};

// Re-export key game types at crate root for convenience
pub use game::{
    Board, Event, GameState, ItemClass, ItemDeck, PathDeck, PlayerId, Site, SiteKind, TieBreak,
};
pub use player::{Mirror, Player, PlayerError};
pub use strategy::StrategyKind;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_root_reexports() {
        let path = PathDeck::parse("2;::-::-").unwrap();
        let items = ItemDeck::parse("1A").unwrap();
        let state = GameState::new(path, items, 1, TieBreak::default());
        assert!(!state.is_game_over());
        assert_eq!(state.next_player(), Some(0));
        assert_eq!(StrategyKind::default(), StrategyKind::Donor);
    }
}
