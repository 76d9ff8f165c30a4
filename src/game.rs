//! Game layer for Wayfarer.
//!
//! Implements the rules both sides of the protocol share:
//! - Path of sites bounded by barriers
//! - Cyclic item deck drawn from at risk sites
//! - Occupancy board with per-site capacity
//! - Site effects and final scoring
//! - Turn selection (dealer only)

mod board;
mod invariants;
mod items;
mod path;
mod record;
mod scoring;
mod state;
mod turn;

pub use board::Board;
pub use invariants::{InvariantViolation, check_invariants, compare_views};
pub(crate) use invariants::assert_invariants;
pub use items::{ITEM_CLASSES, ItemClass, ItemDeck};
pub use path::{Capacity, PathDeck, Site, SiteKind};
pub use record::{ParticipantRecord, STARTING_MONEY};
pub use scoring::{Effect, MONEY_SITE_BONUS, apply_arrival, item_set_bonus};
pub use state::{Event, GameState};
pub use turn::{TieBreak, select_next};

/// Identifier for a participant; participants are numbered from 0.
pub type PlayerId = u8;

/// Maximum number of participants in a game.
///
/// Ids render as a single digit on the board.
pub const MAX_PLAYERS: usize = 10;
