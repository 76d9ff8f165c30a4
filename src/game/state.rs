//! Authoritative game state held by the dealer.

use serde::{Deserialize, Serialize};

use crate::error::ProtocolError;
use crate::game::{
    Board, Effect, ItemDeck, ParticipantRecord, PathDeck, PlayerId, TieBreak, apply_arrival,
    select_next,
};

/// One accepted move and its effect, as broadcast to every participant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    /// The mover.
    pub player: PlayerId,
    /// Site the mover landed on.
    pub site: usize,
    /// What the landing did.
    #[serde(flatten)]
    pub effect: Effect,
}

/// Complete game state: path, board, records and the item deck.
///
/// Mutated once per accepted move; every mutation is appended to the event
/// log so that any other view can be rebuilt by replaying it.
#[derive(Debug, Clone)]
pub struct GameState {
    board: Board,
    records: Vec<ParticipantRecord>,
    items: ItemDeck,
    tie_break: TieBreak,
    events: Vec<Event>,
}

impl GameState {
    /// Seat `players` participants at the start of `path`.
    #[must_use]
    pub fn new(path: PathDeck, items: ItemDeck, players: usize, tie_break: TieBreak) -> Self {
        let board = Board::with_seating(path, tie_break.seating(players));
        #[allow(clippy::cast_possible_truncation)]
        let records = (0..players)
            .map(|id| ParticipantRecord::new(id as PlayerId))
            .collect();

        Self {
            board,
            records,
            items,
            tie_break,
            events: Vec::new(),
        }
    }

    /// The occupancy board.
    #[must_use]
    pub fn board(&self) -> &Board {
        &self.board
    }

    /// The path.
    #[must_use]
    pub fn path(&self) -> &PathDeck {
        self.board.path()
    }

    /// The item deck, including its cursor.
    #[must_use]
    pub fn items(&self) -> &ItemDeck {
        &self.items
    }

    /// Tie-break policy in force.
    #[must_use]
    pub fn tie_break(&self) -> TieBreak {
        self.tie_break
    }

    /// Number of participants.
    #[must_use]
    pub fn players(&self) -> usize {
        self.records.len()
    }

    /// All records, indexed by id.
    #[must_use]
    pub fn records(&self) -> &[ParticipantRecord] {
        &self.records
    }

    /// Record for one participant.
    #[must_use]
    pub fn record(&self, id: PlayerId) -> Option<&ParticipantRecord> {
        self.records.get(usize::from(id))
    }

    /// Every accepted move so far, in order.
    #[must_use]
    pub fn events(&self) -> &[Event] {
        &self.events
    }

    /// Whether every participant has reached the terminal barrier.
    #[must_use]
    pub fn is_game_over(&self) -> bool {
        self.board.all_terminal()
    }

    /// The participant that acts next, or `None` once the game is over.
    #[must_use]
    pub fn next_player(&self) -> Option<PlayerId> {
        if self.is_game_over() {
            return None;
        }
        select_next(&self.board, self.tie_break)
    }

    /// Check a move against the path rules without applying it.
    ///
    /// A move must go strictly forward, stay inside the path, stop at or
    /// before the next barrier, and land on a site with room.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::IllegalMove`] describing the rejected move.
    pub fn check_move(&self, player: PlayerId, target: usize) -> Result<(), ProtocolError> {
        let from = self.board.position_of(player);
        let illegal = ProtocolError::IllegalMove {
            player,
            from,
            to: target,
        };

        let Some(barrier) = self.path().next_barrier(from) else {
            return Err(illegal);
        };
        if target <= from || target > barrier || !self.board.has_room(target) {
            return Err(illegal);
        }
        Ok(())
    }

    /// Validate and apply a move, returning the event to broadcast.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::IllegalMove`] if the move breaks the rules or
    /// `player` is unknown. The state is unchanged on error.
    pub fn apply_move(&mut self, player: PlayerId, target: usize) -> Result<Event, ProtocolError> {
        if usize::from(player) >= self.records.len() {
            return Err(ProtocolError::IllegalMove {
                player,
                from: 0,
                to: target,
            });
        }
        self.check_move(player, target)?;

        let kind = self.path().sites()[target].kind;
        self.board
            .place(player, target)
            .map_err(|_| ProtocolError::IllegalMove {
                player,
                from: self.board.position_of(player),
                to: target,
            })?;
        let effect = apply_arrival(
            &mut self.records[usize::from(player)],
            kind,
            &mut self.items,
        );

        let event = Event {
            player,
            site: target,
            effect,
        };
        self.events.push(event);
        Ok(event)
    }

    /// Final scores in participant-id order.
    #[must_use]
    pub fn scores(&self) -> Vec<u32> {
        self.records
            .iter()
            .map(ParticipantRecord::final_score)
            .collect()
    }
}
