//! A player's reconstruction of the game, built only from broadcasts.

use crate::error::ProtocolError;
use crate::game::{Board, Event, ParticipantRecord, PathDeck, PlayerId, SiteKind};

/// Board and records for every participant, as inferred from `HAP` events.
///
/// The mirror is a pure fold over the event log: [`Mirror::replay`] of the
/// dealer's log yields the same positions and records the dealer holds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mirror {
    board: Board,
    records: Vec<ParticipantRecord>,
}

impl Mirror {
    /// Everyone on the starting barrier with fresh records.
    #[must_use]
    pub fn new(path: PathDeck, players: usize) -> Self {
        let board = Board::new(path, players);
        #[allow(clippy::cast_possible_truncation)]
        let records = (0..players)
            .map(|id| ParticipantRecord::new(id as PlayerId))
            .collect();
        Self { board, records }
    }

    /// Fold a whole event log into a fresh mirror.
    ///
    /// # Errors
    ///
    /// Returns the first event that [`Mirror::apply`] rejects.
    pub fn replay<'a>(
        path: PathDeck,
        players: usize,
        events: impl IntoIterator<Item = &'a Event>,
    ) -> Result<Self, ProtocolError> {
        let mut mirror = Self::new(path, players);
        for event in events {
            mirror.apply(event)?;
        }
        Ok(mirror)
    }

    /// Apply one broadcast event.
    ///
    /// The dealer is trusted on capacity and move legality; only events that
    /// cannot be represented at all are rejected.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::Inconsistent`] if the event names an unknown
    /// participant, the starting barrier or a site outside the path, or if
    /// its effect overflows the participant's tally. A rejected event leaves
    /// the mirror unchanged.
    pub fn apply(&mut self, event: &Event) -> Result<(), ProtocolError> {
        let id = usize::from(event.player);
        if id >= self.records.len() {
            return Err(ProtocolError::Inconsistent(format!(
                "unknown participant {}",
                event.player
            )));
        }
        let Some(site) = self.board.path().get(event.site).filter(|_| event.site > 0) else {
            return Err(ProtocolError::Inconsistent(format!(
                "site {} is not a destination",
                event.site
            )));
        };
        let kind = site.kind;

        let record = &self.records[id];
        let (Some(points), Some(money)) = (
            record.points.checked_add(event.effect.points),
            record.money.checked_add(event.effect.money_delta),
        ) else {
            return Err(ProtocolError::Inconsistent(format!(
                "effect for participant {} overflows its tally",
                event.player
            )));
        };

        self.board.force_place(event.player, event.site);

        let record = &mut self.records[id];
        record.points = points;
        record.money = money;
        match kind {
            SiteKind::Venue1 => record.venue1 += 1,
            SiteKind::Venue2 => record.venue2 += 1,
            _ => {}
        }
        if let Some(item) = event.effect.item {
            record.award_item(item);
        }
        Ok(())
    }

    /// The mirrored board.
    #[must_use]
    pub fn board(&self) -> &Board {
        &self.board
    }

    /// The mirrored path.
    #[must_use]
    pub fn path(&self) -> &PathDeck {
        self.board.path()
    }

    /// Number of participants.
    #[must_use]
    pub fn players(&self) -> usize {
        self.records.len()
    }

    /// Mirrored records, indexed by id.
    #[must_use]
    pub fn records(&self) -> &[ParticipantRecord] {
        &self.records
    }

    /// Mirrored record for one participant.
    #[must_use]
    pub fn record(&self, id: PlayerId) -> Option<&ParticipantRecord> {
        self.records.get(usize::from(id))
    }

    /// Final scores in id order.
    #[must_use]
    pub fn scores(&self) -> Vec<u32> {
        self.records
            .iter()
            .map(ParticipantRecord::final_score)
            .collect()
    }
}
