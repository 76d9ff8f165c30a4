//! Per-participant bookkeeping: money, points, venue visits and items.

use std::fmt;

use crate::game::{ITEM_CLASSES, ItemClass, PlayerId, item_set_bonus};

/// Money every participant starts with.
pub const STARTING_MONEY: i32 = 7;

/// Running tally for one participant.
///
/// The dealer's copy is authoritative; players rebuild the same record for
/// every participant from broadcasts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParticipantRecord {
    /// Participant identifier.
    pub id: PlayerId,
    /// Money on hand.
    pub money: i32,
    /// Points from donations.
    pub points: u32,
    /// Venue-1 visits.
    pub venue1: u32,
    /// Venue-2 visits.
    pub venue2: u32,
    /// Items held, indexed by [`ItemClass::index`].
    pub items: [u32; ITEM_CLASSES],
    /// Most recently awarded item class.
    pub last_item: Option<ItemClass>,
}

impl ParticipantRecord {
    /// A fresh record with starting money.
    #[must_use]
    pub const fn new(id: PlayerId) -> Self {
        Self {
            id,
            money: STARTING_MONEY,
            points: 0,
            venue1: 0,
            venue2: 0,
            items: [0; ITEM_CLASSES],
            last_item: None,
        }
    }

    /// Add one item of `class`.
    pub fn award_item(&mut self, class: ItemClass) {
        self.items[class.index()] += 1;
        self.last_item = Some(class);
    }

    /// Total items held across all classes.
    #[must_use]
    pub fn total_items(&self) -> u32 {
        self.items.iter().sum()
    }

    /// Final score: points, venue visits and the item set bonus.
    ///
    /// Saturates at `u32::MAX`.
    #[must_use]
    pub fn final_score(&self) -> u32 {
        self.points
            .saturating_add(self.venue1)
            .saturating_add(self.venue2)
            .saturating_add(item_set_bonus(self.items))
    }
}

impl fmt::Display for ParticipantRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Player {} Money={} V1={} V2={} Points={}",
            self.id, self.money, self.venue1, self.venue2, self.points
        )?;
        for class in ItemClass::ALL {
            write!(f, " {class}={}", self.items[class.index()])?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_record() {
        let record = ParticipantRecord::new(2);
        assert_eq!(record.id, 2);
        assert_eq!(record.money, 7);
        assert_eq!(record.total_items(), 0);
        assert_eq!(record.final_score(), 0);
    }

    #[test]
    fn test_award_item() {
        let mut record = ParticipantRecord::new(0);
        record.award_item(ItemClass::C);
        record.award_item(ItemClass::C);
        record.award_item(ItemClass::A);
        assert_eq!(record.items, [1, 0, 2, 0, 0]);
        assert_eq!(record.last_item, Some(ItemClass::A));
        assert_eq!(record.total_items(), 3);
    }

    #[test]
    fn test_final_score_sums_sources() {
        let mut record = ParticipantRecord::new(0);
        record.points = 4;
        record.venue1 = 2;
        record.venue2 = 1;
        record.items = [1, 1, 0, 0, 0];
        // 4 + 2 + 1 + bonus(2 classes) 3
        assert_eq!(record.final_score(), 10);
    }

    #[test]
    fn test_status_line() {
        let mut record = ParticipantRecord::new(1);
        record.money = 10;
        record.items = [0, 2, 0, 0, 1];
        assert_eq!(
            record.to_string(),
            "Player 1 Money=10 V1=0 V2=0 Points=0 A=0 B=2 C=0 D=0 E=1"
        );
    }
}
