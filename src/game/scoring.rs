//! Site effects and the item set bonus.

use serde::{Deserialize, Serialize};

use crate::game::{ITEM_CLASSES, ItemClass, ItemDeck, ParticipantRecord, SiteKind};

/// Money gained on a money site.
pub const MONEY_SITE_BONUS: i32 = 3;

/// Bonus for one pass over the item counts, indexed by distinct classes held.
const SET_BONUS: [u32; ITEM_CLASSES + 1] = [0, 1, 3, 5, 7, 10];

/// What an arrival did to the mover's record, as broadcast in `HAP`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Effect {
    /// Points awarded by a donation.
    pub points: u32,
    /// Change in money (negative after a donation).
    pub money_delta: i32,
    /// Item drawn at a risk site.
    pub item: Option<ItemClass>,
}

/// Apply the effect of landing on a site of `kind` to `record`.
///
/// Draws from `items` only for risk sites. Venue visits are recorded here but
/// are not part of the returned [`Effect`]; receivers derive them from the site.
pub fn apply_arrival(record: &mut ParticipantRecord, kind: SiteKind, items: &mut ItemDeck) -> Effect {
    let mut effect = Effect::default();

    match kind {
        SiteKind::Money => {
            effect.money_delta = MONEY_SITE_BONUS;
        }
        SiteKind::Venue1 => record.venue1 += 1,
        SiteKind::Venue2 => record.venue2 += 1,
        SiteKind::Donation => {
            // Money is never negative on the dealer side
            #[allow(clippy::cast_sign_loss)]
            let points = (record.money.max(0) / 2) as u32;
            effect.points = points;
            effect.money_delta = -record.money;
        }
        SiteKind::Risk => {
            let item = items.draw();
            record.award_item(item);
            effect.item = Some(item);
        }
        SiteKind::Barrier => {}
    }

    record.money += effect.money_delta;
    record.points += effect.points;
    effect
}

/// Bonus for item sets.
///
/// Repeatedly counts the classes still held, awards 1, 3, 5, 7 or 10 for one
/// to five distinct classes, then takes one of each held class away, until
/// nothing is left.
#[must_use]
pub fn item_set_bonus(mut counts: [u32; ITEM_CLASSES]) -> u32 {
    let mut bonus = 0;
    loop {
        let distinct = counts.iter().filter(|&&count| count > 0).count();
        if distinct == 0 {
            return bonus;
        }
        bonus += SET_BONUS[distinct];
        for count in &mut counts {
            *count = count.saturating_sub(1);
        }
    }
}
