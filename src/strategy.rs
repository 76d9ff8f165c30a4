//! Decision ladders: ordered rules that pick a player's next site.
//!
//! Each rule looks at the player's [`Mirror`] through a [`View`] and either
//! proposes a target or passes. The first proposal wins; if every rule
//! passes, the ladder falls back to the first site ahead with room, which is
//! at worst the next barrier. Every target is strictly ahead of the player
//! and never past the next barrier.

use std::fmt;
use std::ops::RangeInclusive;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::game::{PlayerId, SiteKind};
use crate::player::Mirror;

/// What one player can see when deciding.
#[derive(Debug, Clone, Copy)]
pub struct View<'a> {
    mirror: &'a Mirror,
    me: PlayerId,
    position: usize,
    barrier: usize,
}

impl<'a> View<'a> {
    /// The view for `me`, or `None` if `me` is unknown or already on the
    /// terminal barrier.
    #[must_use]
    pub fn new(mirror: &'a Mirror, me: PlayerId) -> Option<Self> {
        mirror.record(me)?;
        let position = mirror.board().position_of(me);
        let barrier = mirror.path().next_barrier(position)?;
        Some(Self {
            mirror,
            me,
            position,
            barrier,
        })
    }

    /// The mirror being viewed.
    #[must_use]
    pub fn mirror(&self) -> &'a Mirror {
        self.mirror
    }

    /// The deciding player.
    #[must_use]
    pub fn me(&self) -> PlayerId {
        self.me
    }

    /// The deciding player's site.
    #[must_use]
    pub fn position(&self) -> usize {
        self.position
    }

    /// The first barrier strictly ahead.
    #[must_use]
    pub fn barrier(&self) -> usize {
        self.barrier
    }

    /// Money on hand.
    #[must_use]
    pub fn money(&self) -> i32 {
        self.mirror.record(self.me).map_or(0, |r| r.money)
    }

    /// Whether `site` can take one more participant.
    #[must_use]
    pub fn has_room(&self, site: usize) -> bool {
        self.mirror.board().has_room(site)
    }

    /// Kind of `site`.
    #[must_use]
    pub fn kind(&self, site: usize) -> Option<SiteKind> {
        self.mirror.path().get(site).map(|s| s.kind)
    }

    /// Every reachable site, nearest first, ending with the barrier.
    #[must_use]
    pub fn reachable(&self) -> RangeInclusive<usize> {
        self.position + 1..=self.barrier
    }

    /// Nearest site with room strictly before the barrier that matches `want`.
    #[must_use]
    pub fn nearest_before_barrier(&self, want: impl Fn(SiteKind) -> bool) -> Option<usize> {
        (self.position + 1..self.barrier).find(|&site| {
            self.kind(site).is_some_and(&want) && self.has_room(site)
        })
    }

    /// Whether every other participant is strictly ahead.
    #[must_use]
    pub fn is_rearmost_alone(&self) -> bool {
        self.mirror
            .board()
            .positions()
            .iter()
            .enumerate()
            .all(|(id, &site)| id == usize::from(self.me) || site > self.position)
    }

    /// Whether this player holds at least as many items as anyone else.
    #[must_use]
    pub fn holds_most_items(&self) -> bool {
        let Some(mine) = self.mirror.record(self.me).map(|r| r.total_items()) else {
            return false;
        };
        self.mirror
            .records()
            .iter()
            .all(|record| record.total_items() <= mine)
    }
}

/// One step of a decision ladder.
pub trait Rule: fmt::Debug + Send + Sync {
    /// Short name for logs.
    fn name(&self) -> &'static str;

    /// A target site, or `None` to pass to the next rule.
    fn propose(&self, view: &View<'_>) -> Option<usize>;
}

/// Nearest donation with room before the barrier, when there is money to give.
#[derive(Debug, Clone, Copy)]
pub struct DonateWhenSolvent;

impl Rule for DonateWhenSolvent {
    fn name(&self) -> &'static str {
        "donate-when-solvent"
    }

    fn propose(&self, view: &View<'_>) -> Option<usize> {
        if view.money() <= 0 {
            return None;
        }
        view.nearest_before_barrier(|kind| kind == SiteKind::Donation)
    }
}

/// The next site, if it is a money site with room.
#[derive(Debug, Clone, Copy)]
pub struct AdjacentMoney;

impl Rule for AdjacentMoney {
    fn name(&self) -> &'static str {
        "adjacent-money"
    }

    fn propose(&self, view: &View<'_>) -> Option<usize> {
        let next = view.position() + 1;
        (view.kind(next) == Some(SiteKind::Money) && view.has_room(next)).then_some(next)
    }
}

/// Nearest venue with room, or the barrier if that comes first.
#[derive(Debug, Clone, Copy)]
pub struct VenueOrBarrier;

impl Rule for VenueOrBarrier {
    fn name(&self) -> &'static str {
        "venue-or-barrier"
    }

    fn propose(&self, view: &View<'_>) -> Option<usize> {
        view.reachable().find(|&site| {
            site == view.barrier()
                || (view.kind(site).is_some_and(SiteKind::is_venue) && view.has_room(site))
        })
    }
}

/// Step forward while nobody else is level or behind.
#[derive(Debug, Clone, Copy)]
pub struct PressLead;

impl Rule for PressLead {
    fn name(&self) -> &'static str {
        "press-lead"
    }

    fn propose(&self, view: &View<'_>) -> Option<usize> {
        let next = view.position() + 1;
        (view.is_rearmost_alone() && view.has_room(next)).then_some(next)
    }
}

/// Nearest money site before the barrier, when money is odd.
#[derive(Debug, Clone, Copy)]
pub struct EvenOutMoney;

impl Rule for EvenOutMoney {
    fn name(&self) -> &'static str {
        "even-out-money"
    }

    fn propose(&self, view: &View<'_>) -> Option<usize> {
        if view.money() % 2 == 0 {
            return None;
        }
        view.nearest_before_barrier(|kind| kind == SiteKind::Money)
    }
}

/// Nearest risk site before the barrier, when holding the most items.
#[derive(Debug, Clone, Copy)]
pub struct RiskWhileAhead;

impl Rule for RiskWhileAhead {
    fn name(&self) -> &'static str {
        "risk-while-ahead"
    }

    fn propose(&self, view: &View<'_>) -> Option<usize> {
        if !view.holds_most_items() {
            return None;
        }
        view.nearest_before_barrier(|kind| kind == SiteKind::Risk)
    }
}

/// Nearest venue-2 site before the barrier.
#[derive(Debug, Clone, Copy)]
pub struct SeekVenue2;

impl Rule for SeekVenue2 {
    fn name(&self) -> &'static str {
        "seek-venue2"
    }

    fn propose(&self, view: &View<'_>) -> Option<usize> {
        view.nearest_before_barrier(|kind| kind == SiteKind::Venue2)
    }
}

/// Ordered rules with the first-free-site fallback.
#[derive(Debug)]
pub struct Ladder {
    rules: Vec<Box<dyn Rule>>,
}

impl Ladder {
    /// A ladder from rules, tried in order.
    #[must_use]
    pub fn new(rules: Vec<Box<dyn Rule>>) -> Self {
        Self { rules }
    }

    /// Names of the rules, in order.
    #[must_use]
    pub fn rule_names(&self) -> Vec<&'static str> {
        self.rules.iter().map(|rule| rule.name()).collect()
    }

    /// Pick a target for the viewing player.
    ///
    /// Proposals outside the reachable window are discarded, so a faulty rule
    /// can only fall through, never produce an illegal move.
    #[must_use]
    pub fn decide(&self, view: &View<'_>) -> usize {
        for rule in &self.rules {
            if let Some(target) = rule.propose(view)
                && target > view.position()
                && target <= view.barrier()
            {
                tracing::trace!(rule = rule.name(), target, "rule fired");
                return target;
            }
        }
        view.reachable()
            .find(|&site| view.has_room(site))
            .unwrap_or(view.barrier())
    }
}

/// The built-in decision policies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StrategyKind {
    /// Donates whenever possible, grabs adjacent money, heads for venues.
    #[default]
    Donor,
    /// Presses a lead, evens out money, gambles on items, seeks venue 2.
    Collector,
}

impl StrategyKind {
    /// Every built-in policy.
    pub const ALL: [StrategyKind; 2] = [StrategyKind::Donor, StrategyKind::Collector];

    /// Build this policy's ladder.
    #[must_use]
    pub fn ladder(self) -> Ladder {
        let rules: Vec<Box<dyn Rule>> = match self {
            StrategyKind::Donor => vec![
                Box::new(DonateWhenSolvent),
                Box::new(AdjacentMoney),
                Box::new(VenueOrBarrier),
            ],
            StrategyKind::Collector => vec![
                Box::new(PressLead),
                Box::new(EvenOutMoney),
                Box::new(RiskWhileAhead),
                Box::new(SeekVenue2),
            ],
        };
        Ladder::new(rules)
    }

    /// Name used on the command line and in recordings.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            StrategyKind::Donor => "donor",
            StrategyKind::Collector => "collector",
        }
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for StrategyKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "donor" | "a" | "A" => Ok(StrategyKind::Donor),
            "collector" | "b" | "B" => Ok(StrategyKind::Collector),
            other => Err(format!(
                "unknown strategy {other:?} (expected donor or collector)"
            )),
        }
    }
}
