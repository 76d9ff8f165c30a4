//! Turn selection: the participant furthest behind acts next.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::game::{Board, PlayerId};

/// How to choose among several participants sharing the rearmost site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TieBreak {
    /// The occupant placed there least recently acts first.
    Arrival,
    /// The occupant placed there most recently acts first.
    ///
    /// Seating is pushed in descending id, so participant 0 sits on top of
    /// the starting barrier. Each site then behaves as a stack of arrivals.
    #[default]
    Stack,
    /// The lowest id acts first.
    LowestId,
}

impl TieBreak {
    /// Order in which participants are seated on the starting barrier.
    ///
    /// Chosen so that participant 0 always takes the first turn.
    #[must_use]
    pub fn seating(self, players: usize) -> Vec<PlayerId> {
        #[allow(clippy::cast_possible_truncation)]
        let ascending = (0..players).map(|id| id as PlayerId);
        match self {
            TieBreak::Arrival | TieBreak::LowestId => ascending.collect(),
            TieBreak::Stack => ascending.rev().collect(),
        }
    }

    fn pick(self, occupants: &[PlayerId]) -> Option<PlayerId> {
        match self {
            TieBreak::Arrival => occupants.first().copied(),
            TieBreak::Stack => occupants.last().copied(),
            TieBreak::LowestId => occupants.iter().min().copied(),
        }
    }
}

impl fmt::Display for TieBreak {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TieBreak::Arrival => "arrival",
            TieBreak::Stack => "stack",
            TieBreak::LowestId => "lowest-id",
        };
        f.write_str(name)
    }
}

impl FromStr for TieBreak {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "arrival" => Ok(TieBreak::Arrival),
            "stack" => Ok(TieBreak::Stack),
            "lowest-id" => Ok(TieBreak::LowestId),
            other => Err(format!(
                "unknown tie-break {other:?} (expected arrival, stack or lowest-id)"
            )),
        }
    }
}

/// Choose the participant that acts next.
///
/// Scans sites from the start of the path; the first occupied site supplies
/// the actor, chosen among its occupants by `tie_break`. Returns `None` only
/// for a board with no participants.
#[must_use]
pub fn select_next(board: &Board, tie_break: TieBreak) -> Option<PlayerId> {
    (0..board.path().len())
        .map(|site| board.occupants(site))
        .find(|occupants| !occupants.is_empty())
        .and_then(|occupants| tie_break.pick(occupants))
}
