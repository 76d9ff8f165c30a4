//! Occupancy board: who stands on which site, in arrival order.

use crate::error::CapacityExceeded;
use crate::game::{Capacity, PathDeck, PlayerId};

/// Per-site occupant lists built on top of a [`PathDeck`].
///
/// Each list keeps arrival order: the front is the participant placed there
/// least recently. Every participant is on exactly one site at all times.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    path: PathDeck,
    occupants: Vec<Vec<PlayerId>>,
    positions: Vec<usize>,
}

impl Board {
    /// Seat participants `0..players` on the starting barrier in ascending id order.
    #[must_use]
    pub fn new(path: PathDeck, players: usize) -> Self {
        #[allow(clippy::cast_possible_truncation)]
        let seating = (0..players).map(|id| id as PlayerId);
        Self::with_seating(path, seating)
    }

    /// Seat participants on the starting barrier in the given arrival order.
    ///
    /// The order only matters to arrival-based turn selection.
    #[must_use]
    pub fn with_seating(path: PathDeck, seating: impl IntoIterator<Item = PlayerId>) -> Self {
        let start: Vec<PlayerId> = seating.into_iter().collect();
        let mut occupants = vec![Vec::new(); path.len()];
        let positions = vec![0; start.len()];
        occupants[0] = start;
        Self {
            path,
            occupants,
            positions,
        }
    }

    /// The path this board is laid over.
    #[must_use]
    pub fn path(&self) -> &PathDeck {
        &self.path
    }

    /// Number of participants on the board.
    #[must_use]
    pub fn players(&self) -> usize {
        self.positions.len()
    }

    /// Site currently occupied by `id`.
    ///
    /// # Panics
    ///
    /// Panics if `id` is not a participant of this board.
    #[must_use]
    pub fn position_of(&self, id: PlayerId) -> usize {
        self.positions[usize::from(id)]
    }

    /// Positions of every participant, indexed by id.
    #[must_use]
    pub fn positions(&self) -> &[usize] {
        &self.positions
    }

    /// Occupants of `site` in arrival order.
    #[must_use]
    pub fn occupants(&self, site: usize) -> &[PlayerId] {
        self.occupants.get(site).map_or(&[], Vec::as_slice)
    }

    /// Number of participants on `site`.
    #[must_use]
    pub fn occupancy(&self, site: usize) -> usize {
        self.occupants(site).len()
    }

    /// Whether `site` exists and can take one more participant.
    #[must_use]
    pub fn has_room(&self, site: usize) -> bool {
        self.path
            .get(site)
            .is_some_and(|s| s.capacity.admits(self.occupancy(site)))
    }

    /// Move `id` to `site`, appending it to that site's arrival order.
    ///
    /// # Errors
    ///
    /// Returns [`CapacityExceeded`] if the site is full. The board is unchanged.
    ///
    /// # Panics
    ///
    /// Panics if `site` is outside the path or `id` is not a participant.
    pub fn place(&mut self, id: PlayerId, site: usize) -> Result<(), CapacityExceeded> {
        if !self.has_room(site) {
            let capacity = match self.path.sites()[site].capacity {
                Capacity::Limited(limit) => limit,
                Capacity::Unbounded => u8::MAX,
            };
            return Err(CapacityExceeded { site, capacity });
        }
        self.force_place(id, site);
        Ok(())
    }

    /// Move `id` to `site` without checking capacity.
    ///
    /// Player mirrors use this: the dealer's broadcast is authoritative.
    ///
    /// # Panics
    ///
    /// Panics if `site` is outside the path or `id` is not a participant.
    pub fn force_place(&mut self, id: PlayerId, site: usize) {
        let from = self.positions[usize::from(id)];
        self.occupants[from].retain(|&occupant| occupant != id);
        self.occupants[site].push(id);
        self.positions[usize::from(id)] = site;
    }

    /// Whether `id` stands on the terminal barrier.
    #[must_use]
    pub fn is_terminal(&self, id: PlayerId) -> bool {
        self.position_of(id) == self.path.last_index()
    }

    /// Whether every participant stands on the terminal barrier.
    #[must_use]
    pub fn all_terminal(&self) -> bool {
        let last = self.path.last_index();
        self.positions.iter().all(|&site| site == last)
    }

    /// Render the board as text.
    ///
    /// The first row lists site tags with the capacity column blanked; each
    /// following row holds one occupancy level, ids written under their site.
    #[must_use]
    pub fn render(&self) -> String {
        let width = self.path.len() * 3;
        let mut output = String::with_capacity(width * 2);

        for site in self.path.sites() {
            output.push_str(site.kind.tag());
            output.push(' ');
        }
        output.push('\n');

        let depth = self.occupants.iter().map(Vec::len).max().unwrap_or(0);
        for level in 0..depth {
            let mut row = vec![' '; width];
            for (site, occupants) in self.occupants.iter().enumerate() {
                if let Some(&id) = occupants.get(level) {
                    row[site * 3] = char::from_digit(u32::from(id), 36).unwrap_or('?');
                }
            }
            output.extend(row);
            output.push('\n');
        }

        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn board(players: usize) -> Board {
        Board::new(PathDeck::parse("5;::-Mo1V22::-::-").unwrap(), players)
    }

    #[test]
    fn test_everyone_starts_on_first_barrier() {
        let board = board(3);
        assert_eq!(board.occupants(0), &[0, 1, 2]);
        assert_eq!(board.positions(), &[0, 0, 0]);
        assert!(!board.all_terminal());
    }

    #[test]
    fn test_place_moves_and_keeps_arrival_order() {
        let mut board = board(3);
        board.place(2, 2).unwrap();
        board.place(0, 2).unwrap();
        assert_eq!(board.occupants(0), &[1]);
        assert_eq!(board.occupants(2), &[2, 0]);
        assert_eq!(board.position_of(0), 2);
        assert_eq!(board.occupancy(2), 2);
    }

    #[test]
    fn test_place_rejects_full_site() {
        let mut board = board(2);
        board.place(0, 1).unwrap();
        let err = board.place(1, 1).unwrap_err();
        assert_eq!(err, CapacityExceeded { site: 1, capacity: 1 });
        assert_eq!(board.position_of(1), 0);
        assert_eq!(board.occupants(1), &[0]);
    }

    #[test]
    fn test_force_place_ignores_capacity() {
        let mut board = board(2);
        board.place(0, 1).unwrap();
        board.force_place(1, 1);
        assert_eq!(board.occupants(1), &[0, 1]);
    }

    #[test]
    fn test_barriers_never_full() {
        let mut board = board(4);
        for id in 0..4 {
            board.place(id, 3).unwrap();
        }
        assert_eq!(board.occupancy(3), 4);
        assert!(board.has_room(3));
    }

    #[test]
    fn test_terminal() {
        let mut board = board(2);
        board.place(0, 4).unwrap();
        assert!(board.is_terminal(0));
        assert!(!board.all_terminal());
        board.place(1, 4).unwrap();
        assert!(board.all_terminal());
    }

    #[test]
    fn test_render() {
        let mut board = Board::new(PathDeck::parse("4;::-Mo1Do1::-").unwrap(), 2);
        board.place(0, 1).unwrap();
        assert_eq!(board.render(), ":: Mo Do :: \n1  0        \n");
    }

    #[test]
    fn test_has_room_outside_path() {
        assert!(!board(1).has_room(99));
    }
}
