//! Path model: the ordered sites every participant walks from barrier to barrier.
//!
//! The wire form is `<count>;` followed by one three-character triple per site:
//! a two-character type tag and one capacity symbol.
//!
//! ```text
//! 4;::-Mo1Do1::-
//!   └┬┘└┬┘└┬┘└┬┘
//!    │  │  │  └── barrier, unbounded
//!    │  │  └───── donation, capacity 1
//!    │  └──────── money, capacity 1
//!    └─────────── barrier, unbounded
//! ```

use std::fmt;
use std::str::FromStr;

use crate::error::PathError;

/// Symbol used in place of a capacity digit on barriers.
const UNBOUNDED_SYMBOL: char = '-';

/// What landing on a site does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SiteKind {
    /// Gain money.
    Money,
    /// Score one venue-1 visit.
    Venue1,
    /// Score one venue-2 visit.
    Venue2,
    /// Convert money into points.
    Donation,
    /// Draw the next item from the item deck.
    Risk,
    /// Start, end, or checkpoint of the path. Never full.
    Barrier,
}

impl SiteKind {
    /// All kinds, in tag order.
    pub const ALL: [SiteKind; 6] = [
        SiteKind::Money,
        SiteKind::Venue1,
        SiteKind::Venue2,
        SiteKind::Donation,
        SiteKind::Risk,
        SiteKind::Barrier,
    ];

    /// The two-character wire tag.
    #[must_use]
    pub const fn tag(self) -> &'static str {
        match self {
            SiteKind::Money => "Mo",
            SiteKind::Venue1 => "V1",
            SiteKind::Venue2 => "V2",
            SiteKind::Donation => "Do",
            SiteKind::Risk => "Ri",
            SiteKind::Barrier => "::",
        }
    }

    /// Look up a kind by its wire tag.
    #[must_use]
    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.tag() == tag)
    }

    /// Whether this kind is a venue of either flavour.
    #[must_use]
    pub const fn is_venue(self) -> bool {
        matches!(self, SiteKind::Venue1 | SiteKind::Venue2)
    }
}

/// How many participants a site can hold at once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capacity {
    /// At most this many occupants.
    Limited(u8),
    /// No limit (barriers).
    Unbounded,
}

impl Capacity {
    /// Whether a site with this capacity can take one more occupant.
    #[must_use]
    pub fn admits(self, occupancy: usize) -> bool {
        match self {
            Capacity::Limited(limit) => occupancy < usize::from(limit),
            Capacity::Unbounded => true,
        }
    }

    /// The wire symbol for this capacity.
    #[must_use]
    pub fn symbol(self) -> char {
        match self {
            Capacity::Limited(limit) => char::from(b'0' + limit),
            Capacity::Unbounded => UNBOUNDED_SYMBOL,
        }
    }
}

/// A single cell of the path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Site {
    /// Effect of landing here.
    pub kind: SiteKind,
    /// Occupancy bound.
    pub capacity: Capacity,
}

impl Site {
    /// A barrier site.
    #[must_use]
    pub const fn barrier() -> Self {
        Self {
            kind: SiteKind::Barrier,
            capacity: Capacity::Unbounded,
        }
    }

    /// A non-barrier site with the given capacity digit.
    ///
    /// Capacities above 9 cannot be encoded and are clamped.
    #[must_use]
    pub fn new(kind: SiteKind, capacity: u8) -> Self {
        if kind == SiteKind::Barrier {
            return Self::barrier();
        }
        Self {
            kind,
            capacity: Capacity::Limited(capacity.min(9)),
        }
    }

    /// Whether this site is a barrier.
    #[must_use]
    pub fn is_barrier(&self) -> bool {
        self.kind == SiteKind::Barrier
    }

    fn parse(index: usize, triple: &[char]) -> Result<Self, PathError> {
        let tag: String = triple[..2].iter().collect();
        let kind = SiteKind::from_tag(&tag).ok_or(PathError::UnknownTag { index, tag })?;
        let symbol = triple[2];

        let capacity = match (kind, symbol) {
            (SiteKind::Barrier, UNBOUNDED_SYMBOL) => Capacity::Unbounded,
            (SiteKind::Barrier, _) => return Err(PathError::BadCapacity { index, symbol }),
            (_, digit) => {
                let limit = digit
                    .to_digit(10)
                    .ok_or(PathError::BadCapacity { index, symbol })?;
                #[allow(clippy::cast_possible_truncation)]
                Capacity::Limited(limit as u8)
            }
        };

        Ok(Self { kind, capacity })
    }
}

impl fmt::Display for Site {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.kind.tag(), self.capacity.symbol())
    }
}

/// The immutable sequence of sites for one game.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PathDeck {
    sites: Vec<Site>,
}

impl PathDeck {
    /// Build a deck from sites, applying the same structural checks as [`PathDeck::parse`].
    ///
    /// # Errors
    ///
    /// Returns an error if there are fewer than two sites or either end is not a barrier.
    pub fn from_sites(sites: Vec<Site>) -> Result<Self, PathError> {
        if sites.len() < 2 {
            return Err(PathError::TooShort(sites.len()));
        }
        let last = sites.len() - 1;
        for index in [0, last] {
            if !sites[index].is_barrier() {
                return Err(PathError::MissingBarrier { index });
            }
        }
        Ok(Self { sites })
    }

    /// Parse the wire form of a path deck.
    ///
    /// A single trailing line terminator is ignored; anything else beyond the
    /// declared sites is an error.
    ///
    /// # Errors
    ///
    /// Returns [`PathError`] describing the first structural problem found.
    pub fn parse(raw: &str) -> Result<Self, PathError> {
        let raw = raw.strip_suffix('\n').unwrap_or(raw);
        let raw = raw.strip_suffix('\r').unwrap_or(raw);

        let (count, body) = raw.split_once(';').ok_or(PathError::MissingDelimiter)?;
        if count.is_empty() || !count.bytes().all(|b| b.is_ascii_digit()) {
            return Err(PathError::BadCount(count.to_owned()));
        }
        let count: usize = count
            .parse()
            .map_err(|_| PathError::BadCount(count.to_owned()))?;
        if count < 2 {
            return Err(PathError::TooShort(count));
        }

        let chars: Vec<char> = body.chars().collect();
        let expected = count.saturating_mul(3);
        if chars.len() != expected {
            return Err(PathError::LengthMismatch {
                expected,
                actual: chars.len(),
            });
        }

        let sites = chars
            .chunks_exact(3)
            .enumerate()
            .map(|(index, triple)| Site::parse(index, triple))
            .collect::<Result<Vec<_>, _>>()?;

        Self::from_sites(sites)
    }

    /// Number of sites.
    #[must_use]
    pub fn len(&self) -> usize {
        self.sites.len()
    }

    /// Always false: a valid deck has at least two sites.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sites.is_empty()
    }

    /// Index of the terminal barrier.
    #[must_use]
    pub fn last_index(&self) -> usize {
        self.sites.len() - 1
    }

    /// The site at `index`, if any.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Site> {
        self.sites.get(index)
    }

    /// All sites in path order.
    #[must_use]
    pub fn sites(&self) -> &[Site] {
        &self.sites
    }

    /// The first barrier strictly after `from`.
    ///
    /// Always exists for any `from` short of the terminal site.
    #[must_use]
    pub fn next_barrier(&self, from: usize) -> Option<usize> {
        self.sites
            .iter()
            .enumerate()
            .skip(from + 1)
            .find(|(_, site)| site.is_barrier())
            .map(|(index, _)| index)
    }
}

impl fmt::Display for PathDeck {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{};", self.sites.len())?;
        for site in &self.sites {
            write!(f, "{site}")?;
        }
        Ok(())
    }
}

impl FromStr for PathDeck {
    type Err = PathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_four_site_deck() {
        let deck = PathDeck::parse("4;::-Mo1Do1::-").unwrap();
        assert_eq!(deck.len(), 4);
        assert_eq!(deck.sites()[1], Site::new(SiteKind::Money, 1));
        assert_eq!(deck.sites()[2], Site::new(SiteKind::Donation, 1));
        assert!(deck.sites()[3].is_barrier());
        assert_eq!(deck.last_index(), 3);
    }

    #[test]
    fn test_parse_ignores_trailing_newline() {
        let deck = PathDeck::parse("2;::-::-\n").unwrap();
        assert_eq!(deck.len(), 2);
    }

    #[test]
    fn test_display_is_canonical() {
        let raw = "7;::-Mo4V11V22Do1Ri9::-";
        assert_eq!(PathDeck::parse(raw).unwrap().to_string(), raw);
    }

    #[test]
    fn test_rejects_short_count() {
        assert_eq!(PathDeck::parse("1;::-"), Err(PathError::TooShort(1)));
    }

    #[test]
    fn test_rejects_missing_delimiter() {
        assert_eq!(PathDeck::parse("2::-::-"), Err(PathError::MissingDelimiter));
    }

    #[test]
    fn test_rejects_signed_count() {
        assert!(matches!(
            PathDeck::parse("+2;::-::-"),
            Err(PathError::BadCount(_))
        ));
    }

    #[test]
    fn test_rejects_length_mismatch() {
        assert_eq!(
            PathDeck::parse("3;::-Mo1::"),
            Err(PathError::LengthMismatch {
                expected: 9,
                actual: 8
            })
        );
        assert!(matches!(
            PathDeck::parse("2;::-::-Mo1"),
            Err(PathError::LengthMismatch { .. })
        ));
    }

    #[test]
    fn test_rejects_non_barrier_ends() {
        assert_eq!(
            PathDeck::parse("3;Mo1Do1::-"),
            Err(PathError::MissingBarrier { index: 0 })
        );
        assert_eq!(
            PathDeck::parse("3;::-Do1Mo1"),
            Err(PathError::MissingBarrier { index: 2 })
        );
    }

    #[test]
    fn test_rejects_unknown_tag() {
        assert_eq!(
            PathDeck::parse("3;::-Xx1::-"),
            Err(PathError::UnknownTag {
                index: 1,
                tag: "Xx".to_owned()
            })
        );
        // V3 is not a venue
        assert!(PathDeck::parse("3;::-V31::-").is_err());
    }

    #[test]
    fn test_capacity_symbols() {
        // Non-barrier with unbounded symbol
        assert_eq!(
            PathDeck::parse("3;::-Mo-::-"),
            Err(PathError::BadCapacity { index: 1, symbol: '-' })
        );
        // Barrier with a digit
        assert_eq!(
            PathDeck::parse("3;::-Mo1::3"),
            Err(PathError::BadCapacity { index: 2, symbol: '3' })
        );
    }

    #[test]
    fn test_next_barrier() {
        let deck = PathDeck::parse("6;::-Mo1::-Ri2V21::-").unwrap();
        assert_eq!(deck.next_barrier(0), Some(2));
        assert_eq!(deck.next_barrier(1), Some(2));
        assert_eq!(deck.next_barrier(2), Some(5));
        assert_eq!(deck.next_barrier(5), None);
    }

    #[test]
    fn test_capacity_admits() {
        assert!(Capacity::Limited(2).admits(1));
        assert!(!Capacity::Limited(2).admits(2));
        assert!(!Capacity::Limited(0).admits(0));
        assert!(Capacity::Unbounded.admits(usize::MAX));
    }
}
