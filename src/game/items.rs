//! Item classes and the cyclic item deck drawn from at risk sites.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ItemDeckError;

/// Number of distinct item classes.
pub const ITEM_CLASSES: usize = 5;

/// One of the five item categories.
///
/// Decks spell them `A`..=`E`; the protocol numbers them 1..=5 (0 means none).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ItemClass {
    /// Class A (wire 1).
    A,
    /// Class B (wire 2).
    B,
    /// Class C (wire 3).
    C,
    /// Class D (wire 4).
    D,
    /// Class E (wire 5).
    E,
}

impl ItemClass {
    /// All classes in wire order.
    pub const ALL: [ItemClass; ITEM_CLASSES] = [
        ItemClass::A,
        ItemClass::B,
        ItemClass::C,
        ItemClass::D,
        ItemClass::E,
    ];

    /// Zero-based slot for per-class counters.
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// The protocol number, 1..=5.
    #[must_use]
    pub const fn wire(self) -> u8 {
        self as u8 + 1
    }

    /// Decode a protocol number; 0 and anything above 5 are not classes.
    #[must_use]
    pub fn from_wire(value: u8) -> Option<Self> {
        Self::ALL.get(usize::from(value).checked_sub(1)?).copied()
    }

    /// Decode a deck letter.
    #[must_use]
    pub fn from_letter(letter: char) -> Option<Self> {
        match letter {
            'A' => Some(ItemClass::A),
            'B' => Some(ItemClass::B),
            'C' => Some(ItemClass::C),
            'D' => Some(ItemClass::D),
            'E' => Some(ItemClass::E),
            _ => None,
        }
    }

    /// The deck letter.
    #[must_use]
    pub const fn letter(self) -> char {
        match self {
            ItemClass::A => 'A',
            ItemClass::B => 'B',
            ItemClass::C => 'C',
            ItemClass::D => 'D',
            ItemClass::E => 'E',
        }
    }
}

impl fmt::Display for ItemClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.letter())
    }
}

/// Fixed cyclic sequence of items with a single shared read cursor.
///
/// Only the dealer holds one; players only ever see the drawn class.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemDeck {
    items: Vec<ItemClass>,
    cursor: usize,
}

impl ItemDeck {
    /// Build a deck from classes.
    ///
    /// # Errors
    ///
    /// Returns [`ItemDeckError::Empty`] if `items` is empty.
    pub fn new(items: Vec<ItemClass>) -> Result<Self, ItemDeckError> {
        if items.is_empty() {
            return Err(ItemDeckError::Empty);
        }
        Ok(Self { items, cursor: 0 })
    }

    /// Parse `<count><letters>`, e.g. `5ABCDE`.
    ///
    /// # Errors
    ///
    /// Returns an error if the count is missing or zero, the letters do not
    /// match the count, or a letter is outside `A`..=`E`.
    pub fn parse(raw: &str) -> Result<Self, ItemDeckError> {
        let raw = raw.trim_end_matches(['\n', '\r']);
        let digits = raw.bytes().take_while(u8::is_ascii_digit).count();
        let (count, letters) = raw.split_at(digits);
        let count: usize = count.parse().map_err(|_| ItemDeckError::MissingCount)?;
        if count == 0 {
            return Err(ItemDeckError::Empty);
        }

        let items = letters
            .chars()
            .enumerate()
            .map(|(index, symbol)| {
                ItemClass::from_letter(symbol).ok_or(ItemDeckError::UnknownItem { index, symbol })
            })
            .collect::<Result<Vec<_>, _>>()?;

        if items.len() != count {
            return Err(ItemDeckError::LengthMismatch {
                expected: count,
                actual: items.len(),
            });
        }

        Self::new(items)
    }

    /// Number of items in one cycle.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Always false for a constructed deck.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Current cursor position.
    #[must_use]
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// The class under the cursor, without drawing it.
    #[must_use]
    pub fn peek(&self) -> ItemClass {
        self.items[self.cursor]
    }

    /// Take the class under the cursor and advance, wrapping at the end.
    pub fn draw(&mut self) -> ItemClass {
        let item = self.items[self.cursor];
        self.cursor = (self.cursor + 1) % self.items.len();
        item
    }
}

impl fmt::Display for ItemDeck {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.items.len())?;
        for item in &self.items {
            write!(f, "{item}")?;
        }
        Ok(())
    }
}
