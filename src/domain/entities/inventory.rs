use serde::{Deserialize, Serialize};
use std::fmt;

/// Number of distinct cards in the collection
pub const CARD_COUNT: usize = 18;

/// Map a 1-based card id to its array slot
fn slot(card: i64) -> Option<usize> {
    if (1..=CARD_COUNT as i64).contains(&card) {
        Some((card - 1) as usize)
    } else {
        None
    }
}

/// Fixed set of card flags, indexed 1..=18 at the boundary.
///
/// Serializes as the ascending list of card ids.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "Vec<i64>", from = "Vec<i64>")]
pub struct CardSet([bool; CARD_COUNT]);

impl CardSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, card: i64) -> bool {
        slot(card).map(|i| self.0[i]).unwrap_or(false)
    }

    /// Set the flag for `card`. Returns `false` when the id is out of range.
    pub fn insert(&mut self, card: i64) -> bool {
        match slot(card) {
            Some(i) => {
                self.0[i] = true;
                true
            }
            None => false,
        }
    }

    /// Clear the flag for `card`. Returns `false` when the id is out of range.
    pub fn remove(&mut self, card: i64) -> bool {
        match slot(card) {
            Some(i) => {
                self.0[i] = false;
                true
            }
            None => false,
        }
    }

    /// Card ids in ascending order
    pub fn iter(&self) -> impl Iterator<Item = i64> + '_ {
        self.0
            .iter()
            .enumerate()
            .filter(|(_, set)| **set)
            .map(|(i, _)| i as i64 + 1)
    }

    pub fn intersection(&self, other: &CardSet) -> CardSet {
        let mut out = CardSet::new();
        for i in 0..CARD_COUNT {
            out.0[i] = self.0[i] && other.0[i];
        }
        out
    }

    pub fn is_empty(&self) -> bool {
        !self.0.iter().any(|set| *set)
    }

    pub fn len(&self) -> usize {
        self.0.iter().filter(|set| **set).count()
    }

    /// Bit `i - 1` holds card `i`
    pub fn to_mask(&self) -> u32 {
        self.0
            .iter()
            .enumerate()
            .fold(0, |mask, (i, set)| if *set { mask | (1 << i) } else { mask })
    }

    /// Bits above the card range are ignored
    pub fn from_mask(mask: u32) -> Self {
        let mut set = CardSet::new();
        for i in 0..CARD_COUNT {
            set.0[i] = mask & (1 << i) != 0;
        }
        set
    }
}

impl FromIterator<i64> for CardSet {
    fn from_iter<I: IntoIterator<Item = i64>>(iter: I) -> Self {
        let mut set = CardSet::new();
        for card in iter {
            set.insert(card);
        }
        set
    }
}

impl From<CardSet> for Vec<i64> {
    fn from(set: CardSet) -> Self {
        set.iter().collect()
    }
}

impl From<Vec<i64>> for CardSet {
    fn from(cards: Vec<i64>) -> Self {
        cards.into_iter().collect()
    }
}

impl fmt::Display for CardSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let ids: Vec<String> = self.iter().map(|c| c.to_string()).collect();
        write!(f, "{{{}}}", ids.join(","))
    }
}
