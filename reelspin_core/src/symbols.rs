use std::fmt;
use std::str::FromStr;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::{SlotError, SlotResult};

pub const REEL_COUNT: usize = 3;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(try_from = "char", into = "char")]
pub enum SymbolId {
    One,
    Two,
    Three,
    Four,
    Five,
    Six,
}

impl SymbolId {
    pub const ALL: [SymbolId; 6] = [
        SymbolId::One,
        SymbolId::Two,
        SymbolId::Three,
        SymbolId::Four,
        SymbolId::Five,
        SymbolId::Six,
    ];

    pub fn from_index(i: u8) -> Self {
        match i % 6 {
            0 => SymbolId::One,
            1 => SymbolId::Two,
            2 => SymbolId::Three,
            3 => SymbolId::Four,
            4 => SymbolId::Five,
            _ => SymbolId::Six,
        }
    }

    pub fn to_index(self) -> u8 {
        match self {
            SymbolId::One => 0,
            SymbolId::Two => 1,
            SymbolId::Three => 2,
            SymbolId::Four => 3,
            SymbolId::Five => 4,
            SymbolId::Six => 5,
        }
    }

    /// The face label shown on the reel, `'1'` through `'6'`.
    pub fn label(self) -> char {
        (b'1' + self.to_index()) as char
    }

    pub fn from_label(c: char) -> SlotResult<Self> {
        match c {
            '1'..='6' => Ok(Self::from_index(c as u8 - b'1')),
            other => Err(SlotError::UnknownSymbol(other.to_string())),
        }
    }
}

impl fmt::Display for SymbolId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl FromStr for SymbolId {
    type Err = SlotError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let mut chars = trimmed.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Self::from_label(c),
            _ => Err(SlotError::UnknownSymbol(trimmed.to_string())),
        }
    }
}

impl TryFrom<char> for SymbolId {
    type Error = SlotError;

    fn try_from(c: char) -> Result<Self, Self::Error> {
        Self::from_label(c)
    }
}

impl From<SymbolId> for char {
    fn from(id: SymbolId) -> char {
        id.label()
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct SymbolSpec {
    pub id: SymbolId,
    /// Credits paid for three of a kind.
    pub value: u64,
    /// Relative draw probability.
    pub weight: u32,
}

impl SymbolSpec {
    pub const fn new(id: SymbolId, value: u64, weight: u32) -> Self {
        Self { id, value, weight }
    }
}

/// Ordered symbol definitions. The order is the walk order of the weighted draw.
///
/// A table always has at least one entry, unique ids and positive weights, so
/// drawing from it cannot fail.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(try_from = "Vec<SymbolSpec>", into = "Vec<SymbolSpec>")]
pub struct SymbolTable {
    entries: Vec<SymbolSpec>,
    total_weight: u64,
}

impl SymbolTable {
    pub fn new(entries: Vec<SymbolSpec>) -> SlotResult<Self> {
        if entries.is_empty() {
            return Err(SlotError::EmptyTable);
        }
        for (i, spec) in entries.iter().enumerate() {
            if spec.weight == 0 {
                return Err(SlotError::ZeroWeight(spec.id));
            }
            if entries[..i].iter().any(|e| e.id == spec.id) {
                return Err(SlotError::DuplicateSymbol(spec.id));
            }
        }
        let total_weight = entries.iter().map(|e| u64::from(e.weight)).sum();
        Ok(Self {
            entries,
            total_weight,
        })
    }

    /// The six-symbol table of the classic machine (total weight 112).
    pub fn classic() -> Self {
        Self {
            entries: vec![
                SymbolSpec::new(SymbolId::One, 1000, 2),
                SymbolSpec::new(SymbolId::Two, 500, 5),
                SymbolSpec::new(SymbolId::Three, 200, 10),
                SymbolSpec::new(SymbolId::Four, 100, 15),
                SymbolSpec::new(SymbolId::Five, 50, 20),
                SymbolSpec::new(SymbolId::Six, 10, 60),
            ],
            total_weight: 112,
        }
    }

    pub fn entries(&self) -> &[SymbolSpec] {
        &self.entries
    }

    pub fn ids(&self) -> impl Iterator<Item = SymbolId> + '_ {
        self.entries.iter().map(|e| e.id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, id: SymbolId) -> Option<&SymbolSpec> {
        self.entries.iter().find(|e| e.id == id)
    }

    pub fn contains(&self, id: SymbolId) -> bool {
        self.get(id).is_some()
    }

    /// Three-of-a-kind value; symbols outside the table pay nothing.
    pub fn value_of(&self, id: SymbolId) -> u64 {
        self.get(id).map_or(0, |e| e.value)
    }

    pub fn total_weight(&self) -> u64 {
        self.total_weight
    }

    /// Inverse CDF: maps a ticket in `[0, total_weight)` to its symbol by
    /// subtracting weights in table order until the ticket goes negative.
    pub fn symbol_at(&self, ticket: u64) -> SymbolId {
        let mut remaining = ticket;
        for spec in &self.entries {
            let weight = u64::from(spec.weight);
            if remaining < weight {
                return spec.id;
            }
            remaining -= weight;
        }
        // Out-of-range tickets land on the last symbol.
        self.entries[self.entries.len() - 1].id
    }

    /// Draws one symbol with probability `weight / total_weight`.
    pub fn draw_weighted<R: Rng + ?Sized>(&self, rng: &mut R) -> SymbolId {
        self.symbol_at(rng.gen_range(0..self.total_weight))
    }
}

impl TryFrom<Vec<SymbolSpec>> for SymbolTable {
    type Error = SlotError;

    fn try_from(entries: Vec<SymbolSpec>) -> Result<Self, Self::Error> {
        Self::new(entries)
    }
}

impl From<SymbolTable> for Vec<SymbolSpec> {
    fn from(table: SymbolTable) -> Self {
        table.entries
    }
}

impl Default for SymbolTable {
    fn default() -> Self {
        Self::classic()
    }
}

/// Symbols the three reels settled on, reel 1 first.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct SpinResult(pub [SymbolId; REEL_COUNT]);

impl SpinResult {
    pub fn new(a: SymbolId, b: SymbolId, c: SymbolId) -> Self {
        Self([a, b, c])
    }

    pub fn symbols(&self) -> [SymbolId; REEL_COUNT] {
        self.0
    }

    pub fn labels(&self) -> [char; REEL_COUNT] {
        self.0.map(SymbolId::label)
    }
}

impl fmt::Display for SpinResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [a, b, c] = self.0;
        write!(f, "{a} {b} {c}")
    }
}

/// Parses `"3,3,3"` or `"3 3 3"`.
impl FromStr for SpinResult {
    type Err = SlotError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let ids = s
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|part| !part.is_empty())
            .map(SymbolId::from_str)
            .collect::<SlotResult<Vec<_>>>()?;
        let reels: [SymbolId; REEL_COUNT] = ids
            .as_slice()
            .try_into()
            .map_err(|_| SlotError::ReelCount(ids.len()))?;
        Ok(Self(reels))
    }
}
