use serde::{Serialize, Serializer};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use thiserror::Error;

pub mod deck;
pub mod round;
pub mod scoring;
#[cfg(target_arch = "wasm32")]
pub mod wasm_api;

use deck::DeckTile;

/// Highest face value on an Okey tile.
pub const MAX_VALUE: u8 = 13;

/// Tile color. Declared in alphabetical order of the color names, so the
/// derived ordering sorts colors by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Color {
    Black,
    Blue,
    Red,
    Yellow,
}

impl Color {
    pub const ALL: [Color; 4] = [Color::Black, Color::Blue, Color::Red, Color::Yellow];

    /// Single-letter notation: "k" (black), "b" (blue), "r" (red), "y" (yellow)
    pub fn letter(self) -> char {
        match self {
            Color::Black => 'k',
            Color::Blue => 'b',
            Color::Red => 'r',
            Color::Yellow => 'y',
        }
    }

    pub fn from_letter(s: &str) -> Option<Self> {
        match s {
            "k" => Some(Color::Black),
            "b" => Some(Color::Blue),
            "r" => Some(Color::Red),
            "y" => Some(Color::Yellow),
            _ => None,
        }
    }

    /// ANSI escape sequence used when printing tiles to a terminal
    pub fn ansi(self) -> &'static str {
        match self {
            Color::Black => "\x1b[90m",
            Color::Blue => "\x1b[34m",
            Color::Red => "\x1b[31m",
            Color::Yellow => "\x1b[33m",
        }
    }
}

/// How a tile behaves during scoring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TileKind {
    /// An ordinary tile that only stands for itself
    Natural,
    /// A tile that may substitute for any tile. `placeholder` is set when the
    /// tile was dealt as one of the two blank placeholders.
    Wildcard { placeholder: bool },
}

/// A face tile: color plus value 1-13, tagged with how it scores.
///
/// Equality, hashing and ordering only look at (color, value); the kind is
/// ignored, so a wildcard still compares equal to the joker it copies.
#[derive(Debug, Clone, Copy)]
pub struct Tile {
    color: Color,
    value: u8,
    kind: TileKind,
}

impl Tile {
    /// Create a natural tile from color and value (1-13)
    pub fn new(color: Color, value: u8) -> Self {
        assert!((1..=MAX_VALUE).contains(&value), "Value must be 1-13");
        Tile {
            color,
            value,
            kind: TileKind::Natural,
        }
    }

    pub fn color(&self) -> Color {
        self.color
    }

    pub fn value(&self) -> u8 {
        self.value
    }

    pub fn kind(&self) -> TileKind {
        self.kind
    }

    pub fn is_wild(&self) -> bool {
        matches!(self.kind, TileKind::Wildcard { .. })
    }

    pub fn is_placeholder(&self) -> bool {
        self.kind == TileKind::Wildcard { placeholder: true }
    }

    /// The tile that follows this one in its color, wrapping 13 back to 1.
    /// Applied to the indicator tile this yields the round's joker.
    pub fn successor(&self) -> Tile {
        Tile::new(self.color, self.value % MAX_VALUE + 1)
    }

    /// Tag this tile as a wildcard if it matches the joker, natural otherwise
    pub fn classify(self, joker: &Tile) -> Tile {
        let kind = if self == *joker {
            TileKind::Wildcard { placeholder: false }
        } else {
            TileKind::Natural
        };
        Tile { kind, ..self }
    }

    /// A placeholder-derived copy of the joker
    pub fn placeholder_for(joker: &Tile) -> Tile {
        Tile {
            kind: TileKind::Wildcard { placeholder: true },
            ..*joker
        }
    }

    /// Parse a face tile from its string representation
    /// Format: "r13" (red 13), "b1" (blue 1), "y7" (yellow 7), "k9" (black 9)
    pub fn from_string(s: &str) -> Result<Self, TileParseError> {
        if s.len() < 2 || !s.is_char_boundary(1) {
            return Err(TileParseError::Malformed(s.to_string()));
        }

        let color = Color::from_letter(&s[0..1])
            .ok_or_else(|| TileParseError::Color(s[0..1].to_string()))?;

        let value: u8 = s[1..]
            .parse()
            .map_err(|_| TileParseError::Value(s[1..].to_string()))?;

        if !(1..=MAX_VALUE).contains(&value) {
            return Err(TileParseError::Value(s[1..].to_string()));
        }

        Ok(Tile::new(color, value))
    }

    /// Terminal rendering with the tile's color applied
    pub fn to_ansi(&self) -> String {
        format!("{}{}\x1b[0m", self.color.ansi(), self)
    }
}

impl PartialEq for Tile {
    fn eq(&self, other: &Self) -> bool {
        self.color == other.color && self.value == other.value
    }
}

impl Eq for Tile {}

impl Hash for Tile {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.color.hash(state);
        self.value.hash(state);
    }
}

impl PartialOrd for Tile {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Tile {
    fn cmp(&self, other: &Self) -> Ordering {
        self.color
            .cmp(&other.color)
            .then(self.value.cmp(&other.value))
    }
}

/// "r13" for a natural tile, "r13*" for a wildcard, "j:r13" for a
/// placeholder standing in for the joker r13.
impl fmt::Display for Tile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            TileKind::Natural => write!(f, "{}{}", self.color.letter(), self.value),
            TileKind::Wildcard { placeholder: false } => {
                write!(f, "{}{}*", self.color.letter(), self.value)
            }
            TileKind::Wildcard { placeholder: true } => {
                write!(f, "j:{}{}", self.color.letter(), self.value)
            }
        }
    }
}

impl Serialize for Tile {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Error parsing the text notation of a tile
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TileParseError {
    #[error("invalid tile string: {0:?}")]
    Malformed(String),
    #[error("invalid color: {0:?}")]
    Color(String),
    #[error("value must be 1-13, got {0:?}")]
    Value(String),
}

/// The tiles held by one player, kept in tile order
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct Hand(Vec<Tile>);

impl Hand {
    /// Create a new empty hand
    pub fn new() -> Self {
        Hand(Vec::new())
    }

    /// Build a sorted hand from dealt tiles, resolving placeholders and
    /// joker matches against the round's joker
    pub fn dealt<I>(tiles: I, joker: &Tile) -> Self
    where
        I: IntoIterator<Item = DeckTile>,
    {
        let mut hand = Hand(tiles.into_iter().map(|t| t.resolve(joker)).collect());
        hand.sort();
        hand
    }

    /// Add a tile to the hand (order is not restored, call `sort`)
    pub fn add(&mut self, tile: Tile) {
        self.0.push(tile);
    }

    /// Sort by color name, then value. Stable, so equal tiles keep deal order.
    pub fn sort(&mut self) {
        self.0.sort();
    }

    pub fn tiles(&self) -> &[Tile] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Tile> {
        self.0.iter()
    }

    pub fn wildcard_count(&self) -> usize {
        self.0.iter().filter(|t| t.is_wild()).count()
    }
}

impl FromIterator<Tile> for Hand {
    fn from_iter<I: IntoIterator<Item = Tile>>(iter: I) -> Self {
        Hand(iter.into_iter().collect())
    }
}

impl fmt::Display for Hand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, tile) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", tile)?;
        }
        write!(f, "]")
    }
}
