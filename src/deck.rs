use crate::{Color, MAX_VALUE, Tile, TileParseError};
use rand::Rng;
use rand::seq::SliceRandom;
use std::collections::VecDeque;
use thiserror::Error;

/// Copies of every (color, value) face in a full set
pub const COPIES_PER_FACE: usize = 2;
/// Blank placeholder tiles in a full set
pub const PLACEHOLDER_COUNT: usize = 2;
/// 4 colors x 13 values x 2 copies + 2 placeholders
pub const DECK_SIZE: usize =
    Color::ALL.len() * MAX_VALUE as usize * COPIES_PER_FACE + PLACEHOLDER_COUNT;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum DeckError {
    #[error("deck is empty")]
    Empty,
}

/// A tile as it sits in the deck, before the joker is known
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeckTile {
    Face(Tile),
    /// Blank tile that becomes a copy of the joker once dealt
    Placeholder,
}

impl DeckTile {
    pub fn is_placeholder(&self) -> bool {
        matches!(self, DeckTile::Placeholder)
    }

    /// Turn a dealt tile into a scoring tile for a round with this joker
    pub fn resolve(self, joker: &Tile) -> Tile {
        match self {
            DeckTile::Face(tile) => tile.classify(joker),
            DeckTile::Placeholder => Tile::placeholder_for(joker),
        }
    }

    /// Parse a deck tile: "j" for a placeholder, otherwise a face tile ("r13")
    pub fn from_string(s: &str) -> Result<Self, TileParseError> {
        if s == "j" {
            return Ok(DeckTile::Placeholder);
        }
        Tile::from_string(s).map(DeckTile::Face)
    }
}

/// The ordered set of tiles for one round. Drawn from the front.
#[derive(Debug, Clone)]
pub struct Deck {
    tiles: VecDeque<DeckTile>,
}

impl Deck {
    /// Full, unshuffled set: two passes of every color 1-13, then the placeholders
    pub fn new() -> Self {
        let mut tiles = VecDeque::with_capacity(DECK_SIZE);
        for _ in 0..COPIES_PER_FACE {
            for color in Color::ALL {
                for value in 1..=MAX_VALUE {
                    tiles.push_back(DeckTile::Face(Tile::new(color, value)));
                }
            }
        }
        for _ in 0..PLACEHOLDER_COUNT {
            tiles.push_back(DeckTile::Placeholder);
        }
        Deck { tiles }
    }

    /// Full set shuffled once with the given generator
    pub fn shuffled<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let mut deck = Deck::new();
        deck.shuffle(rng);
        deck
    }

    pub fn shuffle<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.tiles.make_contiguous().shuffle(rng);
    }

    /// Remove and return the tile at the front
    pub fn draw_tile(&mut self) -> Result<DeckTile, DeckError> {
        self.tiles.pop_front().ok_or(DeckError::Empty)
    }

    /// Remove and return the first face tile, leaving any placeholders
    /// in front of it where they are
    pub fn draw_indicator(&mut self) -> Result<Tile, DeckError> {
        let index = self
            .tiles
            .iter()
            .position(|t| !t.is_placeholder())
            .ok_or(DeckError::Empty)?;

        match self.tiles.remove(index) {
            Some(DeckTile::Face(tile)) => Ok(tile),
            _ => Err(DeckError::Empty),
        }
    }

    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &DeckTile> {
        self.tiles.iter()
    }
}

impl Default for Deck {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::collections::HashMap;

    #[test]
    fn test_new_deck_composition() {
        let deck = Deck::new();
        assert_eq!(deck.len(), 106);
        assert_eq!(DECK_SIZE, 106);

        let placeholders = deck.iter().filter(|t| t.is_placeholder()).count();
        assert_eq!(placeholders, 2);

        let mut counts: HashMap<Tile, usize> = HashMap::new();
        for tile in deck.iter() {
            if let DeckTile::Face(t) = tile {
                *counts.entry(*t).or_insert(0) += 1;
            }
        }
        assert_eq!(counts.len(), 52);
        assert!(counts.values().all(|&c| c == 2));
    }

    #[test]
    fn test_shuffle_keeps_composition() {
        let mut rng = StdRng::seed_from_u64(7);
        let deck = Deck::shuffled(&mut rng);
        assert_eq!(deck.len(), 106);
        assert_eq!(deck.iter().filter(|t| t.is_placeholder()).count(), 2);
    }

    #[test]
    fn test_shuffle_is_seed_deterministic() {
        let a: Vec<DeckTile> = Deck::shuffled(&mut StdRng::seed_from_u64(42)).iter().copied().collect();
        let b: Vec<DeckTile> = Deck::shuffled(&mut StdRng::seed_from_u64(42)).iter().copied().collect();
        assert_eq!(a, b);
    }

    #[test]
    fn test_draw_tile_shrinks_then_errors() {
        let mut deck = Deck::new();
        assert_eq!(deck.draw_tile(), Ok(DeckTile::Face(Tile::new(Color::Black, 1))));
        assert_eq!(deck.len(), 105);

        for _ in 0..105 {
            assert!(deck.draw_tile().is_ok());
        }
        assert!(deck.is_empty());
        assert_eq!(deck.draw_tile(), Err(DeckError::Empty));
    }

    #[test]
    fn test_draw_indicator_skips_placeholders() {
        let mut deck = Deck {
            tiles: VecDeque::from(vec![
                DeckTile::Placeholder,
                DeckTile::Placeholder,
                DeckTile::Face(Tile::new(Color::Red, 7)),
                DeckTile::Face(Tile::new(Color::Blue, 1)),
            ]),
        };

        assert_eq!(deck.draw_indicator(), Ok(Tile::new(Color::Red, 7)));
        assert_eq!(deck.len(), 3);
        // Placeholders stay at the front for dealing
        assert_eq!(deck.draw_tile(), Ok(DeckTile::Placeholder));
    }

    #[test]
    fn test_draw_indicator_only_placeholders() {
        let mut deck = Deck {
            tiles: VecDeque::from(vec![DeckTile::Placeholder]),
        };
        assert_eq!(deck.draw_indicator(), Err(DeckError::Empty));
        assert_eq!(deck.len(), 1);
    }

    #[test]
    fn test_deck_tile_from_string() {
        assert_eq!(DeckTile::from_string("j"), Ok(DeckTile::Placeholder));
        assert_eq!(
            DeckTile::from_string("y12"),
            Ok(DeckTile::Face(Tile::new(Color::Yellow, 12)))
        );
        assert!(DeckTile::from_string("q1").is_err());
    }

    #[test]
    fn test_resolve_against_joker() {
        let joker = Tile::new(Color::Blue, 8);
        assert!(DeckTile::Placeholder.resolve(&joker).is_placeholder());
        assert!(DeckTile::Face(Tile::new(Color::Blue, 8)).resolve(&joker).is_wild());
        assert!(!DeckTile::Face(Tile::new(Color::Blue, 9)).resolve(&joker).is_wild());
    }
}
