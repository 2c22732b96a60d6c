use crate::deck::{DECK_SIZE, Deck, DeckError};
use crate::scoring::{ScoringPolicy, score_hand_with_policy};
use crate::{Hand, Tile};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::fmt::{self, Write};
use thiserror::Error;

pub const PLAYER_COUNT: usize = 4;
pub const TILES_PER_HAND: usize = 14;

#[derive(Debug, Error)]
pub enum RoundError {
    #[error(transparent)]
    Deck(#[from] DeckError),
    #[error("invalid round config: {0}")]
    Config(String),
}

/// Settings for one deal. Every field falls back to its default when
/// missing from JSON.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoundConfig {
    /// Shuffle seed; a fresh one is drawn when absent
    pub seed: Option<u64>,
    pub players: usize,
    /// Tiles per seat, one seat gets one extra
    pub tiles_per_hand: usize,
    pub policy: ScoringPolicy,
}

impl Default for RoundConfig {
    fn default() -> Self {
        RoundConfig {
            seed: None,
            players: PLAYER_COUNT,
            tiles_per_hand: TILES_PER_HAND,
            policy: ScoringPolicy::OBSERVED,
        }
    }
}

impl RoundConfig {
    pub fn with_seed(seed: u64) -> Self {
        RoundConfig {
            seed: Some(seed),
            ..Self::default()
        }
    }

    /// Check that the deal fits in one deck after the indicator is drawn
    pub fn validate(&self) -> Result<(), RoundError> {
        if self.players == 0 {
            return Err(RoundError::Config("at least one player is required".to_string()));
        }
        if self.tiles_per_hand == 0 {
            return Err(RoundError::Config("tiles_per_hand must be positive".to_string()));
        }

        let available = DECK_SIZE - 1;
        let needed = self
            .players
            .checked_mul(self.tiles_per_hand)
            .and_then(|n| n.checked_add(1));
        match needed {
            Some(n) if n <= available => Ok(()),
            _ => Err(RoundError::Config(format!(
                "{} players x {} tiles (+1) does not fit in the {} tiles left after the indicator",
                self.players, self.tiles_per_hand, available
            ))),
        }
    }
}

/// Joker for a given indicator: next value in the same color, 13 wraps to 1
pub fn joker_for_indicator(indicator: &Tile) -> Tile {
    indicator.successor()
}

/// Seed for rounds that were not given one
pub fn random_seed() -> u64 {
    #[cfg(not(target_arch = "wasm32"))]
    {
        rand::random()
    }
    #[cfg(target_arch = "wasm32")]
    {
        (js_sys::Math::random() * u64::MAX as f64) as u64
    }
}

/// A dealt round: the joker and every seat's sorted hand
#[derive(Debug, Clone)]
pub struct Round {
    seed: u64,
    indicator: Tile,
    joker: Tile,
    extra_seat: usize,
    hands: Vec<Hand>,
    undealt: Deck,
    policy: ScoringPolicy,
}

impl Round {
    /// Shuffle a fresh deck, pick the joker and deal every seat.
    ///
    /// The indicator is the first non-placeholder tile of the shuffled deck.
    /// Seats are dealt in order, each taking a contiguous block from the
    /// front; one seat chosen at random takes one extra tile.
    pub fn deal(config: &RoundConfig) -> Result<Self, RoundError> {
        config.validate()?;

        let seed = config.seed.unwrap_or_else(random_seed);
        let mut rng = StdRng::seed_from_u64(seed);
        let mut deck = Deck::shuffled(&mut rng);

        let indicator = deck.draw_indicator()?;
        let joker = joker_for_indicator(&indicator);
        let extra_seat = rng.gen_range(0..config.players);

        let mut hands = Vec::with_capacity(config.players);
        for seat in 0..config.players {
            let count = config.tiles_per_hand + usize::from(seat == extra_seat);
            let tiles = (0..count)
                .map(|_| deck.draw_tile())
                .collect::<Result<Vec<_>, _>>()?;
            hands.push(Hand::dealt(tiles, &joker));
        }

        Ok(Round {
            seed,
            indicator,
            joker,
            extra_seat,
            hands,
            undealt: deck,
            policy: config.policy,
        })
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn indicator(&self) -> Tile {
        self.indicator
    }

    pub fn joker(&self) -> Tile {
        self.joker
    }

    /// Seat that was dealt the extra tile
    pub fn extra_seat(&self) -> usize {
        self.extra_seat
    }

    pub fn hands(&self) -> &[Hand] {
        &self.hands
    }

    /// What is left of the deck after dealing
    pub fn undealt(&self) -> &Deck {
        &self.undealt
    }

    /// Score every hand and pick the winners
    pub fn score(&self) -> RoundReport {
        let players = self
            .hands
            .iter()
            .enumerate()
            .map(|(seat, hand)| PlayerResult {
                seat,
                hand: hand.clone(),
                score: score_hand_with_policy(hand, self.policy),
            })
            .collect();

        RoundReport::new(self.seed, self.indicator, self.joker, players)
    }
}

/// Seats holding the highest score, in seat order. Every tied seat is
/// included; no scores means no winners.
pub fn best_players(scores: &[u32]) -> Vec<usize> {
    let Some(&best) = scores.iter().max() else {
        return Vec::new();
    };
    scores
        .iter()
        .enumerate()
        .filter(|&(_, &score)| score == best)
        .map(|(seat, _)| seat)
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlayerResult {
    /// Zero-based seat index
    pub seat: usize,
    pub hand: Hand,
    pub score: u32,
}

/// Outcome of a scored round
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoundReport {
    pub seed: u64,
    pub indicator: Tile,
    pub joker: Tile,
    pub players: Vec<PlayerResult>,
    pub best_score: Option<u32>,
    pub winners: Vec<usize>,
}

impl RoundReport {
    pub fn new(seed: u64, indicator: Tile, joker: Tile, players: Vec<PlayerResult>) -> Self {
        let scores: Vec<u32> = players.iter().map(|p| p.score).collect();
        RoundReport {
            seed,
            indicator,
            joker,
            best_score: scores.iter().max().copied(),
            winners: best_players(&scores),
            players,
        }
    }

    /// Report without terminal color codes
    pub fn to_plain_string(&self) -> String {
        let mut out = String::new();
        // Writing into a String cannot fail
        let _ = self.write_report(&mut out, false);
        out
    }

    fn write_report<W: Write>(&self, out: &mut W, ansi: bool) -> fmt::Result {
        let tile = |t: &Tile| if ansi { t.to_ansi() } else { t.to_string() };

        writeln!(out, "Indicator: {}  Joker: {}", tile(&self.indicator), tile(&self.joker))?;
        writeln!(out, "Hands:")?;
        for player in &self.players {
            let tiles: Vec<String> = player.hand.iter().map(tile).collect();
            writeln!(
                out,
                "Player {}: [{}] (score: {})",
                player.seat + 1,
                tiles.join(", "),
                player.score
            )?;
        }

        writeln!(out, "Best hand(s):")?;
        for &seat in &self.winners {
            writeln!(out, "Player {} (score: {})", seat + 1, self.players[seat].score)?;
        }
        write!(out, "Seed: {}", self.seed)
    }
}

impl fmt::Display for RoundReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_report(f, true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Color;
    use crate::deck::DeckTile;
    use std::collections::HashMap;

    #[test]
    fn test_joker_for_indicator() {
        assert_eq!(
            joker_for_indicator(&Tile::new(Color::Red, 7)),
            Tile::new(Color::Red, 8)
        );
        assert_eq!(
            joker_for_indicator(&Tile::new(Color::Blue, 13)),
            Tile::new(Color::Blue, 1)
        );
    }

    #[test]
    fn test_deal_hand_sizes() {
        let round = Round::deal(&RoundConfig::with_seed(1)).unwrap();
        let sizes: Vec<usize> = round.hands().iter().map(|h| h.len()).collect();

        assert_eq!(sizes.len(), 4);
        assert_eq!(sizes.iter().sum::<usize>(), 57);
        assert_eq!(sizes.iter().filter(|&&s| s == 15).count(), 1);
        assert_eq!(sizes.iter().filter(|&&s| s == 14).count(), 3);
        assert_eq!(sizes[round.extra_seat()], 15);
        assert_eq!(round.undealt().len(), 106 - 58);
    }

    #[test]
    fn test_deal_many_seeds_never_runs_out() {
        for seed in 0..64 {
            let round = Round::deal(&RoundConfig::with_seed(seed)).unwrap();
            assert_eq!(round.hands().iter().map(|h| h.len()).sum::<usize>(), 57);
            assert!(round.hands().iter().all(|h| h.len() == 14 || h.len() == 15));
        }
    }

    #[test]
    fn test_deal_is_seed_deterministic() {
        let a = Round::deal(&RoundConfig::with_seed(99)).unwrap();
        let b = Round::deal(&RoundConfig::with_seed(99)).unwrap();
        assert_eq!(a.joker(), b.joker());
        assert_eq!(a.hands(), b.hands());
        assert_eq!(a.score(), b.score());
    }

    #[test]
    fn test_dealt_hands_are_sorted_and_tagged() {
        let round = Round::deal(&RoundConfig::with_seed(5)).unwrap();
        let joker = round.joker();

        assert_eq!(joker, joker_for_indicator(&round.indicator()));
        for hand in round.hands() {
            assert!(hand.tiles().windows(2).all(|w| w[0] <= w[1]));
            for tile in hand.iter() {
                // Anything equal to the joker is wild, nothing else is
                assert_eq!(tile.is_wild(), *tile == joker);
            }
        }
    }

    #[test]
    fn test_deal_conserves_tiles() {
        let round = Round::deal(&RoundConfig::with_seed(2024)).unwrap();

        let mut faces: HashMap<Tile, usize> = HashMap::new();
        let mut placeholders = 0;
        *faces.entry(round.indicator()).or_insert(0) += 1;
        for tile in round.hands().iter().flat_map(|h| h.iter()) {
            if tile.is_placeholder() {
                placeholders += 1;
            } else {
                *faces.entry(*tile).or_insert(0) += 1;
            }
        }
        for tile in round.undealt().iter() {
            match tile {
                DeckTile::Face(t) => *faces.entry(*t).or_insert(0) += 1,
                DeckTile::Placeholder => placeholders += 1,
            }
        }

        assert_eq!(placeholders, 2);
        assert_eq!(faces.len(), 52);
        assert!(faces.values().all(|&c| c == 2));
    }

    #[test]
    fn test_config_validation() {
        let no_players = RoundConfig {
            players: 0,
            ..RoundConfig::default()
        };
        assert!(matches!(Round::deal(&no_players), Err(RoundError::Config(_))));

        let too_many = RoundConfig {
            players: 8,
            ..RoundConfig::with_seed(3)
        };
        assert!(matches!(too_many.validate(), Err(RoundError::Config(_))));

        let exactly_fits = RoundConfig {
            players: 8,
            tiles_per_hand: 13,
            ..RoundConfig::with_seed(3)
        };
        let round = Round::deal(&exactly_fits).unwrap();
        assert_eq!(round.undealt().len(), 0);
    }

    #[test]
    fn test_config_from_json_defaults() {
        let config: RoundConfig = serde_json::from_str(r#"{"seed": 12}"#).unwrap();
        assert_eq!(config, RoundConfig::with_seed(12));

        let empty: RoundConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(empty, RoundConfig::default());
    }

    #[test]
    fn test_best_players() {
        assert_eq!(best_players(&[3, 9, 4, 2]), vec![1]);
        assert_eq!(best_players(&[7, 2, 7, 7]), vec![0, 2, 3]);
        assert_eq!(best_players(&[0, 0, 0, 0]), vec![0, 1, 2, 3]);
        assert!(best_players(&[]).is_empty());
    }

    #[test]
    fn test_report_picks_winners() {
        let round = Round::deal(&RoundConfig::with_seed(11)).unwrap();
        let report = round.score();

        let best = report.players.iter().map(|p| p.score).max();
        assert_eq!(report.best_score, best);
        assert!(!report.winners.is_empty());
        for &seat in &report.winners {
            assert_eq!(Some(report.players[seat].score), best);
        }
    }

    #[test]
    fn test_report_rendering() {
        let joker = Tile::new(Color::Red, 8);
        let players = vec![
            PlayerResult {
                seat: 0,
                hand: Hand::dealt(vec![DeckTile::Face(Tile::new(Color::Blue, 2))], &joker),
                score: 0,
            },
            PlayerResult {
                seat: 1,
                hand: Hand::dealt(vec![DeckTile::Placeholder, DeckTile::Placeholder], &joker),
                score: 0,
            },
        ];
        let report = RoundReport::new(4, Tile::new(Color::Red, 7), joker, players);
        let text = report.to_plain_string();

        assert!(text.starts_with("Indicator: r7  Joker: r8\n"));
        assert!(text.contains("Player 1: [b2] (score: 0)"));
        assert!(text.contains("Player 2: [j:r8, j:r8] (score: 0)"));
        assert!(text.ends_with("Player 1 (score: 0)\nPlayer 2 (score: 0)\nSeed: 4"));
        assert!(report.to_string().contains("\x1b["));
    }

    #[test]
    fn test_report_serializes_tiles_as_strings() {
        let joker = Tile::new(Color::Yellow, 1);
        let players = vec![PlayerResult {
            seat: 0,
            hand: Hand::dealt(vec![DeckTile::Face(Tile::new(Color::Yellow, 1))], &joker),
            score: 0,
        }];
        let report = RoundReport::new(0, Tile::new(Color::Yellow, 13), joker, players);
        let json = serde_json::to_value(&report).unwrap();

        assert_eq!(json["joker"], "y1");
        assert_eq!(json["players"][0]["hand"][0], "y1*");
        assert_eq!(json["winners"][0], 0);
    }
}
