use crate::{Color, Hand, MAX_VALUE, Tile};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// The three kinds of meld the scorer extracts from a hand
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum MeldKind {
    /// Two or more identical natural tiles
    Pairs,
    /// One tile of the same value from three or more colors
    Sets,
    /// Three or more consecutive values in one color
    Series,
}

/// Points awarded for a group of identical tiles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PairPoints {
    /// The whole group's tile count, even though only two tiles are consumed
    #[default]
    TileCount,
    /// One point per complete pair in the group
    PerPair,
}

impl PairPoints {
    fn points(self, group_size: usize) -> u32 {
        match self {
            Self::TileCount => group_size as u32,
            Self::PerPair => (group_size / 2) as u32,
        }
    }
}

/// Pair scoring rules. Everything else about the search is fixed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringPolicy {
    pub pair_points: PairPoints,
    /// Run one more pairs pass over whatever is left after each ordering
    pub trailing_pair_pass: bool,
}

impl ScoringPolicy {
    /// Pairs score their full tile count and a trailing pairs pass is added.
    pub const OBSERVED: ScoringPolicy = ScoringPolicy {
        pair_points: PairPoints::TileCount,
        trailing_pair_pass: true,
    };
}

impl Default for ScoringPolicy {
    fn default() -> Self {
        Self::OBSERVED
    }
}

/// Per-attempt view of a hand: the tiles plus which ones a meld has taken.
/// Built fresh for every ordering so attempts never see each other's state.
struct WorkingHand<'a> {
    tiles: &'a [Tile],
    consumed: Vec<bool>,
}

impl<'a> WorkingHand<'a> {
    fn new(tiles: &'a [Tile]) -> Self {
        WorkingHand {
            tiles,
            consumed: vec![false; tiles.len()],
        }
    }

    fn is_free(&self, index: usize) -> bool {
        !self.consumed[index]
    }

    fn consume(&mut self, index: usize) {
        self.consumed[index] = true;
    }

    /// Indices of unconsumed tiles, in hand order
    fn free_indices(&self) -> Vec<usize> {
        (0..self.tiles.len()).filter(|&i| self.is_free(i)).collect()
    }
}

/// Score a hand under the observed pair rules
pub fn score_hand(hand: &Hand) -> u32 {
    score_hand_with_policy(hand, ScoringPolicy::OBSERVED)
}

/// Best total over every ordering of the three meld kinds.
///
/// Each ordering runs against its own working copy of the hand, so the
/// caller's tiles are never touched and the result is deterministic.
pub fn score_hand_with_policy(hand: &Hand, policy: ScoringPolicy) -> u32 {
    meld_orderings()
        .into_iter()
        .map(|order| score_ordering(hand, order, policy))
        .max()
        .unwrap_or(0)
}

/// All six orderings of pairs, sets and series, in lexicographic order
pub fn meld_orderings() -> Vec<[MeldKind; 3]> {
    let mut order = [MeldKind::Pairs, MeldKind::Sets, MeldKind::Series];
    let mut orderings = vec![order];
    while next_permutation(&mut order) {
        orderings.push(order);
    }
    orderings
}

/// Score one ordering: each meld kind in turn takes what it can from the
/// tiles the earlier kinds left, then the optional trailing pairs pass.
pub fn score_ordering(hand: &Hand, order: [MeldKind; 3], policy: ScoringPolicy) -> u32 {
    let mut work = WorkingHand::new(hand.tiles());

    let mut total = 0;
    for kind in order {
        total += match kind {
            MeldKind::Pairs => count_pairs(&mut work, policy.pair_points),
            MeldKind::Sets => count_sets(&mut work),
            MeldKind::Series => count_series(&mut work),
        };
    }

    if policy.trailing_pair_pass {
        total += count_pairs(&mut work, policy.pair_points);
    }

    total
}

/// Rearrange into the next lexicographic permutation.
/// Returns false (leaving the slice untouched) once the last one is reached.
fn next_permutation<T: Ord>(items: &mut [T]) -> bool {
    if items.len() < 2 {
        return false;
    }

    // Find the longest non-increasing suffix
    let mut i = items.len() - 1;
    while i > 0 && items[i - 1] >= items[i] {
        i -= 1;
    }
    if i == 0 {
        return false;
    }

    // Swap the pivot with the rightmost element greater than it
    let mut j = items.len() - 1;
    while items[j] <= items[i - 1] {
        j -= 1;
    }
    items.swap(i - 1, j);
    items[i..].reverse();
    true
}

/// Groups of identical natural tiles. Each group of two or more scores
/// according to `points` and gives up exactly two tiles.
fn count_pairs(work: &mut WorkingHand, points: PairPoints) -> u32 {
    let mut groups: BTreeMap<Tile, Vec<usize>> = BTreeMap::new();
    for i in work.free_indices() {
        let tile = work.tiles[i];
        if !tile.is_wild() {
            groups.entry(tile).or_default().push(i);
        }
    }

    let mut score = 0;
    for indices in groups.values() {
        if indices.len() >= 2 {
            score += points.points(indices.len());
            for &i in indices.iter().take(2) {
                work.consume(i);
            }
        }
    }
    score
}

/// For every value 1-13, one tile per color that is either that value or a
/// wildcard. Three or more colors make a set worth the number of colors.
fn count_sets(work: &mut WorkingHand) -> u32 {
    let mut colors: BTreeMap<Color, Vec<usize>> = BTreeMap::new();
    for i in work.free_indices() {
        colors.entry(work.tiles[i].color()).or_default().push(i);
    }

    let mut score = 0;
    for value in 1..=MAX_VALUE {
        let picks: Vec<usize> = colors
            .values()
            .filter_map(|indices| {
                indices.iter().copied().find(|&i| {
                    let tile = work.tiles[i];
                    work.is_free(i) && (tile.value() == value || tile.is_wild())
                })
            })
            .collect();

        if picks.len() >= 3 {
            score += picks.len() as u32;
            for i in picks {
                work.consume(i);
            }
        }
    }
    score
}

/// Runs in the free tiles sorted by (color, value). A tile extends the run
/// when it is the next value of the same color, or when it is a wildcard.
/// Runs of three or more score one point per tile.
fn count_series(work: &mut WorkingHand) -> u32 {
    let mut sorted = work.free_indices();
    sorted.sort_by_key(|&i| work.tiles[i]);

    let mut score = 0;
    let mut consecutive = 0;
    for pos in 1..sorted.len() {
        let prev = work.tiles[sorted[pos - 1]];
        let cur = work.tiles[sorted[pos]];
        if extends_run(&prev, &cur) {
            consecutive += 1;
        } else {
            if consecutive >= 2 {
                score += take_run(work, &sorted[pos - consecutive - 1..pos]);
            }
            consecutive = 0;
        }
    }

    if consecutive >= 2 {
        score += take_run(work, &sorted[sorted.len() - consecutive - 1..]);
    }
    score
}

fn extends_run(prev: &Tile, cur: &Tile) -> bool {
    cur.is_wild() || (cur.color() == prev.color() && cur.value() == prev.value() + 1)
}

fn take_run(work: &mut WorkingHand, run: &[usize]) -> u32 {
    for &i in run {
        work.consume(i);
    }
    run.len() as u32
}
