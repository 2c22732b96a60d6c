use crate::deck::DeckTile;
use crate::round::{Round, RoundConfig};
use crate::scoring::{ScoringPolicy, score_hand_with_policy};
use crate::{Hand, Tile};
use serde::{Deserialize, Serialize};
use wasm_bindgen::prelude::*;

/// Initialize panic hook for better error messages in the browser console
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
}

/// JSON-serializable result for one seat
#[derive(Serialize, Deserialize)]
pub struct PlayerJson {
    pub seat: usize,
    pub tiles: Vec<String>,
    pub score: u32,
}

/// Result of `play_round`
#[derive(Serialize, Deserialize)]
pub struct RoundResult {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub indicator: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub joker: Option<String>,
    pub players: Vec<PlayerJson>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub best_score: Option<u32>,
    pub winners: Vec<usize>,
    /// Time spent dealing and scoring, in milliseconds
    pub elapsed_ms: f64,
}

impl RoundResult {
    fn failure(error: String) -> Self {
        RoundResult {
            success: false,
            error: Some(error),
            seed: None,
            indicator: None,
            joker: None,
            players: Vec::new(),
            best_score: None,
            winners: Vec::new(),
            elapsed_ms: 0.0,
        }
    }
}

/// Result of `score_hand_json`
#[derive(Serialize, Deserialize)]
pub struct HandScoreResult {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// The hand as scored: sorted, with wildcards marked
    pub tiles: Vec<String>,
    pub score: u32,
}

/// Deal and score one round
///
/// # Arguments
/// * `config_json` - JSON round config (e.g., {"seed": 42, "players": 4}); empty for defaults
///
/// # Returns
/// JSON string with RoundResult
#[wasm_bindgen]
pub fn play_round(config_json: &str) -> String {
    let result = play_round_internal(config_json).unwrap_or_else(RoundResult::failure);
    serde_json::to_string(&result)
        .unwrap_or_else(|e| format!(r#"{{"success":false,"error":"Serialization error: {}"}}"#, e))
}

fn play_round_internal(config_json: &str) -> Result<RoundResult, String> {
    let config: RoundConfig = if config_json.trim().is_empty() {
        RoundConfig::default()
    } else {
        serde_json::from_str(config_json).map_err(|e| format!("Invalid config JSON: {}", e))?
    };

    let started = now_ms();
    let round = Round::deal(&config).map_err(|e| e.to_string())?;
    let report = round.score();
    let elapsed_ms = now_ms() - started;

    Ok(RoundResult {
        success: true,
        error: None,
        seed: Some(report.seed),
        indicator: Some(report.indicator.to_string()),
        joker: Some(report.joker.to_string()),
        players: report
            .players
            .iter()
            .map(|p| PlayerJson {
                seat: p.seat,
                tiles: p.hand.iter().map(|t| t.to_string()).collect(),
                score: p.score,
            })
            .collect(),
        best_score: report.best_score,
        winners: report.winners,
        elapsed_ms,
    })
}

/// Score a single hand against a joker
///
/// # Arguments
/// * `hand_tiles` - JSON array of tile strings (e.g., ["r1", "r2", "j"]); "j" is a placeholder
/// * `joker` - the joker tile (e.g., "y5")
///
/// # Returns
/// JSON string with HandScoreResult
#[wasm_bindgen]
pub fn score_hand_json(hand_tiles: &str, joker: &str) -> String {
    let result = score_hand_internal(hand_tiles, joker).unwrap_or_else(|e| HandScoreResult {
        success: false,
        error: Some(e),
        tiles: Vec::new(),
        score: 0,
    });
    serde_json::to_string(&result)
        .unwrap_or_else(|e| format!(r#"{{"success":false,"error":"Serialization error: {}"}}"#, e))
}

fn score_hand_internal(hand_tiles: &str, joker: &str) -> Result<HandScoreResult, String> {
    let tile_strs: Vec<String> =
        serde_json::from_str(hand_tiles).map_err(|e| format!("Invalid hand JSON: {}", e))?;
    let joker = Tile::from_string(joker).map_err(|e| e.to_string())?;

    let tiles = tile_strs
        .iter()
        .map(|s| DeckTile::from_string(s))
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| e.to_string())?;
    let hand = Hand::dealt(tiles, &joker);

    Ok(HandScoreResult {
        success: true,
        error: None,
        tiles: hand.iter().map(|t| t.to_string()).collect(),
        score: score_hand_with_policy(&hand, ScoringPolicy::OBSERVED),
    })
}

fn now_ms() -> f64 {
    web_sys::window()
        .and_then(|w| w.performance())
        .map(|p| p.now())
        .unwrap_or_else(js_sys::Date::now)
}

/// Get the git commit hash that this WASM module was built from
///
/// Returns the first 8 characters of the commit hash, or "unknown" if not available
#[wasm_bindgen]
pub fn get_build_commit() -> String {
    env!("BUILD_COMMIT").to_string()
}
