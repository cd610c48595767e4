//! WASM bindings for morris-core
//!
//! Provides a JavaScript-friendly API for the game logic.

use wasm_bindgen::prelude::*;

use crate::ai::{self, MoveScore};
use crate::{GameState, Player, Pos, ScoreTable, StateCode};

fn to_js_error(err: crate::Error) -> JsValue {
    JsValue::from_str(&err.to_string())
}

fn player_from_u8(value: u8) -> Option<Player> {
    match value {
        1 => Some(Player::X),
        2 => Some(Player::O),
        _ => None,
    }
}

fn player_to_u8(player: Option<Player>) -> u8 {
    match player {
        None => 0,
        Some(Player::X) => 1,
        Some(Player::O) => 2,
    }
}

/// WASM-friendly wrapper around GameState plus the score table used for
/// hints and the automated player.
#[wasm_bindgen]
pub struct WasmGame {
    inner: GameState,
    scores: ScoreTable,
}

#[wasm_bindgen]
impl WasmGame {
    /// Create a new game with an empty score table
    #[wasm_bindgen(constructor)]
    pub fn new() -> WasmGame {
        WasmGame {
            inner: GameState::new(),
            scores: ScoreTable::new(),
        }
    }

    /// Load the JSON score table. Returns the number of entries.
    #[wasm_bindgen(js_name = loadScores)]
    pub fn load_scores(&mut self, json: &str) -> Result<usize, JsValue> {
        self.scores = ScoreTable::from_json_str(json).map_err(to_js_error)?;
        Ok(self.scores.len())
    }

    /// State code of the current position
    pub fn code(&self) -> u32 {
        self.inner.encode().value()
    }

    /// Replace the current position with a decoded one (history is cleared)
    #[wasm_bindgen(js_name = loadCode)]
    pub fn load_code(&mut self, code: u32) -> Result<(), JsValue> {
        self.inner = GameState::decode(StateCode(code)).map_err(to_js_error)?;
        Ok(())
    }

    /// Whether X is to move
    #[wasm_bindgen(js_name = xNext)]
    pub fn x_next(&self) -> bool {
        self.inner.turn() == Player::X
    }

    /// X pieces, oldest first
    #[wasm_bindgen(js_name = xMoves)]
    pub fn x_moves(&self) -> Vec<u8> {
        self.inner.x_moves().iter().map(|pos| pos.0).collect()
    }

    /// O pieces, oldest first
    #[wasm_bindgen(js_name = oMoves)]
    pub fn o_moves(&self) -> Vec<u8> {
        self.inner.o_moves().iter().map(|pos| pos.0).collect()
    }

    /// Winner: 0 (none), 1 (X), or 2 (O)
    pub fn winner(&self) -> u8 {
        player_to_u8(self.inner.winner())
    }

    /// Winning line positions, empty if no winner
    #[wasm_bindgen(js_name = winningLine)]
    pub fn winning_line(&self) -> Vec<u8> {
        self.inner
            .winning_line()
            .map(|line| line.iter().map(|pos| pos.0).collect())
            .unwrap_or_default()
    }

    /// Piece the player (1 = X, 2 = O) loses on their next placement, or -1
    #[wasm_bindgen(js_name = pieceToEvict)]
    pub fn piece_to_evict(&self, player: u8) -> i32 {
        player_from_u8(player)
            .and_then(|p| self.inner.piece_to_evict(p))
            .map(|pos| pos.0 as i32)
            .unwrap_or(-1)
    }

    #[wasm_bindgen(js_name = isOccupied)]
    pub fn is_occupied(&self, position: u8) -> bool {
        self.inner.is_occupied(Pos(position))
    }

    /// Place the current player's piece. Returns true if successful.
    #[wasm_bindgen(js_name = applyMove)]
    pub fn apply_move(&mut self, position: u8) -> bool {
        match self.inner.play(Pos(position)) {
            Ok(next) => {
                self.inner = next;
                true
            }
            Err(_) => false,
        }
    }

    /// Roll back `offset` moves. Returns true if successful.
    pub fn undo(&mut self, offset: usize) -> bool {
        match self.inner.undo(offset) {
            Ok(previous) => {
                self.inner = previous;
                true
            }
            Err(_) => false,
        }
    }

    pub fn reset(&mut self) {
        self.inner = GameState::reset();
    }

    #[wasm_bindgen(js_name = historyLength)]
    pub fn history_length(&self) -> usize {
        self.inner.history().len()
    }

    /// Ranked moves as JSON array of { position, score }
    #[wasm_bindgen(js_name = rankMoves)]
    pub fn rank_moves(&self) -> Result<JsValue, JsValue> {
        let moves: Vec<MoveScore> =
            ai::rank_moves(&self.inner, &self.scores).map_err(to_js_error)?;
        serde_wasm_bindgen::to_value(&moves).map_err(JsValue::from)
    }

    /// Pick the automated player's move. `draw` is a uniform number in
    /// [0, 1), e.g. from Math.random(). Returns the chosen position.
    #[wasm_bindgen(js_name = selectMove)]
    pub fn select_move(&self, intelligence: f64, draw: f64) -> Result<u8, JsValue> {
        let moves = ai::rank_moves(&self.inner, &self.scores).map_err(to_js_error)?;
        let probabilities =
            ai::move_distribution(&moves, self.inner.turn(), intelligence).map_err(to_js_error)?;
        ai::sample_index(&probabilities, draw)
            .map(|index| moves[index].position.0)
            .ok_or_else(|| to_js_error(crate::Error::NoCandidates))
    }

    /// Whether the automated player (1 = X, 2 = O, 0 = none) is to move
    #[wasm_bindgen(js_name = isAiTurn)]
    pub fn is_ai_turn(&self, ai_player: u8) -> bool {
        ai::is_ai_turn(&self.inner, player_from_u8(ai_player))
    }

    /// Text rendering of the board
    pub fn render(&self) -> String {
        self.inner.to_string()
    }
}

impl Default for WasmGame {
    fn default() -> Self {
        Self::new()
    }
}
