//! The single game session served by the API.

use morris_core::ai::{self, MoveScore};
use morris_core::{GameState, Oracle, Player, Pos, StateCode};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Largest value of `ai_intelligence`.
pub const MAX_INTELLIGENCE: u8 = 100;

/// Player-facing settings. Missing fields take their defaults.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Side played by the computer, or null for two humans
    pub ai_player: Option<Player>,
    /// 0 plays almost at random, 100 plays the best move
    pub ai_intelligence: u8,
    /// How long the UI waits before asking for the computer's move
    pub ai_response_delay_secs: u32,
    pub show_hints: bool,
    pub highlight_move_to_delete: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            ai_player: Some(Player::O),
            ai_intelligence: MAX_INTELLIGENCE,
            ai_response_delay_secs: 2,
            show_hints: false,
            highlight_move_to_delete: true,
        }
    }
}

impl Settings {
    /// Intelligence factor in [0, 1].
    pub fn intelligence(&self) -> f64 {
        f64::from(self.ai_intelligence) / f64::from(MAX_INTELLIGENCE)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error(transparent)]
    Game(#[from] morris_core::Error),

    #[error("state changed: expected {expected}, current {current}")]
    Stale {
        expected: StateCode,
        current: StateCode,
    },

    #[error("ai_intelligence must be at most 100, got {0}")]
    InvalidSettings(u8),
}

pub type SessionResult<T> = std::result::Result<T, SessionError>;

/// Current game plus settings.
#[derive(Debug, Default)]
pub struct Session {
    game: GameState,
    settings: Settings,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn game(&self) -> &GameState {
        &self.game
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn update_settings(&mut self, settings: Settings) -> SessionResult<&Settings> {
        if settings.ai_intelligence > MAX_INTELLIGENCE {
            return Err(SessionError::InvalidSettings(settings.ai_intelligence));
        }
        self.settings = settings;
        Ok(&self.settings)
    }

    pub fn is_ai_turn(&self) -> bool {
        !self.game.is_over() && ai::is_ai_turn(&self.game, self.settings.ai_player)
    }

    pub fn play(&mut self, pos: Pos) -> SessionResult<&GameState> {
        self.game = self.game.play(pos)?;
        Ok(&self.game)
    }

    /// Offset used when the caller does not give one.
    ///
    /// Against the computer, undo takes back the computer's reply together
    /// with the player's own move.
    pub fn default_undo_offset(&self) -> usize {
        if self.settings.ai_player.is_some() && self.game.history().len() >= 2 {
            2
        } else {
            1
        }
    }

    pub fn undo(&mut self, offset: Option<usize>) -> SessionResult<&GameState> {
        let offset = offset.unwrap_or_else(|| self.default_undo_offset());
        self.game = self.game.undo(offset)?;
        Ok(&self.game)
    }

    pub fn reset(&mut self) -> &GameState {
        self.game = GameState::reset();
        &self.game
    }

    /// Replace the game with a decoded state. History starts empty.
    pub fn import(&mut self, code: StateCode) -> SessionResult<&GameState> {
        self.game = GameState::decode(code)?;
        Ok(&self.game)
    }

    /// Ranked moves for the player to move; empty once the game is over.
    pub fn hints<O: Oracle + ?Sized>(&self, oracle: &O) -> SessionResult<Vec<MoveScore>> {
        if self.game.is_over() {
            return Ok(Vec::new());
        }
        Ok(ai::rank_moves(&self.game, oracle)?)
    }

    /// Pick and play the computer's move.
    ///
    /// With `expected` set, the move is only made if the game is still in
    /// that state. The UI sends the code it saw when it started waiting, so
    /// an undo or reset in the meantime cancels the move.
    pub fn ai_move<O: Oracle + ?Sized, R: Rng + ?Sized>(
        &mut self,
        oracle: &O,
        expected: Option<StateCode>,
        rng: &mut R,
    ) -> SessionResult<MoveScore> {
        let current = self.game.encode();
        if let Some(expected) = expected {
            if expected != current {
                return Err(SessionError::Stale { expected, current });
            }
        }
        let choice = ai::choose_move(&self.game, oracle, self.settings.intelligence(), rng)?;
        self.game = self.game.play(choice.position)?;
        Ok(choice)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use morris_core::oracle::FnOracle;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn flat() -> FnOracle<impl Fn(StateCode) -> Option<f64>> {
        FnOracle(|_| Some(0.0))
    }

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.ai_player, Some(Player::O));
        assert_eq!(settings.ai_intelligence, 100);
        assert_eq!(settings.intelligence(), 1.0);
        assert!(!settings.show_hints);
        assert!(settings.highlight_move_to_delete);
    }

    #[test]
    fn test_settings_partial_json() {
        let settings: Settings =
            serde_json::from_str(r#"{"ai_player": null, "show_hints": true}"#).unwrap();
        assert_eq!(settings.ai_player, None);
        assert!(settings.show_hints);
        assert_eq!(settings.ai_response_delay_secs, 2);

        let settings: Settings = serde_json::from_str(r#"{"ai_player": "X"}"#).unwrap();
        assert_eq!(settings.ai_player, Some(Player::X));
    }

    #[test]
    fn test_settings_validation() {
        let mut session = Session::new();
        let bad = Settings {
            ai_intelligence: 101,
            ..Settings::default()
        };
        assert!(matches!(
            session.update_settings(bad),
            Err(SessionError::InvalidSettings(101))
        ));
        assert_eq!(session.settings(), &Settings::default());
    }

    #[test]
    fn test_undo_offset_with_computer() {
        let mut session = Session::new();
        session.play(Pos(4)).unwrap();
        // One move in the history: only one can be taken back.
        assert_eq!(session.default_undo_offset(), 1);

        session.play(Pos(0)).unwrap();
        assert_eq!(session.default_undo_offset(), 2);
        session.undo(None).unwrap();
        assert_eq!(session.game(), &GameState::new());
    }

    #[test]
    fn test_undo_offset_two_humans() {
        let mut session = Session::new();
        session
            .update_settings(Settings {
                ai_player: None,
                ..Settings::default()
            })
            .unwrap();
        session.play(Pos(4)).unwrap();
        session.play(Pos(0)).unwrap();
        assert_eq!(session.default_undo_offset(), 1);
        session.undo(None).unwrap();
        assert_eq!(session.game().history().len(), 1);
        assert_eq!(session.game().turn(), Player::O);
    }

    #[test]
    fn test_undo_too_far() {
        let mut session = Session::new();
        assert!(matches!(
            session.undo(None),
            Err(SessionError::Game(morris_core::Error::InvalidUndo { .. }))
        ));
    }

    #[test]
    fn test_ai_move() {
        let mut session = Session::new();
        let mut rng = StdRng::seed_from_u64(5);
        session.play(Pos(4)).unwrap();
        assert!(session.is_ai_turn());

        let expected = session.game().encode();
        let choice = session.ai_move(&flat(), Some(expected), &mut rng).unwrap();
        assert_eq!(session.game().o_moves().as_slice(), &[choice.position]);
        assert!(!session.is_ai_turn());
    }

    #[test]
    fn test_stale_ai_move_rejected() {
        let mut session = Session::new();
        let mut rng = StdRng::seed_from_u64(5);
        session.play(Pos(4)).unwrap();
        let seen = session.game().encode();

        // The player takes the move back while the computer is thinking.
        session.undo(Some(1)).unwrap();
        let before = session.game().clone();

        let err = session.ai_move(&flat(), Some(seen), &mut rng).unwrap_err();
        assert!(matches!(err, SessionError::Stale { expected, .. } if expected == seen));
        assert_eq!(session.game(), &before);
    }

    #[test]
    fn test_ai_move_missing_score() {
        let mut session = Session::new();
        let mut rng = StdRng::seed_from_u64(5);
        let empty = FnOracle(|_: StateCode| None);
        assert!(matches!(
            session.ai_move(&empty, None, &mut rng),
            Err(SessionError::Game(morris_core::Error::MissingScore { .. }))
        ));
        assert_eq!(session.game(), &GameState::new());
    }

    #[test]
    fn test_hints_after_game_over() {
        let mut session = Session::new();
        // X holds the top row.
        session.import(StateCode(321)).unwrap();
        assert!(session.game().is_over());
        assert!(session.hints(&flat()).unwrap().is_empty());
        assert!(!session.is_ai_turn());
    }

    #[test]
    fn test_import_rejects_bad_code() {
        let mut session = Session::new();
        assert!(session.import(StateCode(2_000_000)).is_err());
        assert_eq!(session.game(), &GameState::new());
    }
}
