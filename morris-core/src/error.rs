//! Error types for the morris-core crate

use thiserror::Error;

use crate::{Player, StateCode};

/// Main error type for the morris-core crate
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    #[error("position {position} is out of bounds (must be 0-8)")]
    InvalidPosition { position: u8 },

    #[error("invalid move: position {position} is already occupied")]
    Occupied { position: u8 },

    #[error("game already over: {winner:?} has won")]
    GameOver { winner: Player },

    #[error("{player:?} cannot hold {count} pieces (at most 3)")]
    TooManyPieces { player: Player, count: usize },

    #[error("cannot undo {offset} move(s): {available} in history")]
    InvalidUndo { offset: usize, available: usize },

    #[error("code {code} does not describe a valid state: {reason}")]
    InvalidCode { code: u32, reason: &'static str },

    #[error("no score for state {code} in the value oracle")]
    MissingScore { code: StateCode },

    #[error("intelligence factor {value} must be within [0, 1]")]
    InvalidIntelligence { value: f64 },

    #[error("no candidate moves to select from")]
    NoCandidates,

    #[error("score table key '{key}' is not a state code")]
    InvalidTableKey { key: String },

    #[error("failed to {operation}: {source}")]
    Io {
        operation: String,
        #[source]
        source: std::io::Error,
    },

    #[error("score table error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Convenience type alias for Results using the crate's Error type
pub type Result<T> = std::result::Result<T, Error>;

impl From<std::io::Error> for Error {
    fn from(source: std::io::Error) -> Self {
        Error::Io {
            operation: "IO operation".to_string(),
            source,
        }
    }
}
