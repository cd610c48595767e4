//! HTTP handlers and JSON models.

use std::sync::{Arc, Mutex};

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use morris_core::ai::MoveScore;
use morris_core::{GameState, Oracle, Player, Pos, StateCode};

use crate::session::{Session, SessionError, Settings};
use crate::tablebase::Scores;

/// Shared application state
pub struct AppStateInner {
    pub session: Mutex<Session>,
    pub scores: Option<Scores>,
}

pub type AppState = Arc<AppStateInner>;

// =============================================================================
// Errors
// =============================================================================

#[derive(Serialize)]
pub struct ErrorModel {
    detail: String,
}

pub enum ApiError {
    Session(SessionError),
    NoScores,
}

impl From<SessionError> for ApiError {
    fn from(err: SessionError) -> Self {
        ApiError::Session(err)
    }
}

impl From<morris_core::Error> for ApiError {
    fn from(err: morris_core::Error) -> Self {
        ApiError::Session(SessionError::Game(err))
    }
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::NoScores => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Session(SessionError::Stale { .. }) => StatusCode::CONFLICT,
            ApiError::Session(SessionError::Game(morris_core::Error::MissingScore { .. })) => {
                StatusCode::NOT_FOUND
            }
            ApiError::Session(_) => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let detail = match &self {
            ApiError::NoScores => "No score table loaded".to_string(),
            ApiError::Session(err) => err.to_string(),
        };
        if status.is_server_error() {
            tracing::warn!(%status, %detail, "request failed");
        } else {
            tracing::debug!(%status, %detail, "request rejected");
        }
        (status, Json(ErrorModel { detail })).into_response()
    }
}

type ApiResult<T> = Result<Json<T>, ApiError>;

// =============================================================================
// JSON Models
// =============================================================================

#[derive(Serialize)]
pub struct GameStateModel {
    /// Rows of the board, each cell "X", "O" or null
    board: Vec<Vec<Option<Player>>>,
    x_moves: Vec<u8>,
    o_moves: Vec<u8>,
    current_player: Player,
    winner: Option<Player>,
    /// The winning line positions, if there's a winner
    #[serde(skip_serializing_if = "Option::is_none")]
    winning_line: Option<Vec<u8>>,
    /// Piece the player to move loses with their next placement
    #[serde(skip_serializing_if = "Option::is_none")]
    piece_to_delete: Option<u8>,
    encoding: StateCode,
    history_length: usize,
    can_undo: bool,
    ai_turn: bool,
}

#[derive(Deserialize)]
pub struct MoveRequest {
    position: u8,
}

#[derive(Deserialize, Default)]
#[serde(default)]
pub struct AiMoveRequest {
    expected_encoding: Option<StateCode>,
}

#[derive(Serialize)]
pub struct AiMoveModel {
    #[serde(rename = "move")]
    choice: MoveScore,
    game: GameStateModel,
}

#[derive(Deserialize, Default)]
#[serde(default)]
pub struct UndoRequest {
    offset: Option<usize>,
}

#[derive(Serialize)]
pub struct StateExportModel {
    encoding: StateCode,
}

#[derive(Deserialize)]
pub struct StateImportRequest {
    encoding: StateCode,
}

#[derive(Deserialize)]
pub struct BatchLookupRequest {
    codes: Vec<StateCode>,
}

#[derive(Serialize)]
pub struct BatchLookupResponse {
    scores: Vec<Option<f64>>,
}

#[derive(Serialize)]
pub struct HealthModel {
    status: String,
    scores_loaded: bool,
}

/// Convert the session's game to its JSON model
fn game_to_model(session: &Session) -> GameStateModel {
    let game: &GameState = session.game();
    let board = (0..3)
        .map(|row| {
            (0..3)
                .map(|col| game.occupant(Pos::from_row_col(row, col)))
                .collect()
        })
        .collect();

    let piece_to_delete = if session.settings().highlight_move_to_delete {
        game.piece_to_evict(game.turn()).map(|pos| pos.0)
    } else {
        None
    };

    GameStateModel {
        board,
        x_moves: game.x_moves().iter().map(|pos| pos.0).collect(),
        o_moves: game.o_moves().iter().map(|pos| pos.0).collect(),
        current_player: game.turn(),
        winner: game.winner(),
        winning_line: game
            .winning_line()
            .map(|line| line.iter().map(|pos| pos.0).collect()),
        piece_to_delete,
        encoding: game.encode(),
        history_length: game.history().len(),
        can_undo: game.can_undo(1),
        ai_turn: session.is_ai_turn(),
    }
}

fn scores(state: &AppState) -> Result<&Scores, ApiError> {
    state.scores.as_ref().ok_or(ApiError::NoScores)
}

// =============================================================================
// API Endpoints
// =============================================================================

async fn get_game(State(state): State<AppState>) -> Json<GameStateModel> {
    let session = state.session.lock().unwrap();
    Json(game_to_model(&session))
}

async fn get_moves(State(state): State<AppState>) -> ApiResult<Vec<MoveScore>> {
    let scores = scores(&state)?;
    let session = state.session.lock().unwrap();
    Ok(Json(session.hints(scores)?))
}

async fn make_move(
    State(state): State<AppState>,
    Json(req): Json<MoveRequest>,
) -> ApiResult<GameStateModel> {
    let mut session = state.session.lock().unwrap();
    session.play(Pos::new(req.position)?)?;
    tracing::info!(position = req.position, encoding = %session.game().encode(), "move");
    Ok(Json(game_to_model(&session)))
}

async fn ai_move(
    State(state): State<AppState>,
    req: Option<Json<AiMoveRequest>>,
) -> ApiResult<AiMoveModel> {
    let scores = scores(&state)?;
    let req = req.map(|Json(req)| req).unwrap_or_default();
    let mut session = state.session.lock().unwrap();
    let choice = session.ai_move(scores, req.expected_encoding, &mut rand::rng())?;
    tracing::info!(
        position = choice.position.0,
        score = choice.score,
        encoding = %session.game().encode(),
        "computer move"
    );
    Ok(Json(AiMoveModel {
        choice,
        game: game_to_model(&session),
    }))
}

async fn undo(
    State(state): State<AppState>,
    req: Option<Json<UndoRequest>>,
) -> ApiResult<GameStateModel> {
    let req = req.map(|Json(req)| req).unwrap_or_default();
    let mut session = state.session.lock().unwrap();
    session.undo(req.offset)?;
    Ok(Json(game_to_model(&session)))
}

async fn reset_game(State(state): State<AppState>) -> Json<GameStateModel> {
    let mut session = state.session.lock().unwrap();
    session.reset();
    Json(game_to_model(&session))
}

async fn get_settings(State(state): State<AppState>) -> Json<Settings> {
    let session = state.session.lock().unwrap();
    Json(session.settings().clone())
}

async fn put_settings(
    State(state): State<AppState>,
    Json(settings): Json<Settings>,
) -> ApiResult<Settings> {
    let mut session = state.session.lock().unwrap();
    let settings = session.update_settings(settings)?.clone();
    tracing::info!(?settings, "settings updated");
    Ok(Json(settings))
}

async fn export_state(State(state): State<AppState>) -> Json<StateExportModel> {
    let session = state.session.lock().unwrap();
    Json(StateExportModel {
        encoding: session.game().encode(),
    })
}

async fn import_state(
    State(state): State<AppState>,
    Json(req): Json<StateImportRequest>,
) -> ApiResult<GameStateModel> {
    let mut session = state.session.lock().unwrap();
    session.import(req.encoding)?;
    Ok(Json(game_to_model(&session)))
}

async fn lookup_batch(
    State(state): State<AppState>,
    Json(request): Json<BatchLookupRequest>,
) -> ApiResult<BatchLookupResponse> {
    let scores = scores(&state)?;
    let results = request.codes.iter().map(|&code| scores.score(code)).collect();
    Ok(Json(BatchLookupResponse { scores: results }))
}

async fn health(State(state): State<AppState>) -> Json<HealthModel> {
    Json(HealthModel {
        status: "ok".to_string(),
        scores_loaded: state.scores.is_some(),
    })
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/game", get(get_game))
        .route("/moves", get(get_moves))
        .route("/move", post(make_move))
        .route("/ai-move", post(ai_move))
        .route("/undo", post(undo))
        .route("/reset", post(reset_game))
        .route("/settings", get(get_settings).put(put_settings))
        .route("/state/export", get(export_state))
        .route("/state/import", post(import_state))
        .route("/lookup/batch", post(lookup_batch))
        .route("/health", get(health))
        .with_state(state)
}
