//! REST API over the Mastermind service.
//!
//! Routes:
//! - `POST /new-game` with optional `num_holes`, `num_colors`, `max_guesses`
//! - `GET /game/{id}`
//! - `POST /game/{id}/guess` with `{"guess": [..]}`
//!
//! Errors, including unsupported methods and malformed ids, are returned as
//! `{"error": "..."}`.

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::rejection::PathRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use derive_more::{Display, Error, From};
use mastermind::{GameError, GameId, GameParams, GameView, GuessView, Mastermind};
use serde::de::{DeserializeOwned, Error as _};
use serde::{Deserialize, Deserializer, Serialize};
use tracing::{error, info, instrument, warn};

use crate::config::DEFAULT_MAX_HOLES;

/// Body of `POST /new-game`. Missing fields take the server defaults.
///
/// Each field also accepts a float (truncated toward zero) or a string holding
/// an integer, so `4`, `4.0` and `"4"` all mean four.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateGameRequest {
    /// Number of holes.
    #[serde(default, deserialize_with = "loose_int")]
    pub num_holes: Option<i32>,
    /// Number of colors.
    #[serde(default, deserialize_with = "loose_int")]
    pub num_colors: Option<i32>,
    /// Guess limit.
    #[serde(default, deserialize_with = "loose_int")]
    pub max_guesses: Option<i32>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum LooseInt {
    Int(i64),
    Float(f64),
    Text(String),
}

fn loose_int<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<i32>, D::Error> {
    let value = match LooseInt::deserialize(deserializer)? {
        LooseInt::Int(n) => n,
        // saturates; out-of-range values fail below
        LooseInt::Float(f) => f.trunc() as i64,
        LooseInt::Text(text) => text
            .trim()
            .parse()
            .map_err(|_| D::Error::custom(format!("'{}' is not an integer", text)))?,
    };
    i32::try_from(value)
        .map(Some)
        .map_err(|_| D::Error::custom(format!("{} is out of range", value)))
}

impl CreateGameRequest {
    /// Fills missing fields from `defaults`.
    pub fn resolve(&self, defaults: GameParams) -> GameParams {
        GameParams::new(
            self.num_holes.unwrap_or(*defaults.num_holes()),
            self.num_colors.unwrap_or(*defaults.num_colors()),
            self.max_guesses.unwrap_or(*defaults.max_guesses()),
        )
    }
}

/// Response of `POST /new-game`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatedResponse {
    /// Id of the new game.
    pub id: GameId,
}

/// Body of `POST /game/{id}/guess`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuessRequest {
    /// Guessed colors, one per hole.
    pub guess: Vec<i32>,
}

/// Response of `POST /game/{id}/guess`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuessResponse {
    /// The scored guess.
    pub guess: GuessView,
    /// The game after the guess.
    pub game: GameView,
}

/// Error body for every failed request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Human-readable description.
    pub error: String,
}

/// Failure of an API request.
#[derive(Debug, Display, Error, From)]
pub enum ApiError {
    /// Body was not the expected JSON.
    #[display("Invalid payload format: {}", _0)]
    InvalidPayload(#[error(not(source))] String),

    /// No game with this id.
    #[display("Game {} not found", _0)]
    NotFound(#[error(not(source))] GameId),

    /// The game layer rejected the request.
    #[display("{}", _0)]
    #[from]
    Game(GameError),

    /// The route exists but not for this HTTP method.
    #[display("Method not allowed")]
    MethodNotAllowed,

    /// The worker running the request failed.
    #[display("Request worker failed: {}", _0)]
    Worker(#[error(not(source))] String),
}

impl ApiError {
    /// HTTP status for this error.
    pub fn status(&self) -> StatusCode {
        match self {
            Self::InvalidPayload(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            Self::Game(GameError::InvalidGameParameter(_) | GameError::InvalidGuess(_)) => {
                StatusCode::BAD_REQUEST
            }
            Self::Game(GameError::GameFinished(_)) => StatusCode::CONFLICT,
            Self::Game(GameError::InvalidSecret(_) | GameError::Store(_)) | Self::Worker(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = if status.is_server_error() {
            error!(error = %self, "Request failed");
            "Internal server error".to_string()
        } else {
            warn!(error = %self, %status, "Request rejected");
            self.to_string()
        };
        (status, Json(ErrorResponse { error: message })).into_response()
    }
}

/// Shared state of the request handlers.
#[derive(Debug, Clone)]
pub struct AppState {
    service: Arc<Mastermind>,
    defaults: GameParams,
    max_holes: i32,
}

impl AppState {
    /// Creates handler state around a service.
    pub fn new(service: Arc<Mastermind>, defaults: GameParams) -> Self {
        Self {
            service,
            defaults,
            max_holes: DEFAULT_MAX_HOLES,
        }
    }

    /// Caps the number of holes a create request may ask for.
    pub fn with_max_holes(mut self, max_holes: i32) -> Self {
        self.max_holes = max_holes;
        self
    }

    fn check_limits(&self, params: &GameParams) -> Result<(), ApiError> {
        if *params.num_holes() > self.max_holes {
            return Err(GameError::InvalidGameParameter(format!(
                "Number of holes must be at most {}",
                self.max_holes
            ))
            .into());
        }
        Ok(())
    }

    /// Runs blocking game work off the async executor.
    async fn run<T, F>(&self, work: F) -> Result<T, ApiError>
    where
        T: Send + 'static,
        F: FnOnce(&Mastermind) -> Result<T, ApiError> + Send + 'static,
    {
        let service = Arc::clone(&self.service);
        tokio::task::spawn_blocking(move || work(&service))
            .await
            .map_err(|e| ApiError::Worker(e.to_string()))?
    }
}

/// Builds the API router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/new-game", post(create_game))
        .route("/game/{id}", get(game_detail))
        .route("/game/{id}/guess", post(submit_guess))
        .method_not_allowed_fallback(method_not_allowed)
        .with_state(state)
}

fn parse_body<T: DeserializeOwned>(body: &Bytes) -> Result<T, ApiError> {
    serde_json::from_slice(body).map_err(|e| ApiError::InvalidPayload(e.to_string()))
}

fn game_id(path: Result<Path<GameId>, PathRejection>) -> Result<GameId, ApiError> {
    path.map(|Path(id)| id)
        .map_err(|e| ApiError::InvalidPayload(e.body_text()))
}

async fn method_not_allowed() -> ApiError {
    ApiError::MethodNotAllowed
}

#[instrument(skip(state, body))]
async fn create_game(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<CreatedResponse>, ApiError> {
    let request: CreateGameRequest = parse_body(&body)?;
    let params = request.resolve(state.defaults);
    state.check_limits(&params)?;

    let game = state
        .run(move |service| Ok(service.create_game(params)?))
        .await?;

    info!(game_id = game.id(), "Game created via API");
    Ok(Json(CreatedResponse { id: *game.id() }))
}

#[instrument(skip(state))]
async fn game_detail(
    State(state): State<AppState>,
    path: Result<Path<GameId>, PathRejection>,
) -> Result<Json<GameView>, ApiError> {
    let id = game_id(path)?;
    let game = state
        .run(move |service| service.get_game(id)?.ok_or(ApiError::NotFound(id)))
        .await?;
    Ok(Json(game.view()))
}

#[instrument(skip(state, body))]
async fn submit_guess(
    State(state): State<AppState>,
    path: Result<Path<GameId>, PathRejection>,
    body: Bytes,
) -> Result<Json<GuessResponse>, ApiError> {
    let id = game_id(path)?;
    let request: GuessRequest = parse_body(&body)?;

    let (guess, game) = state
        .run(move |service| {
            let mut game = service.get_game(id)?.ok_or(ApiError::NotFound(id))?;
            let guess = service.submit_guess(&mut game, &request.guess)?;
            Ok((guess, game))
        })
        .await?;

    info!(game_id = id, guess_id = guess.id(), status = %game.status(), "Guess submitted via API");
    Ok(Json(GuessResponse {
        guess: GuessView::from(&guess),
        game: game.view(),
    }))
}
