//! Error types for game operations and storage.

use derive_more::{Display, Error, From};
use tracing::instrument;

use crate::GameId;

/// Error raised by a [`GameStore`](crate::GameStore) implementation.
#[derive(Debug, Clone, PartialEq, Eq, Display, Error)]
#[display("Store error: {} at {}:{}", message, file, line)]
pub struct StoreError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl StoreError {
    /// Creates a new store error with caller location tracking.
    #[track_caller]
    #[instrument(skip(message))]
    pub fn new(message: impl Into<String>) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message: message.into(),
            line: loc.line(),
            file: loc.file(),
        }
    }
}

/// Error that can occur while creating a game or submitting a guess.
///
/// Every variant is local to one operation: validation runs before any
/// write, so a failed call leaves persisted state untouched.
#[derive(Debug, Clone, PartialEq, Eq, Display, Error, From)]
pub enum GameError {
    /// Holes, colors or max guesses was not a positive integer.
    #[display("Invalid game parameter: {}", _0)]
    InvalidGameParameter(#[error(not(source))] String),

    /// The game already reached its terminal state.
    #[display("Game {} is already finished", _0)]
    GameFinished(#[error(not(source))] GameId),

    /// Wrong length or a color outside `0..num_colors`.
    #[display("Invalid guess: {}", _0)]
    InvalidGuess(#[error(not(source))] String),

    /// The secret source produced a code that does not fit the game.
    #[display("Invalid secret: {}", _0)]
    InvalidSecret(#[error(not(source))] String),

    /// The underlying store failed.
    #[display("{}", _0)]
    #[from]
    Store(StoreError),
}
