//! Repository interface for persisting games and guesses.

use chrono::NaiveDateTime;
use derive_getters::Getters;
use derive_new::new;

use crate::{Game, GameId, GameParams, Guess, Score, StoreError};

/// A game that has not been assigned an id yet.
#[derive(Debug, Clone, PartialEq, Eq, new, Getters)]
pub struct NewGame {
    secret: Vec<i32>,
    params: GameParams,
    started_at: NaiveDateTime,
}

/// A scored guess that has not been assigned an id yet.
#[derive(Debug, Clone, PartialEq, Eq, new, Getters)]
pub struct NewGuess {
    game_id: GameId,
    guess: Vec<i32>,
    score: Score,
    created_at: NaiveDateTime,
}

/// Persistence for [`Game`] and [`Guess`] records.
///
/// Implementations assign ids and keep guesses in insertion order.
pub trait GameStore: Send + Sync {
    /// Persists a new game in the STARTED state and returns it with its id.
    fn insert_game(&self, game: NewGame) -> Result<Game, StoreError>;

    /// Loads a game and its guesses. Returns `None` if no such game exists.
    fn find_game(&self, id: GameId) -> Result<Option<Game>, StoreError>;

    /// Persists `guess` together with the status, winner and finish time of
    /// `game` as one atomic write. `game` does not yet contain the guess.
    fn record_guess(&self, game: &Game, guess: NewGuess) -> Result<Guess, StoreError>;

    /// Deletes a game and all of its guesses. Returns false if it did not exist.
    fn delete_game(&self, id: GameId) -> Result<bool, StoreError>;
}
