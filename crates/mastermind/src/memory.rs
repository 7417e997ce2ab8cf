//! In-memory [`GameStore`], for tests and ephemeral servers.

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::{debug, info, instrument};

use crate::{Game, GameId, GameStatus, GameStore, Guess, GuessId, NewGame, NewGuess, StoreError};

#[derive(Debug, Default)]
struct Tables {
    games: BTreeMap<GameId, Game>,
    last_game_id: GameId,
    last_guess_id: GuessId,
}

/// Mutex-guarded game table with sequential ids starting at 1.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    tables: Mutex<Tables>,
}

impl InMemoryStore {
    /// Creates an empty store.
    #[instrument]
    pub fn new() -> Self {
        info!("Creating in-memory game store");
        Self::default()
    }

    /// Number of stored games.
    pub fn len(&self) -> usize {
        self.tables().games.len()
    }

    /// Returns true if no games are stored.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn tables(&self) -> MutexGuard<'_, Tables> {
        self.tables.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl GameStore for InMemoryStore {
    #[instrument(skip(self, game))]
    fn insert_game(&self, game: NewGame) -> Result<Game, StoreError> {
        let mut tables = self.tables();
        tables.last_game_id += 1;
        let id = tables.last_game_id;

        let game = Game::restore(
            id,
            game.secret().clone(),
            *game.params(),
            GameStatus::Started,
            None,
            *game.started_at(),
            None,
            Vec::new(),
        );
        tables.games.insert(id, game.clone());

        debug!(game_id = id, "Game stored");
        Ok(game)
    }

    #[instrument(skip(self))]
    fn find_game(&self, id: GameId) -> Result<Option<Game>, StoreError> {
        Ok(self.tables().games.get(&id).cloned())
    }

    #[instrument(skip(self, game, guess), fields(game_id = game.id()))]
    fn record_guess(&self, game: &Game, guess: NewGuess) -> Result<Guess, StoreError> {
        let mut tables = self.tables();
        if !tables.games.contains_key(game.id()) {
            return Err(StoreError::new(format!("Game {} does not exist", game.id())));
        }

        tables.last_guess_id += 1;
        let guess = Guess::restore(
            tables.last_guess_id,
            *guess.game_id(),
            guess.guess().clone(),
            *guess.score(),
            *guess.created_at(),
        );

        let mut stored = game.clone();
        stored.push_guess(guess.clone());
        tables.games.insert(*game.id(), stored);

        debug!(guess_id = guess.id(), "Guess stored");
        Ok(guess)
    }

    #[instrument(skip(self))]
    fn delete_game(&self, id: GameId) -> Result<bool, StoreError> {
        Ok(self.tables().games.remove(&id).is_some())
    }
}
