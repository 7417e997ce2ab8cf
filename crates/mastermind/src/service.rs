//! Game state machine driver: creation, lookup and guess submission.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, info, instrument, warn};

use crate::{
    Clock, Game, GameError, GameId, GameParams, GameStore, Guess, NewGame, NewGuess, RandomSecret,
    SecretSource, SystemClock, score,
};

/// Runs Mastermind games against a [`GameStore`].
///
/// Guesses against the same game are serialized through a per-game lock, so
/// the guess count used for the exhaustion check can never race.
pub struct Mastermind {
    store: Arc<dyn GameStore>,
    clock: Arc<dyn Clock>,
    secrets: Mutex<Box<dyn SecretSource>>,
    locks: Mutex<HashMap<GameId, Arc<Mutex<()>>>>,
}

impl std::fmt::Debug for Mastermind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Mastermind")
            .field("locked_games", &self.locks().len())
            .finish_non_exhaustive()
    }
}

impl Mastermind {
    /// Creates a service with the system clock and random secrets.
    #[instrument(skip(store))]
    pub fn new(store: Arc<dyn GameStore>) -> Self {
        info!("Creating Mastermind service");
        Self {
            store,
            clock: Arc::new(SystemClock),
            secrets: Mutex::new(Box::new(RandomSecret::new())),
            locks: Mutex::new(HashMap::new()),
        }
    }

    /// Replaces the time source.
    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    /// Replaces the secret generator.
    pub fn with_secret_source(mut self, source: impl SecretSource + 'static) -> Self {
        self.secrets = Mutex::new(Box::new(source));
        self
    }

    /// Returns the underlying store.
    pub fn store(&self) -> &Arc<dyn GameStore> {
        &self.store
    }

    /// Creates and persists a game with a freshly drawn secret.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::InvalidGameParameter`] if any parameter is not
    /// positive, [`GameError::InvalidSecret`] if the secret source hands out a
    /// code that does not fit `params` (nothing is persisted in either case),
    /// or [`GameError::Store`].
    #[instrument(skip(self))]
    pub fn create_game(&self, params: GameParams) -> Result<Game, GameError> {
        params.validate()?;

        let num_holes = params.num_holes().unsigned_abs() as usize;
        let secret = self
            .secrets
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .draw(num_holes, *params.num_colors());
        check_secret(&secret, &params)?;

        let game = self
            .store
            .insert_game(NewGame::new(secret, params, self.clock.now()))?;

        info!(game_id = game.id(), "Game created");
        Ok(game)
    }

    /// Looks up a game. A missing game is `Ok(None)`, not an error.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::Store`] if the store fails.
    #[instrument(skip(self))]
    pub fn get_game(&self, id: GameId) -> Result<Option<Game>, GameError> {
        let game = self.store.find_game(id)?;
        if game.is_none() {
            debug!(game_id = id, "Game not found");
        }
        Ok(game)
    }

    /// Scores a guess, persists it and advances the game.
    ///
    /// The persisted copy of `game` is reloaded under the game's lock, so a
    /// stale caller copy cannot accept a guess after the game finished. On
    /// success `game` is replaced by the updated record; on error neither
    /// `game` nor the store change.
    ///
    /// # Errors
    ///
    /// - [`GameError::GameFinished`] if the game is over.
    /// - [`GameError::InvalidGuess`] for a wrong length or out-of-range color.
    /// - [`GameError::Store`] if persistence fails.
    #[instrument(skip(self, game), fields(game_id = game.id()))]
    pub fn submit_guess(&self, game: &mut Game, candidate: &[i32]) -> Result<Guess, GameError> {
        let id = *game.id();
        let lock = self.lock_for(id);
        let guard = lock.lock().unwrap_or_else(PoisonError::into_inner);

        let result = self.guess_locked(game, candidate);
        if game.is_finished() || matches!(result, Err(GameError::GameFinished(_))) {
            self.release_lock(id, &lock);
        }

        drop(guard);
        result
    }

    fn guess_locked(&self, game: &mut Game, candidate: &[i32]) -> Result<Guess, GameError> {
        let mut current = match self.store.find_game(*game.id())? {
            Some(stored) => stored,
            None => {
                warn!("Game is not persisted, using caller copy");
                game.clone()
            }
        };

        current.check_guess(candidate)?;

        let score = score(current.secret(), candidate);
        let now = self.clock.now();
        current.conclude(score, current.guesses().len() + 1, now);

        let guess = self.store.record_guess(
            &current,
            NewGuess::new(*current.id(), candidate.to_vec(), score, now),
        )?;
        current.push_guess(guess.clone());

        info!(
            guess_id = guess.id(),
            %score,
            status = %current.status(),
            "Guess recorded"
        );

        *game = current;
        Ok(guess)
    }

    /// Deletes a game and its guesses. Returns false if it did not exist.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::Store`] if the store fails.
    #[instrument(skip(self))]
    pub fn delete_game(&self, id: GameId) -> Result<bool, GameError> {
        let lock = self.lock_for(id);
        let _guard = lock.lock().unwrap_or_else(PoisonError::into_inner);

        let deleted = self.store.delete_game(id)?;
        self.locks().remove(&id);

        info!(game_id = id, deleted, "Game deleted");
        Ok(deleted)
    }

    fn lock_for(&self, id: GameId) -> Arc<Mutex<()>> {
        Arc::clone(self.locks().entry(id).or_default())
    }

    /// Drops the lock of a finished game unless another caller is queued on it.
    ///
    /// `held` is the caller's handle; with the table's own handle that makes two.
    fn release_lock(&self, id: GameId, held: &Arc<Mutex<()>>) {
        let mut locks = self.locks();
        if Arc::strong_count(held) == 2 {
            locks.remove(&id);
            debug!(game_id = id, "Released lock of finished game");
        }
    }

    fn locks(&self) -> MutexGuard<'_, HashMap<GameId, Arc<Mutex<()>>>> {
        self.locks.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Rejects a drawn secret that breaks the game's shape.
fn check_secret(secret: &[i32], params: &GameParams) -> Result<(), GameError> {
    let num_holes = params.num_holes().unsigned_abs() as usize;
    if secret.len() != num_holes {
        warn!(expected = num_holes, actual = secret.len(), "Secret has wrong length");
        return Err(GameError::InvalidSecret(format!(
            "expected {} colors, got {}",
            num_holes,
            secret.len()
        )));
    }

    let num_colors = *params.num_colors();
    if let Some(color) = secret.iter().find(|c| !(0..num_colors).contains(*c)) {
        warn!(color, num_colors, "Secret color out of range");
        return Err(GameError::InvalidSecret(format!(
            "color {} is outside 0..{}",
            color, num_colors
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{FixedSecret, InMemoryStore};

    fn service(secret: Vec<i32>) -> (Arc<InMemoryStore>, Mastermind) {
        let store = Arc::new(InMemoryStore::new());
        let service = Mastermind::new(store.clone()).with_secret_source(FixedSecret::new(secret));
        (store, service)
    }

    #[test]
    fn finished_games_release_their_locks() {
        let (_, service) = service(vec![1]);
        for _ in 0..100 {
            let mut game = service
                .create_game(GameParams::new(1, 2, 12))
                .expect("Create failed");
            service.submit_guess(&mut game, &[1]).expect("Guess failed");
            assert!(game.is_finished());
        }
        assert!(service.locks().is_empty());
    }

    #[test]
    fn running_games_keep_their_lock() {
        let (_, service) = service(vec![1, 1]);
        let mut game = service
            .create_game(GameParams::new(2, 2, 3))
            .expect("Create failed");
        service.submit_guess(&mut game, &[0, 0]).expect("Guess failed");
        assert_eq!(service.locks().len(), 1);

        service.submit_guess(&mut game, &[1, 1]).expect("Guess failed");
        assert!(service.locks().is_empty());
    }

    #[test]
    fn stale_guess_on_finished_game_leaves_no_lock() {
        let (_, service) = service(vec![1]);
        let mut game = service
            .create_game(GameParams::new(1, 2, 12))
            .expect("Create failed");
        let mut stale = game.clone();
        service.submit_guess(&mut game, &[1]).expect("Guess failed");

        let result = service.submit_guess(&mut stale, &[0]);
        assert_eq!(result, Err(GameError::GameFinished(*game.id())));
        assert!(service.locks().is_empty());
    }

    #[test]
    fn queued_waiter_keeps_the_lock_entry() {
        let (_, service) = service(vec![1]);
        let mut game = service
            .create_game(GameParams::new(1, 2, 12))
            .expect("Create failed");

        let waiter = service.lock_for(*game.id());
        service.submit_guess(&mut game, &[1]).expect("Guess failed");
        assert_eq!(service.locks().len(), 1);

        drop(waiter);
    }

    #[test]
    fn misshapen_secrets_are_not_persisted() {
        for secret in [vec![1, 2, 3], vec![1, 2, 3, 4, 0], vec![0, 0, 0, 2], vec![-1, 0, 0, 0]] {
            let (store, service) = service(secret.clone());
            let result = service.create_game(GameParams::new(4, 2, 12));
            assert!(
                matches!(result, Err(GameError::InvalidSecret(_))),
                "{secret:?} gave {result:?}"
            );
            assert!(store.is_empty());
        }
    }
}
