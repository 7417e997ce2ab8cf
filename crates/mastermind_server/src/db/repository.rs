//! Database repository for games and guesses.

use diesel::prelude::*;
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use mastermind::{Game, GameId, GameStatus, GameStore, Guess, NewGame, NewGuess, StoreError};
use tracing::{debug, info, instrument, warn};

use crate::db::{DbError, DbErrorKind};
use crate::db::models::{GameRow, GuessRow, NewGameRow, NewGuessRow};
use crate::db::schema::{games, guesses};

const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// SQLite-backed [`GameStore`].
///
/// Each operation opens its own connection, so the repository is cheap to
/// clone and share between request handlers.
#[derive(Debug, Clone)]
pub struct GameRepository {
    db_path: String,
}

impl GameRepository {
    /// Creates a new repository for the database at the given path.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the path is empty.
    #[instrument(skip(db_path), fields(db_path = %db_path))]
    pub fn new(db_path: String) -> Result<Self, DbError> {
        if db_path.trim().is_empty() {
            return Err(DbError::new(DbErrorKind::Config, "Database path must not be empty"));
        }
        info!(path = %db_path, "Creating GameRepository");
        Ok(Self { db_path })
    }

    /// Path of the underlying database.
    pub fn db_path(&self) -> &str {
        &self.db_path
    }

    /// Applies any pending schema migrations. Returns how many ran.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a migration fails.
    #[instrument(skip(self))]
    pub fn migrate(&self) -> Result<usize, DbError> {
        let mut conn = self.connection()?;
        let applied = conn
            .run_pending_migrations(MIGRATIONS)
            .map_err(|e| DbError::new(DbErrorKind::Migration, format!("Migration failed: {}", e)))?;
        info!(count = applied.len(), "Migrations applied");
        Ok(applied.len())
    }

    /// Establishes a database connection with foreign keys enforced.
    #[instrument(skip(self))]
    fn connection(&self) -> Result<SqliteConnection, DbError> {
        debug!(path = %self.db_path, "Establishing connection");
        let mut conn = SqliteConnection::establish(&self.db_path)
            .map_err(|e| {
                DbError::new(
                    DbErrorKind::Connection,
                    format!("Failed to connect to '{}': {}", self.db_path, e),
                )
            })?;
        diesel::sql_query("PRAGMA foreign_keys = ON").execute(&mut conn)?;
        diesel::sql_query("PRAGMA busy_timeout = 5000").execute(&mut conn)?;
        Ok(conn)
    }

    /// Inserts a new game in the STARTED state.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a database error occurs.
    #[instrument(skip(self, game))]
    pub fn create_game(&self, game: &NewGame) -> Result<Game, DbError> {
        let mut conn = self.connection()?;
        let row = diesel::insert_into(games::table)
            .values(&NewGameRow::try_from(game)?)
            .returning(GameRow::as_returning())
            .get_result(&mut conn)?;

        info!(game_id = row.id, "Game inserted");
        row.into_game(Vec::new())
    }

    /// Loads a game with its guesses in chronological order.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a database error occurs or a row is malformed.
    #[instrument(skip(self))]
    pub fn load_game(&self, id: GameId) -> Result<Option<Game>, DbError> {
        let mut conn = self.connection()?;

        let Some(row) = games::table
            .find(id)
            .select(GameRow::as_select())
            .first(&mut conn)
            .optional()?
        else {
            debug!(game_id = id, "Game not found");
            return Ok(None);
        };

        let guess_rows = guesses::table
            .filter(guesses::game_id.eq(id))
            .order(guesses::id.asc())
            .select(GuessRow::as_select())
            .load(&mut conn)?;

        debug!(game_id = id, guesses = guess_rows.len(), "Game loaded");
        row.into_game(guess_rows).map(Some)
    }

    /// Inserts a guess and updates the game's status in one IMMEDIATE
    /// transaction.
    ///
    /// The stored game must still be STARTED with exactly the guesses `game`
    /// carries; otherwise another writer got there first and nothing is written.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] on conflict or if a database error occurs.
    #[instrument(skip(self, game, guess), fields(game_id = game.id()))]
    pub fn append_guess(&self, game: &Game, guess: &NewGuess) -> Result<Guess, DbError> {
        let mut conn = self.connection()?;
        let new_row = NewGuessRow::try_from(guess)?;

        conn.immediate_transaction(|conn| {
            let stored_status: Option<String> = games::table
                .find(*game.id())
                .select(games::status)
                .first(conn)
                .optional()?;
            match stored_status.as_deref() {
                None => {
                    return Err(DbError::new(
                        DbErrorKind::MissingGame,
                        format!("Game {} does not exist", game.id()),
                    ));
                }
                Some(status) if status != GameStatus::Started.to_string() => {
                    warn!("Stored game already finished");
                    return Err(DbError::new(
                        DbErrorKind::Conflict,
                        format!("Game {} is already finished", game.id()),
                    ));
                }
                Some(_) => {}
            }

            let stored_guesses: i64 = guesses::table
                .filter(guesses::game_id.eq(*game.id()))
                .count()
                .get_result(conn)?;
            if stored_guesses != game.guesses().len() as i64 {
                warn!(
                    stored = stored_guesses,
                    expected = game.guesses().len(),
                    "Concurrent guess detected"
                );
                return Err(DbError::new(
                    DbErrorKind::Conflict,
                    format!("Game {} was modified concurrently", game.id()),
                ));
            }

            let winner = game.winner().as_ref().map(ToString::to_string);
            diesel::update(games::table.find(*game.id()))
                .set((
                    games::status.eq(game.status().to_string()),
                    games::winner.eq(winner),
                    games::finished_at.eq(*game.finished_at()),
                ))
                .execute(conn)?;

            let row = diesel::insert_into(guesses::table)
                .values(&new_row)
                .returning(GuessRow::as_returning())
                .get_result(conn)?;

            info!(guess_id = row.id, status = %game.status(), "Guess recorded");
            row.into_guess()
        })
    }

    /// Deletes a game; its guesses go with it.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a database error occurs.
    #[instrument(skip(self))]
    pub fn remove_game(&self, id: GameId) -> Result<bool, DbError> {
        let mut conn = self.connection()?;
        let deleted = diesel::delete(games::table.find(id)).execute(&mut conn)?;
        info!(game_id = id, deleted, "Game removed");
        Ok(deleted > 0)
    }

    /// Counts the guesses stored for a game.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a database error occurs.
    #[instrument(skip(self))]
    pub fn count_guesses(&self, game_id: GameId) -> Result<i64, DbError> {
        let mut conn = self.connection()?;
        let count = guesses::table
            .filter(guesses::game_id.eq(game_id))
            .count()
            .get_result(&mut conn)?;
        Ok(count)
    }
}

impl GameStore for GameRepository {
    fn insert_game(&self, game: NewGame) -> Result<Game, StoreError> {
        Ok(self.create_game(&game)?)
    }

    fn find_game(&self, id: GameId) -> Result<Option<Game>, StoreError> {
        Ok(self.load_game(id)?)
    }

    fn record_guess(&self, game: &Game, guess: NewGuess) -> Result<Guess, StoreError> {
        Ok(self.append_guess(game, &guess)?)
    }

    fn delete_game(&self, id: GameId) -> Result<bool, StoreError> {
        Ok(self.remove_game(id)?)
    }
}
