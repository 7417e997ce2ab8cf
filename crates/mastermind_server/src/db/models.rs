//! Database rows and their conversion to domain records.
//!
//! Code sequences are stored as JSON arrays in text columns; status and
//! winner use their upper-case names.

use chrono::NaiveDateTime;
use diesel::prelude::*;
use mastermind::{Game, GameId, GameParams, GameStatus, Guess, NewGame, NewGuess, Score, Winner};
use tracing::instrument;

use crate::db::{DbError, DbErrorKind, schema};

/// Game database row.
#[derive(Debug, Clone, Queryable, Identifiable, Selectable)]
#[diesel(table_name = schema::games)]
pub struct GameRow {
    pub id: i32,
    pub started_at: NaiveDateTime,
    pub finished_at: Option<NaiveDateTime>,
    pub status: String,
    pub winner: Option<String>,
    pub secret: String,
    pub num_holes: i32,
    pub num_colors: i32,
    pub max_guesses: i32,
}

impl GameRow {
    /// Converts the row and its guess rows into a [`Game`].
    #[instrument(skip(self, guesses), fields(game_id = self.id, guesses = guesses.len()))]
    pub fn into_game(self, guesses: Vec<GuessRow>) -> Result<Game, DbError> {
        let status = self
            .status
            .parse::<GameStatus>()
            .map_err(|_| DbError::new(DbErrorKind::Corrupt, format!("Invalid status: '{}'", self.status)))?;
        let winner = self
            .winner
            .as_deref()
            .map(|w| {
                w.parse::<Winner>()
                    .map_err(|_| DbError::new(DbErrorKind::Corrupt, format!("Invalid winner: '{}'", w)))
            })
            .transpose()?;
        let guesses = guesses
            .into_iter()
            .map(GuessRow::into_guess)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Game::restore(
            self.id,
            serde_json::from_str(&self.secret)?,
            GameParams::new(self.num_holes, self.num_colors, self.max_guesses),
            status,
            winner,
            self.started_at,
            self.finished_at,
            guesses,
        ))
    }
}

/// Insertable game row.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = schema::games)]
pub struct NewGameRow {
    pub started_at: NaiveDateTime,
    pub status: String,
    pub secret: String,
    pub num_holes: i32,
    pub num_colors: i32,
    pub max_guesses: i32,
}

impl TryFrom<&NewGame> for NewGameRow {
    type Error = DbError;

    fn try_from(game: &NewGame) -> Result<Self, Self::Error> {
        Ok(Self {
            started_at: *game.started_at(),
            status: GameStatus::Started.to_string(),
            secret: serde_json::to_string(game.secret())?,
            num_holes: *game.params().num_holes(),
            num_colors: *game.params().num_colors(),
            max_guesses: *game.params().max_guesses(),
        })
    }
}

/// Guess database row.
#[derive(Debug, Clone, Queryable, Identifiable, Selectable)]
#[diesel(table_name = schema::guesses)]
pub struct GuessRow {
    pub id: i32,
    pub game_id: GameId,
    pub created_at: NaiveDateTime,
    pub guess: String,
    pub correct_position: i32,
    pub correct_color: i32,
}

impl GuessRow {
    /// Converts the row into a [`Guess`].
    pub fn into_guess(self) -> Result<Guess, DbError> {
        let score = Score::new(
            peg_count(self.correct_position)?,
            peg_count(self.correct_color)?,
        );
        Ok(Guess::restore(
            self.id,
            self.game_id,
            serde_json::from_str(&self.guess)?,
            score,
            self.created_at,
        ))
    }
}

/// Insertable guess row.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = schema::guesses)]
pub struct NewGuessRow {
    pub game_id: GameId,
    pub created_at: NaiveDateTime,
    pub guess: String,
    pub correct_position: i32,
    pub correct_color: i32,
}

impl TryFrom<&NewGuess> for NewGuessRow {
    type Error = DbError;

    fn try_from(guess: &NewGuess) -> Result<Self, Self::Error> {
        let column = |pegs: u32| {
            i32::try_from(pegs).map_err(|_| {
                DbError::new(DbErrorKind::Corrupt, format!("Peg count {} too large", pegs))
            })
        };
        Ok(Self {
            game_id: *guess.game_id(),
            created_at: *guess.created_at(),
            guess: serde_json::to_string(guess.guess())?,
            correct_position: column(*guess.score().correct_position())?,
            correct_color: column(*guess.score().correct_color())?,
        })
    }
}

fn peg_count(value: i32) -> Result<u32, DbError> {
    u32::try_from(value)
        .map_err(|_| DbError::new(DbErrorKind::Corrupt, format!("Negative peg count: {}", value)))
}
