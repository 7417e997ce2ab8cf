//! Core domain types for Mastermind.

use derive_getters::Getters;
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};
use tracing::{instrument, warn};

use crate::GameError;

/// Identifier of a persisted game.
pub type GameId = i32;

/// Identifier of a persisted guess.
pub type GuessId = i32;

/// Lifecycle of a game. `Finished` is terminal.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, AsRefStr,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum GameStatus {
    /// Guesses are being accepted.
    Started,
    /// The code was broken or the guesses ran out.
    Finished,
}

/// Side that won a finished game.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, AsRefStr,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum Winner {
    /// The codebreaker ran out of guesses.
    Codemaker,
    /// The secret was guessed exactly.
    Codebreaker,
}

/// Board dimensions and turn limit chosen when a game is created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Getters)]
pub struct GameParams {
    /// Length of the secret code.
    num_holes: i32,
    /// Colors are the integers `0..num_colors`.
    num_colors: i32,
    /// Guesses allowed before the codemaker wins.
    max_guesses: i32,
}

impl GameParams {
    /// Number of holes used when a request does not specify one.
    pub const DEFAULT_HOLES: i32 = 4;
    /// Number of colors used when a request does not specify one.
    pub const DEFAULT_COLORS: i32 = 6;
    /// Guess limit used when a request does not specify one.
    pub const DEFAULT_MAX_GUESSES: i32 = 12;

    /// Creates game parameters. Call [`GameParams::validate`] before use.
    pub fn new(num_holes: i32, num_colors: i32, max_guesses: i32) -> Self {
        Self {
            num_holes,
            num_colors,
            max_guesses,
        }
    }

    /// Checks that holes, colors and max guesses are all positive.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::InvalidGameParameter`] otherwise.
    #[instrument]
    pub fn validate(&self) -> Result<(), GameError> {
        if self.num_holes <= 0 || self.num_colors <= 0 || self.max_guesses <= 0 {
            warn!("Rejected non-positive game parameters");
            return Err(GameError::InvalidGameParameter(
                "Number of holes, colors and max guesses must be positive integers".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for GameParams {
    fn default() -> Self {
        Self::new(
            Self::DEFAULT_HOLES,
            Self::DEFAULT_COLORS,
            Self::DEFAULT_MAX_GUESSES,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_and_winner_use_upper_snake_case() {
        assert_eq!(GameStatus::Started.as_ref(), "STARTED");
        assert_eq!(Winner::Codebreaker.to_string(), "CODEBREAKER");
        assert_eq!("FINISHED".parse::<GameStatus>(), Ok(GameStatus::Finished));
        assert_eq!("CODEMAKER".parse::<Winner>(), Ok(Winner::Codemaker));
        assert!("finished_maybe".parse::<GameStatus>().is_err());
    }

    #[test]
    fn default_params_are_classic_board() {
        let params = GameParams::default();
        assert_eq!(*params.num_holes(), 4);
        assert_eq!(*params.num_colors(), 6);
        assert_eq!(*params.max_guesses(), 12);
        assert!(params.validate().is_ok());
    }

    #[test]
    fn non_positive_params_are_rejected() {
        for params in [
            GameParams::new(0, 0, 0),
            GameParams::new(-1, 1, 1),
            GameParams::new(4, 0, 12),
            GameParams::new(4, 6, -3),
        ] {
            assert!(matches!(
                params.validate(),
                Err(GameError::InvalidGameParameter(_))
            ));
        }
    }
}
