//! Display projection of a game.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::{Game, GameId, GameStatus, Guess, GuessId, Winner};

/// A guess as shown to players.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuessView {
    /// Guess id.
    pub id: GuessId,
    /// When the guess was made.
    pub created_at: NaiveDateTime,
    /// The guessed colors.
    pub guess: Vec<i32>,
    /// Black pegs.
    pub correct_position: u32,
    /// White pegs.
    pub correct_color: u32,
}

impl From<&Guess> for GuessView {
    fn from(guess: &Guess) -> Self {
        Self {
            id: *guess.id(),
            created_at: *guess.created_at(),
            guess: guess.guess().clone(),
            correct_position: *guess.score().correct_position(),
            correct_color: *guess.score().correct_color(),
        }
    }
}

/// A game as shown to players.
///
/// `secret` is only present once the game is finished; while it is in
/// progress the field is absent from the serialized form entirely.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameView {
    /// Game id.
    pub id: GameId,
    /// When the game was created.
    pub started_at: NaiveDateTime,
    /// When the game finished, if it has.
    pub finished_at: Option<NaiveDateTime>,
    /// Current status.
    pub status: GameStatus,
    /// Winner of a finished game.
    pub winner: Option<Winner>,
    /// Length of the code.
    pub num_holes: i32,
    /// Number of colors.
    pub num_colors: i32,
    /// Guess limit.
    pub max_guesses: i32,
    /// The secret, revealed after the game ends.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secret: Option<Vec<i32>>,
    /// Guesses in the order they were made.
    pub guesses: Vec<GuessView>,
}

impl From<&Game> for GameView {
    fn from(game: &Game) -> Self {
        Self {
            id: *game.id(),
            started_at: *game.started_at(),
            finished_at: *game.finished_at(),
            status: *game.status(),
            winner: *game.winner(),
            num_holes: *game.params().num_holes(),
            num_colors: *game.params().num_colors(),
            max_guesses: *game.params().max_guesses(),
            secret: game.is_finished().then(|| game.secret().to_vec()),
            guesses: game.guesses().iter().map(GuessView::from).collect(),
        }
    }
}

impl Game {
    /// Builds the display view of this game.
    pub fn view(&self) -> GameView {
        GameView::from(self)
    }
}
