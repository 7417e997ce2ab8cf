//! Game and guess records and the STARTED → FINISHED state machine.
//!
//! Records are plain owned data. Persistence lives behind
//! [`GameStore`](crate::GameStore); the transitions here are pure.

use chrono::NaiveDateTime;
use derive_getters::Getters;
use tracing::{info, instrument, warn};

use crate::{GameError, GameId, GameParams, GameStatus, GuessId, Score, Winner};

/// One scored attempt at the secret.
#[derive(Debug, Clone, PartialEq, Eq, Getters)]
pub struct Guess {
    /// Guess id, assigned by the store.
    id: GuessId,
    /// Game this guess belongs to.
    game_id: GameId,
    /// The guessed colors.
    guess: Vec<i32>,
    /// Pegs awarded when the guess was made.
    score: Score,
    /// When the guess was made.
    created_at: NaiveDateTime,
}

impl Guess {
    /// Rebuilds a guess from its persisted parts.
    pub fn restore(
        id: GuessId,
        game_id: GameId,
        guess: Vec<i32>,
        score: Score,
        created_at: NaiveDateTime,
    ) -> Self {
        Self {
            id,
            game_id,
            guess,
            score,
            created_at,
        }
    }
}

/// A Mastermind game with its guesses in chronological order.
#[derive(Debug, Clone, PartialEq, Eq, Getters)]
pub struct Game {
    /// Game id, assigned by the store.
    id: GameId,
    #[getter(skip)]
    secret: Vec<i32>,
    /// Holes, colors and guess limit.
    params: GameParams,
    /// Current status.
    status: GameStatus,
    /// Set once, when the game finishes.
    winner: Option<Winner>,
    /// When the game was created.
    started_at: NaiveDateTime,
    /// Set once, when the game finishes.
    finished_at: Option<NaiveDateTime>,
    /// Guesses in chronological order.
    guesses: Vec<Guess>,
}

impl Game {
    /// Rebuilds a game from its persisted parts.
    #[allow(clippy::too_many_arguments)]
    pub fn restore(
        id: GameId,
        secret: Vec<i32>,
        params: GameParams,
        status: GameStatus,
        winner: Option<Winner>,
        started_at: NaiveDateTime,
        finished_at: Option<NaiveDateTime>,
        guesses: Vec<Guess>,
    ) -> Self {
        Self {
            id,
            secret,
            params,
            status,
            winner,
            started_at,
            finished_at,
            guesses,
        }
    }

    /// The secret code.
    ///
    /// Display paths go through [`GameView`](crate::GameView), which hides
    /// this until the game is finished.
    pub fn secret(&self) -> &[i32] {
        &self.secret
    }

    /// Length of the code.
    pub fn num_holes(&self) -> usize {
        // validated positive at creation
        self.params.num_holes().unsigned_abs() as usize
    }

    /// Returns true once the game reached its terminal state.
    pub fn is_finished(&self) -> bool {
        self.status == GameStatus::Finished
    }

    /// Checks that a guess may be submitted against this game.
    ///
    /// # Errors
    ///
    /// - [`GameError::GameFinished`] if the game is over.
    /// - [`GameError::InvalidGuess`] if the length differs from the number of
    ///   holes or a color falls outside `0..num_colors`.
    #[instrument(skip(self), fields(game_id = self.id, status = %self.status))]
    pub fn check_guess(&self, candidate: &[i32]) -> Result<(), GameError> {
        if self.is_finished() {
            warn!("Guess submitted to finished game");
            return Err(GameError::GameFinished(self.id));
        }

        if candidate.len() != self.num_holes() {
            warn!(expected = self.num_holes(), actual = candidate.len(), "Wrong guess length");
            return Err(GameError::InvalidGuess(format!(
                "expected {} colors, got {}",
                self.num_holes(),
                candidate.len()
            )));
        }

        let num_colors = *self.params.num_colors();
        if let Some((hole, color)) = candidate
            .iter()
            .enumerate()
            .find(|(_, c)| !(0..num_colors).contains(*c))
        {
            warn!(hole, color, num_colors, "Color out of range");
            return Err(GameError::InvalidGuess(format!(
                "color {} in hole {} is outside 0..{}",
                color, hole, num_colors
            )));
        }

        Ok(())
    }

    /// Resolves termination after a scored guess.
    ///
    /// `guesses_made` counts the guess being resolved. A solving guess wins for
    /// the codebreaker even when it is also the last allowed guess; otherwise
    /// reaching `max_guesses` hands the win to the codemaker.
    #[instrument(skip(self), fields(game_id = self.id))]
    pub fn conclude(&mut self, score: Score, guesses_made: usize, now: NaiveDateTime) {
        if score.is_solved(self.num_holes()) {
            self.finish(Winner::Codebreaker, now);
        } else if guesses_made >= self.params.max_guesses().unsigned_abs() as usize {
            self.finish(Winner::Codemaker, now);
        }
    }

    #[instrument(skip(self), fields(game_id = self.id))]
    fn finish(&mut self, winner: Winner, now: NaiveDateTime) {
        self.status = GameStatus::Finished;
        self.winner = Some(winner);
        self.finished_at = Some(now);
        info!(%winner, guesses = self.guesses.len() + 1, "Game finished");
    }

    pub(crate) fn push_guess(&mut self, guess: Guess) {
        self.guesses.push(guess);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn noon() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 10, 18)
            .and_then(|d| d.and_hms_opt(12, 0, 0))
            .expect("valid timestamp")
    }

    fn started(max_guesses: i32) -> Game {
        Game::restore(
            1,
            vec![1, 2, 3, 4],
            GameParams::new(4, 6, max_guesses),
            GameStatus::Started,
            None,
            noon(),
            None,
            Vec::new(),
        )
    }

    #[test]
    fn rejects_wrong_length() {
        let game = started(12);
        assert!(matches!(game.check_guess(&[]), Err(GameError::InvalidGuess(_))));
        assert!(matches!(game.check_guess(&[2, 3]), Err(GameError::InvalidGuess(_))));
    }

    #[test]
    fn rejects_out_of_range_colors() {
        let game = started(12);
        assert!(matches!(
            game.check_guess(&[7, 7, 7, 7]),
            Err(GameError::InvalidGuess(_))
        ));
        assert!(matches!(
            game.check_guess(&[-1, 0, 0, 0]),
            Err(GameError::InvalidGuess(_))
        ));
        assert!(matches!(
            game.check_guess(&[0, 0, 0, 6]),
            Err(GameError::InvalidGuess(_))
        ));
        assert!(game.check_guess(&[0, 5, 5, 0]).is_ok());
    }

    #[test]
    fn solving_guess_wins_for_codebreaker() {
        let mut game = started(12);
        game.conclude(Score::new(4, 0), 1, noon());
        assert!(game.is_finished());
        assert_eq!(game.winner, Some(Winner::Codebreaker));
        assert_eq!(game.finished_at, Some(noon()));
    }

    #[test]
    fn exhaustion_wins_for_codemaker() {
        let mut game = started(2);
        game.conclude(Score::new(1, 1), 1, noon());
        assert_eq!(game.status, GameStatus::Started);
        assert_eq!(game.winner, None);

        game.conclude(Score::new(1, 1), 2, noon());
        assert!(game.is_finished());
        assert_eq!(game.winner, Some(Winner::Codemaker));
    }

    #[test]
    fn solving_last_guess_still_wins_for_codebreaker() {
        let mut game = started(1);
        game.conclude(Score::new(4, 0), 1, noon());
        assert_eq!(game.winner, Some(Winner::Codebreaker));
    }

    #[test]
    fn finished_game_rejects_guesses() {
        let mut game = started(1);
        game.conclude(Score::new(0, 0), 1, noon());
        assert_eq!(game.check_guess(&[1, 2, 3, 4]), Err(GameError::GameFinished(1)));
    }
}
