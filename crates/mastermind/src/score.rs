//! Scoring engine: black and white key pegs for a guess.

use derive_getters::Getters;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::instrument;

/// Result of scoring a guess against the secret.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, Getters)]
pub struct Score {
    /// Holes where the guess matches the secret exactly (black pegs).
    correct_position: u32,
    /// Right colors in the wrong holes (white pegs).
    correct_color: u32,
}

impl Score {
    /// Creates a score from peg counts.
    pub fn new(correct_position: u32, correct_color: u32) -> Self {
        Self {
            correct_position,
            correct_color,
        }
    }

    /// Returns true when every one of `num_holes` holes is an exact match.
    pub fn is_solved(&self, num_holes: usize) -> bool {
        self.correct_position as usize == num_holes
    }
}

impl std::fmt::Display for Score {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} black, {} white", self.correct_position, self.correct_color)
    }
}

/// Scores `guess` against `secret`.
///
/// Exact matches are counted first. The remaining holes are compared as
/// multisets: each unmatched secret occurrence can satisfy at most one
/// unmatched guess value, so repeated colors in the guess never over-count.
///
/// Both sequences are expected to have the same length; extra trailing
/// values in the longer one are ignored.
#[instrument(level = "debug")]
pub fn score(secret: &[i32], guess: &[i32]) -> Score {
    let mut correct_position = 0;
    let mut unmatched_secret: HashMap<i32, u32> = HashMap::new();
    let mut unmatched_guess = Vec::with_capacity(guess.len());

    for (&s, &g) in secret.iter().zip(guess) {
        if s == g {
            correct_position += 1;
        } else {
            *unmatched_secret.entry(s).or_default() += 1;
            unmatched_guess.push(g);
        }
    }

    let mut correct_color = 0;
    for g in unmatched_guess {
        if let Some(remaining) = unmatched_secret.get_mut(&g) {
            if *remaining > 0 {
                *remaining -= 1;
                correct_color += 1;
            }
        }
    }

    Score::new(correct_position, correct_color)
}
