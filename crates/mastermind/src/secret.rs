//! Secret code generation.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, instrument};

/// Produces the secret code for a new game.
pub trait SecretSource: Send {
    /// Draws `num_holes` colors, each in `0..num_colors`.
    ///
    /// Callers guarantee both arguments are positive.
    fn draw(&mut self, num_holes: usize, num_colors: i32) -> Vec<i32>;
}

/// Independent uniform draws from a standard RNG.
#[derive(Debug, Clone)]
pub struct RandomSecret {
    rng: StdRng,
}

impl RandomSecret {
    /// Seeds the generator from the operating system.
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_os_rng(),
        }
    }

    /// Creates a reproducible generator.
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Default for RandomSecret {
    fn default() -> Self {
        Self::new()
    }
}

impl SecretSource for RandomSecret {
    #[instrument(level = "debug", skip(self))]
    fn draw(&mut self, num_holes: usize, num_colors: i32) -> Vec<i32> {
        (0..num_holes)
            .map(|_| self.rng.random_range(0..num_colors))
            .collect()
    }
}

/// Always hands out the same code, for deterministic games.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixedSecret {
    code: Vec<i32>,
}

impl FixedSecret {
    /// Creates a source that returns `code` for every game.
    pub fn new(code: Vec<i32>) -> Self {
        Self { code }
    }
}

impl SecretSource for FixedSecret {
    fn draw(&mut self, num_holes: usize, num_colors: i32) -> Vec<i32> {
        if self.code.len() != num_holes {
            debug!(
                expected = num_holes,
                actual = self.code.len(),
                num_colors,
                "Fixed secret does not match requested hole count"
            );
        }
        self.code.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn random_draws_stay_in_range() {
        let mut source = RandomSecret::seeded(7);
        for _ in 0..50 {
            let code = source.draw(5, 3);
            assert_eq!(code.len(), 5);
            assert!(code.iter().all(|c| (0..3).contains(c)));
        }
    }

    #[test]
    fn seeded_sources_repeat() {
        let a = RandomSecret::seeded(42).draw(8, 6);
        let b = RandomSecret::seeded(42).draw(8, 6);
        assert_eq!(a, b);
    }

    #[test]
    fn single_color_secret_is_constant() {
        assert_eq!(RandomSecret::seeded(1).draw(4, 1), vec![0, 0, 0, 0]);
    }
}
