//! Mastermind - pure game logic for a code-breaking game server.
//!
//! # Architecture
//!
//! - **Score**: compares a guess against the secret (black and white pegs)
//! - **Game**: owned game and guess records with the STARTED → FINISHED state machine
//! - **Store**: repository interface that persistence layers implement
//! - **Service**: [`Mastermind`] drives the state machine against a store
//! - **View**: display projection that keeps the secret hidden until the game ends
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use mastermind::{FixedSecret, GameParams, GameStatus, InMemoryStore, Mastermind};
//!
//! # fn example() -> Result<(), mastermind::GameError> {
//! let service = Mastermind::new(Arc::new(InMemoryStore::new()))
//!     .with_secret_source(FixedSecret::new(vec![1, 2, 3, 4]));
//!
//! let mut game = service.create_game(GameParams::default())?;
//! let guess = service.submit_guess(&mut game, &[1, 2, 3, 4])?;
//!
//! assert_eq!(*guess.score().correct_position(), 4);
//! assert_eq!(*game.status(), GameStatus::Finished);
//! # Ok(())
//! # }
//! # example().unwrap();
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod clock;
mod error;
mod game;
mod memory;
mod score;
mod secret;
mod service;
mod store;
mod types;
mod view;

pub use clock::{Clock, FixedClock, SystemClock};
pub use error::{GameError, StoreError};
pub use game::{Game, Guess};
pub use memory::InMemoryStore;
pub use score::{Score, score};
pub use secret::{FixedSecret, RandomSecret, SecretSource};
pub use service::Mastermind;
pub use store::{GameStore, NewGame, NewGuess};
pub use types::{GameId, GameParams, GameStatus, GuessId, Winner};
pub use view::{GameView, GuessView};
