//! Mastermind server - REST API and SQLite persistence for Mastermind games.
//!
//! # Architecture
//!
//! - **API**: axum router decoding JSON requests and mapping game errors to status codes
//! - **Database**: diesel repository implementing [`mastermind::GameStore`]
//! - **Config**: TOML file, environment and flag layering
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use mastermind::Mastermind;
//! use mastermind_server::{AppState, GameRepository, ServerConfig, router};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let config = ServerConfig::load(None)?;
//! let repository = GameRepository::new(config.database().clone())?;
//! repository.migrate()?;
//!
//! let service = Arc::new(Mastermind::new(Arc::new(repository)));
//! let app = router(AppState::new(service, (*config.defaults()).into()));
//!
//! let listener = tokio::net::TcpListener::bind((config.host().as_str(), *config.port())).await?;
//! axum::serve(listener, app).await?;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod api;
mod config;
mod db;

pub use api::{
    ApiError, AppState, CreateGameRequest, CreatedResponse, ErrorResponse, GuessRequest,
    GuessResponse, router,
};
pub use config::{
    ConfigError, DATABASE_ENV, DEFAULT_MAX_HOLES, GameDefaults, HOST_ENV, PORT_ENV, ServerConfig,
};
pub use db::{DbError, DbErrorKind, GameRepository};
