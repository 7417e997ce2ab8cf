//! Mastermind server binary.

#![warn(missing_docs)]

mod cli;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Command};
use mastermind::Mastermind;
use mastermind_server::{AppState, GameRepository, ServerConfig, router};
use tracing::{info, instrument};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Serve {
            config,
            host,
            port,
            db_path,
        } => run_server(config, host, port, db_path).await,
        Command::Migrate { config, db_path } => run_migrations(config, db_path),
    }
}

/// Loads config and opens a migrated repository.
fn open_repository(
    config: Option<PathBuf>,
    host: Option<String>,
    port: Option<u16>,
    db_path: Option<String>,
) -> Result<(ServerConfig, GameRepository)> {
    let config = ServerConfig::load(config.as_deref())?.with_overrides(host, port, db_path);
    config.validate()?;

    let repository = GameRepository::new(config.database().clone())?;
    repository.migrate()?;
    Ok((config, repository))
}

/// Apply migrations only
#[instrument]
fn run_migrations(config: Option<PathBuf>, db_path: Option<String>) -> Result<()> {
    let (_, repository) = open_repository(config, None, None, db_path)?;
    info!(database = repository.db_path(), "Database is up to date");
    Ok(())
}

/// Run the HTTP game server
#[instrument]
async fn run_server(
    config: Option<PathBuf>,
    host: Option<String>,
    port: Option<u16>,
    db_path: Option<String>,
) -> Result<()> {
    let (config, repository) = open_repository(config, host, port, db_path)?;

    let service = Arc::new(Mastermind::new(Arc::new(repository)));
    let state = AppState::new(service, (*config.defaults()).into())
        .with_max_holes(*config.max_holes());
    let app = router(state);

    let listener = tokio::net::TcpListener::bind((config.host().as_str(), *config.port())).await?;
    info!(
        host = %config.host(),
        port = config.port(),
        database = %config.database(),
        "Server ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
