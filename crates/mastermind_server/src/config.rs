//! Server configuration.
//!
//! Values come from an optional TOML file, then `MASTERMIND_*` environment
//! variables, then command-line flags, each layer overriding the last.

use derive_getters::Getters;
use derive_more::{Display, Error};
use mastermind::GameParams;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info, instrument};

/// Environment variable overriding the bind host.
pub const HOST_ENV: &str = "MASTERMIND_HOST";
/// Environment variable overriding the bind port.
pub const PORT_ENV: &str = "MASTERMIND_PORT";
/// Environment variable overriding the database path.
pub const DATABASE_ENV: &str = "MASTERMIND_DATABASE";

/// Largest number of holes a create request may ask for unless configured.
pub const DEFAULT_MAX_HOLES: i32 = 64;

/// Configuration for the game server.
#[derive(Debug, Clone, PartialEq, Eq, Getters, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Host to bind to.
    host: String,
    /// Port to bind to.
    port: u16,
    /// Path of the SQLite database file.
    database: String,
    /// Parameters for `/new-game` requests that leave fields out.
    defaults: GameDefaults,
    /// Upper bound on `num_holes` in create requests.
    max_holes: i32,
}

/// Game parameters used when a create request omits them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Getters, Serialize, Deserialize)]
#[serde(default)]
pub struct GameDefaults {
    /// Default number of holes.
    num_holes: i32,
    /// Default number of colors.
    num_colors: i32,
    /// Default guess limit.
    max_guesses: i32,
}

impl Default for GameDefaults {
    fn default() -> Self {
        Self {
            num_holes: GameParams::DEFAULT_HOLES,
            num_colors: GameParams::DEFAULT_COLORS,
            max_guesses: GameParams::DEFAULT_MAX_GUESSES,
        }
    }
}

impl From<GameDefaults> for GameParams {
    fn from(defaults: GameDefaults) -> Self {
        GameParams::new(defaults.num_holes, defaults.num_colors, defaults.max_guesses)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
            database: "mastermind.db".to_string(),
            defaults: GameDefaults::default(),
            max_holes: DEFAULT_MAX_HOLES,
        }
    }
}

impl ServerConfig {
    /// Loads configuration from a TOML file. Missing keys take defaults.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        debug!("Loading config from file");
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::new(format!("Failed to read config file: {}", e)))?;
        Self::from_toml(&content)
    }

    /// Parses configuration from TOML text.
    #[instrument(skip(content))]
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)
            .map_err(|e| ConfigError::new(format!("Failed to parse config: {}", e)))?;
        info!(host = %config.host, port = config.port, database = %config.database, "Config loaded");
        Ok(config)
    }

    /// Loads the file if given, otherwise defaults, then applies environment
    /// overrides.
    #[instrument]
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.with_env(|key| std::env::var(key).ok())
    }

    /// Applies `MASTERMIND_*` overrides read through `lookup`.
    #[instrument(skip(self, lookup))]
    pub fn with_env(
        mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        if let Some(host) = lookup(HOST_ENV) {
            debug!(%host, "Host from environment");
            self.host = host;
        }
        if let Some(port) = lookup(PORT_ENV) {
            self.port = port
                .parse()
                .map_err(|_| ConfigError::new(format!("{} is not a valid port: '{}'", PORT_ENV, port)))?;
            debug!(port = self.port, "Port from environment");
        }
        if let Some(database) = lookup(DATABASE_ENV) {
            debug!(%database, "Database from environment");
            self.database = database;
        }
        Ok(self)
    }

    /// Applies command-line overrides.
    pub fn with_overrides(
        mut self,
        host: Option<String>,
        port: Option<u16>,
        database: Option<String>,
    ) -> Self {
        if let Some(host) = host {
            self.host = host;
        }
        if let Some(port) = port {
            self.port = port;
        }
        if let Some(database) = database {
            self.database = database;
        }
        self
    }

    /// Checks that the configured defaults describe a playable game within
    /// `max_holes`.
    pub fn validate(&self) -> Result<(), ConfigError> {
        GameParams::from(self.defaults)
            .validate()
            .map_err(|e| ConfigError::new(format!("Invalid [defaults]: {}", e)))?;
        if self.defaults.num_holes > self.max_holes {
            return Err(ConfigError::new(format!(
                "Default num_holes {} exceeds max_holes {}",
                self.defaults.num_holes, self.max_holes
            )));
        }
        Ok(())
    }
}

/// Configuration error.
#[derive(Debug, Clone, Display, Error)]
#[display("Config error: {} at {}:{}", message, file, line)]
pub struct ConfigError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl ConfigError {
    /// Creates a new configuration error.
    #[track_caller]
    #[instrument(skip(message))]
    pub fn new(message: String) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message,
            line: loc.line(),
            file: loc.file(),
        }
    }
}
