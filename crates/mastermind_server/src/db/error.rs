//! Database error types.

use derive_more::{Display, Error};
use diesel::result::DatabaseErrorKind;
use mastermind::StoreError;
use tracing::instrument;

/// What went wrong in the database layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum DbErrorKind {
    /// The repository was configured with an unusable path.
    Config,
    /// Opening the database failed.
    Connection,
    /// A schema migration failed.
    Migration,
    /// A query failed.
    Query,
    /// The game a write refers to does not exist.
    MissingGame,
    /// Another writer changed the game since it was read.
    Conflict,
    /// A stored row could not be turned back into a game or guess.
    Corrupt,
}

/// Database error with its kind and the location that raised it.
#[derive(Debug, Clone, Display, Error)]
#[display("Database error ({}): {} at {}:{}", kind, message, file, line)]
pub struct DbError {
    /// Category of the failure.
    pub kind: DbErrorKind,
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl DbError {
    /// Creates an error of `kind`, recording the caller's location.
    #[track_caller]
    #[instrument(skip(message))]
    pub fn new(kind: DbErrorKind, message: impl Into<String>) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            kind,
            message: message.into(),
            line: loc.line(),
            file: loc.file(),
        }
    }

    /// True when a concurrent writer got to the game first.
    pub fn is_conflict(&self) -> bool {
        self.kind == DbErrorKind::Conflict
    }
}

impl From<diesel::result::Error> for DbError {
    #[track_caller]
    fn from(err: diesel::result::Error) -> Self {
        let kind = match &err {
            diesel::result::Error::DatabaseError(DatabaseErrorKind::ForeignKeyViolation, _) => {
                DbErrorKind::MissingGame
            }
            _ => DbErrorKind::Query,
        };
        Self::new(kind, err.to_string())
    }
}

impl From<diesel::ConnectionError> for DbError {
    #[track_caller]
    fn from(err: diesel::ConnectionError) -> Self {
        Self::new(DbErrorKind::Connection, err.to_string())
    }
}

impl From<serde_json::Error> for DbError {
    #[track_caller]
    fn from(err: serde_json::Error) -> Self {
        Self::new(DbErrorKind::Corrupt, format!("Malformed stored sequence: {}", err))
    }
}

impl From<DbError> for StoreError {
    fn from(err: DbError) -> Self {
        Self {
            message: format!("{}: {}", err.kind, err.message),
            line: err.line,
            file: err.file,
        }
    }
}
