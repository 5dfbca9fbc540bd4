//! SQLite storage bootstrap and schema entry points.
//!
//! # Responsibility
//! - Parse backend connection URLs.
//! - Open and configure SQLite connections.
//! - Create the pricing schema idempotently on every open.
//!
//! # Invariants
//! - Schema version is tracked via `PRAGMA user_version`.
//! - Opening never drops or rewrites existing tables.

use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod migrations;
mod open;
mod url;

pub use open::{open_db, open_db_in_memory, open_url};
pub use url::{DatabaseUrl, DEFAULT_DATABASE_URL};

pub type DbResult<T> = Result<T, DbError>;

#[derive(Debug)]
pub enum DbError {
    Sqlite(rusqlite::Error),
    UnsupportedSchemaVersion {
        db_version: u32,
        latest_supported: u32,
    },
    /// URL names a backend this build cannot reach.
    UnsupportedBackend {
        scheme: String,
    },
    InvalidUrl(String),
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "{err}"),
            Self::UnsupportedSchemaVersion {
                db_version,
                latest_supported,
            } => write!(
                f,
                "database schema version {db_version} is newer than supported {latest_supported}"
            ),
            Self::UnsupportedBackend { scheme } => {
                write!(
                    f,
                    "unsupported database backend `{scheme}`; this build only supports sqlite urls"
                )
            }
            Self::InvalidUrl(url) => write!(f, "invalid database url `{url}`"),
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) => Some(err),
            _ => None,
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}
