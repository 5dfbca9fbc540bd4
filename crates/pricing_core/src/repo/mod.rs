//! Generic access layer over the pricing schema.
//!
//! # Responsibility
//! - Describe entities to the session without runtime reflection.
//! - Compose filters and expressions into backend queries.
//! - Stage writes and persist them through `SessionController::commit`.
//!
//! # Invariants
//! - "Not found" is `Ok(None)`, `Ok(false)` or an empty `Vec`, never an
//!   error.
//! - Only `commit` recovers from backend failures locally; every other
//!   operation propagates them as `RepoError`.

use crate::db::DbError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod entity;
pub mod filter;
mod mapping;
pub mod query;
pub mod relation;
pub mod session;

pub use entity::{Column, Entity, Fields, IntoValue};
pub use filter::{ArithOp, Assignment, CompareOp, Condition, Expr};
pub use query::{Order, Query};
pub use relation::{Loaded, LoadStrategy, Relation};
pub use session::{SessionConfig, SessionController, DEFAULT_LOG_TARGET};

pub type RepoResult<T> = Result<T, RepoError>;

#[derive(Debug)]
pub enum RepoError {
    Db(DbError),
    InvalidData(String),
    /// A field mapping names a column the entity does not declare.
    UnknownColumn {
        table: &'static str,
        column: String,
    },
    /// A keyed update is missing one of the entity's key columns.
    MissingKey {
        table: &'static str,
        column: &'static str,
    },
    ArgumentMismatch {
        columns: usize,
        values: usize,
    },
    /// The commit behind `get_or_create` failed and was rolled back.
    CommitFailed {
        table: &'static str,
    },
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::InvalidData(message) => write!(f, "invalid persisted data: {message}"),
            Self::UnknownColumn { table, column } => {
                write!(f, "unknown column `{column}` for table `{table}`")
            }
            Self::MissingKey { table, column } => {
                write!(f, "update of `{table}` is missing key column `{column}`")
            }
            Self::ArgumentMismatch { columns, values } => {
                write!(f, "got {columns} columns but {values} values")
            }
            Self::CommitFailed { table } => {
                write!(f, "commit failed while creating a row in `{table}`")
            }
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}
