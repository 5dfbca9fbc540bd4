//! Backend connection URL parsing.
//!
//! Accepts SQLAlchemy-style SQLite URLs: `sqlite:///relative.db`,
//! `sqlite:////absolute.db`, `sqlite://` and `sqlite:///:memory:` for an
//! in-memory store. A bare path without a scheme is a file path.

use super::{DbError, DbResult};
use once_cell::sync::Lazy;
use regex::Regex;
use std::path::PathBuf;

/// Local embedded file store used when no URL is configured.
pub const DEFAULT_DATABASE_URL: &str = "sqlite:///shopping.db";

static URL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?P<scheme>[A-Za-z][A-Za-z0-9+.\-]*)://(?P<rest>.*)$").expect("valid url regex")
});

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DatabaseUrl {
    File(PathBuf),
    Memory,
}

impl DatabaseUrl {
    pub fn parse(url: &str) -> DbResult<Self> {
        let trimmed = url.trim();
        if trimmed.is_empty() {
            return Err(DbError::InvalidUrl(url.to_string()));
        }

        let Some(captures) = URL_RE.captures(trimmed) else {
            return Ok(Self::File(PathBuf::from(trimmed)));
        };

        let scheme = &captures["scheme"];
        if !scheme.eq_ignore_ascii_case("sqlite") {
            return Err(DbError::UnsupportedBackend {
                scheme: scheme.to_string(),
            });
        }

        let rest = &captures["rest"];
        if rest.is_empty() {
            return Ok(Self::Memory);
        }
        // sqlite:/// leaves `/path`; one more slash makes it absolute.
        let Some(path) = rest.strip_prefix('/') else {
            return Err(DbError::InvalidUrl(url.to_string()));
        };
        match path {
            "" | ":memory:" => Ok(Self::Memory),
            path => Ok(Self::File(PathBuf::from(path))),
        }
    }

    pub fn mode(&self) -> &'static str {
        match self {
            Self::File(_) => "file",
            Self::Memory => "memory",
        }
    }
}
