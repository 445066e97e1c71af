//! Note store schema and connection setup.
//!
//! The store holds one `notes` row per note. A checklist note keeps its
//! encoded item list either in the row's `value` column or, when `path` is
//! set, in the file that `path` names.
//!
//! # Invariants
//! - File-backed rows keep `value` empty; the file is the only copy.
//! - `is_locked` is `0` or `1`, enforced by a `CHECK` constraint.
//! - `updated_at` is Unix epoch milliseconds of the last stored write.
//! - A connection is handed out only after every migration up to
//!   `migrations::latest_version()` has been applied. A database written by
//!   a newer schema is refused rather than opened read-only.

use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod migrations;
mod open;

pub use open::{open_db, open_db_in_memory};

pub type DbResult<T> = Result<T, DbError>;

/// Failure to open, migrate or query the note store.
#[derive(Debug)]
pub enum DbError {
    Sqlite(rusqlite::Error),
    /// `PRAGMA user_version` is ahead of the schema this build knows.
    UnsupportedSchemaVersion {
        db_version: u32,
        latest_supported: u32,
    },
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "note store query failed: {err}"),
            Self::UnsupportedSchemaVersion {
                db_version,
                latest_supported,
            } => write!(
                f,
                "note store schema version {db_version} is newer than this build supports ({latest_supported})"
            ),
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) => Some(err),
            Self::UnsupportedSchemaVersion { .. } => None,
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}
