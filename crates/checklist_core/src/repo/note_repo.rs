//! Note repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Look up notes by id, resolving file-backed values from disk.
//! - Persist a note's new stored value to its database row or backing file.
//!
//! # Invariants
//! - A file-backed note whose file vanished is never recreated on write.
//! - Database-backed writes bump `updated_at`.
//! - Backing-file bytes that are not UTF-8 are decoded lossily, never
//!   reported as a read failure.

use crate::db::{open_db, open_db_in_memory, DbError};
use crate::model::note::{Note, NoteId};
use log::{debug, warn};
use rusqlite::{params, Connection, OptionalExtension};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::io;
use std::path::Path;
use std::sync::{Mutex, MutexGuard, PoisonError};

pub type RepoResult<T> = Result<T, RepoError>;

/// Note persistence and lookup errors.
#[derive(Debug)]
pub enum RepoError {
    Db(DbError),
    Io { path: String, source: io::Error },
    NotFound(NoteId),
    /// The note's backing file no longer exists.
    StaleBackingFile(String),
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::Io { path, source } => write!(f, "note file `{path}`: {source}"),
            Self::NotFound(id) => write!(f, "note not found: {id}"),
            Self::StaleBackingFile(path) => write!(f, "note file no longer exists: `{path}`"),
            Self::InvalidData(message) => write!(f, "invalid persisted note data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::Io { source, .. } => Some(source),
            Self::NotFound(_) | Self::StaleBackingFile(_) | Self::InvalidData(_) => None,
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

/// Input for creating a note row.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewNote {
    pub title: String,
    pub value: String,
    /// Empty keeps the value in the database.
    pub path: String,
    pub locked: bool,
}

/// Storage contract consumed by the checklist controller.
pub trait NoteRepository: Send + Sync {
    /// Returns the note with `id`, or `None` when it does not exist.
    fn get_note_by_id(&self, id: NoteId) -> RepoResult<Option<Note>>;
    /// Replaces the stored value of `note`.
    fn persist_note_value(&self, note: &Note, value: &str) -> RepoResult<()>;
}

/// SQLite-backed note repository.
pub struct SqliteNoteRepository {
    conn: Mutex<Connection>,
}

impl SqliteNoteRepository {
    /// Wraps a migrated/ready connection.
    pub fn new(conn: Connection) -> Self {
        Self {
            conn: Mutex::new(conn),
        }
    }

    /// Opens (and migrates) a database file.
    pub fn open(path: impl AsRef<Path>) -> RepoResult<Self> {
        Ok(Self::new(open_db(path)?))
    }

    /// Opens a migrated in-memory database.
    pub fn open_in_memory() -> RepoResult<Self> {
        Ok(Self::new(open_db_in_memory()?))
    }

    /// Inserts one note and returns its id.
    ///
    /// For file-backed notes the value is written to `path` and the row keeps
    /// an empty value.
    pub fn create_note(&self, note: &NewNote) -> RepoResult<NoteId> {
        if note.title.trim().is_empty() {
            return Err(RepoError::InvalidData("note title cannot be blank".to_string()));
        }

        let draft = Note {
            id: 0,
            title: note.title.clone(),
            value: String::new(),
            path: note.path.clone(),
            locked: note.locked,
        };
        let db_value = if draft.is_file_backed() {
            write_backing_file(&draft.path, &note.value)?;
            ""
        } else {
            note.value.as_str()
        };

        let conn = self.conn();
        conn.execute(
            "INSERT INTO notes (title, value, path, is_locked) VALUES (?1, ?2, ?3, ?4);",
            params![
                note.title.as_str(),
                db_value,
                note.path.as_str(),
                i64::from(note.locked)
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    fn conn(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl NoteRepository for SqliteNoteRepository {
    fn get_note_by_id(&self, id: NoteId) -> RepoResult<Option<Note>> {
        let row = self
            .conn()
            .query_row(
                "SELECT id, title, value, path, is_locked FROM notes WHERE id = ?1;",
                [id],
                |row| {
                    Ok((
                        row.get::<_, NoteId>("id")?,
                        row.get::<_, String>("title")?,
                        row.get::<_, String>("value")?,
                        row.get::<_, String>("path")?,
                        row.get::<_, i64>("is_locked")?,
                    ))
                },
            )
            .optional()?;

        let Some((id, title, db_value, path, is_locked)) = row else {
            return Ok(None);
        };
        let locked = match is_locked {
            0 => false,
            1 => true,
            other => {
                return Err(RepoError::InvalidData(format!(
                    "invalid is_locked value `{other}` in notes.is_locked"
                )));
            }
        };

        let mut note = Note {
            id,
            title,
            value: db_value,
            path,
            locked,
        };
        if note.is_file_backed() {
            note.value = read_backing_file(&note)?;
        }
        Ok(Some(note))
    }

    fn persist_note_value(&self, note: &Note, value: &str) -> RepoResult<()> {
        if note.is_file_backed() {
            if note.backing_file_missing() {
                return Err(RepoError::StaleBackingFile(note.path.clone()));
            }
            write_backing_file(&note.path, value)?;
            self.conn().execute(
                "UPDATE notes SET updated_at = (strftime('%s', 'now') * 1000) WHERE id = ?1;",
                [note.id],
            )?;
            return Ok(());
        }

        let changed = self.conn().execute(
            "UPDATE notes
             SET value = ?2,
                 updated_at = (strftime('%s', 'now') * 1000)
             WHERE id = ?1;",
            params![note.id, value],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound(note.id));
        }
        Ok(())
    }
}

fn read_backing_file(note: &Note) -> RepoResult<String> {
    match std::fs::read(&note.path) {
        Ok(bytes) => match String::from_utf8(bytes) {
            Ok(value) => Ok(value),
            Err(err) => {
                debug!(
                    "event=note_read module=repo status=ok note_id={} decode=lossy",
                    note.id
                );
                Ok(String::from_utf8_lossy(err.as_bytes()).into_owned())
            }
        },
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            warn!(
                "event=note_read module=repo status=skipped note_id={} reason=backing_file_missing",
                note.id
            );
            Ok(String::new())
        }
        Err(source) => Err(RepoError::Io {
            path: note.path.clone(),
            source,
        }),
    }
}

fn write_backing_file(path: &str, value: &str) -> RepoResult<()> {
    std::fs::write(path, value).map_err(|source| RepoError::Io {
        path: path.to_string(),
        source,
    })
}
