//! Note read model consumed by the checklist controller.
//!
//! # Responsibility
//! - Carry note identity, lock state and the opaque stored value.
//! - Decide whether a file-backed note still has its backing file.
//!
//! # Invariants
//! - `value` is treated as an opaque encoded blob outside the codec.
//! - `content://` paths are provider handles and never checked on disk.

use std::path::Path;

/// Stable note identifier assigned by storage.
pub type NoteId = i64;

const CONTENT_URI_PREFIX: &str = "content://";

/// A note as returned by the note repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Note {
    pub id: NoteId,
    pub title: String,
    /// Stored checklist payload (structured JSON or legacy plain text).
    pub value: String,
    /// Backing file path. Empty when the value lives in the database.
    pub path: String,
    pub locked: bool,
}

impl Note {
    pub fn is_locked(&self) -> bool {
        self.locked
    }

    /// Whether the value is stored in a filesystem file instead of the db.
    pub fn is_file_backed(&self) -> bool {
        !self.path.is_empty() && !self.path.starts_with(CONTENT_URI_PREFIX)
    }

    /// Returns `true` when the note points at a file that no longer exists.
    pub fn backing_file_missing(&self) -> bool {
        self.is_file_backed() && !Path::new(&self.path).exists()
    }

    /// Locked notes stay hidden unless the user explicitly revealed them.
    pub fn content_visible(&self, show_locked_content: bool) -> bool {
        !self.locked || show_locked_content
    }
}

#[cfg(test)]
mod tests {
    use super::Note;

    fn note_with_path(path: &str) -> Note {
        Note {
            id: 1,
            title: "groceries".to_string(),
            value: String::new(),
            path: path.to_string(),
            locked: false,
        }
    }

    #[test]
    fn content_uri_is_never_reported_missing() {
        let note = note_with_path("content://com.example/notes/4");
        assert!(!note.is_file_backed());
        assert!(!note.backing_file_missing());
    }

    #[test]
    fn vanished_file_is_reported_missing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gone.txt");
        let note = note_with_path(path.to_str().unwrap());
        assert!(note.backing_file_missing());

        std::fs::write(&path, "x").unwrap();
        assert!(!note.backing_file_missing());
    }

    #[test]
    fn locked_note_needs_override_to_show() {
        let mut note = note_with_path("");
        note.locked = true;
        assert!(!note.content_visible(false));
        assert!(note.content_visible(true));
    }
}
