use checklist_core::{NewNote, Note, NoteRepository, RepoError, SqliteNoteRepository};

#[test]
fn create_and_get_note_round_trips_fields() {
    let repo = SqliteNoteRepository::open_in_memory().unwrap();
    let note_id = repo
        .create_note(&NewNote {
            title: "groceries".to_string(),
            value: "milk".to_string(),
            locked: true,
            ..NewNote::default()
        })
        .unwrap();

    let note = repo.get_note_by_id(note_id).unwrap().unwrap();
    assert_eq!(
        note,
        Note {
            id: note_id,
            title: "groceries".to_string(),
            value: "milk".to_string(),
            path: String::new(),
            locked: true,
        }
    );
}

#[test]
fn unknown_note_id_returns_none() {
    let repo = SqliteNoteRepository::open_in_memory().unwrap();
    assert!(repo.get_note_by_id(12).unwrap().is_none());
}

#[test]
fn persist_replaces_database_value() {
    let repo = SqliteNoteRepository::open_in_memory().unwrap();
    let note_id = repo
        .create_note(&NewNote {
            title: "todo".to_string(),
            ..NewNote::default()
        })
        .unwrap();
    let note = repo.get_note_by_id(note_id).unwrap().unwrap();

    repo.persist_note_value(&note, "[]").unwrap();
    assert_eq!(repo.get_note_by_id(note_id).unwrap().unwrap().value, "[]");
}

#[test]
fn persist_to_deleted_row_is_not_found() {
    let repo = SqliteNoteRepository::open_in_memory().unwrap();
    let ghost = Note {
        id: 77,
        title: "ghost".to_string(),
        value: String::new(),
        path: String::new(),
        locked: false,
    };

    let err = repo.persist_note_value(&ghost, "[]").unwrap_err();
    assert!(matches!(err, RepoError::NotFound(77)));
}

#[test]
fn persist_to_vanished_file_is_stale_and_not_recreated() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("note.txt");
    let repo = SqliteNoteRepository::open_in_memory().unwrap();
    let note_id = repo
        .create_note(&NewNote {
            title: "file note".to_string(),
            value: "one".to_string(),
            path: path.to_str().unwrap().to_string(),
            locked: false,
        })
        .unwrap();
    let note = repo.get_note_by_id(note_id).unwrap().unwrap();
    assert_eq!(note.value, "one");

    std::fs::remove_file(&path).unwrap();
    let err = repo.persist_note_value(&note, "two").unwrap_err();
    assert!(matches!(err, RepoError::StaleBackingFile(_)));
    assert!(!path.exists());
    assert_eq!(repo.get_note_by_id(note_id).unwrap().unwrap().value, "");
}

#[test]
fn content_uri_notes_keep_value_in_database() {
    let repo = SqliteNoteRepository::open_in_memory().unwrap();
    let note_id = repo
        .create_note(&NewNote {
            title: "shared".to_string(),
            value: "tea".to_string(),
            path: "content://provider/notes/3".to_string(),
            locked: false,
        })
        .unwrap();

    let note = repo.get_note_by_id(note_id).unwrap().unwrap();
    assert_eq!(note.value, "tea");
    repo.persist_note_value(&note, "coffee").unwrap();
    assert_eq!(repo.get_note_by_id(note_id).unwrap().unwrap().value, "coffee");
}

#[test]
fn blank_title_is_rejected() {
    let repo = SqliteNoteRepository::open_in_memory().unwrap();
    let err = repo
        .create_note(&NewNote {
            title: "  ".to_string(),
            ..NewNote::default()
        })
        .unwrap_err();
    assert!(matches!(err, RepoError::InvalidData(_)));
}

#[test]
fn backing_file_with_invalid_utf8_reads_lossily() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("legacy.txt");
    let repo = SqliteNoteRepository::open_in_memory().unwrap();
    let note_id = repo
        .create_note(&NewNote {
            title: "legacy".to_string(),
            path: path.to_str().unwrap().to_string(),
            ..NewNote::default()
        })
        .unwrap();
    std::fs::write(&path, b"Milk\n\xff\xfeEggs\n").unwrap();

    let note = repo.get_note_by_id(note_id).unwrap().unwrap();
    assert_eq!(note.value, "Milk\n\u{fffd}\u{fffd}Eggs\n");
}
