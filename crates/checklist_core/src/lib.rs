//! Core checklist logic for notes.
//! Decodes a note's stored value into checklist items, keeps them ordered
//! through edits, and writes the canonical form back.

pub mod codec;
pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;
pub mod sort;

pub use codec::checklist_codec::{
    decode, decode_structured, encode, migrate_legacy, CodecError, CodecResult, DecodeOrigin,
    DecodedChecklist, StructuredDecodeError,
};
pub use config::checklist_config::{ChecklistConfig, ConfigSource, SharedConfig, SortMode};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::checklist_item::{ChecklistItem, ChecklistItemId};
pub use model::note::{Note, NoteId};
pub use repo::note_repo::{NewNote, NoteRepository, RepoError, RepoResult, SqliteNoteRepository};
pub use service::checklist_controller::{
    ChecklistController, ChecklistError, ChecklistObserver, ChecklistResult, ControllerState,
};
pub use service::note_worker::WorkerError;
pub use sort::sort_policy::order;

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
