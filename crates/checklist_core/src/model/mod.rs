//! Domain model for checklist notes.
//!
//! # Responsibility
//! - Define the checklist item entity and its identity rules.
//! - Define the read model of the note that owns a checklist.
//!
//! # Invariants
//! - Item ids are unique within one checklist and never reassigned.
//! - Persisted item titles are trimmed and non-empty.

pub mod checklist_item;
pub mod note;
