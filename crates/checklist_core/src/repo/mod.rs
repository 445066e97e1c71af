//! Note storage collaborator.
//!
//! # Responsibility
//! - Define the contract the checklist controller uses to fetch and persist
//!   notes.
//! - Provide a SQLite implementation with optional file-backed values.
//!
//! # Invariants
//! - Implementations are `Send + Sync` so the background worker can share
//!   them with the interactive thread.

pub mod note_repo;
