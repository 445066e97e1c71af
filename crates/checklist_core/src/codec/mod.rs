//! Stored-value codec for checklist notes.
//!
//! # Responsibility
//! - Convert between a note's stored text and an ordered item list.
//! - Recognize legacy plain-text content and migrate it one way.
//!
//! # Invariants
//! - Encoding never re-sorts; it writes the given order.
//! - Decoding never fails; legacy migration is the fallback.

pub mod checklist_codec;
