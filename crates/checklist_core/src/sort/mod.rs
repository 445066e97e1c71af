//! Checklist ordering.
//!
//! # Responsibility
//! - Order items from a configuration snapshot.
//!
//! # Invariants
//! - Sorting is stable and produces a new list; input is never mutated.
//! - Custom order is only changed by the done-items overlay.

pub mod sort_policy;
