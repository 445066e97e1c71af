//! Checklist display configuration.
//!
//! # Responsibility
//! - Define the read-only configuration snapshot consumed per operation.
//! - Provide the `ConfigSource` seam for process-wide settings.
//!
//! # Invariants
//! - Consumers call `snapshot()` at the start of each operation and never
//!   keep the result across operations.

pub mod checklist_config;
