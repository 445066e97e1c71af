//! Checklist use-case services.
//!
//! # Responsibility
//! - Coordinate codec, sort policy and note storage for an open checklist.
//! - Keep storage calls off the interactive thread.

pub mod checklist_controller;
pub mod note_worker;
