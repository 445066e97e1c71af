//! Checklist item entity.
//!
//! # Responsibility
//! - Define the `(id, createdAt, title, isDone)` record and its wire names.
//! - Own the line-splitting and id-allocation rules shared by add and
//!   legacy migration paths.
//!
//! # Invariants
//! - `id` is the identity key; lookups never compare by content.
//! - New ids are `max(existing) + 1`, so removals leave gaps. No id is
//!   allocated past `i64::MAX`.
//! - `title` is trimmed and non-empty once persisted.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Identity of one item inside a single checklist.
pub type ChecklistItemId = i64;

/// One checklist line with its completion flag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChecklistItem {
    pub id: ChecklistItemId,
    /// Unix epoch milliseconds. Absent for items imported from plain text.
    #[serde(
        default,
        alias = "dateCreated",
        skip_serializing_if = "Option::is_none"
    )]
    pub created_at: Option<i64>,
    pub title: String,
    pub is_done: bool,
}

impl ChecklistItem {
    /// Creates a not-done item without a creation timestamp.
    pub fn new(id: ChecklistItemId, title: impl Into<String>) -> Self {
        Self {
            id,
            created_at: None,
            title: title.into(),
            is_done: false,
        }
    }

    /// Creates a not-done item stamped with `created_at` epoch millis.
    pub fn created(id: ChecklistItemId, created_at: i64, title: impl Into<String>) -> Self {
        Self {
            created_at: Some(created_at),
            ..Self::new(id, title)
        }
    }

    /// Returns a copy with the completion flag flipped.
    pub fn toggled(&self) -> Self {
        Self {
            is_done: !self.is_done,
            ..self.clone()
        }
    }

    /// Sort key for creation time; missing timestamps sort as `0`.
    pub fn created_at_or_zero(&self) -> i64 {
        self.created_at.unwrap_or(0)
    }
}

/// Splits free text into item titles.
///
/// Lines are split on `\n`, trimmed, and blank lines are dropped. Input order
/// is preserved.
pub fn split_item_lines(text: &str) -> Vec<String> {
    text.split('\n')
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

/// Returns the id the next added item should receive.
///
/// An empty checklist starts at `1`. Returns `None` once the maximum id is
/// already `i64::MAX`.
pub fn next_item_id(items: &[ChecklistItem]) -> Option<ChecklistItemId> {
    items.iter().map(|item| item.id).max().unwrap_or(0).checked_add(1)
}

/// Trims every title and drops items whose title is blank.
///
/// Returns the kept items and how many were dropped.
pub fn normalize_titles(items: Vec<ChecklistItem>) -> (Vec<ChecklistItem>, usize) {
    let total = items.len();
    let kept: Vec<ChecklistItem> = items
        .into_iter()
        .filter_map(|item| {
            let title = item.title.trim();
            if title.is_empty() {
                None
            } else {
                Some(ChecklistItem {
                    title: title.to_string(),
                    ..item
                })
            }
        })
        .collect();
    let dropped = total - kept.len();
    (kept, dropped)
}

/// Gives every repeated id after its first occurrence a fresh id.
///
/// Fresh ids continue from the list maximum. Repeats that cannot get an id
/// without passing `i64::MAX` are dropped. Returns the resulting list and how
/// many items were re-identified or dropped.
pub fn reassign_duplicate_ids(items: Vec<ChecklistItem>) -> (Vec<ChecklistItem>, usize) {
    let mut next_id = next_item_id(&items);
    let mut seen = HashSet::with_capacity(items.len());
    let mut touched = 0;
    let mut result = Vec::with_capacity(items.len());

    for item in items {
        if seen.insert(item.id) {
            result.push(item);
            continue;
        }
        touched += 1;
        let Some(id) = next_id else {
            continue;
        };
        next_id = id.checked_add(1);
        seen.insert(id);
        result.push(ChecklistItem { id, ..item });
    }
    (result, touched)
}

/// Returns the index of the item with `id`, if present.
pub fn position_of(items: &[ChecklistItem], id: ChecklistItemId) -> Option<usize> {
    items.iter().position(|item| item.id == id)
}
