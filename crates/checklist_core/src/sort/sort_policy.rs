//! Two-stage checklist sort policy.
//!
//! Stage one applies the comparator of the configured `SortMode` (skipped for
//! `Custom`). Stage two, when `move_done_items_to_bottom` is set, stably moves
//! done items below not-done ones without disturbing stage one's order.

use crate::config::checklist_config::{ChecklistConfig, SortMode};
use crate::model::checklist_item::ChecklistItem;
use once_cell::sync::Lazy;
use regex::Regex;
use std::cmp::Ordering;

static TITLE_CHUNK_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\d+|\D+").expect("valid title chunk regex"));

/// Returns `items` ordered according to `config`.
pub fn order(items: &[ChecklistItem], config: &ChecklistConfig) -> Vec<ChecklistItem> {
    let mut ordered = items.to_vec();

    if config.sort_mode != SortMode::Custom {
        // Stable: items with equal keys keep their relative order.
        ordered.sort_by(|left, right| {
            let primary = compare_by_mode(config.sort_mode, left, right);
            if config.sort_descending {
                primary.reverse()
            } else {
                primary
            }
        });
    }

    if config.move_done_items_to_bottom {
        ordered.sort_by_key(|item| item.is_done);
    }

    ordered
}

fn compare_by_mode(mode: SortMode, left: &ChecklistItem, right: &ChecklistItem) -> Ordering {
    match mode {
        SortMode::Custom => Ordering::Equal,
        SortMode::Alphabetical => {
            compare_natural(&left.title.to_lowercase(), &right.title.to_lowercase())
        }
        SortMode::DateCreated => left.created_at_or_zero().cmp(&right.created_at_or_zero()),
        SortMode::InsertionOrder => left.id.cmp(&right.id),
    }
}

/// Compares titles so that digit runs order by numeric value.
///
/// `"item 2"` sorts before `"item 10"`; other runs compare lexically.
pub fn compare_natural(left: &str, right: &str) -> Ordering {
    let mut left_chunks = TITLE_CHUNK_RE.find_iter(left).map(|m| m.as_str());
    let mut right_chunks = TITLE_CHUNK_RE.find_iter(right).map(|m| m.as_str());

    loop {
        match (left_chunks.next(), right_chunks.next()) {
            (None, None) => return Ordering::Equal,
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(l), Some(r)) => {
                let result = compare_chunk(l, r);
                if result != Ordering::Equal {
                    return result;
                }
            }
        }
    }
}

fn compare_chunk(left: &str, right: &str) -> Ordering {
    let left_numeric = left.starts_with(|c: char| c.is_ascii_digit());
    let right_numeric = right.starts_with(|c: char| c.is_ascii_digit());
    if !(left_numeric && right_numeric) {
        return left.cmp(right);
    }

    let left_digits = left.trim_start_matches('0');
    let right_digits = right.trim_start_matches('0');
    left_digits
        .len()
        .cmp(&right_digits.len())
        .then_with(|| left_digits.cmp(right_digits))
        .then_with(|| left.len().cmp(&right.len()))
}
