//! Checklist stored-value codec.
//!
//! # Responsibility
//! - Decode the structured JSON array form `[{id, createdAt, title, isDone}]`.
//! - Fall back to legacy line-per-item migration when structured decode fails.
//! - Encode items back to the structured form in their current order.
//!
//! # Invariants
//! - `decode` always returns a list; the worst case is an empty one.
//! - Output of `encode` decodes on the structured path, never via migration.
//! - Unknown JSON fields are ignored.

use crate::model::checklist_item::{
    normalize_titles, split_item_lines, ChecklistItem, ChecklistItemId,
};
use log::{debug, info};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type CodecResult<T> = Result<T, CodecError>;

/// Why the structured decoder rejected a stored value.
#[derive(Debug)]
pub enum StructuredDecodeError {
    /// Not JSON, or JSON that is not an array of item objects.
    Malformed(serde_json::Error),
}

impl Display for StructuredDecodeError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Malformed(err) => write!(f, "stored value is not a checklist array: {err}"),
        }
    }
}

impl Error for StructuredDecodeError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Malformed(err) => Some(err),
        }
    }
}

/// Encoding failure.
#[derive(Debug)]
pub enum CodecError {
    Serialize(serde_json::Error),
}

impl Display for CodecError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Serialize(err) => write!(f, "failed to encode checklist: {err}"),
        }
    }
}

impl Error for CodecError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Serialize(err) => Some(err),
        }
    }
}

impl From<serde_json::Error> for CodecError {
    fn from(value: serde_json::Error) -> Self {
        Self::Serialize(value)
    }
}

/// Which path produced a decoded list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeOrigin {
    /// Stored value was absent, blank or JSON `null`.
    Empty,
    /// Stored value was a structured checklist array.
    Structured,
    /// Stored value was plain text and has been migrated.
    LegacyMigrated,
}

/// Decoded items plus the path that produced them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedChecklist {
    pub items: Vec<ChecklistItem>,
    pub origin: DecodeOrigin,
}

impl DecodedChecklist {
    /// Whether the caller must persist the re-encoded form immediately.
    pub fn needs_write_through(&self) -> bool {
        self.origin == DecodeOrigin::LegacyMigrated
    }
}

/// Decodes a stored value, migrating legacy plain text when needed.
pub fn decode(raw: Option<&str>) -> DecodedChecklist {
    let Some(raw) = raw.filter(|value| !value.trim().is_empty()) else {
        return DecodedChecklist {
            items: Vec::new(),
            origin: DecodeOrigin::Empty,
        };
    };

    match decode_structured(raw) {
        Ok(Some(items)) => DecodedChecklist {
            items,
            origin: DecodeOrigin::Structured,
        },
        Ok(None) => DecodedChecklist {
            items: Vec::new(),
            origin: DecodeOrigin::Empty,
        },
        Err(err) => {
            let items = migrate_legacy(raw);
            info!(
                "event=checklist_decode module=codec status=migrated item_count={} reason={}",
                items.len(),
                decode_failure_kind(&err)
            );
            DecodedChecklist {
                items,
                origin: DecodeOrigin::LegacyMigrated,
            }
        }
    }
}

/// Parses the structured JSON form.
///
/// Returns `Ok(None)` for a JSON `null` document. Entries whose title is
/// blank after trimming are dropped; remaining titles are trimmed.
pub fn decode_structured(
    raw: &str,
) -> Result<Option<Vec<ChecklistItem>>, StructuredDecodeError> {
    let parsed: Option<Vec<ChecklistItem>> =
        serde_json::from_str(raw).map_err(StructuredDecodeError::Malformed)?;

    Ok(parsed.map(|items| {
        let (kept, dropped) = normalize_titles(items);
        if dropped > 0 {
            debug!(
                "event=checklist_decode module=codec status=ok dropped_blank_items={}",
                dropped
            );
        }
        kept
    }))
}

/// Converts legacy plain text into not-done items with positional ids.
pub fn migrate_legacy(raw: &str) -> Vec<ChecklistItem> {
    split_item_lines(raw)
        .into_iter()
        .enumerate()
        .map(|(index, title)| ChecklistItem::new(index as ChecklistItemId, title))
        .collect()
}

/// Encodes items as the structured JSON array, preserving order.
pub fn encode(items: &[ChecklistItem]) -> CodecResult<String> {
    Ok(serde_json::to_string(items)?)
}

fn decode_failure_kind(err: &StructuredDecodeError) -> &'static str {
    match err {
        StructuredDecodeError::Malformed(inner) => match inner.classify() {
            serde_json::error::Category::Syntax => "syntax",
            serde_json::error::Category::Data => "shape",
            serde_json::error::Category::Eof => "eof",
            serde_json::error::Category::Io => "io",
        },
    }
}

#[cfg(test)]
mod tests {
    use super::{decode_failure_kind, decode_structured};

    #[test]
    fn failure_kind_separates_syntax_from_shape() {
        let syntax = decode_structured("Milk\nEggs").unwrap_err();
        assert_eq!(decode_failure_kind(&syntax), "syntax");

        let shape = decode_structured(r#"{"id": 1}"#).unwrap_err();
        assert_eq!(decode_failure_kind(&shape), "shape");
    }

    #[test]
    fn null_document_is_not_a_failure() {
        assert_eq!(decode_structured("null").unwrap(), None);
    }
}
