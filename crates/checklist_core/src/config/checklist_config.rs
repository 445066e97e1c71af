//! Checklist configuration snapshot and sources.

use serde::{Deserialize, Serialize};
use std::sync::{Arc, PoisonError, RwLock};

/// Ordering applied to checklist items.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortMode {
    /// Stored order is the user's manual order; no comparator runs.
    #[default]
    Custom,
    /// Case-insensitive natural order of titles.
    Alphabetical,
    /// Creation timestamp, oldest first.
    DateCreated,
    /// Item id, i.e. the order items were added in.
    InsertionOrder,
}

/// Read-only configuration snapshot for one checklist operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ChecklistConfig {
    pub sort_mode: SortMode,
    /// Reverses the comparator. Ignored in `SortMode::Custom`.
    pub sort_descending: bool,
    pub move_done_items_to_bottom: bool,
    pub add_new_items_at_top: bool,
}

impl ChecklistConfig {
    /// Parses a JSON configuration document. Missing fields take defaults.
    pub fn from_json_str(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }
}

/// Supplier of configuration snapshots.
pub trait ConfigSource {
    /// Returns the configuration in effect right now.
    fn snapshot(&self) -> ChecklistConfig;
}

impl ConfigSource for ChecklistConfig {
    fn snapshot(&self) -> ChecklistConfig {
        *self
    }
}

/// Process-wide configuration handle that other components may update.
///
/// Clones share the same underlying settings.
#[derive(Debug, Clone, Default)]
pub struct SharedConfig {
    inner: Arc<RwLock<ChecklistConfig>>,
}

impl SharedConfig {
    pub fn new(initial: ChecklistConfig) -> Self {
        Self {
            inner: Arc::new(RwLock::new(initial)),
        }
    }

    /// Applies `change` to the shared settings.
    pub fn update(&self, change: impl FnOnce(&mut ChecklistConfig)) {
        let mut guard = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        change(&mut guard);
    }
}

impl ConfigSource for SharedConfig {
    fn snapshot(&self) -> ChecklistConfig {
        *self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }
}
