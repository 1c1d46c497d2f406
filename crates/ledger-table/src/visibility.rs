//! Column visibility.

use std::collections::BTreeSet;

use ledger_model::ColumnDefinition;
use tracing::debug;

/// Set of visible column keys for one table.
///
/// Nothing prevents hiding every column; an empty set projects to no columns.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ColumnVisibility {
    visible: BTreeSet<String>,
}

impl ColumnVisibility {
    /// Every declared column visible.
    pub fn initialize(columns: &[ColumnDefinition]) -> Self {
        Self::from_keys(columns.iter().map(|column| column.key.clone()))
    }

    pub fn from_keys<I, K>(keys: I) -> Self
    where
        I: IntoIterator<Item = K>,
        K: Into<String>,
    {
        Self {
            visible: keys.into_iter().map(Into::into).collect(),
        }
    }

    pub fn is_visible(&self, key: &str) -> bool {
        self.visible.contains(key)
    }

    pub fn keys(&self) -> &BTreeSet<String> {
        &self.visible
    }

    pub fn len(&self) -> usize {
        self.visible.len()
    }

    pub fn is_empty(&self) -> bool {
        self.visible.is_empty()
    }

    /// Flip `key` and report whether it is now visible.
    pub fn toggle(&mut self, key: &str) -> bool {
        if self.visible.remove(key) {
            false
        } else {
            self.visible.insert(key.to_string());
            true
        }
    }

    #[must_use]
    pub fn toggled(&self, key: &str) -> Self {
        let mut next = self.clone();
        next.toggle(key);
        next
    }

    /// Visible columns in declaration order.
    pub fn project<'c>(&self, columns: &'c [ColumnDefinition]) -> Vec<&'c ColumnDefinition> {
        columns
            .iter()
            .filter(|column| self.visible.contains(&column.key))
            .collect()
    }

    /// Drop keys that `columns` no longer declares. Returns how many were
    /// dropped.
    pub fn reconcile(&mut self, columns: &[ColumnDefinition]) -> usize {
        let before = self.visible.len();
        self.visible
            .retain(|key| columns.iter().any(|column| &column.key == key));
        let dropped = before - self.visible.len();
        if dropped > 0 {
            debug!(dropped, "dropped stale visible column keys");
        }
        dropped
    }
}
