//! Row access.
//!
//! Rows are owned by the host and opaque to the engine. The engine only reads
//! them through a [`FieldAccess`] capability: a keyed lookup plus a scan over
//! every value (used by whole-row search). [`PropertyLookup`] is the default
//! accessor for types implementing [`Row`]; [`KeyedAccessor`] adapts a plain
//! closure for row types the host does not want to implement [`Row`] for.

use std::collections::{BTreeMap, HashMap};

use crate::value::CellValue;

/// A key/value record, the row type produced by the loaders.
pub type Record = BTreeMap<String, CellValue>;

/// Property-style access to a row's fields.
pub trait Row {
    /// Read the field stored under `key`, `Null` when absent.
    fn field(&self, key: &str) -> CellValue;

    /// Returns true if `predicate` holds for any stored value.
    fn any_value(&self, predicate: &mut dyn FnMut(&CellValue) -> bool) -> bool;
}

impl Row for BTreeMap<String, CellValue> {
    fn field(&self, key: &str) -> CellValue {
        self.get(key).cloned().unwrap_or_default()
    }

    fn any_value(&self, predicate: &mut dyn FnMut(&CellValue) -> bool) -> bool {
        self.values().any(|value| predicate(value))
    }
}

impl Row for HashMap<String, CellValue> {
    fn field(&self, key: &str) -> CellValue {
        self.get(key).cloned().unwrap_or_default()
    }

    fn any_value(&self, predicate: &mut dyn FnMut(&CellValue) -> bool) -> bool {
        self.values().any(|value| predicate(value))
    }
}

impl Row for serde_json::Map<String, serde_json::Value> {
    fn field(&self, key: &str) -> CellValue {
        self.get(key).map(CellValue::from).unwrap_or_default()
    }

    fn any_value(&self, predicate: &mut dyn FnMut(&CellValue) -> bool) -> bool {
        self.values().any(|value| predicate(&CellValue::from(value)))
    }
}

impl Row for serde_json::Value {
    fn field(&self, key: &str) -> CellValue {
        match self {
            serde_json::Value::Object(map) => map.field(key),
            _ => CellValue::Null,
        }
    }

    fn any_value(&self, predicate: &mut dyn FnMut(&CellValue) -> bool) -> bool {
        match self {
            serde_json::Value::Object(map) => map.any_value(predicate),
            _ => false,
        }
    }
}

/// Capability used by the engine to read rows of type `R`.
pub trait FieldAccess<R: ?Sized> {
    fn field(&self, row: &R, key: &str) -> CellValue;

    fn any_value(&self, row: &R, predicate: &mut dyn FnMut(&CellValue) -> bool) -> bool;
}

/// Default accessor: plain property lookup through [`Row`].
#[derive(Debug, Clone, Copy, Default)]
pub struct PropertyLookup;

impl<R: Row + ?Sized> FieldAccess<R> for PropertyLookup {
    fn field(&self, row: &R, key: &str) -> CellValue {
        row.field(key)
    }

    fn any_value(&self, row: &R, predicate: &mut dyn FnMut(&CellValue) -> bool) -> bool {
        row.any_value(predicate)
    }
}

/// Accessor backed by a closure.
///
/// A closure can only answer keyed lookups, so whole-row search scans the
/// keys given at construction.
pub struct KeyedAccessor<F> {
    keys: Vec<String>,
    accessor: F,
}

impl<F> KeyedAccessor<F> {
    pub fn new<I, K>(keys: I, accessor: F) -> Self
    where
        I: IntoIterator<Item = K>,
        K: Into<String>,
    {
        Self {
            keys: keys.into_iter().map(Into::into).collect(),
            accessor,
        }
    }

    pub fn keys(&self) -> &[String] {
        &self.keys
    }
}

impl<R, F> FieldAccess<R> for KeyedAccessor<F>
where
    F: Fn(&R, &str) -> CellValue,
{
    fn field(&self, row: &R, key: &str) -> CellValue {
        (self.accessor)(row, key)
    }

    fn any_value(&self, row: &R, predicate: &mut dyn FnMut(&CellValue) -> bool) -> bool {
        self.keys
            .iter()
            .any(|key| predicate(&(self.accessor)(row, key)))
    }
}
