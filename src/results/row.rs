use std::collections::{BTreeMap, HashMap};
use std::ops::Index;
use std::sync::Arc;

use crate::types::Value;

/// A decoded row addressable both by position and by column label.
///
/// When several columns share a label, lookups by label resolve to the last of them.
#[derive(Debug, Clone)]
pub struct Row {
    /// Column labels, shared by every row of a result
    pub column_names: Arc<Vec<String>>,
    /// Decoded values in column order
    pub values: Vec<Value>,
    // Label to index, shared with the owning result
    pub(crate) column_index_cache: Arc<HashMap<String, usize>>,
}

impl Row {
    /// Create a row, building its own label index.
    #[must_use]
    pub fn new(column_names: Arc<Vec<String>>, values: Vec<Value>) -> Self {
        let cache = Arc::new(build_index(&column_names));
        Self {
            column_names,
            values,
            column_index_cache: cache,
        }
    }

    pub(crate) fn with_cache(
        column_names: Arc<Vec<String>>,
        values: Vec<Value>,
        column_index_cache: Arc<HashMap<String, usize>>,
    ) -> Self {
        Self {
            column_names,
            values,
            column_index_cache,
        }
    }

    #[must_use]
    pub fn get_column_index(&self, column_name: &str) -> Option<usize> {
        self.column_index_cache.get(column_name).copied()
    }

    /// Get a value by column label
    #[must_use]
    pub fn get(&self, column_name: &str) -> Option<&Value> {
        self.get_column_index(column_name)
            .and_then(|idx| self.values.get(idx))
    }

    /// Get a value by column position
    #[must_use]
    pub fn get_by_index(&self, index: usize) -> Option<&Value> {
        self.values.get(index)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// The keyed half of the row: label to value, later duplicate labels winning.
    #[must_use]
    pub fn to_map(&self) -> BTreeMap<String, Value> {
        keyed(&self.column_names, self.values.clone())
    }
}

impl Index<usize> for Row {
    type Output = Value;

    fn index(&self, index: usize) -> &Value {
        &self.values[index]
    }
}

impl Index<&str> for Row {
    type Output = Value;

    fn index(&self, column_name: &str) -> &Value {
        match self.get(column_name) {
            Some(value) => value,
            None => panic!("no column labelled '{column_name}'"),
        }
    }
}

pub(crate) fn build_index(column_names: &[String]) -> HashMap<String, usize> {
    // collect keeps the last index for a repeated label
    column_names
        .iter()
        .enumerate()
        .map(|(i, name)| (name.clone(), i))
        .collect()
}

pub(crate) fn keyed(column_names: &[String], values: Vec<Value>) -> BTreeMap<String, Value> {
    column_names.iter().cloned().zip(values).collect()
}

/// Target of object fetches: receives each decoded column by label.
///
/// ```rust
/// use rds_data_middleware::prelude::*;
///
/// #[derive(Default)]
/// struct User {
///     name: String,
///     extra: DynamicObject,
/// }
///
/// impl FieldAssignable for User {
///     fn assign(&mut self, label: &str, value: Value) -> Result<Option<Value>, String> {
///         match label {
///             "name" => match value {
///                 Value::Text(name) => self.name = name,
///                 other => return Err(format!("name must be text, got {other:?}")),
///             },
///             _ => return Ok(Some(value)),
///         }
///         Ok(None)
///     }
///
///     fn attach(&mut self, label: &str, value: Value) {
///         self.extra.insert(label, value);
///     }
/// }
/// ```
pub trait FieldAssignable: Default {
    /// Assign `value` to the member named `label`.
    ///
    /// Hand the value back as `Ok(Some(value))` when there is no such member; it is then
    /// passed to [`FieldAssignable::attach`].
    ///
    /// # Errors
    /// A description of why the value cannot be stored in the member.
    fn assign(&mut self, label: &str, value: Value) -> Result<Option<Value>, String>;

    /// Keep a value that has no declared member. Dropped unless overridden.
    fn attach(&mut self, label: &str, value: Value) {
        let _ = (label, value);
    }
}

/// Object with members created on the fly from column labels.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DynamicObject {
    members: BTreeMap<String, Value>,
}

impl DynamicObject {
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.members.get(name)
    }

    pub fn insert(&mut self, name: impl Into<String>, value: Value) {
        self.members.insert(name.into(), value);
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.members.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.members.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    #[must_use]
    pub fn into_inner(self) -> BTreeMap<String, Value> {
        self.members
    }
}

impl FieldAssignable for DynamicObject {
    fn assign(&mut self, label: &str, value: Value) -> Result<Option<Value>, String> {
        self.insert(label, value);
        Ok(None)
    }
}

/// One row in the shape selected by a [`crate::FetchMode`].
#[derive(Debug, Clone)]
pub enum FetchedRow {
    Numeric(Vec<Value>),
    Associative(BTreeMap<String, Value>),
    Mixed(Row),
    Object(DynamicObject),
    Column(Value),
}

impl FetchedRow {
    #[must_use]
    pub fn into_numeric(self) -> Option<Vec<Value>> {
        match self {
            FetchedRow::Numeric(values) => Some(values),
            FetchedRow::Mixed(row) => Some(row.values),
            _ => None,
        }
    }

    #[must_use]
    pub fn into_associative(self) -> Option<BTreeMap<String, Value>> {
        match self {
            FetchedRow::Associative(map) => Some(map),
            FetchedRow::Mixed(row) => Some(row.to_map()),
            FetchedRow::Object(object) => Some(object.into_inner()),
            _ => None,
        }
    }

    #[must_use]
    pub fn into_column(self) -> Option<Value> {
        match self {
            FetchedRow::Column(value) => Some(value),
            _ => None,
        }
    }
}
