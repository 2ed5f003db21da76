use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use super::row::{DynamicObject, FetchedRow, FieldAssignable, Row, build_index, keyed};
use crate::codec::decode_field;
use crate::error::RdsDataError;
use crate::field::Field;
use crate::transport::ExecuteStatementResponse;
use crate::types::{FetchMode, Value};

/// Column label and position within the result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnDescriptor {
    pub label: String,
    pub ordinal: usize,
}

/// Forward-only cursor over the records of one statement response.
///
/// Rows are decoded lazily as they are fetched; the cursor only moves past a row once it
/// decoded successfully.
#[derive(Debug, Clone, Default)]
pub struct RdsDataResult {
    columns: Vec<ColumnDescriptor>,
    column_names: Arc<Vec<String>>,
    column_index_cache: Arc<HashMap<String, usize>>,
    records: Vec<Vec<Field>>,
    position: usize,
    records_updated: Option<i64>,
    generated: Option<Field>,
}

impl RdsDataResult {
    /// A result with no columns and no rows, as produced by statements that never reach
    /// the transport.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn columns(&self) -> &[ColumnDescriptor] {
        &self.columns
    }

    #[must_use]
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Rows changed by a mutation, or the number of records a query returned.
    #[must_use]
    pub fn row_count(&self) -> usize {
        match self.records_updated {
            Some(updated) => usize::try_from(updated).unwrap_or(0),
            None => self.records.len(),
        }
    }

    /// The first generated field of an insert, decoded.
    ///
    /// # Errors
    /// Returns `RdsDataError::UnsupportedField` if the generated field cannot be decoded.
    pub fn generated_identifier(&self) -> Result<Option<Value>, RdsDataError> {
        self.generated.as_ref().map(decode_field).transpose()
    }

    /// Release the records. Further fetches report the end of the rows.
    pub fn close(&mut self) {
        self.records = Vec::new();
        self.position = 0;
    }

    fn current(&self) -> Option<&[Field]> {
        self.records.get(self.position).map(Vec::as_slice)
    }

    fn decode_current(&self) -> Result<Option<Vec<Value>>, RdsDataError> {
        self.current()
            .map(|record| record.iter().map(decode_field).collect())
            .transpose()
    }

    /// Fetch the next row in `mode`, or `None` once the rows are exhausted.
    ///
    /// # Errors
    /// Returns `RdsDataError::UnsupportedField` when a field cannot be decoded and
    /// `RdsDataError::UnsupportedFetchMode` for a column index outside the row.
    pub fn fetch(&mut self, mode: FetchMode) -> Result<Option<FetchedRow>, RdsDataError> {
        let fetched = match mode {
            FetchMode::Numeric => self.fetch_numeric()?.map(FetchedRow::Numeric),
            FetchMode::Associative => self.fetch_associative()?.map(FetchedRow::Associative),
            FetchMode::Mixed => self.fetch_mixed()?.map(FetchedRow::Mixed),
            FetchMode::StandardObject => self
                .fetch_object::<DynamicObject>()?
                .map(FetchedRow::Object),
            FetchMode::Column(index) => self.fetch_column(index)?.map(FetchedRow::Column),
        };
        Ok(fetched)
    }

    /// Fetch the next row as values in column order.
    ///
    /// # Errors
    /// Returns `RdsDataError::UnsupportedField` when a field cannot be decoded.
    pub fn fetch_numeric(&mut self) -> Result<Option<Vec<Value>>, RdsDataError> {
        let values = self.decode_current()?;
        if values.is_some() {
            self.position += 1;
        }
        Ok(values)
    }

    /// Fetch the next row keyed by column label.
    ///
    /// # Errors
    /// Returns `RdsDataError::UnsupportedField` when a field cannot be decoded.
    pub fn fetch_associative(&mut self) -> Result<Option<BTreeMap<String, Value>>, RdsDataError> {
        Ok(self
            .fetch_numeric()?
            .map(|values| keyed(&self.column_names, values)))
    }

    /// Fetch the next row addressable by both position and label.
    ///
    /// # Errors
    /// Returns `RdsDataError::UnsupportedField` when a field cannot be decoded.
    pub fn fetch_mixed(&mut self) -> Result<Option<Row>, RdsDataError> {
        Ok(self.fetch_numeric()?.map(|values| {
            Row::with_cache(
                Arc::clone(&self.column_names),
                values,
                Arc::clone(&self.column_index_cache),
            )
        }))
    }

    /// Fetch one column of the next row. `None` only means the rows are exhausted; a NULL
    /// column is `Some(Value::Null)`.
    ///
    /// # Errors
    /// Returns `RdsDataError::UnsupportedFetchMode` for an index outside the row, leaving
    /// the cursor where it is, and `RdsDataError::UnsupportedField` when the field cannot
    /// be decoded.
    pub fn fetch_column(&mut self, index: usize) -> Result<Option<Value>, RdsDataError> {
        let Some(record) = self.current() else {
            return Ok(None);
        };
        let field = record.get(index).ok_or_else(|| {
            RdsDataError::UnsupportedFetchMode(format!(
                "column index {index} is out of range for {} column(s)",
                record.len()
            ))
        })?;
        let value = decode_field(field)?;
        self.position += 1;
        Ok(Some(value))
    }

    /// Fetch the next row into a new `T`, assigning columns by label.
    ///
    /// # Errors
    /// Returns `RdsDataError::ObjectMapping` naming `T` when a member rejects its value.
    pub fn fetch_object<T: FieldAssignable>(&mut self) -> Result<Option<T>, RdsDataError> {
        let Some(values) = self.decode_current()? else {
            return Ok(None);
        };

        let mut object = T::default();
        for (label, value) in self.column_names.iter().zip(values) {
            let leftover = object
                .assign(label, value)
                .map_err(|reason| RdsDataError::ObjectMapping {
                    type_name: std::any::type_name::<T>(),
                    reason: format!("column '{label}': {reason}"),
                })?;
            if let Some(value) = leftover {
                object.attach(label, value);
            }
        }

        self.position += 1;
        Ok(Some(object))
    }

    /// Drain the remaining rows in `mode`.
    ///
    /// # Errors
    /// Stops at the first row that fails; rows before it are consumed.
    pub fn fetch_all(&mut self, mode: FetchMode) -> Result<Vec<FetchedRow>, RdsDataError> {
        let mut rows = Vec::with_capacity(self.records.len().saturating_sub(self.position));
        while let Some(row) = self.fetch(mode)? {
            rows.push(row);
        }
        Ok(rows)
    }

    /// Drain the remaining rows into `T`s.
    ///
    /// # Errors
    /// Stops at the first row that fails to map.
    pub fn fetch_all_objects<T: FieldAssignable>(&mut self) -> Result<Vec<T>, RdsDataError> {
        let mut objects = Vec::new();
        while let Some(object) = self.fetch_object::<T>()? {
            objects.push(object);
        }
        Ok(objects)
    }
}

impl From<ExecuteStatementResponse> for RdsDataResult {
    fn from(response: ExecuteStatementResponse) -> Self {
        let ExecuteStatementResponse {
            column_metadata,
            records,
            number_of_records_updated,
            generated_fields,
        } = response;

        let columns: Vec<ColumnDescriptor> = column_metadata
            .into_iter()
            .enumerate()
            .map(|(ordinal, meta)| ColumnDescriptor {
                label: meta.label,
                ordinal,
            })
            .collect();
        let column_names: Arc<Vec<String>> =
            Arc::new(columns.iter().map(|c| c.label.clone()).collect());

        Self {
            column_index_cache: Arc::new(build_index(&column_names)),
            columns,
            column_names,
            records,
            position: 0,
            records_updated: number_of_records_updated,
            generated: generated_fields.into_iter().next(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::ColumnMetadata;

    fn foo_bar() -> RdsDataResult {
        RdsDataResult::from(ExecuteStatementResponse {
            column_metadata: vec![ColumnMetadata::labeled("col1"), ColumnMetadata::labeled("col2")],
            records: vec![vec![Field::String("foo".into()), Field::String("bar".into())]],
            ..ExecuteStatementResponse::default()
        })
    }

    #[test]
    fn numeric_rows_then_end() {
        let mut result = foo_bar();
        assert_eq!(
            result.fetch_numeric().unwrap(),
            Some(vec![Value::from("foo"), Value::from("bar")])
        );
        assert_eq!(result.fetch_numeric().unwrap(), None);
    }

    #[test]
    fn associative_rows() {
        let mut result = foo_bar();
        let row = result.fetch_associative().unwrap().unwrap();
        assert_eq!(row["col1"], Value::from("foo"));
        assert_eq!(row["col2"], Value::from("bar"));
    }

    #[test]
    fn column_fetch_selects_one_value() {
        let mut result = foo_bar();
        assert_eq!(result.fetch_column(1).unwrap(), Some(Value::from("bar")));
        assert_eq!(result.fetch_column(1).unwrap(), None);
    }

    #[test]
    fn out_of_range_column_keeps_the_cursor() {
        let mut result = foo_bar();
        assert!(matches!(
            result.fetch_column(2),
            Err(RdsDataError::UnsupportedFetchMode(_))
        ));
        assert_eq!(result.fetch_column(0).unwrap(), Some(Value::from("foo")));
    }

    #[test]
    fn failed_decode_does_not_advance() {
        let mut result = RdsDataResult::from(ExecuteStatementResponse {
            column_metadata: vec![ColumnMetadata::labeled("a"), ColumnMetadata::labeled("b")],
            records: vec![vec![Field::Long(1), Field::Unsupported("intervalValue".into())]],
            ..ExecuteStatementResponse::default()
        });
        assert!(result.fetch_numeric().is_err());
        // The undecodable column can be skipped by fetching the other one.
        assert_eq!(result.fetch_column(0).unwrap(), Some(Value::Int(1)));
    }

    #[test]
    fn row_count_prefers_records_updated() {
        let mut result = foo_bar();
        assert_eq!(result.row_count(), 1);
        assert_eq!(result.column_count(), 2);

        let updated = RdsDataResult::from(ExecuteStatementResponse {
            number_of_records_updated: Some(5),
            ..ExecuteStatementResponse::default()
        });
        assert_eq!(updated.row_count(), 5);

        result.close();
        result.close();
        assert_eq!(result.fetch_numeric().unwrap(), None);
    }

    #[test]
    fn generated_identifier_is_first_generated_field() {
        let result = RdsDataResult::from(ExecuteStatementResponse {
            generated_fields: vec![Field::Long(5), Field::Long(6)],
            ..ExecuteStatementResponse::default()
        });
        assert_eq!(result.generated_identifier().unwrap(), Some(Value::Int(5)));
        assert_eq!(foo_bar().generated_identifier().unwrap(), None);
    }

    #[derive(Debug, Default)]
    struct Pair {
        col1: String,
        extra: DynamicObject,
    }

    impl FieldAssignable for Pair {
        fn assign(&mut self, label: &str, value: Value) -> Result<Option<Value>, String> {
            if label != "col1" {
                return Ok(Some(value));
            }
            match value {
                Value::Text(text) => {
                    self.col1 = text;
                    Ok(None)
                }
                other => Err(format!("expected text, got {other:?}")),
            }
        }

        fn attach(&mut self, label: &str, value: Value) {
            self.extra.insert(label, value);
        }
    }

    #[test]
    fn objects_get_declared_and_dynamic_members() {
        let mut result = foo_bar();
        let pair = result.fetch_object::<Pair>().unwrap().unwrap();
        assert_eq!(pair.col1, "foo");
        assert_eq!(pair.extra.get("col2"), Some(&Value::from("bar")));
    }

    #[test]
    fn object_mapping_errors_name_the_type() {
        let mut result = RdsDataResult::from(ExecuteStatementResponse {
            column_metadata: vec![ColumnMetadata::labeled("col1")],
            records: vec![vec![Field::Long(1)]],
            ..ExecuteStatementResponse::default()
        });
        let err = result.fetch_object::<Pair>().unwrap_err();
        let RdsDataError::ObjectMapping { type_name, reason } = &err else {
            panic!("unexpected error {err:?}");
        };
        assert!(type_name.ends_with("Pair"));
        assert!(reason.contains("col1"));
    }
}
