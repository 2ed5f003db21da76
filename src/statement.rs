use std::collections::BTreeMap;
use std::io::{Read, Seek};
use std::sync::LazyLock;

use regex::Regex;

use crate::connection::RdsDataConnection;
use crate::error::RdsDataError;
use crate::executor;
use crate::params::{ParamKey, ParameterBag};
use crate::results::{FetchedRow, FieldAssignable, RdsDataResult, Row};
use crate::types::{FetchMode, ParameterType, Value};

static USE_DATABASE: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(r"(?i)^\s*use\s+`?([A-Za-z0-9_$]+)`?\s*;?\s*$")
        .map_err(|e| tracing::error!("use pattern failed to compile: {e}"))
        .ok()
});

/// The database named by a `use <db>;` statement.
fn use_database_target(sql: &str) -> Option<String> {
    USE_DATABASE
        .as_ref()?
        .captures(sql)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// A prepared statement bound to its connection.
///
/// The statement can be executed repeatedly; bindings and the fetch mode carry over,
/// while every execution replaces the previous result.
#[derive(Debug)]
pub struct Statement<'c> {
    connection: &'c mut RdsDataConnection,
    sql: String,
    use_database: Option<String>,
    params: ParameterBag,
    fetch_mode: FetchMode,
    result: RdsDataResult,
}

impl<'c> Statement<'c> {
    pub(crate) fn new(connection: &'c mut RdsDataConnection, sql: String) -> Self {
        Self {
            use_database: use_database_target(&sql),
            connection,
            sql,
            params: ParameterBag::new(),
            fetch_mode: FetchMode::default(),
            result: RdsDataResult::empty(),
        }
    }

    #[must_use]
    pub fn sql(&self) -> &str {
        &self.sql
    }

    /// Bind a value as it is now. Integer keys are positional, string keys named.
    pub fn bind_value(
        &mut self,
        key: impl Into<ParamKey>,
        value: impl Into<Value>,
        declared: ParameterType,
    ) -> &mut Self {
        self.params.bind_value(key, value, declared);
        self
    }

    /// Bind a value read from `source` each time the statement executes.
    ///
    /// # Errors
    /// Returns `RdsDataError::Unimplemented` when a fixed `length` is requested.
    pub fn bind_param<F>(
        &mut self,
        key: impl Into<ParamKey>,
        source: F,
        declared: ParameterType,
        length: Option<usize>,
    ) -> Result<&mut Self, RdsDataError>
    where
        F: Fn() -> Value + Send + Sync + 'static,
    {
        self.params.bind_param(key, source, declared, length)?;
        Ok(self)
    }

    /// Bind a stream, rewound and read in full on every execution.
    pub fn bind_stream<R>(
        &mut self,
        key: impl Into<ParamKey>,
        reader: R,
        declared: ParameterType,
    ) -> &mut Self
    where
        R: Read + Seek + Send + 'static,
    {
        self.params.bind_stream(key, reader, declared);
        self
    }

    /// Execute with the current bindings.
    ///
    /// A `use <db>;` statement never reaches the service: it switches the connection's
    /// database and leaves an empty result.
    ///
    /// # Errors
    /// See [`Statement::execute_with`].
    pub async fn execute(&mut self) -> Result<(), RdsDataError> {
        if let Some(database) = &self.use_database {
            self.connection.switch_database(database.clone());
            self.result = RdsDataResult::empty();
            return Ok(());
        }

        self.result = executor::execute(self.connection, &self.sql, &mut self.params).await?;
        Ok(())
    }

    /// Bind `values` positionally from 0, types inferred from each value, then execute.
    ///
    /// # Errors
    /// Usage errors for bad bindings or SQL, classified or unclassified server errors for
    /// rejected statements, and transport errors for everything else.
    pub async fn execute_with(&mut self, values: &[Value]) -> Result<(), RdsDataError> {
        for (index, value) in values.iter().enumerate() {
            self.params
                .bind_value(index, value.clone(), ParameterType::infer(value));
        }
        self.execute().await
    }

    /// Default mode for [`Statement::fetch`] and [`Statement::fetch_all`], kept across
    /// executions.
    pub fn set_fetch_mode(&mut self, mode: FetchMode) {
        self.fetch_mode = mode;
    }

    #[must_use]
    pub fn fetch_mode(&self) -> FetchMode {
        self.fetch_mode
    }

    /// Fetch the next row in the default mode.
    ///
    /// # Errors
    /// Decoding failures; the row stays current.
    pub fn fetch(&mut self) -> Result<Option<FetchedRow>, RdsDataError> {
        self.result.fetch(self.fetch_mode)
    }

    /// Fetch the next row in `mode`, leaving the default untouched.
    ///
    /// # Errors
    /// Decoding failures; the row stays current.
    pub fn fetch_with(&mut self, mode: FetchMode) -> Result<Option<FetchedRow>, RdsDataError> {
        self.result.fetch(mode)
    }

    /// # Errors
    /// Decoding failures; the row stays current.
    pub fn fetch_numeric(&mut self) -> Result<Option<Vec<Value>>, RdsDataError> {
        self.result.fetch_numeric()
    }

    /// # Errors
    /// Decoding failures; the row stays current.
    pub fn fetch_associative(&mut self) -> Result<Option<BTreeMap<String, Value>>, RdsDataError> {
        self.result.fetch_associative()
    }

    /// # Errors
    /// Decoding failures; the row stays current.
    pub fn fetch_mixed(&mut self) -> Result<Option<Row>, RdsDataError> {
        self.result.fetch_mixed()
    }

    /// # Errors
    /// Out-of-range column index or decoding failures; the row stays current.
    pub fn fetch_column(&mut self, index: usize) -> Result<Option<Value>, RdsDataError> {
        self.result.fetch_column(index)
    }

    /// # Errors
    /// `RdsDataError::ObjectMapping` when `T` rejects a column.
    pub fn fetch_object<T: FieldAssignable>(&mut self) -> Result<Option<T>, RdsDataError> {
        self.result.fetch_object()
    }

    /// Drain the remaining rows in the default mode.
    ///
    /// # Errors
    /// Stops at the first row that fails.
    pub fn fetch_all(&mut self) -> Result<Vec<FetchedRow>, RdsDataError> {
        self.result.fetch_all(self.fetch_mode)
    }

    /// # Errors
    /// Stops at the first row that fails.
    pub fn fetch_all_with(&mut self, mode: FetchMode) -> Result<Vec<FetchedRow>, RdsDataError> {
        self.result.fetch_all(mode)
    }

    /// # Errors
    /// Stops at the first row that fails to map.
    pub fn fetch_all_objects<T: FieldAssignable>(&mut self) -> Result<Vec<T>, RdsDataError> {
        self.result.fetch_all_objects()
    }

    #[must_use]
    pub fn row_count(&self) -> usize {
        self.result.row_count()
    }

    #[must_use]
    pub fn column_count(&self) -> usize {
        self.result.column_count()
    }

    /// Free the records of the last execution.
    pub fn close_cursor(&mut self) {
        self.result.close();
    }

    #[must_use]
    pub fn result(&self) -> &RdsDataResult {
        &self.result
    }

    /// Keep the result and release the connection borrow.
    #[must_use]
    pub fn into_result(self) -> RdsDataResult {
        self.result
    }
}
