//! Bound statement parameters and positional placeholder rewriting.
//!
//! The service only understands named parameters (`:name`), while most callers bind
//! positionally with `?`. Integer keys are therefore turned into names, and the SQL is
//! rewritten so the n-th free `?` becomes `:n`.

use std::borrow::Cow;
use std::fmt;
use std::io::{Read, Seek};

use crate::codec::{encode_reader, encode_value};
use crate::error::RdsDataError;
use crate::transport::SqlParameter;
use crate::types::{ParameterType, Value};

mod scanner;

/// Key a parameter is bound under: a position or a name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ParamKey {
    Index(i64),
    Name(String),
}

impl ParamKey {
    fn as_index(&self) -> Option<i64> {
        match self {
            ParamKey::Index(i) => Some(*i),
            ParamKey::Name(_) => None,
        }
    }
}

impl fmt::Display for ParamKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamKey::Index(i) => write!(f, "{i}"),
            ParamKey::Name(name) => f.write_str(name),
        }
    }
}

impl From<i64> for ParamKey {
    fn from(index: i64) -> Self {
        ParamKey::Index(index)
    }
}

impl From<i32> for ParamKey {
    fn from(index: i32) -> Self {
        ParamKey::Index(i64::from(index))
    }
}

impl From<usize> for ParamKey {
    fn from(index: usize) -> Self {
        ParamKey::Index(i64::try_from(index).unwrap_or(i64::MAX))
    }
}

impl From<&str> for ParamKey {
    fn from(name: &str) -> Self {
        ParamKey::Name(name.to_string())
    }
}

impl From<String> for ParamKey {
    fn from(name: String) -> Self {
        ParamKey::Name(name)
    }
}

/// Readers accepted by [`ParameterBag::bind_stream`].
pub trait ReadSeek: Read + Seek {}

impl<T: Read + Seek> ReadSeek for T {}

enum BoundValue {
    Value(Value),
    /// Resolved when the parameter list is built, not when bound.
    Deferred(Box<dyn Fn() -> Value + Send + Sync>),
    Stream(Box<dyn ReadSeek + Send>),
}

struct Binding {
    key: ParamKey,
    source: BoundValue,
    declared: ParameterType,
}

/// Parameters bound to one statement.
#[derive(Default)]
pub struct ParameterBag {
    bindings: Vec<Binding>,
}

impl ParameterBag {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind a value as it is now.
    pub fn bind_value(
        &mut self,
        key: impl Into<ParamKey>,
        value: impl Into<Value>,
        declared: ParameterType,
    ) {
        self.insert(key.into(), BoundValue::Value(value.into()), declared);
    }

    /// Bind a value that is read only when the statement is sent, so later changes to
    /// whatever `source` reads from are honoured:
    /// ```rust
    /// use std::sync::{Arc, Mutex};
    /// use rds_data_middleware::prelude::*;
    ///
    /// let shared = Arc::new(Mutex::new(Value::from("a")));
    /// let mut bag = ParameterBag::new();
    /// let reader = Arc::clone(&shared);
    /// bag.bind_param(
    ///     "foo",
    ///     move || reader.lock().map(|v| v.clone()).unwrap_or(Value::Null),
    ///     ParameterType::String,
    ///     None,
    /// )?;
    /// *shared.lock().unwrap() = Value::from("b");
    /// assert_eq!(bag.build_parameter_list()?[0].value, Field::String("b".into()));
    /// # Ok::<(), RdsDataError>(())
    /// ```
    ///
    /// # Errors
    /// Returns `RdsDataError::Unimplemented` when a fixed `length` is requested.
    pub fn bind_param<F>(
        &mut self,
        key: impl Into<ParamKey>,
        source: F,
        declared: ParameterType,
        length: Option<usize>,
    ) -> Result<(), RdsDataError>
    where
        F: Fn() -> Value + Send + Sync + 'static,
    {
        if let Some(length) = length {
            return Err(RdsDataError::Unimplemented(format!(
                "fixed length parameter binding (length {length})"
            )));
        }
        self.insert(key.into(), BoundValue::Deferred(Box::new(source)), declared);
        Ok(())
    }

    /// Bind a stream; it is rewound and read in full each time the statement is sent.
    pub fn bind_stream<R>(&mut self, key: impl Into<ParamKey>, reader: R, declared: ParameterType)
    where
        R: Read + Seek + Send + 'static,
    {
        self.insert(key.into(), BoundValue::Stream(Box::new(reader)), declared);
    }

    fn insert(&mut self, key: ParamKey, source: BoundValue, declared: ParameterType) {
        let binding = Binding {
            key,
            source,
            declared,
        };
        match self.bindings.iter_mut().find(|b| b.key == binding.key) {
            Some(existing) => *existing = binding,
            None => self.bindings.push(binding),
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    fn has_index(&self, index: i64) -> bool {
        self.bindings.iter().any(|b| b.key.as_index() == Some(index))
    }

    /// Rewrite positional `?` placeholders into `:N` names.
    ///
    /// SQL is returned untouched when no integer keys are bound. Otherwise numbering starts
    /// at the smallest integer key, which must be 0 or 1.
    ///
    /// # Errors
    /// Returns `RdsDataError::AmbiguousParameterNumbering` when the smallest integer key is
    /// neither 0 nor 1, or when the bound keys fit both conventions at once, and
    /// `RdsDataError::MalformedSql` for an unterminated quoted span.
    pub fn rewrite_statement<'a>(&self, sql: &'a str) -> Result<Cow<'a, str>, RdsDataError> {
        let Some(base) = self.bindings.iter().filter_map(|b| b.key.as_index()).min() else {
            return Ok(Cow::Borrowed(sql));
        };

        if base != 0 && base != 1 {
            return Err(RdsDataError::AmbiguousParameterNumbering(format!(
                "numeric parameters must start with 0 or 1, found {base}"
            )));
        }

        let (rewritten, count) = scanner::rewrite_positional(sql, base)?;

        // Zero-based numbering ends at count - 1; a key equal to count is one-based.
        let count = i64::try_from(count).unwrap_or(i64::MAX);
        if base == 0 && count > 0 && self.has_index(count) {
            return Err(RdsDataError::AmbiguousParameterNumbering(format!(
                "parameters 0 and {count} are both bound for {count} placeholder(s)"
            )));
        }

        Ok(rewritten)
    }

    /// Resolve every binding and encode it for the transport.
    ///
    /// Deferred values and streams are read here, so this must run right before sending.
    ///
    /// # Errors
    /// Returns whatever encoding a bound value fails with.
    pub fn build_parameter_list(&mut self) -> Result<Vec<SqlParameter>, RdsDataError> {
        self.bindings
            .iter_mut()
            .map(|binding| {
                let value = match &mut binding.source {
                    BoundValue::Value(value) => encode_value(value, binding.declared)?,
                    BoundValue::Deferred(source) => encode_value(&source(), binding.declared)?,
                    BoundValue::Stream(reader) => encode_reader(&mut **reader, binding.declared)?,
                };
                Ok(SqlParameter {
                    name: binding.key.to_string(),
                    value,
                })
            })
            .collect()
    }
}

impl fmt::Debug for ParameterBag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.bindings.iter().map(|b| (&b.key, b.declared)))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;
    use std::sync::{Arc, Mutex};

    use super::*;
    use crate::field::Field;

    fn prepared(keys: &[ParamKey], sql: &str) -> Result<String, RdsDataError> {
        let mut bag = ParameterBag::new();
        for key in keys {
            bag.bind_value(key.clone(), 1_i64, ParameterType::String);
        }
        bag.rewrite_statement(sql).map(Cow::into_owned)
    }

    #[test]
    fn rewrites_numeric_placeholders() {
        let cases: [(&[ParamKey], &str, &str); 7] = [
            (&[ParamKey::Index(0)], "SELECT * FROM x WHERE y = ?", "SELECT * FROM x WHERE y = :0"),
            (&[ParamKey::Index(1)], "SELECT * FROM x WHERE y = ?", "SELECT * FROM x WHERE y = :1"),
            (
                &[ParamKey::Index(1)],
                "SELECT * FROM x WHERE x = '?' AND y = ?",
                "SELECT * FROM x WHERE x = '?' AND y = :1",
            ),
            (
                &[ParamKey::Index(1)],
                "SELECT * FROM x WHERE x = ? AND y = '?'",
                "SELECT * FROM x WHERE x = :1 AND y = '?'",
            ),
            (
                &[ParamKey::Index(1)],
                "SELECT * FROM x WHERE x = ? AND y = `?`",
                "SELECT * FROM x WHERE x = :1 AND y = `?`",
            ),
            (
                &[ParamKey::Index(1)],
                r#"SELECT * FROM x WHERE x = ? AND y = "?""#,
                r#"SELECT * FROM x WHERE x = :1 AND y = "?""#,
            ),
            (
                &[ParamKey::Name(String::new())],
                r#"SELECT * FROM x WHERE x = ? AND y = "?""#,
                r#"SELECT * FROM x WHERE x = ? AND y = "?""#,
            ),
        ];

        for (keys, sql, expected) in cases {
            assert_eq!(prepared(keys, sql).unwrap(), expected, "{sql}");
        }
    }

    #[test]
    fn named_keys_leave_sql_alone() {
        assert_eq!(
            prepared(&["foo".into()], "SELECT ? FROM x WHERE 'unterminated").unwrap(),
            "SELECT ? FROM x WHERE 'unterminated"
        );
    }

    #[test]
    fn numbering_must_start_at_zero_or_one() {
        assert!(matches!(
            prepared(&[ParamKey::Index(2)], "SELECT ?"),
            Err(RdsDataError::AmbiguousParameterNumbering(_))
        ));
        assert_eq!(
            prepared(&[ParamKey::Index(0), ParamKey::Index(1)], "SELECT ?, ?").unwrap(),
            "SELECT :0, :1"
        );
        assert_eq!(
            prepared(&[ParamKey::Index(1), ParamKey::Index(2)], "SELECT ?, ?").unwrap(),
            "SELECT :1, :2"
        );
    }

    #[test]
    fn mixed_bases_are_rejected() {
        assert!(matches!(
            prepared(&[ParamKey::Index(0), ParamKey::Index(1)], "SELECT ?"),
            Err(RdsDataError::AmbiguousParameterNumbering(_))
        ));
    }

    #[test]
    fn late_bound_values_are_read_at_build_time() {
        let shared = Arc::new(Mutex::new(Value::from("a")));
        let mut bag = ParameterBag::new();

        let reader = Arc::clone(&shared);
        bag.bind_param(
            "foo",
            move || reader.lock().map(|v| v.clone()).unwrap_or(Value::Null),
            ParameterType::String,
            None,
        )
        .unwrap();
        let current = shared.lock().unwrap().clone();
        bag.bind_value("bar", current, ParameterType::String);

        *shared.lock().unwrap() = Value::from("b");

        let params = bag.build_parameter_list().unwrap();
        assert_eq!(params[0].name, "foo");
        assert_eq!(params[0].value, Field::String("b".into()));
        assert_eq!(params[1].name, "bar");
        assert_eq!(params[1].value, Field::String("a".into()));
    }

    #[test]
    fn late_bound_value_survives_caller_dropping_its_handle() {
        let shared = Arc::new(Mutex::new(Value::from("a")));
        let mut bag = ParameterBag::new();
        let reader = Arc::clone(&shared);
        bag.bind_param(
            "foo",
            move || reader.lock().map(|v| v.clone()).unwrap_or(Value::Null),
            ParameterType::String,
            None,
        )
        .unwrap();
        drop(shared);

        let params = bag.build_parameter_list().unwrap();
        assert_eq!(params[0].value, Field::String("a".into()));
    }

    #[test]
    fn fixed_length_binding_is_unsupported() {
        let mut bag = ParameterBag::new();
        let result = bag.bind_param("foo", || Value::Null, ParameterType::String, Some(10));
        assert!(matches!(result, Err(RdsDataError::Unimplemented(_))));
        assert!(bag.is_empty());
    }

    #[test]
    fn rebinding_overwrites_in_place() {
        let mut bag = ParameterBag::new();
        bag.bind_value(0_i64, 1_i64, ParameterType::Integer);
        bag.bind_value("name", "x", ParameterType::String);
        bag.bind_value(0_i64, 2_i64, ParameterType::Integer);

        let params = bag.build_parameter_list().unwrap();
        assert_eq!(bag.len(), 2);
        assert_eq!(params[0].name, "0");
        assert_eq!(params[0].value, Field::Long(2));
    }

    #[test]
    fn streams_are_encoded_as_blobs() {
        let mut bag = ParameterBag::new();
        bag.bind_stream("data", Cursor::new(b"hi".to_vec()), ParameterType::LargeObject);
        let params = bag.build_parameter_list().unwrap();
        assert_eq!(params[0].value, Field::Blob(b"hi".to_vec()));
        // A second send rewinds the stream first.
        let params = bag.build_parameter_list().unwrap();
        assert_eq!(params[0].value, Field::Blob(b"hi".to_vec()));
    }
}
