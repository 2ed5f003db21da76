use std::collections::BTreeMap;

use crate::error::RdsDataError;

/// Native values bound as parameters or decoded from result fields.
///
/// ```rust
/// use rds_data_middleware::prelude::*;
///
/// let params = vec![
///     Value::Int(1),
///     Value::Text("alice".into()),
///     Value::Bool(true),
/// ];
/// # let _ = params;
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// NULL value
    Null,
    /// Boolean value
    Bool(bool),
    /// Integer value (64-bit)
    Int(i64),
    /// Floating point value, only ever produced by decoding `doubleValue` fields
    Float(f64),
    /// Text/string value
    Text(String),
    /// Binary data
    Blob(Vec<u8>),
    /// Decoded array field
    Array(Vec<Value>),
    /// Decoded struct field
    Struct(BTreeMap<String, Value>),
}

impl Value {
    /// Check if this value is NULL
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    #[must_use]
    pub fn as_int(&self) -> Option<&i64> {
        if let Value::Int(value) = self {
            Some(value)
        } else {
            None
        }
    }

    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        if let Value::Text(value) = self {
            Some(value)
        } else {
            None
        }
    }

    #[must_use]
    pub fn as_bool(&self) -> Option<&bool> {
        if let Value::Bool(value) = self {
            return Some(value);
        } else if let Some(i) = self.as_int() {
            if *i == 1 {
                return Some(&true);
            } else if *i == 0 {
                return Some(&false);
            }
        }
        None
    }

    #[must_use]
    pub fn as_float(&self) -> Option<f64> {
        if let Value::Float(value) = self {
            Some(*value)
        } else {
            None
        }
    }

    #[must_use]
    pub fn as_blob(&self) -> Option<&[u8]> {
        if let Value::Blob(bytes) = self {
            Some(bytes)
        } else {
            None
        }
    }

    #[must_use]
    pub fn as_array(&self) -> Option<&[Value]> {
        if let Value::Array(items) = self {
            Some(items)
        } else {
            None
        }
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Int(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Int(i64::from(value))
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Text(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Text(value)
    }
}

impl From<Vec<u8>> for Value {
    fn from(value: Vec<u8>) -> Self {
        Value::Blob(value)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Value::Null, Into::into)
    }
}

/// Declared type of a bound parameter.
///
/// The numeric codes match the DBAL parameter type constants so callers porting from
/// such drivers can use [`ParameterType::try_from`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ParameterType {
    Null,
    Integer,
    #[default]
    String,
    LargeObject,
    Boolean,
    Binary,
    Ascii,
}

impl ParameterType {
    /// Pick the declared type that matches a value's own variant.
    #[must_use]
    pub fn infer(value: &Value) -> Self {
        match value {
            Value::Null => ParameterType::Null,
            Value::Bool(_) => ParameterType::Boolean,
            Value::Int(_) => ParameterType::Integer,
            Value::Blob(_) => ParameterType::LargeObject,
            Value::Float(_) | Value::Text(_) | Value::Array(_) | Value::Struct(_) => {
                ParameterType::String
            }
        }
    }
}

impl TryFrom<i32> for ParameterType {
    type Error = RdsDataError;

    fn try_from(code: i32) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(ParameterType::Null),
            1 => Ok(ParameterType::Integer),
            2 => Ok(ParameterType::String),
            3 => Ok(ParameterType::LargeObject),
            5 => Ok(ParameterType::Boolean),
            16 => Ok(ParameterType::Binary),
            17 => Ok(ParameterType::Ascii),
            other => Err(RdsDataError::UnsupportedType(format!(
                "type code {other} is not implemented"
            ))),
        }
    }
}

/// Row projection used by `fetch`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FetchMode {
    /// Values in column order.
    Numeric,
    /// Values keyed by column label.
    Associative,
    /// Addressable both by position and by label.
    #[default]
    Mixed,
    /// Label-keyed dynamic object.
    StandardObject,
    /// A single column of each row.
    Column(usize),
}
