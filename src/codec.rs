//! Conversion between native [`Value`]s and the transport's tagged [`Field`]s.

use std::io::{Read, Seek, SeekFrom};

use crate::error::RdsDataError;
use crate::field::Field;
use crate::types::{ParameterType, Value};

/// Encode a value for the declared parameter type.
///
/// A NULL value always becomes a null field, whatever the declared type.
///
/// # Errors
/// Returns `RdsDataError::UnsupportedType` for declared types without a wire representation
/// and `RdsDataError::ParameterError` when the value cannot be coerced to the declared type.
pub fn encode_value(value: &Value, declared: ParameterType) -> Result<Field, RdsDataError> {
    if value.is_null() {
        return Ok(Field::Null);
    }

    match declared {
        ParameterType::Null => Ok(Field::Null),
        ParameterType::LargeObject | ParameterType::Binary => match value {
            Value::Blob(bytes) => Ok(Field::Blob(bytes.clone())),
            other => Ok(Field::Blob(coerce_text(other)?.into_bytes())),
        },
        ParameterType::Boolean => Ok(Field::Boolean(coerce_bool(value))),
        ParameterType::Integer => Ok(Field::Long(coerce_int(value)?)),
        ParameterType::String => Ok(Field::String(coerce_text(value)?)),
        ParameterType::Ascii => Err(RdsDataError::UnsupportedType(format!(
            "{declared:?} is not implemented"
        ))),
    }
}

/// Encode the full content of a stream, rewinding it first.
///
/// # Errors
/// Returns `RdsDataError::ParameterError` if the stream cannot be rewound or read, plus
/// anything [`encode_value`] returns for the bytes read.
pub fn encode_reader<R>(reader: &mut R, declared: ParameterType) -> Result<Field, RdsDataError>
where
    R: Read + Seek + ?Sized,
{
    reader
        .seek(SeekFrom::Start(0))
        .map_err(|e| RdsDataError::ParameterError(format!("cannot rewind stream: {e}")))?;
    let mut bytes = Vec::new();
    reader
        .read_to_end(&mut bytes)
        .map_err(|e| RdsDataError::ParameterError(format!("cannot read stream: {e}")))?;
    encode_value(&Value::Blob(bytes), declared)
}

/// Decode a field into its native value, recursing into arrays and structs.
///
/// # Errors
/// Returns `RdsDataError::UnsupportedField` for wire tags this crate does not understand.
pub fn decode_field(field: &Field) -> Result<Value, RdsDataError> {
    match field {
        Field::Null => Ok(Value::Null),
        Field::Boolean(value) => Ok(Value::Bool(*value)),
        Field::Long(value) => Ok(Value::Int(*value)),
        Field::Double(value) => Ok(Value::Float(*value)),
        Field::String(value) => Ok(Value::Text(value.clone())),
        Field::Blob(bytes) => Ok(Value::Blob(bytes.clone())),
        Field::Array(items) => items
            .iter()
            .map(decode_field)
            .collect::<Result<Vec<_>, _>>()
            .map(Value::Array),
        Field::Struct(members) => members
            .iter()
            .map(|(name, member)| decode_field(member).map(|value| (name.clone(), value)))
            .collect::<Result<_, _>>()
            .map(Value::Struct),
        Field::Unsupported(tag) => Err(RdsDataError::UnsupportedField(format!(
            "'{tag}' is not a supported field type"
        ))),
    }
}

fn coerce_bool(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Int(i) => *i != 0,
        Value::Float(f) => *f != 0.0,
        Value::Text(s) => !(s.is_empty() || s == "0"),
        Value::Blob(bytes) => !(bytes.is_empty() || bytes.as_slice() == b"0"),
        Value::Array(items) => !items.is_empty(),
        Value::Struct(members) => !members.is_empty(),
    }
}

fn coerce_int(value: &Value) -> Result<i64, RdsDataError> {
    match value {
        Value::Null => Ok(0),
        Value::Bool(b) => Ok(i64::from(*b)),
        Value::Int(i) => Ok(*i),
        Value::Float(f) => float_to_int(*f),
        Value::Text(s) => parse_int(s),
        Value::Blob(bytes) => std::str::from_utf8(bytes)
            .map_err(|e| RdsDataError::ParameterError(format!("blob is not an integer: {e}")))
            .and_then(parse_int),
        Value::Array(_) | Value::Struct(_) => Err(RdsDataError::ParameterError(
            "cannot bind a composite value as an integer".to_string(),
        )),
    }
}

fn parse_int(text: &str) -> Result<i64, RdsDataError> {
    let trimmed = text.trim();
    if let Ok(i) = trimmed.parse::<i64>() {
        return Ok(i);
    }
    trimmed
        .parse::<f64>()
        .map_err(|_| RdsDataError::ParameterError(format!("'{text}' is not an integer")))
        .and_then(float_to_int)
}

#[allow(clippy::cast_possible_truncation)]
fn float_to_int(f: f64) -> Result<i64, RdsDataError> {
    if f.is_finite() {
        Ok(f.trunc() as i64)
    } else {
        Err(RdsDataError::ParameterError(format!(
            "{f} cannot be bound as an integer"
        )))
    }
}

fn coerce_text(value: &Value) -> Result<String, RdsDataError> {
    match value {
        Value::Null => Ok(String::new()),
        Value::Bool(b) => Ok(if *b { "1" } else { "0" }.to_string()),
        Value::Int(i) => Ok(i.to_string()),
        Value::Float(f) => Ok(f.to_string()),
        Value::Text(s) => Ok(s.clone()),
        Value::Blob(bytes) => String::from_utf8(bytes.clone())
            .map_err(|e| RdsDataError::ParameterError(format!("blob is not valid UTF-8: {e}"))),
        Value::Array(_) | Value::Struct(_) => Err(RdsDataError::ParameterError(
            "cannot bind a composite value as a string".to_string(),
        )),
    }
}
