use std::collections::BTreeMap;

use base64::{Engine, engine::general_purpose::STANDARD as BASE64};
use serde::ser::{Error as _, SerializeMap};
use serde::{Deserialize, Serialize, Serializer};

mod wire;

use wire::WireField;

/// Tagged value exchanged with the transport.
///
/// Exactly one variant is ever set. Binary content is kept as raw bytes and only becomes
/// base64 text when serialized:
/// ```rust
/// use rds_data_middleware::prelude::*;
///
/// let json = serde_json::to_string(&Field::Blob(b"hi".to_vec())).unwrap();
/// assert_eq!(json, r#"{"blobValue":"aGk="}"#);
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "WireField")]
pub enum Field {
    Null,
    Boolean(bool),
    Long(i64),
    Double(f64),
    String(String),
    Blob(Vec<u8>),
    Array(Vec<Field>),
    Struct(BTreeMap<String, Field>),
    /// A wire tag this crate does not understand; decoding it fails.
    Unsupported(String),
}

impl Field {
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Field::Null)
    }

    fn scalar_kind(&self) -> Option<ScalarKind> {
        match self {
            Field::Boolean(_) => Some(ScalarKind::Boolean),
            Field::Long(_) => Some(ScalarKind::Long),
            Field::Double(_) => Some(ScalarKind::Double),
            Field::String(_) => Some(ScalarKind::String),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScalarKind {
    Boolean,
    Long,
    Double,
    String,
}

impl ScalarKind {
    fn key(self) -> &'static str {
        match self {
            ScalarKind::Boolean => "booleanValues",
            ScalarKind::Long => "longValues",
            ScalarKind::Double => "doubleValues",
            ScalarKind::String => "stringValues",
        }
    }
}

impl Serialize for Field {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        match self {
            Field::Null => map.serialize_entry("isNull", &true)?,
            Field::Boolean(value) => map.serialize_entry("booleanValue", value)?,
            Field::Long(value) => map.serialize_entry("longValue", value)?,
            Field::Double(value) => map.serialize_entry("doubleValue", value)?,
            Field::String(value) => map.serialize_entry("stringValue", value)?,
            Field::Blob(bytes) => map.serialize_entry("blobValue", &BASE64.encode(bytes))?,
            Field::Array(items) => map.serialize_entry("arrayValue", &ArrayRef(items))?,
            Field::Struct(members) => map.serialize_entry("structValue", members)?,
            Field::Unsupported(tag) => {
                return Err(S::Error::custom(format!(
                    "cannot serialize unsupported field '{tag}'"
                )));
            }
        }
        map.end()
    }
}

/// Array fields go over the wire as one homogeneous typed list.
struct ArrayRef<'a>(&'a [Field]);

impl Serialize for ArrayRef<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        let items = self.0;

        if !items.is_empty() && items.iter().all(|item| matches!(item, Field::Array(_))) {
            let nested: Vec<ArrayRef<'_>> = items
                .iter()
                .filter_map(|item| match item {
                    Field::Array(inner) => Some(ArrayRef(inner)),
                    _ => None,
                })
                .collect();
            map.serialize_entry("arrayValues", &nested)?;
            return map.end();
        }

        let kind = items.first().map_or(Some(ScalarKind::String), Field::scalar_kind);
        let Some(kind) = kind.filter(|kind| items.iter().all(|item| item.scalar_kind() == Some(*kind)))
        else {
            return Err(S::Error::custom(
                "array elements must all be arrays or share one scalar type",
            ));
        };

        match kind {
            ScalarKind::Boolean => map.serialize_entry(
                kind.key(),
                &pick(items, |f| match f {
                    Field::Boolean(v) => Some(*v),
                    _ => None,
                }),
            )?,
            ScalarKind::Long => map.serialize_entry(
                kind.key(),
                &pick(items, |f| match f {
                    Field::Long(v) => Some(*v),
                    _ => None,
                }),
            )?,
            ScalarKind::Double => map.serialize_entry(
                kind.key(),
                &pick(items, |f| match f {
                    Field::Double(v) => Some(*v),
                    _ => None,
                }),
            )?,
            ScalarKind::String => map.serialize_entry(
                kind.key(),
                &pick(items, |f| match f {
                    Field::String(v) => Some(v.as_str()),
                    _ => None,
                }),
            )?,
        }
        map.end()
    }
}

fn pick<'a, T>(items: &'a [Field], select: impl Fn(&'a Field) -> Option<T>) -> Vec<T> {
    items.iter().filter_map(select).collect()
}
