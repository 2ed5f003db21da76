use std::collections::BTreeMap;

use base64::{Engine, engine::general_purpose::STANDARD as BASE64};
use serde::Deserialize;

use super::Field;

/// Raw service representation of one field: a bag of optional tags.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct WireField {
    is_null: Option<bool>,
    boolean_value: Option<bool>,
    long_value: Option<i64>,
    double_value: Option<f64>,
    string_value: Option<String>,
    blob_value: Option<String>,
    array_value: Option<WireArray>,
    struct_value: Option<BTreeMap<String, Field>>,
    #[serde(flatten)]
    other: BTreeMap<String, serde_json::Value>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireArray {
    array_values: Option<Vec<WireArray>>,
    boolean_values: Option<Vec<bool>>,
    long_values: Option<Vec<i64>>,
    double_values: Option<Vec<f64>>,
    string_values: Option<Vec<String>>,
}

impl From<WireArray> for Field {
    fn from(array: WireArray) -> Self {
        let items = if let Some(nested) = array.array_values {
            nested.into_iter().map(Field::from).collect()
        } else if let Some(values) = array.boolean_values {
            values.into_iter().map(Field::Boolean).collect()
        } else if let Some(values) = array.long_values {
            values.into_iter().map(Field::Long).collect()
        } else if let Some(values) = array.double_values {
            values.into_iter().map(Field::Double).collect()
        } else {
            array
                .string_values
                .unwrap_or_default()
                .into_iter()
                .map(Field::String)
                .collect()
        };
        Field::Array(items)
    }
}

impl TryFrom<WireField> for Field {
    type Error = String;

    fn try_from(wire: WireField) -> Result<Self, Self::Error> {
        if wire.is_null == Some(true) {
            return Ok(Field::Null);
        }
        if let Some(array) = wire.array_value {
            return Ok(Field::from(array));
        }
        if let Some(members) = wire.struct_value {
            return Ok(Field::Struct(members));
        }
        if let Some(encoded) = wire.blob_value {
            return BASE64
                .decode(encoded.as_bytes())
                .map(Field::Blob)
                .map_err(|e| format!("blobValue is not valid base64: {e}"));
        }
        if let Some(value) = wire.boolean_value {
            return Ok(Field::Boolean(value));
        }
        if let Some(value) = wire.double_value {
            return Ok(Field::Double(value));
        }
        if let Some(value) = wire.long_value {
            return Ok(Field::Long(value));
        }
        if let Some(value) = wire.string_value {
            return Ok(Field::String(value));
        }

        let tag = wire
            .other
            .into_keys()
            .next()
            .unwrap_or_else(|| "<empty>".to_string());
        Ok(Field::Unsupported(tag))
    }
}
