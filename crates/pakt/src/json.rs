//! JSON conversion for pakt buffers.
//!
//! Parsing goes through `serde_json` and drives an [`Encoder`] with the
//! ordinary `write_*` operations, so interning, key sorting, and scalar
//! compression all apply. Rendering walks [`Value`] views back into a
//! `serde_json` tree.
//!
//! # Example
//!
//! ```
//! use pakt::{from_json, to_json, Value};
//!
//! let data = from_json(r#"{"name": "alice", "age": 30}"#).unwrap();
//! let root = Value::from_data(&data).unwrap();
//! assert_eq!(root.as_dict().get("age").unwrap().as_int(), 30);
//!
//! let json = to_json(&root).unwrap();
//! assert_eq!(json, r#"{"age":30,"name":"alice"}"#);
//! ```
//!
//! # Mapping
//!
//! | pakt      | JSON                                     |
//! |-----------|------------------------------------------|
//! | null      | null                                     |
//! | undefined | null                                     |
//! | bool      | true/false                               |
//! | int       | integer                                  |
//! | float     | other number                             |
//! | data      | string with `b64:` prefix (valid base64) |
//! | string    | other string                             |
//! | array     | array                                    |
//! | dict      | object (int key aliases become decimal strings) |

use base64::Engine;
use serde_json::Value as JsonValue;

use crate::encoder::Encoder;
use crate::error::{Error, Result};
use crate::value::{TypedValue, Value};

/// Convert a JSON document to an encoded buffer, with default encoder
/// options.
///
/// # Errors
///
/// Returns `Error::JsonError` if the JSON is invalid (the message carries the
/// parser's position), or an encoder error (e.g. a string with a NUL byte).
pub fn from_json(json: &str) -> Result<Vec<u8>> {
    let mut enc = Encoder::new();
    encode_json(json, &mut enc)?;
    enc.finish()
}

/// Parse JSON and write its values to a caller-supplied encoder, for custom
/// options or delta bases. The encoder is left unfinished.
///
/// # Errors
///
/// Same as [`from_json`]; encoder failures stay latched on the session.
pub fn encode_json(json: &str, enc: &mut Encoder) -> Result<()> {
    let value: JsonValue =
        serde_json::from_str(json).map_err(|e| Error::JsonError(e.to_string()))?;
    write_json_value(&value, enc)
}

fn write_json_value(value: &JsonValue, enc: &mut Encoder) -> Result<()> {
    match value {
        JsonValue::Null => enc.write_null(),

        JsonValue::Bool(b) => enc.write_bool(*b),

        JsonValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                enc.write_int(i)
            } else if let Some(u) = n.as_u64() {
                enc.write_uint(u)
            } else {
                enc.write_double(n.as_f64().unwrap_or(0.0))
            }
        }

        JsonValue::String(s) => {
            if let Some(b64) = s.strip_prefix("b64:")
                && let Ok(bytes) = base64::engine::general_purpose::STANDARD.decode(b64)
            {
                return enc.write_data(&bytes);
            }
            enc.write_string(s)
        }

        JsonValue::Array(items) => {
            enc.begin_array(items.len())?;
            for item in items {
                write_json_value(item, enc)?;
            }
            enc.end_array()
        }

        JsonValue::Object(obj) => {
            enc.begin_dict(obj.len())?;
            for (key, val) in obj {
                enc.write_key(key)?;
                write_json_value(val, enc)?;
            }
            enc.end_dict()
        }
    }
}

/// Render a value (of any type) as a JSON string.
///
/// # Errors
///
/// Returns `Error::JsonError` for non-finite floats, or a reader error for
/// malformed values.
pub fn to_json(value: &Value<'_>) -> Result<String> {
    let json = value_to_json(value)?;
    serde_json::to_string(&json).map_err(|e| Error::JsonError(e.to_string()))
}

fn value_to_json(value: &Value<'_>) -> Result<JsonValue> {
    match value.typed()? {
        TypedValue::Undefined | TypedValue::Null => Ok(JsonValue::Null),

        TypedValue::Bool(b) => Ok(JsonValue::Bool(b)),

        TypedValue::Int(n) => Ok(JsonValue::Number(n.into())),

        TypedValue::UInt(n) => Ok(JsonValue::Number(n.into())),

        TypedValue::Float(f) => {
            let num = serde_json::Number::from_f64(f)
                .ok_or_else(|| Error::JsonError(format!("non-finite float {f}")))?;
            Ok(JsonValue::Number(num))
        }

        TypedValue::Str(s) => Ok(JsonValue::String(s.to_string())),

        TypedValue::Data(bytes) => {
            let encoded = base64::engine::general_purpose::STANDARD.encode(bytes);
            Ok(JsonValue::String(format!("b64:{encoded}")))
        }

        TypedValue::Array(arr) => {
            let mut items = Vec::with_capacity(arr.count() as usize);
            for item in arr.iter() {
                items.push(value_to_json(&item)?);
            }
            Ok(JsonValue::Array(items))
        }

        TypedValue::Dict(dict) => {
            let mut obj = serde_json::Map::new();
            for (key, val) in dict.iter() {
                let key = match key.str_bytes() {
                    Some(_) => key.as_string().to_string(),
                    None => key.as_int().to_string(),
                };
                obj.insert(key, value_to_json(&val)?);
            }
            Ok(JsonValue::Object(obj))
        }
    }
}
