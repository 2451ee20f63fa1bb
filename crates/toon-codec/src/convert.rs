//! Helpers for callers that hold JSON text or untyped JSON arguments.

use crate::decoder::decode;
use crate::encoder::encode;
use crate::error::{Result, ToonError};
use crate::options::EncodeOptions;
use crate::types::ToonValue;

/// Parse JSON text and encode it as TOON.
///
/// Duplicate object keys and numbers outside the finite `f64` range are
/// rejected, since they cannot survive a round-trip.
///
/// ```
/// use toon_codec::{json_to_toon, EncodeOptions};
///
/// let toon = json_to_toon(r#"{"a":1,"b":[true,null]}"#, &EncodeOptions::default()).unwrap();
/// assert_eq!(toon, "a: 1\nb[2]: true,null");
/// ```
pub fn json_to_toon(json: &str, options: &EncodeOptions) -> Result<String> {
    let value: ToonValue = serde_json::from_str(json)?;
    Ok(encode(&value, options))
}

/// Decode TOON text and render it as compact JSON.
///
/// ```
/// use toon_codec::toon_to_json;
///
/// assert_eq!(toon_to_json("a: 1\nb[2]: x,y").unwrap(), r#"{"a":1,"b":["x","y"]}"#);
/// ```
pub fn toon_to_json(toon: &str) -> Result<String> {
    let value = decode(toon)?;
    Ok(serde_json::to_string(&value)?)
}

/// Borrow a string argument, failing with [`ToonError::InputType`] for any
/// other JSON type. `name` describes the argument in the error.
pub fn text_argument<'a>(value: &'a serde_json::Value, name: &'static str) -> Result<&'a str> {
    value.as_str().ok_or_else(|| ToonError::InputType {
        expected: name,
        found: json_type_name(value),
    })
}

/// Decode a dynamically-typed argument that should hold TOON text.
///
/// ```
/// use serde_json::json;
/// use toon_codec::{decode_argument, ToonError};
///
/// assert!(decode_argument(&json!("a: 1")).is_ok());
/// assert!(matches!(decode_argument(&json!(123)), Err(ToonError::InputType { .. })));
/// ```
pub fn decode_argument(value: &serde_json::Value) -> Result<ToonValue> {
    decode(text_argument(value, "TOON text as a string")?)
}

fn json_type_name(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "boolean",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}
