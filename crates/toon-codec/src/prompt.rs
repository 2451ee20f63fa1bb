//! System-prompt envelope.
//!
//! A prompt travels as a one-field TOON document, `system_prompt: <text>`,
//! so it can be embedded next to other TOON data and recovered verbatim.

use crate::decoder::decode;
use crate::encoder::encode;
use crate::error::{Result, SchemaErrorKind, ToonError};
use crate::options::EncodeOptions;
use crate::types::{ToonMap, ToonValue};

/// Field name that carries the prompt text.
pub const PROMPT_FIELD: &str = "system_prompt";

/// Wrap `text` as `{ "system_prompt": text }` and encode it with default options.
///
/// ```
/// use toon_codec::encode_prompt;
///
/// assert_eq!(encode_prompt("Be brief."), "system_prompt: Be brief.");
/// assert_eq!(encode_prompt("a\nb"), r#"system_prompt: "a\nb""#);
/// ```
pub fn encode_prompt(text: &str) -> String {
    let mut map = ToonMap::with_capacity(1);
    map.insert(PROMPT_FIELD.to_string(), ToonValue::from(text));
    encode(&ToonValue::Object(map), &EncodeOptions::default())
}

/// Decode a prompt envelope and return the prompt text.
///
/// Fails with [`ToonError::Parse`] for malformed TOON, and with
/// [`ToonError::Schema`] when the document is not an object
/// ([`SchemaErrorKind::NotAnObject`]), lacks the field
/// ([`SchemaErrorKind::MissingField`]) or holds a non-string there
/// ([`SchemaErrorKind::WrongFieldType`]).
pub fn decode_prompt(toon: &str) -> Result<String> {
    let value = decode(toon)?;
    let ToonValue::Object(mut map) = value else {
        return Err(ToonError::schema(
            SchemaErrorKind::NotAnObject,
            format!(
                "expected TOON structure to decode to an object with a '{PROMPT_FIELD}' field, got {}",
                value.type_name()
            ),
        ));
    };
    match map.swap_remove(PROMPT_FIELD) {
        Some(ToonValue::String(text)) => Ok(text),
        Some(other) => Err(ToonError::schema(
            SchemaErrorKind::WrongFieldType,
            format!(
                "field '{PROMPT_FIELD}' is not a string in decoded TOON structure (got {})",
                other.type_name()
            ),
        )),
        None => Err(ToonError::schema(
            SchemaErrorKind::MissingField,
            format!("decoded TOON structure does not contain a '{PROMPT_FIELD}' field"),
        )),
    }
}
