//! # toon-codec
//!
//! Encoder and decoder for **TOON (Token-Oriented Object Notation)**, a compact,
//! indentation-based rendering of JSON data meant for LLM prompts.
//!
//! TOON drops braces and most quotes, writes arrays of primitives on one line
//! and collapses uniform arrays of objects into a header plus one row per
//! element. Decoding recovers the exact value, key order included.
//!
//! ## Quick start
//!
//! ```rust
//! use serde_json::json;
//! use toon_codec::{decode, encode, to_value, EncodeOptions};
//!
//! let value = to_value(&json!({
//!     "messages": [
//!         {"role": "system", "content": "You are helpful."},
//!         {"role": "user", "content": "Hi"}
//!     ]
//! })).unwrap();
//!
//! let toon = encode(&value, &EncodeOptions::default());
//! assert_eq!(
//!     toon,
//!     "messages[2]{role,content}:\n  system,You are helpful.\n  user,Hi"
//! );
//! assert_eq!(decode(&toon).unwrap(), value);
//! ```
//!
//! ## Modules
//!
//! - [`types`]: `ToonValue`, the JSON-compatible value tree
//! - [`options`]: `EncodeOptions` and `Delimiter`
//! - [`encoder`]: value → TOON text
//! - [`decoder`]: TOON text → value
//! - [`prompt`]: the `system_prompt` envelope
//! - [`ser`]: validating conversion from any `Serialize` type
//! - [`convert`]: JSON-text and untyped-argument helpers
//! - [`error`]: `ToonError` and its sub-kinds

pub mod convert;
pub mod decoder;
pub mod encoder;
pub mod error;
pub mod options;
pub mod prompt;
pub mod ser;
pub mod types;

pub use convert::{decode_argument, json_to_toon, text_argument, toon_to_json};
pub use decoder::decode;
pub use encoder::encode;
pub use error::{ParseErrorKind, Result, SchemaErrorKind, ToonError};
pub use options::{Delimiter, EncodeOptions, DEFAULT_INDENT};
pub use prompt::{decode_prompt, encode_prompt, PROMPT_FIELD};
pub use ser::{from_value, to_value};
pub use types::{ToonMap, ToonValue};
