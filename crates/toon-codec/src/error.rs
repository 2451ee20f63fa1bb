//! Error types for TOON encoding, decoding and value conversion.

use std::fmt;
use thiserror::Error;

/// Errors that can occur while converting between JSON-like data and TOON.
#[derive(Error, Debug)]
pub enum ToonError {
    /// An argument had the wrong dynamic type (e.g. a number where TOON text
    /// was expected).
    #[error("expected {expected}, got {found}")]
    InputType {
        expected: &'static str,
        found: &'static str,
    },

    /// The value cannot be represented in the TOON value model
    /// (non-finite floats, binary data, non-string map keys, ...).
    #[error("value is not JSON-representable: {0}")]
    Serialization(String),

    /// The input string was not valid TOON.
    /// Includes the 1-based line number where the error was detected.
    #[error("TOON parse error at line {line}: {message}")]
    Parse {
        line: usize,
        kind: ParseErrorKind,
        message: String,
    },

    /// The decoded value does not have the shape the caller asked for.
    #[error("{message}")]
    Schema {
        kind: SchemaErrorKind,
        message: String,
    },

    /// The input string was not valid JSON (string-level helpers only).
    #[error("JSON parse error: {0}")]
    JsonParse(#[from] serde_json::Error),
}

/// Sub-causes of [`ToonError::Parse`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseErrorKind {
    /// Tabs in indentation, widths that are not a multiple of the unit,
    /// or a child block that skips a level.
    Indentation,
    /// A quoted string or key without its closing quote.
    UnterminatedString,
    /// A tabular row whose cell count differs from the header's field count.
    FieldCountMismatch,
    /// A backslash escape outside `\\ \" \n \r \t \uXXXX`.
    UnknownEscape,
    /// The same key appears twice in one object.
    DuplicateKey,
    /// An array's `[N]` does not match the number of decoded elements.
    LengthMismatch,
    /// Anything else that does not follow the grammar.
    Syntax,
}

/// Sub-causes of [`ToonError::Schema`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaErrorKind {
    /// The decoded document is not an object.
    NotAnObject,
    /// A required field is absent.
    MissingField,
    /// A field is present but holds the wrong type.
    WrongFieldType,
}

impl fmt::Display for ParseErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ParseErrorKind::Indentation => "indentation",
            ParseErrorKind::UnterminatedString => "unterminated string",
            ParseErrorKind::FieldCountMismatch => "field count mismatch",
            ParseErrorKind::UnknownEscape => "unknown escape",
            ParseErrorKind::DuplicateKey => "duplicate key",
            ParseErrorKind::LengthMismatch => "length mismatch",
            ParseErrorKind::Syntax => "syntax",
        };
        f.write_str(name)
    }
}

impl ToonError {
    pub(crate) fn parse(line: usize, kind: ParseErrorKind, message: impl Into<String>) -> Self {
        ToonError::Parse {
            line,
            kind,
            message: message.into(),
        }
    }

    pub(crate) fn schema(kind: SchemaErrorKind, message: impl Into<String>) -> Self {
        ToonError::Schema {
            kind,
            message: message.into(),
        }
    }

    /// The parse sub-cause, if this is a [`ToonError::Parse`].
    pub fn parse_kind(&self) -> Option<ParseErrorKind> {
        match self {
            ToonError::Parse { kind, .. } => Some(*kind),
            _ => None,
        }
    }

    /// The schema sub-cause, if this is a [`ToonError::Schema`].
    pub fn schema_kind(&self) -> Option<SchemaErrorKind> {
        match self {
            ToonError::Schema { kind, .. } => Some(*kind),
            _ => None,
        }
    }
}

impl serde::ser::Error for ToonError {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        ToonError::Serialization(msg.to_string())
    }
}

/// Convenience alias used throughout toon-codec.
pub type Result<T> = std::result::Result<T, ToonError>;
