//! Encoder configuration.
//!
//! ```rust
//! use toon_codec::{Delimiter, EncodeOptions};
//!
//! // Canonical layout: 2-space indentation, comma delimiter
//! let options = EncodeOptions::default();
//! assert_eq!(options.indent_width(), 2);
//!
//! // 4-space indentation with pipe-separated rows
//! let options = EncodeOptions::new().with_indent(4).with_delimiter(Delimiter::Pipe);
//! assert_eq!(options.indent_width(), 4);
//! ```

/// Indentation used when no explicit width is requested.
pub const DEFAULT_INDENT: usize = 2;

/// Separator for inline arrays, tabular headers and tabular rows.
///
/// Comma is implicit; tab and pipe are declared inside the array header
/// (`key[3|]: a|b|c`) so a decoder can tell which one is active.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Delimiter {
    #[default]
    Comma,
    Tab,
    Pipe,
}

impl Delimiter {
    pub const fn as_char(self) -> char {
        match self {
            Delimiter::Comma => ',',
            Delimiter::Tab => '\t',
            Delimiter::Pipe => '|',
        }
    }

    /// The marker written before `]` in an array header. Empty for comma.
    pub(crate) const fn header_marker(self) -> &'static str {
        match self {
            Delimiter::Comma => "",
            Delimiter::Tab => "\t",
            Delimiter::Pipe => "|",
        }
    }

    pub(crate) fn from_marker(c: char) -> Option<Self> {
        match c {
            '\t' => Some(Delimiter::Tab),
            '|' => Some(Delimiter::Pipe),
            _ => None,
        }
    }
}

impl std::str::FromStr for Delimiter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "comma" | "," => Ok(Delimiter::Comma),
            "tab" | "\t" => Ok(Delimiter::Tab),
            "pipe" | "|" => Ok(Delimiter::Pipe),
            other => Err(format!(
                "unknown delimiter '{other}' (expected comma, tab or pipe)"
            )),
        }
    }
}

/// Options accepted by [`encode`](crate::encode).
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EncodeOptions {
    /// Spaces per nesting level. `None` selects the compact canonical layout.
    pub indent: Option<usize>,
    pub delimiter: Delimiter,
}

impl EncodeOptions {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_indent(mut self, indent: usize) -> Self {
        self.indent = Some(indent);
        self
    }

    #[must_use]
    pub fn with_delimiter(mut self, delimiter: Delimiter) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Effective spaces per level. Zero is clamped to one so that nesting
    /// stays visible to the decoder.
    pub fn indent_width(&self) -> usize {
        self.indent.unwrap_or(DEFAULT_INDENT).max(1)
    }
}
