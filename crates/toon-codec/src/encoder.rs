//! TOON encoder: converts a [`ToonValue`] into Token-Oriented Object Notation.
//!
//! TOON is a compact, human-readable format designed to minimize token usage when
//! feeding structured data to LLMs. The encoder emits:
//!
//! - **Key folding**: nested objects expressed via indentation, no braces/brackets
//! - **Inline arrays**: primitive arrays as `key[N]: v1,v2,v3`
//! - **Tabular arrays**: uniform object arrays as `key[N]{f1,f2}:\n  v1,v2\n  v3,v4`
//! - **Expanded lists**: mixed/complex arrays as `key[N]:\n  - item1\n  - item2`
//! - **Context-dependent quoting**: strings only quoted when ambiguous (per delimiter scope)
//! - **Number normalization**: no exponents, no trailing zeros, whole floats as integers, -0 → 0
//!
//! # Example
//! ```
//! use toon_codec::{encode, EncodeOptions, ToonValue};
//!
//! let value: ToonValue = serde_json::json!({"name": "Alice", "tags": ["rust", "wasm"]}).into();
//! let toon = encode(&value, &EncodeOptions::default());
//! assert_eq!(toon, "name: Alice\ntags[2]: rust,wasm");
//! ```

use crate::options::{Delimiter, EncodeOptions};
use crate::types::{whole_float_as_i64, ToonMap, ToonValue};

/// Encode a value as TOON text.
///
/// Never fails: every [`ToonValue`] has a TOON form. Output lines are joined
/// by `\n` with no trailing newline.
///
/// Non-finite floats are outside the value model. The checked constructors
/// (`ToonValue::try_from`, [`to_value`](crate::to_value), JSON parsing)
/// never produce them; a hand-built `Float(f64::NAN)` is written as `null`.
pub fn encode(value: &ToonValue, options: &EncodeOptions) -> String {
    tracing::trace!(kind = value.type_name(), "encoding TOON document");
    let mut writer = Writer::new(options);
    writer.root(value);
    writer.finish()
}

/// Context for quoting decisions: different separators are "active" in
/// different positions.
#[derive(Clone, Copy, PartialEq)]
enum QuoteContext {
    /// Object field value, list item or bare root primitive; colon triggers quoting
    Document,
    /// Inline array value or tabular cell; the active delimiter triggers quoting
    Delimited(Delimiter),
}

/// Line-oriented output buffer. Tracks whether a line has been started so
/// that separators are only written between lines.
struct Writer {
    out: String,
    unit: usize,
    delimiter: Delimiter,
    has_line: bool,
}

impl Writer {
    fn new(options: &EncodeOptions) -> Self {
        Writer {
            out: String::new(),
            unit: options.indent_width(),
            delimiter: options.delimiter,
            has_line: false,
        }
    }

    fn finish(self) -> String {
        self.out
    }

    /// Begin a new line at `depth`.
    fn line(&mut self, depth: usize) {
        if self.has_line {
            self.out.push('\n');
        }
        self.has_line = true;
        for _ in 0..depth * self.unit {
            self.out.push(' ');
        }
    }

    /// Top-level dispatch: objects emit fields, arrays emit root array syntax,
    /// primitives emit a bare value.
    fn root(&mut self, value: &ToonValue) {
        match value {
            ToonValue::Object(map) => self.object_fields(map, 0),
            ToonValue::Array(arr) => {
                self.line(0);
                self.array(arr, 0);
            }
            _ => {
                self.line(0);
                self.primitive(value, QuoteContext::Document);
            }
        }
    }

    /// Emit all key-value pairs of an object, one line each, at `depth`.
    fn object_fields(&mut self, map: &ToonMap, depth: usize) {
        for (key, value) in map {
            self.line(depth);
            self.field(key, value, depth);
        }
    }

    /// Write `key` plus its value on the current line; nested bodies go to
    /// `depth + 1`.
    ///
    /// - Empty objects → `key:`
    /// - Non-empty objects → `key:\n  child_key: child_val`
    /// - Arrays → `key[N]...` (inline/tabular/expanded)
    /// - Primitives → `key: value`
    fn field(&mut self, key: &str, value: &ToonValue, depth: usize) {
        push_key(&mut self.out, key);
        match value {
            ToonValue::Object(map) => {
                self.out.push(':');
                self.object_fields(map, depth + 1);
            }
            ToonValue::Array(arr) => self.array(arr, depth),
            _ => {
                self.out.push_str(": ");
                self.primitive(value, QuoteContext::Document);
            }
        }
    }

    /// Emit an array header (after an optional key already on the line) and
    /// its body, selecting the most compact representation:
    ///
    /// 1. **Empty**: `[0]:`
    /// 2. **Tabular**: all elements are objects with the same keys in the same
    ///    order and only primitive values → `[N]{f1,f2}:` + one row per element
    /// 3. **Inline**: all elements are primitives → `[N]: v1,v2,v3`
    /// 4. **Expanded list**: anything else → `[N]:` + `- item` lines
    ///
    /// Body lines sit at `depth + 1`.
    fn array(&mut self, arr: &[ToonValue], depth: usize) {
        let marker = self.delimiter.header_marker();
        let len = arr.len();

        if arr.is_empty() {
            self.out.push_str(&format!("[0{marker}]:"));
            return;
        }

        if let Some(fields) = detect_tabular(arr) {
            let sep = self.delimiter.as_char();
            self.out.push_str(&format!("[{len}{marker}]{{"));
            for (i, field) in fields.iter().enumerate() {
                if i > 0 {
                    self.out.push(sep);
                }
                push_key(&mut self.out, field);
            }
            self.out.push_str("}:");
            for row in arr {
                if let ToonValue::Object(map) = row {
                    self.line(depth + 1);
                    self.delimited_values(map.values());
                }
            }
            return;
        }

        if arr.iter().all(ToonValue::is_primitive) {
            self.out.push_str(&format!("[{len}{marker}]: "));
            self.delimited_values(arr.iter());
            return;
        }

        self.out.push_str(&format!("[{len}{marker}]:"));
        for item in arr {
            self.line(depth + 1);
            self.list_item(item, depth + 1);
        }
    }

    /// Emit delimiter-separated primitive values on the current line.
    fn delimited_values<'v>(&mut self, values: impl Iterator<Item = &'v ToonValue>) {
        let ctx = QuoteContext::Delimited(self.delimiter);
        for (i, val) in values.enumerate() {
            if i > 0 {
                self.out.push(self.delimiter.as_char());
            }
            self.primitive(val, ctx);
        }
    }

    /// Emit one expanded list item at `depth` (the line is already started):
    /// - A primitive value: `- hello`
    /// - An empty object: `-`
    /// - An object: `- key1: val1` then sibling fields at `depth + 1`; the
    ///   first field's own body goes to `depth + 2`
    /// - A nested array: `- [N]: v1,v2`, body at `depth + 1`
    fn list_item(&mut self, item: &ToonValue, depth: usize) {
        match item {
            ToonValue::Object(map) if map.is_empty() => {
                self.out.push('-');
            }
            ToonValue::Object(map) => {
                self.out.push_str("- ");
                let mut fields = map.iter();
                if let Some((key, value)) = fields.next() {
                    self.field(key, value, depth + 1);
                }
                for (key, value) in fields {
                    self.line(depth + 1);
                    self.field(key, value, depth + 1);
                }
            }
            ToonValue::Array(inner) => {
                self.out.push_str("- ");
                self.array(inner, depth);
            }
            _ => {
                self.out.push_str("- ");
                self.primitive(item, QuoteContext::Document);
            }
        }
    }

    /// Emit a primitive value (null, bool, number, string) in TOON format.
    fn primitive(&mut self, value: &ToonValue, ctx: QuoteContext) {
        match value {
            ToonValue::Null => self.out.push_str("null"),
            ToonValue::Bool(b) => self.out.push_str(if *b { "true" } else { "false" }),
            ToonValue::Integer(i) => self.out.push_str(&i.to_string()),
            ToonValue::UInteger(u) => self.out.push_str(&u.to_string()),
            ToonValue::Float(f) => self.out.push_str(&format_float(*f)),
            ToonValue::String(s) => push_string(&mut self.out, s, ctx),
            ToonValue::Array(_) | ToonValue::Object(_) => {
                unreachable!("callers route arrays and objects to their own layouts")
            }
        }
    }
}

/// Format a float per TOON rules:
/// - No scientific notation (exponents)
/// - No trailing fractional zeros (3.10 → 3.1)
/// - Whole values in `i64` range use integer form (1.0 → 1)
/// - Negative zero normalizes to 0
///
/// `f64`'s `Display` already produces the shortest representation that
/// parses back to the same bits, without exponents.
fn format_float(f: f64) -> String {
    if !f.is_finite() {
        return "null".to_string();
    }
    if let Some(i) = whole_float_as_i64(f) {
        return i.to_string();
    }
    let s = format!("{}", f);
    if s.contains('.') {
        s.trim_end_matches('0').trim_end_matches('.').to_string()
    } else {
        s
    }
}

/// Emit a string value, quoting and escaping only when necessary.
/// Unquoted strings save 2 tokens (the quotes) per value.
fn push_string(out: &mut String, s: &str, ctx: QuoteContext) {
    if needs_quoting(s, ctx) {
        push_quoted(out, s);
    } else {
        out.push_str(s);
    }
}

/// Write `s` in double quotes with `\\ \" \n \r \t` escapes and `\uXXXX` for
/// any other control character.
fn push_quoted(out: &mut String, s: &str) {
    out.reserve(s.len() + 2);
    out.push('"');
    for ch in s.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c.is_control() => {
                out.push_str(&format!("\\u{:04x}", c as u32));
            }
            c => out.push(c),
        }
    }
    out.push('"');
}

/// Determine if a string value must be quoted to preserve roundtrip fidelity.
///
/// A string MUST be quoted if it:
/// - Is empty
/// - Has leading/trailing whitespace
/// - Looks like a boolean (`true`/`false`) or `null`
/// - Looks numeric (would be decoded as a number instead of string)
/// - Contains backslash, double quote, brackets, braces, or control chars
/// - Starts with `-` (ambiguous with list item marker)
/// - Contains the ACTIVE separator for the current context:
///   - Document context: colon (`:`)
///   - Delimited context: the array's delimiter
fn needs_quoting(s: &str, ctx: QuoteContext) -> bool {
    if s.is_empty() || s != s.trim() {
        return true;
    }
    if s == "true" || s == "false" || s == "null" {
        return true;
    }
    if looks_numeric(s) {
        return true;
    }
    if s.starts_with('-') {
        return true;
    }
    if s
        .chars()
        .any(|c| matches!(c, '\\' | '"' | '[' | ']' | '{' | '}') || c.is_control())
    {
        return true;
    }
    match ctx {
        QuoteContext::Document => s.contains(':'),
        QuoteContext::Delimited(delimiter) => s.contains(delimiter.as_char()),
    }
}

/// Check if a string looks like a number (and thus must be quoted to preserve type info).
/// Matches integers, floats, exponents and leading-zero forms like "05" or "0001".
/// Deliberately broader than the decoder's number grammar.
fn looks_numeric(s: &str) -> bool {
    let rest = s.strip_prefix('-').unwrap_or(s);
    if rest.is_empty() {
        return false;
    }
    let bytes = rest.as_bytes();
    if !bytes[0].is_ascii_digit() && bytes[0] != b'.' {
        return false;
    }
    let mut has_dot = false;
    let mut has_e = false;
    let mut prev = 0u8;
    for (i, &b) in bytes.iter().enumerate() {
        match b {
            b'0'..=b'9' => {}
            b'.' if !has_dot && !has_e => has_dot = true,
            b'e' | b'E' if !has_e && i > 0 => has_e = true,
            b'+' | b'-' if matches!(prev, b'e' | b'E') => {}
            _ => return false,
        }
        prev = b;
    }
    bytes.iter().any(|b| b.is_ascii_digit())
}

/// Write an object key. Keys matching `^[A-Za-z_][A-Za-z0-9_.]*$` are emitted
/// unquoted; all others are quoted with escape sequences.
fn push_key(out: &mut String, key: &str) {
    if is_valid_unquoted_key(key) {
        out.push_str(key);
    } else {
        push_quoted(out, key);
    }
}

/// Test if a key can be emitted unquoted: `^[A-Za-z_][A-Za-z0-9_.]*$`
fn is_valid_unquoted_key(key: &str) -> bool {
    let mut chars = key.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '.')
}

/// Detect if an array is tabular: all elements are non-empty objects with the
/// same keys in the same order, and all values are primitives.
///
/// Key order must match exactly: rows are decoded in header order, so a
/// reordered element would not round-trip.
fn detect_tabular(arr: &[ToonValue]) -> Option<Vec<&str>> {
    let first = arr.first()?.as_object()?;
    if first.is_empty() {
        return None;
    }
    let fields: Vec<&str> = first.keys().map(String::as_str).collect();
    for item in arr {
        let obj = item.as_object()?;
        if obj.len() != fields.len() {
            return None;
        }
        for ((key, value), field) in obj.iter().zip(&fields) {
            if key != field || !value.is_primitive() {
                return None;
            }
        }
    }
    Some(fields)
}
