//! TOON decoder: converts TOON text back into a [`ToonValue`].
//!
//! The decoder is line-oriented and indentation-sensitive. It handles:
//!
//! - Flat and nested objects (indentation-based)
//! - Inline primitive arrays (`key[N]: v1,v2`)
//! - Tabular arrays (`key[N]{f1,f2}:\n  v1,v2`)
//! - Expanded lists (`key[N]:\n  - item`)
//! - Comma, tab (`[N\t]`) and pipe (`[N|]`) delimiters declared in headers
//! - Quoted/unquoted keys and values with escape sequences
//! - Type inference: unquoted `true`/`false` → bool, `null` → null, numbers → number
//!
//! # Key design decisions
//!
//! - **Indent unit**: the width of the first indented line. Every other
//!   indentation must be a multiple of it; tabs are rejected.
//! - **Strict structure**: a child block starts exactly one level deeper than
//!   its owner, `[N]` must match the decoded length, tabular rows must match
//!   the header's field count, and duplicate keys are errors.
//! - **Empty input** decodes to an empty object, mirroring how the encoder
//!   writes an empty object.

use crate::error::{ParseErrorKind, Result, ToonError};
use crate::options::Delimiter;
use crate::types::{ToonMap, ToonValue};

/// Decode TOON text into a value.
///
/// # Example
/// ```
/// use toon_codec::{decode, ToonValue};
///
/// let value = decode("name: Alice\nscores[3]: 95,87,92").unwrap();
/// assert_eq!(value.get("name"), Some(&ToonValue::from("Alice")));
/// assert_eq!(value.get("scores").and_then(|s| s.as_array()).map(Vec::len), Some(3));
/// ```
pub fn decode(text: &str) -> Result<ToonValue> {
    let lines = scan_lines(text)?;
    tracing::trace!(lines = lines.len(), "decoding TOON document");
    if lines.is_empty() {
        return Ok(ToonValue::object());
    }
    Parser { lines, pos: 0 }.document()
}

/// A non-blank source line with its nesting depth resolved.
#[derive(Clone, Copy, Debug)]
struct Line<'a> {
    /// 1-based line number in the original text
    number: usize,
    depth: usize,
    /// Text after the indentation, trailing whitespace removed
    content: &'a str,
}

/// Split the input into lines, drop blank ones, and convert leading spaces
/// into depths.
fn scan_lines(text: &str) -> Result<Vec<Line<'_>>> {
    let mut lines = Vec::new();
    let mut unit: Option<usize> = None;

    for (idx, raw) in text.split('\n').enumerate() {
        let number = idx + 1;
        let raw = raw.strip_suffix('\r').unwrap_or(raw);
        if raw.trim().is_empty() {
            continue;
        }
        let content = raw.trim_start_matches(' ');
        if content.starts_with('\t') {
            return Err(indentation(number, "tab character in indentation"));
        }
        let spaces = raw.len() - content.len();
        let depth = if spaces == 0 {
            0
        } else {
            let unit = *unit.get_or_insert(spaces);
            if spaces % unit != 0 {
                return Err(indentation(
                    number,
                    format!("indentation of {spaces} spaces is not a multiple of {unit}"),
                ));
            }
            spaces / unit
        };
        lines.push(Line {
            number,
            depth,
            content: content.trim_end(),
        });
    }

    Ok(lines)
}

/// Parsed metadata from an array header like `[3]{a,b}:` or `[2|]: x|y`.
struct ArrayHeader<'a> {
    /// Declared element count
    len: usize,
    delimiter: Delimiter,
    /// Tabular column names if present (`{f1,f2}` syntax)
    fields: Option<Vec<String>>,
    /// Raw value text if inline (`[N]: v1,v2`, text after `: `)
    inline: Option<&'a str>,
}

/// Cursor over the scanned lines.
struct Parser<'a> {
    lines: Vec<Line<'a>>,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn peek(&self) -> Option<Line<'a>> {
        self.lines.get(self.pos).copied()
    }

    /// Classify the document as root array, object, or root primitive.
    fn document(&mut self) -> Result<ToonValue> {
        let first = self.lines[0];
        if first.depth != 0 {
            return Err(indentation(
                first.number,
                "document must start without indentation",
            ));
        }

        let value = if first.content.starts_with('[') {
            self.pos = 1;
            let header = parse_array_header(first.content, first.number)?;
            self.array_body(&header, 0, first.number)?
        } else if split_key(first.content, first.number)?.is_some() {
            self.object(0)?
        } else {
            self.pos = 1;
            parse_scalar(first.content, first.number)?
        };

        if let Some(line) = self.peek() {
            return Err(syntax(
                line.number,
                format!("unexpected content after root value: `{}`", line.content),
            ));
        }
        Ok(value)
    }

    /// Parse the object whose fields sit at `depth`.
    fn object(&mut self, depth: usize) -> Result<ToonValue> {
        let mut map = ToonMap::new();
        self.fields_into(&mut map, depth)?;
        Ok(ToonValue::Object(map))
    }

    /// Consume `key…` lines at `depth` into `map` until a shallower line or
    /// end of input.
    fn fields_into(&mut self, map: &mut ToonMap, depth: usize) -> Result<()> {
        while let Some(line) = self.peek() {
            if line.depth < depth {
                break;
            }
            if line.depth > depth {
                return Err(indentation(line.number, "unexpected indentation"));
            }
            self.pos += 1;
            let (key, rest) = split_key(line.content, line.number)?.ok_or_else(|| {
                syntax(
                    line.number,
                    format!("expected `key: value`, found `{}`", line.content),
                )
            })?;
            let value = self.field_value(rest, depth, line)?;
            insert_unique(map, key, value, line.number)?;
        }
        Ok(())
    }

    /// Parse what follows a key. `depth` is the depth the field belongs to;
    /// any body sits at `depth + 1`. The field's own line has already been
    /// consumed.
    ///
    /// Handles four value forms:
    /// - `key[N]...` → array (inline, tabular, or expanded)
    /// - `key:` + deeper lines → nested object
    /// - `key:` alone → empty object
    /// - `key: value` → primitive value
    fn field_value(&mut self, rest: &'a str, depth: usize, line: Line<'a>) -> Result<ToonValue> {
        if rest.starts_with('[') {
            let header = parse_array_header(rest, line.number)?;
            return self.array_body(&header, depth, line.number);
        }

        let value = rest
            .strip_prefix(':')
            .ok_or_else(|| syntax(line.number, "expected ':' after key"))?
            .trim();

        if !value.is_empty() {
            return parse_scalar(value, line.number);
        }

        match self.peek() {
            Some(next) if next.depth > depth => {
                if next.depth != depth + 1 {
                    return Err(indentation(
                        next.number,
                        "nested block is indented more than one level",
                    ));
                }
                self.object(depth + 1)
            }
            _ => Ok(ToonValue::object()),
        }
    }

    /// Parse the body announced by `header`, whose owning line is at `depth`,
    /// and check the declared length.
    fn array_body(
        &mut self,
        header: &ArrayHeader<'a>,
        depth: usize,
        line_number: usize,
    ) -> Result<ToonValue> {
        let items = if let Some(inline) = header.inline {
            split_delimited(inline, header.delimiter, line_number)?
                .into_iter()
                .map(|token| parse_scalar(token, line_number))
                .collect::<Result<Vec<_>>>()?
        } else if let Some(fields) = &header.fields {
            self.tabular_rows(fields, header.delimiter, depth + 1)?
        } else {
            self.list_items(depth + 1)?
        };

        if items.len() != header.len {
            return Err(ToonError::parse(
                line_number,
                ParseErrorKind::LengthMismatch,
                format!(
                    "array declares {} elements but contains {}",
                    header.len,
                    items.len()
                ),
            ));
        }
        Ok(ToonValue::Array(items))
    }

    /// Parse tabular rows at `row_depth`: delimiter-separated cells mapped
    /// onto the header's field names, one object per row.
    fn tabular_rows(
        &mut self,
        fields: &[String],
        delimiter: Delimiter,
        row_depth: usize,
    ) -> Result<Vec<ToonValue>> {
        let mut rows = Vec::new();
        while let Some(line) = self.peek() {
            if line.depth < row_depth {
                break;
            }
            if line.depth > row_depth {
                return Err(indentation(line.number, "unexpected indentation in table"));
            }
            self.pos += 1;

            let cells = split_delimited(line.content, delimiter, line.number)?;
            if cells.len() != fields.len() {
                return Err(ToonError::parse(
                    line.number,
                    ParseErrorKind::FieldCountMismatch,
                    format!(
                        "row has {} values but the header declares {} fields ({})",
                        cells.len(),
                        fields.len(),
                        fields.join(",")
                    ),
                ));
            }

            let mut row = ToonMap::with_capacity(fields.len());
            for (field, cell) in fields.iter().zip(cells) {
                row.insert(field.clone(), parse_scalar(cell, line.number)?);
            }
            rows.push(ToonValue::Object(row));
        }
        Ok(rows)
    }

    /// Parse expanded `- ` list items at `item_depth`.
    fn list_items(&mut self, item_depth: usize) -> Result<Vec<ToonValue>> {
        let mut items = Vec::new();
        while let Some(line) = self.peek() {
            if line.depth < item_depth {
                break;
            }
            if line.depth > item_depth {
                return Err(indentation(line.number, "unexpected indentation in list"));
            }
            let content = if line.content == "-" {
                None
            } else if let Some(rest) = line.content.strip_prefix("- ") {
                Some(rest.trim_start())
            } else {
                return Err(syntax(
                    line.number,
                    format!("expected list item `- …`, found `{}`", line.content),
                ));
            };
            self.pos += 1;
            items.push(self.list_item(content, item_depth, line)?);
        }
        Ok(items)
    }

    /// Parse one list item's content (text after `- `).
    ///
    /// - `-` alone → empty object
    /// - `- [N]…` → nested array, body at `depth + 1`
    /// - `- key…` → object; the first field's body sits at `depth + 2` and the
    ///   remaining fields at `depth + 1`
    /// - anything else → primitive
    fn list_item(
        &mut self,
        content: Option<&'a str>,
        depth: usize,
        line: Line<'a>,
    ) -> Result<ToonValue> {
        let Some(content) = content else {
            return Ok(ToonValue::object());
        };

        if content.starts_with('[') {
            let header = parse_array_header(content, line.number)?;
            return self.array_body(&header, depth, line.number);
        }

        if let Some((key, rest)) = split_key(content, line.number)? {
            let mut map = ToonMap::new();
            let value = self.field_value(rest, depth + 1, line)?;
            map.insert(key, value);
            self.fields_into(&mut map, depth + 1)?;
            return Ok(ToonValue::Object(map));
        }

        parse_scalar(content, line.number)
    }
}

/// Split `content` into `(key, rest)` when it is a field line, where `rest`
/// starts at the `:` or `[` that follows the key. Returns `None` for lines
/// that are values rather than fields.
fn split_key(content: &str, line: usize) -> Result<Option<(String, &str)>> {
    if content.starts_with('"') {
        let (key, end) = parse_quoted(content, line)?;
        let rest = &content[end..];
        if rest.starts_with(':') || rest.starts_with('[') {
            return Ok(Some((key, rest)));
        }
        return Ok(None);
    }

    if content == "-" || content.starts_with("- ") {
        return Ok(None);
    }

    // Unquoted key: the earliest of ':' or '['
    match content.find([':', '[']) {
        Some(pos) => {
            let key = content[..pos].trim_end();
            if key.is_empty() {
                return Ok(None);
            }
            Ok(Some((key.to_string(), &content[pos..])))
        }
        None => Ok(None),
    }
}

/// Parse an array header starting at `[`: `[N]`, optional delimiter marker
/// before `]`, optional `{fields}`, then `:` and optional inline values.
fn parse_array_header(s: &str, line: usize) -> Result<ArrayHeader<'_>> {
    let body = &s[1..];
    let close = body
        .find(']')
        .ok_or_else(|| syntax(line, "unterminated array header"))?;
    let inside = &body[..close];

    let (digits, delimiter) = match inside.chars().last().and_then(Delimiter::from_marker) {
        Some(delimiter) => (&inside[..inside.len() - 1], delimiter),
        None => (inside, Delimiter::Comma),
    };
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(syntax(line, format!("invalid array length `{inside}`")));
    }
    let len: usize = digits
        .parse()
        .map_err(|_| syntax(line, format!("array length `{digits}` is too large")))?;

    let mut rest = &body[close + 1..];
    let mut fields = None;
    if rest.starts_with('{') {
        let end = find_unquoted(rest, '}')
            .ok_or_else(|| syntax(line, "unterminated field list in array header"))?;
        fields = Some(parse_field_names(&rest[1..end], delimiter, line)?);
        rest = &rest[end + 1..];
    }

    let after = rest
        .strip_prefix(':')
        .ok_or_else(|| syntax(line, "expected ':' after array header"))?
        .trim();
    let inline = (!after.is_empty()).then_some(after);

    if fields.is_some() && inline.is_some() {
        return Err(syntax(
            line,
            "tabular header must not carry inline values",
        ));
    }

    Ok(ArrayHeader {
        len,
        delimiter,
        fields,
        inline,
    })
}

/// Parse the `f1,f2` part of a tabular header. Names may be quoted.
fn parse_field_names(s: &str, delimiter: Delimiter, line: usize) -> Result<Vec<String>> {
    let mut names: Vec<String> = Vec::new();
    for token in split_delimited(s, delimiter, line)? {
        let name = if token.starts_with('"') {
            let (name, end) = parse_quoted(token, line)?;
            if end != token.len() {
                return Err(syntax(line, "unexpected characters after quoted field name"));
            }
            name
        } else if token.is_empty() {
            return Err(syntax(line, "empty field name in tabular header"));
        } else {
            token.to_string()
        };
        if names.contains(&name) {
            return Err(ToonError::parse(
                line,
                ParseErrorKind::DuplicateKey,
                format!("duplicate field `{name}` in tabular header"),
            ));
        }
        names.push(name);
    }
    Ok(names)
}

/// Split on `delimiter` outside of quoted strings; cells are trimmed.
fn split_delimited(s: &str, delimiter: Delimiter, line: usize) -> Result<Vec<&str>> {
    let sep = delimiter.as_char();
    let mut cells = Vec::new();
    let mut start = 0;
    let mut in_quotes = false;
    let mut escaped = false;

    for (i, c) in s.char_indices() {
        if in_quotes {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_quotes = false;
            }
        } else if c == '"' {
            in_quotes = true;
        } else if c == sep {
            cells.push(s[start..i].trim());
            start = i + c.len_utf8();
        }
    }
    if in_quotes {
        return Err(unterminated(line));
    }
    cells.push(s[start..].trim());
    Ok(cells)
}

/// Byte position of the first `target` outside of quoted strings.
fn find_unquoted(s: &str, target: char) -> Option<usize> {
    let mut in_quotes = false;
    let mut escaped = false;
    for (i, c) in s.char_indices() {
        if in_quotes {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_quotes = false;
            }
        } else if c == '"' {
            in_quotes = true;
        } else if c == target {
            return Some(i);
        }
    }
    None
}

/// Parse a scalar token into a value.
///
/// Type inference order: quoted string → null → bool → number → unquoted string.
/// This mirrors the encoder's quoting rules: strings that look like numbers/bools
/// are quoted by the encoder, so unquoted tokens can be safely interpreted as
/// their types.
fn parse_scalar(token: &str, line: usize) -> Result<ToonValue> {
    let token = token.trim();

    if token.starts_with('"') {
        let (s, end) = parse_quoted(token, line)?;
        if end != token.len() {
            return Err(syntax(
                line,
                format!("unexpected characters after closing quote in `{token}`"),
            ));
        }
        return Ok(ToonValue::String(s));
    }

    match token {
        "null" => return Ok(ToonValue::Null),
        "true" => return Ok(ToonValue::Bool(true)),
        "false" => return Ok(ToonValue::Bool(false)),
        _ => {}
    }

    if is_number(token) {
        return parse_number(token, line);
    }

    Ok(ToonValue::String(token.to_string()))
}

/// Number grammar: `-?(0|[1-9][0-9]*)(\.[0-9]+)?([eE][+-]?[0-9]+)?`.
/// Leading-zero forms such as `05` are strings.
fn is_number(s: &str) -> bool {
    let b = s.as_bytes();
    let mut i = 0;
    let digits = |i: &mut usize| {
        let start = *i;
        while *i < b.len() && b[*i].is_ascii_digit() {
            *i += 1;
        }
        *i - start
    };

    if b.first() == Some(&b'-') {
        i += 1;
    }
    let int_start = i;
    let int_len = digits(&mut i);
    if int_len == 0 || (int_len > 1 && b[int_start] == b'0') {
        return false;
    }
    if i < b.len() && b[i] == b'.' {
        i += 1;
        if digits(&mut i) == 0 {
            return false;
        }
    }
    if i < b.len() && (b[i] == b'e' || b[i] == b'E') {
        i += 1;
        if i < b.len() && (b[i] == b'+' || b[i] == b'-') {
            i += 1;
        }
        if digits(&mut i) == 0 {
            return false;
        }
    }
    i == b.len()
}

/// Convert a token accepted by [`is_number`]. Integers try `i64`, then
/// `u64`, and only fall back to `f64` beyond both.
fn parse_number(s: &str, line: usize) -> Result<ToonValue> {
    if !s.contains(['.', 'e', 'E']) {
        if let Ok(i) = s.parse::<i64>() {
            return Ok(ToonValue::Integer(i));
        }
        if let Ok(u) = s.parse::<u64>() {
            return Ok(ToonValue::UInteger(u));
        }
    }
    match s.parse::<f64>() {
        Ok(f) if f.is_finite() => Ok(ToonValue::Float(f)),
        _ => Err(syntax(line, format!("number `{s}` is out of range"))),
    }
}

/// Parse a quoted string starting at `s[0] == '"'`.
/// Returns the unescaped text and the byte index just past the closing quote.
fn parse_quoted(s: &str, line: usize) -> Result<(String, usize)> {
    let mut out = String::new();
    let mut chars = s.char_indices().skip(1);

    while let Some((i, c)) = chars.next() {
        match c {
            '"' => return Ok((out, i + 1)),
            '\\' => {
                let (_, esc) = chars.next().ok_or_else(|| unterminated(line))?;
                match esc {
                    '\\' => out.push('\\'),
                    '"' => out.push('"'),
                    'n' => out.push('\n'),
                    'r' => out.push('\r'),
                    't' => out.push('\t'),
                    'u' => {
                        let hex: String = chars.by_ref().take(4).map(|(_, h)| h).collect();
                        let ch = (hex.len() == 4)
                            .then(|| u32::from_str_radix(&hex, 16).ok())
                            .flatten()
                            .and_then(char::from_u32)
                            .ok_or_else(|| {
                                ToonError::parse(
                                    line,
                                    ParseErrorKind::UnknownEscape,
                                    format!("invalid unicode escape `\\u{hex}`"),
                                )
                            })?;
                        out.push(ch);
                    }
                    other => {
                        return Err(ToonError::parse(
                            line,
                            ParseErrorKind::UnknownEscape,
                            format!("unknown escape sequence `\\{other}`"),
                        ))
                    }
                }
            }
            _ => out.push(c),
        }
    }

    Err(unterminated(line))
}

fn insert_unique(map: &mut ToonMap, key: String, value: ToonValue, line: usize) -> Result<()> {
    if map.contains_key(&key) {
        return Err(ToonError::parse(
            line,
            ParseErrorKind::DuplicateKey,
            format!("duplicate key `{key}`"),
        ));
    }
    map.insert(key, value);
    Ok(())
}

fn syntax(line: usize, message: impl Into<String>) -> ToonError {
    ToonError::parse(line, ParseErrorKind::Syntax, message)
}

fn indentation(line: usize, message: impl Into<String>) -> ToonError {
    ToonError::parse(line, ParseErrorKind::Indentation, message)
}

fn unterminated(line: usize) -> ToonError {
    ToonError::parse(
        line,
        ParseErrorKind::UnterminatedString,
        "unterminated quoted string",
    )
}
