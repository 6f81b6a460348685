//! Dotenv line grammar
//!
//! Turns file content into an ordered list of raw entries. Expansion of `$NAME`
//! references happens afterwards in [`super::expand`], so each entry records
//! whether its quoting allows it.

use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;

static KEY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z_.\-][A-Za-z0-9_.\-]*$").expect("valid key regex"));

/// One `KEY=VALUE` assignment as written in the file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub key: String,
    /// Value with quotes removed. Double-quoted escapes are applied except `\\`
    /// and `\$`, which are left for expansion.
    pub value: String,
    /// False for single- and backtick-quoted values.
    pub expand: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    pub line: usize,
    pub message: String,
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}: {}", self.line, self.message)
    }
}

impl std::error::Error for ParseError {}

impl ParseError {
    fn new(line: usize, message: impl Into<String>) -> Self {
        Self { line, message: message.into() }
    }
}

/// Parse dotenv content.
///
/// Blank lines and `#` comments are skipped, `export ` prefixes are accepted,
/// and quoted values may span several lines. Later duplicates are kept in the
/// list; the expander lets the last one win.
pub fn parse(content: &str) -> Result<Vec<Entry>, ParseError> {
    let content = content.strip_prefix('\u{feff}').unwrap_or(content).replace("\r\n", "\n");
    let lines: Vec<&str> = content.split('\n').collect();

    let mut entries = Vec::new();
    let mut idx = 0;
    while idx < lines.len() {
        let line_no = idx + 1;
        let trimmed = lines[idx].trim();
        idx += 1;

        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        let body = strip_export(trimmed);
        let Some((raw_key, rest)) = body.split_once('=') else {
            return Err(ParseError::new(line_no, format!("expected KEY=VALUE, found '{}'", body)));
        };

        let key = raw_key.trim();
        if !KEY_RE.is_match(key) {
            return Err(ParseError::new(line_no, format!("invalid variable name '{}'", key)));
        }

        let rest = rest.trim_start();
        let (value, expand) = match rest.chars().next() {
            Some(quote @ ('"' | '\'' | '`')) => {
                let mut buf = rest[1..].to_string();
                let (raw, trailing) = loop {
                    if let Some(end) = find_closing(&buf, quote) {
                        let trailing = buf[end + 1..].to_string();
                        buf.truncate(end);
                        break (buf, trailing);
                    }
                    if idx >= lines.len() {
                        return Err(ParseError::new(
                            line_no,
                            format!("unterminated {} quote in value of '{}'", quote, key),
                        ));
                    }
                    buf.push('\n');
                    buf.push_str(lines[idx]);
                    idx += 1;
                };

                let trailing = trailing.trim();
                if !trailing.is_empty() && !trailing.starts_with('#') {
                    return Err(ParseError::new(
                        line_no,
                        format!("unexpected text after closing quote in value of '{}'", key),
                    ));
                }

                if quote == '"' {
                    (unescape_double_quoted(&raw), true)
                } else {
                    (raw, false)
                }
            }
            _ => (strip_inline_comment(rest).trim_end().to_string(), true),
        };

        entries.push(Entry { key: key.to_string(), value, expand });
    }

    Ok(entries)
}

fn strip_export(line: &str) -> &str {
    match line.strip_prefix("export") {
        Some(rest) if rest.starts_with(char::is_whitespace) => rest.trim_start(),
        _ => line,
    }
}

/// Byte offset of the closing quote. Backslash escapes only count inside
/// double quotes.
fn find_closing(text: &str, quote: char) -> Option<usize> {
    let mut escaped = false;
    for (offset, ch) in text.char_indices() {
        if quote == '"' {
            if escaped {
                escaped = false;
                continue;
            }
            if ch == '\\' {
                escaped = true;
                continue;
            }
        }
        if ch == quote {
            return Some(offset);
        }
    }
    None
}

/// An unquoted value ends at a `#` that starts the value or follows whitespace.
fn strip_inline_comment(value: &str) -> &str {
    if value.starts_with('#') {
        return "";
    }
    let mut prev_ws = false;
    for (offset, ch) in value.char_indices() {
        if ch == '#' && prev_ws {
            return &value[..offset];
        }
        prev_ws = ch.is_whitespace();
    }
    value
}

fn unescape_double_quoted(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(ch) = chars.next() {
        if ch != '\\' {
            out.push(ch);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('t') => out.push('\t'),
            Some('"') => out.push('"'),
            // `\\` and `\$` are resolved by the expander
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}
