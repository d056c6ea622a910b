//! Attribute values and their literal syntax.
//!
//! Values are written and displayed as literals:
//! - booleans: `True`, `False`
//! - integers: `42`, `-3`, `0x1f`, `0o17`, `0b101`, `1_000`
//! - strings: `'text'` or `"text"` with backslash escapes
//!
//! Bare words are not literals, so `notabool` is rejected rather than
//! silently read as a string.

use std::fmt;

// =============================================================================
// Kind & Value
// =============================================================================

/// Declared type of an attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    Bool,
    Int,
    Str,
}

impl Kind {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Bool => "bool",
            Self::Int => "int",
            Self::Str => "str",
        }
    }
}

/// A typed attribute value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Bool(bool),
    Int(i64),
    Str(String),
}

impl Value {
    pub fn kind(&self) -> Kind {
        match self {
            Self::Bool(_) => Kind::Bool,
            Self::Int(_) => Kind::Int,
            Self::Str(_) => Kind::Str,
        }
    }

    /// Boolean payload; `false` for other kinds.
    pub fn as_bool(&self) -> bool {
        matches!(self, Self::Bool(true))
    }

    /// Integer payload; `0` for other kinds.
    pub fn as_int(&self) -> i64 {
        match self {
            Self::Int(n) => *n,
            _ => 0,
        }
    }

    /// String payload; empty for other kinds.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Str(s) => s,
            _ => "",
        }
    }

    /// Convert to `kind` the way a constructor call would.
    ///
    /// Returns `None` when no sensible conversion exists.
    pub fn coerce(self, kind: Kind) -> Option<Value> {
        match (kind, self) {
            (Kind::Bool, Self::Bool(b)) => Some(Self::Bool(b)),
            (Kind::Bool, Self::Int(n)) => Some(Self::Bool(n != 0)),
            (Kind::Bool, Self::Str(_)) => None,
            (Kind::Int, Self::Int(n)) => Some(Self::Int(n)),
            (Kind::Int, Self::Bool(b)) => Some(Self::Int(b as i64)),
            (Kind::Int, Self::Str(s)) => s.trim().parse().ok().map(Self::Int),
            (Kind::Str, Self::Str(s)) => Some(Self::Str(s)),
            (Kind::Str, Self::Bool(b)) => Some(Self::Str(if b { "True" } else { "False" }.into())),
            (Kind::Str, Self::Int(n)) => Some(Self::Str(n.to_string())),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Self::Int(n)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::Str(s)
    }
}

/// Displays the value as a literal that [`parse`] reads back.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(true) => f.write_str("True"),
            Self::Bool(false) => f.write_str("False"),
            Self::Int(n) => write!(f, "{n}"),
            Self::Str(s) => f.write_str(&quote(s)),
        }
    }
}

// =============================================================================
// Parsing
// =============================================================================

/// Parse a literal.
///
/// The error string describes what was wrong with the input.
pub fn parse(raw: &str) -> Result<Value, String> {
    let text = raw.trim();
    match text {
        "" => Err("empty literal".into()),
        "True" => Ok(Value::Bool(true)),
        "False" => Ok(Value::Bool(false)),
        _ => match text.as_bytes()[0] {
            b'\'' | b'"' => parse_string(text).map(Value::Str),
            b'0'..=b'9' | b'-' | b'+' => parse_int(text).map(Value::Int),
            _ => Err(format!("{text} is not a literal")),
        },
    }
}

fn parse_int(text: &str) -> Result<i64, String> {
    let (negative, digits) = match text.as_bytes()[0] {
        b'-' => (true, &text[1..]),
        b'+' => (false, &text[1..]),
        _ => (false, text),
    };
    let (radix, body) = match digits.get(..2) {
        Some("0x") | Some("0X") => (16, &digits[2..]),
        Some("0o") | Some("0O") => (8, &digits[2..]),
        Some("0b") | Some("0B") => (2, &digits[2..]),
        _ => (10, digits),
    };
    if body.is_empty() || body.starts_with('_') || body.ends_with('_') || body.contains("__") {
        return Err(format!("{text} is not a valid integer"));
    }
    let cleaned: String = body.chars().filter(|c| *c != '_').collect();
    let magnitude = i64::from_str_radix(&cleaned, radix)
        .map_err(|_| format!("{text} is not a valid integer"))?;
    Ok(if negative { -magnitude } else { magnitude })
}

fn parse_string(text: &str) -> Result<String, String> {
    let mut chars = text.chars();
    let quote = chars.next().ok_or_else(|| "empty literal".to_string())?;
    let mut out = String::new();

    loop {
        let Some(c) = chars.next() else {
            return Err(format!("unterminated string {text}"));
        };
        if c == quote {
            break;
        }
        if c != '\\' {
            out.push(c);
            continue;
        }
        let Some(escaped) = chars.next() else {
            return Err(format!("unterminated string {text}"));
        };
        match escaped {
            '\\' => out.push('\\'),
            '\'' => out.push('\''),
            '"' => out.push('"'),
            'n' => out.push('\n'),
            't' => out.push('\t'),
            'r' => out.push('\r'),
            '0' => out.push('\0'),
            'a' => out.push('\x07'),
            'b' => out.push('\x08'),
            'f' => out.push('\x0c'),
            'v' => out.push('\x0b'),
            'x' => out.push(hex_escape(&mut chars, 2, text)?),
            'u' => out.push(hex_escape(&mut chars, 4, text)?),
            'U' => out.push(hex_escape(&mut chars, 8, text)?),
            // Unknown escapes are kept verbatim.
            other => {
                out.push('\\');
                out.push(other);
            }
        }
    }

    if !chars.as_str().trim().is_empty() {
        return Err(format!("unexpected text after string in {text}"));
    }
    Ok(out)
}

fn hex_escape(chars: &mut std::str::Chars<'_>, len: usize, text: &str) -> Result<char, String> {
    let digits: String = chars.by_ref().take(len).collect();
    if digits.len() != len {
        return Err(format!("truncated escape in {text}"));
    }
    u32::from_str_radix(&digits, 16)
        .ok()
        .and_then(char::from_u32)
        .ok_or_else(|| format!("invalid escape \\{digits} in {text}"))
}

// =============================================================================
// Formatting
// =============================================================================

/// Quote a string so that [`parse`] reads it back unchanged.
///
/// Single quotes are preferred unless the text contains a single quote and
/// no double quote.
pub fn quote(s: &str) -> String {
    let delimiter = if s.contains('\'') && !s.contains('"') {
        '"'
    } else {
        '\''
    };
    let mut out = String::with_capacity(s.len() + 2);
    out.push(delimiter);
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            c if c == delimiter => {
                out.push('\\');
                out.push(c);
            }
            c if (c as u32) < 0x20 || c == '\x7f' => {
                out.push_str(&format!("\\x{:02x}", c as u32));
            }
            c => out.push(c),
        }
    }
    out.push(delimiter);
    out
}

// =============================================================================
// Tests
// =============================================================================
