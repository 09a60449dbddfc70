//! Turtle literal escaping and formatting.

use std::fmt;

use crate::models::XSD_STRING;

use super::turtle::format_iri_ref;

/// Escapes applied in order. Backslash goes first so that backslashes
/// introduced by later substitutions are not escaped again.
const ESCAPES: [(&str, &str); 5] = [
    ("\\", "\\\\"),
    ("\"", "\\\""),
    ("\n", "\\n"),
    ("\r", "\\r"),
    ("\t", "\\t"),
];

/// Escape `value` for use inside a double-quoted Turtle string.
pub fn escape_literal(value: &str) -> String {
    ESCAPES
        .iter()
        .fold(value.to_string(), |acc, (from, to)| acc.replace(*from, to))
}

/// Inverse of [`escape_literal`].
pub fn unescape_literal(escaped: &str) -> String {
    let mut out = String::with_capacity(escaped.len());
    let mut chars = escaped.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('t') => out.push('\t'),
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}

/// A typed literal object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Literal {
    pub value: String,
    pub datatype: String,
}

impl Literal {
    pub fn new(value: &str, datatype: &str) -> Self {
        Self {
            value: value.to_string(),
            datatype: datatype.trim().to_string(),
        }
    }

    /// Plain strings carry no `^^` suffix.
    pub fn is_plain(&self) -> bool {
        self.datatype.is_empty()
            || self.datatype == XSD_STRING
            || self.datatype == "http://www.w3.org/2001/XMLSchema#string"
            || self.datatype == "<http://www.w3.org/2001/XMLSchema#string>"
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "\"{}\"", escape_literal(&self.value))?;
        if !self.is_plain() {
            write!(f, "^^{}", format_iri_ref(&self.datatype))?;
        }
        Ok(())
    }
}
