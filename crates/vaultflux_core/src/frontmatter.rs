//! Frontmatter extraction and body normalization.
//!
//! Vault files may start with a delimited metadata block (`---`, flat
//! `key: value` lines, `---`). The block is intentionally not parsed as
//! full YAML: only flat pairs are recognized, with `true`/`false`
//! coercion and quote stripping. Everything else stays a string.

use std::sync::OnceLock;

use indexmap::IndexMap;
use regex::Regex;

/// A scalar metadata value from a frontmatter block.
#[derive(Debug, Clone, PartialEq)]
pub enum MetaValue {
    /// A literal `true`/`false`.
    Bool(bool),
    /// Any other scalar, with surrounding quotes stripped.
    Str(String),
}

impl MetaValue {
    /// The boolean value, if this is a boolean.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            MetaValue::Bool(b) => Some(*b),
            MetaValue::Str(_) => None,
        }
    }

    /// The string value, if this is a string.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            MetaValue::Bool(_) => None,
            MetaValue::Str(s) => Some(s),
        }
    }
}

/// Ordered frontmatter metadata mapping.
pub type Metadata = IndexMap<String, MetaValue>;

/// Result of parsing a vault file's raw text.
#[derive(Debug, Clone, Default)]
pub struct Parsed {
    /// Flat metadata from the leading block, empty if absent/malformed.
    pub metadata: Metadata,
    /// Body text with the frontmatter block removed and pseudo-headings
    /// escaped.
    pub body: String,
}

/// Heading escape is skipped for texts at or below this length so
/// near-empty files pass through untouched.
const ESCAPE_THRESHOLD: usize = 6;

/// Parse frontmatter and body from raw vault file text.
///
/// A missing or malformed leading block is not an error: the metadata
/// comes back empty and the text is kept as the body.
pub fn parse(text: &str) -> Parsed {
    let (metadata, body) = match split_frontmatter(text) {
        Some((block, rest)) => (parse_block(block), rest),
        None => (Metadata::new(), text),
    };

    let body = if text.len() > ESCAPE_THRESHOLD {
        escape_pseudo_headings(body)
    } else {
        body.to_string()
    };

    Parsed { metadata, body }
}

/// Split a leading delimited block from the text. Returns the block body
/// and the remainder (with trailing delimiter newlines consumed), or
/// `None` when no well-formed block starts the text.
fn split_frontmatter(text: &str) -> Option<(&str, &str)> {
    let rest = if let Some(rest) = text.strip_prefix("---\n") {
        rest
    } else {
        text.strip_prefix("---\r\n")?
    };

    let (idx, delim_len) = match (rest.find("\n---\n"), rest.find("\n---\r\n")) {
        (Some(lf), Some(crlf)) if crlf < lf => (crlf, 6),
        (Some(lf), _) => (lf, 5),
        (None, Some(crlf)) => (crlf, 6),
        (None, None) => return None,
    };

    let block = &rest[..idx];
    let mut body = &rest[idx + delim_len..];
    // The closing delimiter swallows any immediately following blank lines.
    while let Some(stripped) = body.strip_prefix("\r\n").or_else(|| body.strip_prefix('\n')) {
        body = stripped;
    }
    Some((block, body))
}

/// Parse a block body as flat `key: value` lines. Lines without a colon
/// are skipped, not errors.
fn parse_block(block: &str) -> Metadata {
    let mut metadata = Metadata::new();
    for line in block.lines() {
        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        let key = key.trim().to_string();
        if key.is_empty() {
            continue;
        }
        metadata.insert(key, coerce_scalar(value.trim()));
    }
    metadata
}

/// Coerce a raw scalar: quoted values are unquoted strings, bare
/// `true`/`false` become booleans, everything else stays a string.
fn coerce_scalar(raw: &str) -> MetaValue {
    if raw.len() >= 2 {
        let bytes = raw.as_bytes();
        let (first, last) = (bytes[0], bytes[bytes.len() - 1]);
        if (first == b'"' && last == b'"') || (first == b'\'' && last == b'\'') {
            return MetaValue::Str(raw[1..raw.len() - 1].to_string());
        }
    }
    match raw {
        "true" => MetaValue::Bool(true),
        "false" => MetaValue::Bool(false),
        other => MetaValue::Str(other.to_string()),
    }
}

/// Escape lines that begin with `#` glued to an identifier (`#tag`).
/// These are vault tags, not headings, and would render as headings
/// downstream; a protective leading space defuses them.
fn escape_pseudo_headings(body: &str) -> String {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    let pattern = PATTERN
        .get_or_init(|| Regex::new(r"(?m)^#[0-9A-Za-z]+\b").expect("valid pseudo-heading regex"));
    pattern.replace_all(body, " $0").into_owned()
}
