//! Identifier naming policies.
//!
//! Logical names are the lowerCamelCase field names of an entity
//! (`firstName`). A [`NamingPolicy`] maps them to physical column names.
//! Dotted paths (`acc.firstName`) are converted segment by segment; `*` and
//! anything that is not a plain identifier (quoted names, expressions) pass
//! through untouched.

use heck::{ToLowerCamelCase, ToShoutySnakeCase, ToSnakeCase};
use serde::{Deserialize, Serialize};

/// Case-conversion rule for physical identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NamingPolicy {
    /// `first_name`
    #[default]
    LowerUnderscore,
    /// `FIRST_NAME`
    UpperUnderscore,
    /// `firstName`, the logical form itself.
    LowerCamel,
}

impl NamingPolicy {
    pub const ALL: [NamingPolicy; 3] = [
        NamingPolicy::LowerUnderscore,
        NamingPolicy::UpperUnderscore,
        NamingPolicy::LowerCamel,
    ];

    /// Convert a logical name (possibly dotted) to its physical form.
    pub fn convert(self, name: &str) -> String {
        if !name.contains('.') {
            return self.convert_segment(name);
        }
        let mut out = String::with_capacity(name.len() + 4);
        for (i, segment) in name.split('.').enumerate() {
            if i > 0 {
                out.push('.');
            }
            out.push_str(&self.convert_segment(segment));
        }
        out
    }

    fn convert_segment(self, segment: &str) -> String {
        if !is_plain_identifier(segment) {
            return segment.to_string();
        }
        match self {
            NamingPolicy::LowerUnderscore => segment.to_snake_case(),
            NamingPolicy::UpperUnderscore => segment.to_shouty_snake_case(),
            NamingPolicy::LowerCamel => segment.to_lower_camel_case(),
        }
    }

    /// Whether physical names are the logical names (no aliasing needed).
    pub fn is_logical(self) -> bool {
        self == NamingPolicy::LowerCamel
    }
}

/// `[A-Za-z_][A-Za-z0-9_]*`
pub fn is_plain_identifier(s: &str) -> bool {
    let mut bytes = s.bytes();
    match bytes.next() {
        Some(b) if b == b'_' || b.is_ascii_alphabetic() => {}
        _ => return false,
    }
    bytes.all(|b| b == b'_' || b.is_ascii_alphanumeric())
}

const KEYWORDS: &[&str] = &[
    "ADD", "ALLOW", "AND", "APPLY", "AS", "ASC", "BATCH", "BEGIN", "BETWEEN", "BY", "CONTAINS",
    "DELETE", "DESC", "DISTINCT", "EXISTS", "FALSE", "FILTERING", "FROM", "IF", "IN", "INSERT",
    "INTO", "IS", "JSON", "KEY", "LIKE", "LIMIT", "NOT", "NULL", "OR", "ORDER", "PARTITION",
    "PER", "SELECT", "SET", "TIMESTAMP", "TRUE", "TTL", "UPDATE", "USING", "VALUES", "WHERE",
];

/// Reserved words that the raw-expression path must never case-convert.
pub fn is_keyword(word: &str) -> bool {
    KEYWORDS.iter().any(|kw| kw.eq_ignore_ascii_case(word))
}
