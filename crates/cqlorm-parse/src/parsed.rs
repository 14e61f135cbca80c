//! Placeholder normalization.
//!
//! Query text may use one of three placeholder dialects:
//!
//! - positional `?`
//! - colon-named `:name`
//! - brace-named `#{name}`
//!
//! [`ParsedQuery::parse`] rewrites every placeholder into the canonical `?` and
//! records which position carries which name. Text that does not start with a
//! DML verb is passed through untouched.

use crate::error::{ParseError, ParseResult};
use crate::tokenizer::{TokenKind, is_dml, tokenize};
use serde::Serialize;
use std::collections::BTreeMap;

/// The canonical placeholder emitted by the normalizer.
pub const CANONICAL_PLACEHOLDER: &str = "?";

/// Immutable result of normalizing one query text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParsedQuery {
    source: String,
    canonical: String,
    /// Zero-based placeholder position -> parameter name. Empty for positional text.
    names: BTreeMap<usize, String>,
    parameter_count: usize,
    attrs: BTreeMap<String, String>,
}

impl ParsedQuery {
    /// Normalize `source` without consulting any cache.
    pub fn parse(source: &str) -> ParseResult<Self> {
        if !is_dml(source) {
            return Ok(Self::passthrough(source));
        }

        let tokens = tokenize(source)?;
        let mut canonical = String::with_capacity(source.len());
        let mut names = BTreeMap::new();
        let mut count = 0usize;
        let mut dialect: Option<&'static str> = None;

        for token in &tokens {
            let this = match token.kind {
                TokenKind::Positional => "'?'",
                TokenKind::ColonNamed => "':name'",
                TokenKind::BraceNamed => "'#{name}'",
                _ => {
                    canonical.push_str(token.text);
                    continue;
                }
            };

            match dialect {
                None => dialect = Some(this),
                Some(first) if first != this => {
                    return Err(ParseError::MixedPlaceholderSyntax {
                        first,
                        second: this,
                    });
                }
                Some(_) => {}
            }

            if let Some(name) = token.placeholder_name() {
                names.insert(count, name.to_string());
            }
            canonical.push_str(CANONICAL_PLACEHOLDER);
            count += 1;
        }

        Ok(Self {
            source: source.to_string(),
            canonical,
            names,
            parameter_count: count,
            attrs: BTreeMap::new(),
        })
    }

    fn passthrough(source: &str) -> Self {
        Self {
            source: source.to_string(),
            canonical: source.to_string(),
            names: BTreeMap::new(),
            parameter_count: 0,
            attrs: BTreeMap::new(),
        }
    }

    /// The text as supplied.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// The text with every placeholder rewritten to `?`.
    pub fn canonical(&self) -> &str {
        &self.canonical
    }

    /// Number of placeholders (and therefore parameter slots).
    pub fn parameter_count(&self) -> usize {
        self.parameter_count
    }

    /// Position -> name map. Empty when the text is purely positional.
    pub fn names(&self) -> &BTreeMap<usize, String> {
        &self.names
    }

    /// Parameter names in slot order (empty for positional text).
    pub fn ordered_names(&self) -> Vec<&str> {
        self.names.values().map(String::as_str).collect()
    }

    /// Whether the placeholders carry names.
    pub fn is_named(&self) -> bool {
        !self.names.is_empty()
    }

    /// Opaque attributes supplied by the host (e.g. fetch size of a named query).
    pub fn attrs(&self) -> &BTreeMap<String, String> {
        &self.attrs
    }

    /// Return a copy carrying `attrs`.
    pub fn with_attrs<K, V>(&self, attrs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        let mut copy = self.clone();
        copy.attrs = attrs
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        copy
    }

    /// Arrange named values into slot order.
    ///
    /// A name used twice is looked up twice and bound to both slots.
    pub fn bind_named<V>(&self, mut lookup: impl FnMut(&str) -> Option<V>) -> ParseResult<Vec<V>> {
        let mut out = Vec::with_capacity(self.parameter_count);
        for slot in 0..self.parameter_count {
            let name = self
                .names
                .get(&slot)
                .ok_or_else(|| ParseError::MissingParameter(format!("#{}", slot + 1)))?;
            let value = lookup(name).ok_or_else(|| ParseError::MissingParameter(name.clone()))?;
            out.push(value);
        }
        Ok(out)
    }
}
