//! CQL tokenizer shared by the placeholder normalizer and the statement builder.
//!
//! The tokenizer is lossless: concatenating the `text` of every token yields the
//! input again. It only distinguishes what the callers need:
//!
//! - whitespace and comments (`--`, `//`, `/* */`) are trivia
//! - quoted strings (`'...'`) and quoted identifiers (`"..."`) are opaque
//! - `?`, `:name` and `#{name}` are placeholders
//! - bare words (`[A-Za-z_][A-Za-z0-9_$]*`, dotted) are identifier/keyword candidates
//!
//! Everything else is punctuation.

use crate::error::{ParseError, ParseResult};

/// Token classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Whitespace,
    Comment,
    /// Identifier or keyword, possibly dotted (`acc.firstName`).
    Word,
    Number,
    /// Single-quoted string literal.
    StringLiteral,
    /// Double-quoted identifier.
    QuotedIdent,
    /// `?`
    Positional,
    /// `:name`
    ColonNamed,
    /// `#{name}`
    BraceNamed,
    Punct,
}

/// A slice of the input with its classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'a> {
    pub kind: TokenKind,
    pub text: &'a str,
}

impl<'a> Token<'a> {
    /// Whitespace or comment.
    pub fn is_trivia(&self) -> bool {
        matches!(self.kind, TokenKind::Whitespace | TokenKind::Comment)
    }

    /// Any of the three placeholder dialects.
    pub fn is_placeholder(&self) -> bool {
        matches!(
            self.kind,
            TokenKind::Positional | TokenKind::ColonNamed | TokenKind::BraceNamed
        )
    }

    /// The parameter name of a `:name` or `#{name}` token.
    pub fn placeholder_name(&self) -> Option<&'a str> {
        match self.kind {
            TokenKind::ColonNamed => Some(&self.text[1..]),
            TokenKind::BraceNamed => Some(self.text[2..self.text.len() - 1].trim()),
            _ => None,
        }
    }

    fn is_punct(&self, s: &str) -> bool {
        self.kind == TokenKind::Punct && self.text == s
    }
}

const TWO_CHAR_OPS: [&str; 5] = ["<=", ">=", "!=", "<>", "||"];

#[inline]
fn is_ident_start(b: u8) -> bool {
    b == b'_' || b.is_ascii_alphabetic()
}

#[inline]
fn is_ident_char(b: u8) -> bool {
    b == b'_' || b == b'$' || b.is_ascii_alphanumeric()
}

/// Split `input` into tokens.
///
/// The only failure is an unterminated or empty `#{` group. Unterminated
/// strings and block comments run to the end of the input.
pub fn tokenize(input: &str) -> ParseResult<Vec<Token<'_>>> {
    let bytes = input.as_bytes();
    let len = bytes.len();
    let mut tokens = Vec::new();
    let mut pos = 0;

    while pos < len {
        let start = pos;
        let b = bytes[pos];
        let next = bytes.get(pos + 1).copied();

        let kind = if b.is_ascii_whitespace() {
            while pos < len && bytes[pos].is_ascii_whitespace() {
                pos += 1;
            }
            TokenKind::Whitespace
        } else if (b == b'-' && next == Some(b'-')) || (b == b'/' && next == Some(b'/')) {
            pos = input[pos..].find('\n').map_or(len, |i| pos + i);
            TokenKind::Comment
        } else if b == b'/' && next == Some(b'*') {
            pos = input[pos + 2..].find("*/").map_or(len, |i| pos + 2 + i + 2);
            TokenKind::Comment
        } else if b == b'\'' || b == b'"' {
            pos = scan_quoted(bytes, pos, b);
            if b == b'\'' {
                TokenKind::StringLiteral
            } else {
                TokenKind::QuotedIdent
            }
        } else if b == b'?' {
            pos += 1;
            TokenKind::Positional
        } else if b == b':' && next.is_some_and(is_ident_start) {
            pos += 1;
            while pos < len && (bytes[pos] == b'_' || bytes[pos].is_ascii_alphanumeric()) {
                pos += 1;
            }
            TokenKind::ColonNamed
        } else if b == b'#' && next == Some(b'{') {
            let Some(close) = input[pos + 2..].find('}') else {
                return Err(ParseError::malformed(start, "unterminated `#{` group"));
            };
            let close = pos + 2 + close;
            if input[pos + 2..close].trim().is_empty() {
                return Err(ParseError::malformed(start, "empty `#{}` group"));
            }
            pos = close + 1;
            TokenKind::BraceNamed
        } else if is_ident_start(b) {
            pos = scan_word(bytes, pos);
            TokenKind::Word
        } else if b.is_ascii_digit() {
            while pos < len && (bytes[pos].is_ascii_alphanumeric() || bytes[pos] == b'.') {
                pos += 1;
            }
            TokenKind::Number
        } else {
            let rest = &input[pos..];
            pos += match TWO_CHAR_OPS.iter().find(|op| rest.starts_with(*op)) {
                Some(op) => op.len(),
                None => rest.chars().next().map_or(1, char::len_utf8),
            };
            TokenKind::Punct
        };

        tokens.push(Token {
            kind,
            text: &input[start..pos],
        });
    }

    Ok(tokens)
}

fn scan_quoted(bytes: &[u8], start: usize, quote: u8) -> usize {
    let mut pos = start + 1;
    while pos < bytes.len() {
        if bytes[pos] == quote {
            // Doubled quote is an escaped quote.
            if bytes.get(pos + 1) == Some(&quote) {
                pos += 2;
                continue;
            }
            return pos + 1;
        }
        pos += 1;
    }
    bytes.len()
}

fn scan_word(bytes: &[u8], start: usize) -> usize {
    let mut pos = start;
    while pos < bytes.len() {
        let b = bytes[pos];
        if is_ident_char(b) {
            pos += 1;
        } else if b == b'.' && bytes.get(pos + 1).copied().is_some_and(is_ident_start) {
            pos += 1;
        } else {
            break;
        }
    }
    pos
}

/// Whether the word at `index` is immediately (modulo whitespace) followed by `(`.
pub fn is_function_name(tokens: &[Token<'_>], index: usize) -> bool {
    if tokens.get(index).map(|t| t.kind) != Some(TokenKind::Word) {
        return false;
    }
    tokens[index + 1..]
        .iter()
        .find(|t| t.kind != TokenKind::Whitespace)
        .is_some_and(|t| t.is_punct("("))
}

/// Strip leading whitespace, comments, and parentheses to find the first
/// meaningful keyword.
fn strip_prefix(sql: &str) -> &str {
    let mut s = sql;
    loop {
        let before = s;
        s = s.trim_start();
        if s.starts_with("--") || s.starts_with("//") {
            match s.find('\n') {
                Some(pos) => {
                    s = &s[pos + 1..];
                    continue;
                }
                None => return "",
            }
        }
        if s.starts_with("/*") {
            match s.find("*/") {
                Some(pos) => {
                    s = &s[pos + 2..];
                    continue;
                }
                None => return "",
            }
        }
        if let Some(rest) = s.strip_prefix('(') {
            s = rest;
            continue;
        }
        if s == before {
            break;
        }
    }
    s
}

/// The first keyword of a statement, skipping trivia and opening parentheses.
pub fn leading_keyword(sql: &str) -> Option<&str> {
    let s = strip_prefix(sql);
    let end = s
        .bytes()
        .position(|b| !b.is_ascii_alphabetic())
        .unwrap_or(s.len());
    if end == 0 { None } else { Some(&s[..end]) }
}

const DML_VERBS: [&str; 6] = ["SELECT", "INSERT", "UPDATE", "DELETE", "MERGE", "BEGIN"];

/// Whether the statement starts with a data-manipulation verb.
///
/// `BEGIN` covers `BEGIN [UNLOGGED | COUNTER] BATCH` blocks.
pub fn is_dml(sql: &str) -> bool {
    leading_keyword(sql)
        .is_some_and(|kw| DML_VERBS.iter().any(|verb| verb.eq_ignore_ascii_case(kw)))
}
