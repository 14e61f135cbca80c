//! Error types for cqlorm-parse

use thiserror::Error;

/// Result type for cqlorm-parse operations.
pub type ParseResult<T> = Result<T, ParseError>;

/// Error type for placeholder parsing and binding.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// More than one placeholder dialect (`?`, `:name`, `#{name}`) in one statement.
    #[error("Mixed placeholder syntax: found {first} and {second} in the same statement")]
    MixedPlaceholderSyntax {
        first: &'static str,
        second: &'static str,
    },
    /// A `#{` group that is never closed, or closed without a name.
    #[error("Malformed placeholder at byte {offset}: {message}")]
    MalformedPlaceholder { offset: usize, message: String },
    /// No value supplied for a named parameter.
    #[error("Missing value for parameter '{0}'")]
    MissingParameter(String),
}

impl ParseError {
    pub(crate) fn malformed(offset: usize, message: impl Into<String>) -> Self {
        ParseError::MalformedPlaceholder {
            offset,
            message: message.into(),
        }
    }

    /// Check if this is a mixed placeholder syntax error.
    pub fn is_mixed_syntax(&self) -> bool {
        matches!(self, Self::MixedPlaceholderSyntax { .. })
    }

    /// Check if this is a malformed placeholder error.
    pub fn is_malformed(&self) -> bool {
        matches!(self, Self::MalformedPlaceholder { .. })
    }
}
