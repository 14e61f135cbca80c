//! Error types for cqlorm

use cqlorm_parse::ParseError;
use thiserror::Error;

/// Result type alias for cqlorm operations
pub type CqlResult<T> = Result<T, CqlError>;

/// Caller errors raised while building or normalizing statements.
///
/// Every variant is a programming error: nothing here is retried, and a
/// statement that failed is never partially rendered.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CqlError {
    /// A clause was used with an operation that does not accept it.
    #[error("Usage error: {0}")]
    Usage(String),

    /// A required table or column list was never supplied.
    #[error("Missing {0}")]
    MissingSpec(String),

    /// The builder was already rendered.
    #[error("Builder is closed: a statement can only be rendered once")]
    ClosedBuilder,

    /// A clause/mode combination the renderer cannot express.
    #[error("Unsupported: {0}")]
    UnsupportedMode(String),

    /// An AND/OR junction without children.
    #[error("Empty {0} junction")]
    EmptyCondition(&'static str),

    /// Nested entity types that reference themselves.
    #[error("Cyclic entity reference: {0}")]
    CyclicReference(String),

    /// Placeholder syntax errors from the normalizer.
    #[error(transparent)]
    Parse(#[from] ParseError),
}

impl CqlError {
    /// Create a usage error
    pub fn usage(message: impl Into<String>) -> Self {
        Self::Usage(message.into())
    }

    /// Create a missing-spec error
    pub fn missing(what: impl Into<String>) -> Self {
        Self::MissingSpec(what.into())
    }

    /// Create an unsupported-mode error
    pub fn unsupported(message: impl Into<String>) -> Self {
        Self::UnsupportedMode(message.into())
    }

    /// Check if this is a usage error
    pub fn is_usage(&self) -> bool {
        matches!(self, Self::Usage(_))
    }

    /// Check if this is a missing-spec error
    pub fn is_missing_spec(&self) -> bool {
        matches!(self, Self::MissingSpec(_))
    }

    /// Check if the builder was already closed
    pub fn is_closed_builder(&self) -> bool {
        matches!(self, Self::ClosedBuilder)
    }

    /// Check if this is an unsupported-mode error
    pub fn is_unsupported(&self) -> bool {
        matches!(self, Self::UnsupportedMode(_))
    }

    /// Check if this is an empty-junction error
    pub fn is_empty_condition(&self) -> bool {
        matches!(self, Self::EmptyCondition(_))
    }

    /// Check if this is a cyclic-reference error
    pub fn is_cyclic_reference(&self) -> bool {
        matches!(self, Self::CyclicReference(_))
    }

    /// Check if this is a mixed placeholder syntax error
    pub fn is_mixed_placeholder_syntax(&self) -> bool {
        matches!(self, Self::Parse(e) if e.is_mixed_syntax())
    }

    /// Check if this is a malformed placeholder error
    pub fn is_malformed_placeholder(&self) -> bool {
        matches!(self, Self::Parse(e) if e.is_malformed())
    }
}
