//! cqlorm-parse
//!
//! Placeholder normalization for externally supplied CQL text.
//!
//! Query text may mix up to three placeholder dialects across a code base
//! (`?`, `:name`, `#{name}`). [`ParsedQuery`] rewrites one statement into the
//! canonical `?` form and records the position -> name mapping, and
//! [`ParseCache`] memoizes the result per exact source text.
//!
//! # Example
//!
//! ```
//! use cqlorm_parse::ParsedQuery;
//!
//! let q = ParsedQuery::parse("SELECT * FROM account WHERE id = #{id} AND age > #{age}")?;
//! assert_eq!(q.canonical(), "SELECT * FROM account WHERE id = ? AND age > ?");
//! assert_eq!(q.ordered_names(), vec!["id", "age"]);
//! # Ok::<(), cqlorm_parse::ParseError>(())
//! ```

pub mod error;
pub mod parse_cache;
pub mod parsed;
pub mod tokenizer;

pub use error::{ParseError, ParseResult};
pub use parse_cache::{ParseCache, ParseCacheConfig, ParseCacheStats, default_cache, parse};
pub use parsed::{CANONICAL_PLACEHOLDER, ParsedQuery};
pub use tokenizer::{Token, TokenKind, is_dml, is_function_name, leading_keyword, tokenize};
