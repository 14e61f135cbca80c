//! # cqlorm
//!
//! A CQL statement builder for column-family stores.
//!
//! ## Features
//!
//! - **One builder, nine flavors**: every naming policy × parameter mode pair
//!   is a runtime [`Flavor`] of the same [`StatementBuilder`]
//! - **Naming resolver**: logical field names map to physical columns through
//!   a [`NamingPolicy`], memoized per type in a [`SchemaCache`]
//! - **Condition trees**: comparisons, BETWEEN, IN, NOT, AND/OR junctions,
//!   subqueries and raw fragments
//! - **Single-use builders**: rendering closes the builder and returns its
//!   buffer to a shared [`BufferPool`]
//! - **Placeholder normalization**: `?`, `:name` and `#{name}` text is
//!   normalized and cached by [`cqlorm_parse`]
//!
//! ## Example
//!
//! ```
//! use cqlorm::{Condition, NamingPolicy, ParameterMode, StatementFactory};
//!
//! let cql = StatementFactory::new(NamingPolicy::LowerUnderscore, ParameterMode::Named);
//!
//! let insert = cql.insert(["firstName", "lastName"]).into_table("account").text()?;
//! assert_eq!(
//!     insert,
//!     "INSERT INTO account (first_name, last_name) VALUES (:firstName,:lastName)"
//! );
//!
//! let select = cql
//!     .select(["*"])
//!     .from_table("account")
//!     .where_cond(Condition::between("age", 18, 65))
//!     .pair()?;
//! assert_eq!(select.text, "SELECT * FROM account WHERE age BETWEEN :minAge AND :maxAge");
//! assert_eq!(select.parameters.len(), 2);
//! # Ok::<(), cqlorm::CqlError>(())
//! ```

// Lets `#[derive(Entity)]` expand to `::cqlorm::..` paths inside this crate's tests.
extern crate self as cqlorm;

pub mod builder;
pub mod condition;
pub mod entity;
pub mod error;
pub mod factory;
pub mod flavor;
pub mod naming;
pub mod pool;
pub mod prelude;
pub mod schema;
pub mod value;

pub use builder::{ColumnSpec, CqlPair, Direction, OperationKind, StatementBuilder};
pub use condition::{Condition, JunctionOp, Op, SubQuery, SubSelect, Target};
pub use entity::{Entity, EntityMeta, FieldMeta};
pub use error::{CqlError, CqlResult};
pub use factory::{FactoryConfig, StatementFactory};
pub use flavor::{Flavor, ParameterMode};
pub use naming::NamingPolicy;
pub use pool::{BufferPool, PoolConfig};
pub use schema::{ColumnMap, EligibleProps, SchemaCache, TableNames, id_condition};
pub use value::{PropBag, Value};

// Placeholder normalizer and parse cache
pub use cqlorm_parse::{
    self as parse, ParseCache, ParseCacheConfig, ParseCacheStats, ParseError, ParsedQuery,
};

#[cfg(feature = "derive")]
pub use cqlorm_derive::Entity;
