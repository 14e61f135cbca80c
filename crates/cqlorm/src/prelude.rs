//! Convenient imports for typical `cqlorm` usage.
//!
//! ```ignore
//! use cqlorm::prelude::*;
//! ```

pub use crate::{
    Condition, CqlError, CqlPair, CqlResult, Direction, Entity, NamingPolicy, Op, ParameterMode,
    PropBag, StatementFactory, SubQuery, Value,
};
