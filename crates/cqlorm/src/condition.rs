//! Condition trees for WHERE and IF clauses.
//!
//! Column names in a [`Condition`] are logical names; the builder resolves
//! them through the active naming policy when rendering. [`Condition::raw`]
//! is the escape hatch and is emitted verbatim.

use crate::entity::{Entity, EntityMeta};
use crate::flavor::Flavor;
use crate::value::Value;

/// Comparison operator with its operand(s).
///
/// # Example
/// ```ignore
/// use cqlorm::{Condition, Op};
///
/// Condition::new("age", Op::gt(21));
/// Condition::new("id", Op::in_list([1, 2, 3]));
/// Condition::new("age", Op::between(18, 65));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum Op {
    /// `col = v`
    Eq(Value),
    /// `col != v`
    Ne(Value),
    /// `col > v`
    Gt(Value),
    /// `col >= v`
    Ge(Value),
    /// `col < v`
    Lt(Value),
    /// `col <= v`
    Le(Value),
    /// `col LIKE v` (SASI / SAI indexes)
    Like(Value),
    /// `col CONTAINS v`
    Contains(Value),
    /// `col CONTAINS KEY v`
    ContainsKey(Value),
    /// `col IN (a,b)`
    In(Vec<Value>),
    /// `col NOT IN (a,b)`
    NotIn(Vec<Value>),
    /// `col BETWEEN a AND b`
    Between(Value, Value),
    /// `col NOT BETWEEN a AND b`
    NotBetween(Value, Value),
}

impl Op {
    pub fn eq(v: impl Into<Value>) -> Self {
        Op::Eq(v.into())
    }

    pub fn ne(v: impl Into<Value>) -> Self {
        Op::Ne(v.into())
    }

    pub fn gt(v: impl Into<Value>) -> Self {
        Op::Gt(v.into())
    }

    pub fn ge(v: impl Into<Value>) -> Self {
        Op::Ge(v.into())
    }

    pub fn lt(v: impl Into<Value>) -> Self {
        Op::Lt(v.into())
    }

    pub fn le(v: impl Into<Value>) -> Self {
        Op::Le(v.into())
    }

    pub fn like(v: impl Into<Value>) -> Self {
        Op::Like(v.into())
    }

    pub fn contains(v: impl Into<Value>) -> Self {
        Op::Contains(v.into())
    }

    pub fn contains_key(v: impl Into<Value>) -> Self {
        Op::ContainsKey(v.into())
    }

    pub fn in_list<V: Into<Value>>(vs: impl IntoIterator<Item = V>) -> Self {
        Op::In(vs.into_iter().map(Into::into).collect())
    }

    pub fn not_in<V: Into<Value>>(vs: impl IntoIterator<Item = V>) -> Self {
        Op::NotIn(vs.into_iter().map(Into::into).collect())
    }

    pub fn between(low: impl Into<Value>, high: impl Into<Value>) -> Self {
        Op::Between(low.into(), high.into())
    }

    pub fn not_between(low: impl Into<Value>, high: impl Into<Value>) -> Self {
        Op::NotBetween(low.into(), high.into())
    }
}

/// AND / OR combinator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JunctionOp {
    And,
    Or,
}

impl JunctionOp {
    pub fn as_str(self) -> &'static str {
        match self {
            JunctionOp::And => "AND",
            JunctionOp::Or => "OR",
        }
    }
}

/// Target of a statement or subquery: a literal table name or an entity type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    /// Used verbatim.
    Table(String),
    /// Resolved through the schema cache; also drives column naming.
    Entity(&'static EntityMeta),
}

/// A nested SELECT inside a condition.
#[derive(Debug, Clone, PartialEq)]
pub enum SubQuery {
    /// Pre-built text, emitted verbatim.
    Text(String),
    /// Rendered with the enclosing statement; the flavors must match.
    Select(Box<SubSelect>),
}

impl SubQuery {
    pub fn text(cql: impl Into<String>) -> Self {
        SubQuery::Text(cql.into())
    }
}

/// Structured subquery, created by [`StatementFactory::subquery`](crate::StatementFactory::subquery).
#[derive(Debug, Clone, PartialEq)]
pub struct SubSelect {
    pub(crate) flavor: Flavor,
    pub(crate) columns: Vec<String>,
    pub(crate) target: Option<Target>,
    pub(crate) condition: Option<Condition>,
}

impl SubSelect {
    pub(crate) fn new(flavor: Flavor, columns: Vec<String>) -> Self {
        Self {
            flavor,
            columns,
            target: None,
            condition: None,
        }
    }

    pub fn from_table(mut self, table: impl Into<String>) -> Self {
        self.target = Some(Target::Table(table.into()));
        self
    }

    pub fn from_type<T: Entity>(mut self) -> Self {
        self.target = Some(Target::Entity(T::meta()));
        self
    }

    pub fn where_cond(mut self, condition: Condition) -> Self {
        self.condition = Some(condition);
        self
    }

    pub fn flavor(&self) -> Flavor {
        self.flavor
    }

    pub fn build(self) -> SubQuery {
        SubQuery::Select(Box::new(self))
    }
}

impl From<SubSelect> for SubQuery {
    fn from(select: SubSelect) -> Self {
        select.build()
    }
}

/// A node of a condition tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    /// `col op value`
    Comparison {
        column: String,
        op: &'static str,
        value: Value,
    },
    /// `col op low AND high`
    Between {
        column: String,
        op: &'static str,
        low: Value,
        high: Value,
    },
    /// `col op (v1,v2)`
    In {
        column: String,
        op: &'static str,
        values: Vec<Value>,
    },
    /// `NOT (inner)`
    Not(Box<Condition>),
    /// One child renders bare; several render as `(a) AND (b)` with no outer
    /// parentheses.
    Junction {
        op: JunctionOp,
        children: Vec<Condition>,
    },
    /// `col op (subquery)`
    Subquery {
        column: String,
        op: &'static str,
        query: SubQuery,
    },
    /// Emitted verbatim, without identifier resolution.
    Raw(String),
}

impl Condition {
    /// Create a structured condition from a logical column and an operator.
    pub fn new(column: impl Into<String>, op: Op) -> Self {
        let column = column.into();
        let (op, value) = match op {
            Op::Eq(v) => ("=", v),
            Op::Ne(v) => ("!=", v),
            Op::Gt(v) => (">", v),
            Op::Ge(v) => (">=", v),
            Op::Lt(v) => ("<", v),
            Op::Le(v) => ("<=", v),
            Op::Like(v) => ("LIKE", v),
            Op::Contains(v) => ("CONTAINS", v),
            Op::ContainsKey(v) => ("CONTAINS KEY", v),
            Op::In(values) => {
                return Condition::In {
                    column,
                    op: "IN",
                    values,
                };
            }
            Op::NotIn(values) => {
                return Condition::In {
                    column,
                    op: "NOT IN",
                    values,
                };
            }
            Op::Between(low, high) => {
                return Condition::Between {
                    column,
                    op: "BETWEEN",
                    low,
                    high,
                };
            }
            Op::NotBetween(low, high) => {
                return Condition::Between {
                    column,
                    op: "NOT BETWEEN",
                    low,
                    high,
                };
            }
        };
        Condition::Comparison { column, op, value }
    }

    pub fn eq(column: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::new(column, Op::eq(value))
    }

    pub fn ne(column: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::new(column, Op::ne(value))
    }

    pub fn gt(column: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::new(column, Op::gt(value))
    }

    pub fn ge(column: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::new(column, Op::ge(value))
    }

    pub fn lt(column: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::new(column, Op::lt(value))
    }

    pub fn le(column: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::new(column, Op::le(value))
    }

    pub fn like(column: impl Into<String>, pattern: impl Into<Value>) -> Self {
        Self::new(column, Op::like(pattern))
    }

    pub fn contains(column: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::new(column, Op::contains(value))
    }

    pub fn contains_key(column: impl Into<String>, key: impl Into<Value>) -> Self {
        Self::new(column, Op::contains_key(key))
    }

    pub fn in_list<V: Into<Value>>(column: impl Into<String>, values: impl IntoIterator<Item = V>) -> Self {
        Self::new(column, Op::in_list(values))
    }

    pub fn not_in<V: Into<Value>>(column: impl Into<String>, values: impl IntoIterator<Item = V>) -> Self {
        Self::new(column, Op::not_in(values))
    }

    pub fn between(column: impl Into<String>, low: impl Into<Value>, high: impl Into<Value>) -> Self {
        Self::new(column, Op::between(low, high))
    }

    pub fn not_between(column: impl Into<String>, low: impl Into<Value>, high: impl Into<Value>) -> Self {
        Self::new(column, Op::not_between(low, high))
    }

    /// Comparison with an arbitrary operator token.
    pub fn cmp(column: impl Into<String>, op: &'static str, value: impl Into<Value>) -> Self {
        Condition::Comparison {
            column: column.into(),
            op,
            value: value.into(),
        }
    }

    pub fn not(inner: Condition) -> Self {
        Condition::Not(Box::new(inner))
    }

    pub fn and(children: impl IntoIterator<Item = Condition>) -> Self {
        Condition::Junction {
            op: JunctionOp::And,
            children: children.into_iter().collect(),
        }
    }

    pub fn or(children: impl IntoIterator<Item = Condition>) -> Self {
        Condition::Junction {
            op: JunctionOp::Or,
            children: children.into_iter().collect(),
        }
    }

    pub fn in_subquery(column: impl Into<String>, query: impl Into<SubQuery>) -> Self {
        Condition::Subquery {
            column: column.into(),
            op: "IN",
            query: query.into(),
        }
    }

    pub fn not_in_subquery(column: impl Into<String>, query: impl Into<SubQuery>) -> Self {
        Condition::Subquery {
            column: column.into(),
            op: "NOT IN",
            query: query.into(),
        }
    }

    /// Create a raw condition. Never embed unchecked user input here.
    pub fn raw(cql: impl Into<String>) -> Self {
        Condition::Raw(cql.into())
    }

    /// Combine with another condition under AND, flattening an existing AND.
    pub fn and_also(self, other: Condition) -> Self {
        match self {
            Condition::Junction {
                op: JunctionOp::And,
                mut children,
            } => {
                children.push(other);
                Condition::Junction {
                    op: JunctionOp::And,
                    children,
                }
            }
            first => Condition::and([first, other]),
        }
    }
}
