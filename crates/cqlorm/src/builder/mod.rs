//! Single-use CQL statement builder.
//!
//! A [`StatementBuilder`] accumulates one INSERT, SELECT, UPDATE or DELETE
//! and renders it exactly once through [`text`](StatementBuilder::text) or
//! [`pair`](StatementBuilder::pair).
//!
//! ## Design
//!
//! - One implementation serves every [`Flavor`]; naming policy and parameter
//!   mode are branches at render time.
//! - Clause methods chain (`&mut self -> &mut Self`) and never fail on the
//!   spot. The first problem is recorded and returned by the terminal call,
//!   so a bad statement is never partially rendered.
//! - Clause order is fixed per operation: calling `where_cond` before `set`
//!   still renders `SET .. WHERE ..`.
//! - The text buffer comes from a shared [`BufferPool`] at construction and
//!   goes back on render or drop. Rendering twice is
//!   [`CqlError::ClosedBuilder`].

mod render;

use crate::condition::{Condition, Target};
use crate::entity::{Entity, EntityMeta};
use crate::error::{CqlError, CqlResult};
use crate::flavor::Flavor;
use crate::pool::{BufferPool, PooledBuffer};
use crate::schema::{SchemaCache, id_condition, without};
use crate::value::{PropBag, Value};
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use tracing::trace;

/// Statement kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationKind {
    Insert,
    Select,
    Update,
    Delete,
}

impl OperationKind {
    pub fn as_str(self) -> &'static str {
        match self {
            OperationKind::Insert => "INSERT",
            OperationKind::Select => "SELECT",
            OperationKind::Update => "UPDATE",
            OperationKind::Delete => "DELETE",
        }
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a statement reads or writes.
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnSpec {
    /// Logical column names.
    Columns(Vec<String>),
    /// `(column, alias)` pairs, SELECT only.
    Aliased(Vec<(String, String)>),
    /// One row of `column -> value`.
    Props(PropBag),
    /// Several rows; the first row fixes the column list.
    PropsList(Vec<PropBag>),
}

/// ORDER BY direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Asc,
    Desc,
}

impl Direction {
    pub fn as_str(self) -> &'static str {
        match self {
            Direction::Asc => "ASC",
            Direction::Desc => "DESC",
        }
    }
}

#[derive(Debug, Clone)]
enum SetItem {
    /// `col = ?`, bound later.
    Column(String),
    Assign(String, Value),
    /// Tokenized and resolved.
    Raw(String),
}

#[derive(Debug, Clone)]
enum Predicate {
    Cond(Condition),
    Raw(String),
}

#[derive(Debug, Clone)]
enum IfClause {
    Exists,
    Cond(Condition),
    Raw(String),
}

#[derive(Debug, Clone)]
enum OrderItem {
    Column(String, Option<Direction>),
    Raw(String),
}

/// Rendered statement text plus its ordered parameters.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CqlPair {
    pub text: String,
    pub parameters: Vec<Value>,
}

impl CqlPair {
    pub fn into_parts(self) -> (String, Vec<Value>) {
        (self.text, self.parameters)
    }
}

/// Builder for one statement. Create it through a
/// [`StatementFactory`](crate::StatementFactory).
#[derive(Debug)]
pub struct StatementBuilder {
    flavor: Flavor,
    schema: Arc<SchemaCache>,
    /// `None` once rendered.
    buffer: Option<PooledBuffer>,
    op: OperationKind,
    target: Option<Target>,
    /// Source of the column naming map.
    entity: Option<&'static EntityMeta>,
    columns: Option<ColumnSpec>,
    modifier: Option<String>,
    set: Vec<SetItem>,
    predicate: Option<Predicate>,
    if_clause: Option<IfClause>,
    if_not_exists: bool,
    order_by: Vec<OrderItem>,
    limit: Option<u64>,
    ttl: Option<u32>,
    timestamp: Option<i64>,
    allow_filtering: bool,
    error: Option<CqlError>,
}

const INSERT: &[OperationKind] = &[OperationKind::Insert];
const SELECT: &[OperationKind] = &[OperationKind::Select];
const UPDATE: &[OperationKind] = &[OperationKind::Update];
const FROM: &[OperationKind] = &[OperationKind::Select, OperationKind::Delete];
const WHERE: &[OperationKind] = &[
    OperationKind::Select,
    OperationKind::Update,
    OperationKind::Delete,
];
const TTL: &[OperationKind] = &[OperationKind::Insert, OperationKind::Update];
const TIMESTAMP: &[OperationKind] = &[
    OperationKind::Insert,
    OperationKind::Update,
    OperationKind::Delete,
];
const CONDITIONAL: &[OperationKind] = &[OperationKind::Update, OperationKind::Delete];

pub(crate) fn strings<I>(items: I) -> Vec<String>
where
    I: IntoIterator,
    I::Item: Into<String>,
{
    items.into_iter().map(Into::into).collect()
}

impl StatementBuilder {
    pub(crate) fn new(
        op: OperationKind,
        flavor: Flavor,
        schema: Arc<SchemaCache>,
        pool: &Arc<BufferPool>,
    ) -> Self {
        Self {
            flavor,
            schema,
            buffer: Some(pool.acquire()),
            op,
            target: None,
            entity: None,
            columns: None,
            modifier: None,
            set: Vec::new(),
            predicate: None,
            if_clause: None,
            if_not_exists: false,
            order_by: Vec::new(),
            limit: None,
            ttl: None,
            timestamp: None,
            allow_filtering: false,
            error: None,
        }
    }

    pub(crate) fn with_columns(mut self, columns: ColumnSpec) -> Self {
        self.columns = Some(columns);
        self
    }

    pub(crate) fn with_modifier(mut self, modifier: String) -> Self {
        self.modifier = Some(modifier);
        self
    }

    pub(crate) fn with_entity(mut self, meta: &'static EntityMeta) -> Self {
        self.entity = Some(meta);
        self
    }

    pub(crate) fn with_target(mut self, target: Target) -> Self {
        if let Target::Entity(meta) = &target {
            self.entity = Some(*meta);
        }
        self.target = Some(target);
        self
    }

    pub(crate) fn fail(&mut self, err: CqlError) {
        if self.error.is_none() {
            self.error = Some(err);
        }
    }

    /// Whether `clause` may be applied now. Records a usage error otherwise.
    fn accept(&mut self, clause: &str, allowed: &[OperationKind]) -> bool {
        if self.error.is_some() || self.buffer.is_none() {
            return false;
        }
        if allowed.contains(&self.op) {
            return true;
        }
        self.fail(CqlError::usage(format!("{clause} is not valid for {}", self.op)));
        false
    }

    fn set_target(&mut self, clause: &str, target: Target) {
        if self.target.is_some() {
            self.fail(CqlError::usage(format!("{clause}: target table already set")));
            return;
        }
        if let Target::Entity(meta) = &target {
            self.entity = Some(*meta);
        }
        self.target = Some(target);
    }

    pub fn flavor(&self) -> Flavor {
        self.flavor
    }

    pub fn operation(&self) -> OperationKind {
        self.op
    }

    /// Whether the terminal render already ran.
    pub fn is_closed(&self) -> bool {
        self.buffer.is_none()
    }

    // ==================== Targets ====================

    /// `INSERT INTO table`, used verbatim.
    pub fn into_table(&mut self, table: impl Into<String>) -> &mut Self {
        if self.accept("INTO", INSERT) {
            self.set_target("INTO", Target::Table(table.into()));
        }
        self
    }

    /// `INSERT INTO` the table of `T`; columns resolve through `T`.
    pub fn into_type<T: Entity>(&mut self) -> &mut Self {
        if self.accept("INTO", INSERT) {
            self.set_target("INTO", Target::Entity(T::meta()));
        }
        self
    }

    /// `FROM table`, used verbatim.
    pub fn from_table(&mut self, table: impl Into<String>) -> &mut Self {
        if self.accept("FROM", FROM) {
            self.set_target("FROM", Target::Table(table.into()));
        }
        self
    }

    /// `FROM` the table of `T`; columns resolve through `T`.
    pub fn from_type<T: Entity>(&mut self) -> &mut Self {
        if self.accept("FROM", FROM) {
            self.set_target("FROM", Target::Entity(T::meta()));
        }
        self
    }

    // ==================== SET ====================

    /// `col = ?` for each column; values are bound by the caller.
    pub fn set<I>(&mut self, columns: I) -> &mut Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        if self.accept("SET", UPDATE) {
            self.set
                .extend(columns.into_iter().map(|c| SetItem::Column(c.into())));
        }
        self
    }

    /// `col = value`.
    pub fn set_value(&mut self, column: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        if self.accept("SET", UPDATE) {
            self.set.push(SetItem::Assign(column.into(), value.into()));
        }
        self
    }

    /// `col = value` for each entry of `props`.
    pub fn set_props(&mut self, props: PropBag) -> &mut Self {
        if self.accept("SET", UPDATE) {
            self.set.extend(
                props
                    .iter()
                    .map(|(k, v)| SetItem::Assign(k.to_string(), v.clone())),
            );
        }
        self
    }

    /// Update-eligible, non-id properties of `entity` minus `excluded`.
    pub fn set_entity<E: Entity>(&mut self, entity: &E, excluded: &[&str]) -> &mut Self {
        if !self.accept("SET", UPDATE) {
            return self;
        }
        let meta = E::meta();
        if self.entity.is_none() {
            self.entity = Some(meta);
        }
        let eligible = self.schema.props(meta);
        let props = entity.to_props();
        for name in without(&eligible.update, excluded) {
            if meta.field(&name).is_some_and(|f| f.id) {
                continue;
            }
            if let Some(value) = props.get(&name) {
                self.set.push(SetItem::Assign(name, value.clone()));
            }
        }
        self
    }

    /// Raw assignment text such as `count = count + 1`. Bare identifiers
    /// are resolved through the naming policy.
    pub fn set_expr(&mut self, expr: impl Into<String>) -> &mut Self {
        if self.accept("SET", UPDATE) {
            self.set.push(SetItem::Raw(expr.into()));
        }
        self
    }

    // ==================== WHERE ====================

    fn set_predicate(&mut self, predicate: Predicate) {
        if self.predicate.is_some() {
            self.fail(CqlError::usage(
                "WHERE already set; combine conditions with Condition::and",
            ));
            return;
        }
        self.predicate = Some(predicate);
    }

    pub fn where_cond(&mut self, condition: Condition) -> &mut Self {
        if self.accept("WHERE", WHERE) {
            self.set_predicate(Predicate::Cond(condition));
        }
        self
    }

    /// Raw predicate text. Bare identifiers that are neither keywords nor
    /// function names are resolved; everything else passes through.
    pub fn where_raw(&mut self, expr: impl Into<String>) -> &mut Self {
        if self.accept("WHERE", WHERE) {
            self.set_predicate(Predicate::Raw(expr.into()));
        }
        self
    }

    /// Match the id fields of the statement's entity. `values` may cover a
    /// prefix of the key.
    pub fn where_ids<I>(&mut self, values: I) -> &mut Self
    where
        I: IntoIterator,
        I::Item: Into<Value>,
    {
        if !self.accept("WHERE", WHERE) {
            return self;
        }
        let Some(meta) = self.entity else {
            self.fail(CqlError::usage("where_ids needs an entity target"));
            return self;
        };
        match id_condition(meta, values.into_iter().map(Into::into).collect()) {
            Ok(condition) => self.set_predicate(Predicate::Cond(condition)),
            Err(err) => self.fail(err),
        }
        self
    }

    // ==================== SELECT modifiers ====================

    pub fn order_by<I>(&mut self, columns: I) -> &mut Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        if self.accept("ORDER BY", SELECT) {
            self.order_by
                .extend(columns.into_iter().map(|c| OrderItem::Column(c.into(), None)));
        }
        self
    }

    /// Every column in `columns` gets `direction`.
    pub fn order_by_dir<I>(&mut self, columns: I, direction: Direction) -> &mut Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        if self.accept("ORDER BY", SELECT) {
            self.order_by.extend(
                columns
                    .into_iter()
                    .map(|c| OrderItem::Column(c.into(), Some(direction))),
            );
        }
        self
    }

    /// Ordered `(column, direction)` pairs.
    pub fn order_by_map<I, S>(&mut self, columns: I) -> &mut Self
    where
        I: IntoIterator<Item = (S, Direction)>,
        S: Into<String>,
    {
        if self.accept("ORDER BY", SELECT) {
            self.order_by.extend(
                columns
                    .into_iter()
                    .map(|(c, d)| OrderItem::Column(c.into(), Some(d))),
            );
        }
        self
    }

    /// Raw ORDER BY text, identifiers resolved.
    pub fn order_by_raw(&mut self, expr: impl Into<String>) -> &mut Self {
        if self.accept("ORDER BY", SELECT) {
            self.order_by.push(OrderItem::Raw(expr.into()));
        }
        self
    }

    pub fn limit(&mut self, n: u64) -> &mut Self {
        if self.accept("LIMIT", SELECT) {
            self.limit = Some(n);
        }
        self
    }

    pub fn allow_filtering(&mut self) -> &mut Self {
        if self.accept("ALLOW FILTERING", SELECT) {
            self.allow_filtering = true;
        }
        self
    }

    // ==================== Write options ====================

    /// `USING TTL seconds`.
    pub fn using_ttl(&mut self, seconds: u32) -> &mut Self {
        if self.accept("USING TTL", TTL) {
            self.ttl = Some(seconds);
        }
        self
    }

    /// `USING TIMESTAMP micros`.
    pub fn using_timestamp(&mut self, micros: i64) -> &mut Self {
        if self.accept("USING TIMESTAMP", TIMESTAMP) {
            self.timestamp = Some(micros);
        }
        self
    }

    fn set_if(&mut self, clause: IfClause) {
        if self.if_clause.is_some() {
            self.fail(CqlError::usage("IF already set"));
            return;
        }
        self.if_clause = Some(clause);
    }

    /// Lightweight-transaction condition: `IF cond`.
    pub fn if_cond(&mut self, condition: Condition) -> &mut Self {
        if self.accept("IF", CONDITIONAL) {
            self.set_if(IfClause::Cond(condition));
        }
        self
    }

    /// Raw `IF` text, identifiers resolved.
    pub fn if_raw(&mut self, expr: impl Into<String>) -> &mut Self {
        if self.accept("IF", CONDITIONAL) {
            self.set_if(IfClause::Raw(expr.into()));
        }
        self
    }

    pub fn if_exists(&mut self) -> &mut Self {
        if self.accept("IF EXISTS", CONDITIONAL) {
            self.set_if(IfClause::Exists);
        }
        self
    }

    pub fn if_not_exists(&mut self) -> &mut Self {
        if self.accept("IF NOT EXISTS", INSERT) {
            self.if_not_exists = true;
        }
        self
    }

    // ==================== Terminal ====================

    /// Render the statement text and close the builder.
    pub fn text(&mut self) -> CqlResult<String> {
        self.pair().map(|pair| pair.text)
    }

    /// Render text and parameters and close the builder.
    ///
    /// The buffer returns to the pool on every exit path. Any later call
    /// fails with [`CqlError::ClosedBuilder`].
    pub fn pair(&mut self) -> CqlResult<CqlPair> {
        let Some(mut buffer) = self.buffer.take() else {
            return Err(CqlError::ClosedBuilder);
        };
        if let Some(err) = self.error.take() {
            return Err(err);
        }
        let parameters = render::render(self, &mut buffer)?;
        let text = buffer.as_str().to_owned();
        trace!(
            target: "cqlorm.builder",
            op = %self.op,
            cql = %text,
            parameters = parameters.len(),
            "statement rendered"
        );
        Ok(CqlPair { text, parameters })
    }
}

#[cfg(test)]
mod tests;
