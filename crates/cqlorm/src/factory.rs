//! Long-lived entry point that creates statement builders.

use crate::builder::{ColumnSpec, OperationKind, StatementBuilder, strings};
use crate::condition::{SubSelect, Target};
use crate::entity::Entity;
use crate::error::{CqlError, CqlResult};
use crate::flavor::{Flavor, ParameterMode};
use crate::naming::NamingPolicy;
use crate::pool::{BufferPool, PoolConfig};
use crate::schema::{SchemaCache, id_condition, without};
use crate::value::PropBag;
use cqlorm_parse::{ParseCache, ParseCacheConfig, ParsedQuery};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Configuration for [`StatementFactory`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FactoryConfig {
    pub naming: NamingPolicy,
    pub mode: ParameterMode,
    pub pool: PoolConfig,
    pub parse_cache: ParseCacheConfig,
}

impl FactoryConfig {
    /// Create a new configuration with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn naming(mut self, naming: NamingPolicy) -> Self {
        self.naming = naming;
        self
    }

    pub fn mode(mut self, mode: ParameterMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn pool(mut self, pool: PoolConfig) -> Self {
        self.pool = pool;
        self
    }

    pub fn parse_cache(mut self, parse_cache: ParseCacheConfig) -> Self {
        self.parse_cache = parse_cache;
        self
    }
}

/// Creates builders of one [`Flavor`] that share a schema cache, a buffer
/// pool and a parse cache. Cloning is cheap; clones share all three.
///
/// # Example
///
/// ```
/// use cqlorm::{Condition, NamingPolicy, ParameterMode, StatementFactory};
///
/// let cql = StatementFactory::new(NamingPolicy::LowerUnderscore, ParameterMode::Positional);
/// let pair = cql
///     .select(["firstName"])
///     .from_table("account")
///     .where_cond(Condition::eq("id", 1))
///     .pair()?;
/// assert_eq!(pair.text, r#"SELECT first_name AS "firstName" FROM account WHERE id = ?"#);
/// assert_eq!(pair.parameters.len(), 1);
/// # Ok::<(), cqlorm::CqlError>(())
/// ```
#[derive(Debug, Clone)]
pub struct StatementFactory {
    flavor: Flavor,
    schema: Arc<SchemaCache>,
    pool: Arc<BufferPool>,
    parse_cache: Arc<ParseCache>,
}

impl Default for StatementFactory {
    fn default() -> Self {
        Self::from_config(&FactoryConfig::default())
    }
}

impl StatementFactory {
    pub fn new(naming: NamingPolicy, mode: ParameterMode) -> Self {
        Self::from_config(&FactoryConfig::new().naming(naming).mode(mode))
    }

    pub fn from_config(config: &FactoryConfig) -> Self {
        Self {
            flavor: Flavor::new(config.naming, config.mode),
            schema: Arc::new(SchemaCache::new()),
            pool: Arc::new(BufferPool::new(config.pool.clone())),
            parse_cache: Arc::new(ParseCache::new(config.parse_cache.clone())),
        }
    }

    /// A factory of another flavor sharing this factory's caches and pool.
    pub fn with_flavor(&self, flavor: Flavor) -> Self {
        Self {
            flavor,
            ..self.clone()
        }
    }

    /// Replace the schema cache, e.g. to share one across factories.
    pub fn with_schema(mut self, schema: Arc<SchemaCache>) -> Self {
        self.schema = schema;
        self
    }

    pub fn flavor(&self) -> Flavor {
        self.flavor
    }

    pub fn schema(&self) -> &Arc<SchemaCache> {
        &self.schema
    }

    pub fn pool(&self) -> &Arc<BufferPool> {
        &self.pool
    }

    pub fn parse_cache(&self) -> &Arc<ParseCache> {
        &self.parse_cache
    }

    /// Normalize externally supplied query text through the parse cache.
    pub fn parse(&self, cql: &str) -> CqlResult<Arc<ParsedQuery>> {
        Ok(self.parse_cache.parse(cql)?)
    }

    fn builder(&self, op: OperationKind) -> StatementBuilder {
        StatementBuilder::new(op, self.flavor, Arc::clone(&self.schema), &self.pool)
    }

    // ==================== INSERT ====================

    /// `INSERT (cols) VALUES (placeholders)`; values are bound by the caller.
    pub fn insert<I>(&self, columns: I) -> StatementBuilder
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        self.builder(OperationKind::Insert)
            .with_columns(ColumnSpec::Columns(strings(columns)))
    }

    pub fn insert_props(&self, props: PropBag) -> StatementBuilder {
        self.builder(OperationKind::Insert)
            .with_columns(ColumnSpec::Props(props))
    }

    /// Multi-row insert. Not available in named mode.
    pub fn insert_props_list(&self, rows: Vec<PropBag>) -> StatementBuilder {
        self.builder(OperationKind::Insert)
            .with_columns(ColumnSpec::PropsList(rows))
    }

    fn insertable<E: Entity>(&self, entity: &E, excluded: &[&str]) -> PropBag {
        let eligible = without(&self.schema.props(E::meta()).insert, excluded);
        let mut props = entity.to_props();
        props.retain(|name| eligible.iter().any(|e| e == name));
        props
    }

    /// Insert-eligible properties of `entity` minus `excluded`. The table
    /// defaults to the entity's unless `into_table` names one.
    pub fn insert_entity<E: Entity>(&self, entity: &E, excluded: &[&str]) -> StatementBuilder {
        let props = self.insertable(entity, excluded);
        self.builder(OperationKind::Insert)
            .with_entity(E::meta())
            .with_columns(ColumnSpec::Props(props))
    }

    pub fn insert_entities<E: Entity>(&self, entities: &[E], excluded: &[&str]) -> StatementBuilder {
        let rows = entities
            .iter()
            .map(|e| self.insertable(e, excluded))
            .collect();
        self.builder(OperationKind::Insert)
            .with_entity(E::meta())
            .with_columns(ColumnSpec::PropsList(rows))
    }

    // ==================== SELECT ====================

    pub fn select<I>(&self, columns: I) -> StatementBuilder
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        self.builder(OperationKind::Select)
            .with_columns(ColumnSpec::Columns(strings(columns)))
    }

    /// `SELECT col AS "alias", ..`
    pub fn select_aliased<I, C, A>(&self, pairs: I) -> StatementBuilder
    where
        I: IntoIterator<Item = (C, A)>,
        C: Into<String>,
        A: Into<String>,
    {
        let pairs = pairs
            .into_iter()
            .map(|(c, a)| (c.into(), a.into()))
            .collect();
        self.builder(OperationKind::Select)
            .with_columns(ColumnSpec::Aliased(pairs))
    }

    /// `SELECT modifier cols`, e.g. `DISTINCT` or `JSON`.
    pub fn select_with<I>(&self, modifier: impl Into<String>, columns: I) -> StatementBuilder
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        self.select(columns).with_modifier(modifier.into())
    }

    /// Select-eligible columns of `T` minus `excluded`, from `T`'s table.
    /// Nested entity fields are not included.
    pub fn select_entity<T: Entity>(&self, excluded: &[&str]) -> StatementBuilder {
        let meta = T::meta();
        let columns = without(&self.schema.props(meta).select, excluded);
        self.builder(OperationKind::Select)
            .with_target(Target::Entity(meta))
            .with_columns(ColumnSpec::Columns(columns))
    }

    /// Like [`select_entity`](Self::select_entity), but nested entity fields
    /// are expanded into their dotted columns (`homeAddress.zipCode`).
    /// `select_entity` leaves them out; name them explicitly there.
    pub fn select_entity_nested<T: Entity>(&self, excluded: &[&str]) -> StatementBuilder {
        let meta = T::meta();
        let mut builder = self
            .builder(OperationKind::Select)
            .with_target(Target::Entity(meta));
        match self.schema.columns(meta, self.flavor.naming) {
            Ok(map) => {
                let columns = map
                    .iter()
                    .map(|(logical, _)| logical)
                    .filter(|logical| !excluded.contains(logical))
                    .map(str::to_string)
                    .collect();
                builder.with_columns(ColumnSpec::Columns(columns))
            }
            Err(err) => {
                builder.fail(err);
                builder
            }
        }
    }

    // ==================== UPDATE ====================

    pub fn update(&self, table: impl Into<String>) -> StatementBuilder {
        self.builder(OperationKind::Update)
            .with_target(Target::Table(table.into()))
    }

    pub fn update_type<T: Entity>(&self) -> StatementBuilder {
        self.builder(OperationKind::Update)
            .with_target(Target::Entity(T::meta()))
    }

    /// `UPDATE t SET <update-eligible non-id props> WHERE <ids>`.
    pub fn update_entity<E: Entity>(&self, entity: &E, excluded: &[&str]) -> StatementBuilder {
        let meta = E::meta();
        let mut builder = self.update_type::<E>();
        builder.set_entity(entity, excluded);

        let props = entity.to_props();
        let mut ids = Vec::new();
        for field in meta.id_fields() {
            match props.get(field.name) {
                Some(value) => ids.push(value.clone()),
                None => {
                    builder.fail(CqlError::usage(format!(
                        "{} has no value for id field `{}`",
                        meta.type_name, field.name
                    )));
                    return builder;
                }
            }
        }
        match id_condition(meta, ids) {
            Ok(condition) => {
                builder.where_cond(condition);
            }
            Err(err) => builder.fail(err),
        }
        builder
    }

    // ==================== DELETE ====================

    pub fn delete_from(&self, table: impl Into<String>) -> StatementBuilder {
        self.builder(OperationKind::Delete)
            .with_target(Target::Table(table.into()))
    }

    pub fn delete_from_entity<T: Entity>(&self) -> StatementBuilder {
        self.builder(OperationKind::Delete)
            .with_target(Target::Entity(T::meta()))
    }

    /// `DELETE cols FROM ..`: removes the named columns only.
    pub fn delete<I>(&self, columns: I) -> StatementBuilder
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        self.builder(OperationKind::Delete)
            .with_columns(ColumnSpec::Columns(strings(columns)))
    }

    // ==================== Subqueries ====================

    /// A nested SELECT rendered with this factory's flavor.
    pub fn subquery<I>(&self, columns: I) -> SubSelect
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        SubSelect::new(self.flavor, strings(columns))
    }
}
