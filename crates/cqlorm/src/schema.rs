//! Per-type naming memoization.
//!
//! [`SchemaCache`] is owned by the long-lived object that creates builders
//! (normally a [`StatementFactory`](crate::StatementFactory)). Every value it
//! publishes is an immutable `Arc` snapshot. Two threads missing the same key
//! compute equal values and the last insert wins.

use crate::condition::Condition;
use crate::entity::EntityMeta;
use crate::error::{CqlError, CqlResult};
use crate::naming::NamingPolicy;
use crate::value::Value;
use std::collections::HashMap;
use std::hash::Hash;
use std::sync::{Arc, PoisonError, RwLock};
use tracing::debug;

/// Ordered `logical -> physical` column mapping of one entity type.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnMap {
    entries: Vec<(String, String)>,
}

impl ColumnMap {
    pub fn get(&self, logical: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == logical)
            .map(|(_, v)| v.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn push(&mut self, logical: String, physical: String) {
        self.entries.push((logical, physical));
    }
}

/// Table name of one type under every policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableNames {
    pub lower_underscore: String,
    pub upper_underscore: String,
    pub lower_camel: String,
}

impl TableNames {
    fn derive(meta: &EntityMeta) -> Self {
        match meta.table {
            Some(table) => Self {
                lower_underscore: table.to_string(),
                upper_underscore: table.to_string(),
                lower_camel: table.to_string(),
            },
            None => Self {
                lower_underscore: NamingPolicy::LowerUnderscore.convert(meta.name),
                upper_underscore: NamingPolicy::UpperUnderscore.convert(meta.name),
                lower_camel: NamingPolicy::LowerCamel.convert(meta.name),
            },
        }
    }

    pub fn get(&self, policy: NamingPolicy) -> &str {
        match policy {
            NamingPolicy::LowerUnderscore => &self.lower_underscore,
            NamingPolicy::UpperUnderscore => &self.upper_underscore,
            NamingPolicy::LowerCamel => &self.lower_camel,
        }
    }
}

/// Logical property names eligible for each operation kind.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EligibleProps {
    pub select: Vec<&'static str>,
    /// `select` minus read-only fields.
    pub insert: Vec<&'static str>,
    /// `insert` minus non-updatable fields.
    pub update: Vec<&'static str>,
    /// Always empty: deletes name their columns explicitly.
    pub delete: Vec<&'static str>,
}

impl EligibleProps {
    fn derive(meta: &EntityMeta) -> Self {
        let columns = || meta.fields.iter().filter(|f| f.is_column());
        Self {
            select: columns().map(|f| f.name).collect(),
            insert: columns().filter(|f| !f.read_only).map(|f| f.name).collect(),
            update: columns()
                .filter(|f| !f.read_only && !f.non_updatable)
                .map(|f| f.name)
                .collect(),
            delete: Vec::new(),
        }
    }
}

/// Filter `props` by a caller exclusion list.
pub(crate) fn without(props: &[&'static str], excluded: &[&str]) -> Vec<String> {
    props
        .iter()
        .filter(|p| !excluded.contains(*p))
        .map(|p| (*p).to_string())
        .collect()
}

/// Equality condition over the id fields of `meta`.
///
/// `values` may cover a prefix of the declared id fields (a clustering-key
/// prefix match). Zero values, more values than id fields, or an entity
/// without id fields are usage errors. Column names stay logical and are
/// resolved when the statement renders.
pub fn id_condition(meta: &EntityMeta, values: Vec<Value>) -> CqlResult<Condition> {
    let ids: Vec<_> = meta.id_fields().collect();
    if ids.is_empty() {
        return Err(CqlError::usage(format!(
            "{} declares no id fields",
            meta.type_name
        )));
    }
    if values.is_empty() || values.len() > ids.len() {
        return Err(CqlError::usage(format!(
            "{} id lookup takes 1..={} values, got {}",
            meta.type_name,
            ids.len(),
            values.len()
        )));
    }
    let mut parts: Vec<Condition> = ids
        .into_iter()
        .zip(values)
        .map(|(field, value)| Condition::eq(field.name, value))
        .collect();
    Ok(if parts.len() == 1 {
        parts.remove(0)
    } else {
        Condition::and(parts)
    })
}

/// Memoized naming data keyed by entity type.
#[derive(Debug, Default)]
pub struct SchemaCache {
    columns: RwLock<HashMap<(&'static str, NamingPolicy), Arc<ColumnMap>>>,
    tables: RwLock<HashMap<&'static str, Arc<TableNames>>>,
    props: RwLock<HashMap<&'static str, Arc<EligibleProps>>>,
}

fn lookup<K: Eq + Hash, V>(map: &RwLock<HashMap<K, Arc<V>>>, key: &K) -> Option<Arc<V>> {
    map.read()
        .unwrap_or_else(PoisonError::into_inner)
        .get(key)
        .cloned()
}

fn publish<K: Eq + Hash, V>(map: &RwLock<HashMap<K, Arc<V>>>, key: K, value: V) -> Arc<V> {
    let value = Arc::new(value);
    map.write()
        .unwrap_or_else(PoisonError::into_inner)
        .insert(key, Arc::clone(&value));
    value
}

impl SchemaCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// `logical -> physical` map of `meta` under `policy`.
    ///
    /// Explicit column annotations are used verbatim. Nested entity fields
    /// contribute `field.sub -> subTable.subColumn` entries; a nested field
    /// whose sub map is itself dotted keeps the inner qualifier.
    pub fn columns(&self, meta: &'static EntityMeta, policy: NamingPolicy) -> CqlResult<Arc<ColumnMap>> {
        let key = (meta.type_name, policy);
        if let Some(hit) = lookup(&self.columns, &key) {
            return Ok(hit);
        }
        let mut visiting = Vec::new();
        let map = self.build_columns(meta, policy, &mut visiting)?;
        debug!(
            target: "cqlorm.naming",
            entity = meta.type_name,
            ?policy,
            columns = map.len(),
            "column map resolved"
        );
        Ok(publish(&self.columns, key, map))
    }

    fn build_columns(
        &self,
        meta: &'static EntityMeta,
        policy: NamingPolicy,
        visiting: &mut Vec<&'static str>,
    ) -> CqlResult<ColumnMap> {
        if visiting.contains(&meta.type_name) {
            let mut chain = visiting.join(" -> ");
            chain.push_str(" -> ");
            chain.push_str(meta.type_name);
            return Err(CqlError::CyclicReference(chain));
        }
        visiting.push(meta.type_name);

        let mut map = ColumnMap::default();
        for field in meta.fields.iter().filter(|f| !f.transient) {
            match field.nested {
                Some(nested) => {
                    let sub = nested();
                    let tables = self.tables(sub);
                    let sub_table = tables.get(policy);
                    let sub_map = self.build_columns(sub, policy, visiting)?;
                    for (k, v) in sub_map.iter() {
                        let physical = if v.contains('.') {
                            v.to_string()
                        } else {
                            format!("{sub_table}.{v}")
                        };
                        map.push(format!("{}.{k}", field.name), physical);
                    }
                }
                None => {
                    let physical = match field.column {
                        Some(column) => column.to_string(),
                        None => policy.convert(field.name),
                    };
                    map.push(field.name.to_string(), physical);
                }
            }
        }

        visiting.pop();
        Ok(map)
    }

    /// Table names of `meta`, derived once.
    pub fn tables(&self, meta: &'static EntityMeta) -> Arc<TableNames> {
        if let Some(hit) = lookup(&self.tables, &meta.type_name) {
            return hit;
        }
        publish(&self.tables, meta.type_name, TableNames::derive(meta))
    }

    /// Eligible property sets of `meta`, derived once.
    pub fn props(&self, meta: &'static EntityMeta) -> Arc<EligibleProps> {
        if let Some(hit) = lookup(&self.props, &meta.type_name) {
            return hit;
        }
        let props = EligibleProps::derive(meta);
        debug!(
            target: "cqlorm.naming",
            entity = meta.type_name,
            select = props.select.len(),
            insert = props.insert.len(),
            update = props.update.len(),
            "eligible properties resolved"
        );
        publish(&self.props, meta.type_name, props)
    }

    /// Physical name of one logical property, or the policy conversion when
    /// the entity does not declare it.
    pub fn column(&self, meta: &'static EntityMeta, policy: NamingPolicy, logical: &str) -> CqlResult<String> {
        let map = self.columns(meta, policy)?;
        Ok(map
            .get(logical)
            .map_or_else(|| policy.convert(logical), str::to_string))
    }

    /// Drop every memoized value.
    pub fn clear(&self) {
        self.columns.write().unwrap_or_else(PoisonError::into_inner).clear();
        self.tables.write().unwrap_or_else(PoisonError::into_inner).clear();
        self.props.write().unwrap_or_else(PoisonError::into_inner).clear();
    }
}
