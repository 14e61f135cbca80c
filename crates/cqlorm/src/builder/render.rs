//! Statement rendering.

use super::{ColumnSpec, IfClause, OrderItem, Predicate, SetItem, StatementBuilder};
use crate::builder::OperationKind;
use crate::condition::{Condition, SubQuery, SubSelect, Target};
use crate::error::{CqlError, CqlResult};
use crate::flavor::{Flavor, ParameterMode};
use crate::naming::is_keyword;
use crate::schema::{ColumnMap, SchemaCache};
use crate::value::{PropBag, Value};
use cqlorm_parse::{TokenKind, is_function_name, tokenize};
use std::fmt::Write;
use std::sync::Arc;

/// Render `b` into `out`, returning the parameter list.
pub(super) fn render(b: &StatementBuilder, out: &mut String) -> CqlResult<Vec<Value>> {
    let columns = match b.entity {
        Some(meta) => Some(b.schema.columns(meta, b.flavor.naming)?),
        None => None,
    };
    let mut r = Renderer {
        flavor: b.flavor,
        schema: &b.schema,
        columns,
        out,
        params: Vec::new(),
    };
    match b.op {
        OperationKind::Insert => r.insert(b)?,
        OperationKind::Select => r.select(b)?,
        OperationKind::Update => r.update(b)?,
        OperationKind::Delete => r.delete(b)?,
    }
    Ok(r.params)
}

/// Placeholder name for a logical column: its last dotted segment, reduced
/// to `[A-Za-z0-9_]`.
fn param_name(column: &str) -> String {
    let last = column.rsplit('.').next().unwrap_or(column);
    let name: String = last
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_')
        .collect();
    if name.is_empty() { "p".to_string() } else { name }
}

fn bound_name(prefix: &str, name: &str) -> String {
    let mut chars = name.chars();
    let mut out = String::with_capacity(prefix.len() + name.len());
    out.push_str(prefix);
    if let Some(first) = chars.next() {
        out.push(first.to_ascii_uppercase());
        out.push_str(chars.as_str());
    }
    out
}

/// A pre-formatted column fragment (`"a, b"`, `"count(*) AS n"`).
fn is_raw_fragment(columns: &[String]) -> bool {
    columns.len() == 1 && (columns[0].contains(' ') || columns[0].contains(','))
}

struct Renderer<'a> {
    flavor: Flavor,
    schema: &'a SchemaCache,
    columns: Option<Arc<ColumnMap>>,
    out: &'a mut String,
    params: Vec<Value>,
}

impl Renderer<'_> {
    fn resolve(&self, logical: &str) -> String {
        self.columns
            .as_ref()
            .and_then(|map| map.get(logical))
            .map_or_else(|| self.flavor.naming.convert(logical), str::to_string)
    }

    fn push_resolved(&mut self, logical: &str) {
        let physical = self.resolve(logical);
        self.out.push_str(&physical);
    }

    fn table(&self, b: &StatementBuilder) -> CqlResult<String> {
        match (&b.target, b.entity) {
            (Some(target), _) => Ok(self.target_name(target)),
            (None, Some(meta)) => Ok(self.schema.tables(meta).get(self.flavor.naming).to_string()),
            (None, None) => Err(CqlError::missing(format!("{} target table", b.op))),
        }
    }

    fn target_name(&self, target: &Target) -> String {
        match target {
            Target::Table(table) => table.clone(),
            Target::Entity(meta) => self.schema.tables(*meta).get(self.flavor.naming).to_string(),
        }
    }

    // ==================== Parameters ====================

    /// Emit one value for the logical column `name`.
    fn value(&mut self, name: &str, value: &Value) {
        if let Value::Expr(expr) = value {
            self.out.push_str(expr);
            return;
        }
        match self.flavor.mode {
            ParameterMode::Literal => value.write_literal(self.out),
            ParameterMode::Positional => {
                self.out.push('?');
                self.params.push(value.clone());
            }
            ParameterMode::Named => {
                self.out.push(':');
                self.out.push_str(name);
                self.params.push(value.clone());
            }
        }
    }

    /// Emit a placeholder with no value, to be bound by the caller.
    fn unbound(&mut self, column: &str) {
        match self.flavor.mode {
            ParameterMode::Literal | ParameterMode::Positional => self.out.push('?'),
            ParameterMode::Named => {
                self.out.push(':');
                self.out.push_str(&param_name(column));
            }
        }
    }

    // ==================== Raw text ====================

    /// Copy `text`, resolving bare identifiers that are neither keywords nor
    /// function names.
    fn raw(&mut self, text: &str) -> CqlResult<()> {
        let tokens = tokenize(text)?;
        for (i, token) in tokens.iter().enumerate() {
            if token.kind == TokenKind::Word
                && !is_keyword(token.text)
                && !is_function_name(&tokens, i)
            {
                self.push_resolved(token.text);
            } else {
                self.out.push_str(token.text);
            }
        }
        Ok(())
    }

    // ==================== Conditions ====================

    fn condition(&mut self, condition: &Condition) -> CqlResult<()> {
        match condition {
            Condition::Comparison { column, op, value } => {
                self.push_resolved(column);
                self.out.push(' ');
                self.out.push_str(op);
                self.out.push(' ');
                self.value(&param_name(column), value);
            }
            Condition::Between {
                column,
                op,
                low,
                high,
            } => {
                let name = param_name(column);
                self.push_resolved(column);
                self.out.push(' ');
                self.out.push_str(op);
                self.out.push(' ');
                self.value(&bound_name("min", &name), low);
                self.out.push_str(" AND ");
                self.value(&bound_name("max", &name), high);
            }
            Condition::In { column, op, values } => {
                let name = param_name(column);
                self.push_resolved(column);
                self.out.push(' ');
                self.out.push_str(op);
                self.out.push_str(" (");
                for (i, value) in values.iter().enumerate() {
                    if i > 0 {
                        self.out.push(',');
                    }
                    self.value(&format!("{name}{}", i + 1), value);
                }
                self.out.push(')');
            }
            Condition::Not(inner) => {
                self.out.push_str("NOT (");
                self.condition(inner)?;
                self.out.push(')');
            }
            Condition::Junction { op, children } => match children.as_slice() {
                [] => return Err(CqlError::EmptyCondition(op.as_str())),
                [only] => self.condition(only)?,
                _ => {
                    for (i, child) in children.iter().enumerate() {
                        if i > 0 {
                            self.out.push(' ');
                            self.out.push_str(op.as_str());
                            self.out.push(' ');
                        }
                        self.out.push('(');
                        self.condition(child)?;
                        self.out.push(')');
                    }
                }
            },
            Condition::Subquery { column, op, query } => {
                self.push_resolved(column);
                self.out.push(' ');
                self.out.push_str(op);
                self.out.push_str(" (");
                self.subquery(query)?;
                self.out.push(')');
            }
            Condition::Raw(text) => self.out.push_str(text),
        }
        Ok(())
    }

    fn subquery(&mut self, query: &SubQuery) -> CqlResult<()> {
        match query {
            SubQuery::Text(text) => {
                self.out.push_str(text);
                Ok(())
            }
            SubQuery::Select(select) => {
                if select.flavor != self.flavor {
                    return Err(CqlError::unsupported(format!(
                        "subquery rendered with {:?}/{:?} inside a {:?}/{:?} statement",
                        select.flavor.naming, select.flavor.mode, self.flavor.naming, self.flavor.mode
                    )));
                }
                let target = select
                    .target
                    .as_ref()
                    .ok_or_else(|| CqlError::missing("subquery target table"))?;
                let sub_columns = match target {
                    Target::Entity(meta) => Some(self.schema.columns(*meta, self.flavor.naming)?),
                    Target::Table(_) => None,
                };
                let outer = std::mem::replace(&mut self.columns, sub_columns);
                let result = self.sub_select(select, target);
                self.columns = outer;
                result
            }
        }
    }

    fn sub_select(&mut self, select: &SubSelect, target: &Target) -> CqlResult<()> {
        if select.columns.is_empty() {
            return Err(CqlError::missing("subquery columns"));
        }
        self.out.push_str("SELECT ");
        if is_raw_fragment(&select.columns) {
            self.out.push_str(&select.columns[0]);
        } else {
            for (i, column) in select.columns.iter().enumerate() {
                if i > 0 {
                    self.out.push_str(", ");
                }
                self.push_resolved(column);
            }
        }
        self.out.push_str(" FROM ");
        let table = self.target_name(target);
        self.out.push_str(&table);
        if let Some(condition) = &select.condition {
            self.out.push_str(" WHERE ");
            self.condition(condition)?;
        }
        Ok(())
    }

    // ==================== Clauses ====================

    fn where_clause(&mut self, b: &StatementBuilder) -> CqlResult<()> {
        match &b.predicate {
            None => Ok(()),
            Some(Predicate::Cond(condition)) => {
                self.out.push_str(" WHERE ");
                self.condition(condition)
            }
            Some(Predicate::Raw(text)) => {
                self.out.push_str(" WHERE ");
                self.raw(text)
            }
        }
    }

    fn if_clause(&mut self, b: &StatementBuilder) -> CqlResult<()> {
        match &b.if_clause {
            None => Ok(()),
            Some(IfClause::Exists) => {
                self.out.push_str(" IF EXISTS");
                Ok(())
            }
            Some(IfClause::Cond(condition)) => {
                self.out.push_str(" IF ");
                self.condition(condition)
            }
            Some(IfClause::Raw(text)) => {
                self.out.push_str(" IF ");
                self.raw(text)
            }
        }
    }

    fn using(&mut self, ttl: Option<u32>, timestamp: Option<i64>) {
        match (ttl, timestamp) {
            (None, None) => {}
            (Some(ttl), None) => {
                let _ = write!(self.out, " USING TTL {ttl}");
            }
            (None, Some(ts)) => {
                let _ = write!(self.out, " USING TIMESTAMP {ts}");
            }
            (Some(ttl), Some(ts)) => {
                let _ = write!(self.out, " USING TTL {ttl} AND TIMESTAMP {ts}");
            }
        }
    }

    fn column_list(&mut self, columns: &[String]) {
        for (i, column) in columns.iter().enumerate() {
            if i > 0 {
                self.out.push_str(", ");
            }
            self.push_resolved(column);
        }
    }

    // ==================== INSERT ====================

    fn insert(&mut self, b: &StatementBuilder) -> CqlResult<()> {
        let spec = b
            .columns
            .as_ref()
            .ok_or_else(|| CqlError::missing("INSERT columns"))?;
        let table = self.table(b)?;

        self.out.push_str("INSERT INTO ");
        self.out.push_str(&table);
        self.out.push_str(" (");
        match spec {
            ColumnSpec::Columns(columns) => {
                if columns.is_empty() {
                    return Err(CqlError::missing("INSERT columns"));
                }
                self.column_list(columns);
                self.out.push_str(") VALUES (");
                for (i, column) in columns.iter().enumerate() {
                    if i > 0 {
                        self.out.push(',');
                    }
                    self.unbound(column);
                }
                self.out.push(')');
            }
            ColumnSpec::Props(props) => {
                if props.is_empty() {
                    return Err(CqlError::missing("INSERT columns"));
                }
                let columns: Vec<String> = props.names().map(str::to_string).collect();
                self.column_list(&columns);
                self.out.push_str(") VALUES ");
                self.values_row(&columns, props, 0)?;
            }
            ColumnSpec::PropsList(rows) => {
                let Some(first) = rows.first().filter(|row| !row.is_empty()) else {
                    return Err(CqlError::missing("INSERT rows"));
                };
                if rows.len() > 1 && self.flavor.mode == ParameterMode::Named {
                    return Err(CqlError::unsupported(
                        "multi-row INSERT with named parameters repeats placeholder names",
                    ));
                }
                let columns: Vec<String> = first.names().map(str::to_string).collect();
                self.column_list(&columns);
                self.out.push_str(") VALUES ");
                for (i, row) in rows.iter().enumerate() {
                    if i > 0 {
                        self.out.push_str(", ");
                    }
                    self.values_row(&columns, row, i)?;
                }
            }
            ColumnSpec::Aliased(_) => {
                return Err(CqlError::unsupported("column aliases in INSERT"));
            }
        }

        if b.if_not_exists {
            self.out.push_str(" IF NOT EXISTS");
        }
        self.using(b.ttl, b.timestamp);
        Ok(())
    }

    fn values_row(&mut self, columns: &[String], row: &PropBag, index: usize) -> CqlResult<()> {
        self.out.push('(');
        for (i, column) in columns.iter().enumerate() {
            if i > 0 {
                self.out.push(',');
            }
            let value = row.get(column).ok_or_else(|| {
                CqlError::usage(format!("INSERT row {} has no value for `{column}`", index + 1))
            })?;
            self.value(&param_name(column), value);
        }
        self.out.push(')');
        Ok(())
    }

    // ==================== SELECT ====================

    fn select_column(&mut self, column: &str) {
        let physical = self.resolve(column);
        self.out.push_str(&physical);
        if !self.flavor.naming.is_logical() && column != "*" && physical != column {
            let _ = write!(self.out, " AS \"{column}\"");
        }
    }

    fn select(&mut self, b: &StatementBuilder) -> CqlResult<()> {
        let spec = b
            .columns
            .as_ref()
            .ok_or_else(|| CqlError::missing("SELECT columns"))?;
        let table = self.table(b)?;

        self.out.push_str("SELECT ");
        if let Some(modifier) = &b.modifier {
            self.out.push_str(modifier);
            self.out.push(' ');
        }
        match spec {
            ColumnSpec::Columns(columns) if columns.is_empty() => {
                return Err(CqlError::missing("SELECT columns"));
            }
            ColumnSpec::Columns(columns) if is_raw_fragment(columns) => {
                self.out.push_str(&columns[0]);
            }
            ColumnSpec::Columns(columns) => {
                for (i, column) in columns.iter().enumerate() {
                    if i > 0 {
                        self.out.push_str(", ");
                    }
                    self.select_column(column);
                }
            }
            ColumnSpec::Aliased(pairs) => {
                if pairs.is_empty() {
                    return Err(CqlError::missing("SELECT columns"));
                }
                for (i, (column, alias)) in pairs.iter().enumerate() {
                    if i > 0 {
                        self.out.push_str(", ");
                    }
                    self.push_resolved(column);
                    let _ = write!(self.out, " AS \"{alias}\"");
                }
            }
            ColumnSpec::Props(_) | ColumnSpec::PropsList(_) => {
                return Err(CqlError::unsupported("property values in SELECT"));
            }
        }
        self.out.push_str(" FROM ");
        self.out.push_str(&table);

        self.where_clause(b)?;
        if !b.order_by.is_empty() {
            self.out.push_str(" ORDER BY ");
            for (i, item) in b.order_by.iter().enumerate() {
                if i > 0 {
                    self.out.push_str(", ");
                }
                match item {
                    OrderItem::Column(column, direction) => {
                        self.push_resolved(column);
                        if let Some(direction) = direction {
                            self.out.push(' ');
                            self.out.push_str(direction.as_str());
                        }
                    }
                    OrderItem::Raw(text) => self.raw(text)?,
                }
            }
        }
        if let Some(limit) = b.limit {
            let _ = write!(self.out, " LIMIT {limit}");
        }
        if b.allow_filtering {
            self.out.push_str(" ALLOW FILTERING");
        }
        Ok(())
    }

    // ==================== UPDATE ====================

    fn update(&mut self, b: &StatementBuilder) -> CqlResult<()> {
        if b.set.is_empty() {
            return Err(CqlError::missing("UPDATE SET assignments"));
        }
        let table = self.table(b)?;

        self.out.push_str("UPDATE ");
        self.out.push_str(&table);
        self.using(b.ttl, b.timestamp);
        self.out.push_str(" SET ");
        for (i, item) in b.set.iter().enumerate() {
            if i > 0 {
                self.out.push_str(", ");
            }
            match item {
                SetItem::Column(column) => {
                    self.push_resolved(column);
                    self.out.push_str(" = ");
                    self.unbound(column);
                }
                SetItem::Assign(column, value) => {
                    self.push_resolved(column);
                    self.out.push_str(" = ");
                    self.value(&param_name(column), value);
                }
                SetItem::Raw(text) => self.raw(text)?,
            }
        }
        self.where_clause(b)?;
        self.if_clause(b)
    }

    // ==================== DELETE ====================

    fn delete(&mut self, b: &StatementBuilder) -> CqlResult<()> {
        let table = self.table(b)?;

        self.out.push_str("DELETE ");
        match &b.columns {
            None => {}
            Some(ColumnSpec::Columns(columns)) if columns.is_empty() => {}
            Some(ColumnSpec::Columns(columns)) if is_raw_fragment(columns) => {
                self.out.push_str(&columns[0]);
                self.out.push(' ');
            }
            Some(ColumnSpec::Columns(columns)) => {
                self.column_list(columns);
                self.out.push(' ');
            }
            Some(_) => return Err(CqlError::unsupported("DELETE takes column names only")),
        }
        self.out.push_str("FROM ");
        self.out.push_str(&table);
        self.using(None, b.timestamp);
        self.where_clause(b)?;
        self.if_clause(b)
    }
}
