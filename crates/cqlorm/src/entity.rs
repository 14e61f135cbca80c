//! Entity metadata consumed by the naming resolver and the builder.
//!
//! Metadata is static: `#[derive(Entity)]` generates one [`EntityMeta`] per
//! type, but it can also be written by hand with the `const` constructors.
//!
//! ```ignore
//! use cqlorm::{EntityMeta, FieldMeta};
//!
//! static FIELDS: [FieldMeta; 2] = [
//!     FieldMeta::new("id").id(),
//!     FieldMeta::new("firstName"),
//! ];
//! static META: EntityMeta = EntityMeta::new("app::Account", "Account", &FIELDS);
//! ```

use crate::value::PropBag;

/// Per-field metadata.
#[derive(Debug, Clone, Copy)]
pub struct FieldMeta {
    /// Logical (lowerCamelCase) property name.
    pub name: &'static str,
    /// Explicit physical column, used verbatim under every policy.
    pub column: Option<&'static str>,
    pub id: bool,
    pub read_only: bool,
    pub non_updatable: bool,
    pub transient: bool,
    /// Metadata of a nested entity-typed field.
    pub nested: Option<fn() -> &'static EntityMeta>,
}

impl FieldMeta {
    pub const fn new(name: &'static str) -> Self {
        Self {
            name,
            column: None,
            id: false,
            read_only: false,
            non_updatable: false,
            transient: false,
            nested: None,
        }
    }

    pub const fn column(mut self, column: &'static str) -> Self {
        self.column = Some(column);
        self
    }

    pub const fn id(mut self) -> Self {
        self.id = true;
        self
    }

    pub const fn read_only(mut self) -> Self {
        self.read_only = true;
        self
    }

    pub const fn non_updatable(mut self) -> Self {
        self.non_updatable = true;
        self
    }

    pub const fn transient(mut self) -> Self {
        self.transient = true;
        self
    }

    pub const fn nested(mut self, meta: fn() -> &'static EntityMeta) -> Self {
        self.nested = Some(meta);
        self
    }

    /// Whether the field maps to a column of its own entity.
    pub fn is_column(&self) -> bool {
        !self.transient && self.nested.is_none()
    }
}

/// Static description of an entity type.
#[derive(Debug)]
pub struct EntityMeta {
    /// Fully qualified type path; the schema cache key.
    pub type_name: &'static str,
    /// Simple type name, the source of derived table names.
    pub name: &'static str,
    /// Explicit table name, used verbatim under every policy.
    pub table: Option<&'static str>,
    pub fields: &'static [FieldMeta],
}

impl EntityMeta {
    pub const fn new(
        type_name: &'static str,
        name: &'static str,
        fields: &'static [FieldMeta],
    ) -> Self {
        Self {
            type_name,
            name,
            table: None,
            fields,
        }
    }

    pub const fn table(mut self, table: &'static str) -> Self {
        self.table = Some(table);
        self
    }

    pub fn field(&self, name: &str) -> Option<&FieldMeta> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Id fields in declaration order.
    pub fn id_fields(&self) -> impl Iterator<Item = &FieldMeta> {
        self.fields.iter().filter(|f| f.id)
    }
}

impl PartialEq for EntityMeta {
    fn eq(&self, other: &Self) -> bool {
        self.type_name == other.type_name
    }
}

impl Eq for EntityMeta {}

/// A type with static metadata and a property snapshot.
///
/// Implemented by `#[derive(Entity)]`.
pub trait Entity {
    fn meta() -> &'static EntityMeta;

    /// Column-field values keyed by logical name, in declaration order.
    /// Transient and nested fields are omitted.
    fn to_props(&self) -> PropBag;
}

#[cfg(test)]
mod tests {
    use super::*;

    static FIELDS: [FieldMeta; 3] = [
        FieldMeta::new("id").id(),
        FieldMeta::new("createdAt").read_only(),
        FieldMeta::new("cached").transient(),
    ];
    static META: EntityMeta = EntityMeta::new("tests::Account", "Account", &FIELDS).table("accounts");

    #[test]
    fn const_builders() {
        assert_eq!(META.table, Some("accounts"));
        assert!(META.field("createdAt").is_some_and(|f| f.read_only));
        assert!(!META.field("cached").is_some_and(FieldMeta::is_column));
        let ids: Vec<_> = META.id_fields().map(|f| f.name).collect();
        assert_eq!(ids, vec!["id"]);
    }
}
