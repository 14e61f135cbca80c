//! Derive macro for cqlorm
//!
//! Provides `#[derive(Entity)]`.

use proc_macro::TokenStream;
use syn::{DeriveInput, parse_macro_input};

mod common;
mod entity;

/// Derive the `Entity` trait for a struct.
///
/// # Example
///
/// ```ignore
/// use cqlorm::Entity;
///
/// #[derive(Clone, Entity)]
/// #[cql(table = "accounts")]
/// struct Account {
///     #[cql(id)]
///     account_id: i64,
///     first_name: String,
///     #[cql(column = "mail")]
///     email: Option<String>,
///     #[cql(nested)]
///     home: Address,
/// }
/// ```
///
/// # Generated
///
/// - `Entity::meta()`: a static `EntityMeta`. Logical field names are the
///   lowerCamelCase form of the Rust field names.
/// - `Entity::to_props()`: clones every column field into a `PropBag`.
///
/// # Attributes
///
/// - `#[cql(table = "name")]` - Table name used under every naming policy
/// - `#[cql(column = "name")]` - Column name used under every naming policy
/// - `#[cql(id)]` - Key field, in declaration order
/// - `#[cql(read_only)]` - Selected but never inserted or updated
/// - `#[cql(non_updatable)]` - Inserted but never updated
/// - `#[cql(transient)]` - Not a column at all
/// - `#[cql(nested)]` - Field of another entity type (`T`, `Option<T>` or `Box<T>`)
#[proc_macro_derive(Entity, attributes(cql))]
pub fn derive_entity(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    entity::expand(input)
        .unwrap_or_else(|e| e.to_compile_error())
        .into()
}
