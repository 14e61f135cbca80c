//! Attribute parsing for the Entity derive macro.
//!
//! Handles struct-level `#[cql(table = "...")]` and field-level
//! `#[cql(column = "...", id, read_only, non_updatable, transient, nested)]`.

use syn::{DeriveInput, Result};

/// Parsed field-level `#[cql(...)]` flags, merged across attributes.
#[derive(Default)]
pub(super) struct FieldAttr {
    pub column: Option<String>,
    pub is_id: bool,
    pub read_only: bool,
    pub non_updatable: bool,
    pub transient: bool,
    pub nested: bool,
}

impl syn::parse::Parse for FieldAttr {
    fn parse(input: syn::parse::ParseStream) -> Result<Self> {
        let mut attr = FieldAttr::default();

        while !input.is_empty() {
            let ident: syn::Ident = input.parse()?;
            match ident.to_string().as_str() {
                "id" => attr.is_id = true,
                "read_only" => attr.read_only = true,
                "non_updatable" => attr.non_updatable = true,
                "transient" => attr.transient = true,
                "nested" => attr.nested = true,
                "column" => {
                    let _: syn::Token![=] = input.parse()?;
                    let value: syn::LitStr = input.parse()?;
                    if value.value().is_empty() {
                        return Err(syn::Error::new_spanned(value, "column name is empty"));
                    }
                    attr.column = Some(value.value());
                }
                other => {
                    return Err(syn::Error::new_spanned(
                        &ident,
                        format!("unknown cql field attribute `{other}`"),
                    ));
                }
            }

            if input.is_empty() {
                break;
            }
            let _: syn::Token![,] = input.parse()?;
        }

        Ok(attr)
    }
}

impl FieldAttr {
    fn merge(&mut self, other: FieldAttr) {
        if other.column.is_some() {
            self.column = other.column;
        }
        self.is_id |= other.is_id;
        self.read_only |= other.read_only;
        self.non_updatable |= other.non_updatable;
        self.transient |= other.transient;
        self.nested |= other.nested;
    }
}

/// Collect every `#[cql(...)]` on `field` and reject contradictory flags.
pub(super) fn field_attr(field: &syn::Field) -> Result<FieldAttr> {
    let mut merged = FieldAttr::default();
    for attr in &field.attrs {
        if attr.path().is_ident("cql") {
            merged.merge(attr.parse_args::<FieldAttr>()?);
        }
    }

    if merged.transient && (merged.is_id || merged.nested || merged.column.is_some()) {
        return Err(syn::Error::new_spanned(
            field,
            "a transient field cannot also be id, nested or mapped to a column",
        ));
    }
    if merged.nested && (merged.is_id || merged.column.is_some()) {
        return Err(syn::Error::new_spanned(
            field,
            "a nested field maps through its own entity; drop `id`/`column`",
        ));
    }
    Ok(merged)
}

/// Extract the table name from struct-level `#[cql(table = "...")]`, if any.
pub(super) fn table_name(input: &DeriveInput) -> Result<Option<String>> {
    let mut table = None;
    for attr in &input.attrs {
        if !attr.path().is_ident("cql") {
            continue;
        }
        let nested = attr.parse_args::<syn::MetaNameValue>()?;
        if !nested.path.is_ident("table") {
            return Err(syn::Error::new_spanned(
                &nested.path,
                "unknown cql struct attribute; expected `table = \"...\"`",
            ));
        }
        match &nested.value {
            syn::Expr::Lit(syn::ExprLit {
                lit: syn::Lit::Str(lit),
                ..
            }) if !lit.value().is_empty() => table = Some(lit.value()),
            other => {
                return Err(syn::Error::new_spanned(
                    other,
                    "table must be a non-empty string literal",
                ));
            }
        }
    }
    Ok(table)
}
