//! Entity derive macro implementation
//!
//! Generates a static `EntityMeta` for the struct and a `to_props` snapshot
//! of its column fields.

mod attrs;

use crate::common::syn_types::entity_type;
use attrs::{field_attr, table_name};
use heck::ToLowerCamelCase;
use proc_macro2::TokenStream;
use quote::quote;
use syn::ext::IdentExt;
use syn::{Data, DeriveInput, Fields, Result};

pub fn expand(input: DeriveInput) -> Result<TokenStream> {
    let name = &input.ident;
    let type_name = name.unraw().to_string();

    if !input.generics.params.is_empty() {
        return Err(syn::Error::new_spanned(
            &input.generics,
            "Entity cannot be derived for generic types",
        ));
    }

    let table = table_name(&input)?;

    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => &fields.named,
            _ => {
                return Err(syn::Error::new_spanned(
                    &input,
                    "Entity can only be derived for structs with named fields",
                ));
            }
        },
        _ => {
            return Err(syn::Error::new_spanned(
                &input,
                "Entity can only be derived for structs",
            ));
        }
    };

    let mut field_metas = Vec::with_capacity(fields.len());
    let mut prop_inserts = Vec::with_capacity(fields.len());

    for field in fields.iter() {
        let Some(ident) = field.ident.as_ref() else {
            continue;
        };
        let attr = field_attr(field)?;
        let logical = ident.unraw().to_string().to_lower_camel_case();

        let mut meta = quote! { ::cqlorm::FieldMeta::new(#logical) };
        if let Some(column) = &attr.column {
            meta = quote! { #meta.column(#column) };
        }
        if attr.is_id {
            meta = quote! { #meta.id() };
        }
        if attr.read_only {
            meta = quote! { #meta.read_only() };
        }
        if attr.non_updatable {
            meta = quote! { #meta.non_updatable() };
        }
        if attr.transient {
            meta = quote! { #meta.transient() };
        }
        if attr.nested {
            let nested = entity_type(&field.ty);
            meta = quote! { #meta.nested(<#nested as ::cqlorm::Entity>::meta) };
        } else if !attr.transient {
            prop_inserts.push(quote! {
                props.insert(#logical, ::core::clone::Clone::clone(&self.#ident));
            });
        }
        field_metas.push(meta);
    }

    if field_metas.is_empty() {
        return Err(syn::Error::new_spanned(
            &input,
            "Entity requires at least one field",
        ));
    }

    let field_count = field_metas.len();
    let prop_count = prop_inserts.len();
    let table_call = table.map(|t| quote! { .table(#t) });

    Ok(quote! {
        impl ::cqlorm::Entity for #name {
            fn meta() -> &'static ::cqlorm::EntityMeta {
                static FIELDS: [::cqlorm::FieldMeta; #field_count] = [#(#field_metas),*];
                static META: ::cqlorm::EntityMeta = ::cqlorm::EntityMeta::new(
                    ::core::concat!(::core::module_path!(), "::", #type_name),
                    #type_name,
                    &FIELDS,
                )#table_call;
                &META
            }

            fn to_props(&self) -> ::cqlorm::PropBag {
                #[allow(unused_mut)]
                let mut props = ::cqlorm::PropBag::with_capacity(#prop_count);
                #(#prop_inserts)*
                props
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use syn::parse_quote;

    #[test]
    fn rejects_generics_and_tuples() {
        let generic: DeriveInput = parse_quote! {
            struct Wrapper<T> { inner: T }
        };
        assert!(expand(generic).is_err());

        let tuple: DeriveInput = parse_quote! {
            struct Pair(i64, i64);
        };
        assert!(expand(tuple).is_err());
    }

    #[test]
    fn logical_names_are_lower_camel() {
        let input: DeriveInput = parse_quote! {
            #[cql(table = "accounts")]
            struct Account {
                #[cql(id)]
                account_id: i64,
                r#type: String,
                #[cql(transient)]
                cached: bool,
            }
        };
        let out = expand(input).unwrap().to_string();
        assert!(out.contains("\"accountId\""));
        assert!(out.contains("\"type\""));
        assert!(out.contains("\"accounts\""));
        assert!(!out.contains("props . insert (\"cached\""));
    }
}
