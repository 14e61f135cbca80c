//! Type helper utilities for syn type analysis.

/// The single type argument of `Wrapper<T>` when the last path segment is
/// named `wrapper`.
fn single_arg<'a>(ty: &'a syn::Type, wrapper: &str) -> Option<&'a syn::Type> {
    let syn::Type::Path(type_path) = ty else {
        return None;
    };
    let seg = type_path.path.segments.last()?;
    if seg.ident != wrapper {
        return None;
    }
    let syn::PathArguments::AngleBracketed(args) = &seg.arguments else {
        return None;
    };
    if args.args.len() != 1 {
        return None;
    }
    let syn::GenericArgument::Type(inner) = args.args.first()? else {
        return None;
    };
    Some(inner)
}

/// Extract the inner type T from Option<T>, or return None if not an Option type.
pub fn option_inner(ty: &syn::Type) -> Option<&syn::Type> {
    single_arg(ty, "Option")
}

/// Extract the inner type T from Box<T>, or return None if not a Box type.
pub fn box_inner(ty: &syn::Type) -> Option<&syn::Type> {
    single_arg(ty, "Box")
}

/// The entity type behind a nested field: `T`, `Option<T>`, `Box<T>` and
/// any nesting of the two wrappers all resolve to `T`.
pub fn entity_type(mut ty: &syn::Type) -> &syn::Type {
    while let Some(inner) = option_inner(ty).or_else(|| box_inner(ty)) {
        ty = inner;
    }
    ty
}
