// Helpers shared by the derive implementations

use syn::{Field, Type};

/// Convert a syn::Error to a TokenStream that can be returned from a proc_macro function
pub fn to_compile_error(error: syn::Error) -> proc_macro::TokenStream {
    error.to_compile_error().into()
}

/// Whether the field carries a bare `#[name]` marker attribute
pub fn has_marker(field: &Field, name: &str) -> bool {
    field.attrs.iter().any(|attr| attr.path().is_ident(name))
}

/// Whether a type's last path segment is `ident`, e.g. `Inbox` or `baton::Inbox`
pub fn type_named(ty: &Type, ident: &str) -> bool {
    match ty {
        Type::Path(path) if path.qself.is_none() => path
            .path
            .segments
            .last()
            .map(|segment| segment.ident == ident && segment.arguments.is_empty())
            .unwrap_or(false),
        Type::Group(group) => type_named(&group.elem, ident),
        Type::Paren(paren) => type_named(&paren.elem, ident),
        _ => false,
    }
}
