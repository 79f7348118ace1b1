use darling::FromAttributes;
use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::{parse_macro_input, Data, DeriveInput, Field, Fields, Ident, Index, Member};

use crate::common::{has_marker, to_compile_error, type_named};

/// Struct-level options: `#[actor(inbox = "field")]`
#[derive(Debug, Default, FromAttributes)]
#[darling(attributes(actor))]
struct ActorArgs {
    /// Name (or tuple index) of the field holding the inbox
    #[darling(default)]
    inbox: Option<String>,
}

/// Implementation of the Actor derive macro
pub(crate) fn derive_actor_impl(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    let args = match ActorArgs::from_attributes(&input.attrs) {
        Ok(args) => args,
        Err(err) => return err.write_errors().into(),
    };

    match expand(&input, &args) {
        Ok(tokens) => tokens.into(),
        Err(err) => to_compile_error(err),
    }
}

fn expand(input: &DeriveInput, args: &ActorArgs) -> syn::Result<TokenStream2> {
    let fields = match &input.data {
        Data::Struct(data) => &data.fields,
        _ => {
            return Err(syn::Error::new_spanned(
                &input.ident,
                "Actor can only be derived for structs",
            ))
        }
    };

    let name = &input.ident;
    let member = inbox_member(fields, args.inbox.as_deref(), name)?;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    Ok(quote! {
        impl #impl_generics ::baton::Actor for #name #ty_generics #where_clause {
            fn inbox(&self) -> &::baton::Inbox {
                &self.#member
            }
        }
    })
}

fn member_for(index: usize, field: &Field) -> Member {
    match &field.ident {
        Some(ident) => Member::Named(ident.clone()),
        None => Member::Unnamed(Index::from(index)),
    }
}

/// Picks the inbox field: explicit attribute, then `#[inbox]` marker, then type name
fn inbox_member(fields: &Fields, explicit: Option<&str>, owner: &Ident) -> syn::Result<Member> {
    if let Some(wanted) = explicit {
        return fields
            .iter()
            .enumerate()
            .find(|(index, field)| match &field.ident {
                Some(ident) => ident == wanted,
                None => index.to_string() == wanted,
            })
            .map(|(index, field)| member_for(index, field))
            .ok_or_else(|| {
                syn::Error::new_spanned(
                    owner,
                    format!("`{}` has no field `{}` to use as its inbox", owner, wanted),
                )
            });
    }

    let marked: Vec<(usize, &Field)> = fields
        .iter()
        .enumerate()
        .filter(|(_, field)| has_marker(field, "inbox"))
        .collect();
    match marked.as_slice() {
        [] => {}
        [(index, field)] => return Ok(member_for(*index, field)),
        [_, (_, second), ..] => {
            return Err(syn::Error::new_spanned(
                second,
                "only one field may be marked #[inbox]",
            ))
        }
    }

    let typed: Vec<(usize, &Field)> = fields
        .iter()
        .enumerate()
        .filter(|(_, field)| type_named(&field.ty, "Inbox"))
        .collect();
    match typed.as_slice() {
        [(index, field)] => Ok(member_for(*index, field)),
        [] => Err(syn::Error::new_spanned(
            owner,
            "no inbox found: add a field of type `Inbox` or mark one with #[inbox]",
        )),
        _ => Err(syn::Error::new_spanned(
            owner,
            "several `Inbox` fields: pick one with #[inbox] or #[actor(inbox = \"...\")]",
        )),
    }
}
