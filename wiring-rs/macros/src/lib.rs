//! Derive macros for wiring-rs. Use `#[derive(Injectable)]` so you don't need a hand-written `impl Injectable`.

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::parse::ParseStream;
use syn::{
    parse_macro_input, Data, DeriveInput, Expr, Field, Fields, GenericArgument, Ident,
    PathArguments, Token, Type,
};

/// Implements `Injectable` and registers the type with the injectable catalog.
///
/// Every field is a constructor parameter, in declaration order, and must be an `Arc<T>`;
/// `T` may be a trait object. `#[inject(Type)]` resolves the field through `Type`
/// instead of `T`, so `Arc<Type>` must coerce to the field (`Type` is `T` or implements it).
/// `#[inject(token = EXPR)]` resolves it through the injection token `EXPR`.
/// Requires `wiring_rs` as a dependency of the calling crate.
#[proc_macro_derive(Injectable, attributes(inject))]
pub fn derive_injectable(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    expand(&input)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}

enum Override {
    Type(Type),
    Token(Expr),
}

fn expand(input: &DeriveInput) -> syn::Result<TokenStream2> {
    let name = &input.ident;
    if !input.generics.params.is_empty() {
        return Err(syn::Error::new_spanned(
            &input.generics,
            "#[derive(Injectable)] does not support generic types; implement Injectable by hand",
        ));
    }
    let fields = match &input.data {
        Data::Struct(data) => &data.fields,
        _ => {
            return Err(syn::Error::new_spanned(
                name,
                "#[derive(Injectable)] can only be applied to structs",
            ))
        }
    };

    let mut parameters = Vec::new();
    let mut values = Vec::new();
    for field in fields {
        let inner = arc_inner(&field.ty).ok_or_else(|| {
            syn::Error::new_spanned(&field.ty, "injected fields must be of type Arc<T>")
        })?;
        // A type override is taken as that type; the field initializer coerces
        // it, e.g. `Arc<PgRepo>` into `Arc<dyn Repo>`.
        let (parameter, value) = match parse_override(field)? {
            None => (
                quote! { ::wiring_rs::Parameter::of::<#inner>() },
                quote! { args.next::<#inner>()? },
            ),
            Some(Override::Type(ty)) => (
                quote! {
                    ::wiring_rs::Parameter::of::<#inner>().inject(::wiring_rs::Key::of::<#ty>())
                },
                quote! { args.next::<#ty>()? },
            ),
            Some(Override::Token(expr)) => (
                quote! { ::wiring_rs::Parameter::of::<#inner>().inject((#expr).key()) },
                quote! { args.next::<#inner>()? },
            ),
        };
        parameters.push(parameter);
        values.push(value);
    }

    let body = match fields {
        Fields::Named(_) => {
            let names = fields.iter().map(|f| &f.ident);
            quote! { Self { #(#names: #values),* } }
        }
        Fields::Unnamed(_) => quote! { Self(#(#values),*) },
        Fields::Unit => quote! { Self },
    };

    Ok(quote! {
        impl ::wiring_rs::Injectable for #name {
            fn parameters() -> ::std::vec::Vec<::wiring_rs::Parameter> {
                ::std::vec![#(#parameters),*]
            }

            #[allow(unused_mut, unused_variables)]
            fn construct(
                mut args: ::wiring_rs::Arguments,
            ) -> ::std::result::Result<Self, ::wiring_rs::InjectError> {
                ::std::result::Result::Ok(#body)
            }
        }

        ::wiring_rs::inventory::submit! {
            ::wiring_rs::InjectableClass::new(::wiring_rs::ClassDescriptor::of::<#name>())
        }
    })
}

/// `T` for a field typed `Arc<T>` (any path ending in `Arc`).
fn arc_inner(ty: &Type) -> Option<&Type> {
    let Type::Path(path) = ty else {
        return None;
    };
    if path.qself.is_some() {
        return None;
    }
    let segment = path.path.segments.last()?;
    if segment.ident != "Arc" {
        return None;
    }
    let PathArguments::AngleBracketed(args) = &segment.arguments else {
        return None;
    };
    match args.args.first()? {
        GenericArgument::Type(inner) if args.args.len() == 1 => Some(inner),
        _ => None,
    }
}

fn parse_override(field: &Field) -> syn::Result<Option<Override>> {
    let mut found = None;
    for attr in field.attrs.iter().filter(|a| a.path().is_ident("inject")) {
        if found.is_some() {
            return Err(syn::Error::new_spanned(attr, "duplicate #[inject] attribute"));
        }
        found = Some(attr.parse_args_with(parse_override_args)?);
    }
    Ok(found)
}

fn parse_override_args(input: ParseStream) -> syn::Result<Override> {
    if input.peek(Ident) && input.peek2(Token![=]) {
        let ident: Ident = input.parse()?;
        if ident != "token" {
            return Err(syn::Error::new(
                ident.span(),
                "expected `token = EXPR` or a type",
            ));
        }
        input.parse::<Token![=]>()?;
        Ok(Override::Token(input.parse()?))
    } else {
        Ok(Override::Type(input.parse()?))
    }
}
