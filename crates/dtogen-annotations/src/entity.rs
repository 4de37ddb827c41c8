// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! `Entity` derive implementation.
//!
//! The derive itself stays deliberately small: it validates every marker
//! attribute the generator will later read from source and implements
//! [`StoredEntity`] for the struct. DTOs and the conversion service are not
//! produced here; they are emitted by the `dtogen` build-time generator,
//! which parses the annotated source files directly.
//!
//! # Id resolution
//!
//! The `StoredEntity::id` body is picked in order:
//!
//! 1. the field marked `#[id]`
//! 2. a field literally named `id`
//! 3. with `#[entity(extends = "Parent")]`, delegation through the embedded
//!    parent field
//!
//! [`StoredEntity`]: https://docs.rs/dtogen-core

use darling::{FromDeriveInput, FromMeta};
use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::{Data, DeriveInput, Field, Fields, Type, parse_macro_input, punctuated::Punctuated, token::Comma};

use crate::attrs::{
    ConventionalQueryAttr, DtoFieldAttr, EntityAttrs, NativeQueriesAttr, NativeQueryAttr,
    SyntheticFieldAttr,
};

/// Main entry point for the `Entity` derive macro.
pub fn derive(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    match generate(&input) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.write_errors().into(),
    }
}

/// Generate the `StoredEntity` impl after validating the marker surface.
fn generate(input: &DeriveInput) -> darling::Result<TokenStream2> {
    let fields = named_fields(input)?;
    let attrs = EntityAttrs::from_derive_input(input)?;

    let mut acc = darling::Error::accumulator();
    for attr in &input.attrs {
        if attr.path().is_ident("dto_extends") {
            acc.handle(SyntheticFieldAttr::from_meta(&attr.meta));
        } else if attr.path().is_ident("conventional_query") {
            acc.handle(ConventionalQueryAttr::from_meta(&attr.meta));
        } else if attr.path().is_ident("native_query") {
            acc.handle(NativeQueryAttr::from_meta(&attr.meta));
        } else if attr.path().is_ident("native_queries") {
            acc.handle(NativeQueriesAttr::from_meta(&attr.meta));
        }
    }
    for field in fields {
        for attr in &field.attrs {
            if attr.path().is_ident("dto") {
                acc.handle(DtoFieldAttr::from_meta(&attr.meta));
            }
        }
    }

    let id_body = acc.handle(id_body(input, &attrs, fields));
    let tokens = match id_body {
        Some(body) => stored_entity_impl(input, body),
        None => TokenStream2::new(),
    };

    acc.finish_with(tokens)
}

/// Extract named struct fields or reject the input shape.
fn named_fields(input: &DeriveInput) -> darling::Result<&Punctuated<Field, Comma>> {
    match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(named) => Ok(&named.named),
            _ => Err(darling::Error::custom("Entity fields must be named").with_span(&input.ident)),
        },
        _ => Err(
            darling::Error::custom("Entity can only be derived for structs")
                .with_span(&input.ident),
        ),
    }
}

/// Pick the expression used as the `StoredEntity::id` body.
fn id_body(
    input: &DeriveInput,
    attrs: &EntityAttrs,
    fields: &Punctuated<Field, Comma>,
) -> darling::Result<TokenStream2> {
    if let Some(field) = fields
        .iter()
        .find(|field| field.attrs.iter().any(|attr| attr.path().is_ident("id")))
    {
        let ident = &field.ident;
        return Ok(quote!(self.#ident));
    }

    if let Some(field) = fields
        .iter()
        .find(|field| field.ident.as_ref().is_some_and(|ident| ident == "id"))
    {
        let ident = &field.ident;
        return Ok(quote!(self.#ident));
    }

    if let Some(parent) = &attrs.extends {
        let parent_name = last_segment_name(parent);
        let embed = fields.iter().find(|field| {
            last_segment_name(&field.ty)
                .as_deref()
                .is_some_and(|name| Some(name) == parent_name.as_deref())
        });
        return match embed {
            Some(field) => {
                let ident = &field.ident;
                Ok(quote!(::dtogen_core::StoredEntity::id(&self.#ident)))
            }
            None => Err(darling::Error::custom(
                "`extends` requires an embedded parent field of the parent type",
            )
            .with_span(&input.ident)),
        };
    }

    Err(darling::Error::custom(
        "Entity requires an #[id] field, a field named `id`, or an `extends` parent",
    )
    .with_span(&input.ident))
}

/// Assemble the trait impl, mirroring the struct's generics.
fn stored_entity_impl(input: &DeriveInput, body: TokenStream2) -> TokenStream2 {
    let ident = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    quote! {
        impl #impl_generics ::dtogen_core::StoredEntity for #ident #ty_generics #where_clause {
            fn id(&self) -> i64 {
                #body
            }
        }
    }
}

/// Last path segment of a type, if it is a plain path.
fn last_segment_name(ty: &Type) -> Option<String> {
    match ty {
        Type::Path(path) => path
            .path
            .segments
            .last()
            .map(|segment| segment.ident.to_string()),
        _ => None,
    }
}
