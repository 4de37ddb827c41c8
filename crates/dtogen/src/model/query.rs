// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Declarative query schemas.
//!
//! Entities may declare repository-style query methods with
//! `#[conventional_query(...)]`, `#[native_query(...)]` and
//! `#[native_queries(...)]`. The generator does not emit repository code; it
//! parses the declarations into [`QueryDeclaration`] values, validates their
//! shape, and exposes them on the model for downstream tooling. Declaration
//! flags deliberately mirror the established conventions: queries return
//! collections and accept a sort order unless declared otherwise, and are
//! neither pageable nor transactional by default.

use darling::{FromMeta, ast::NestedMeta};
use syn::Attribute;

use crate::{error::GeneratorError, model::attrs::is_marker};

/// One named, typed query parameter.
#[derive(Debug, Clone, FromMeta)]
pub struct QueryParam {
    /// Parameter name.
    pub name: String,

    /// Parameter type.
    pub ty: syn::Type,
}

/// Parameter list parsed from `parameters(param(...), param(...))`.
#[derive(Debug, Clone, Default)]
pub struct QueryParams(pub Vec<QueryParam>);

impl FromMeta for QueryParams {
    fn from_list(items: &[NestedMeta]) -> darling::Result<Self> {
        let mut params = Vec::with_capacity(items.len());
        for item in items {
            match item {
                NestedMeta::Meta(meta) if meta.path().is_ident("param") => {
                    params.push(QueryParam::from_meta(meta)?);
                }
                NestedMeta::Meta(meta) => {
                    return Err(darling::Error::custom("expected `param(name = ..., ty = ...)`")
                        .with_span(meta));
                }
                NestedMeta::Lit(lit) => {
                    return Err(darling::Error::custom("expected `param(name = ..., ty = ...)`")
                        .with_span(lit));
                }
            }
        }
        Ok(Self(params))
    }
}

/// Convention-named query declaration.
#[derive(Debug, Clone, FromMeta)]
pub struct ConventionalQuery {
    /// Generated method name.
    pub name: String,

    /// Result element type; defaults to the entity itself.
    #[darling(default)]
    pub result_type: Option<syn::Type>,

    /// Whether the method returns a collection.
    #[darling(default = "default_true")]
    pub is_collection: bool,

    /// Whether the method accepts a page request.
    #[darling(default)]
    pub is_pageable: bool,

    /// Whether the method accepts a sort order.
    #[darling(default = "default_true")]
    pub is_sortable: bool,

    /// Whether the method runs inside a transaction.
    #[darling(default)]
    pub is_transactional: bool,

    /// Named, typed parameters.
    #[darling(default)]
    pub parameters: QueryParams,
}

/// Native-query declaration carrying a literal query string.
#[derive(Debug, Clone, FromMeta)]
pub struct NativeQuery {
    /// Literal query string.
    pub query: String,

    /// Generated method name.
    pub name: String,

    /// Result element type; defaults to the entity itself.
    #[darling(default)]
    pub result_type: Option<syn::Type>,

    /// Whether the method returns a collection.
    #[darling(default = "default_true")]
    pub is_collection: bool,

    /// Whether the method accepts a page request.
    #[darling(default)]
    pub is_pageable: bool,

    /// Whether the method runs inside a transaction.
    #[darling(default)]
    pub is_transactional: bool,

    /// Whether the query mutates data.
    #[darling(default)]
    pub is_modifying: bool,

    /// Named, typed parameters.
    #[darling(default)]
    pub parameters: QueryParams,
}

/// One query declared on an entity.
#[derive(Debug, Clone)]
pub enum QueryDeclaration {
    /// Derived from naming conventions.
    Conventional(ConventionalQuery),
    /// Carries a literal query string.
    Native(NativeQuery),
}

impl QueryDeclaration {
    /// Declared method name.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Conventional(query) => &query.name,
            Self::Native(query) => &query.name,
        }
    }
}

/// Parses every query declaration on an item, in declaration order.
///
/// `#[native_queries(...)]` groups are flattened into the same list as
/// standalone `#[native_query(...)]` markers.
pub fn queries_of(attrs: &[Attribute]) -> Result<Vec<QueryDeclaration>, GeneratorError> {
    let mut queries = Vec::new();
    for attr in attrs {
        if is_marker(attr, "conventional_query") {
            queries.push(QueryDeclaration::Conventional(ConventionalQuery::from_meta(
                &attr.meta,
            )?));
        } else if is_marker(attr, "native_query") {
            queries.push(QueryDeclaration::Native(NativeQuery::from_meta(&attr.meta)?));
        } else if is_marker(attr, "native_queries") {
            let metas = attr
                .parse_args_with(
                    syn::punctuated::Punctuated::<syn::Meta, syn::Token![,]>::parse_terminated,
                )
                .map_err(darling::Error::from)
                .map_err(GeneratorError::from)?;
            for meta in metas {
                if !meta.path().is_ident("native_query") {
                    return Err(darling::Error::custom("expected `native_query(...)`")
                        .with_span(&meta)
                        .into());
                }
                queries.push(QueryDeclaration::Native(NativeQuery::from_meta(&meta)?));
            }
        }
    }
    Ok(queries)
}

fn default_true() -> bool {
    true
}
