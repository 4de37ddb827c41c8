// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Darling schemas for the annotation surface.
//!
//! Every attribute the generator later reads from source is validated here at
//! derive time, so a malformed marker fails the entity's own build instead of
//! a later generation run.
//!
//! # Schemas
//!
//! - [`EntityAttrs`] — struct-level `#[entity(...)]`
//! - [`DtoFieldAttr`] — field-level `#[dto(...)]`
//! - [`SyntheticFieldAttr`] — struct-level `#[dto_extends(...)]`
//! - [`ConventionalQueryAttr`] / [`NativeQueryAttr`] — repository query
//!   declarations

use darling::{FromDeriveInput, FromMeta, util::Override};
use syn::Ident;

/// How an included relation field is represented on the DTO.
///
/// Parsed from `#[dto(include = "...")]`; a bare `#[dto(include)]` selects
/// [`AggregationMode::Id`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, FromMeta)]
pub enum AggregationMode {
    /// Collapse the relation to its id (`owner` becomes `owner_id`).
    #[default]
    Id,

    /// Convert the relation into its own DTO.
    Dto,

    /// Copy an enum value or enum collection unchanged.
    Enum,
}

/// Entity-level attributes parsed from `#[entity(...)]`.
///
/// Both parameters are optional; a plain `#[derive(Entity)]` declares a
/// concrete root entity.
///
/// # Example
///
/// ```rust,ignore
/// #[derive(Entity)]
/// #[entity(base)]
/// pub struct AuditedEntity { ... }
///
/// #[derive(Entity)]
/// #[entity(extends = "AuditedEntity")]
/// pub struct User {
///     pub base: AuditedEntity,
///     ...
/// }
/// ```
#[derive(Debug, FromDeriveInput)]
#[darling(attributes(entity))]
pub struct EntityAttrs {
    /// Struct identifier (e.g., `User`).
    pub ident: Ident,

    /// Struct generics, mirrored onto the `StoredEntity` impl.
    pub generics: syn::Generics,

    /// Abstract-ancestor marker: the entity gets a DTO but no converter
    /// registration.
    #[darling(default)]
    pub base: bool,

    /// Parent entity reference, possibly parameterized.
    ///
    /// The struct must embed the parent in a field of exactly this type;
    /// inherited fields are reached through that field.
    #[darling(default)]
    pub extends: Option<syn::Type>,
}

/// Field-level attributes parsed from `#[dto(...)]`.
#[derive(Debug, Default, FromMeta)]
pub struct DtoFieldAttr {
    /// Keep this field off the DTO and out of the converter.
    #[darling(default)]
    pub exclude: bool,

    /// Include a relation field, optionally selecting a mode.
    ///
    /// `#[dto(include)]` defaults to id collapsing; `#[dto(include = "dto")]`
    /// and `#[dto(include = "enum")]` select the other modes.
    #[darling(default)]
    pub include: Option<Override<AggregationMode>>,
}

impl DtoFieldAttr {
    /// Effective aggregation mode, if the field is included.
    #[must_use]
    pub fn mode(&self) -> Option<AggregationMode> {
        self.include.as_ref().map(|over| match over {
            Override::Explicit(mode) => *mode,
            Override::Inherit => AggregationMode::Id,
        })
    }
}

/// One synthetic DTO field declared by `#[dto_extends(...)]`.
///
/// Synthetic fields have no source-field counterpart; the converter derives
/// their value by following `path` through the entity graph.
///
/// # Example
///
/// ```rust,ignore
/// #[dto_extends(name = "group_name", ty = "String", path = "group.name")]
/// #[dto_extends(name = "roles", ty = "Role", path = "group.roles", collection, is_enum)]
/// ```
#[derive(Debug, FromMeta)]
pub struct SyntheticFieldAttr {
    /// Target field name on the DTO.
    pub name: String,

    /// Base type of the synthetic field.
    pub ty: syn::Path,

    /// Dot-separated accessor chain evaluated against the entity.
    pub path: String,

    /// Wrap the declared type in `Vec<...>`.
    #[darling(default)]
    pub collection: bool,

    /// The declared type is an enum and must never be routed through the
    /// converter dispatch.
    #[darling(default)]
    pub is_enum: bool,

    /// Generic type parameters applied to the base type.
    #[darling(default)]
    pub type_params: darling::util::PathList,
}

/// One named, typed query parameter.
#[derive(Debug, FromMeta)]
pub struct QueryParamAttr {
    /// Parameter name.
    pub name: String,

    /// Parameter type.
    pub ty: syn::Type,
}

/// Parameter list parsed from `parameters(param(...), param(...))`.
#[derive(Debug, Default)]
pub struct QueryParams(pub Vec<QueryParamAttr>);

impl FromMeta for QueryParams {
    fn from_list(items: &[darling::ast::NestedMeta]) -> darling::Result<Self> {
        let mut params = Vec::with_capacity(items.len());
        for item in items {
            match item {
                darling::ast::NestedMeta::Meta(meta) if meta.path().is_ident("param") => {
                    params.push(QueryParamAttr::from_meta(meta)?);
                }
                darling::ast::NestedMeta::Meta(meta) => {
                    return Err(darling::Error::custom("expected `param(name = ..., ty = ...)`")
                        .with_span(meta));
                }
                darling::ast::NestedMeta::Lit(lit) => {
                    return Err(darling::Error::custom("expected `param(name = ..., ty = ...)`")
                        .with_span(lit));
                }
            }
        }
        Ok(Self(params))
    }
}

/// Declarative convention-named repository query.
///
/// Consumed by a downstream repository generator; this crate only validates
/// the shape.
#[derive(Debug, FromMeta)]
pub struct ConventionalQueryAttr {
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

/// Declarative native-query repository method.
#[derive(Debug, FromMeta)]
pub struct NativeQueryAttr {
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

/// Wrapper for several native queries on one entity.
#[derive(Debug, Default)]
pub struct NativeQueriesAttr(pub Vec<NativeQueryAttr>);

impl FromMeta for NativeQueriesAttr {
    fn from_list(items: &[darling::ast::NestedMeta]) -> darling::Result<Self> {
        let mut queries = Vec::with_capacity(items.len());
        for item in items {
            match item {
                darling::ast::NestedMeta::Meta(meta) if meta.path().is_ident("native_query") => {
                    queries.push(NativeQueryAttr::from_meta(meta)?);
                }
                darling::ast::NestedMeta::Meta(meta) => {
                    return Err(
                        darling::Error::custom("expected `native_query(...)`").with_span(meta)
                    );
                }
                darling::ast::NestedMeta::Lit(lit) => {
                    return Err(
                        darling::Error::custom("expected `native_query(...)`").with_span(lit)
                    );
                }
            }
        }
        Ok(Self(queries))
    }
}

fn default_true() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use syn::parse_quote;

    use super::*;

    fn meta_of(attr: syn::Attribute) -> syn::Meta {
        attr.meta
    }

    #[test]
    fn dto_include_defaults_to_id() {
        let attr: syn::Attribute = parse_quote!(#[dto(include)]);
        let parsed = DtoFieldAttr::from_meta(&meta_of(attr)).expect("parse");
        assert_eq!(parsed.mode(), Some(AggregationMode::Id));
        assert!(!parsed.exclude);
    }

    #[test]
    fn dto_include_explicit_mode() {
        let attr: syn::Attribute = parse_quote!(#[dto(include = "dto")]);
        let parsed = DtoFieldAttr::from_meta(&meta_of(attr)).expect("parse");
        assert_eq!(parsed.mode(), Some(AggregationMode::Dto));
    }

    #[test]
    fn dto_exclude_has_no_mode() {
        let attr: syn::Attribute = parse_quote!(#[dto(exclude)]);
        let parsed = DtoFieldAttr::from_meta(&meta_of(attr)).expect("parse");
        assert!(parsed.exclude);
        assert_eq!(parsed.mode(), None);
    }

    #[test]
    fn synthetic_field_full_form() {
        let attr: syn::Attribute = parse_quote!(#[dto_extends(
            name = "group_name",
            ty = "String",
            path = "group.name",
            collection,
            type_params(Role)
        )]);
        let parsed = SyntheticFieldAttr::from_meta(&meta_of(attr)).expect("parse");
        assert_eq!(parsed.name, "group_name");
        assert_eq!(parsed.path, "group.name");
        assert!(parsed.collection);
        assert!(!parsed.is_enum);
        assert_eq!(parsed.type_params.len(), 1);
    }

    #[test]
    fn conventional_query_defaults() {
        let attr: syn::Attribute = parse_quote!(#[conventional_query(name = "find_by_login")]);
        let parsed = ConventionalQueryAttr::from_meta(&meta_of(attr)).expect("parse");
        assert_eq!(parsed.name, "find_by_login");
        assert!(parsed.is_collection);
        assert!(parsed.is_sortable);
        assert!(!parsed.is_pageable);
        assert!(!parsed.is_transactional);
        assert!(parsed.result_type.is_none());
        assert!(parsed.parameters.0.is_empty());
    }

    #[test]
    fn native_queries_wrap_several() {
        let attr: syn::Attribute = parse_quote!(#[native_queries(
            native_query(query = "SELECT 1", name = "one"),
            native_query(query = "DELETE FROM t", name = "wipe", is_modifying)
        )]);
        let parsed = NativeQueriesAttr::from_meta(&meta_of(attr)).expect("parse");
        assert_eq!(parsed.0.len(), 2);
        assert!(!parsed.0[0].is_modifying);
        assert!(parsed.0[1].is_modifying);
    }

    #[test]
    fn query_params_reject_unknown_items() {
        let attr: syn::Attribute =
            parse_quote!(#[conventional_query(name = "q", parameters(bogus(name = "x")))]);
        assert!(ConventionalQueryAttr::from_meta(&meta_of(attr)).is_err());
    }
}
