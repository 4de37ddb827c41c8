// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Marker attribute schemas, generator side.
//!
//! The `dtogen-annotations` crate validates these shapes at derive time; the
//! generator never sees expanded macros, so it re-parses the same surface
//! from raw [`syn::Attribute`]s here. Markers are matched by the last path
//! segment, mirroring how bare type names resolve elsewhere in the model.

use darling::{FromMeta, util::Override};
use syn::{Attribute, Meta, Token, punctuated::Punctuated};

use crate::error::GeneratorError;

/// How an included relation field is represented on the DTO.
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

/// Struct-level `#[entity(...)]` marker.
#[derive(Debug, Clone, Default, FromMeta)]
pub struct EntityMarker {
    /// Abstract-ancestor marker: DTO only, no converter registration.
    #[darling(default)]
    pub base: bool,

    /// Parent entity reference, possibly parameterized.
    #[darling(default)]
    pub extends: Option<syn::Type>,
}

/// Field-level `#[dto(...)]` marker.
#[derive(Debug, Clone, Default, FromMeta)]
pub struct DtoFieldMarker {
    /// Keep this field off the DTO and out of the converter.
    #[darling(default)]
    pub exclude: bool,

    /// Include a relation field, optionally selecting a mode.
    #[darling(default)]
    pub include: Option<Override<AggregationMode>>,
}

impl DtoFieldMarker {
    /// Effective aggregation mode, if the field is included.
    ///
    /// A bare `#[dto(include)]` selects [`AggregationMode::Id`].
    #[must_use]
    pub fn mode(&self) -> Option<AggregationMode> {
        self.include.as_ref().map(|over| match over {
            Override::Explicit(mode) => *mode,
            Override::Inherit => AggregationMode::Id,
        })
    }

    fn merge(&mut self, other: Self) {
        self.exclude |= other.exclude;
        if self.include.is_none() {
            self.include = other.include;
        }
    }
}

/// Struct-level `#[dto_extends(...)]` synthetic field declaration.
#[derive(Debug, Clone, FromMeta)]
pub struct SyntheticMarker {
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

/// True when the attribute's last path segment matches `name`.
#[must_use]
pub fn is_marker(attr: &Attribute, name: &str) -> bool {
    attr.path()
        .segments
        .last()
        .is_some_and(|segment| segment.ident == name)
}

/// True when a `#[derive(...)]` list names `Entity`.
#[must_use]
pub fn derives_entity(attrs: &[Attribute]) -> bool {
    attrs
        .iter()
        .filter(|attr| attr.path().is_ident("derive"))
        .filter_map(|attr| {
            attr.parse_args_with(Punctuated::<syn::Path, Token![,]>::parse_terminated)
                .ok()
        })
        .flatten()
        .any(|path| {
            path.segments
                .last()
                .is_some_and(|segment| segment.ident == "Entity")
        })
}

/// Parses the entity marker, treating a bare `#[derive(Entity)]` without
/// `#[entity(...)]` as an unparameterized marker.
///
/// Returns `None` when the item carries neither form.
pub fn entity_marker_of(attrs: &[Attribute]) -> Result<Option<EntityMarker>, GeneratorError> {
    let explicit = attrs.iter().find(|attr| is_marker(attr, "entity"));
    match explicit {
        Some(attr) => match &attr.meta {
            Meta::Path(_) => Ok(Some(EntityMarker::default())),
            meta => Ok(Some(EntityMarker::from_meta(meta)?)),
        },
        None if derives_entity(attrs) => Ok(Some(EntityMarker::default())),
        None => Ok(None),
    }
}

/// Parses and merges every `#[dto(...)]` marker on a field.
pub fn dto_field_marker_of(attrs: &[Attribute]) -> Result<DtoFieldMarker, GeneratorError> {
    let mut merged = DtoFieldMarker::default();
    for attr in attrs.iter().filter(|attr| is_marker(attr, "dto")) {
        merged.merge(DtoFieldMarker::from_meta(&attr.meta)?);
    }
    Ok(merged)
}

/// Parses every `#[dto_extends(...)]` marker on a struct, in declaration
/// order.
pub fn synthetic_markers_of(attrs: &[Attribute]) -> Result<Vec<SyntheticMarker>, GeneratorError> {
    attrs
        .iter()
        .filter(|attr| is_marker(attr, "dto_extends"))
        .map(|attr| SyntheticMarker::from_meta(&attr.meta).map_err(GeneratorError::from))
        .collect()
}

/// True when the item carries the `#[dto_exclude]` marker.
#[must_use]
pub fn is_excluded(attrs: &[Attribute]) -> bool {
    attrs.iter().any(|attr| is_marker(attr, "dto_exclude"))
}

/// True when a method carries the `#[dto_method]` marker.
#[must_use]
pub fn is_dto_method(attrs: &[Attribute]) -> bool {
    attrs.iter().any(|attr| is_marker(attr, "dto_method"))
}
