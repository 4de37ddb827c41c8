// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Source model of the scanned project.
//!
//! The generator never compiles user code. [`crate::model::SourceModel`] is
//! the whole picture it works from: every struct, enum and trait found under
//! the source roots, with markers parsed, inherent impls attached and
//! implemented traits recorded. Name resolution is deliberately simple (same
//! module first, then unique simple name) because generated references go
//! through configured paths, not through the scanned module tree.
//!
//! ```text
//!  source roots ──▶ reader ──▶ SourceModel ──▶ collector ──▶ emitters
//!                              (this module)
//! ```

mod annotation;
mod attrs;
mod query;

use std::collections::HashMap;

use syn::Ident;

pub use self::{
    annotation::{AnnotationInstance, AnnotationParam, AnnotationValue},
    attrs::{AggregationMode, DtoFieldMarker, EntityMarker, SyntheticMarker},
    query::{ConventionalQuery, NativeQuery, QueryDeclaration, QueryParam, QueryParams},
};
pub(crate) use self::attrs::{
    dto_field_marker_of, entity_marker_of, is_dto_method, is_excluded, is_marker,
    synthetic_markers_of,
};
pub(crate) use self::query::queries_of;
use crate::error::GeneratorError;

/// Kind of a model type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeKind {
    /// A struct; only structs can be entities.
    Struct,
    /// An enum, copied unchanged under enum aggregation.
    Enum,
    /// A trait, mirrorable onto DTOs when marker-shaped.
    Trait,
}

/// One type found under the source roots.
#[derive(Debug, Clone)]
pub struct SourceType {
    /// Type identifier.
    pub ident: Ident,
    /// Module path relative to its source root.
    pub module_path: Vec<String>,
    /// Struct, enum or trait.
    pub kind: TypeKind,
    /// Declared generics.
    pub generics: syn::Generics,
    /// Named fields, in declaration order. Empty for enums and traits.
    pub fields: Vec<SourceField>,
    /// Inherent methods attached from impl blocks.
    pub methods: Vec<SourceMethod>,
    /// Associated consts attached from impl blocks.
    pub consts: Vec<SourceConst>,
    /// Traits this type explicitly implements.
    pub implemented_traits: Vec<syn::Path>,
    /// Entity marker, when the type is a managed entity.
    pub entity: Option<EntityMarker>,
    /// Synthetic field declarations, in declaration order.
    pub synthetics: Vec<SyntheticMarker>,
    /// Declared query schemas, in declaration order.
    pub queries: Vec<QueryDeclaration>,
    /// True when the type carries `#[dto_exclude]`.
    pub excluded: bool,
    /// For traits: true when every item has a default, so an empty impl
    /// satisfies it.
    pub marker_trait: bool,
}

impl SourceType {
    /// Qualified name within the model, e.g. `domain::users::User`.
    #[must_use]
    pub fn qualified_name(&self) -> String {
        let mut name = self.module_path.join("::");
        if !name.is_empty() {
            name.push_str("::");
        }
        name.push_str(&self.ident.to_string());
        name
    }

    /// True when the type carries the entity marker.
    #[must_use]
    pub fn is_entity(&self) -> bool {
        self.entity.is_some()
    }

    /// True for base entities: DTO only, no converter registration.
    #[must_use]
    pub fn is_base(&self) -> bool {
        self.entity.as_ref().is_some_and(|marker| marker.base)
    }

    /// Parent entity reference, if any.
    #[must_use]
    pub fn extends(&self) -> Option<&syn::Type> {
        self.entity.as_ref().and_then(|marker| marker.extends.as_ref())
    }
}

/// One named field of a model struct.
#[derive(Debug, Clone)]
pub struct SourceField {
    /// Field identifier.
    pub ident: Ident,
    /// Declared type, as written.
    pub ty: syn::Type,
    /// True when the field is `pub` and generated code can read it.
    pub readable: bool,
    /// Parsed `#[dto(...)]` marker.
    pub dto: DtoFieldMarker,
    /// Remaining attributes, candidates for mask-based copying.
    pub attrs: Vec<syn::Attribute>,
}

impl SourceField {
    /// Structural view of the copyable attributes; unparseable attributes are
    /// silently dropped here and diagnosed by the emitter.
    #[must_use]
    pub fn annotations(&self) -> Vec<AnnotationInstance> {
        self.attrs
            .iter()
            .filter_map(|attr| AnnotationInstance::from_attribute(attr).ok())
            .collect()
    }
}

/// One inherent method attached to a model type.
#[derive(Debug, Clone)]
pub struct SourceMethod {
    /// Full signature, including receiver and generics.
    pub sig: syn::Signature,
    /// Method body, mirrored verbatim.
    pub block: syn::Block,
    /// True when the method is `pub`.
    pub readable: bool,
    /// True when the method carries `#[dto_method]`.
    pub dto_method: bool,
}

/// One associated const attached to a model type.
#[derive(Debug, Clone)]
pub struct SourceConst {
    /// Const identifier.
    pub ident: Ident,
    /// Declared type.
    pub ty: syn::Type,
    /// Initializer expression, mirrored verbatim.
    pub expr: syn::Expr,
    /// True when the const is `pub`.
    pub readable: bool,
}

/// Everything the generator knows about the scanned sources.
#[derive(Debug, Default)]
pub struct SourceModel {
    types: Vec<SourceType>,
    by_simple: HashMap<String, Vec<usize>>,
}

impl SourceModel {
    /// Reads every `.rs` file under the given roots into a model.
    ///
    /// # Errors
    ///
    /// Fails on unreadable files, unparseable Rust, malformed markers and
    /// duplicate qualified type names.
    pub fn read(roots: &[std::path::PathBuf]) -> Result<Self, GeneratorError> {
        crate::reader::read(roots)
    }

    /// Builds a model from pre-constructed types, validating name uniqueness.
    pub(crate) fn from_types(types: Vec<SourceType>) -> Result<Self, GeneratorError> {
        let mut model = Self::default();
        let mut seen = HashMap::new();
        for (index, ty) in types.iter().enumerate() {
            let qualified = ty.qualified_name();
            if seen.insert(qualified.clone(), index).is_some() {
                return Err(GeneratorError::DuplicateType { name: qualified });
            }
            model
                .by_simple
                .entry(ty.ident.to_string())
                .or_default()
                .push(index);
        }
        model.types = types;
        Ok(model)
    }

    /// All model types, in scan order.
    #[must_use]
    pub fn types(&self) -> &[SourceType] {
        &self.types
    }

    pub(crate) fn get(&self, index: usize) -> &SourceType {
        &self.types[index]
    }

    pub(crate) fn get_mut(&mut self, index: usize) -> &mut SourceType {
        &mut self.types[index]
    }

    /// Managed entities in deterministic order: simple name, then qualified
    /// name for ties. Excluded entities are filtered out.
    #[must_use]
    pub fn entities(&self, base_module: Option<&str>) -> Vec<&SourceType> {
        let mut entities: Vec<&SourceType> = self
            .types
            .iter()
            .filter(|ty| ty.kind == TypeKind::Struct && ty.is_entity() && !ty.excluded)
            .filter(|ty| is_managed_module(ty, base_module))
            .collect();
        entities.sort_by(|a, b| {
            a.ident
                .to_string()
                .cmp(&b.ident.to_string())
                .then_with(|| a.qualified_name().cmp(&b.qualified_name()))
        });
        entities
    }

    /// Resolves a written path against the model: same module first, then
    /// unique simple name. Multi-segment paths additionally require the
    /// written segments to be a suffix of the candidate's qualified path.
    #[must_use]
    pub fn resolve(&self, path: &syn::Path, from_module: &[String]) -> Option<&SourceType> {
        self.resolve_index(path, from_module).map(|index| &self.types[index])
    }

    pub(crate) fn resolve_index(&self, path: &syn::Path, from_module: &[String]) -> Option<usize> {
        let simple = path.segments.last()?.ident.to_string();
        let candidates = self.by_simple.get(&simple)?;

        let written: Vec<String> = path
            .segments
            .iter()
            .map(|segment| segment.ident.to_string())
            .collect();
        let matches: Vec<usize> = candidates
            .iter()
            .copied()
            .filter(|&index| {
                written.len() == 1 || path_suffix_matches(&self.types[index], &written)
            })
            .collect();

        if let Some(&index) = matches
            .iter()
            .find(|&&index| self.types[index].module_path == from_module)
        {
            return Some(index);
        }
        match matches.as_slice() {
            [index] => Some(*index),
            _ => None,
        }
    }

    /// Resolves a type position (e.g. a field type) to a model type. Looks
    /// through references; does not look through `Option` or collections.
    #[must_use]
    pub fn resolve_type(&self, ty: &syn::Type, from_module: &[String]) -> Option<&SourceType> {
        match ty {
            syn::Type::Path(type_path) if type_path.qself.is_none() => {
                self.resolve(&type_path.path, from_module)
            }
            syn::Type::Reference(reference) => self.resolve_type(&reference.elem, from_module),
            _ => None,
        }
    }

    /// True when the type falls under the configured base module, if any.
    #[must_use]
    pub fn is_managed(&self, ty: &SourceType, base_module: Option<&str>) -> bool {
        is_managed_module(ty, base_module)
    }

    /// Total number of declared query methods across the model.
    #[must_use]
    pub fn declared_queries(&self) -> usize {
        self.types.iter().map(|ty| ty.queries.len()).sum()
    }
}

fn is_managed_module(ty: &SourceType, base_module: Option<&str>) -> bool {
    let Some(base) = base_module else {
        return true;
    };
    let prefix: Vec<&str> = base.split("::").filter(|s| !s.is_empty()).collect();
    ty.module_path.len() >= prefix.len()
        && ty
            .module_path
            .iter()
            .zip(&prefix)
            .all(|(segment, wanted)| segment == wanted)
}

fn path_suffix_matches(ty: &SourceType, written: &[String]) -> bool {
    let mut qualified: Vec<&str> = ty.module_path.iter().map(String::as_str).collect();
    let ident = ty.ident.to_string();
    qualified.push(&ident);

    let mut written: Vec<&str> = written.iter().map(String::as_str).collect();
    // `crate::domain::User` written from inside the scanned tree: the
    // leading `crate` has no counterpart in root-relative module paths.
    if written.first() == Some(&"crate") {
        written.remove(0);
    }
    written.len() <= qualified.len() && qualified[qualified.len() - written.len()..] == written[..]
}
