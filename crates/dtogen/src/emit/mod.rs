// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Shared emission machinery.
//!
//! Both emitters build `proc_macro2::TokenStream`s through an
//! [`EmitContext`], which maps entity-space types into the generated
//! module's space and tracks which generated DTOs and which entity-space
//! types a file references, so each file opens with exactly the `use` lines
//! it needs. Generated code references entities one level below the
//! configured entity path, so that path must re-export every referenced
//! entity and enum.

pub(crate) mod converter;
pub(crate) mod dto;

use std::collections::BTreeSet;

use proc_macro2::TokenStream;
use quote::quote;
use syn::{GenericArgument, Ident, PathArguments, Type};

use crate::{
    config::GeneratorConfig,
    model::{SourceModel, TypeKind},
    names,
};

/// Per-file emission state: type mapping plus import tracking.
pub(crate) struct EmitContext<'a> {
    pub(crate) model: &'a SourceModel,
    pub(crate) config: &'a GeneratorConfig,
    used_dtos: BTreeSet<String>,
    used_entities: BTreeSet<String>,
    type_params: BTreeSet<String>,
}

impl<'a> EmitContext<'a> {
    pub(crate) fn new(model: &'a SourceModel, config: &'a GeneratorConfig) -> Self {
        Self {
            model,
            config,
            used_dtos: BTreeSet::new(),
            used_entities: BTreeSet::new(),
            type_params: BTreeSet::new(),
        }
    }

    /// Declares the generic parameters in scope, so they survive mapping.
    pub(crate) fn set_type_params(&mut self, generics: &syn::Generics) {
        self.type_params = generics
            .type_params()
            .map(|param| param.ident.to_string())
            .collect();
    }

    /// DTO type name for an entity, per the configured affixes.
    pub(crate) fn dto_name(&self, source: &Ident) -> String {
        let (prefix, suffix, postfix) = self.config.dto_affixes();
        names::prepare_type_name(&source.to_string(), prefix, suffix, postfix)
    }

    /// References a generated DTO, recording the import.
    pub(crate) fn dto_ref(&mut self, source: &Ident) -> Ident {
        let name = self.dto_name(source);
        self.used_dtos.insert(name.clone());
        names::ident(&name)
    }

    /// References an entity-space type, recording the import.
    pub(crate) fn entity_ref(&mut self, source: &Ident) -> Ident {
        self.used_entities.insert(source.to_string());
        source.clone()
    }

    /// Maps an entity-space type into the generated module's space.
    ///
    /// Simple types are canonicalized, `Option` and collections recurse into
    /// their element, managed entities become their DTO names, managed enums
    /// stay themselves and are imported from the entity path. `None` means
    /// the type has no representation in generated code.
    pub(crate) fn map_type(&mut self, ty: &Type, from_module: &[String]) -> Option<Type> {
        if let Some(inner) = names::option_inner(ty) {
            return Some(option_of(self.map_type(inner, from_module)?));
        }
        if names::is_collection_type(ty) {
            let element = self.map_type(names::collection_element(ty)?, from_module)?;
            let head = names::type_ident(ty)?.clone();
            return Some(names::canonical_type(&wrapped(head, element)));
        }
        if names::is_simple_type(ty) {
            return Some(names::canonical_type(ty));
        }
        if let Type::Path(type_path) = ty
            && type_path.qself.is_none()
            && type_path.path.segments.len() == 1
            && type_path.path.segments[0].arguments.is_none()
        {
            let ident = &type_path.path.segments[0].ident;
            if ident == "Self" || self.type_params.contains(&ident.to_string()) {
                return Some(ty.clone());
            }
        }
        let target = self.model.resolve_type(ty, from_module)?;
        if target.excluded || !self.model.is_managed(target, self.config.base_module.as_deref())
        {
            return None;
        }
        match target.kind {
            TypeKind::Struct if target.is_entity() => {
                let ident = self.dto_ref(&target.ident);
                Some(ident_type(ident))
            }
            TypeKind::Enum => {
                let ident = self.entity_ref(&target.ident);
                Some(ident_type(ident))
            }
            _ => None,
        }
    }

    /// Mirrors generics onto the DTO, renaming managed trait bounds into the
    /// configured DTO path.
    pub(crate) fn map_generics(
        &self,
        generics: &syn::Generics,
        from_module: &[String],
    ) -> syn::Generics {
        let mut mapped = generics.clone();
        for param in &mut mapped.params {
            if let syn::GenericParam::Type(type_param) = param {
                for bound in &mut type_param.bounds {
                    self.map_bound(bound, from_module);
                }
            }
        }
        if let Some(where_clause) = &mut mapped.where_clause {
            for predicate in &mut where_clause.predicates {
                if let syn::WherePredicate::Type(predicate) = predicate {
                    for bound in &mut predicate.bounds {
                        self.map_bound(bound, from_module);
                    }
                }
            }
        }
        mapped
    }

    fn map_bound(&self, bound: &mut syn::TypeParamBound, from_module: &[String]) {
        let syn::TypeParamBound::Trait(trait_bound) = bound else {
            return;
        };
        let Some(target) = self.model.resolve(&trait_bound.path, from_module) else {
            return;
        };
        if target.kind != TypeKind::Trait
            || target.excluded
            || !self.model.is_managed(target, self.config.base_module.as_deref())
        {
            return;
        }
        let mut path = self.config.dto_path.clone();
        path.segments
            .push(syn::PathSegment::from(names::ident(&self.dto_name(&target.ident))));
        trait_bound.path = path;
    }

    /// Import lines for the file assembled so far, draining the tracked
    /// references. `own` keeps the file's own type out of its imports.
    pub(crate) fn imports(&mut self, own: Option<&str>) -> TokenStream {
        let dtos: Vec<Ident> = std::mem::take(&mut self.used_dtos)
            .into_iter()
            .filter(|name| own != Some(name.as_str()))
            .map(|name| names::ident(&name))
            .collect();
        let entities: Vec<Ident> = std::mem::take(&mut self.used_entities)
            .iter()
            .map(|name| names::ident(name))
            .collect();

        let mut lines = TokenStream::new();
        match dtos.as_slice() {
            [] => {}
            [one] => lines.extend(quote! { use super::#one; }),
            many => lines.extend(quote! { use super::{#(#many),*}; }),
        }
        if !entities.is_empty() {
            let entity_path = &self.config.entity_path;
            match entities.as_slice() {
                [one] => lines.extend(quote! { use #entity_path::#one; }),
                many => lines.extend(quote! { use #entity_path::{#(#many),*}; }),
            }
        }
        lines
    }
}

/// `Option<inner>`.
pub(crate) fn option_of(inner: Type) -> Type {
    wrapped(names::ident("Option"), inner)
}

/// `Vec<inner>`.
pub(crate) fn vec_of(inner: Type) -> Type {
    wrapped(names::ident("Vec"), inner)
}

/// Bare `i64`, the identifier type collapsed relations use.
pub(crate) fn id_type() -> Type {
    ident_type(names::ident("i64"))
}

/// A bare single-segment type.
pub(crate) fn ident_type(ident: Ident) -> Type {
    Type::Path(syn::TypePath {
        qself: None,
        path: syn::Path::from(ident),
    })
}

/// `head<inner>` for a single-segment collection or wrapper head.
pub(crate) fn wrapped(head: Ident, inner: Type) -> Type {
    let mut segment = syn::PathSegment::from(head);
    segment.arguments = PathArguments::AngleBracketed(syn::AngleBracketedGenericArguments {
        colon2_token: None,
        lt_token: Default::default(),
        args: [GenericArgument::Type(inner)].into_iter().collect(),
        gt_token: Default::default(),
    });
    Type::Path(syn::TypePath {
        qself: None,
        path: segment.into(),
    })
}

/// Constructor expression for a DTO field: `None` for optional scalars, the
/// collection's own `new()` for bare collections.
pub(crate) fn init_expr(ty: &Type) -> TokenStream {
    if names::option_inner(ty).is_some() {
        return quote!(None);
    }
    if let Type::Path(type_path) = ty
        && names::is_collection_type(ty)
    {
        let mut path = type_path.path.clone();
        if let Some(segment) = path.segments.last_mut() {
            segment.arguments = PathArguments::None;
        }
        return quote!(#path::new());
    }
    quote!(None)
}

#[cfg(test)]
mod tests {
    use quote::ToTokens;
    use syn::parse_quote;

    use super::*;
    use crate::reader::read_sources;

    fn config() -> GeneratorConfig {
        GeneratorConfig::builder()
            .source_root("/unused")
            .output_dir("/unused")
            .build()
            .unwrap()
    }

    fn model() -> SourceModel {
        read_sources(&[(
            "domain.rs",
            r#"
                #[derive(Entity)]
                pub struct Group {
                    pub id: i64,
                }

                pub enum Role {
                    Admin,
                }

                pub trait Payload {}
            "#,
        )])
        .unwrap()
    }

    #[test]
    fn simple_types_canonicalize() {
        let model = model();
        let config = config();
        let mut ctx = EmitContext::new(&model, &config);
        let ty: Type = parse_quote!(DateTime<Utc>);
        let mapped = ctx.map_type(&ty, &[]).unwrap();
        assert_eq!(
            mapped.to_token_stream().to_string(),
            "chrono :: DateTime < chrono :: Utc >"
        );
    }

    #[test]
    fn entities_map_to_dto_names_and_are_imported() {
        let model = model();
        let config = config();
        let mut ctx = EmitContext::new(&model, &config);
        let ty: Type = parse_quote!(Vec<Group>);
        let mapped = ctx.map_type(&ty, &["domain".into()]).unwrap();
        assert_eq!(mapped.to_token_stream().to_string(), "Vec < GroupDto >");

        let imports = ctx.imports(None).to_string();
        assert!(imports.contains("use super :: GroupDto"));
    }

    #[test]
    fn enums_stay_themselves_under_the_entity_path() {
        let model = model();
        let config = config();
        let mut ctx = EmitContext::new(&model, &config);
        let ty: Type = parse_quote!(Option<Role>);
        let mapped = ctx.map_type(&ty, &["domain".into()]).unwrap();
        assert_eq!(mapped.to_token_stream().to_string(), "Option < Role >");

        let imports = ctx.imports(None).to_string();
        assert!(imports.contains("use crate :: domain :: Role"));
    }

    #[test]
    fn unknown_complex_types_do_not_map() {
        let model = model();
        let config = config();
        let mut ctx = EmitContext::new(&model, &config);
        let ty: Type = parse_quote!(Mystery);
        assert!(ctx.map_type(&ty, &["domain".into()]).is_none());
    }

    #[test]
    fn own_dto_is_kept_out_of_imports() {
        let model = model();
        let config = config();
        let mut ctx = EmitContext::new(&model, &config);
        let ty: Type = parse_quote!(Group);
        ctx.map_type(&ty, &["domain".into()]).unwrap();
        let imports = ctx.imports(Some("GroupDto")).to_string();
        assert!(imports.is_empty());
    }

    #[test]
    fn managed_trait_bounds_rename_into_dto_space() {
        let model = model();
        let config = config();
        let ctx = EmitContext::new(&model, &config);
        let generics: syn::Generics = parse_quote!(<T: Payload>);
        let mapped = ctx.map_generics(&generics, &["domain".into()]);
        assert_eq!(
            mapped.to_token_stream().to_string(),
            "< T : crate :: dto :: PayloadDto >"
        );
    }

    #[test]
    fn init_expressions_match_field_shapes() {
        let option: Type = parse_quote!(Option<String>);
        assert_eq!(init_expr(&option).to_string(), "None");

        let list: Type = parse_quote!(Vec<i64>);
        assert_eq!(init_expr(&list).to_string(), "Vec :: new ()");

        let set: Type = parse_quote!(std::collections::HashSet<String>);
        assert_eq!(
            init_expr(&set).to_string(),
            "std :: collections :: HashSet :: new ()"
        );
    }
}
