// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! DTO emission.
//!
//! One file per entity: a struct with private fields, a `new()` constructor
//! initializing optional scalars to `None` and collections to their own
//! empty constructor, an accessor pair per field, mirrored associated
//! consts, copied field attributes, optionally mirrored `#[dto_method]`
//! methods, and trait impls for the configured interfaces and the entity's
//! managed marker traits.
//!
//! Field shapes follow one rule: scalars are `Option`-wrapped (never
//! doubly), collections stay bare. Id-collapsed relations rename to
//! `<name>_id` / `<name>_ids` and retype to `Option<i64>` / `Vec<i64>`;
//! DTO-projected relations retype to the renamed DTO (collections normalize
//! to `Vec`, the one shape every DTO supports); enum relations keep the
//! source shape.

use std::collections::HashSet;

use proc_macro2::TokenStream;
use quote::{ToTokens, quote};
use syn::{Ident, Type};
use tracing::{debug, warn};

use super::{EmitContext, id_type, ident_type, init_expr, option_of, vec_of, wrapped};
use crate::{
    collect::{CollectedField, EntityPlan, FieldKind, RunStats},
    config::GeneratorConfig,
    model::{AggregationMode, AnnotationInstance, SourceModel, TypeKind},
    names,
};

/// What the converter emitter needs to know about an emitted DTO.
#[derive(Debug)]
pub(crate) struct DtoShape {
    pub(crate) ident: Ident,
    pub(crate) fields: Vec<DtoFieldShape>,
}

/// One emitted DTO field, addressed by its source field name.
#[derive(Debug)]
pub(crate) struct DtoFieldShape {
    pub(crate) source: String,
    pub(crate) setter: Ident,
}

impl DtoShape {
    /// The setter for a source field, when the DTO carries it.
    pub(crate) fn setter_for(&self, source: &Ident) -> Option<&Ident> {
        self.fields
            .iter()
            .find(|field| source == field.source.as_str())
            .map(|field| &field.setter)
    }
}

struct EmittedField {
    ident: Ident,
    ty: Type,
    attrs: TokenStream,
    source: Ident,
}

/// Emits the DTO file for one entity plan.
pub(crate) fn emit_dto(
    model: &SourceModel,
    config: &GeneratorConfig,
    plan: &EntityPlan<'_>,
    stats: &mut RunStats,
) -> (TokenStream, DtoShape) {
    let mut ctx = EmitContext::new(model, config);
    let entity = plan.entity;
    ctx.set_type_params(&entity.generics);
    let dto_name = ctx.dto_name(&entity.ident);
    let dto_ident = names::ident(&dto_name);

    let mut emitted: Vec<EmittedField> = Vec::new();
    let mut taken: HashSet<String> = HashSet::new();
    for field in &plan.fields {
        let Some(out) = emit_field(&mut ctx, entity.module_path.as_slice(), field) else {
            warn!(
                entity = %entity.ident,
                field = %field.name,
                "field type has no generated-space representation"
            );
            stats.skipped_members += 1;
            continue;
        };
        if !taken.insert(out.ident.to_string()) {
            warn!(
                entity = %entity.ident,
                field = %out.ident,
                "renamed field collides with an existing field"
            );
            stats.skipped_members += 1;
            continue;
        }
        emitted.push(out);
    }

    let generics = ctx.map_generics(&entity.generics, &entity.module_path);
    let (impl_generics, ty_generics, where_clause) = generics.split_for_impl();

    let declarations = emitted.iter().map(|field| {
        let EmittedField { ident, ty, attrs, .. } = field;
        quote! { #attrs #ident: #ty, }
    });
    let inits = emitted.iter().map(|field| {
        let ident = &field.ident;
        let init = init_expr(&field.ty);
        quote! { #ident: #init, }
    });
    let accessors = emitted.iter().map(|field| {
        let EmittedField { ident, ty, .. } = field;
        let getter = names::getter_name(ident, ty);
        let setter = names::setter_name(ident);
        quote! {
            #[must_use]
            pub fn #getter(&self) -> &#ty {
                &self.#ident
            }
            pub fn #setter(&mut self, value: #ty) {
                self.#ident = value;
            }
        }
    });
    let consts = plan.consts.iter().map(|constant| {
        let ident = &constant.ident;
        let ty = &constant.ty;
        let expr = &constant.expr;
        quote! { pub const #ident: #ty = #expr; }
    });
    let methods = mirrored_methods(&mut ctx, plan, stats);
    let trait_impls = trait_impls(&mut ctx, plan, &dto_ident, &generics);

    let derives = &config.dto_derives;
    let derive_attr = if derives.is_empty() {
        quote!()
    } else {
        quote! { #[derive(#(#derives),*)] }
    };
    let doc = format!(" Data transfer object generated from the `{}` entity.", entity.ident);

    let shape = DtoShape {
        ident: dto_ident.clone(),
        fields: emitted
            .iter()
            .map(|field| DtoFieldShape {
                source: field.source.to_string(),
                setter: names::setter_name(&field.ident),
            })
            .collect(),
    };

    // imports are drained last, after every type reference is recorded
    let imports = ctx.imports(Some(&dto_name));
    let tokens = quote! {
        #imports

        #[doc = #doc]
        #derive_attr
        pub struct #dto_ident #generics #where_clause {
            #(#declarations)*
        }

        impl #impl_generics #dto_ident #ty_generics #where_clause {
            #(#consts)*

            /// Creates an instance with every field at its initial value.
            #[must_use]
            pub fn new() -> Self {
                Self {
                    #(#inits)*
                }
            }

            #(#accessors)*
            #(#methods)*
        }

        impl #impl_generics Default for #dto_ident #ty_generics #where_clause {
            fn default() -> Self {
                Self::new()
            }
        }

        #(#trait_impls)*
    };

    (tokens, shape)
}

/// The DTO-side name and type for one collected field.
fn emit_field(
    ctx: &mut EmitContext<'_>,
    from_module: &[String],
    field: &CollectedField,
) -> Option<EmittedField> {
    let unwrapped = names::option_inner(&field.ty).unwrap_or(&field.ty);
    let (ident, ty) = match &field.kind {
        FieldKind::Copy => {
            let mapped = ctx.map_type(unwrapped, from_module)?;
            let ty = if names::is_collection_type(unwrapped) {
                mapped
            } else {
                option_of(mapped)
            };
            (field.name.clone(), ty)
        }
        FieldKind::Relation {
            mode: AggregationMode::Id,
            collection,
            ..
        } => {
            let base = field.name.to_string();
            let base = base.strip_prefix("r#").unwrap_or(&base);
            if *collection {
                (names::ident(&format!("{base}_ids")), vec_of(id_type()))
            } else {
                (names::ident(&format!("{base}_id")), option_of(id_type()))
            }
        }
        FieldKind::Relation {
            mode: AggregationMode::Dto,
            target,
            collection,
            ..
        } => {
            let dto = ident_type(ctx.dto_ref(target));
            let ty = if *collection { vec_of(dto) } else { option_of(dto) };
            (field.name.clone(), ty)
        }
        FieldKind::Relation {
            mode: AggregationMode::Enum,
            target,
            collection,
            ..
        } => {
            let element = ident_type(ctx.entity_ref(target));
            let ty = if *collection {
                let head = names::type_ident(unwrapped)?.clone();
                names::canonical_type(&wrapped(head, element))
            } else {
                option_of(element)
            };
            (field.name.clone(), ty)
        }
        FieldKind::Synthetic(synth) => {
            let ty = if let Some(target) = &synth.target {
                let dto = ident_type(ctx.dto_ref(target));
                if synth.collection { vec_of(dto) } else { option_of(dto) }
            } else {
                let mapped = ctx
                    .map_type(&synth.declared, from_module)
                    .or_else(|| passes_verbatim(&synth.declared).then(|| synth.declared.clone()))?;
                if synth.collection { mapped } else { option_of(mapped) }
            };
            (field.name.clone(), ty)
        }
    };

    Some(EmittedField {
        ident,
        ty,
        attrs: copied_attrs(ctx, field),
        source: field.name.clone(),
    })
}

/// Declared synthetic types outside the model pass through only when fully
/// qualified; a bare unknown name could not be resolved by generated code.
fn passes_verbatim(ty: &Type) -> bool {
    let inner = names::option_inner(ty)
        .or_else(|| names::collection_element(ty))
        .unwrap_or(ty);
    match inner {
        Type::Path(type_path) => type_path.path.segments.len() > 1,
        _ => false,
    }
}

/// Field attributes matching the inclusion mask, re-rendered structurally.
fn copied_attrs(ctx: &EmitContext<'_>, field: &CollectedField) -> TokenStream {
    let mut out = TokenStream::new();
    for attr in &field.attrs {
        let path = attr
            .path()
            .segments
            .iter()
            .map(|segment| segment.ident.to_string())
            .collect::<Vec<_>>()
            .join("::");
        if !ctx.config.attribute_inclusion_mask.is_match(&path) {
            continue;
        }
        match AnnotationInstance::from_attribute(attr) {
            Ok(instance) => instance.to_tokens(&mut out),
            Err(_) => warn!(
                field = %field.name,
                attribute = %path,
                "attribute matches the inclusion mask but has an unsupported shape"
            ),
        }
    }
    out
}

/// `#[dto_method]` methods with signatures mapped into generated space.
fn mirrored_methods(
    ctx: &mut EmitContext<'_>,
    plan: &EntityPlan<'_>,
    stats: &mut RunStats,
) -> Vec<TokenStream> {
    if !ctx.config.mirror_methods {
        return Vec::new();
    }
    let entity = plan.entity;
    let mut out = Vec::new();
    for method in &entity.methods {
        if !method.dto_method {
            continue;
        }
        let Some(sig) = mapped_signature(ctx, &method.sig, &entity.module_path) else {
            warn!(
                entity = %entity.ident,
                method = %method.sig.ident,
                "mirrored method has a type with no generated-space mapping"
            );
            stats.skipped_members += 1;
            continue;
        };
        let vis = if method.readable { quote!(pub) } else { quote!() };
        let block = &method.block;
        // the body is an opaque payload, assumed DTO-compatible as written
        out.push(quote! { #vis #sig #block });
    }
    out
}

fn mapped_signature(
    ctx: &mut EmitContext<'_>,
    sig: &syn::Signature,
    from_module: &[String],
) -> Option<syn::Signature> {
    let mut mapped = sig.clone();
    for input in &mut mapped.inputs {
        if let syn::FnArg::Typed(arg) = input {
            *arg.ty = ctx.map_type(&arg.ty, from_module)?;
        }
    }
    if let syn::ReturnType::Type(_, ty) = &mut mapped.output {
        **ty = ctx.map_type(ty, from_module)?;
    }
    Some(mapped)
}

/// Impls for configured interfaces plus the entity's managed marker traits.
fn trait_impls(
    ctx: &mut EmitContext<'_>,
    plan: &EntityPlan<'_>,
    dto_ident: &Ident,
    generics: &syn::Generics,
) -> Vec<TokenStream> {
    let entity = plan.entity;
    let (impl_generics, ty_generics, where_clause) = generics.split_for_impl();
    let mut out = Vec::new();

    for path in &ctx.config.dto_interfaces {
        out.push(quote! {
            impl #impl_generics #path for #dto_ident #ty_generics #where_clause {}
        });
    }

    for trait_path in &entity.implemented_traits {
        let Some(target) = ctx.model.resolve(trait_path, &entity.module_path) else {
            continue;
        };
        if target.kind != TypeKind::Trait
            || target.excluded
            || !ctx.model.is_managed(target, ctx.config.base_module.as_deref())
        {
            continue;
        }
        if !target.marker_trait {
            debug!(
                entity = %entity.ident,
                implemented = %target.ident,
                "trait has required items and is not mirrored"
            );
            continue;
        }
        let entity_path = &ctx.config.entity_path;
        let ident = &target.ident;
        out.push(quote! {
            impl #impl_generics #entity_path::#ident for #dto_ident #ty_generics #where_clause {}
        });
    }

    out
}
