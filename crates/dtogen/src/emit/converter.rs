// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Conversion service emission.
//!
//! One file for the whole model: a `DtoConversionService` struct holding a
//! `TypeId`-keyed dispatch table, one typed convert method per concrete
//! entity, type-erased invokers feeding the table, and the generic entry
//! points with their differing absence policies.
//!
//! The build runs in two phases. Phase one walks the entity plans and emits
//! every typed method and invoker pair while accumulating registrations;
//! phase two emits the constructor from the complete registration list.
//! Every entity is registered twice, under its own `TypeId` and under
//! `Vec` of it, so a collection value entering `convert_to_dto` redirects
//! to element-wise list conversion without a separate entry point.

use proc_macro2::TokenStream;
use quote::quote;
use syn::{Ident, Type};
use tracing::{debug, warn};

use super::{EmitContext, dto::DtoShape};
use crate::{
    collect::{ChainStep, CollectedField, EntityPlan, FieldKind, RunStats, SyntheticPlan},
    config::GeneratorConfig,
    model::{AggregationMode, SourceModel, SourceType},
    names,
};

/// Emits the conversion service file over the whole set of entity plans.
pub(crate) fn emit_converter(
    model: &SourceModel,
    config: &GeneratorConfig,
    plans: &[(EntityPlan<'_>, DtoShape)],
    stats: &mut RunStats,
) -> TokenStream {
    let mut ctx = EmitContext::new(model, config);
    let error_ty = last_ident(&config.error_type);
    let trait_ident = last_ident(&config.entity_trait);

    let mut methods: Vec<TokenStream> = Vec::new();
    let mut invokers: Vec<TokenStream> = Vec::new();
    let mut registrations: Vec<TokenStream> = Vec::new();

    for (plan, shape) in plans {
        let entity = plan.entity;
        if entity.is_base() {
            debug!(entity = %entity.ident, "base type gets a DTO but no converter");
            continue;
        }
        if !entity.generics.params.is_empty() {
            debug!(entity = %entity.ident, "generic entity is not registered for dispatch");
            continue;
        }

        let entity_ident = ctx.entity_ref(&entity.ident);
        let dto_ident = ctx.dto_ref(&entity.ident);
        let method = names::ident(&format!(
            "convert_{}",
            names::module_file_stem(&entity.ident.to_string())
        ));

        let statements: Vec<TokenStream> = plan
            .fields
            .iter()
            .filter_map(|field| field_statement(&mut ctx, entity, field, shape, stats))
            .collect();
        methods.push(convert_method(
            config,
            &method,
            &entity_ident,
            &dto_ident,
            &error_ty,
            &statements,
        ));

        let invoke_ident = names::ident(&format!("{}ConverterInvoke", entity.ident));
        let list_invoke_ident = names::ident(&format!("{}ListConverterInvoke", entity.ident));
        let entity_name = entity.ident.to_string();
        let list_name = format!("Vec<{}>", entity.ident);
        invokers.push(quote! {
            struct #invoke_ident;

            impl ConverterInvoke for #invoke_ident {
                fn convert(
                    &self,
                    service: &DtoConversionService,
                    value: &dyn Any,
                ) -> Result<Box<dyn Any>, #error_ty> {
                    let value = value
                        .downcast_ref::<#entity_ident>()
                        .ok_or(#error_ty::UnexpectedType { expected: #entity_name })?;
                    Ok(Box::new(service.#method(value)?))
                }
            }

            struct #list_invoke_ident;

            impl ConverterInvoke for #list_invoke_ident {
                fn convert(
                    &self,
                    service: &DtoConversionService,
                    value: &dyn Any,
                ) -> Result<Box<dyn Any>, #error_ty> {
                    let records = value
                        .downcast_ref::<Vec<#entity_ident>>()
                        .ok_or(#error_ty::UnexpectedType { expected: #list_name })?;
                    let converted: Vec<#dto_ident> =
                        service.convert_to_dto_list(Some(records.as_slice()))?;
                    Ok(Box::new(converted))
                }
            }
        });
        registrations.push(quote! {
            converters.insert(TypeId::of::<#entity_ident>(), Box::new(#invoke_ident));
            converters.insert(TypeId::of::<Vec<#entity_ident> >(), Box::new(#list_invoke_ident));
        });
    }

    let table_binding = if registrations.is_empty() {
        quote!(let converters)
    } else {
        quote!(let mut converters)
    };
    let transactional = match (&config.transactional_attribute, config.annotate_list_method) {
        (Some(path), true) => quote! { #[#path] },
        _ => quote!(),
    };
    let use_error = use_line(&config.error_type);
    let use_trait = use_line(&config.entity_trait);
    // imports are drained last, after every type reference is recorded
    let imports = ctx.imports(None);

    quote! {
        use std::any::{Any, TypeId};
        use std::collections::HashMap;

        #use_error
        #use_trait
        #imports

        /// Entity to DTO conversion service.
        ///
        /// Dispatches on the runtime type of the value: every concrete
        /// entity is registered under its own `TypeId` and under `Vec` of
        /// it, so collections convert through the same entry point.
        pub struct DtoConversionService {
            converters: HashMap<TypeId, Box<dyn ConverterInvoke>>,
        }

        impl DtoConversionService {
            /// Creates the service with every concrete entity registered.
            #[must_use]
            pub fn new() -> Self {
                #table_binding: HashMap<TypeId, Box<dyn ConverterInvoke>> = HashMap::new();
                #(#registrations)*
                Self { converters }
            }

            #(#methods)*

            /// Converts one value through the dispatch table.
            ///
            /// An absent value passes through as `Ok(None)`. A `Vec` of
            /// entities hits its own registration and converts
            /// element-wise, yielding the corresponding `Vec` of DTOs.
            pub fn convert_to_dto<V, T>(&self, value: Option<&V>) -> Result<Option<T>, #error_ty>
            where
                V: Any,
                T: Any,
            {
                let Some(value) = value else {
                    return Ok(None);
                };
                let converter = self.converters.get(&TypeId::of::<V>()).ok_or(
                    #error_ty::ConverterNotFound {
                        type_name: std::any::type_name::<V>(),
                    },
                )?;
                let converted = converter.convert(self, value).map_err(|source| {
                    #error_ty::conversion_failed(std::any::type_name::<V>(), source)
                })?;
                match converted.downcast::<T>() {
                    Ok(dto) => Ok(Some(*dto)),
                    Err(_) => Err(#error_ty::UnexpectedType {
                        expected: std::any::type_name::<T>(),
                    }),
                }
            }

            /// Converts a collection element-wise.
            ///
            /// The collection itself must be present: an absent collection
            /// is an error here, unlike `convert_to_ids_list` which treats
            /// it as empty. Elements that convert to nothing are skipped.
            #transactional
            pub fn convert_to_dto_list<V, T>(
                &self,
                records: Option<&[V]>,
            ) -> Result<Vec<T>, #error_ty>
            where
                V: Any,
                T: Any,
            {
                let Some(records) = records else {
                    return Err(#error_ty::NullCollection);
                };
                let mut converted = Vec::with_capacity(records.len());
                for record in records {
                    if let Some(dto) = self.convert_to_dto(Some(record))? {
                        converted.push(dto);
                    }
                }
                Ok(converted)
            }

            /// Collapses entity references to their ids.
            ///
            /// An absent collection yields an empty `Vec`.
            #[must_use]
            pub fn convert_to_ids_list<E>(&self, records: Option<&[E]>) -> Vec<i64>
            where
                E: #trait_ident,
            {
                records
                    .map(|records| records.iter().map(|record| record.id()).collect())
                    .unwrap_or_default()
            }
        }

        impl Default for DtoConversionService {
            fn default() -> Self {
                Self::new()
            }
        }

        /// Type-erased conversion step stored in the dispatch table.
        trait ConverterInvoke: Send + Sync {
            fn convert(
                &self,
                service: &DtoConversionService,
                value: &dyn Any,
            ) -> Result<Box<dyn Any>, #error_ty>;
        }

        #(#invokers)*
    }
}

/// One typed convert method, optionally wrapped with timing prints.
fn convert_method(
    config: &GeneratorConfig,
    method: &Ident,
    entity_ident: &Ident,
    dto_ident: &Ident,
    error_ty: &Ident,
    statements: &[TokenStream],
) -> TokenStream {
    let doc = format!(" Converts a `{entity_ident}` into a `{dto_ident}`.");
    let binding = if statements.is_empty() {
        quote!(let dto)
    } else {
        quote!(let mut dto)
    };
    let profiling = config.profiling_enabled.then(|| {
        quote! { let started = std::time::Instant::now(); }
    });
    let report = config.profiling_enabled.then(|| {
        let label = method.to_string();
        quote! { println!("{} took {:?}", #label, started.elapsed()); }
    });
    quote! {
        #[doc = #doc]
        pub fn #method(&self, value: &#entity_ident) -> Result<#dto_ident, #error_ty> {
            #profiling
            #binding = #dto_ident::new();
            #(#statements)*
            #report
            Ok(dto)
        }
    }
}

/// One `dto.set_x(...)` statement for a collected field; `None` drops it.
fn field_statement(
    ctx: &mut EmitContext<'_>,
    entity: &SourceType,
    field: &CollectedField,
    shape: &DtoShape,
    stats: &mut RunStats,
) -> Option<TokenStream> {
    let Some(setter) = shape.setter_for(&field.name) else {
        // already reported when the DTO emitter dropped the field
        debug!(
            entity = %entity.ident,
            field = %field.name,
            "field has no DTO counterpart; not converted"
        );
        return None;
    };
    if !field.readable && !matches!(field.kind, FieldKind::Synthetic(_)) {
        warn!(
            entity = %entity.ident,
            field = %field.name,
            "field is not readable outside its module; left at its initial value"
        );
        stats.skipped_members += 1;
        return None;
    }

    let hops = &field.access;
    let name = &field.name;
    let place = quote!(value #(.#hops)* .#name);
    let optional = names::option_inner(&field.ty).is_some();
    let unwrapped = names::option_inner(&field.ty).unwrap_or(&field.ty);

    match &field.kind {
        FieldKind::Copy
        | FieldKind::Relation {
            mode: AggregationMode::Enum,
            ..
        } => Some(copy_statement(setter, &place, optional, unwrapped)),
        FieldKind::Relation {
            mode: AggregationMode::Id,
            collection,
            ..
        } => Some(id_statement(setter, &place, optional, *collection, unwrapped)),
        FieldKind::Relation {
            mode: AggregationMode::Dto,
            target,
            collection,
        } => dto_statement(
            ctx, entity, name, setter, &place, optional, target, *collection, unwrapped, stats,
        ),
        FieldKind::Synthetic(plan) => Some(synthetic_statement(ctx, setter, name, plan)),
    }
}

/// Cloned copy into the DTO, shaped by the field's optionality.
fn copy_statement(
    setter: &Ident,
    place: &TokenStream,
    optional: bool,
    unwrapped: &Type,
) -> TokenStream {
    if names::is_collection_type(unwrapped) {
        if optional {
            quote! { dto.#setter(#place.clone().unwrap_or_default()); }
        } else {
            quote! { dto.#setter(#place.clone()); }
        }
    } else if optional {
        quote! { dto.#setter(#place.clone()); }
    } else {
        quote! { dto.#setter(Some(#place.clone())); }
    }
}

/// Id collapsing: scalars map to the id, `Vec`s go through the ids helper,
/// other collection shapes collapse inline.
fn id_statement(
    setter: &Ident,
    place: &TokenStream,
    optional: bool,
    collection: bool,
    unwrapped: &Type,
) -> TokenStream {
    if !collection {
        return if optional {
            quote! { dto.#setter(#place.as_ref().map(|record| record.id())); }
        } else {
            quote! { dto.#setter(Some(#place.id())); }
        };
    }
    let vec_shaped = names::type_ident(unwrapped).is_some_and(|head| head == "Vec");
    if vec_shaped {
        if optional {
            quote! { dto.#setter(self.convert_to_ids_list(#place.as_deref())); }
        } else {
            quote! { dto.#setter(self.convert_to_ids_list(Some(#place.as_slice()))); }
        }
    } else if optional {
        quote! { dto.#setter(#place.iter().flatten().map(|record| record.id()).collect()); }
    } else {
        quote! { dto.#setter(#place.iter().map(|record| record.id()).collect()); }
    }
}

/// Nested DTO projection. Scalars and `Vec`s route through the dispatch
/// table; other collection shapes call the target's typed method directly,
/// which only exists for concrete entities.
#[allow(clippy::too_many_arguments)]
fn dto_statement(
    ctx: &mut EmitContext<'_>,
    entity: &SourceType,
    name: &Ident,
    setter: &Ident,
    place: &TokenStream,
    optional: bool,
    target: &Ident,
    collection: bool,
    unwrapped: &Type,
    stats: &mut RunStats,
) -> Option<TokenStream> {
    let dto_ty = ctx.dto_ref(target);
    let source = if optional {
        quote!(#place.as_ref())
    } else {
        quote!(Some(&#place))
    };
    if !collection {
        return Some(quote! {
            let #name: Option<#dto_ty> = self.convert_to_dto(#source)?;
            dto.#setter(#name);
        });
    }
    let vec_shaped = names::type_ident(unwrapped).is_some_and(|head| head == "Vec");
    if vec_shaped {
        return Some(quote! {
            let #name: Option<Vec<#dto_ty> > = self.convert_to_dto(#source)?;
            dto.#setter(#name.unwrap_or_default());
        });
    }
    let concrete = ctx
        .model
        .resolve(&syn::Path::from(target.clone()), &entity.module_path)
        .is_some_and(|ty| !ty.is_base() && ty.generics.params.is_empty());
    if !concrete {
        warn!(
            entity = %entity.ident,
            field = %name,
            target = %target,
            "collection target has no typed converter; field not converted"
        );
        stats.skipped_members += 1;
        return None;
    }
    let convert_fn = names::ident(&format!(
        "convert_{}",
        names::module_file_stem(&target.to_string())
    ));
    let iter = if optional {
        quote!(#place.iter().flatten())
    } else {
        quote!(#place.iter())
    };
    Some(quote! {
        let #name: Vec<#dto_ty> = #iter
            .map(|record| self.#convert_fn(record))
            .collect::<Result<_, _> >()?;
        dto.#setter(#name);
    })
}

/// Reads a getter chain and stores its value, converting through the
/// dispatch table when the declared type is a managed entity.
fn synthetic_statement(
    ctx: &mut EmitContext<'_>,
    setter: &Ident,
    name: &Ident,
    plan: &SyntheticPlan,
) -> TokenStream {
    let (chain, optional) = chain_value(&plan.steps);
    let Some(target) = &plan.target else {
        return match (plan.collection, optional) {
            (false, true) => quote! { dto.#setter(#chain.cloned()); },
            (false, false) => quote! { dto.#setter(Some(#chain.clone())); },
            (true, true) => quote! { dto.#setter(#chain.cloned().unwrap_or_default()); },
            (true, false) => quote! { dto.#setter(#chain.clone()); },
        };
    };
    let dto_ty = ctx.dto_ref(target);
    let source = if optional {
        chain
    } else {
        quote!(Some(&#chain))
    };
    if plan.collection {
        quote! {
            let #name: Option<Vec<#dto_ty>> = self.convert_to_dto(#source)?;
            dto.#setter(#name.unwrap_or_default());
        }
    } else {
        quote! {
            let #name: Option<#dto_ty> = self.convert_to_dto(#source)?;
            dto.#setter(#name);
        }
    }
}

/// Builds the chain expression, short-circuiting at each optional step.
///
/// Returns the expression and whether its value ended up optional: a plain
/// chain reads the place directly, while any optional step switches the
/// rest of the chain into `Option` combinators over references.
fn chain_value(steps: &[ChainStep]) -> (TokenStream, bool) {
    let mut expr = quote!(value);
    let mut optional = false;
    for step in steps {
        let segments = &step.segments;
        if !optional {
            expr = quote!(#expr #(.#segments)*);
            if step.optional {
                expr = quote!(#expr.as_ref());
                optional = true;
            }
        } else if step.optional {
            expr = quote!(#expr.and_then(|step| step #(.#segments)* .as_ref()));
        } else {
            expr = quote!(#expr.map(|step| &step #(.#segments)*));
        }
    }
    (expr, optional)
}

/// Simple name of a configured path, for references inside generated code.
fn last_ident(path: &syn::Path) -> Ident {
    path.segments
        .last()
        .map(|segment| segment.ident.clone())
        .unwrap_or_else(|| names::ident("ConversionError"))
}

/// `use` line bringing a configured path into the generated file's scope.
/// Single-ident paths are assumed already in scope and get none.
fn use_line(path: &syn::Path) -> TokenStream {
    if path.segments.len() > 1 || path.leading_colon.is_some() {
        quote! { use #path; }
    } else {
        quote!()
    }
}
