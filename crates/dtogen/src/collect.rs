// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Field collection.
//!
//! Walks an entity and its `extends` ancestry leaf-to-root and produces the
//! complete set of members the emitters expose: declared fields in
//! declaration order, ancestors after the leaf, synthetic fields last, all
//! de-duplicated by target name with the first occurrence winning. Generic
//! parameters of parameterized parents are substituted with the arguments
//! written at each `extends` hop, composed across hops.
//!
//! Collection is where the soft contract lives. A member that cannot be
//! carried, such as an unresolvable synthetic chain or a mode that
//! contradicts its target type, is logged and skipped rather than failing
//! the run.

use std::collections::{HashMap, HashSet};

use syn::{Ident, Type};
use tracing::{debug, warn};

use crate::{
    config::GeneratorConfig,
    model::{AggregationMode, SourceField, SourceModel, SourceType, SyntheticMarker, TypeKind},
    names,
};

/// Soft-skip counters carried through collection and emission.
#[derive(Debug, Default)]
pub(crate) struct RunStats {
    /// Members dropped with a diagnostic instead of failing the run.
    pub(crate) skipped_members: usize,
}

/// Everything the emitters need to know about one entity.
#[derive(Debug)]
pub(crate) struct EntityPlan<'m> {
    pub(crate) entity: &'m SourceType,
    pub(crate) fields: Vec<CollectedField>,
    pub(crate) consts: Vec<CollectedConst>,
}

/// One member of the generated DTO, with enough context to convert it.
#[derive(Debug)]
pub(crate) struct CollectedField {
    /// Source field name; also the DTO name unless id collapsing renames it.
    pub(crate) name: Ident,
    /// Declared type after generic substitution, entity space.
    pub(crate) ty: Type,
    /// Embed hops from the leaf entity to the declaring struct.
    pub(crate) access: Vec<Ident>,
    /// True when generated code can read the source field.
    pub(crate) readable: bool,
    /// Attributes eligible for mask-based copying.
    pub(crate) attrs: Vec<syn::Attribute>,
    pub(crate) kind: FieldKind,
}

/// Conversion strategy for a collected field.
#[derive(Debug)]
pub(crate) enum FieldKind {
    /// Simple value or collection of simple values, copied as-is.
    Copy,
    /// Included relation projected by aggregation mode.
    Relation {
        mode: AggregationMode,
        /// Simple name of the target type, already resolved in the model.
        target: Ident,
        /// True when the relation is a collection of targets.
        collection: bool,
    },
    /// Synthetic field fed by a getter chain.
    Synthetic(SyntheticPlan),
}

/// Resolved synthetic field declaration.
#[derive(Debug)]
pub(crate) struct SyntheticPlan {
    /// Getter chain from the leaf entity, one step per `.` segment.
    pub(crate) steps: Vec<ChainStep>,
    /// Declared type, entity space, composed from the marker.
    pub(crate) declared: Type,
    /// Entity the declared type resolves to, when the chain value is routed
    /// through the converter dispatch. `None` for enums and plain values.
    pub(crate) target: Option<Ident>,
    /// True when the composed declared type is a collection.
    pub(crate) collection: bool,
}

/// One resolved step of a getter chain.
#[derive(Debug)]
pub(crate) struct ChainStep {
    /// Field accesses for this step, embed hops included.
    pub(crate) segments: Vec<Ident>,
    /// True when the step's field is `Option`-wrapped and short-circuits.
    pub(crate) optional: bool,
}

/// Mirrored associated const.
#[derive(Debug)]
pub(crate) struct CollectedConst {
    pub(crate) ident: Ident,
    pub(crate) ty: Type,
    pub(crate) expr: syn::Expr,
}

/// Collects the member plan for one entity.
pub(crate) fn collect_entity<'m>(
    model: &'m SourceModel,
    entity: &'m SourceType,
    config: &GeneratorConfig,
    stats: &mut RunStats,
) -> EntityPlan<'m> {
    let mut fields: Vec<CollectedField> = Vec::new();
    let mut consts: Vec<CollectedConst> = Vec::new();
    let mut taken: HashSet<String> = HashSet::new();
    let mut synthetics: Vec<(&'m SourceType, &'m SyntheticMarker)> = Vec::new();

    let mut access: Vec<Ident> = Vec::new();
    let mut hops_readable = true;
    let mut substitution: HashMap<String, Type> = HashMap::new();
    let mut current = entity;

    loop {
        let embed = current.extends().and_then(|parent_ty| {
            embed_field(current, parent_ty).or_else(|| {
                warn!(
                    entity = %entity.ident,
                    ancestor = %current.ident,
                    "extends target has no embedded parent field; inherited members skipped"
                );
                stats.skipped_members += 1;
                None
            })
        });

        for field in &current.fields {
            if field.dto.exclude {
                continue;
            }
            if embed.is_some_and(|parent_field| parent_field.ident == field.ident) {
                continue;
            }
            if !taken.insert(field.ident.to_string()) {
                debug!(
                    entity = %entity.ident,
                    field = %field.ident,
                    "ancestor field shadowed by a nearer declaration"
                );
                continue;
            }

            let ty = substitute(&field.ty, &substitution);
            let Some(kind) =
                classify_field(model, current, entity, &field.ident, &ty, field.dto.mode(), config, stats)
            else {
                taken.remove(&field.ident.to_string());
                continue;
            };
            fields.push(CollectedField {
                name: field.ident.clone(),
                ty,
                access: access.clone(),
                readable: hops_readable && field.readable,
                attrs: field.attrs.clone(),
                kind,
            });
        }

        if !config.skip_static_fields {
            for constant in &current.consts {
                if !constant.readable {
                    debug!(
                        entity = %entity.ident,
                        name = %constant.ident,
                        "private const not mirrored"
                    );
                    continue;
                }
                if !taken.insert(constant.ident.to_string()) {
                    continue;
                }
                consts.push(CollectedConst {
                    ident: constant.ident.clone(),
                    ty: constant.ty.clone(),
                    expr: constant.expr.clone(),
                });
            }
        }

        for marker in &current.synthetics {
            synthetics.push((current, marker));
        }

        // hop to the parent, composing the substitution map
        let Some(parent_ty) = current.extends() else {
            break;
        };
        let substituted_parent = substitute(parent_ty, &substitution);
        let Some(parent) = model.resolve_type(&substituted_parent, &current.module_path) else {
            warn!(
                entity = %entity.ident,
                parent = %quote::ToTokens::to_token_stream(parent_ty),
                "extends target is not in the model; inherited members skipped"
            );
            stats.skipped_members += 1;
            break;
        };
        let Some(embed) = embed else {
            break;
        };
        access.push(embed.ident.clone());
        hops_readable &= embed.readable;
        substitution = hop_substitution(parent, &substituted_parent);
        current = parent;
    }

    for (owner, marker) in synthetics {
        if !taken.insert(marker.name.clone()) {
            warn!(
                entity = %entity.ident,
                field = %marker.name,
                "synthetic field name collides with a collected field"
            );
            stats.skipped_members += 1;
            continue;
        }
        match synthetic_plan(model, entity, owner, marker, config) {
            Ok(plan) => fields.push(CollectedField {
                name: names::ident(&marker.name),
                ty: plan.declared.clone(),
                access: Vec::new(),
                readable: true,
                attrs: Vec::new(),
                kind: FieldKind::Synthetic(plan),
            }),
            Err(reason) => {
                taken.remove(&marker.name);
                warn!(
                    entity = %entity.ident,
                    field = %marker.name,
                    path = %marker.path,
                    reason,
                    "synthetic field skipped"
                );
                stats.skipped_members += 1;
            }
        }
    }

    EntityPlan {
        entity,
        fields,
        consts,
    }
}

/// Decides how a field participates in generation; `None` drops it.
#[allow(clippy::too_many_arguments)]
fn classify_field(
    model: &SourceModel,
    owner: &SourceType,
    entity: &SourceType,
    name: &Ident,
    ty: &Type,
    mode: Option<AggregationMode>,
    config: &GeneratorConfig,
    stats: &mut RunStats,
) -> Option<FieldKind> {
    let unwrapped = names::option_inner(ty).unwrap_or(ty);

    if names::is_simple_type(unwrapped) {
        return Some(FieldKind::Copy);
    }

    let collection = names::is_collection_type(unwrapped);
    let element = if collection {
        names::collection_element(unwrapped)?
    } else {
        unwrapped
    };

    if names::is_simple_type(element) || is_type_param(entity, element) {
        // directly copyable: simple values or the entity's own parameters
        return Some(FieldKind::Copy);
    }

    let Some(mode) = mode else {
        debug!(
            entity = %entity.ident,
            field = %name,
            "opaque relation omitted; annotate with dto(include) to project it"
        );
        return None;
    };

    let resolved = model
        .resolve_type(element, &owner.module_path)
        .filter(|target| model.is_managed(target, config.base_module.as_deref()));
    let Some(target) = resolved else {
        warn!(
            entity = %entity.ident,
            field = %name,
            "included field type is not a managed model type"
        );
        stats.skipped_members += 1;
        return None;
    };

    let compatible = match mode {
        AggregationMode::Id | AggregationMode::Dto => {
            target.kind == TypeKind::Struct && target.is_entity() && !target.excluded
        }
        AggregationMode::Enum => target.kind == TypeKind::Enum,
    };
    if !compatible {
        warn!(
            entity = %entity.ident,
            field = %name,
            target = %target.ident,
            mode = ?mode,
            "aggregation mode does not fit the target type"
        );
        stats.skipped_members += 1;
        return None;
    }

    Some(FieldKind::Relation {
        mode,
        target: target.ident.clone(),
        collection,
    })
}

fn synthetic_plan(
    model: &SourceModel,
    entity: &SourceType,
    owner: &SourceType,
    marker: &SyntheticMarker,
    config: &GeneratorConfig,
) -> Result<SyntheticPlan, &'static str> {
    let steps = resolve_chain(model, entity, &marker.path)?;

    let resolved = model.resolve(&marker.ty, &owner.module_path);
    let is_enum = marker.is_enum
        || resolved.is_some_and(|target| target.kind == TypeKind::Enum);
    let target = if is_enum {
        None
    } else {
        resolved
            .filter(|target| {
                target.kind == TypeKind::Struct
                    && target.is_entity()
                    && !target.excluded
                    && model.is_managed(target, config.base_module.as_deref())
            })
            .map(|target| target.ident.clone())
    };

    Ok(SyntheticPlan {
        steps,
        declared: composed_type(&marker.ty, &marker.type_params, marker.collection),
        target,
        collection: marker.collection,
    })
}

/// Resolves a dot-separated accessor chain against the model.
fn resolve_chain(
    model: &SourceModel,
    entity: &SourceType,
    path: &str,
) -> Result<Vec<ChainStep>, &'static str> {
    let mut steps = Vec::new();
    let mut current = entity;
    let mut names_iter = path.split('.').peekable();

    while let Some(step_name) = names_iter.next() {
        if step_name.is_empty() {
            return Err("empty chain segment");
        }
        let Some((mut segments, declaring, field)) = find_field(model, current, step_name) else {
            return Err("chain segment is not a field");
        };
        if !field.readable {
            return Err("chain segment is not readable");
        }
        segments.push(field.ident.clone());

        let optional = names::option_inner(&field.ty).is_some();
        let inner = names::option_inner(&field.ty).unwrap_or(&field.ty);
        steps.push(ChainStep { segments, optional });

        if names_iter.peek().is_some() {
            current = model
                .resolve_type(inner, &declaring.module_path)
                .ok_or("intermediate chain type is not in the model")?;
        }
    }

    Ok(steps)
}

/// Finds a field on a type or its ancestors, returning the embed hops needed
/// to reach it and the declaring type.
fn find_field<'m>(
    model: &'m SourceModel,
    ty: &'m SourceType,
    name: &str,
) -> Option<(Vec<Ident>, &'m SourceType, &'m SourceField)> {
    let mut hops = Vec::new();
    let mut current = ty;
    loop {
        if let Some(field) = current.fields.iter().find(|field| field.ident == name) {
            return Some((hops, current, field));
        }
        let parent_ty = current.extends()?;
        let embed = embed_field(current, parent_ty).filter(|field| field.readable)?;
        hops.push(embed.ident.clone());
        current = model.resolve_type(parent_ty, &current.module_path)?;
    }
}

/// True when the type is one of the entity's own generic parameters.
fn is_type_param(entity: &SourceType, ty: &Type) -> bool {
    let Type::Path(type_path) = ty else {
        return false;
    };
    if type_path.qself.is_some() || type_path.path.segments.len() != 1 {
        return false;
    }
    let segment = &type_path.path.segments[0];
    segment.arguments.is_none()
        && entity
            .generics
            .type_params()
            .any(|param| param.ident == segment.ident)
}

/// The field embedding the parent: its type's last segment names the parent.
fn embed_field<'m>(ty: &'m SourceType, parent_ty: &Type) -> Option<&'m SourceField> {
    let parent_name = names::type_ident(parent_ty)?;
    ty.fields
        .iter()
        .find(|field| names::type_ident(&field.ty).is_some_and(|ident| ident == parent_name))
}

/// Substitution map for one hop: the parent's parameters bound to the
/// arguments written at the `extends` reference.
fn hop_substitution(parent: &SourceType, written: &Type) -> HashMap<String, Type> {
    let mut map = HashMap::new();
    let Type::Path(type_path) = written else {
        return map;
    };
    let Some(segment) = type_path.path.segments.last() else {
        return map;
    };
    let syn::PathArguments::AngleBracketed(args) = &segment.arguments else {
        return map;
    };
    let params = parent.generics.type_params().map(|param| param.ident.to_string());
    let arguments = args.args.iter().filter_map(|arg| match arg {
        syn::GenericArgument::Type(ty) => Some(ty.clone()),
        _ => None,
    });
    for (param, argument) in params.zip(arguments) {
        map.insert(param, argument);
    }
    map
}

/// Replaces bare type parameters with their bound arguments, recursively.
fn substitute(ty: &Type, map: &HashMap<String, Type>) -> Type {
    if map.is_empty() {
        return ty.clone();
    }
    match ty {
        Type::Path(type_path) if type_path.qself.is_none() => {
            if type_path.path.segments.len() == 1 {
                let segment = &type_path.path.segments[0];
                if segment.arguments.is_none()
                    && let Some(bound) = map.get(&segment.ident.to_string())
                {
                    return bound.clone();
                }
            }
            let mut rewritten = type_path.clone();
            for segment in &mut rewritten.path.segments {
                if let syn::PathArguments::AngleBracketed(args) = &mut segment.arguments {
                    for arg in &mut args.args {
                        if let syn::GenericArgument::Type(inner) = arg {
                            *inner = substitute(inner, map);
                        }
                    }
                }
            }
            Type::Path(rewritten)
        }
        Type::Reference(reference) => {
            let mut rewritten = reference.clone();
            rewritten.elem = Box::new(substitute(&reference.elem, map));
            Type::Reference(rewritten)
        }
        other => other.clone(),
    }
}

/// Composes the declared type of a synthetic field from its marker parts.
fn composed_type(base: &syn::Path, params: &[syn::Path], collection: bool) -> Type {
    let mut path = base.clone();
    if !params.is_empty()
        && let Some(segment) = path.segments.last_mut()
    {
        let args = params
            .iter()
            .map(|param| {
                syn::GenericArgument::Type(Type::Path(syn::TypePath {
                    qself: None,
                    path: param.clone(),
                }))
            })
            .collect();
        segment.arguments =
            syn::PathArguments::AngleBracketed(syn::AngleBracketedGenericArguments {
                colon2_token: None,
                lt_token: Default::default(),
                args,
                gt_token: Default::default(),
            });
    }
    let base_ty = Type::Path(syn::TypePath { qself: None, path });
    if collection {
        let mut vec_path = syn::Path::from(names::ident("Vec"));
        if let Some(segment) = vec_path.segments.last_mut() {
            segment.arguments =
                syn::PathArguments::AngleBracketed(syn::AngleBracketedGenericArguments {
                    colon2_token: None,
                    lt_token: Default::default(),
                    args: [syn::GenericArgument::Type(base_ty)].into_iter().collect(),
                    gt_token: Default::default(),
                });
        }
        Type::Path(syn::TypePath {
            qself: None,
            path: vec_path,
        })
    } else {
        base_ty
    }
}

#[cfg(test)]
mod tests {
    use quote::ToTokens;

    use super::*;
    use crate::reader::read_sources;

    fn config() -> GeneratorConfig {
        GeneratorConfig::builder()
            .source_root("/unused")
            .output_dir("/unused")
            .build()
            .unwrap()
    }

    fn plan_for<'m>(model: &'m SourceModel, name: &str, config: &GeneratorConfig) -> EntityPlan<'m> {
        let entity = model
            .types()
            .iter()
            .find(|ty| ty.ident == name)
            .expect("entity in model");
        collect_entity(model, entity, config, &mut RunStats::default())
    }

    fn field_names(plan: &EntityPlan<'_>) -> Vec<String> {
        plan.fields.iter().map(|field| field.name.to_string()).collect()
    }

    #[test]
    fn ancestors_flatten_after_the_leaf() {
        let model = read_sources(&[(
            "domain.rs",
            r#"
                #[derive(Entity)]
                #[entity(base)]
                pub struct Audited {
                    pub id: i64,
                    pub created_at: i64,
                }

                #[derive(Entity)]
                #[entity(extends = "Audited")]
                pub struct User {
                    pub base: Audited,
                    pub login: String,
                }
            "#,
        )])
        .unwrap();
        let plan = plan_for(&model, "User", &config());
        assert_eq!(field_names(&plan), ["login", "id", "created_at"]);

        let id = plan.fields.iter().find(|f| f.name == "id").unwrap();
        assert_eq!(id.access.len(), 1);
        assert_eq!(id.access[0], "base");
        let login = plan.fields.iter().find(|f| f.name == "login").unwrap();
        assert!(login.access.is_empty());
    }

    #[test]
    fn nearer_declarations_shadow_ancestors() {
        let model = read_sources(&[(
            "domain.rs",
            r#"
                #[derive(Entity)]
                #[entity(base)]
                pub struct Audited {
                    pub id: i64,
                    pub note: String,
                }

                #[derive(Entity)]
                #[entity(extends = "Audited")]
                pub struct User {
                    pub base: Audited,
                    pub note: String,
                }
            "#,
        )])
        .unwrap();
        let plan = plan_for(&model, "User", &config());
        assert_eq!(field_names(&plan), ["note", "id"]);
        let note = plan.fields.iter().find(|f| f.name == "note").unwrap();
        assert!(note.access.is_empty(), "leaf declaration wins");
    }

    #[test]
    fn excluded_and_embed_fields_are_dropped() {
        let model = read_sources(&[(
            "domain.rs",
            r#"
                #[derive(Entity)]
                #[entity(base)]
                pub struct Audited {
                    pub id: i64,
                }

                #[derive(Entity)]
                #[entity(extends = "Audited")]
                pub struct User {
                    pub base: Audited,
                    #[dto(exclude)]
                    pub password_hash: String,
                    pub login: String,
                }
            "#,
        )])
        .unwrap();
        let plan = plan_for(&model, "User", &config());
        assert_eq!(field_names(&plan), ["login", "id"]);
    }

    #[test]
    fn generic_parents_substitute_arguments() {
        let model = read_sources(&[(
            "domain.rs",
            r#"
                #[derive(Entity)]
                #[entity(base)]
                pub struct Keyed<K> {
                    pub id: i64,
                    pub key: K,
                    pub keys: Vec<K>,
                }

                #[derive(Entity)]
                #[entity(extends = "Keyed<String>")]
                pub struct User {
                    pub base: Keyed<String>,
                    pub login: String,
                }
            "#,
        )])
        .unwrap();
        let plan = plan_for(&model, "User", &config());
        let key = plan.fields.iter().find(|f| f.name == "key").unwrap();
        assert_eq!(key.ty.to_token_stream().to_string(), "String");
        let keys = plan.fields.iter().find(|f| f.name == "keys").unwrap();
        assert_eq!(keys.ty.to_token_stream().to_string(), "Vec < String >");
    }

    #[test]
    fn opaque_relations_are_omitted_without_include() {
        let model = read_sources(&[(
            "domain.rs",
            r#"
                #[derive(Entity)]
                pub struct User {
                    pub id: i64,
                    pub group: Option<Group>,
                }

                #[derive(Entity)]
                pub struct Group {
                    pub id: i64,
                }
            "#,
        )])
        .unwrap();
        let plan = plan_for(&model, "User", &config());
        assert_eq!(field_names(&plan), ["id"]);
    }

    #[test]
    fn included_relations_classify_by_mode() {
        let model = read_sources(&[(
            "domain.rs",
            r#"
                #[derive(Entity)]
                pub struct User {
                    pub id: i64,
                    #[dto(include)]
                    pub owner: Option<Group>,
                    #[dto(include = "dto")]
                    pub groups: Vec<Group>,
                    #[dto(include = "enum")]
                    pub roles: std::collections::HashSet<Role>,
                }

                #[derive(Entity)]
                pub struct Group {
                    pub id: i64,
                }

                pub enum Role {
                    Admin,
                }
            "#,
        )])
        .unwrap();
        let plan = plan_for(&model, "User", &config());

        let owner = plan.fields.iter().find(|f| f.name == "owner").unwrap();
        assert!(matches!(
            &owner.kind,
            FieldKind::Relation {
                mode: AggregationMode::Id,
                collection: false,
                ..
            }
        ));

        let groups = plan.fields.iter().find(|f| f.name == "groups").unwrap();
        assert!(matches!(
            &groups.kind,
            FieldKind::Relation {
                mode: AggregationMode::Dto,
                collection: true,
                ..
            }
        ));

        let roles = plan.fields.iter().find(|f| f.name == "roles").unwrap();
        assert!(matches!(
            &roles.kind,
            FieldKind::Relation {
                mode: AggregationMode::Enum,
                collection: true,
                ..
            }
        ));
    }

    #[test]
    fn mode_target_mismatch_is_skipped_with_stats() {
        let model = read_sources(&[(
            "domain.rs",
            r#"
                #[derive(Entity)]
                pub struct User {
                    pub id: i64,
                    #[dto(include = "enum")]
                    pub group: Group,
                }

                #[derive(Entity)]
                pub struct Group {
                    pub id: i64,
                }
            "#,
        )])
        .unwrap();
        let entity = model.types().iter().find(|ty| ty.ident == "User").unwrap();
        let mut stats = RunStats::default();
        let plan = collect_entity(&model, entity, &config(), &mut stats);
        assert_eq!(field_names(&plan), ["id"]);
        assert_eq!(stats.skipped_members, 1);
    }

    #[test]
    fn simple_collections_are_copied() {
        let model = read_sources(&[(
            "domain.rs",
            r#"
                #[derive(Entity)]
                pub struct User {
                    pub id: i64,
                    pub tags: Vec<String>,
                }
            "#,
        )])
        .unwrap();
        let plan = plan_for(&model, "User", &config());
        let tags = plan.fields.iter().find(|f| f.name == "tags").unwrap();
        assert!(matches!(tags.kind, FieldKind::Copy));
    }

    #[test]
    fn synthetic_chains_resolve_with_optionality() {
        let model = read_sources(&[(
            "domain.rs",
            r#"
                #[derive(Entity)]
                #[dto_extends(name = "group_name", ty = "String", path = "group.name")]
                pub struct User {
                    pub id: i64,
                    pub group: Option<Group>,
                }

                #[derive(Entity)]
                pub struct Group {
                    pub id: i64,
                    pub name: String,
                }
            "#,
        )])
        .unwrap();
        let plan = plan_for(&model, "User", &config());
        let synthetic = plan.fields.iter().find(|f| f.name == "group_name").unwrap();
        let FieldKind::Synthetic(synth) = &synthetic.kind else {
            panic!("expected synthetic kind");
        };
        assert_eq!(synth.steps.len(), 2);
        assert!(synth.steps[0].optional);
        assert!(!synth.steps[1].optional);
        assert!(synth.target.is_none());
        assert_eq!(synth.declared.to_token_stream().to_string(), "String");
    }

    #[test]
    fn synthetic_chains_reach_through_embeds() {
        let model = read_sources(&[(
            "domain.rs",
            r#"
                #[derive(Entity)]
                #[entity(base)]
                pub struct Audited {
                    pub id: i64,
                    pub editor: Option<Group>,
                }

                #[derive(Entity)]
                #[entity(extends = "Audited")]
                #[dto_extends(name = "editor_dto", ty = "Group", path = "editor")]
                pub struct User {
                    pub base: Audited,
                    pub login: String,
                }

                #[derive(Entity)]
                pub struct Group {
                    pub id: i64,
                    pub name: String,
                }
            "#,
        )])
        .unwrap();
        let plan = plan_for(&model, "User", &config());
        let synthetic = plan.fields.iter().find(|f| f.name == "editor_dto").unwrap();
        let FieldKind::Synthetic(synth) = &synthetic.kind else {
            panic!("expected synthetic kind");
        };
        assert_eq!(synth.steps.len(), 1);
        let segments: Vec<String> =
            synth.steps[0].segments.iter().map(|s| s.to_string()).collect();
        assert_eq!(segments, ["base", "editor"]);
        assert!(synth.target.as_ref().is_some_and(|target| target == "Group"));
    }

    #[test]
    fn unresolvable_chains_are_skipped_with_stats() {
        let model = read_sources(&[(
            "domain.rs",
            r#"
                #[derive(Entity)]
                #[dto_extends(name = "broken", ty = "String", path = "group.nope")]
                pub struct User {
                    pub id: i64,
                    pub group: Option<Group>,
                }

                #[derive(Entity)]
                pub struct Group {
                    pub id: i64,
                }
            "#,
        )])
        .unwrap();
        let entity = model.types().iter().find(|ty| ty.ident == "User").unwrap();
        let mut stats = RunStats::default();
        let plan = collect_entity(&model, entity, &config(), &mut stats);
        assert_eq!(field_names(&plan), ["id"]);
        assert_eq!(stats.skipped_members, 1);
    }

    #[test]
    fn consts_follow_the_static_switch() {
        let source = r#"
            #[derive(Entity)]
            pub struct User {
                pub id: i64,
            }

            impl User {
                pub const MAX_LOGIN: usize = 64;
                const INTERNAL: usize = 1;
            }
        "#;
        let model = read_sources(&[("domain.rs", source)]).unwrap();

        let plan = plan_for(&model, "User", &config());
        assert!(plan.consts.is_empty(), "skipped by default");

        let keep = GeneratorConfig::builder()
            .source_root("/unused")
            .output_dir("/unused")
            .skip_static_fields(false)
            .build()
            .unwrap();
        let plan = plan_for(&model, "User", &keep);
        assert_eq!(plan.consts.len(), 1, "private consts stay private");
        assert_eq!(plan.consts[0].ident, "MAX_LOGIN");
    }

    #[test]
    fn synthetic_collection_composes_vec() {
        let model = read_sources(&[(
            "domain.rs",
            r#"
                #[derive(Entity)]
                #[dto_extends(name = "role_names", ty = "String", path = "group.names", collection)]
                pub struct User {
                    pub id: i64,
                    pub group: Group,
                }

                #[derive(Entity)]
                pub struct Group {
                    pub id: i64,
                    pub names: Vec<String>,
                }
            "#,
        )])
        .unwrap();
        let plan = plan_for(&model, "User", &config());
        let synthetic = plan.fields.iter().find(|f| f.name == "role_names").unwrap();
        assert_eq!(
            synthetic.ty.to_token_stream().to_string(),
            "Vec < String >"
        );
    }
}
