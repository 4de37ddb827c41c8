// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Source scanning.
//!
//! Walks the configured roots, parses every `.rs` file with
//! [`syn::parse_file`] and builds the [`SourceModel`]. Items are gathered in
//! two passes: types first, then impl blocks, so an impl may precede its type
//! or live in a different file. Files are visited in name order per root so
//! the model, and everything generated from it, stays deterministic.

use std::{fs, path::{Path, PathBuf}};

use tracing::debug;
use walkdir::WalkDir;

use crate::{
    error::GeneratorError,
    model::{
        SourceConst, SourceField, SourceMethod, SourceModel, SourceType, TypeKind,
        dto_field_marker_of, entity_marker_of, is_dto_method, is_excluded, is_marker, queries_of,
        synthetic_markers_of,
    },
};

pub(crate) fn read(roots: &[PathBuf]) -> Result<SourceModel, GeneratorError> {
    let mut types = Vec::new();
    let mut impls = Vec::new();

    for root in roots {
        for entry in WalkDir::new(root)
            .follow_links(true)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|entry| entry.ok())
        {
            let path = entry.path();
            if !entry.file_type().is_file() || path.extension().is_none_or(|ext| ext != "rs") {
                continue;
            }
            let source = fs::read_to_string(path)
                .map_err(|source| GeneratorError::io(path, source))?;
            let file = syn::parse_file(&source).map_err(|source| GeneratorError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
            let module_path = module_path_of(root, path);
            absorb_items(&file.items, &module_path, &mut types, &mut impls)?;
        }
    }

    let mut model = SourceModel::from_types(types)?;
    attach_impls(&mut model, impls)?;
    Ok(model)
}

/// Builds a model from in-memory sources; the reader's test seam.
#[cfg(test)]
pub(crate) fn read_sources(sources: &[(&str, &str)]) -> Result<SourceModel, GeneratorError> {
    let mut types = Vec::new();
    let mut impls = Vec::new();
    for (virtual_path, source) in sources {
        let file = syn::parse_file(source).map_err(|source| GeneratorError::Parse {
            path: PathBuf::from(virtual_path),
            source,
        })?;
        let module_path = module_path_of(Path::new(""), Path::new(virtual_path));
        absorb_items(&file.items, &module_path, &mut types, &mut impls)?;
    }
    let mut model = SourceModel::from_types(types)?;
    attach_impls(&mut model, impls)?;
    Ok(model)
}

/// Module path of a file relative to its root: directory components plus the
/// file stem, with `mod`, `lib` and `main` stems folding into the directory.
fn module_path_of(root: &Path, file: &Path) -> Vec<String> {
    let relative = file.strip_prefix(root).unwrap_or(file);
    let mut segments: Vec<String> = relative
        .parent()
        .map(|parent| {
            parent
                .components()
                .filter_map(|component| match component {
                    std::path::Component::Normal(name) => {
                        Some(name.to_string_lossy().into_owned())
                    }
                    _ => None,
                })
                .collect()
        })
        .unwrap_or_default();
    if let Some(stem) = relative.file_stem().map(|stem| stem.to_string_lossy()) {
        if stem != "mod" && stem != "lib" && stem != "main" {
            segments.push(stem.into_owned());
        }
    }
    segments
}

fn absorb_items(
    items: &[syn::Item],
    module_path: &[String],
    types: &mut Vec<SourceType>,
    impls: &mut Vec<(Vec<String>, syn::ItemImpl)>,
) -> Result<(), GeneratorError> {
    for item in items {
        match item {
            syn::Item::Struct(item) => types.push(struct_type(item, module_path)?),
            syn::Item::Enum(item) => types.push(enum_type(item, module_path)),
            syn::Item::Trait(item) => types.push(trait_type(item, module_path)),
            syn::Item::Impl(item) => impls.push((module_path.to_vec(), item.clone())),
            syn::Item::Mod(item) => {
                if let Some((_, nested)) = &item.content {
                    let mut nested_path = module_path.to_vec();
                    nested_path.push(item.ident.to_string());
                    absorb_items(nested, &nested_path, types, impls)?;
                }
            }
            _ => {}
        }
    }
    Ok(())
}

fn struct_type(
    item: &syn::ItemStruct,
    module_path: &[String],
) -> Result<SourceType, GeneratorError> {
    let mut fields = Vec::new();
    if let syn::Fields::Named(named) = &item.fields {
        for field in &named.named {
            let Some(ident) = field.ident.clone() else {
                continue;
            };
            let dto = dto_field_marker_of(&field.attrs)?;
            let attrs = field
                .attrs
                .iter()
                .filter(|attr| !is_marker(attr, "dto") && !is_marker(attr, "id"))
                .cloned()
                .collect();
            fields.push(SourceField {
                ident,
                ty: field.ty.clone(),
                readable: matches!(field.vis, syn::Visibility::Public(_)),
                dto,
                attrs,
            });
        }
    }

    Ok(SourceType {
        ident: item.ident.clone(),
        module_path: module_path.to_vec(),
        kind: TypeKind::Struct,
        generics: item.generics.clone(),
        fields,
        methods: Vec::new(),
        consts: Vec::new(),
        implemented_traits: Vec::new(),
        entity: entity_marker_of(&item.attrs)?,
        synthetics: synthetic_markers_of(&item.attrs)?,
        queries: queries_of(&item.attrs)?,
        excluded: is_excluded(&item.attrs),
        marker_trait: false,
    })
}

fn enum_type(item: &syn::ItemEnum, module_path: &[String]) -> SourceType {
    SourceType {
        ident: item.ident.clone(),
        module_path: module_path.to_vec(),
        kind: TypeKind::Enum,
        generics: item.generics.clone(),
        fields: Vec::new(),
        methods: Vec::new(),
        consts: Vec::new(),
        implemented_traits: Vec::new(),
        entity: None,
        synthetics: Vec::new(),
        queries: Vec::new(),
        excluded: is_excluded(&item.attrs),
        marker_trait: false,
    }
}

fn trait_type(item: &syn::ItemTrait, module_path: &[String]) -> SourceType {
    let all_defaulted = item.items.iter().all(|trait_item| match trait_item {
        syn::TraitItem::Fn(method) => method.default.is_some(),
        syn::TraitItem::Const(constant) => constant.default.is_some(),
        syn::TraitItem::Type(_) => false,
        _ => true,
    });
    SourceType {
        ident: item.ident.clone(),
        module_path: module_path.to_vec(),
        kind: TypeKind::Trait,
        generics: item.generics.clone(),
        fields: Vec::new(),
        methods: Vec::new(),
        consts: Vec::new(),
        implemented_traits: Vec::new(),
        entity: None,
        synthetics: Vec::new(),
        queries: Vec::new(),
        excluded: is_excluded(&item.attrs),
        marker_trait: all_defaulted && item.generics.params.is_empty(),
    }
}

fn attach_impls(
    model: &mut SourceModel,
    impls: Vec<(Vec<String>, syn::ItemImpl)>,
) -> Result<(), GeneratorError> {
    for (module_path, item) in impls {
        let syn::Type::Path(self_ty) = item.self_ty.as_ref() else {
            continue;
        };
        let Some(index) = model.resolve_index(&self_ty.path, &module_path) else {
            debug!(
                target_type = %quote::ToTokens::to_token_stream(&self_ty.path),
                "impl block target is outside the model"
            );
            continue;
        };

        if let Some((_, trait_path, _)) = &item.trait_ {
            model.get_mut(index).implemented_traits.push(trait_path.clone());
            continue;
        }

        for impl_item in &item.items {
            match impl_item {
                syn::ImplItem::Fn(method) => {
                    model.get_mut(index).methods.push(SourceMethod {
                        sig: method.sig.clone(),
                        block: method.block.clone(),
                        readable: matches!(method.vis, syn::Visibility::Public(_)),
                        dto_method: is_dto_method(&method.attrs),
                    });
                }
                syn::ImplItem::Const(constant) => {
                    model.get_mut(index).consts.push(SourceConst {
                        ident: constant.ident.clone(),
                        ty: constant.ty.clone(),
                        expr: constant.expr.clone(),
                        readable: matches!(constant.vis, syn::Visibility::Public(_)),
                    });
                }
                _ => {}
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;
    use crate::model::TypeKind;

    #[test]
    fn module_paths_derive_from_file_layout() {
        let root = Path::new("/src");
        assert_eq!(
            module_path_of(root, Path::new("/src/domain/user.rs")),
            ["domain", "user"]
        );
        assert_eq!(module_path_of(root, Path::new("/src/domain/mod.rs")), ["domain"]);
        assert!(module_path_of(root, Path::new("/src/lib.rs")).is_empty());
    }

    #[test]
    fn types_and_markers_are_absorbed() {
        let model = read_sources(&[(
            "domain.rs",
            r#"
                #[derive(Entity)]
                #[entity(base)]
                pub struct Audited {
                    pub id: i64,
                }

                #[derive(Entity)]
                pub struct User {
                    pub id: i64,
                    #[dto(exclude)]
                    pub password_hash: String,
                    #[dto(include)]
                    #[validate(length(min = 1))]
                    pub group: Option<Group>,
                }

                pub struct Group {
                    pub id: i64,
                }

                pub enum Role {
                    Admin,
                    Member,
                }
            "#,
        )])
        .unwrap();

        assert_eq!(model.types().len(), 4);
        let entities = model.entities(None);
        assert_eq!(entities.len(), 2);
        assert!(entities[0].is_base());

        let user = &entities[1];
        assert_eq!(user.ident, "User");
        assert_eq!(user.module_path, ["domain"]);
        assert!(user.fields[1].dto.exclude);
        assert!(user.fields[2].dto.mode().is_some());
        // the dto marker is stripped from the copyable attribute set
        assert_eq!(user.fields[2].attrs.len(), 1);
    }

    #[test]
    fn inline_modules_extend_the_path() {
        let model = read_sources(&[(
            "lib.rs",
            r#"
                pub mod domain {
                    #[derive(Entity)]
                    pub struct User {
                        pub id: i64,
                    }
                }
            "#,
        )])
        .unwrap();
        let entities = model.entities(None);
        assert_eq!(entities[0].qualified_name(), "domain::User");
    }

    #[test]
    fn impls_attach_methods_consts_and_traits() {
        let model = read_sources(&[(
            "domain.rs",
            r#"
                #[derive(Entity)]
                pub struct User {
                    pub id: i64,
                }

                pub trait Labeled {}

                #[dto_methods]
                impl User {
                    pub const MAX_LOGIN: usize = 64;

                    #[dto_method]
                    pub fn display_name(&self) -> String {
                        format!("user-{}", self.id)
                    }

                    pub fn internal(&self) {}
                }

                impl Labeled for User {}
            "#,
        )])
        .unwrap();

        let entities = model.entities(None);
        let user = entities[0];
        assert_eq!(user.consts.len(), 1);
        assert_eq!(user.methods.len(), 2);
        assert!(user.methods[0].dto_method);
        assert!(!user.methods[1].dto_method);
        assert_eq!(user.implemented_traits.len(), 1);

        let labeled = model
            .types()
            .iter()
            .find(|ty| ty.ident == "Labeled")
            .unwrap();
        assert_eq!(labeled.kind, TypeKind::Trait);
        assert!(labeled.marker_trait);
    }

    #[test]
    fn traits_with_required_items_are_not_markers() {
        let model = read_sources(&[(
            "lib.rs",
            r#"
                pub trait Searchable {
                    fn keywords(&self) -> Vec<String>;
                }

                pub trait Tagged {
                    fn tag(&self) -> String {
                        String::new()
                    }
                }
            "#,
        )])
        .unwrap();
        let searchable = model.types().iter().find(|ty| ty.ident == "Searchable").unwrap();
        assert!(!searchable.marker_trait);
        let tagged = model.types().iter().find(|ty| ty.ident == "Tagged").unwrap();
        assert!(tagged.marker_trait);
    }

    #[test]
    fn files_walk_in_name_order() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("b.rs"),
            "#[derive(Entity)] pub struct Beta { pub id: i64 }",
        )
        .unwrap();
        fs::write(
            dir.path().join("a.rs"),
            "#[derive(Entity)] pub struct Alpha { pub id: i64 }",
        )
        .unwrap();

        let model = SourceModel::read(&[dir.path().to_path_buf()]).unwrap();
        let names: Vec<String> = model.types().iter().map(|ty| ty.ident.to_string()).collect();
        assert_eq!(names, ["Alpha", "Beta"]);
    }

    #[test]
    fn unparseable_sources_are_fatal() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("broken.rs"), "pub struct {").unwrap();
        let err = SourceModel::read(&[dir.path().to_path_buf()]).unwrap_err();
        assert!(matches!(err, GeneratorError::Parse { .. }));
    }

    #[test]
    fn malformed_markers_are_fatal() {
        let err = read_sources(&[(
            "users.rs",
            r#"
                #[derive(Entity)]
                #[entity(bogus = "x")]
                pub struct User {
                    pub id: i64,
                }
            "#,
        )])
        .unwrap_err();
        assert!(matches!(err, GeneratorError::Attr(_)));
    }

    #[test]
    fn duplicate_types_across_files_are_fatal() {
        let err = read_sources(&[
            ("users.rs", "#[derive(Entity)] pub struct User { pub id: i64 }"),
            ("users.rs", "#[derive(Entity)] pub struct User { pub id: i64 }"),
        ])
        .unwrap_err();
        assert!(matches!(err, GeneratorError::DuplicateType { .. }));
    }
}
