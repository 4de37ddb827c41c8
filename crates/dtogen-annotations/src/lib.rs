// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(
    missing_docs,
    rustdoc::missing_crate_level_docs,
    rustdoc::broken_intra_doc_links,
    rust_2018_idioms
)]
#![deny(unsafe_code)]

//! # Quick Navigation
//!
//! - **Derive Macro**: [`Entity`](macro@Entity) — marks a struct as a managed
//!   entity and implements [`StoredEntity`]
//! - **Marker Attributes**: [`dto_exclude`](macro@dto_exclude),
//!   [`dto_methods`](macro@dto_methods)
//! - **Generator**: the `dtogen` crate reads these markers back from source
//!   and emits DTO structs plus a conversion service
//!
//! # Attribute Quick Reference
//!
//! ## Entity-Level `#[entity(...)]`
//!
//! ```rust,ignore
//! #[derive(Entity)]
//! #[entity(base)]                    // Optional: DTO only, no converter entry
//! #[entity(extends = "Audited")]     // Optional: flatten parent fields in
//! pub struct User { /* ... */ }
//! ```
//!
//! ## Field-Level Attributes
//!
//! | Attribute | Description |
//! |-----------|-------------|
//! | `#[id]` | Marks the identifier field read by `StoredEntity::id`. |
//! | `#[dto(exclude)]` | Keeps the field off the DTO and out of the converter. |
//! | `#[dto(include)]` | Projects a relation field as its identifier (`id` mode). |
//! | `#[dto(include = "dto")]` | Projects a relation field as its generated DTO. |
//! | `#[dto(include = "enum")]` | Keeps an enum-typed field as the enum itself. |
//!
//! ## Struct-Level Markers
//!
//! | Attribute | Description |
//! |-----------|-------------|
//! | `#[dto_extends(name = "...", ty = "...", path = "...")]` | Declares a synthetic DTO field fed from a getter chain. |
//! | `#[conventional_query(name = "...", ...)]` | Declares a derived query method schema. |
//! | `#[native_query(name = "...", query = "...")]` | Declares a raw query method schema. |
//! | `#[native_queries(native_query(...), ...)]` | Groups several raw query declarations. |
//!
//! [`StoredEntity`]: https://docs.rs/dtogen-core

mod attrs;
mod entity;
mod markers;

use proc_macro::TokenStream;

/// Derive macro marking a struct as a managed entity.
///
/// # Overview
///
/// The derive itself generates only an implementation of
/// `dtogen_core::StoredEntity`, which exposes the numeric identifier that
/// id-mode projection and the generated converter rely on. The DTO struct and
/// the conversion service are produced by the `dtogen` generator, which
/// parses annotated sources directly. The inert helper attributes accepted
/// here exist so annotated entities compile cleanly.
///
/// # Identifier Resolution
///
/// The identifier getter is resolved in order:
///
/// 1. the field marked `#[id]`,
/// 2. a field literally named `id`,
/// 3. with `#[entity(extends = "Parent")]`, delegation through the embedded
///    parent field.
///
/// A struct matching none of these is rejected at compile time.
///
/// # Entity Attributes
///
/// | Attribute | Required | Default | Description |
/// |-----------|----------|---------|-------------|
/// | `base` | No | off | Marks a mapped-superclass style entity: it still gets a DTO, but no converter registration. |
/// | `extends` | No | — | Parent entity type; the struct must embed the parent in a field of that type. |
///
/// # Examples
///
/// ```rust,ignore
/// use dtogen_annotations::Entity;
///
/// #[derive(Entity)]
/// #[entity(base)]
/// pub struct Audited {
///     pub id: i64,
///     pub created_at: chrono::DateTime<chrono::Utc>,
/// }
///
/// #[derive(Entity)]
/// #[entity(extends = "Audited")]
/// #[dto_extends(name = "group_name", ty = "String", path = "group.name")]
/// pub struct User {
///     pub base: Audited,
///     pub login: String,
///     #[dto(include)]
///     pub group: Option<Group>,
///     #[dto(exclude)]
///     pub password_hash: String,
/// }
/// ```
#[proc_macro_derive(
    Entity,
    attributes(
        entity,
        dto,
        id,
        dto_extends,
        conventional_query,
        native_query,
        native_queries
    )
)]
pub fn derive_entity(input: TokenStream) -> TokenStream {
    entity::derive(input)
}

/// Excludes a struct, enum or trait from generation.
///
/// The item itself is left untouched; the attribute is a marker the `dtogen`
/// generator reads from source. An excluded entity gets neither a DTO nor a
/// converter entry, and an excluded trait is never mirrored onto DTOs.
///
/// ```rust,ignore
/// #[dto_exclude]
/// pub struct SessionSecret {
///     pub token: String,
/// }
/// ```
#[proc_macro_attribute]
pub fn dto_exclude(args: TokenStream, input: TokenStream) -> TokenStream {
    markers::dto_exclude(args.into(), input.into()).into()
}

/// Enables `#[dto_method]` markers inside an impl block.
///
/// Methods tagged `#[dto_method]` are mirrored onto the generated DTO with
/// entity types in their signatures renamed to DTO types. Because derive
/// helper attributes cannot reach impl items, this attribute strips the
/// markers so the block compiles; the generator reads them from source before
/// expansion.
///
/// ```rust,ignore
/// #[dto_methods]
/// impl User {
///     #[dto_method]
///     pub fn display_name(&self) -> String {
///         format!("{} <{}>", self.login, self.email)
///     }
/// }
/// ```
#[proc_macro_attribute]
pub fn dto_methods(args: TokenStream, input: TokenStream) -> TokenStream {
    markers::dto_methods(args.into(), input.into()).into()
}
