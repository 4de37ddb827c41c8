// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Type classification and naming conventions.
//!
//! Everything in this module is a pure function over [`syn`] types. The rest
//! of the generator routes every "what is this type" and "what is this thing
//! called" decision through here so that the DTO emitter and the converter
//! emitter can never disagree.
//!
//! # Classification
//!
//! | Question | True for |
//! |----------|----------|
//! | [`is_simple_type`] | primitives, `String`/`str`, date/time types, `Uuid`, `Option` of any of these |
//! | [`is_list_type`] | `Vec`, `VecDeque` |
//! | [`is_set_type`] | `HashSet`, `BTreeSet` |
//! | [`is_collection_type`] | any of the above four |
//!
//! Classification looks at the last path segment only: `std::string::String`
//! and `String` classify identically. Everything that is not simple and not a
//! collection counts as *complex* (a relation, an enum or an unknown type)
//! and is handled by the collector's aggregation rules.
//!
//! # Naming
//!
//! DTO names are produced by [`prepare_type_name`], a pure string transform:
//! `{prefix}{Name}{suffix}{postfix}`. Accessor names follow the convention of
//! the generated accessors: plain getters named after the field, `is_`
//! getters for boolean-underlying fields, `set_` setters.

use convert_case::{Case, Casing};
use proc_macro2::Span;
use syn::{GenericArgument, Ident, PathArguments, Type};

/// Scalar types copied between entity and DTO without transformation.
const SIMPLE_TYPES: [&str; 30] = [
    "bool", "char", "i8", "i16", "i32", "i64", "i128", "isize", "u8", "u16", "u32", "u64", "u128",
    "usize", "f32", "f64", "String", "str", "DateTime", "NaiveDate", "NaiveTime", "NaiveDateTime",
    "Date", "Duration", "Instant", "SystemTime", "Uuid", "Decimal", "IpAddr", "PathBuf",
];

const LIST_TYPES: [&str; 2] = ["Vec", "VecDeque"];
const SET_TYPES: [&str; 2] = ["HashSet", "BTreeSet"];

/// Returns the last path segment identifier of a type, looking through
/// references.
#[must_use]
pub fn type_ident(ty: &Type) -> Option<&Ident> {
    match ty {
        Type::Path(path) => path.path.segments.last().map(|segment| &segment.ident),
        Type::Reference(reference) => type_ident(&reference.elem),
        _ => None,
    }
}

/// Returns the inner type of `Option<T>`, if `ty` is one.
#[must_use]
pub fn option_inner(ty: &Type) -> Option<&Type> {
    generic_inner(ty, "Option")
}

/// True when the type is directly copyable between entity and DTO.
///
/// `Option` wrappers are looked through, so `Option<String>` is as simple as
/// `String`.
#[must_use]
pub fn is_simple_type(ty: &Type) -> bool {
    let ty = option_inner(ty).unwrap_or(ty);
    type_ident(ty).is_some_and(|ident| SIMPLE_TYPES.contains(&ident.to_string().as_str()))
}

/// True for list-shaped collections (`Vec`, `VecDeque`).
#[must_use]
pub fn is_list_type(ty: &Type) -> bool {
    type_ident(ty).is_some_and(|ident| LIST_TYPES.contains(&ident.to_string().as_str()))
}

/// True for set-shaped collections (`HashSet`, `BTreeSet`).
#[must_use]
pub fn is_set_type(ty: &Type) -> bool {
    type_ident(ty).is_some_and(|ident| SET_TYPES.contains(&ident.to_string().as_str()))
}

/// True for any supported collection shape.
#[must_use]
pub fn is_collection_type(ty: &Type) -> bool {
    is_list_type(ty) || is_set_type(ty)
}

/// Returns the element type of a collection, if `ty` is one.
#[must_use]
pub fn collection_element(ty: &Type) -> Option<&Type> {
    if !is_collection_type(ty) {
        return None;
    }
    first_type_argument(ty)
}

/// Composes a DTO-space type name from an entity-space simple name.
///
/// The transform is pure string composition, `{prefix}{name}{suffix}{postfix}`,
/// so equal inputs always yield equal outputs regardless of where the name
/// was encountered.
#[must_use]
pub fn prepare_type_name(name: &str, prefix: &str, suffix: &str, postfix: &str) -> String {
    format!("{prefix}{name}{suffix}{postfix}")
}

/// File stem for a generated module, derived from its type name.
#[must_use]
pub fn module_file_stem(type_name: &str) -> String {
    type_name.to_case(Case::Snake)
}

/// Getter name for a DTO field: the field name, `is_`-prefixed when the
/// underlying type is `bool` and the name is not already prefixed.
#[must_use]
pub fn getter_name(field: &Ident, ty: &Type) -> Ident {
    let name = field.to_string();
    let underlying = option_inner(ty).unwrap_or(ty);
    let is_bool = type_ident(underlying).is_some_and(|ident| ident == "bool");
    if is_bool && !name.starts_with("is_") {
        ident(&format!("is_{}", bare_name(&name)))
    } else {
        field.clone()
    }
}

/// Setter name for a DTO field: `set_` plus the field name.
#[must_use]
pub fn setter_name(field: &Ident) -> Ident {
    ident(&format!("set_{}", bare_name(&field.to_string())))
}

/// Field name without its raw-identifier prefix, for composing new names.
fn bare_name(name: &str) -> &str {
    name.strip_prefix("r#").unwrap_or(name)
}

/// Creates a call-site identifier from a string.
#[must_use]
pub fn ident(name: &str) -> Ident {
    Ident::new(name, Span::call_site())
}

/// Rewrites bare well-known external type names to their canonical paths so
/// generated files are self-contained.
///
/// Source code commonly imports `DateTime<Utc>` or `Uuid`; the generated
/// module has no such imports, so `DateTime` becomes `chrono::DateTime`,
/// `Uuid` becomes `uuid::Uuid`, and so on. Prelude types and already
/// qualified paths pass through unchanged; generic arguments are rewritten
/// recursively.
#[must_use]
pub fn canonical_type(ty: &Type) -> Type {
    let Type::Path(type_path) = ty else {
        return ty.clone();
    };
    let mut rewritten = type_path.clone();

    if rewritten.qself.is_none() && rewritten.path.segments.len() == 1 {
        let segment = &rewritten.path.segments[0];
        if let Some(prefix) = canonical_prefix(&segment.ident.to_string()) {
            let mut segments = syn::punctuated::Punctuated::new();
            for part in prefix.split("::") {
                segments.push(syn::PathSegment::from(ident(part)));
            }
            let mut last = segment.clone();
            last.arguments = segment.arguments.clone();
            segments.push(last);
            rewritten.path.segments = segments;
        }
    }

    for segment in &mut rewritten.path.segments {
        if let PathArguments::AngleBracketed(args) = &mut segment.arguments {
            for arg in &mut args.args {
                if let GenericArgument::Type(inner) = arg {
                    *inner = canonical_type(inner);
                }
            }
        }
    }

    Type::Path(rewritten)
}

fn canonical_prefix(name: &str) -> Option<&'static str> {
    match name {
        "DateTime" | "NaiveDate" | "NaiveTime" | "NaiveDateTime" | "Utc" | "Local"
        | "FixedOffset" => Some("chrono"),
        "Uuid" => Some("uuid"),
        "Decimal" => Some("rust_decimal"),
        "SystemTime" | "Instant" => Some("std::time"),
        "HashSet" | "HashMap" | "BTreeSet" | "BTreeMap" | "VecDeque" => Some("std::collections"),
        "IpAddr" => Some("std::net"),
        "PathBuf" => Some("std::path"),
        _ => None,
    }
}

fn generic_inner<'a>(ty: &'a Type, wrapper: &str) -> Option<&'a Type> {
    let ident = type_ident(ty)?;
    if ident != wrapper {
        return None;
    }
    first_type_argument(ty)
}

fn first_type_argument(ty: &Type) -> Option<&Type> {
    let Type::Path(type_path) = ty else {
        return None;
    };
    let segment = type_path.path.segments.last()?;
    let PathArguments::AngleBracketed(args) = &segment.arguments else {
        return None;
    };
    args.args.iter().find_map(|arg| match arg {
        GenericArgument::Type(inner) => Some(inner),
        _ => None,
    })
}
