// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Runtime support for dtogen-generated code.
//!
//! This crate provides the traits and error types referenced by the source
//! files that `dtogen` emits. It has no generation logic of its own and can
//! also be used standalone for manual converter implementations.
//!
//! # Overview
//!
//! - [`StoredEntity`] — marker trait for persistable domain objects exposing
//!   a numeric identifier
//! - [`ConversionError`] — the single error type raised by generated
//!   conversion services
//! - [`prelude`] — convenient re-exports
//!
//! # Usage
//!
//! Generated converter services collapse entity references to their ids and
//! surface every failure as [`ConversionError`]:
//!
//! ```rust,ignore
//! let service = DtoConversionService::new();
//! let dto: Option<UserDto> = service.convert_to_dto(Some(&user))?;
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod prelude;

use thiserror::Error;

/// Marker trait for persistable domain objects.
///
/// Every entity participating in DTO conversion implements this trait,
/// usually through `#[derive(Entity)]` from `dtogen-annotations`. The
/// converter service relies on it to collapse entity references into
/// foreign-key ids.
///
/// # Example
///
/// ```rust
/// use dtogen_core::StoredEntity;
///
/// struct User {
///     id: i64,
/// }
///
/// impl StoredEntity for User {
///     fn id(&self) -> i64 {
///         self.id
///     }
/// }
///
/// let user = User { id: 7 };
/// assert_eq!(user.id(), 7);
/// ```
pub trait StoredEntity {
    /// Persistent identifier of this entity.
    fn id(&self) -> i64;
}

/// Error raised by generated conversion services.
///
/// Generated code funnels every failure through this one type: callers of a
/// conversion service match on `ConversionError` regardless of which entity
/// or which step failed.
///
/// # Variants
///
/// - [`ConverterNotFound`](Self::ConverterNotFound) — the dispatch table has
///   no entry for the runtime type of the value
/// - [`ConversionFailed`](Self::ConversionFailed) — a per-entity converter
///   failed; the original error is preserved as the source
/// - [`NullCollection`](Self::NullCollection) — the list entry point was fed
///   an absent collection (fail-fast by contract)
/// - [`UnexpectedType`](Self::UnexpectedType) — a converted value could not
///   be downcast to the requested DTO type
#[derive(Debug, Error)]
pub enum ConversionError {
    /// No converter is registered for the value's runtime type.
    #[error("conversion method not found: {type_name}")]
    ConverterNotFound {
        /// Name of the unregistered type.
        type_name: &'static str,
    },

    /// A per-entity converter failed.
    ///
    /// Wraps the underlying error so callers see one error type while the
    /// original message and cause stay reachable through [`std::error::Error::source`].
    #[error("conversion of {type_name} failed: {message}")]
    ConversionFailed {
        /// Name of the entity type whose conversion failed.
        type_name: &'static str,
        /// Message of the original failure.
        message: String,
        /// The original failure.
        #[source]
        source: Box<ConversionError>,
    },

    /// The list conversion entry point received no collection.
    ///
    /// Deliberately stricter than id collapsing, which treats an absent
    /// collection as empty.
    #[error("null collection passed to DTO list conversion")]
    NullCollection,

    /// A converted value did not have the requested type.
    #[error("converted value for {expected} has an unexpected type")]
    UnexpectedType {
        /// Name of the requested type.
        expected: &'static str,
    },
}

impl ConversionError {
    /// Wrap a converter failure, preserving its message and cause.
    ///
    /// # Arguments
    ///
    /// * `type_name` — entity type whose converter failed
    /// * `source` — the original error
    #[must_use]
    pub fn conversion_failed(type_name: &'static str, source: ConversionError) -> Self {
        Self::ConversionFailed {
            type_name,
            message: source.to_string(),
            source: Box::new(source),
        }
    }
}
