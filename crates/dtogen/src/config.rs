// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Generator configuration.
//!
//! A [`GeneratorConfig`] is assembled through [`GeneratorConfigBuilder`],
//! which accepts plain strings and validates everything once in
//! [`build`](GeneratorConfigBuilder::build): type paths must parse, the
//! attribute mask must compile. Invalid input surfaces as
//! [`GeneratorError::Config`] before any source file is touched.
//!
//! # Defaults
//!
//! | Setting | Default |
//! |---------|---------|
//! | DTO name affixes | prefix `""`, suffix `"Dto"`, postfix `""` |
//! | Entity reference path | `crate::domain` |
//! | DTO reference path | `crate::dto` |
//! | Entity trait | `dtogen_core::StoredEntity` |
//! | Conversion error type | `dtogen_core::ConversionError` |
//! | DTO derives | `Debug`, `Clone` |
//! | Attribute inclusion mask | `^validate$\|^validator::` |
//! | Mirror `#[dto_method]` methods | on |
//! | Skip associated consts | on |
//! | Conversion profiling | off |

use std::path::{Path, PathBuf};

use regex::Regex;

use crate::error::GeneratorError;

const DEFAULT_DTO_SUFFIX: &str = "Dto";
const DEFAULT_ENTITY_PATH: &str = "crate::domain";
const DEFAULT_DTO_PATH: &str = "crate::dto";
const DEFAULT_ENTITY_TRAIT: &str = "dtogen_core::StoredEntity";
const DEFAULT_ERROR_TYPE: &str = "dtogen_core::ConversionError";
const DEFAULT_ATTRIBUTE_MASK: &str = "^validate$|^validator::";
const DEFAULT_DTO_DERIVES: [&str; 2] = ["Debug", "Clone"];

/// Validated generator settings.
///
/// Construct through [`GeneratorConfig::builder`].
#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    pub(crate) source_roots: Vec<PathBuf>,
    pub(crate) output_dir: PathBuf,
    pub(crate) entity_path: syn::Path,
    pub(crate) dto_path: syn::Path,
    pub(crate) entity_trait: syn::Path,
    pub(crate) error_type: syn::Path,
    pub(crate) dto_prefix: String,
    pub(crate) dto_suffix: String,
    pub(crate) dto_postfix: String,
    pub(crate) dto_derives: Vec<syn::Path>,
    pub(crate) dto_interfaces: Vec<syn::Path>,
    pub(crate) attribute_inclusion_mask: Regex,
    pub(crate) mirror_methods: bool,
    pub(crate) skip_static_fields: bool,
    pub(crate) profiling_enabled: bool,
    pub(crate) transactional_attribute: Option<syn::Path>,
    pub(crate) annotate_list_method: bool,
    pub(crate) base_module: Option<String>,
}

impl GeneratorConfig {
    /// Starts a builder with every setting at its default.
    #[must_use]
    pub fn builder() -> GeneratorConfigBuilder {
        GeneratorConfigBuilder::default()
    }

    /// Source roots scanned for annotated entities.
    #[must_use]
    pub fn source_roots(&self) -> &[PathBuf] {
        &self.source_roots
    }

    /// Directory the generated module is written into.
    #[must_use]
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// DTO name affixes as `(prefix, suffix, postfix)`.
    #[must_use]
    pub fn dto_affixes(&self) -> (&str, &str, &str) {
        (&self.dto_prefix, &self.dto_suffix, &self.dto_postfix)
    }
}

/// Fluent builder for [`GeneratorConfig`].
#[derive(Debug, Clone)]
pub struct GeneratorConfigBuilder {
    source_roots: Vec<PathBuf>,
    output_dir: Option<PathBuf>,
    entity_path: String,
    dto_path: String,
    entity_trait: String,
    error_type: String,
    dto_prefix: String,
    dto_suffix: String,
    dto_postfix: String,
    dto_derives: Vec<String>,
    dto_interfaces: Vec<String>,
    attribute_inclusion_mask: String,
    mirror_methods: bool,
    skip_static_fields: bool,
    profiling_enabled: bool,
    transactional_attribute: Option<String>,
    annotate_list_method: bool,
    base_module: Option<String>,
}

impl Default for GeneratorConfigBuilder {
    fn default() -> Self {
        Self {
            source_roots: Vec::new(),
            output_dir: None,
            entity_path: DEFAULT_ENTITY_PATH.to_owned(),
            dto_path: DEFAULT_DTO_PATH.to_owned(),
            entity_trait: DEFAULT_ENTITY_TRAIT.to_owned(),
            error_type: DEFAULT_ERROR_TYPE.to_owned(),
            dto_prefix: String::new(),
            dto_suffix: DEFAULT_DTO_SUFFIX.to_owned(),
            dto_postfix: String::new(),
            dto_derives: DEFAULT_DTO_DERIVES.map(str::to_owned).to_vec(),
            dto_interfaces: Vec::new(),
            attribute_inclusion_mask: DEFAULT_ATTRIBUTE_MASK.to_owned(),
            mirror_methods: true,
            skip_static_fields: true,
            profiling_enabled: false,
            transactional_attribute: None,
            annotate_list_method: false,
            base_module: None,
        }
    }
}

impl GeneratorConfigBuilder {
    /// Adds a directory to scan for annotated sources.
    #[must_use]
    pub fn source_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.source_roots.push(root.into());
        self
    }

    /// Sets the directory the generated module is written into.
    #[must_use]
    pub fn output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = Some(dir.into());
        self
    }

    /// Path generated code uses to reference entity types.
    #[must_use]
    pub fn entity_path(mut self, path: impl Into<String>) -> Self {
        self.entity_path = path.into();
        self
    }

    /// Path generated code uses to reference DTO-space types that are not
    /// produced by this run, such as renamed trait bounds.
    #[must_use]
    pub fn dto_path(mut self, path: impl Into<String>) -> Self {
        self.dto_path = path.into();
        self
    }

    /// Trait providing identifier access on entities.
    #[must_use]
    pub fn entity_trait(mut self, path: impl Into<String>) -> Self {
        self.entity_trait = path.into();
        self
    }

    /// Error type of the generated conversion service.
    #[must_use]
    pub fn error_type(mut self, path: impl Into<String>) -> Self {
        self.error_type = path.into();
        self
    }

    /// Prefix prepended to generated DTO names.
    #[must_use]
    pub fn dto_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.dto_prefix = prefix.into();
        self
    }

    /// Suffix appended to generated DTO names, before the postfix.
    #[must_use]
    pub fn dto_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.dto_suffix = suffix.into();
        self
    }

    /// Postfix appended after the suffix.
    #[must_use]
    pub fn dto_postfix(mut self, postfix: impl Into<String>) -> Self {
        self.dto_postfix = postfix.into();
        self
    }

    /// Adds a derive applied to every generated DTO.
    #[must_use]
    pub fn dto_derive(mut self, path: impl Into<String>) -> Self {
        self.dto_derives.push(path.into());
        self
    }

    /// Adds a marker trait implemented by root DTOs.
    #[must_use]
    pub fn dto_interface(mut self, path: impl Into<String>) -> Self {
        self.dto_interfaces.push(path.into());
        self
    }

    /// Regex selecting which field attributes are copied onto DTO fields.
    #[must_use]
    pub fn attribute_inclusion_mask(mut self, mask: impl Into<String>) -> Self {
        self.attribute_inclusion_mask = mask.into();
        self
    }

    /// Whether `#[dto_method]` methods are mirrored onto DTOs.
    #[must_use]
    pub fn mirror_methods(mut self, enabled: bool) -> Self {
        self.mirror_methods = enabled;
        self
    }

    /// Whether associated consts are kept off the DTOs.
    #[must_use]
    pub fn skip_static_fields(mut self, enabled: bool) -> Self {
        self.skip_static_fields = enabled;
        self
    }

    /// Whether generated conversion methods time themselves.
    #[must_use]
    pub fn profiling(mut self, enabled: bool) -> Self {
        self.profiling_enabled = enabled;
        self
    }

    /// Attribute applied to the generated list-conversion method when
    /// [`annotate_list_method`](Self::annotate_list_method) is on.
    #[must_use]
    pub fn transactional_attribute(mut self, path: impl Into<String>) -> Self {
        self.transactional_attribute = Some(path.into());
        self
    }

    /// Whether the transactional attribute is applied to the list method.
    #[must_use]
    pub fn annotate_list_method(mut self, enabled: bool) -> Self {
        self.annotate_list_method = enabled;
        self
    }

    /// Restricts "managed" types to a module prefix within the model.
    #[must_use]
    pub fn base_module(mut self, module: impl Into<String>) -> Self {
        self.base_module = Some(module.into());
        self
    }

    /// Validates the settings and produces a [`GeneratorConfig`].
    ///
    /// # Errors
    ///
    /// Returns [`GeneratorError::Config`] when the output directory or source
    /// roots are missing, a type path does not parse, or the attribute mask
    /// is not a valid regex.
    pub fn build(self) -> Result<GeneratorConfig, GeneratorError> {
        let output_dir = self
            .output_dir
            .ok_or_else(|| GeneratorError::config("output directory is not set"))?;
        if self.source_roots.is_empty() {
            return Err(GeneratorError::config("at least one source root is required"));
        }

        let attribute_inclusion_mask = Regex::new(&self.attribute_inclusion_mask)
            .map_err(|err| {
                GeneratorError::config(format!("invalid attribute inclusion mask: {err}"))
            })?;

        let transactional_attribute = self
            .transactional_attribute
            .as_deref()
            .map(|path| parse_path("transactional attribute", path))
            .transpose()?;

        Ok(GeneratorConfig {
            source_roots: self.source_roots,
            output_dir,
            entity_path: parse_path("entity path", &self.entity_path)?,
            dto_path: parse_path("dto path", &self.dto_path)?,
            entity_trait: parse_path("entity trait", &self.entity_trait)?,
            error_type: parse_path("error type", &self.error_type)?,
            dto_prefix: self.dto_prefix,
            dto_suffix: self.dto_suffix,
            dto_postfix: self.dto_postfix,
            dto_derives: self
                .dto_derives
                .iter()
                .map(|path| parse_path("dto derive", path))
                .collect::<Result<_, _>>()?,
            dto_interfaces: self
                .dto_interfaces
                .iter()
                .map(|path| parse_path("dto interface", path))
                .collect::<Result<_, _>>()?,
            attribute_inclusion_mask,
            mirror_methods: self.mirror_methods,
            skip_static_fields: self.skip_static_fields,
            profiling_enabled: self.profiling_enabled,
            transactional_attribute,
            annotate_list_method: self.annotate_list_method,
            base_module: self.base_module,
        })
    }
}

fn parse_path(setting: &str, value: &str) -> Result<syn::Path, GeneratorError> {
    syn::parse_str(value)
        .map_err(|err| GeneratorError::config(format!("invalid {setting} `{value}`: {err}")))
}

#[cfg(test)]
mod tests {
    use quote::ToTokens;

    use super::*;

    fn minimal() -> GeneratorConfigBuilder {
        GeneratorConfig::builder()
            .source_root("/tmp/src")
            .output_dir("/tmp/out")
    }

    #[test]
    fn defaults_match_conventions() {
        let config = minimal().build().unwrap();
        assert_eq!(config.dto_affixes(), ("", "Dto", ""));
        assert_eq!(
            config.entity_path.to_token_stream().to_string(),
            "crate :: domain"
        );
        assert!(config.mirror_methods);
        assert!(config.skip_static_fields);
        assert!(!config.profiling_enabled);
        assert!(config.attribute_inclusion_mask.is_match("validate"));
        assert!(config.attribute_inclusion_mask.is_match("validator::custom"));
        assert!(!config.attribute_inclusion_mask.is_match("serde"));
        assert_eq!(config.dto_derives.len(), 2);
        assert!(config.dto_interfaces.is_empty());
    }

    #[test]
    fn builder_overrides_apply() {
        let config = minimal()
            .dto_suffix("View")
            .dto_postfix("V1")
            .dto_derive("serde::Serialize")
            .dto_interface("crate::api::Payload")
            .profiling(true)
            .transactional_attribute("app::transactional")
            .annotate_list_method(true)
            .base_module("domain")
            .build()
            .unwrap();
        assert_eq!(config.dto_affixes(), ("", "View", "V1"));
        assert_eq!(config.dto_derives.len(), 3);
        assert_eq!(config.dto_interfaces.len(), 1);
        assert!(config.profiling_enabled);
        assert!(config.annotate_list_method);
        assert!(config.transactional_attribute.is_some());
        assert_eq!(config.base_module.as_deref(), Some("domain"));
    }

    #[test]
    fn missing_output_dir_is_rejected() {
        let err = GeneratorConfig::builder()
            .source_root("/tmp/src")
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("output directory"));
    }

    #[test]
    fn missing_source_roots_are_rejected() {
        let err = GeneratorConfig::builder()
            .output_dir("/tmp/out")
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("source root"));
    }

    #[test]
    fn invalid_mask_is_rejected() {
        let err = minimal()
            .attribute_inclusion_mask("([unclosed")
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("attribute inclusion mask"));
    }

    #[test]
    fn invalid_type_path_is_rejected() {
        let err = minimal().entity_path("not a path").build().unwrap_err();
        assert!(err.to_string().contains("entity path"));
    }
}
